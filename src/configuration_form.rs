//! Editing state for the configuration of one signature on one template.

use crate::assignment::{
    LayoutMode, SignatureAssignmentConfig, DEFAULT_GAP_X, DEFAULT_GAP_Y, DEFAULT_HEIGHT,
    DEFAULT_POS_X, DEFAULT_POS_Y, DEFAULT_WIDTH,
};
use crate::certificate_gate::DigitalCertificateGate;
use crate::error::Error;
use crate::notification::{Notification, Notifier};
use crate::signature::Signature;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

pub const MIN_ORDER: f64 = 1.0;
pub const MIN_PAGE: f64 = 1.0;
/// Smallest accepted width/height of the image box.
pub const MIN_SIZE: f64 = 10.0;
pub const MIN_OFFSET: f64 = 0.0;
pub const MAX_TEXT_LENGTH: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Order,
    Page,
    PosX,
    PosY,
    Width,
    Height,
    GapX,
    GapY,
    Reason,
    Location,
}

impl Field {
    pub const ALL: [Field; 10] = [
        Field::Order,
        Field::Page,
        Field::PosX,
        Field::PosY,
        Field::Width,
        Field::Height,
        Field::GapX,
        Field::GapY,
        Field::Reason,
        Field::Location,
    ];

    /// Name of the field in the persisted payload.
    pub fn wire_name(&self) -> &'static str {
        match self {
            Field::Order => "orden",
            Field::Page => "pagina",
            Field::PosX => "posX",
            Field::PosY => "posY",
            Field::Width => "ancho",
            Field::Height => "alto",
            Field::GapX => "gapX",
            Field::GapY => "gapY",
            Field::Reason => "reason",
            Field::Location => "location",
        }
    }
}

/// Validators attached to a field.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FieldRule {
    pub required: bool,
    pub min: Option<f64>,
    pub max_length: Option<usize>,
}

impl FieldRule {
    pub const UNCONSTRAINED: FieldRule = FieldRule {
        required: false,
        min: None,
        max_length: None,
    };

    pub const fn required_min(min: f64) -> Self {
        FieldRule {
            required: true,
            min: Some(min),
            max_length: None,
        }
    }

    pub const fn max_length(max_length: usize) -> Self {
        FieldRule {
            required: false,
            min: None,
            max_length: Some(max_length),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Violation {
    Required,
    Min(f64),
    MaxLength(usize),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldError {
    pub field: Field,
    pub violation: Violation,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.violation {
            Violation::Required => write!(f, "`{}` is required", self.field.wire_name()),
            Violation::Min(min) => {
                write!(f, "`{}` must be at least {}", self.field.wire_name(), min)
            }
            Violation::MaxLength(max) => write!(
                f,
                "`{}` must be at most {} characters",
                self.field.wire_name(),
                max
            ),
        }
    }
}

/// Result of the certificate lookup made when the form opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CertificateStatus {
    Checking,
    Active,
    Missing,
}

/// Current content of the form. `None` is an empty input.
#[derive(Debug, Clone, PartialEq)]
pub struct FormValues {
    pub order: Option<i64>,
    pub digital_signing: bool,
    pub visible: bool,
    pub page: Option<i64>,
    pub layout_mode: LayoutMode,
    pub pos_x: Option<f64>,
    pub pos_y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub gap_x: Option<f64>,
    pub gap_y: Option<f64>,
    pub reason: String,
    pub location: String,
}

impl From<&SignatureAssignmentConfig> for FormValues {
    fn from(config: &SignatureAssignmentConfig) -> Self {
        FormValues {
            order: Some(config.order),
            digital_signing: config.digital_signing,
            visible: config.visible,
            page: Some(config.page),
            layout_mode: config.layout_mode,
            pos_x: finite(Some(config.pos_x)),
            pos_y: finite(Some(config.pos_y)),
            width: finite(Some(config.width)),
            height: finite(Some(config.height)),
            gap_x: finite(Some(config.gap_x)),
            gap_y: finite(Some(config.gap_y)),
            reason: config.reason.clone(),
            location: config.location.clone(),
        }
    }
}

/// How the dialog was closed.
#[derive(Debug, Clone, PartialEq)]
pub enum FormResult {
    Saved(SignatureAssignmentConfig),
    Cancelled,
}

pub struct ConfigurationForm {
    signature: Signature,
    values: FormValues,
    rules: HashMap<Field, FieldRule>,
    certificate: CertificateStatus,
    notifier: Arc<dyn Notifier>,
}

impl fmt::Debug for ConfigurationForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigurationForm")
            .field("signature", &self.signature.id)
            .field("values", &self.values)
            .field("certificate", &self.certificate)
            .finish()
    }
}

impl ConfigurationForm {
    /// Prefill from `existing`, or from the defaults with `order`. The
    /// certificate status starts as [`CertificateStatus::Checking`].
    pub fn new(
        signature: Signature,
        order: i64,
        existing: Option<&SignatureAssignmentConfig>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let values = match existing {
            Some(config) => FormValues::from(config),
            None => FormValues::from(&SignatureAssignmentConfig::with_defaults(order)),
        };
        let mut form = ConfigurationForm {
            signature,
            values,
            rules: HashMap::new(),
            certificate: CertificateStatus::Checking,
            notifier,
        };
        form.apply_layout_rules();
        form
    }

    /// [`ConfigurationForm::new`] followed by the certificate check.
    pub async fn open(
        signature: Signature,
        order: i64,
        existing: Option<&SignatureAssignmentConfig>,
        gate: &DigitalCertificateGate,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let mut form = Self::new(signature, order, existing, notifier);
        form.check_certificate(gate).await;
        form
    }

    /// A failed query leaves digital signing off and warns the operator.
    pub async fn check_certificate(&mut self, gate: &DigitalCertificateGate) {
        match gate.lookup(Some(self.signature.id)).await {
            Ok(active) => self.set_certificate_status(active),
            Err(err) => {
                log::warn!(
                    "Could not check the digital certificate of signature `{}`. Err: {}",
                    self.signature.id,
                    err
                );
                self.notifier.notify(Notification::warning(format!(
                    "Could not verify the digital certificate of `{}`. Digital signing is disabled.",
                    self.signature.name
                )));
                self.set_certificate_status(false);
            }
        }
    }

    /// Without an active certificate digital signing is switched off, even if
    /// a stored configuration had it on.
    pub fn set_certificate_status(&mut self, active: bool) {
        if active {
            self.certificate = CertificateStatus::Active;
        } else {
            self.certificate = CertificateStatus::Missing;
            self.values.digital_signing = false;
        }
    }

    pub fn certificate_status(&self) -> CertificateStatus {
        self.certificate
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn values(&self) -> &FormValues {
        &self.values
    }

    pub fn rule(&self, field: Field) -> FieldRule {
        self.rules
            .get(&field)
            .copied()
            .unwrap_or(FieldRule::UNCONSTRAINED)
    }

    /// Turning digital signing on requires a confirmed active certificate.
    /// A rejected toggle leaves the flag off and warns the operator.
    pub fn set_digital_signing(&mut self, enabled: bool) -> Result<(), Error> {
        if enabled && self.certificate != CertificateStatus::Active {
            self.values.digital_signing = false;
            self.notifier.notify(Notification::warning(format!(
                "Signature `{}` has no active digital certificate. Digital signing can not be enabled.",
                self.signature.name
            )));
            return Err(Error::GateRejection {
                signature_id: Some(self.signature.id),
            });
        }
        self.values.digital_signing = enabled;
        Ok(())
    }

    /// Changing the mode swaps the validators before anything else can happen.
    pub fn set_layout_mode(&mut self, layout_mode: LayoutMode) {
        self.values.layout_mode = layout_mode;
        self.apply_layout_rules();
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.values.visible = visible;
    }

    pub fn set_order(&mut self, order: Option<i64>) {
        self.values.order = order;
    }

    pub fn set_page(&mut self, page: Option<i64>) {
        self.values.page = page;
    }

    /// NaN and infinities count as an empty input.
    pub fn set_position(&mut self, pos_x: Option<f64>, pos_y: Option<f64>) {
        self.values.pos_x = finite(pos_x);
        self.values.pos_y = finite(pos_y);
    }

    pub fn set_size(&mut self, width: Option<f64>, height: Option<f64>) {
        self.values.width = finite(width);
        self.values.height = finite(height);
    }

    pub fn set_gap_x(&mut self, gap_x: Option<f64>) {
        self.values.gap_x = finite(gap_x);
    }

    pub fn set_gap_y(&mut self, gap_y: Option<f64>) {
        self.values.gap_y = finite(gap_y);
    }

    pub fn set_reason(&mut self, reason: &str) {
        self.values.reason = reason.to_owned();
    }

    pub fn set_location(&mut self, location: &str) {
        self.values.location = location.to_owned();
    }

    fn apply_layout_rules(&mut self) {
        use FieldRule as R;
        let offset = R::required_min(MIN_OFFSET);
        let (pos, gap_x, gap_y) = match self.values.layout_mode {
            LayoutMode::Abs => (offset, R::UNCONSTRAINED, R::UNCONSTRAINED),
            LayoutMode::Stack => (R::UNCONSTRAINED, R::UNCONSTRAINED, offset),
            LayoutMode::Column => (R::UNCONSTRAINED, offset, R::UNCONSTRAINED),
        };
        self.rules = HashMap::from([
            (Field::Order, R::required_min(MIN_ORDER)),
            (Field::Page, R::required_min(MIN_PAGE)),
            (Field::Width, R::required_min(MIN_SIZE)),
            (Field::Height, R::required_min(MIN_SIZE)),
            (Field::PosX, pos),
            (Field::PosY, pos),
            (Field::GapX, gap_x),
            (Field::GapY, gap_y),
            (Field::Reason, R::max_length(MAX_TEXT_LENGTH)),
            (Field::Location, R::max_length(MAX_TEXT_LENGTH)),
        ]);
    }

    fn numeric_value(&self, field: Field) -> Option<f64> {
        let value = match field {
            Field::Order => self.values.order.map(|v| v as f64),
            Field::Page => self.values.page.map(|v| v as f64),
            Field::PosX => self.values.pos_x,
            Field::PosY => self.values.pos_y,
            Field::Width => self.values.width,
            Field::Height => self.values.height,
            Field::GapX => self.values.gap_x,
            Field::GapY => self.values.gap_y,
            Field::Reason | Field::Location => None,
        };
        finite(value)
    }

    fn check(&self, field: Field) -> Option<Violation> {
        let rule = self.rule(field);
        match field {
            Field::Reason | Field::Location => {
                let text = if field == Field::Reason {
                    &self.values.reason
                } else {
                    &self.values.location
                };
                if rule.required && text.is_empty() {
                    return Some(Violation::Required);
                }
                match rule.max_length {
                    Some(max) if text.chars().count() > max => Some(Violation::MaxLength(max)),
                    _ => None,
                }
            }
            _ => match (self.numeric_value(field), rule.min) {
                (None, _) if rule.required => Some(Violation::Required),
                (Some(value), Some(min)) if value < min => Some(Violation::Min(min)),
                _ => None,
            },
        }
    }

    pub fn errors(&self) -> Vec<FieldError> {
        Field::ALL
            .iter()
            .filter_map(|field| {
                self.check(*field).map(|violation| FieldError {
                    field: *field,
                    violation,
                })
            })
            .collect()
    }

    pub fn is_valid(&self) -> bool {
        self.errors().is_empty()
    }

    /// The validated configuration. Inputs left empty in fields the current
    /// mode does not use are stored with their defaults.
    pub fn confirm(&self) -> Result<FormResult, Error> {
        let errors = self.errors();
        if !errors.is_empty() {
            return Err(Error::InvalidForm(errors));
        }
        let values = &self.values;
        let digital_signing =
            values.digital_signing && self.certificate == CertificateStatus::Active;
        if values.digital_signing && !digital_signing {
            log::warn!(
                "Certificate of signature `{}` is not confirmed active ({:?}), saving without digital signing.",
                self.signature.id,
                self.certificate
            );
        }
        let config = SignatureAssignmentConfig {
            order: values.order.unwrap_or(MIN_ORDER as i64),
            digital_signing,
            visible: values.visible,
            page: values.page.unwrap_or(MIN_PAGE as i64),
            layout_mode: values.layout_mode,
            pos_x: values.pos_x.unwrap_or(DEFAULT_POS_X),
            pos_y: values.pos_y.unwrap_or(DEFAULT_POS_Y),
            width: values.width.unwrap_or(DEFAULT_WIDTH),
            height: values.height.unwrap_or(DEFAULT_HEIGHT),
            gap_x: values.gap_x.unwrap_or(DEFAULT_GAP_X),
            gap_y: values.gap_y.unwrap_or(DEFAULT_GAP_Y),
            reason: values.reason.clone(),
            location: values.location.clone(),
        };
        log::debug!(
            "Saving configuration for signature `{}`: {:?}",
            self.signature.id,
            config
        );
        Ok(FormResult::Saved(config))
    }

    pub fn cancel(&self) -> FormResult {
        FormResult::Cancelled
    }
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|value| value.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assignment::{DEFAULT_LOCATION, DEFAULT_REASON};
    use crate::notification::NotificationLevel;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingNotifier(Mutex<Vec<Notification>>);

    impl Notifier for RecordingNotifier {
        fn notify(&self, notification: Notification) {
            self.0.lock().unwrap().push(notification);
        }
    }

    fn form(existing: Option<&SignatureAssignmentConfig>) -> (ConfigurationForm, Arc<RecordingNotifier>) {
        let notifier = Arc::new(RecordingNotifier::default());
        let form = ConfigurationForm::new(
            Signature::new(7, "F-007", "Decano"),
            2,
            existing,
            notifier.clone(),
        );
        (form, notifier)
    }

    fn assert_layout_rules(form: &ConfigurationForm, mode: LayoutMode) {
        let offset = FieldRule::required_min(0.0);
        let none = FieldRule::UNCONSTRAINED;
        let expected = match mode {
            LayoutMode::Abs => [offset, offset, none, none],
            LayoutMode::Stack => [none, none, none, offset],
            LayoutMode::Column => [none, none, offset, none],
        };
        let actual = [
            form.rule(Field::PosX),
            form.rule(Field::PosY),
            form.rule(Field::GapX),
            form.rule(Field::GapY),
        ];
        assert_eq!(actual, expected, "mode {}", mode);
        assert_eq!(form.rule(Field::Width), FieldRule::required_min(10.0));
        assert_eq!(form.rule(Field::Height), FieldRule::required_min(10.0));
        assert_eq!(form.rule(Field::Order), FieldRule::required_min(1.0));
        assert_eq!(form.rule(Field::Page), FieldRule::required_min(1.0));
    }

    #[test]
    fn defaults_without_existing_config() {
        let (form, _) = form(None);
        let values = form.values();
        assert_eq!(values.order, Some(2));
        assert!(!values.digital_signing);
        assert!(values.visible);
        assert_eq!(values.page, Some(1));
        assert_eq!(values.layout_mode, LayoutMode::Abs);
        assert_eq!((values.pos_x, values.pos_y), (Some(50.0), Some(50.0)));
        assert_eq!((values.width, values.height), (Some(150.0), Some(60.0)));
        assert_eq!((values.gap_x, values.gap_y), (Some(10.0), Some(10.0)));
        assert_eq!(values.reason, DEFAULT_REASON);
        assert_eq!(values.location, DEFAULT_LOCATION);
        assert_eq!(form.certificate_status(), CertificateStatus::Checking);
        assert!(form.is_valid());
    }

    #[test]
    fn existing_config_prefills_and_sets_rules() {
        let mut existing = SignatureAssignmentConfig::with_defaults(4);
        existing.layout_mode = LayoutMode::Column;
        existing.gap_x = 25.0;
        let (form, _) = form(Some(&existing));
        assert_eq!(form.values().order, Some(4));
        assert_eq!(form.values().gap_x, Some(25.0));
        assert_layout_rules(&form, LayoutMode::Column);
    }

    #[test]
    fn layout_rules_follow_every_switch() {
        let (mut form, _) = form(None);
        assert_layout_rules(&form, LayoutMode::Abs);
        for _ in 0..3 {
            for mode in [LayoutMode::Stack, LayoutMode::Column, LayoutMode::Abs] {
                form.set_layout_mode(mode);
                assert_layout_rules(&form, mode);
            }
        }
        form.set_layout_mode(LayoutMode::Stack);
        form.set_layout_mode(LayoutMode::Stack);
        assert_layout_rules(&form, LayoutMode::Stack);
    }

    #[test]
    fn position_only_matters_in_absolute_mode() {
        let (mut form, _) = form(None);
        form.set_position(None, Some(-5.0));
        let fields: Vec<Field> = form.errors().iter().map(|e| e.field).collect();
        assert_eq!(fields, vec![Field::PosX, Field::PosY]);

        form.set_layout_mode(LayoutMode::Stack);
        assert!(form.is_valid());

        form.set_gap_y(None);
        assert_eq!(
            form.errors(),
            vec![FieldError {
                field: Field::GapY,
                violation: Violation::Required
            }]
        );
        form.set_layout_mode(LayoutMode::Column);
        assert!(form.is_valid());
        form.set_gap_x(Some(-1.0));
        assert_eq!(
            form.errors(),
            vec![FieldError {
                field: Field::GapX,
                violation: Violation::Min(0.0)
            }]
        );
    }

    #[test]
    fn always_required_fields() {
        let (mut form, _) = form(None);
        form.set_order(Some(0));
        form.set_page(None);
        form.set_size(Some(9.5), Some(10.0));
        form.set_reason(&"x".repeat(201));
        let errors = form.errors();
        assert_eq!(
            errors,
            vec![
                FieldError {
                    field: Field::Order,
                    violation: Violation::Min(1.0)
                },
                FieldError {
                    field: Field::Page,
                    violation: Violation::Required
                },
                FieldError {
                    field: Field::Width,
                    violation: Violation::Min(10.0)
                },
                FieldError {
                    field: Field::Reason,
                    violation: Violation::MaxLength(200)
                },
            ]
        );
        match form.confirm() {
            Err(err) => assert!(err.is_validation()),
            Ok(result) => panic!("invalid form confirmed: {:?}", result),
        }
    }

    #[test]
    fn max_length_counts_characters() {
        let (mut form, _) = form(None);
        form.set_location(&"é".repeat(200));
        assert!(form.is_valid());
    }

    #[test]
    fn digital_signing_rejected_while_checking_or_missing() {
        let (mut form, notifier) = form(None);
        assert!(matches!(
            form.set_digital_signing(true),
            Err(Error::GateRejection {
                signature_id: Some(7)
            })
        ));
        assert!(!form.values().digital_signing);

        form.set_certificate_status(false);
        assert!(form.set_digital_signing(true).is_err());
        assert!(!form.values().digital_signing);

        let notifications = notifier.0.lock().unwrap();
        assert_eq!(notifications.len(), 2);
        assert!(notifications
            .iter()
            .all(|n| n.level == NotificationLevel::Warning));
    }

    #[test]
    fn digital_signing_allowed_with_active_certificate() {
        let (mut form, notifier) = form(None);
        form.set_certificate_status(true);
        form.set_digital_signing(true).unwrap();
        assert!(form.values().digital_signing);
        form.set_digital_signing(false).unwrap();
        assert!(!form.values().digital_signing);
        assert!(notifier.0.lock().unwrap().is_empty());
    }

    #[test]
    fn missing_certificate_clears_stored_digital_signing() {
        let mut existing = SignatureAssignmentConfig::with_defaults(1);
        existing.digital_signing = true;
        let (mut form, _) = form(Some(&existing));
        assert!(form.values().digital_signing);
        form.set_certificate_status(false);
        assert!(!form.values().digital_signing);
    }

    #[test]
    fn confirm_returns_the_edited_config() {
        let (mut form, _) = form(None);
        form.set_layout_mode(LayoutMode::Stack);
        form.set_position(None, None);
        form.set_gap_y(Some(15.0));
        form.set_size(Some(100.0), Some(40.0));
        form.set_visible(false);
        let config = match form.confirm().unwrap() {
            FormResult::Saved(config) => config,
            FormResult::Cancelled => panic!("expected a saved configuration"),
        };
        assert_eq!(config.layout_mode, LayoutMode::Stack);
        assert_eq!(config.gap_y, 15.0);
        assert_eq!((config.width, config.height), (100.0, 40.0));
        assert_eq!((config.pos_x, config.pos_y), (50.0, 50.0));
        assert!(!config.visible);
        assert_eq!(config.order, 2);
        assert_eq!(form.cancel(), FormResult::Cancelled);
    }

    #[test]
    fn non_finite_numbers_are_empty_inputs() {
        let (mut form, _) = form(None);
        form.set_size(Some(f64::NAN), Some(f64::INFINITY));
        form.set_position(Some(f64::NEG_INFINITY), Some(20.0));
        form.set_gap_y(Some(f64::NAN));
        assert_eq!(form.values().width, None);
        assert_eq!(form.values().pos_x, None);
        assert_eq!(
            form.errors(),
            vec![
                FieldError {
                    field: Field::PosX,
                    violation: Violation::Required
                },
                FieldError {
                    field: Field::Width,
                    violation: Violation::Required
                },
                FieldError {
                    field: Field::Height,
                    violation: Violation::Required
                },
            ]
        );

        // gapY is unused in ABS and falls back to its default.
        form.set_size(Some(100.0), Some(40.0));
        form.set_position(Some(30.0), Some(20.0));
        let config = match form.confirm().unwrap() {
            FormResult::Saved(config) => config,
            FormResult::Cancelled => panic!("expected a saved configuration"),
        };
        assert_eq!(config.gap_y, DEFAULT_GAP_Y);
        let payload = crate::payload::AssignmentPayload::new(7, 8, &config);
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["gapY"], serde_json::json!(10));
        assert_eq!(value["ancho"], serde_json::json!(100));
    }

    #[test]
    fn stored_digital_signing_needs_a_confirmed_certificate() {
        let mut existing = SignatureAssignmentConfig::with_defaults(1);
        existing.digital_signing = true;
        let (mut form, _) = form(Some(&existing));
        assert_eq!(form.certificate_status(), CertificateStatus::Checking);
        match form.confirm().unwrap() {
            FormResult::Saved(config) => assert!(!config.digital_signing),
            FormResult::Cancelled => panic!("expected a saved configuration"),
        }

        form.set_certificate_status(true);
        match form.confirm().unwrap() {
            FormResult::Saved(config) => assert!(config.digital_signing),
            FormResult::Cancelled => panic!("expected a saved configuration"),
        }
    }
}
