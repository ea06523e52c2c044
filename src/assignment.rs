use crate::normalize;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

pub const DEFAULT_REASON: &str = "Certificado académico oficial";
pub const DEFAULT_LOCATION: &str = "Universidad Nacional Pedro Ruiz Gallo";

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_POS_X: f64 = 50.0;
pub const DEFAULT_POS_Y: f64 = 50.0;
pub const DEFAULT_WIDTH: f64 = 150.0;
pub const DEFAULT_HEIGHT: f64 = 60.0;
pub const DEFAULT_GAP_X: f64 = 10.0;
pub const DEFAULT_GAP_Y: f64 = 10.0;

/// How the rendering pipeline positions the signature image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LayoutMode {
    /// Absolute coordinates (`posX`, `posY`).
    #[default]
    Abs,
    /// Vertical stack, spaced by `gapY`.
    Stack,
    /// Horizontal columns, spaced by `gapX`.
    Column,
}

impl LayoutMode {
    pub const ALL: [LayoutMode; 3] = [LayoutMode::Abs, LayoutMode::Stack, LayoutMode::Column];

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "ABS" => Some(LayoutMode::Abs),
            "STACK" => Some(LayoutMode::Stack),
            "COLUMN" => Some(LayoutMode::Column),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LayoutMode::Abs => "ABS",
            LayoutMode::Stack => "STACK",
            LayoutMode::Column => "COLUMN",
        }
    }
}

impl fmt::Display for LayoutMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Placement and behavior of one signature on one certificate template.
#[derive(Debug, Clone, PartialEq)]
pub struct SignatureAssignmentConfig {
    /// 1-based position among the signatures of the template.
    pub order: i64,
    /// Also apply a certificate-backed signature.
    pub digital_signing: bool,
    /// Render the raster image.
    pub visible: bool,
    /// 1-based page of the rendered document.
    pub page: i64,
    pub layout_mode: LayoutMode,
    pub pos_x: f64,
    pub pos_y: f64,
    pub width: f64,
    pub height: f64,
    pub gap_x: f64,
    pub gap_y: f64,
    pub reason: String,
    pub location: String,
}

impl SignatureAssignmentConfig {
    pub fn with_defaults(order: i64) -> Self {
        SignatureAssignmentConfig {
            order,
            digital_signing: false,
            visible: true,
            page: DEFAULT_PAGE,
            layout_mode: LayoutMode::Abs,
            pos_x: DEFAULT_POS_X,
            pos_y: DEFAULT_POS_Y,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            gap_x: DEFAULT_GAP_X,
            gap_y: DEFAULT_GAP_Y,
            reason: DEFAULT_REASON.to_owned(),
            location: DEFAULT_LOCATION.to_owned(),
        }
    }

    /// Normalize a persisted record. Every field that is missing or unreadable
    /// takes its default; `default_order` fills in a missing `orden`.
    pub fn from_record(record: &AssignmentRecord, default_order: i64) -> Self {
        let layout_mode = match normalize::text(record.layout_mode.as_ref()) {
            Some(text) => LayoutMode::parse(&text).unwrap_or_else(|| {
                log::warn!("Unknown layout mode `{}`, using `ABS`.", text);
                LayoutMode::Abs
            }),
            None => LayoutMode::Abs,
        };
        SignatureAssignmentConfig {
            order: normalize::integer(record.orden.as_ref()).unwrap_or(default_order),
            digital_signing: normalize::flag(record.firmar_digital.as_ref()).unwrap_or(false),
            visible: normalize::flag(record.firma_visible.as_ref()).unwrap_or(true),
            page: normalize::integer(record.pagina.as_ref()).unwrap_or(DEFAULT_PAGE),
            layout_mode,
            pos_x: normalize::number(record.pos_x.as_ref()).unwrap_or(DEFAULT_POS_X),
            pos_y: normalize::number(record.pos_y.as_ref()).unwrap_or(DEFAULT_POS_Y),
            width: normalize::number(record.ancho.as_ref()).unwrap_or(DEFAULT_WIDTH),
            height: normalize::number(record.alto.as_ref()).unwrap_or(DEFAULT_HEIGHT),
            gap_x: normalize::number(record.gap_x.as_ref()).unwrap_or(DEFAULT_GAP_X),
            gap_y: normalize::number(record.gap_y.as_ref()).unwrap_or(DEFAULT_GAP_Y),
            reason: normalize::text(record.reason.as_ref())
                .unwrap_or_else(|| DEFAULT_REASON.to_owned()),
            location: normalize::text(record.location.as_ref())
                .unwrap_or_else(|| DEFAULT_LOCATION.to_owned()),
        }
    }
}

/// `TbFormatoCertificadoFirma` exactly as the backend returns it. Values are
/// kept untyped until [`SignatureAssignmentConfig::from_record`] reads them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AssignmentRecord {
    pub id: Option<Value>,
    pub tb_firma: Option<Value>,
    pub tb_formato_certificado: Option<Value>,
    pub orden: Option<Value>,
    pub firmar_digital: Option<Value>,
    pub firma_visible: Option<Value>,
    pub pagina: Option<Value>,
    pub pos_x: Option<Value>,
    pub pos_y: Option<Value>,
    pub ancho: Option<Value>,
    pub alto: Option<Value>,
    pub layout_mode: Option<Value>,
    pub gap_x: Option<Value>,
    pub gap_y: Option<Value>,
    pub reason: Option<Value>,
    pub location: Option<Value>,
}

impl AssignmentRecord {
    /// `tbFirma.id`, or the signature half of the composite id.
    pub fn signature_id(&self) -> Option<i64> {
        normalize::integer(self.tb_firma.as_ref().and_then(|firma| firma.get("id"))).or_else(
            || normalize::integer(self.id.as_ref().and_then(|id| id.get("idtbFirma"))),
        )
    }

    /// `tbFormatoCertificado.id`, or the template half of the composite id.
    pub fn template_id(&self) -> Option<i64> {
        normalize::integer(
            self.tb_formato_certificado
                .as_ref()
                .and_then(|formato| formato.get("id")),
        )
        .or_else(|| {
            normalize::integer(
                self.id
                    .as_ref()
                    .and_then(|id| id.get("idtbFormatoCertificado")),
            )
        })
    }
}
