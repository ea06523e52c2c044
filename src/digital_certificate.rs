use crate::normalize;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

/// A `.p12`/`.pfx` keystore registered for a signature. The backend keeps at
/// most one active certificate per signature; here the flag is only read.
#[derive(Debug, Clone, PartialEq)]
pub struct DigitalCertificate {
    pub id: Option<i64>,
    pub signature_id: Option<i64>,
    /// `P12` or `PFX`.
    pub keystore_type: Option<String>,
    pub alias: Option<String>,
    pub subject_dn: Option<String>,
    pub issuer_dn: Option<String>,
    pub serial_number: Option<String>,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_to: Option<DateTime<Utc>>,
    /// `None` when the record does not carry an `estado` at all.
    pub active: Option<bool>,
}

impl DigitalCertificate {
    /// Whether `now` lies inside the validity window. Open ends count as valid.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        let started = self.valid_from.map_or(true, |from| from <= now);
        let not_expired = self.valid_to.map_or(true, |to| now <= to);
        started && not_expired
    }

    /// Subject, alias or id, whichever is known first.
    pub fn display_name(&self) -> String {
        self.subject_dn
            .clone()
            .or_else(|| self.alias.clone())
            .or_else(|| self.id.map(|id| format!("Cert #{}", id)))
            .unwrap_or_else(|| "-".to_owned())
    }
}

/// `TbCertificadoDigital` as the backend sends it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct RawDigitalCertificate {
    pub id: Option<Value>,
    pub tb_firma: Option<Value>,
    pub keystore_tipo: Option<Value>,
    pub alias_cert: Option<Value>,
    pub subject_dn: Option<Value>,
    pub issuer_dn: Option<Value>,
    pub serial_number: Option<Value>,
    pub valido_desde: Option<Value>,
    pub valido_hasta: Option<Value>,
    pub estado: Option<Value>,
}

impl From<RawDigitalCertificate> for DigitalCertificate {
    fn from(raw: RawDigitalCertificate) -> Self {
        DigitalCertificate {
            id: normalize::integer(raw.id.as_ref()),
            signature_id: normalize::integer(raw.tb_firma.as_ref().and_then(|firma| firma.get("id"))),
            keystore_type: normalize::text(raw.keystore_tipo.as_ref()),
            alias: normalize::text(raw.alias_cert.as_ref()),
            subject_dn: normalize::text(raw.subject_dn.as_ref()),
            issuer_dn: normalize::text(raw.issuer_dn.as_ref()),
            serial_number: normalize::text(raw.serial_number.as_ref()),
            valid_from: normalize::datetime(raw.valido_desde.as_ref()),
            valid_to: normalize::datetime(raw.valido_hasta.as_ref()),
            active: normalize::flag(raw.estado.as_ref()),
        }
    }
}
