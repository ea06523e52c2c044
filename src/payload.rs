//! Body of the insert/update calls. The document-rendering backend reads these
//! names and the `"0"`/`"1"` flag strings verbatim.

use crate::assignment::{LayoutMode, SignatureAssignmentConfig};
use serde::{Serialize, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentId {
    pub idtb_firma: i64,
    pub idtb_formato_certificado: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IdRef {
    pub id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentPayload {
    pub id: AssignmentId,
    pub tb_firma: IdRef,
    pub tb_formato_certificado: IdRef,
    pub orden: i64,
    #[serde(serialize_with = "serialize_flag")]
    pub firmar_digital: bool,
    #[serde(serialize_with = "serialize_flag")]
    pub firma_visible: bool,
    pub pagina: i64,
    #[serde(serialize_with = "serialize_number")]
    pub pos_x: f64,
    #[serde(serialize_with = "serialize_number")]
    pub pos_y: f64,
    #[serde(serialize_with = "serialize_number")]
    pub ancho: f64,
    #[serde(serialize_with = "serialize_number")]
    pub alto: f64,
    pub layout_mode: LayoutMode,
    #[serde(serialize_with = "serialize_number")]
    pub gap_x: f64,
    #[serde(serialize_with = "serialize_number")]
    pub gap_y: f64,
    pub reason: String,
    pub location: String,
}

impl AssignmentPayload {
    pub fn new(signature_id: i64, template_id: i64, config: &SignatureAssignmentConfig) -> Self {
        AssignmentPayload {
            id: AssignmentId {
                idtb_firma: signature_id,
                idtb_formato_certificado: template_id,
            },
            tb_firma: IdRef { id: signature_id },
            tb_formato_certificado: IdRef { id: template_id },
            orden: config.order,
            firmar_digital: config.digital_signing,
            firma_visible: config.visible,
            pagina: config.page,
            pos_x: config.pos_x,
            pos_y: config.pos_y,
            ancho: config.width,
            alto: config.height,
            layout_mode: config.layout_mode,
            gap_x: config.gap_x,
            gap_y: config.gap_y,
            reason: config.reason.clone(),
            location: config.location.clone(),
        }
    }

    pub fn signature_id(&self) -> i64 {
        self.id.idtb_firma
    }
}

fn serialize_flag<S: Serializer>(flag: &bool, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(if *flag { "1" } else { "0" })
}

// Integral values go out as JSON integers (`50`, not `50.0`).
fn serialize_number<S: Serializer>(number: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if number.fract() == 0.0 && number.abs() < i64::MAX as f64 {
        serializer.serialize_i64(*number as i64)
    } else {
        serializer.serialize_f64(*number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn default_config_wire_shape() {
        let payload = AssignmentPayload::new(3, 8, &SignatureAssignmentConfig::with_defaults(1));
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({
                "id": { "idtbFirma": 3, "idtbFormatoCertificado": 8 },
                "tbFirma": { "id": 3 },
                "tbFormatoCertificado": { "id": 8 },
                "orden": 1,
                "firmarDigital": "0",
                "firmaVisible": "1",
                "pagina": 1,
                "posX": 50,
                "posY": 50,
                "ancho": 150,
                "alto": 60,
                "layoutMode": "ABS",
                "gapX": 10,
                "gapY": 10,
                "reason": "Certificado académico oficial",
                "location": "Universidad Nacional Pedro Ruiz Gallo"
            })
        );
    }

    #[test]
    fn fractional_numbers_stay_fractional() {
        let mut config = SignatureAssignmentConfig::with_defaults(2);
        config.pos_x = 12.5;
        config.digital_signing = true;
        config.layout_mode = LayoutMode::Column;
        let value = serde_json::to_value(AssignmentPayload::new(1, 1, &config)).unwrap();
        assert_eq!(value["posX"], json!(12.5));
        assert_eq!(value["firmarDigital"], json!("1"));
        assert_eq!(value["layoutMode"], json!("COLUMN"));
    }
}
