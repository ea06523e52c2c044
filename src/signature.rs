use crate::error::Error;
use crate::normalize;
use serde::Deserialize;
use serde_json::Value;

/// A stored signer: display data plus the raster image placed on certificates.
#[derive(Debug, Clone, PartialEq)]
pub struct Signature {
    pub id: i64,
    pub code: String,
    pub name: String,
    /// Job title shown under the image, when the backend has one.
    pub title: Option<String>,
    pub entity: Option<String>,
    pub active: bool,
    /// Raw image bytes (PNG in practice).
    pub image: Option<Vec<u8>>,
}

impl Signature {
    pub fn new(id: i64, code: &str, name: &str) -> Self {
        Signature {
            id,
            code: code.to_owned(),
            name: name.to_owned(),
            title: None,
            entity: None,
            active: true,
            image: None,
        }
    }

    pub fn with_image(mut self, image: Vec<u8>) -> Self {
        self.image = Some(image);
        self
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }
}

/// `TbFirma` as the backend sends it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RawSignature {
    pub id: Option<Value>,
    pub codigo: Option<Value>,
    pub nombre: Option<Value>,
    pub estado: Option<Value>,
    pub cargo: Option<Value>,
    pub entidad: Option<Value>,
    pub imagen: Option<Value>,
}

impl TryFrom<RawSignature> for Signature {
    type Error = Error;

    fn try_from(raw: RawSignature) -> Result<Self, Self::Error> {
        let id = normalize::integer(raw.id.as_ref())
            .ok_or_else(|| Error::Other("Signature record without `id`.".to_owned()))?;
        Ok(Signature {
            id,
            code: normalize::text(raw.codigo.as_ref()).unwrap_or_default(),
            name: normalize::text(raw.nombre.as_ref()).unwrap_or_default(),
            title: normalize::text(raw.cargo.as_ref()),
            entity: normalize::text(raw.entidad.as_ref()),
            active: normalize::flag(raw.estado.as_ref()).unwrap_or(false),
            image: normalize::bytes(raw.imagen.as_ref()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: Value) -> Result<Signature, Error> {
        let raw: RawSignature = serde_json::from_value(value).unwrap();
        Signature::try_from(raw)
    }

    #[test]
    fn parses_backend_record() {
        let signature = parse(json!({
            "id": 4,
            "codigo": "F-004",
            "nombre": "Rector",
            "estado": "1",
            "cargo": "Rector",
            "imagen": "iVBORw=="
        }))
        .unwrap();
        assert_eq!(signature.id, 4);
        assert_eq!(signature.code, "F-004");
        assert!(signature.active);
        assert_eq!(signature.title.as_deref(), Some("Rector"));
        assert_eq!(signature.entity, None);
        assert_eq!(signature.image, Some(vec![0x89, 0x50, 0x4e, 0x47]));
    }

    #[test]
    fn estado_variants() {
        assert!(parse(json!({ "id": 1, "estado": 1 })).unwrap().active);
        assert!(parse(json!({ "id": 1, "estado": "ACTIVO" })).unwrap().active);
        assert!(!parse(json!({ "id": 1, "estado": "0" })).unwrap().active);
        assert!(!parse(json!({ "id": 1 })).unwrap().active);
    }

    #[test]
    fn record_without_id_is_rejected() {
        assert!(parse(json!({ "codigo": "X" })).is_err());
    }
}
