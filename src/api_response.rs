use crate::error::Error;
use serde::Deserialize;

/// Envelope wrapped around every backend answer.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub(crate) struct ApiResponse<T> {
    pub error: bool,
    pub codigo: i64,
    pub mensaje: String,
    pub data: Option<T>,
    pub titulo: String,
}

impl<T> Default for ApiResponse<T> {
    fn default() -> Self {
        ApiResponse {
            error: false,
            codigo: 0,
            mensaje: String::new(),
            data: None,
            titulo: String::new(),
        }
    }
}

impl<T> ApiResponse<T> {
    /// The payload, or the backend's own error report.
    pub fn into_data(self) -> Result<Option<T>, Error> {
        if self.error {
            let mensaje = if self.mensaje.is_empty() {
                self.titulo
            } else {
                self.mensaje
            };
            return Err(Error::Api {
                codigo: self.codigo,
                mensaje,
            });
        }
        Ok(self.data)
    }
}
