use crate::configuration_form::FieldError;
use std::fmt;

#[derive(Debug)]
pub enum Error {
    ReqwestError(reqwest::Error),
    UrlError(url::ParseError),
    JsonError(serde_json::Error),
    IoError(std::io::Error),
    PngError(png::DecodingError),
    /// The backend answered with `error: true` in its envelope.
    Api {
        codigo: i64,
        mensaje: String,
    },
    /// The form did not pass its validators at submit time.
    InvalidForm(Vec<FieldError>),
    /// Saving was requested without any selected signature.
    EmptySelection,
    /// Digital signing was enabled for a signature without an active certificate.
    GateRejection {
        signature_id: Option<i64>,
    },
    UnknownSignature(i64),
    Other(String),
}

impl Error {
    /// Validation errors are reported in place and never reach the network.
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::InvalidForm(_) | Error::EmptySelection)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ReqwestError(err) => write!(f, "HTTP error: {}", err),
            Error::UrlError(err) => write!(f, "URL error: {}", err),
            Error::JsonError(err) => write!(f, "JSON error: {}", err),
            Error::IoError(err) => write!(f, "IO error: {}", err),
            Error::PngError(err) => write!(f, "PNG error: {}", err),
            Error::Api { codigo, mensaje } => {
                write!(f, "Backend rejected the request ({}): {}", codigo, mensaje)
            }
            Error::InvalidForm(errors) => {
                write!(f, "Invalid configuration:")?;
                for error in errors {
                    write!(f, " {};", error)?;
                }
                Ok(())
            }
            Error::EmptySelection => write!(f, "At least one signature must be selected"),
            Error::GateRejection { signature_id } => match signature_id {
                Some(id) => write!(
                    f,
                    "Signature `{}` has no active digital certificate, digital signing can not be enabled",
                    id
                ),
                None => write!(
                    f,
                    "Signature has no active digital certificate, digital signing can not be enabled"
                ),
            },
            Error::UnknownSignature(id) => write!(f, "Signature `{}` is not in the catalog", id),
            Error::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::ReqwestError(err) => Some(err),
            Error::UrlError(err) => Some(err),
            Error::JsonError(err) => Some(err),
            Error::IoError(err) => Some(err),
            Error::PngError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Self::ReqwestError(err)
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Self::UrlError(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::JsonError(err)
    }
}

impl From<String> for Error {
    fn from(err: String) -> Self {
        Self::Other(err)
    }
}
impl From<&str> for Error {
    fn from(err: &str) -> Self {
        Self::Other(err.to_owned())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::IoError(err)
    }
}

impl From<png::DecodingError> for Error {
    fn from(err: png::DecodingError) -> Self {
        Error::PngError(err)
    }
}
