use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::types::Field;

#[derive(Debug)]
pub enum Error {
    MissingField(Field),
    InvalidValue(String),
    ConfigFileNotFound(PathBuf),
    ConfigParse(String),
    IoError(std::io::Error),
    ApiError { message: String, body: String },
    ZoneNotFound { site: String, body: String },
    PurgeFailed { zone: String, body: String },
    Transport(String),
    Timeout(Duration),
}

impl Error {
    /// Process exit status for this error. Usage errors (2) are reported by clap.
    pub fn exit_code(&self) -> u8 {
        match self {
            Error::MissingField(_) | Error::InvalidValue(_) => 3,
            Error::ConfigFileNotFound(_) | Error::ConfigParse(_) | Error::IoError(_) => 4,
            Error::ApiError { .. } | Error::ZoneNotFound { .. } | Error::PurgeFailed { .. } => 5,
            Error::Transport(_) | Error::Timeout(_) => 6,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::MissingField(field) => write!(
                f,
                "Missing {}: pass {} or set {}",
                field.describe(),
                field.flag(),
                field.key()
            ),
            Error::InvalidValue(msg) => write!(f, "Invalid configuration value: {}", msg),
            Error::ConfigFileNotFound(path) => {
                write!(f, "Config file not found: {}", path.display())
            }
            Error::ConfigParse(msg) => write!(f, "Configuration parse error: {}", msg),
            Error::IoError(err) => write!(f, "IO error: {}", err),
            Error::ApiError { message, body } => {
                write!(f, "Cloudflare API error: {}\n{}", message, body)
            }
            Error::ZoneNotFound { site, body } => {
                write!(f, "No active zone found for site '{}'\n{}", site, body)
            }
            Error::PurgeFailed { zone, body } => {
                write!(f, "Cache purge failed for zone {}\n{}", zone, body)
            }
            Error::Transport(msg) => write!(f, "Network error: {}", msg),
            Error::Timeout(after) => {
                write!(f, "Request timed out after {:?}", after)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::IoError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::IoError(err)
    }
}

impl From<dotenvy::Error> for Error {
    fn from(err: dotenvy::Error) -> Self {
        match err {
            dotenvy::Error::Io(io) => Error::IoError(io),
            other => Error::ConfigParse(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
