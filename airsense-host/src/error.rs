use std::fmt;

#[derive(Debug)]
pub enum Error {
    /// Remote store could not be reached or rejected the request
    Network {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
    /// Data serialization/deserialization errors
    Serialization { message: String },
    /// Serial port could not be opened or read
    Connection {
        message: String,
        endpoint: Option<String>,
    },
    /// Settings could not be loaded
    Config { message: String },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn network_with_source<S: Into<String>>(
        message: S,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        Self::Network {
            message: message.into(),
            source: Some(source),
        }
    }

    pub fn serialization<S: Into<String>>(message: S) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    pub fn connection<S: Into<String>>(message: S) -> Self {
        Self::Connection {
            message: message.into(),
            endpoint: None,
        }
    }

    pub fn connection_to<S: Into<String>, E: Into<String>>(message: S, endpoint: E) -> Self {
        Self::Connection {
            message: message.into(),
            endpoint: Some(endpoint.into()),
        }
    }

    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Network { message, .. } => write!(f, "Network error: {}", message),
            Error::Serialization { message } => write!(f, "Serialization error: {}", message),
            Error::Connection { message, endpoint } => {
                if let Some(ep) = endpoint {
                    write!(f, "Connection error to {}: {}", ep, message)
                } else {
                    write!(f, "Connection error: {}", message)
                }
            }
            Error::Config { message } => write!(f, "Configuration error: {}", message),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Network {
                source: Some(source),
                ..
            } => Some(source.as_ref()),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::serialization(err.to_string())
    }
}

impl From<airsense_api::protocols::Error> for Error {
    fn from(err: airsense_api::protocols::Error) -> Self {
        Error::serialization(err.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::network_with_source("HTTP request failed", Box::new(err))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::connection(err.to_string())
    }
}

impl From<serialport::Error> for Error {
    fn from(err: serialport::Error) -> Self {
        Error::connection(err.description)
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::config(err.to_string())
    }
}
