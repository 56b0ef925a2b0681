use thiserror::Error;

/// Errors returned by the batcher.
///
/// `InputInvalid` and `Closed` are only ever returned from [`crate::Batcher::add`]
/// and are fatal to that single call, never to the engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// The submitted item reported itself as empty; nothing was enqueued.
    #[error("input is empty")]
    InputInvalid,

    /// `close` has begun or completed; nothing was enqueued.
    #[error("batch channel is closed")]
    Closed,

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl Error {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Error::Configuration {
            message: msg.into(),
        }
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, Error::Closed)
    }

    pub fn is_input_invalid(&self) -> bool {
        matches!(self, Error::InputInvalid)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::configuration(format!("invalid JSON options: {}", e))
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(e: serde_yaml::Error) -> Self {
        Error::configuration(format!("invalid YAML options: {}", e))
    }
}
