use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    /// Invalid or missing profile/layout parameters, raised while building devices.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// A tick produced a non-finite value.
    #[error("computation error: {0}")]
    Computation(String),
}

impl SimError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn computation(message: impl Into<String>) -> Self {
        Self::Computation(message.into())
    }
}

pub type SimResult<T> = Result<T, SimError>;
