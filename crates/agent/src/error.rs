use thiserror::Error;
use wren_core::errors::ProviderError;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("query pattern failed to compile: {0}")]
    Pattern(#[from] regex::Error),
}

/// A provider failure tagged with the operation that was running.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{operation} failed: {source}")]
pub struct DispatchError {
    pub operation: &'static str,
    #[source]
    pub source: ProviderError,
}

pub(crate) trait DuringOperation<T> {
    fn during(self, operation: &'static str) -> Result<T, DispatchError>;
}

impl<T> DuringOperation<T> for Result<T, ProviderError> {
    fn during(self, operation: &'static str) -> Result<T, DispatchError> {
        self.map_err(|source| DispatchError { operation, source })
    }
}
