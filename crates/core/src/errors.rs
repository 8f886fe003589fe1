use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("unknown channel `{0}` (expected web|sms|voice)")]
    UnknownChannel(String),
    #[error("query must not be empty")]
    EmptyQuery,
    #[error("invalid coordinates: {0}")]
    InvalidCoordinates(String),
}

/// Failure of one call to an external provider.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ProviderError {
    #[error("{provider}: transport failure: {message}")]
    Transport { provider: String, message: String },
    #[error("{provider}: unexpected status {status}: {message}")]
    Status { provider: String, status: u16, message: String },
    #[error("{provider}: could not decode response: {message}")]
    Decode { provider: String, message: String },
    #[error("{provider}: request timed out")]
    Timeout { provider: String },
    #[error("{provider}: operation `{operation}` is not supported")]
    Unsupported { provider: String, operation: String },
}

impl ProviderError {
    pub fn provider(&self) -> &str {
        match self {
            Self::Transport { provider, .. }
            | Self::Status { provider, .. }
            | Self::Decode { provider, .. }
            | Self::Timeout { provider }
            | Self::Unsupported { provider, .. } => provider,
        }
    }

    pub fn transport(provider: &str, message: impl Into<String>) -> Self {
        Self::Transport { provider: provider.to_string(), message: message.into() }
    }

    pub fn decode(provider: &str, message: impl Into<String>) -> Self {
        Self::Decode { provider: provider.to_string(), message: message.into() }
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum PublishError {
    #[error("no publish destination is configured")]
    NoDestination,
    #[error("every publish destination failed ({attempts} attempted)")]
    Exhausted { attempts: usize },
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RenderError {
    #[error("template `{0}` is not registered")]
    UnknownTemplate(String),
    #[error("template `{template}` failed to render: {message}")]
    Template { template: String, message: String },
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("resource not found: {0}")]
    NotFound(String),
    #[error("configuration failure: {0}")]
    Configuration(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InterfaceError {
    #[error("bad request: {message}")]
    BadRequest { message: String, correlation_id: String },
    #[error("not found: {message}")]
    NotFound { message: String, correlation_id: String },
    #[error("service unavailable: {message}")]
    ServiceUnavailable { message: String, correlation_id: String },
    #[error("internal error: {message}")]
    Internal { message: String, correlation_id: String },
}

impl InterfaceError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::BadRequest { .. } => {
                "The request could not be processed. Check inputs and try again."
            }
            Self::NotFound { .. } => "Nothing is stored under that name.",
            Self::ServiceUnavailable { .. } => {
                "The service is temporarily unavailable. Please retry shortly."
            }
            Self::Internal { .. } => "An unexpected internal error occurred.",
        }
    }

    pub fn correlation_id(&self) -> &str {
        match self {
            Self::BadRequest { correlation_id, .. }
            | Self::NotFound { correlation_id, .. }
            | Self::ServiceUnavailable { correlation_id, .. }
            | Self::Internal { correlation_id, .. } => correlation_id,
        }
    }
}

impl ApplicationError {
    pub fn into_interface(self, correlation_id: impl Into<String>) -> InterfaceError {
        let correlation_id = correlation_id.into();
        let mut mapped = InterfaceError::from(self);
        match &mut mapped {
            InterfaceError::BadRequest { correlation_id: id, .. }
            | InterfaceError::NotFound { correlation_id: id, .. }
            | InterfaceError::ServiceUnavailable { correlation_id: id, .. }
            | InterfaceError::Internal { correlation_id: id, .. } => *id = correlation_id,
        }
        mapped
    }
}

impl From<ApplicationError> for InterfaceError {
    fn from(value: ApplicationError) -> Self {
        let correlation_id = "unassigned".to_owned();
        match value {
            ApplicationError::Domain(error) => {
                Self::BadRequest { message: error.to_string(), correlation_id }
            }
            ApplicationError::NotFound(message) => Self::NotFound { message, correlation_id },
            ApplicationError::Provider(error) => {
                Self::ServiceUnavailable { message: error.to_string(), correlation_id }
            }
            ApplicationError::Render(error) => {
                Self::Internal { message: error.to_string(), correlation_id }
            }
            ApplicationError::Configuration(message) => Self::Internal { message, correlation_id },
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::errors::{ApplicationError, DomainError, InterfaceError, ProviderError};

    #[test]
    fn domain_error_maps_to_bad_request_interface_error() {
        let interface = ApplicationError::from(DomainError::UnknownChannel("fax".to_owned()))
            .into_interface("req-1");

        assert!(matches!(
            interface,
            InterfaceError::BadRequest {
                ref correlation_id,
                ..
            } if correlation_id == "req-1"
        ));
        assert_eq!(
            interface.user_message(),
            "The request could not be processed. Check inputs and try again."
        );
    }

    #[test]
    fn provider_error_maps_to_service_unavailable() {
        let interface = ApplicationError::from(ProviderError::Timeout { provider: "s3".to_owned() })
            .into_interface("req-2");

        assert!(matches!(interface, InterfaceError::ServiceUnavailable { .. }));
        assert_eq!(interface.correlation_id(), "req-2");
    }

    #[test]
    fn missing_artifact_maps_to_not_found() {
        let interface =
            ApplicationError::NotFound("wren-photo-1.html".to_owned()).into_interface("req-3");

        assert!(matches!(interface, InterfaceError::NotFound { .. }));
        assert_eq!(interface.user_message(), "Nothing is stored under that name.");
    }

    #[test]
    fn provider_errors_name_their_provider() {
        let error = ProviderError::transport("flickr", "connection reset");
        assert_eq!(error.provider(), "flickr");
        assert_eq!(error.to_string(), "flickr: transport failure: connection reset");
    }
}
