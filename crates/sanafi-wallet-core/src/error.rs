use sanafi_services::ServiceError;
use sanafi_session::SessionError;
use sanafi_wizard::{Rejection, WizardError};
use thiserror::Error;

/// Failures a flow reports to the screen that drives it.
///
/// Field-level validation never shows up here; it is the `Blocked` progress of a step.
#[derive(Debug, Error)]
pub enum FlowError {
    /// A business rule refused the input. The user corrects it and resubmits.
    #[error("{0}")]
    Rejected(Rejection),
    /// Generic failure, shown without detail.
    #[error("{message}")]
    Failed { message: String },
    /// The view was dismissed while a call was in flight. Nothing was applied.
    #[error("cancelled")]
    Cancelled,
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Wizard(#[from] WizardError),
}

impl FlowError {
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected(Rejection::new(message))
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
        }
    }

    /// Map a collaborator failure, using `generic` for anything the user cannot act on.
    pub(crate) fn from_service(err: ServiceError, generic: &str) -> Self {
        match err {
            ServiceError::Cancelled => Self::Cancelled,
            ServiceError::Rejected(message) => Self::rejected(message),
            ServiceError::Timeout(_) | ServiceError::Unavailable(_) => Self::failed(generic),
        }
    }

    pub(crate) fn from_session(err: SessionError, generic: &str) -> Self {
        match err {
            SessionError::Service(service) => Self::from_service(service, generic),
            other => Self::Session(other),
        }
    }

    /// Message to put in front of the user, or `None` when nothing should be shown.
    pub fn user_message(&self) -> Option<String> {
        match self {
            Self::Rejected(rejection) => Some(rejection.message.clone()),
            Self::Failed { message } => Some(message.clone()),
            Self::Cancelled => None,
            Self::Session(_) | Self::Wizard(_) => Some("Something went wrong".to_owned()),
        }
    }
}

pub type FlowResult<T> = Result<T, FlowError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn service_failures_collapse_to_the_generic_message() {
        let err = FlowError::from_service(ServiceError::Timeout(Duration::from_secs(1)), "Something went wrong");
        assert_eq!(err.user_message().as_deref(), Some("Something went wrong"));

        let err = FlowError::from_service(ServiceError::Rejected("Scanned code is empty".into()), "x");
        assert!(matches!(err, FlowError::Rejected(_)));
        assert_eq!(err.to_string(), "Scanned code is empty");

        let err = FlowError::from_service(ServiceError::Cancelled, "x");
        assert_eq!(err.user_message(), None);
    }
}
