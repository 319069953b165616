use entity::Estado;
use platform_gateway::GatewayError;
use thiserror::Error;

/// Rejections raised locally, before anything is written to the collection.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("all fields are required (missing: {})", .0.join(", "))]
    MissingFields(Vec<&'static str>),
    #[error("user id {0} already exists; choose a unique id")]
    DuplicateId(String),
    #[error("user name {0} is already taken")]
    DuplicateName(String),
}

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("network error: {0}")]
    Network(#[from] GatewayError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("user {0} is not in the loaded list")]
    UnknownUser(String),
    #[error("user {id} is already {estado}")]
    DeactivationDisabled { id: String, estado: Estado },
    #[error("no create or edit form is open")]
    NoActiveForm,
    #[error("no deactivation is waiting for confirmation")]
    NoPendingDeactivation,
}

impl DirectoryError {
    pub fn code(&self) -> &'static str {
        match self {
            DirectoryError::Network(_) => "NETWORK",
            DirectoryError::Validation(_) => "VALIDATION",
            DirectoryError::UnknownUser(_) => "UNKNOWN_USER",
            DirectoryError::DeactivationDisabled { .. } => "DEACTIVATION_DISABLED",
            DirectoryError::NoActiveForm => "NO_ACTIVE_FORM",
            DirectoryError::NoPendingDeactivation => "NO_PENDING_DEACTIVATION",
        }
    }

    pub fn validation(&self) -> Option<&ValidationError> {
        match self {
            DirectoryError::Validation(err) => Some(err),
            _ => None,
        }
    }
}
