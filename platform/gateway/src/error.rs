use thiserror::Error;

pub type GatewayResult<T> = Result<T, GatewayError>;

/// Failures talking to the remote collection. All of them are terminal for the
/// action that triggered the call.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("invalid collection url `{0}`")]
    InvalidUrl(String),
    #[error("{operation}: collection answered {status}")]
    Status { operation: &'static str, status: u16 },
    #[error("{operation}: request failed")]
    Transport {
        operation: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{operation}: unexpected response body")]
    Decode {
        operation: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl GatewayError {
    pub fn status(&self) -> Option<u16> {
        match self {
            GatewayError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}
