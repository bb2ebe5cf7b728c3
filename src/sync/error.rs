//! Error taxonomy for remote calls and local persistence.

/// Errors produced while talking to the achievement service or reading
/// persisted state.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// No response from the service (DNS, TLS, timeout, non-success status).
    #[error("failed to connect to achievement service: {0}")]
    ConnectFailed(String),

    /// The service rejected the bearer credential.
    #[error("access token rejected by achievement service")]
    AuthFailed,

    /// A remote body or persisted file could not be decoded.
    #[error("malformed achievement data: {0}")]
    ParseFailed(String),

    #[error("local storage error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for SyncError {
    fn from(e: serde_json::Error) -> Self {
        SyncError::ParseFailed(e.to_string())
    }
}

impl From<ureq::Error> for SyncError {
    fn from(e: ureq::Error) -> Self {
        match e {
            ureq::Error::Status(401, _) | ureq::Error::Status(403, _) => SyncError::AuthFailed,
            ureq::Error::Status(code, _) => {
                SyncError::ConnectFailed(format!("service returned status {}", code))
            }
            ureq::Error::Transport(t) => SyncError::ConnectFailed(t.to_string()),
        }
    }
}

impl SyncError {
    /// Short label used in status output and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            SyncError::ConnectFailed(_) => "connect_failed",
            SyncError::AuthFailed => "auth_failed",
            SyncError::ParseFailed(_) => "parse_failed",
            SyncError::Io(_) => "io",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_error_maps_to_parse_failed() {
        let err: SyncError = serde_json::from_str::<Vec<u32>>("not json")
            .unwrap_err()
            .into();
        assert!(matches!(err, SyncError::ParseFailed(_)));
        assert_eq!(err.kind(), "parse_failed");
    }

    #[test]
    fn test_io_error_converts() {
        let err: SyncError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert_eq!(err.kind(), "io");
        assert!(err.to_string().contains("gone"));
    }
}
