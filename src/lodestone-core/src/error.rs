//! Error types shared by the request, decode and transport layers.

/// Every failure a Lodestone operation can return.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Rejected before any network activity.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Transport failure: {0}")]
    Transport(#[from] std::io::Error),

    #[error("Server error: {status} - {message}")]
    Server { status: u16, message: String },

    #[error("Invalid response from server: {0}")]
    InvalidResponse(String),

    /// Response bytes were not JSON of the expected shape. `body` holds an
    /// excerpt of the payload.
    #[error("Failed to decode response: {source} (body: {body})")]
    Decode {
        #[source]
        source: serde_json::Error,
        body: String,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The engine answered successfully at the HTTP level but embedded an
    /// error in the payload.
    #[error("Search engine error: {0}")]
    Engine(String),
}

impl Error {
    /// True for connection errors, non-2xx statuses and unparseable HTTP.
    pub fn is_transport_failure(&self) -> bool {
        matches!(
            self,
            Error::Transport(_) | Error::Server { .. } | Error::InvalidResponse(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_failure_class() {
        let io = Error::from(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "refused",
        ));
        assert!(io.is_transport_failure());

        let server = Error::Server {
            status: 503,
            message: "unavailable".to_string(),
        };
        assert!(server.is_transport_failure());
        assert_eq!(server.to_string(), "Server error: 503 - unavailable");

        assert!(!Error::Engine("boom".to_string()).is_transport_failure());
        assert!(!Error::InvalidArgument("blank".to_string()).is_transport_failure());
    }
}
