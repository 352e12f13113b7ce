/// Errors from the registry HTTP client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-2xx status.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// The `error` field of the response body, or the raw body.
        message: String,
    },

    /// The response body did not have the expected shape.
    #[error("Unexpected response body: {0}")]
    Decode(String),

    /// The background task owning the coordinator has exited.
    #[error("Coordinator task has stopped")]
    Stopped,
}

impl ClientError {
    /// One-line message suitable for showing next to stale data.
    pub fn short_message(&self) -> String {
        match self {
            ClientError::Transport(_) => "Could not reach the server".to_string(),
            ClientError::Api { message, .. } => message.clone(),
            ClientError::Decode(_) => "Unexpected server response".to_string(),
            ClientError::Stopped => "Search is no longer running".to_string(),
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Decode(err.to_string())
    }
}
