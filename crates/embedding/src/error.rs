use thiserror::Error;

/// Errors surfaced by the embedding client.
#[derive(Debug, Clone, Error)]
pub enum EmbeddingError {
    /// Configuration is inconsistent (e.g., empty project id).
    #[error("invalid embedding config: {0}")]
    InvalidConfig(String),
    /// The prediction request could not be sent or the endpoint answered with a non-success status.
    #[error("prediction request failed: {0}")]
    Request(String),
    /// The endpoint answered, but the body did not carry the expected vectors.
    #[error("malformed prediction response: {0}")]
    Response(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_carry_context() {
        let err = EmbeddingError::InvalidConfig("project must not be empty".into());
        assert!(err.to_string().contains("invalid embedding config"));
        assert!(err.to_string().contains("project must not be empty"));

        let err = EmbeddingError::Request("HTTP error 503".into());
        assert!(err.to_string().contains("prediction request failed"));

        let err = EmbeddingError::Response("missing `predictions`".into());
        assert!(err.to_string().contains("malformed prediction response"));
    }

    #[test]
    fn error_clone_preserves_message() {
        let err = EmbeddingError::Response("no textEmbedding".into());
        let cloned = err.clone();
        assert_eq!(format!("{err}"), format!("{cloned}"));
    }
}
