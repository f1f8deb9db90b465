//! Error types for the incident store

/// Incident store errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Malformed incident rejected at ingestion, never stored
    #[error("validation failed: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_error_display() {
        let err = StoreError::Validation("empty alert name".to_string());
        assert!(err.to_string().contains("validation failed"));
    }
}
