//! CompletionClient trait definition

use async_trait::async_trait;

use super::CompletionError;

/// One fully-specified completion call
///
/// Both prompt blocks are rendered before this struct is built; the client
/// adds nothing to them.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// System policy block
    pub system_block: String,

    /// User context document
    pub user_block: String,

    /// Model identifier (e.g. "gpt-4o")
    pub model: String,

    /// Sampling temperature
    pub temperature: f64,

    /// Cap on output tokens
    pub max_output_tokens: u32,
}

/// Stateless completion backend - each call is independent
///
/// This is the single replaceable boundary around the generative service.
/// Implementations must request an object-only response format where the
/// backend supports it, which biases the model toward one well-formed JSON
/// document; the schema validator still has the final word.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Send one completion request and return the raw text of the top
    /// completion, or fail with a [`CompletionError`].
    async fn complete(&self, request: CompletionRequest) -> Result<String, CompletionError>;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tracing::debug;

    /// Scripted completion client for unit tests
    pub struct MockCompletionClient {
        responses: Mutex<Vec<Result<String, CompletionError>>>,
        call_count: AtomicUsize,
    }

    impl MockCompletionClient {
        /// Client that returns the given raw texts in order
        pub fn new(responses: Vec<String>) -> Self {
            debug!(response_count = %responses.len(), "MockCompletionClient::new: called");
            Self {
                responses: Mutex::new(responses.into_iter().map(Ok).collect()),
                call_count: AtomicUsize::new(0),
            }
        }

        /// Client whose single call fails with the given error
        pub fn failing(error: CompletionError) -> Self {
            Self {
                responses: Mutex::new(vec![Err(error)]),
                call_count: AtomicUsize::new(0),
            }
        }

        pub fn call_count(&self) -> usize {
            self.call_count.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CompletionClient for MockCompletionClient {
        async fn complete(&self, _request: CompletionRequest) -> Result<String, CompletionError> {
            let idx = self.call_count.fetch_add(1, Ordering::SeqCst);
            debug!(%idx, "MockCompletionClient::complete: called");
            let mut responses = self.responses.lock().unwrap();
            if idx >= responses.len() {
                return Err(CompletionError::EmptyResponse);
            }
            // Errors are not Clone, so hand out each scripted entry once
            std::mem::replace(&mut responses[idx], Err(CompletionError::EmptyResponse))
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        fn request() -> CompletionRequest {
            CompletionRequest {
                system_block: "policy".to_string(),
                user_block: "context".to_string(),
                model: "gpt-4o".to_string(),
                temperature: 0.3,
                max_output_tokens: 2000,
            }
        }

        #[tokio::test]
        async fn test_mock_returns_responses_in_order() {
            let client = MockCompletionClient::new(vec!["one".to_string(), "two".to_string()]);

            assert_eq!(client.complete(request()).await.unwrap(), "one");
            assert_eq!(client.complete(request()).await.unwrap(), "two");
            assert_eq!(client.call_count(), 2);
        }

        #[tokio::test]
        async fn test_mock_failing_client() {
            let client = MockCompletionClient::failing(CompletionError::EmptyResponse);
            let result = client.complete(request()).await;
            assert!(matches!(result, Err(CompletionError::EmptyResponse)));
        }
    }
}
