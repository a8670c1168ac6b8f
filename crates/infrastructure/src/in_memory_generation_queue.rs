use std::collections::VecDeque;

use async_trait::async_trait;
use lumina_application::{GenerationRequestSink, GenerationRequestStatus, GenerationTicket};
use lumina_core::{AppError, AppResult};
use lumina_domain::GenerationConfig;
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

/// Requests held before new ones are refused.
pub const DEFAULT_GENERATION_QUEUE_CAPACITY: usize = 256;

/// Bounded in-memory queue of generation requests awaiting a worker.
pub struct InMemoryGenerationQueue {
    capacity: usize,
    pending: Mutex<VecDeque<(String, GenerationConfig)>>,
}

impl InMemoryGenerationQueue {
    /// Creates an empty queue with the default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_GENERATION_QUEUE_CAPACITY)
    }

    /// Creates an empty queue that refuses requests once `capacity` are held.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            pending: Mutex::new(VecDeque::new()),
        }
    }

    /// Maximum number of queued requests.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of queued requests.
    pub async fn len(&self) -> usize {
        self.pending.lock().await.len()
    }

    /// Whether nothing is queued.
    pub async fn is_empty(&self) -> bool {
        self.pending.lock().await.is_empty()
    }

    /// Removes and returns the oldest request.
    pub async fn pop(&self) -> Option<(String, GenerationConfig)> {
        self.pending.lock().await.pop_front()
    }
}

impl Default for InMemoryGenerationQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GenerationRequestSink for InMemoryGenerationQueue {
    async fn enqueue(&self, config: GenerationConfig) -> AppResult<GenerationTicket> {
        let mut pending = self.pending.lock().await;
        if pending.len() >= self.capacity {
            warn!(capacity = self.capacity, "generation queue is full");
            return Err(AppError::Conflict(format!(
                "generation queue is full ({} pending)",
                pending.len()
            )));
        }

        let request_id = Uuid::new_v4().to_string();
        pending.push_back((request_id.clone(), config));
        info!(%request_id, depth = pending.len(), "generation request enqueued");

        Ok(GenerationTicket {
            request_id,
            status: GenerationRequestStatus::Queued,
        })
    }
}

#[cfg(test)]
mod tests {
    use lumina_application::{GenerationRequestSink, GenerationRequestStatus};
    use lumina_core::AppError;
    use lumina_domain::{
        FormModel, GenerationConfig, ValidationResult, generation_fields, validate_model,
    };

    use super::InMemoryGenerationQueue;

    fn config(prompt: &str) -> GenerationConfig {
        let draft = GenerationConfig::default_draft().with(generation_fields::PROMPT, prompt);
        match validate_model::<GenerationConfig>(&draft) {
            Ok(ValidationResult::Valid(config)) => config,
            other => panic!("config should be valid: {other:?}"),
        }
    }

    #[tokio::test]
    async fn requests_are_served_in_arrival_order() {
        let queue = InMemoryGenerationQueue::new();

        let first = queue.enqueue(config("a red fox")).await;
        let _ = queue.enqueue(config("a blue whale")).await;

        let Ok(first) = first else {
            panic!("enqueue should succeed");
        };
        assert_eq!(first.status, GenerationRequestStatus::Queued);
        assert_eq!(queue.len().await, 2);

        let popped = queue.pop().await;
        assert_eq!(
            popped.as_ref().map(|(id, config)| (id.as_str(), config.prompt())),
            Some((first.request_id.as_str(), "a red fox"))
        );
        assert_eq!(queue.len().await, 1);
    }

    #[tokio::test]
    async fn full_queue_refuses_until_a_request_is_taken() {
        let queue = InMemoryGenerationQueue::with_capacity(2);
        assert!(queue.enqueue(config("one")).await.is_ok());
        assert!(queue.enqueue(config("two")).await.is_ok());

        let refused = queue.enqueue(config("three")).await;

        assert!(matches!(refused, Err(AppError::Conflict(_))));
        assert_eq!(queue.len().await, 2);

        assert!(queue.pop().await.is_some());
        assert!(queue.enqueue(config("three")).await.is_ok());
        assert_eq!(queue.len().await, queue.capacity());
    }
}
