//! Bounded worker pool with a per-call deadline for embedding requests
//!
//! Storage calls stay on the caller's thread; only the slow remote call is
//! moved onto the pool. A caller waits at most `timeout` for its own result.

use super::{unavailable, EmbeddingProvider};
use crate::error::{Result, StoreError};
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, warn};

pub struct PooledEmbedder {
    inner: Arc<dyn EmbeddingProvider>,
    pool: ThreadPool,
    timeout: Duration,
}

impl PooledEmbedder {
    pub fn new(inner: Arc<dyn EmbeddingProvider>, workers: usize, timeout: Duration) -> Result<Self> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers.max(1))
            .thread_name(|i| format!("embedding-worker-{}", i))
            .panic_handler(|_| error!("embedding worker panicked"))
            .build()
            .map_err(|e| unavailable("failed to start embedding workers", e))?;

        Ok(Self {
            inner,
            pool,
            timeout,
        })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl EmbeddingProvider for PooledEmbedder {
    fn generate_embedding(&self, texts: &[String]) -> Result<Vec<f64>> {
        let (tx, rx) = mpsc::channel();
        let inner = Arc::clone(&self.inner);
        let texts = texts.to_vec();

        self.pool.spawn(move || {
            // The receiver is gone if the caller already timed out
            let _ = tx.send(inner.generate_embedding(&texts));
        });

        match rx.recv_timeout(self.timeout) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => {
                warn!(model = %self.inner.model_name(), timeout = ?self.timeout, "embedding request timed out");
                Err(StoreError::EmbeddingUnavailable(format!(
                    "timed out after {:?}",
                    self.timeout
                )))
            }
            Err(RecvTimeoutError::Disconnected) => Err(StoreError::EmbeddingUnavailable(
                "embedding worker exited without a result".to_string(),
            )),
        }
    }

    fn model_name(&self) -> &str {
        self.inner.model_name()
    }

    fn check_reachable(&self) -> Result<()> {
        self.inner.check_reachable()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Sleepy {
        delay: Duration,
    }

    impl EmbeddingProvider for Sleepy {
        fn generate_embedding(&self, texts: &[String]) -> Result<Vec<f64>> {
            std::thread::sleep(self.delay);
            Ok(vec![texts.len() as f64])
        }

        fn model_name(&self) -> &str {
            "sleepy"
        }
    }

    struct Broken;

    impl EmbeddingProvider for Broken {
        fn generate_embedding(&self, _texts: &[String]) -> Result<Vec<f64>> {
            Err(StoreError::EmbeddingUnavailable("offline".to_string()))
        }

        fn model_name(&self) -> &str {
            "broken"
        }

        fn check_reachable(&self) -> Result<()> {
            Err(StoreError::EmbeddingUnavailable("down".to_string()))
        }
    }

    #[test]
    fn test_result_passes_through() {
        let pooled = PooledEmbedder::new(
            Arc::new(Sleepy {
                delay: Duration::from_millis(0),
            }),
            1,
            Duration::from_secs(5),
        )
        .unwrap();

        let result = pooled
            .generate_embedding(&["a".to_string(), "b".to_string()])
            .unwrap();
        assert_eq!(result, vec![2.0]);
        assert_eq!(pooled.model_name(), "sleepy");
    }

    #[test]
    fn test_deadline_expiry_is_unavailable() {
        let pooled = PooledEmbedder::new(
            Arc::new(Sleepy {
                delay: Duration::from_millis(500),
            }),
            1,
            Duration::from_millis(20),
        )
        .unwrap();

        let err = pooled.generate_embedding(&["a".to_string()]).unwrap_err();
        assert!(matches!(err, StoreError::EmbeddingUnavailable(ref m) if m.contains("timed out")));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_reachability_delegates() {
        let pooled = PooledEmbedder::new(Arc::new(Broken), 1, Duration::from_secs(1)).unwrap();
        assert!(matches!(
            pooled.check_reachable(),
            Err(StoreError::EmbeddingUnavailable(ref m)) if m == "down"
        ));
    }

    #[test]
    fn test_provider_error_passes_through() {
        let pooled = PooledEmbedder::new(Arc::new(Broken), 2, Duration::from_secs(1)).unwrap();
        assert!(matches!(
            pooled.generate_embedding(&["a".to_string()]),
            Err(StoreError::EmbeddingUnavailable(ref m)) if m == "offline"
        ));
    }
}
