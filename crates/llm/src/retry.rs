//! Bounded retry with exponential backoff for provider calls.

use promptdoc_core::{AppError, AppResult};
use std::future::Future;
use std::time::Duration;

/// Run `op` up to `1 + retries` times, sleeping `backoff_secs * 2^attempt`
/// seconds between attempts.
///
/// The sleep uses `tokio::time::sleep`, so cancellation of the surrounding
/// future cancels the backoff too. When the final attempt fails, the last
/// error is surfaced as [`AppError::Generation`], never silently swallowed.
pub async fn with_backoff<T, F, Fut>(retries: u32, backoff_secs: f64, mut op: F) -> AppResult<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, String>>,
{
    let mut last_error = String::new();

    for attempt in 0..=retries {
        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(e) => {
                last_error = e;
                if attempt < retries {
                    let delay = backoff_secs * 2f64.powi(attempt as i32);
                    tracing::warn!(
                        "Generation attempt {} failed, retrying in {:.1}s: {}",
                        attempt + 1,
                        delay,
                        last_error
                    );
                    tokio::time::sleep(Duration::from_secs_f64(delay)).await;
                }
            }
        }
    }

    Err(AppError::Generation(format!(
        "All {} attempts failed, last error: {}",
        retries + 1,
        last_error
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn test_first_attempt_success() {
        let result = with_backoff(3, 0.0, |_| async { Ok::<_, String>(42) }).await;
        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_recovers_after_failure() {
        let attempts = AtomicU32::new(0);
        let result = with_backoff(3, 0.0, |_| {
            let n = attempts.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err("transient".to_string())
                } else {
                    Ok("ok")
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), "ok");
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_exhaustion_surfaces_last_error() {
        let attempts = AtomicU32::new(0);
        let result: AppResult<()> = with_backoff(2, 0.0, |_| {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Err("boom".to_string()) }
        })
        .await;

        // One initial attempt plus two retries
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
        match result {
            Err(AppError::Generation(msg)) => assert!(msg.contains("boom")),
            other => panic!("Expected Generation error, got {:?}", other),
        }
    }
}
