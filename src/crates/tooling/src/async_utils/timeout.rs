//! Timeout wrapper for async operations

use std::future::Future;
use std::time::Duration;
use tokio::time::timeout as tokio_timeout;

/// Execute an async operation with a timeout
///
/// # Example
///
/// ```rust,ignore
/// use tooling::async_utils::timeout::with_timeout;
/// use std::time::Duration;
///
/// let result = with_timeout(Duration::from_secs(1), slow_operation()).await;
/// assert!(result.is_err());
/// ```
pub async fn with_timeout<F, T, E>(
    duration: Duration,
    operation: F,
) -> std::result::Result<T, TimeoutError<E>>
where
    F: Future<Output = std::result::Result<T, E>>,
{
    match tokio_timeout(duration, operation).await {
        Ok(Ok(result)) => Ok(result),
        Ok(Err(error)) => Err(TimeoutError::OperationFailed(error)),
        Err(_elapsed) => Err(TimeoutError::Timeout(duration)),
    }
}

/// Error type for timeout operations
#[derive(Debug)]
pub enum TimeoutError<E> {
    /// Operation completed but failed
    OperationFailed(E),
    /// Operation timed out
    Timeout(Duration),
}

impl<E> TimeoutError<E> {
    /// Whether the deadline elapsed before the operation finished
    pub fn is_timeout(&self) -> bool {
        matches!(self, TimeoutError::Timeout(_))
    }

    /// Unwrap the inner operation error, if there is one
    pub fn into_inner(self) -> Option<E> {
        match self {
            TimeoutError::OperationFailed(e) => Some(e),
            TimeoutError::Timeout(_) => None,
        }
    }
}

impl<E: std::fmt::Display> std::fmt::Display for TimeoutError<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimeoutError::OperationFailed(e) => write!(f, "Operation failed: {}", e),
            TimeoutError::Timeout(d) => write!(f, "Operation timed out after {:?}", d),
        }
    }
}

impl<E: std::error::Error + 'static> std::error::Error for TimeoutError<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TimeoutError::OperationFailed(e) => Some(e),
            TimeoutError::Timeout(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_with_timeout_success() {
        let result = with_timeout(Duration::from_millis(100), async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            Ok::<_, String>("parsed")
        })
        .await;

        assert_eq!(result.unwrap(), "parsed");
    }

    #[tokio::test]
    async fn test_with_timeout_exceeded() {
        let result = with_timeout(Duration::from_millis(10), async {
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok::<_, String>("too late")
        })
        .await;

        let err = result.unwrap_err();
        assert!(err.is_timeout());
        assert!(err.to_string().contains("timed out"));
    }

    #[tokio::test]
    async fn test_with_timeout_operation_failed() {
        let result = with_timeout(Duration::from_millis(100), async {
            Err::<(), _>("malformed JSON".to_string())
        })
        .await;

        let err = result.unwrap_err();
        assert!(!err.is_timeout());
        assert_eq!(err.into_inner(), Some("malformed JSON".to_string()));
    }
}
