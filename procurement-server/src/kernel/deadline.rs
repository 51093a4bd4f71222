use {
    crate::api::RestError,
    std::{
        future::Future,
        time::Duration,
    },
};

/// Runs `fut` with an upper bound on its duration.
///
/// When the bound is hit the future is dropped, which also drops any transaction it holds, so the
/// pending writes are rolled back.
pub async fn with_deadline<T, F>(timeout: Duration, fut: F) -> Result<T, RestError>
where
    F: Future<Output = Result<T, RestError>>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(timeout = ?timeout, "Request deadline exceeded");
            Err(RestError::Timeout)
        }
    }
}
