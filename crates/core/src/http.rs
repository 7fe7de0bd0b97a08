use anyhow::Context;
use std::future::Future;
use std::time::Duration;

pub fn build_client(timeout_secs: u64, what: &str) -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .with_context(|| format!("failed to build {what} http client"))
}

/// Runs `op` up to `attempts` times with exponential backoff (1s, 2s, 4s, ...).
pub async fn with_retries<T, F, Fut>(attempts: u32, what: &str, mut op: F) -> anyhow::Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = anyhow::Result<T>>,
{
    let attempts = attempts.max(1);
    let mut attempt: u32 = 0;
    loop {
        attempt += 1;
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if attempt >= attempts {
                    return Err(err);
                }
                let backoff = Duration::from_secs(1 << (attempt - 1).min(5));
                tracing::warn!(attempt, ?backoff, error = %err, "{what} failed; retrying");
                tokio::time::sleep(backoff).await;
            }
        }
    }
}

pub fn join_url(base_url: &str, path: &str) -> String {
    let path = path.trim_start_matches('/');
    format!("{}/{}", base_url.trim_end_matches('/'), path)
}
