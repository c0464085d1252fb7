//! Shared HTTP plumbing for the remote providers

use crate::LlmError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};

/// Build a reqwest client with a request timeout
pub(crate) fn build_client(timeout_secs: u64) -> Result<reqwest::Client, LlmError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| LlmError::Configuration(format!("Failed to build HTTP client: {}", e)))
}

/// POST a JSON body and decode the JSON reply, retrying transient failures
///
/// Retries use exponential backoff (1s, 2s, 4s, ...). A 404 means the model
/// is missing and a 401/403 means the credential is wrong; neither is retried.
pub(crate) async fn post_json<B, R>(
    client: &reqwest::Client,
    url: &str,
    bearer: Option<&str>,
    body: &B,
    max_retries: u32,
    model: &str,
) -> Result<R, LlmError>
where
    B: Serialize + ?Sized,
    R: DeserializeOwned,
{
    let max_attempts = max_retries.max(1);
    let mut attempts = 0;
    let mut last_error = None;

    while attempts < max_attempts {
        let mut request = client.post(url).json(body);
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }

        match request.send().await {
            Ok(response) => {
                let status = response.status();
                if status.is_success() {
                    return response.json::<R>().await.map_err(|e| {
                        LlmError::InvalidResponse(format!("Failed to parse response: {}", e))
                    });
                }

                if status == reqwest::StatusCode::NOT_FOUND {
                    return Err(LlmError::ModelNotAvailable(model.to_string()));
                }

                let error_text = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".to_string());

                if status == reqwest::StatusCode::UNAUTHORIZED
                    || status == reqwest::StatusCode::FORBIDDEN
                {
                    return Err(LlmError::Communication(format!(
                        "HTTP {}: {}",
                        status, error_text
                    )));
                }

                last_error = Some(if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                    LlmError::RateLimitExceeded
                } else {
                    LlmError::Communication(format!("HTTP {}: {}", status, error_text))
                });
            }
            Err(e) => {
                last_error = Some(LlmError::Communication(format!("Request failed: {}", e)));
            }
        }

        attempts += 1;
        if attempts < max_attempts {
            let delay = Duration::from_secs(2u64.pow(attempts - 1));
            warn!(
                "Request to {} failed (attempt {}/{}), retrying in {:?}",
                url, attempts, max_attempts, delay
            );
            tokio::time::sleep(delay).await;
        }
    }

    debug!("Giving up on {} after {} attempts", url, attempts);
    Err(last_error.unwrap_or_else(|| LlmError::Communication("Max retries exceeded".to_string())))
}

/// Trim generated text and reject empty output
pub(crate) fn non_empty(text: &str) -> Result<String, LlmError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(LlmError::InvalidResponse("Model returned empty text".to_string()));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_empty_trims() {
        assert_eq!(non_empty("  id: x \n").unwrap(), "id: x");
    }

    #[test]
    fn test_non_empty_rejects_blank() {
        assert!(matches!(non_empty(" \n\t"), Err(LlmError::InvalidResponse(_))));
    }
}
