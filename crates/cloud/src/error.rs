//! Errors from third-party integrations.

/// Failure talking to an external provider.
#[derive(Debug, thiserror::Error)]
pub enum CloudError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider returned a non-2xx status code.
    #[error("{provider} API error ({status}): {body}")]
    Api {
        provider: &'static str,
        status: u16,
        body: String,
    },

    /// Object storage rejected or failed the upload.
    #[error("Storage error: {0}")]
    Storage(String),

    /// The provider answered, but not with anything usable.
    #[error("Invalid response from {provider}: {message}")]
    InvalidResponse {
        provider: &'static str,
        message: String,
    },

    /// The integration has no credentials configured.
    #[error("{0} is not configured")]
    NotConfigured(&'static str),
}

impl CloudError {
    /// Whether the failure happened on the provider's side (as opposed to
    /// this service being misconfigured or misreading a response).
    pub fn is_upstream(&self) -> bool {
        matches!(self, Self::Request(_) | Self::Api { .. } | Self::Storage(_))
    }
}

/// Turn a non-2xx response into [`CloudError::Api`], passing successes through.
pub(crate) async fn ensure_success(
    provider: &'static str,
    response: reqwest::Response,
) -> Result<reqwest::Response, CloudError> {
    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        return Err(CloudError::Api {
            provider,
            status: status.as_u16(),
            body,
        });
    }
    Ok(response)
}
