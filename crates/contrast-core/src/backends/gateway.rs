//! Model gateway with single-hop failover across backends

use anyhow::{Result, anyhow};
use tracing::{debug, info, warn};

use super::types::{ChatBackend, ChatMessage, CompletionOptions};

/// Routes completion requests across backends, trying each once in order.
///
/// This is a best-effort selection, not a retry policy: every backend gets
/// exactly one attempt per request, and the last error is surfaced when the
/// whole chain is exhausted.
pub struct ModelGateway {
    /// Backends in failover order (index 0 = primary)
    backends: Vec<Box<dyn ChatBackend>>,
}

impl ModelGateway {
    /// Create a gateway from an ordered backend list.
    /// Fails if the list is empty so that misconfiguration is caught at
    /// startup rather than on the first request.
    pub fn new(backends: Vec<Box<dyn ChatBackend>>) -> Result<Self> {
        if backends.is_empty() {
            return Err(anyhow!("no available backend: configure at least one provider"));
        }
        Ok(Self { backends })
    }

    /// Send a completion request, falling through to the next backend on error
    pub async fn complete(
        &self,
        messages: &[ChatMessage],
        options: &CompletionOptions,
    ) -> Result<String> {
        let mut last_error = None;

        for (idx, backend) in self.backends.iter().enumerate() {
            debug!(
                "Trying backend {} ({}) [{}/{}]",
                backend.backend_name(),
                backend.model(),
                idx + 1,
                self.backends.len(),
            );

            match backend.complete(messages, options).await {
                Ok(text) => {
                    if idx > 0 {
                        info!(
                            "Request succeeded on failover backend {} ({})",
                            backend.backend_name(),
                            backend.model()
                        );
                    }
                    return Ok(text);
                }
                Err(e) => {
                    warn!(
                        "Backend {} ({}) failed: {}",
                        backend.backend_name(),
                        backend.model(),
                        e,
                    );
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| anyhow!("no available backend")))
    }

    /// Primary backend's name
    pub fn backend_name(&self) -> &str {
        self.backends
            .first()
            .map(|b| b.backend_name())
            .unwrap_or("unknown")
    }

    /// Primary backend's model name
    pub fn model(&self) -> &str {
        self.backends
            .first()
            .map(|b| b.model())
            .unwrap_or("unknown")
    }

    /// Number of configured backends
    pub fn backend_count(&self) -> usize {
        self.backends.len()
    }
}
