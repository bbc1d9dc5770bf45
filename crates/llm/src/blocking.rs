//! Synchronous calling convention for generation clients.
//!
//! The trait itself is async; callers without a runtime (scripts, sync
//! transports) can use this wrapper, which drives the call to completion
//! on a private current-thread runtime.

use crate::client::{GenClient, GenerateRequest, Generation};
use promptdoc_core::{AppError, AppResult};

/// Perform one generation call synchronously.
///
/// Must not be called from within an async context; use
/// [`GenClient::generate`] directly there.
pub fn generate_blocking(
    client: &dyn GenClient,
    request: &GenerateRequest,
) -> AppResult<Generation> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| AppError::Other(format!("Failed to build runtime: {}", e)))?;

    runtime.block_on(client.generate(request))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::MockClient;

    #[test]
    fn test_blocking_call_with_mock() {
        let client = MockClient::new();
        let generation = generate_blocking(&client, &GenerateRequest::new("hello")).unwrap();
        assert!(generation.text.contains("hello"));
    }
}
