//! The single remote call each network stage makes.
//!
//! Both stages run one call under the caller-side timeout, reject blank
//! replies and record usage the same way; only the error variant that names
//! the stage differs.

use crate::error::{AuditError, ServiceError};
use crate::output::StageUsage;
use crate::services::ServiceReply;
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Await `call` for at most `timeout`.
///
/// Expiry becomes [`ServiceError::Timeout`], empty or whitespace-only text
/// becomes [`ServiceError::EmptyResponse`], and every failure is handed to
/// `wrap` together with the service name.
pub(crate) async fn call_once<F>(
    stage: &str,
    service: &str,
    timeout: Duration,
    call: F,
    wrap: impl FnOnce(String, ServiceError) -> AuditError,
) -> Result<(String, StageUsage), AuditError>
where
    F: Future<Output = Result<ServiceReply, ServiceError>>,
{
    let start = Instant::now();
    let result = match tokio::time::timeout(timeout, call).await {
        Ok(Ok(reply)) if reply.text.trim().is_empty() => Err(ServiceError::EmptyResponse),
        Ok(result) => result,
        Err(_) => Err(ServiceError::Timeout {
            elapsed_ms: timeout.as_millis() as u64,
        }),
    };
    let duration = start.elapsed();

    match result {
        Ok(reply) => {
            debug!(
                "{} ({}): {} input tokens, {} output tokens, {:?}",
                stage, service, reply.input_tokens, reply.output_tokens, duration
            );
            let usage = StageUsage {
                input_tokens: reply.input_tokens,
                output_tokens: reply.output_tokens,
                duration_ms: duration.as_millis() as u64,
            };
            Ok((reply.text, usage))
        }
        Err(source) => {
            warn!("{} ({}) failed: {}", stage, service, source);
            Err(wrap(service.to_string(), source))
        }
    }
}
