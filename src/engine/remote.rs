//! Remote decision-point client
//!
//! POSTs the wire input to the configured sidecar and applies the
//! fail-open/fail-closed policy when the sidecar cannot answer. Health is
//! a single atomic flag: any transport failure marks the backend
//! unreachable, the next successful call marks it healthy again.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{debug, warn};

use crate::engine::{REASON_UNREACHABLE, REASON_UNREACHABLE_FAIL_OPEN};
use crate::error::Result;
use crate::types::{DecideInput, Decision};

/// Deny reason used when the sidecar denies without explaining itself
const REASON_REMOTE_DENY: &str = "denied by decision point";

#[derive(Serialize)]
struct DecideRequest<'a> {
    input: &'a DecideInput,
}

#[derive(Deserialize)]
struct DecideResponse {
    result: bool,
    #[serde(default)]
    reasons: Vec<String>,
}

/// HTTP client for a remote decision point
#[derive(Debug)]
pub struct RemoteClient {
    client: reqwest::Client,
    url: String,
    fail_open: bool,
    healthy: AtomicBool,
}

impl RemoteClient {
    /// Build a client with the call timeout baked into the reqwest client,
    /// so an in-flight call can never outlive the configured bound
    pub fn new(url: impl Into<String>, timeout: Duration, fail_open: bool) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
            fail_open,
            healthy: AtomicBool::new(true),
        })
    }

    /// Ask the decision point for a verdict
    ///
    /// Timeouts, transport errors, non-2xx statuses, and unparseable
    /// bodies all resolve to the fail-open/fail-closed default; they are
    /// never surfaced as hard errors.
    pub async fn decide(&self, input: &DecideInput) -> Decision {
        let response = self
            .client
            .post(&self.url)
            .json(&DecideRequest { input })
            .send()
            .await;

        let parsed = match response {
            Ok(resp) => match resp.error_for_status() {
                Ok(resp) => resp.json::<DecideResponse>().await,
                Err(err) => Err(err),
            },
            Err(err) => Err(err),
        };

        match parsed {
            Ok(body) => {
                self.healthy.store(true, Ordering::Relaxed);
                debug!(url = %self.url, result = body.result, "decision point answered");
                if body.result {
                    Decision::allow()
                } else if body.reasons.is_empty() {
                    Decision::deny(REASON_REMOTE_DENY)
                } else {
                    Decision::deny_all(body.reasons)
                }
            }
            Err(err) => {
                self.healthy.store(false, Ordering::Relaxed);
                warn!(url = %self.url, error = %err, "decision point unreachable");
                self.unreachable_decision()
            }
        }
    }

    /// Verdict applied while the decision point cannot answer
    pub fn unreachable_decision(&self) -> Decision {
        if self.fail_open {
            Decision {
                allowed: true,
                reasons: vec![REASON_UNREACHABLE_FAIL_OPEN.to_string()],
            }
        } else {
            Decision::deny(REASON_UNREACHABLE)
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.healthy.load(Ordering::Relaxed)
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Principal;

    #[tokio::test]
    async fn transport_failure_fails_closed_by_default() {
        // reserved port, nothing listening
        let client = RemoteClient::new(
            "http://127.0.0.1:9/decide",
            Duration::from_millis(200),
            false,
        )
        .unwrap();

        let input = DecideInput::new(Principal::new("user:alice", ["admin"]), "tasks:read");
        let decision = client.decide(&input).await;

        assert!(!decision.allowed);
        assert_eq!(decision.reasons, vec![REASON_UNREACHABLE.to_string()]);
        assert!(!client.is_healthy());
    }

    #[tokio::test]
    async fn transport_failure_fails_open_when_configured() {
        let client = RemoteClient::new(
            "http://127.0.0.1:9/decide",
            Duration::from_millis(200),
            true,
        )
        .unwrap();

        let input = DecideInput::new(Principal::new("user:alice", ["viewer"]), "tasks:read");
        let decision = client.decide(&input).await;

        assert!(decision.allowed);
        assert_eq!(
            decision.reasons,
            vec![REASON_UNREACHABLE_FAIL_OPEN.to_string()]
        );
        assert!(!client.is_healthy());
    }
}
