use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::errors::PaymentError;
use crate::wizard::BillingPeriod;

#[derive(Debug, Clone, PartialEq)]
pub struct PaymentRequest {
    pub period: BillingPeriod,
    pub card_last_four: Option<String>,
    pub requested_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PaymentReceipt {
    pub reference: Uuid,
    pub period: BillingPeriod,
    pub requested_at: DateTime<Utc>,
}

/// Backend that charges the subscriber.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn charge(&self, request: PaymentRequest) -> Result<PaymentReceipt, PaymentError>;
}

/// Result the simulated gateway reports after its delay.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum SimulatedOutcome {
    #[default]
    Approve,
    Decline {
        reason: String,
    },
    NetworkFailure {
        reason: String,
    },
}

/// Stand-in for a real processor: waits a fixed delay, then answers.
#[derive(Debug, Clone)]
pub struct SimulatedGateway {
    delay: Duration,
    outcome: SimulatedOutcome,
}

impl SimulatedGateway {
    pub fn new(delay: Duration, outcome: SimulatedOutcome) -> Self {
        Self { delay, outcome }
    }

    pub fn approving(delay: Duration) -> Self {
        Self::new(delay, SimulatedOutcome::Approve)
    }
}

#[async_trait]
impl PaymentGateway for SimulatedGateway {
    async fn charge(&self, request: PaymentRequest) -> Result<PaymentReceipt, PaymentError> {
        debug!(delay_ms = self.delay.as_millis() as u64, "simulating payment round trip");
        tokio::time::sleep(self.delay).await;
        match &self.outcome {
            SimulatedOutcome::Approve => Ok(PaymentReceipt {
                reference: Uuid::new_v4(),
                period: request.period,
                requested_at: request.requested_at,
            }),
            SimulatedOutcome::Decline { reason } => Err(PaymentError::Declined(reason.clone())),
            SimulatedOutcome::NetworkFailure { reason } => {
                Err(PaymentError::Network(reason.clone()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> PaymentRequest {
        PaymentRequest {
            period: BillingPeriod::Monthly,
            card_last_four: Some("4242".into()),
            requested_at: Utc::now(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn approves_after_the_delay() {
        let gateway = SimulatedGateway::approving(Duration::from_millis(2000));
        let started = tokio::time::Instant::now();
        let receipt = gateway.charge(request()).await.expect("approved");
        assert_eq!(receipt.period, BillingPeriod::Monthly);
        assert!(started.elapsed() >= Duration::from_millis(2000));
    }

    #[tokio::test(start_paused = true)]
    async fn declines_with_configured_reason() {
        let gateway = SimulatedGateway::new(
            Duration::from_millis(10),
            SimulatedOutcome::Decline {
                reason: "insufficient funds".into(),
            },
        );
        assert_eq!(
            gateway.charge(request()).await,
            Err(PaymentError::Declined("insufficient funds".into()))
        );
    }

    #[test]
    fn outcome_deserializes_from_tagged_json() {
        let outcome: SimulatedOutcome =
            serde_json::from_str(r#"{"result":"decline","reason":"expired card"}"#).unwrap();
        assert_eq!(
            outcome,
            SimulatedOutcome::Decline {
                reason: "expired card".into()
            }
        );
        let approve: SimulatedOutcome = serde_json::from_str(r#"{"result":"approve"}"#).unwrap();
        assert_eq!(approve, SimulatedOutcome::Approve);
    }
}
