//! Payment step: locks the submit control, charges through a
//! [`PaymentGateway`] and settles the wizard on the outcome.

mod billing;
mod gateway;

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::clock::Clock;
use crate::errors::{CheckoutError, PaymentError, Result};
use crate::notifications::{NotificationKind, Notifier};
use crate::ui::UiTree;
use crate::wizard::{WizardController, WizardStep};

pub use billing::{format_long_date, next_billing_date};
pub use gateway::{
    PaymentGateway, PaymentReceipt, PaymentRequest, SimulatedGateway, SimulatedOutcome,
};

/// Labels of the complete-payment control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonLabels {
    pub idle: String,
    pub processing: String,
}

impl Default for ButtonLabels {
    fn default() -> Self {
        Self {
            idle: "Complete Payment".into(),
            processing: "Processing...".into(),
        }
    }
}

/// Payment accepted by [`PaymentProcessor::begin`] and not yet settled.
#[derive(Debug, Clone, PartialEq)]
pub struct InFlightPayment {
    pub request: PaymentRequest,
    pub invoked_on: NaiveDate,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PaymentSettlement {
    Confirmed {
        receipt: PaymentReceipt,
        next_billing: Option<NaiveDate>,
    },
    Failed(PaymentError),
}

pub struct PaymentProcessor {
    ui: Arc<dyn UiTree>,
    notifier: Notifier,
    clock: Arc<dyn Clock>,
    labels: ButtonLabels,
    in_flight: Option<InFlightPayment>,
}

impl PaymentProcessor {
    pub fn new(
        ui: Arc<dyn UiTree>,
        notifier: Notifier,
        clock: Arc<dyn Clock>,
        labels: ButtonLabels,
    ) -> Self {
        Self {
            ui,
            notifier,
            clock,
            labels,
            in_flight: None,
        }
    }

    pub fn is_processing(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn in_flight(&self) -> Option<&InFlightPayment> {
        self.in_flight.as_ref()
    }

    /// Locks the control and builds the request to hand to the gateway.
    pub fn begin(
        &mut self,
        wizard: &WizardController,
        card_last_four: Option<String>,
    ) -> Result<PaymentRequest> {
        if self.in_flight.is_some() {
            return Err(CheckoutError::PaymentInProgress);
        }
        let step = wizard.current_step();
        if step != WizardStep::Payment {
            return Err(CheckoutError::NotInPaymentStep(step));
        }

        if let Some(button) = &wizard.handles().complete_payment {
            self.ui.set_enabled(button, false);
            self.ui.set_text(button, &self.labels.processing);
        }

        let request = PaymentRequest {
            period: wizard.state().selected_period,
            card_last_four,
            requested_at: self.clock.now(),
        };
        self.in_flight = Some(InFlightPayment {
            request: request.clone(),
            invoked_on: self.clock.today(),
        });
        info!(period = %request.period, "payment submitted");
        Ok(request)
    }

    /// Applies the gateway's answer. Returns `None` when nothing was in flight.
    pub fn settle(
        &mut self,
        wizard: &mut WizardController,
        outcome: std::result::Result<PaymentReceipt, PaymentError>,
    ) -> Option<PaymentSettlement> {
        let Some(payment) = self.in_flight.take() else {
            warn!("payment settlement arrived with no payment in flight");
            return None;
        };

        let settlement = match outcome {
            Ok(receipt) => {
                wizard.go_to_step(WizardStep::Confirmation);
                let next_billing = next_billing_date(payment.invoked_on);
                match (&wizard.handles().next_billing, next_billing) {
                    (Some(target), Some(date)) => {
                        self.ui.set_text(target, &format_long_date(date));
                    }
                    (_, None) => {
                        warn!(invoked_on = %payment.invoked_on, "next billing date out of range");
                    }
                    (None, Some(_)) => {}
                }
                info!(reference = %receipt.reference, "payment confirmed");
                PaymentSettlement::Confirmed {
                    receipt,
                    next_billing,
                }
            }
            Err(err) => {
                if wizard.current_step() != WizardStep::Payment {
                    wizard.go_to_step(WizardStep::Payment);
                }
                warn!(error = %err, "payment failed");
                self.notifier
                    .emit(format!("Payment failed: {err}"), NotificationKind::Error);
                PaymentSettlement::Failed(err)
            }
        };

        self.restore_button(wizard);
        Some(settlement)
    }

    /// Drops an in-flight payment without touching the wizard (session teardown).
    pub fn abandon(&mut self, wizard: &WizardController) {
        if self.in_flight.take().is_some() {
            self.restore_button(wizard);
        }
    }

    fn restore_button(&self, wizard: &WizardController) {
        if let Some(button) = &wizard.handles().complete_payment {
            self.ui.set_enabled(button, true);
            self.ui.set_text(button, &self.labels.idle);
        }
    }
}
