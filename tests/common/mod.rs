#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use creatorhub_checkout::{
    animation::TokioAnimator,
    clock::FixedClock,
    notifications::{NotificationTimings, Notifier},
    payment::{SimulatedGateway, SimulatedOutcome},
    session::{CheckoutHandle, CheckoutSession, SessionDeps, SessionSettings},
    ui::{ids, MemoryUi},
};

pub const PAYMENT_DELAY: Duration = Duration::from_millis(2000);

/// Subscription page wired to a live session on the current (paused) runtime.
pub struct CheckoutFixture {
    pub ui: Arc<MemoryUi>,
    pub notifier: Notifier,
    pub session: CheckoutHandle,
}

pub fn spawn_checkout(outcome: SimulatedOutcome) -> CheckoutFixture {
    let ui = Arc::new(MemoryUi::with_elements(ids::subscription_page(
        "Complete Payment",
    )));
    let clock = Arc::new(FixedClock::on(2025, 1, 5).expect("valid date"));
    let notifier = Notifier::new(ui.clone(), clock.clone(), NotificationTimings::default());
    let deps = SessionDeps {
        ui: ui.clone(),
        animator: Arc::new(TokioAnimator::new(ui.clone())),
        notifier: notifier.clone(),
        gateway: Arc::new(SimulatedGateway::new(PAYMENT_DELAY, outcome)),
        clock,
    };
    let session = CheckoutSession::spawn(deps, SessionSettings::default());
    CheckoutFixture {
        ui,
        notifier,
        session,
    }
}
