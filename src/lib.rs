#![doc(test(attr(deny(warnings))))]

//! CreatorHub Checkout drives the interactive parts of a creator-subscription
//! site: payment field formatting, toast notifications, the three-step
//! subscription wizard with its simulated payment, profile follow/tip
//! controls and creator discovery.

pub mod animation;
pub mod catalog;
pub mod cli;
pub mod clock;
pub mod config;
pub mod errors;
pub mod formatting;
pub mod notifications;
pub mod payment;
pub mod profile;
pub mod session;
pub mod ui;
pub mod utils;
pub mod wizard;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("CreatorHub checkout tracing initialized.");
    });
}
