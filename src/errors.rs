use thiserror::Error;

use crate::wizard::WizardStep;

/// Failures surfaced by the checkout, profile and catalog controllers.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CheckoutError {
    #[error("Cannot {action} while on the {from} step")]
    InvalidTransition {
        action: &'static str,
        from: WizardStep,
    },
    #[error("A payment is already being processed")]
    PaymentInProgress,
    #[error("Payment can only be completed from the payment step (currently {0})")]
    NotInPaymentStep(WizardStep),
    #[error("Invalid tip amount: `{0}`")]
    InvalidTipAmount(String),
    #[error("Unknown billing period: `{0}`")]
    UnknownPeriod(String),
    #[error("Checkout session is closed")]
    SessionClosed,
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, CheckoutError>;

/// Outcome reported by a payment gateway when a charge does not go through.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PaymentError {
    #[error("card declined: {0}")]
    Declined(String),
    #[error("network error: {0}")]
    Network(String),
}

/// Errors raised while loading or saving the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(String),
    #[error("Unknown configuration key `{0}`")]
    UnknownKey(String),
    #[error("Invalid value `{value}` for `{key}`")]
    InvalidValue { key: String, value: String },
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Serde(err.to_string())
    }
}

impl From<ConfigError> for CheckoutError {
    fn from(err: ConfigError) -> Self {
        CheckoutError::Config(err.to_string())
    }
}
