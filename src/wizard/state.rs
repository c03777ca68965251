use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::CheckoutError;

/// Steps of the subscription checkout, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum WizardStep {
    /// Plan and subscriber details.
    #[default]
    Details,
    /// Card entry.
    Payment,
    /// Terminal step shown after a successful charge.
    Confirmation,
}

impl WizardStep {
    pub const ALL: [WizardStep; 3] = [
        WizardStep::Details,
        WizardStep::Payment,
        WizardStep::Confirmation,
    ];

    /// One-based position used by element identifiers and progress display.
    pub fn index(self) -> u8 {
        match self {
            WizardStep::Details => 1,
            WizardStep::Payment => 2,
            WizardStep::Confirmation => 3,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            WizardStep::Details => "Details",
            WizardStep::Payment => "Payment",
            WizardStep::Confirmation => "Confirmation",
        }
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// Billing cadence chosen on the details step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingPeriod {
    #[default]
    Monthly,
    Quarterly,
    Yearly,
    Lifetime,
}

impl BillingPeriod {
    pub const ALL: [BillingPeriod; 4] = [
        BillingPeriod::Monthly,
        BillingPeriod::Quarterly,
        BillingPeriod::Yearly,
        BillingPeriod::Lifetime,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            BillingPeriod::Monthly => "monthly",
            BillingPeriod::Quarterly => "quarterly",
            BillingPeriod::Yearly => "yearly",
            BillingPeriod::Lifetime => "lifetime",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            BillingPeriod::Monthly => "Monthly",
            BillingPeriod::Quarterly => "Quarterly",
            BillingPeriod::Yearly => "Yearly",
            BillingPeriod::Lifetime => "Lifetime",
        }
    }

    /// Months of access one payment covers; `None` for lifetime access.
    pub fn months(self) -> Option<u32> {
        match self {
            BillingPeriod::Monthly => Some(1),
            BillingPeriod::Quarterly => Some(3),
            BillingPeriod::Yearly => Some(12),
            BillingPeriod::Lifetime => None,
        }
    }
}

impl fmt::Display for BillingPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for BillingPeriod {
    type Err = CheckoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        BillingPeriod::ALL
            .into_iter()
            .find(|period| period.slug() == normalized)
            .ok_or_else(|| CheckoutError::UnknownPeriod(s.trim().to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WizardState {
    pub current_step: WizardStep,
    pub selected_period: BillingPeriod,
}

/// Visual state of one progress indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndicatorState {
    Completed,
    Active,
    Cleared,
}

impl IndicatorState {
    pub fn for_step(indicator: WizardStep, current: WizardStep) -> Self {
        match indicator.cmp(&current) {
            std::cmp::Ordering::Less => IndicatorState::Completed,
            std::cmp::Ordering::Equal => IndicatorState::Active,
            std::cmp::Ordering::Greater => IndicatorState::Cleared,
        }
    }

    pub fn class(self) -> Option<&'static str> {
        match self {
            IndicatorState::Completed => Some("completed"),
            IndicatorState::Active => Some("active"),
            IndicatorState::Cleared => None,
        }
    }
}

/// Progress-bar fill percentage per step.
///
/// The confirmation value defaults to the payment value, matching the page as
/// shipped; whether confirmation should read 100% is still an open product
/// decision, hence the mapping is configurable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProgressFillMap {
    pub details: f64,
    pub payment: f64,
    pub confirmation: f64,
}

impl Default for ProgressFillMap {
    fn default() -> Self {
        Self {
            details: 33.33,
            payment: 66.66,
            confirmation: 66.66,
        }
    }
}

impl ProgressFillMap {
    pub fn percent(&self, step: WizardStep) -> f64 {
        match step {
            WizardStep::Details => self.details,
            WizardStep::Payment => self.payment,
            WizardStep::Confirmation => self.confirmation,
        }
    }

    pub fn css_width(&self, step: WizardStep) -> String {
        format!("{:.2}%", self.percent(step))
    }
}
