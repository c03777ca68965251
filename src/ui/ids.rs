//! Stable element identifiers of the subscription and profile pages.

use crate::formatting::PaymentField;
use crate::ui::{Element, ElementId};
use crate::wizard::{BillingPeriod, WizardStep};

pub const PROGRESS_FILL: &str = "progressFill";
pub const COMPLETE_PAYMENT: &str = "completePayment";
pub const NEXT_BILLING: &str = "nextBilling";
pub const FOLLOW_BUTTON: &str = "follow-btn";
pub const TIP_BUTTON: &str = "tip-btn";

pub fn step_region(step: WizardStep) -> ElementId {
    ElementId::new(format!("step{}Content", step.index()))
}

pub fn step_indicator(step: WizardStep) -> ElementId {
    ElementId::new(format!("step{}", step.index()))
}

pub fn plan_option(period: BillingPeriod) -> ElementId {
    ElementId::new(format!("plan-{}", period.slug()))
}

pub fn payment_field(field: PaymentField) -> ElementId {
    ElementId::new(match field {
        PaymentField::CardNumber => "cardNumber",
        PaymentField::Expiry => "expiryDate",
        PaymentField::Cvv => "cvv",
    })
}

/// Initial layout of the subscription page: step 1 shown, monthly plan selected.
pub fn subscription_page(complete_label: &str) -> Vec<(ElementId, Element)> {
    let mut elements = Vec::new();
    for step in WizardStep::ALL {
        let region = Element::default();
        let region = if step == WizardStep::Details {
            region
        } else {
            region.hidden()
        };
        elements.push((step_region(step), region));

        let indicator = Element::default().with_text(step.title());
        let indicator = if step == WizardStep::Details {
            indicator.with_class("active")
        } else {
            indicator
        };
        elements.push((step_indicator(step), indicator));
    }

    let mut fill = Element::default();
    fill.styles.insert("width".into(), "33.33%".into());
    elements.push((ElementId::new(PROGRESS_FILL), fill));

    for period in BillingPeriod::ALL {
        let option = Element::default()
            .with_text(period.label())
            .with_class("payment-card");
        let option = if period == BillingPeriod::default() {
            option.with_class("selected")
        } else {
            option
        };
        elements.push((plan_option(period), option));
    }

    for field in PaymentField::ALL {
        elements.push((payment_field(field), Element::default().with_text(field.label())));
    }

    elements.push((
        ElementId::new(COMPLETE_PAYMENT),
        Element::default().with_text(complete_label),
    ));
    elements.push((ElementId::new(NEXT_BILLING), Element::default()));
    elements
}

/// Follow and tip controls of a creator profile.
pub fn profile_page() -> Vec<(ElementId, Element)> {
    vec![
        (
            ElementId::new(FOLLOW_BUTTON),
            Element::default().with_text("Follow"),
        ),
        (
            ElementId::new(TIP_BUTTON),
            Element::default().with_text("Send Tip"),
        ),
    ]
}
