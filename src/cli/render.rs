//! Text rendering of the checkout page held in the in-memory UI tree.

use crate::cli::output;
use crate::formatting::PaymentField;
use crate::session::CheckoutSnapshot;
use crate::ui::{ids, ElementId, UiTree};
use crate::wizard::{BillingPeriod, WizardStep};

pub(crate) fn print_checkout(ui: &dyn UiTree, snapshot: &CheckoutSnapshot) {
    let step = snapshot.state.current_step;
    output::section(format!(
        "Subscribe - step {} of {}: {}",
        step.index(),
        WizardStep::ALL.len(),
        step.title()
    ));
    output::info(format!("  Progress : {}", progress_line(ui)));
    output::info(format!(
        "  Plan     : {}",
        plan_line(ui, snapshot.state.selected_period)
    ));

    match step {
        WizardStep::Details => {}
        WizardStep::Payment => {
            for (field, value) in [
                (PaymentField::CardNumber, &snapshot.card_number),
                (PaymentField::Expiry, &snapshot.expiry),
                (PaymentField::Cvv, &snapshot.cvv),
            ] {
                let shown = if value.is_empty() { "-" } else { value.as_str() };
                output::info(format!("  {:<15}: {}", field.label(), shown));
            }
            if let Some(button) = ui.element(&ElementId::new(ids::COMPLETE_PAYMENT)) {
                let state = if button.enabled { "enabled" } else { "disabled" };
                output::info(format!("  Button   : {} ({state})", button.text));
            }
        }
        WizardStep::Confirmation => {
            if let Some(next) = ui.text(&ElementId::new(ids::NEXT_BILLING)) {
                output::info(format!("  Next billing: {next}"));
            }
        }
    }
}

/// `[x] Details  [>] Payment  [ ] Confirmation  66.66%`
pub(crate) fn progress_line(ui: &dyn UiTree) -> String {
    let mut parts: Vec<String> = WizardStep::ALL
        .into_iter()
        .map(|step| {
            let marker = match ui.element(&ids::step_indicator(step)) {
                Some(indicator) if indicator.has_class("completed") => "[x]",
                Some(indicator) if indicator.has_class("active") => "[>]",
                _ => "[ ]",
            };
            format!("{marker} {}", step.title())
        })
        .collect();
    if let Some(width) = ui
        .element(&ElementId::new(ids::PROGRESS_FILL))
        .and_then(|fill| fill.style("width").map(str::to_string))
    {
        parts.push(width);
    }
    parts.join("  ")
}

fn plan_line(ui: &dyn UiTree, selected: BillingPeriod) -> String {
    BillingPeriod::ALL
        .into_iter()
        .filter(|period| ui.contains(&ids::plan_option(*period)))
        .map(|period| {
            if period == selected {
                format!("({})", period.label())
            } else {
                period.label().to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
