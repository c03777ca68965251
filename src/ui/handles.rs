use tracing::warn;

use crate::formatting::PaymentField;
use crate::ui::{ids, ElementId, UiTree};
use crate::wizard::{BillingPeriod, WizardStep};

/// Checkout elements resolved once against the UI tree.
///
/// Absent elements resolve to `None`; the behaviour bound to them is skipped.
#[derive(Debug, Clone, Default)]
pub struct CheckoutHandles {
    pub step_regions: [Option<ElementId>; 3],
    pub step_indicators: [Option<ElementId>; 3],
    pub progress_fill: Option<ElementId>,
    pub complete_payment: Option<ElementId>,
    pub next_billing: Option<ElementId>,
    pub plan_options: Vec<(BillingPeriod, ElementId)>,
    pub fields: Vec<(PaymentField, ElementId)>,
}

impl CheckoutHandles {
    pub fn resolve(ui: &dyn UiTree) -> Self {
        let mut handles = CheckoutHandles::default();
        for step in WizardStep::ALL {
            let slot = step.index() as usize - 1;
            handles.step_regions[slot] = lookup(ui, ids::step_region(step));
            handles.step_indicators[slot] = lookup(ui, ids::step_indicator(step));
        }
        handles.progress_fill = lookup(ui, ElementId::new(ids::PROGRESS_FILL));
        handles.complete_payment = lookup(ui, ElementId::new(ids::COMPLETE_PAYMENT));
        handles.next_billing = lookup(ui, ElementId::new(ids::NEXT_BILLING));
        handles.plan_options = BillingPeriod::ALL
            .into_iter()
            .filter_map(|period| ui_entry(ui, ids::plan_option(period)).map(|id| (period, id)))
            .collect();
        handles.fields = PaymentField::ALL
            .into_iter()
            .filter_map(|field| lookup(ui, ids::payment_field(field)).map(|id| (field, id)))
            .collect();
        handles
    }

    pub fn region(&self, step: WizardStep) -> Option<&ElementId> {
        self.step_regions[step.index() as usize - 1].as_ref()
    }

    pub fn indicator(&self, step: WizardStep) -> Option<&ElementId> {
        self.step_indicators[step.index() as usize - 1].as_ref()
    }

    pub fn field(&self, field: PaymentField) -> Option<&ElementId> {
        self.fields
            .iter()
            .find(|(candidate, _)| *candidate == field)
            .map(|(_, id)| id)
    }
}

fn lookup(ui: &dyn UiTree, id: ElementId) -> Option<ElementId> {
    if ui.contains(&id) {
        Some(id)
    } else {
        warn!(element = %id, "checkout element missing; related behaviour disabled");
        None
    }
}

// Plan options are optional page decoration, so their absence is not logged.
fn ui_entry(ui: &dyn UiTree, id: ElementId) -> Option<ElementId> {
    ui.contains(&id).then_some(id)
}
