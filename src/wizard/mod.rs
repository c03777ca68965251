//! Three-step subscription checkout.
//!
//! The controller owns [`WizardState`] and is the only writer of the step
//! regions, progress indicators and plan selection. Transitions never fail
//! once accepted; `continue`/`back` refuse to fire from the wrong step so the
//! wizard can never jump from details straight to confirmation.

mod state;

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::animation::{Animation, AnimationHandle, Animator};
use crate::errors::{CheckoutError, Result};
use crate::ui::{CheckoutHandles, UiTree};

pub use state::{BillingPeriod, IndicatorState, ProgressFillMap, WizardState, WizardStep};

const SELECTED_CLASS: &str = "selected";

pub struct WizardController {
    state: WizardState,
    ui: Arc<dyn UiTree>,
    animator: Arc<dyn Animator>,
    handles: CheckoutHandles,
    progress: ProgressFillMap,
    entrance: Duration,
}

impl WizardController {
    pub fn new(
        ui: Arc<dyn UiTree>,
        animator: Arc<dyn Animator>,
        handles: CheckoutHandles,
        progress: ProgressFillMap,
        entrance: Duration,
    ) -> Self {
        Self {
            state: WizardState::default(),
            ui,
            animator,
            handles,
            progress,
            entrance,
        }
    }

    pub fn state(&self) -> WizardState {
        self.state
    }

    pub fn current_step(&self) -> WizardStep {
        self.state.current_step
    }

    pub fn handles(&self) -> &CheckoutHandles {
        &self.handles
    }

    /// Shows `step`, updates the progress display and records the step.
    ///
    /// The returned handle resolves when the entrance animation has finished.
    pub fn go_to_step(&mut self, step: WizardStep) -> AnimationHandle {
        for region in self.handles.step_regions.iter().flatten() {
            self.ui.set_visible(region, false);
        }

        let animation = match self.handles.region(step) {
            Some(region) => {
                self.ui.set_visible(region, true);
                self.animator
                    .animate(region, Animation::step_entrance(self.entrance))
            }
            None => {
                warn!(%step, "step region missing; skipping reveal");
                AnimationHandle::completed()
            }
        };

        self.update_progress(step);
        let previous = self.state.current_step;
        self.state.current_step = step;
        debug!(from = %previous, to = %step, "wizard step changed");
        animation
    }

    pub fn continue_to_payment(&mut self) -> Result<AnimationHandle> {
        self.require(WizardStep::Details, "continue to payment")?;
        Ok(self.go_to_step(WizardStep::Payment))
    }

    pub fn back_to_details(&mut self) -> Result<AnimationHandle> {
        self.require(WizardStep::Payment, "go back to details")?;
        Ok(self.go_to_step(WizardStep::Details))
    }

    /// Marks the plan option for `period` as selected and records it.
    pub fn select_period(&mut self, period: BillingPeriod) {
        for (candidate, option) in &self.handles.plan_options {
            if *candidate == period {
                self.ui.add_class(option, SELECTED_CLASS);
            } else {
                self.ui.remove_class(option, SELECTED_CLASS);
            }
        }
        self.state.selected_period = period;
        info!(%period, "billing period selected");
    }

    fn require(&self, expected: WizardStep, action: &'static str) -> Result<()> {
        if self.state.current_step == expected {
            Ok(())
        } else {
            Err(CheckoutError::InvalidTransition {
                action,
                from: self.state.current_step,
            })
        }
    }

    fn update_progress(&self, current: WizardStep) {
        for step in WizardStep::ALL {
            let Some(indicator) = self.handles.indicator(step) else {
                continue;
            };
            self.ui.remove_class(indicator, "active");
            self.ui.remove_class(indicator, "completed");
            if let Some(class) = IndicatorState::for_step(step, current).class() {
                self.ui.add_class(indicator, class);
            }
        }
        if let Some(fill) = &self.handles.progress_fill {
            self.ui
                .set_style(fill, "width", &self.progress.css_width(current));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::ImmediateAnimator;
    use crate::ui::{ids, MemoryUi};

    fn controller() -> (Arc<MemoryUi>, WizardController) {
        let ui = Arc::new(MemoryUi::with_elements(ids::subscription_page(
            "Complete Payment",
        )));
        let handles = CheckoutHandles::resolve(ui.as_ref());
        let controller = WizardController::new(
            ui.clone(),
            Arc::new(ImmediateAnimator::new(ui.clone())),
            handles,
            ProgressFillMap::default(),
            Duration::from_millis(400),
        );
        (ui, controller)
    }

    fn visible_regions(ui: &MemoryUi) -> Vec<WizardStep> {
        WizardStep::ALL
            .into_iter()
            .filter(|step| {
                ui.element(&ids::step_region(*step))
                    .map(|element| element.visible)
                    .unwrap_or(false)
            })
            .collect()
    }

    #[test]
    fn starts_on_details_with_monthly_plan() {
        let (_ui, controller) = controller();
        assert_eq!(controller.current_step(), WizardStep::Details);
        assert_eq!(controller.state().selected_period, BillingPeriod::Monthly);
    }

    #[test]
    fn go_to_step_shows_exactly_one_region() {
        let (ui, mut controller) = controller();
        for step in WizardStep::ALL {
            controller.go_to_step(step);
            assert_eq!(visible_regions(&ui), vec![step]);
            assert_eq!(controller.current_step(), step);
        }
    }

    #[test]
    fn go_to_step_updates_indicators_and_fill() {
        let (ui, mut controller) = controller();
        controller.go_to_step(WizardStep::Confirmation);
        let details = ui.element(&ids::step_indicator(WizardStep::Details)).unwrap();
        let payment = ui.element(&ids::step_indicator(WizardStep::Payment)).unwrap();
        let confirmation = ui
            .element(&ids::step_indicator(WizardStep::Confirmation))
            .unwrap();
        assert!(details.has_class("completed") && !details.has_class("active"));
        assert!(payment.has_class("completed"));
        assert!(confirmation.has_class("active"));

        controller.go_to_step(WizardStep::Details);
        let payment = ui.element(&ids::step_indicator(WizardStep::Payment)).unwrap();
        assert!(!payment.has_class("completed") && !payment.has_class("active"));
        let fill = ui.element(&ids::PROGRESS_FILL.into()).unwrap();
        assert_eq!(fill.style("width"), Some("33.33%"));
    }

    #[test]
    fn revealed_region_gets_entrance_end_state() {
        let (ui, mut controller) = controller();
        controller.go_to_step(WizardStep::Payment);
        let region = ui.element(&ids::step_region(WizardStep::Payment)).unwrap();
        assert_eq!(region.style("opacity"), Some("1.00"));
    }

    #[test]
    fn continue_and_back_only_fire_from_their_step() {
        let (_ui, mut controller) = controller();
        assert!(controller.back_to_details().is_err());
        controller.continue_to_payment().expect("details -> payment");
        assert_eq!(controller.current_step(), WizardStep::Payment);
        assert!(matches!(
            controller.continue_to_payment(),
            Err(CheckoutError::InvalidTransition {
                from: WizardStep::Payment,
                ..
            })
        ));
        controller.back_to_details().expect("payment -> details");
        assert_eq!(controller.current_step(), WizardStep::Details);
    }

    #[test]
    fn select_period_moves_selected_class() {
        let (ui, mut controller) = controller();
        controller.select_period(BillingPeriod::Yearly);
        assert_eq!(controller.state().selected_period, BillingPeriod::Yearly);
        let yearly = ui.element(&ids::plan_option(BillingPeriod::Yearly)).unwrap();
        let monthly = ui.element(&ids::plan_option(BillingPeriod::Monthly)).unwrap();
        assert!(yearly.has_class("selected"));
        assert!(!monthly.has_class("selected"));
    }

    #[test]
    fn missing_regions_do_not_block_transitions() {
        let ui = Arc::new(MemoryUi::new());
        let mut controller = WizardController::new(
            ui.clone(),
            Arc::new(ImmediateAnimator::new(ui.clone())),
            CheckoutHandles::resolve(ui.as_ref()),
            ProgressFillMap::default(),
            Duration::ZERO,
        );
        controller.continue_to_payment().expect("transition succeeds");
        assert_eq!(controller.current_step(), WizardStep::Payment);
    }
}
