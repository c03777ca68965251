//! Creator profile: follow toggle and tips.

use std::sync::Arc;

use tracing::{info, warn};

use crate::errors::{CheckoutError, Result};
use crate::notifications::{NotificationKind, Notifier};
use crate::ui::{ids, ElementId, UiTree};

const FOLLOWING_CLASS: &str = "following";
pub const INVALID_TIP_MESSAGE: &str = "Tip amount must be a number greater than zero";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileState {
    pub creator_name: String,
    pub is_following: bool,
}

pub struct ProfileController {
    state: ProfileState,
    ui: Arc<dyn UiTree>,
    notifier: Notifier,
    follow_button: Option<ElementId>,
}

impl ProfileController {
    pub fn new(ui: Arc<dyn UiTree>, notifier: Notifier, creator_name: impl Into<String>) -> Self {
        let follow_button = ElementId::new(ids::FOLLOW_BUTTON);
        let follow_button = if ui.contains(&follow_button) {
            Some(follow_button)
        } else {
            warn!(element = %follow_button, "follow button missing; label updates disabled");
            None
        };
        Self {
            state: ProfileState {
                creator_name: creator_name.into(),
                is_following: false,
            },
            ui,
            notifier,
            follow_button,
        }
    }

    pub fn state(&self) -> &ProfileState {
        &self.state
    }

    pub fn is_following(&self) -> bool {
        self.state.is_following
    }

    /// Flips the follow state and returns the new value.
    pub fn toggle_follow(&mut self) -> bool {
        self.state.is_following = !self.state.is_following;
        let creator = &self.state.creator_name;

        if let Some(button) = &self.follow_button {
            if self.state.is_following {
                self.ui.set_text(button, "Following");
                self.ui.add_class(button, FOLLOWING_CLASS);
            } else {
                self.ui.set_text(button, "Follow");
                self.ui.remove_class(button, FOLLOWING_CLASS);
            }
        }

        if self.state.is_following {
            self.notifier
                .emit(format!("Now following {creator}!"), NotificationKind::Success);
        } else {
            self.notifier
                .emit(format!("Unfollowed {creator}"), NotificationKind::Info);
        }
        info!(creator = %creator, following = self.state.is_following, "follow toggled");
        self.state.is_following
    }

    /// Sends a tip of `raw` dollars. Returns the amount as entered.
    pub fn send_tip(&self, raw: &str) -> Result<String> {
        let amount = raw.trim();
        let valid = amount
            .parse::<f64>()
            .map(|value| value.is_finite() && value > 0.0)
            .unwrap_or(false);
        if !valid {
            warn!(input = %raw, "rejected tip amount");
            self.notifier
                .emit(INVALID_TIP_MESSAGE, NotificationKind::Error);
            return Err(CheckoutError::InvalidTipAmount(raw.to_string()));
        }

        self.notifier.emit(
            format!("Tip of ${amount} sent to {}!", self.state.creator_name),
            NotificationKind::Success,
        );
        info!(amount, creator = %self.state.creator_name, "tip sent");
        Ok(amount.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::SystemClock;
    use crate::notifications::NotificationTimings;
    use crate::ui::MemoryUi;

    fn controller() -> (Arc<MemoryUi>, Notifier, ProfileController) {
        let ui = Arc::new(MemoryUi::with_elements(ids::profile_page()));
        let notifier = Notifier::new(
            ui.clone(),
            Arc::new(SystemClock),
            NotificationTimings::default(),
        );
        let profile = ProfileController::new(ui.clone(), notifier.clone(), "Sophia Chen");
        (ui, notifier, profile)
    }

    fn messages(notifier: &Notifier) -> Vec<(String, NotificationKind)> {
        notifier
            .active()
            .into_iter()
            .map(|toast| (toast.message, toast.kind))
            .collect()
    }

    #[test]
    fn toggle_follow_updates_button_and_notifies() {
        let (ui, notifier, mut profile) = controller();
        assert!(profile.toggle_follow());
        let button = ui.element(&ElementId::new(ids::FOLLOW_BUTTON)).unwrap();
        assert_eq!(button.text, "Following");
        assert!(button.has_class("following"));

        assert!(!profile.toggle_follow());
        let button = ui.element(&ElementId::new(ids::FOLLOW_BUTTON)).unwrap();
        assert_eq!(button.text, "Follow");
        assert!(!button.has_class("following"));

        assert_eq!(
            messages(&notifier),
            vec![
                ("Now following Sophia Chen!".to_string(), NotificationKind::Success),
                ("Unfollowed Sophia Chen".to_string(), NotificationKind::Info),
            ]
        );
    }

    #[test]
    fn valid_tip_is_acknowledged() {
        let (_ui, notifier, profile) = controller();
        assert_eq!(profile.send_tip(" 5 ").unwrap(), "5");
        assert_eq!(
            messages(&notifier),
            vec![(
                "Tip of $5 sent to Sophia Chen!".to_string(),
                NotificationKind::Success
            )]
        );
    }

    #[test]
    fn invalid_tips_are_rejected_with_error_toast() {
        let (_ui, notifier, profile) = controller();
        for raw in ["", "abc", "0", "-3", "NaN", "inf"] {
            assert_eq!(
                profile.send_tip(raw),
                Err(CheckoutError::InvalidTipAmount(raw.to_string()))
            );
        }
        let toasts = notifier.active();
        assert_eq!(toasts.len(), 6);
        assert!(toasts
            .iter()
            .all(|toast| toast.kind == NotificationKind::Error
                && toast.message == INVALID_TIP_MESSAGE));
    }

    #[test]
    fn missing_follow_button_still_toggles_state() {
        let ui = Arc::new(MemoryUi::new());
        let notifier = Notifier::new(
            ui.clone(),
            Arc::new(SystemClock),
            NotificationTimings::default(),
        );
        let mut profile = ProfileController::new(ui, notifier, "Sophia Chen");
        assert!(profile.toggle_follow());
        assert!(profile.is_following());
    }
}
