use std::sync::Arc;
use std::time::Duration;

use creatorhub_checkout::{
    clock::SystemClock,
    errors::CheckoutError,
    notifications::{NotificationKind, NotificationPhase, NotificationTimings, Notifier},
    profile::{ProfileController, INVALID_TIP_MESSAGE},
    ui::{ids, ElementId, MemoryUi, UiTree},
};
use tokio::time::Instant;

fn profile_page() -> (Arc<MemoryUi>, Notifier, ProfileController) {
    let ui = Arc::new(MemoryUi::with_elements(ids::profile_page()));
    let notifier = Notifier::new(
        ui.clone(),
        Arc::new(SystemClock),
        NotificationTimings::default(),
    );
    let profile = ProfileController::new(ui.clone(), notifier.clone(), "Sophia Chen");
    (ui, notifier, profile)
}

#[tokio::test(start_paused = true)]
async fn follow_toast_is_visible_within_100ms_and_gone_by_3400ms() {
    let (ui, notifier, mut profile) = profile_page();
    let mut events = notifier.subscribe();

    let created = Instant::now();
    profile.toggle_follow();

    let mut visible_after = None;
    let mut removed_after = None;
    while removed_after.is_none() {
        let event = events.recv().await.expect("notifier alive");
        assert_eq!(event.message, "Now following Sophia Chen!");
        assert_eq!(event.kind, NotificationKind::Success);
        match event.phase {
            NotificationPhase::Visible => visible_after = Some(created.elapsed()),
            NotificationPhase::Removed => removed_after = Some(created.elapsed()),
            _ => {}
        }
    }

    assert!(visible_after.expect("became visible") <= Duration::from_millis(100));
    assert!(removed_after.expect("was removed") <= Duration::from_millis(3400));
    assert!(ui.find_by_class("toast").is_empty());
    assert_eq!(
        ui.text(&ElementId::new(ids::FOLLOW_BUTTON)).as_deref(),
        Some("Following")
    );
}

#[tokio::test(start_paused = true)]
async fn unfollow_and_tip_toasts_run_side_by_side() {
    let (ui, notifier, mut profile) = profile_page();
    let mut events = notifier.subscribe();
    let created = Instant::now();
    profile.toggle_follow();
    profile.toggle_follow();
    profile.send_tip("12.50").unwrap();

    let kinds: Vec<_> = notifier.active().iter().map(|toast| toast.kind).collect();
    assert_eq!(
        kinds,
        vec![
            NotificationKind::Success,
            NotificationKind::Info,
            NotificationKind::Success
        ]
    );
    assert_eq!(ui.find_by_class("toast").len(), 3);
    assert_eq!(
        notifier.active()[2].message,
        "Tip of $12.50 sent to Sophia Chen!"
    );

    let mut removed = 0;
    while removed < 3 {
        let event = events.recv().await.expect("notifier alive");
        if event.phase == NotificationPhase::Removed {
            removed += 1;
        }
    }
    assert!(created.elapsed() <= Duration::from_millis(3400));
    assert!(notifier.active().is_empty());
    assert!(ui.find_by_class("toast").is_empty());
}

#[tokio::test(start_paused = true)]
async fn rejected_tip_raises_error_toast() {
    let (_ui, notifier, profile) = profile_page();
    assert_eq!(
        profile.send_tip("free"),
        Err(CheckoutError::InvalidTipAmount("free".into()))
    );
    let toasts = notifier.active();
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].kind, NotificationKind::Error);
    assert_eq!(toasts[0].message, INVALID_TIP_MESSAGE);
}
