mod common;

use std::time::Duration;

use common::{spawn_checkout, PAYMENT_DELAY};
use creatorhub_checkout::{
    errors::CheckoutError,
    formatting::PaymentField,
    notifications::NotificationKind,
    payment::{PaymentSettlement, SimulatedOutcome},
    ui::{ids, ElementId, UiTree},
    wizard::{BillingPeriod, WizardStep},
};
use tokio::time::{advance, Instant};

fn visible_steps(ui: &dyn UiTree) -> Vec<WizardStep> {
    WizardStep::ALL
        .into_iter()
        .filter(|step| {
            ui.element(&ids::step_region(*step))
                .map(|region| region.visible)
                .unwrap_or(false)
        })
        .collect()
}

#[tokio::test(start_paused = true)]
async fn continue_and_back_move_one_step_at_a_time() {
    let fixture = spawn_checkout(SimulatedOutcome::Approve);
    let session = &fixture.session;

    assert!(matches!(
        session.back_to_details().await,
        Err(CheckoutError::InvalidTransition {
            from: WizardStep::Details,
            ..
        })
    ));

    session.continue_to_payment().await.unwrap().finished().await;
    assert_eq!(visible_steps(fixture.ui.as_ref()), vec![WizardStep::Payment]);
    let region = fixture
        .ui
        .element(&ids::step_region(WizardStep::Payment))
        .unwrap();
    assert_eq!(region.style("opacity"), Some("1.00"));
    assert_eq!(region.style("translateY"), Some("0px"));

    assert!(session.continue_to_payment().await.is_err());

    session.back_to_details().await.unwrap().finished().await;
    assert_eq!(visible_steps(fixture.ui.as_ref()), vec![WizardStep::Details]);
}

#[tokio::test(start_paused = true)]
async fn completing_payment_confirms_after_the_simulated_delay() {
    let fixture = spawn_checkout(SimulatedOutcome::Approve);
    let session = &fixture.session;
    let button = ElementId::new(ids::COMPLETE_PAYMENT);

    session.continue_to_payment().await.unwrap();
    session
        .input(PaymentField::CardNumber, "4242 4242-4242 4242")
        .await
        .unwrap();
    session.input(PaymentField::Expiry, "1228").await.unwrap();

    let started = Instant::now();
    session.complete_payment().await.unwrap();
    let locked = fixture.ui.element(&button).unwrap();
    assert!(!locked.enabled);
    assert_eq!(locked.text, "Processing...");

    advance(Duration::from_millis(1500)).await;
    let snapshot = session.snapshot().await.unwrap();
    assert!(snapshot.processing);
    assert_eq!(snapshot.state.current_step, WizardStep::Payment);

    session.wait_idle().await.unwrap();
    assert!(started.elapsed() >= PAYMENT_DELAY);

    let snapshot = session.snapshot().await.unwrap();
    assert_eq!(snapshot.state.current_step, WizardStep::Confirmation);
    assert_eq!(snapshot.card_number, "4242 4242 4242 4242");
    assert_eq!(snapshot.expiry, "12/28");
    match snapshot.last_settlement {
        Some(PaymentSettlement::Confirmed { receipt, .. }) => {
            assert_eq!(receipt.period, BillingPeriod::Monthly)
        }
        other => panic!("unexpected settlement {other:?}"),
    }

    let restored = fixture.ui.element(&button).unwrap();
    assert!(restored.enabled);
    assert_eq!(restored.text, "Complete Payment");
    assert_eq!(
        fixture
            .ui
            .text(&ElementId::new(ids::NEXT_BILLING))
            .as_deref(),
        Some("February 5, 2025")
    );
    assert_eq!(visible_steps(fixture.ui.as_ref()), vec![WizardStep::Confirmation]);
    let fill = fixture
        .ui
        .element(&ElementId::new(ids::PROGRESS_FILL))
        .unwrap();
    assert_eq!(fill.style("width"), Some("66.66%"));
}

#[tokio::test(start_paused = true)]
async fn yearly_plan_still_bills_one_calendar_month_out() {
    let fixture = spawn_checkout(SimulatedOutcome::Approve);
    let session = &fixture.session;
    session.select_period(BillingPeriod::Yearly).await.unwrap();
    session.continue_to_payment().await.unwrap();
    session.complete_payment().await.unwrap();
    session.wait_idle().await.unwrap();
    assert_eq!(
        fixture
            .ui
            .text(&ElementId::new(ids::NEXT_BILLING))
            .as_deref(),
        Some("February 5, 2025")
    );
    match session.snapshot().await.unwrap().last_settlement {
        Some(PaymentSettlement::Confirmed { receipt, .. }) => {
            assert_eq!(receipt.period, BillingPeriod::Yearly)
        }
        other => panic!("unexpected settlement {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn network_failure_returns_to_payment_with_error_toast() {
    let fixture = spawn_checkout(SimulatedOutcome::NetworkFailure {
        reason: "gateway timeout".into(),
    });
    let session = &fixture.session;
    session.continue_to_payment().await.unwrap();
    session.complete_payment().await.unwrap();
    session.wait_idle().await.unwrap();

    let snapshot = session.snapshot().await.unwrap();
    assert_eq!(snapshot.state.current_step, WizardStep::Payment);
    assert!(matches!(
        snapshot.last_settlement,
        Some(PaymentSettlement::Failed(_))
    ));

    let toasts = fixture.notifier.active();
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].kind, NotificationKind::Error);
    assert_eq!(
        toasts[0].message,
        "Payment failed: network error: gateway timeout"
    );

    let button = fixture
        .ui
        .element(&ElementId::new(ids::COMPLETE_PAYMENT))
        .unwrap();
    assert!(button.enabled);

    // a retry is accepted once the first attempt has settled
    session.complete_payment().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn shutdown_mid_payment_leaves_wizard_on_payment() {
    let fixture = spawn_checkout(SimulatedOutcome::Approve);
    let session = fixture.session.clone();
    session.continue_to_payment().await.unwrap();
    session.complete_payment().await.unwrap();
    session.shutdown().await.unwrap();

    advance(PAYMENT_DELAY * 2).await;
    let payment = fixture
        .ui
        .element(&ids::step_region(WizardStep::Payment))
        .unwrap();
    assert!(payment.visible);
    assert_eq!(
        session.continue_to_payment().await.err(),
        Some(CheckoutError::SessionClosed)
    );
}
