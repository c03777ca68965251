//! Checkout session task.
//!
//! One tokio task owns the wizard, the payment processor and the field
//! buffers; everything else talks to it through a cloneable
//! [`CheckoutHandle`]. The gateway call runs on its own task and reports back
//! over an internal channel, so the session keeps answering commands while a
//! payment is in flight.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::animation::{AnimationHandle, Animator};
use crate::clock::Clock;
use crate::config::Config;
use crate::errors::{CheckoutError, PaymentError, Result};
use crate::formatting::{card_last_four, PaymentField, PaymentFieldBuffer};
use crate::notifications::Notifier;
use crate::payment::{
    ButtonLabels, PaymentGateway, PaymentProcessor, PaymentReceipt, PaymentSettlement,
};
use crate::ui::{CheckoutHandles, UiTree};
use crate::wizard::{BillingPeriod, ProgressFillMap, WizardController, WizardState, WizardStep};

const COMMAND_BUFFER: usize = 32;

type Reply<T> = oneshot::Sender<Result<T>>;
type GatewayOutcome = std::result::Result<PaymentReceipt, PaymentError>;

/// Collaborators the session drives.
#[derive(Clone)]
pub struct SessionDeps {
    pub ui: Arc<dyn UiTree>,
    pub animator: Arc<dyn Animator>,
    pub notifier: Notifier,
    pub gateway: Arc<dyn PaymentGateway>,
    pub clock: Arc<dyn Clock>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionSettings {
    pub progress: ProgressFillMap,
    pub step_entrance: Duration,
    pub labels: ButtonLabels,
    pub default_period: BillingPeriod,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            progress: ProgressFillMap::default(),
            step_entrance: Duration::from_millis(400),
            labels: ButtonLabels::default(),
            default_period: BillingPeriod::default(),
        }
    }
}

impl From<&Config> for SessionSettings {
    fn from(config: &Config) -> Self {
        Self {
            progress: config.progress_fill,
            step_entrance: Duration::from_millis(config.timings.step_animation_ms),
            labels: config.button_labels(),
            default_period: config.default_period,
        }
    }
}

/// Point-in-time view of the session.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutSnapshot {
    pub state: WizardState,
    pub card_number: String,
    pub expiry: String,
    pub cvv: String,
    pub processing: bool,
    pub last_settlement: Option<PaymentSettlement>,
}

enum Command {
    SelectPeriod(BillingPeriod, Reply<()>),
    Continue(Reply<AnimationHandle>),
    Back(Reply<AnimationHandle>),
    Restart(Reply<AnimationHandle>),
    CompletePayment(Reply<()>),
    Input {
        field: PaymentField,
        raw: String,
        reply: oneshot::Sender<String>,
    },
    Snapshot(oneshot::Sender<CheckoutSnapshot>),
    WaitIdle(oneshot::Sender<()>),
}

/// Cloneable front door to a running session.
#[derive(Clone)]
pub struct CheckoutHandle {
    commands: mpsc::Sender<Command>,
    shutdown: mpsc::Sender<oneshot::Sender<()>>,
}

impl CheckoutHandle {
    pub async fn select_period(&self, period: BillingPeriod) -> Result<()> {
        self.request(|reply| Command::SelectPeriod(period, reply))
            .await?
    }

    /// Details → Payment. Await the returned handle to wait for the entrance animation.
    pub async fn continue_to_payment(&self) -> Result<AnimationHandle> {
        self.request(Command::Continue).await?
    }

    /// Payment → Details.
    pub async fn back_to_details(&self) -> Result<AnimationHandle> {
        self.request(Command::Back).await?
    }

    /// Starts over on Details with empty payment fields.
    pub async fn restart(&self) -> Result<AnimationHandle> {
        self.request(Command::Restart).await?
    }

    /// Submits the payment; returns as soon as the control is locked.
    pub async fn complete_payment(&self) -> Result<()> {
        self.request(Command::CompletePayment).await?
    }

    /// Formats `raw` for `field`, stores it and returns the display value.
    pub async fn input(&self, field: PaymentField, raw: impl Into<String>) -> Result<String> {
        let raw = raw.into();
        self.request(|reply| Command::Input { field, raw, reply })
            .await
    }

    pub async fn snapshot(&self) -> Result<CheckoutSnapshot> {
        self.request(Command::Snapshot).await
    }

    /// Resolves once no payment is in flight.
    pub async fn wait_idle(&self) -> Result<()> {
        self.request(Command::WaitIdle).await
    }

    /// Cancels the in-flight payment and pending toasts, then stops the session.
    pub async fn shutdown(&self) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.shutdown
            .send(tx)
            .await
            .map_err(|_| CheckoutError::SessionClosed)?;
        rx.await.map_err(|_| CheckoutError::SessionClosed)
    }

    async fn request<T>(&self, build: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (tx, rx) = oneshot::channel();
        self.commands
            .send(build(tx))
            .await
            .map_err(|_| CheckoutError::SessionClosed)?;
        rx.await.map_err(|_| CheckoutError::SessionClosed)
    }
}

pub struct CheckoutSession {
    wizard: WizardController,
    processor: PaymentProcessor,
    notifier: Notifier,
    gateway: Arc<dyn PaymentGateway>,
    ui: Arc<dyn UiTree>,
    card_number: PaymentFieldBuffer,
    expiry: PaymentFieldBuffer,
    cvv: PaymentFieldBuffer,
    payment_task: Option<JoinHandle<()>>,
    settled_tx: mpsc::UnboundedSender<GatewayOutcome>,
    idle_waiters: Vec<oneshot::Sender<()>>,
    last_settlement: Option<PaymentSettlement>,
}

impl CheckoutSession {
    /// Resolves the checkout elements and spawns the session task.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(deps: SessionDeps, settings: SessionSettings) -> CheckoutHandle {
        let handles = CheckoutHandles::resolve(deps.ui.as_ref());
        let mut wizard = WizardController::new(
            Arc::clone(&deps.ui),
            deps.animator,
            handles,
            settings.progress,
            settings.step_entrance,
        );
        wizard.select_period(settings.default_period);
        let processor = PaymentProcessor::new(
            Arc::clone(&deps.ui),
            deps.notifier.clone(),
            deps.clock,
            settings.labels,
        );

        let (commands_tx, commands_rx) = mpsc::channel(COMMAND_BUFFER);
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
        let (settled_tx, settled_rx) = mpsc::unbounded_channel();
        let session = CheckoutSession {
            wizard,
            processor,
            notifier: deps.notifier,
            gateway: deps.gateway,
            ui: deps.ui,
            card_number: PaymentFieldBuffer::new(PaymentField::CardNumber),
            expiry: PaymentFieldBuffer::new(PaymentField::Expiry),
            cvv: PaymentFieldBuffer::new(PaymentField::Cvv),
            payment_task: None,
            settled_tx,
            idle_waiters: Vec::new(),
            last_settlement: None,
        };
        tokio::spawn(session.run(commands_rx, shutdown_rx, settled_rx));
        CheckoutHandle {
            commands: commands_tx,
            shutdown: shutdown_tx,
        }
    }

    async fn run(
        mut self,
        mut commands: mpsc::Receiver<Command>,
        mut shutdown: mpsc::Receiver<oneshot::Sender<()>>,
        mut settled: mpsc::UnboundedReceiver<GatewayOutcome>,
    ) {
        info!("checkout session started");
        loop {
            tokio::select! {
                Some(reply) = shutdown.recv() => {
                    self.teardown();
                    let _ = reply.send(());
                    break;
                }
                command = commands.recv() => match command {
                    Some(command) => self.handle(command),
                    None => {
                        self.teardown();
                        break;
                    }
                },
                Some(outcome) = settled.recv() => self.settle(outcome),
            }
        }
        info!("checkout session stopped");
    }

    fn handle(&mut self, command: Command) {
        match command {
            Command::SelectPeriod(period, reply) => {
                let result = self.ensure_idle().map(|_| self.wizard.select_period(period));
                let _ = reply.send(result);
            }
            Command::Continue(reply) => {
                let result = self
                    .ensure_idle()
                    .and_then(|_| self.wizard.continue_to_payment());
                let _ = reply.send(result);
            }
            Command::Back(reply) => {
                let result = self
                    .ensure_idle()
                    .and_then(|_| self.wizard.back_to_details());
                let _ = reply.send(result);
            }
            Command::Restart(reply) => {
                let _ = reply.send(self.restart());
            }
            Command::CompletePayment(reply) => {
                let _ = reply.send(self.start_payment());
            }
            Command::Input { field, raw, reply } => {
                let _ = reply.send(self.apply_input(field, &raw));
            }
            Command::Snapshot(reply) => {
                let _ = reply.send(self.snapshot());
            }
            Command::WaitIdle(reply) => {
                if self.processor.is_processing() {
                    self.idle_waiters.push(reply);
                } else {
                    let _ = reply.send(());
                }
            }
        }
    }

    fn ensure_idle(&self) -> Result<()> {
        if self.processor.is_processing() {
            Err(CheckoutError::PaymentInProgress)
        } else {
            Ok(())
        }
    }

    fn restart(&mut self) -> Result<AnimationHandle> {
        self.ensure_idle()?;
        for field in PaymentField::ALL {
            self.apply_input(field, "");
        }
        self.last_settlement = None;
        info!("checkout restarted");
        Ok(self.wizard.go_to_step(WizardStep::Details))
    }

    fn start_payment(&mut self) -> Result<()> {
        let request = self
            .processor
            .begin(&self.wizard, card_last_four(self.card_number.display()))?;
        let gateway = Arc::clone(&self.gateway);
        let settled = self.settled_tx.clone();
        self.payment_task = Some(tokio::spawn(async move {
            let outcome = gateway.charge(request).await;
            let _ = settled.send(outcome);
        }));
        Ok(())
    }

    fn settle(&mut self, outcome: GatewayOutcome) {
        self.payment_task = None;
        if let Some(settlement) = self.processor.settle(&mut self.wizard, outcome) {
            self.last_settlement = Some(settlement);
        }
        for waiter in self.idle_waiters.drain(..) {
            let _ = waiter.send(());
        }
    }

    fn apply_input(&mut self, field: PaymentField, raw: &str) -> String {
        let buffer = match field {
            PaymentField::CardNumber => &mut self.card_number,
            PaymentField::Expiry => &mut self.expiry,
            PaymentField::Cvv => &mut self.cvv,
        };
        let formatted = buffer.apply(raw).to_string();
        if let Some(id) = self.wizard.handles().field(field) {
            self.ui.set_value(id, &formatted);
        }
        debug!(%field, "payment field reformatted");
        formatted
    }

    fn snapshot(&self) -> CheckoutSnapshot {
        CheckoutSnapshot {
            state: self.wizard.state(),
            card_number: self.card_number.display().to_string(),
            expiry: self.expiry.display().to_string(),
            cvv: self.cvv.display().to_string(),
            processing: self.processor.is_processing(),
            last_settlement: self.last_settlement.clone(),
        }
    }

    fn teardown(&mut self) {
        if let Some(task) = self.payment_task.take() {
            task.abort();
            debug!("in-flight payment cancelled");
        }
        self.processor.abandon(&self.wizard);
        self.notifier.shutdown();
        for waiter in self.idle_waiters.drain(..) {
            let _ = waiter.send(());
        }
    }
}
