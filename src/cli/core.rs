use std::future::Future;
use std::io;
use std::sync::Arc;

use dialoguer::theme::ColorfulTheme;
use strsim::levenshtein;
use tokio::runtime::Handle;
use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing::debug;

use crate::animation::TokioAnimator;
use crate::catalog::CreatorCatalog;
use crate::clock::SystemClock;
use crate::cli::commands::{self, CommandDefinition, CommandRegistry};
use crate::cli::{io as cli_io, output};
use crate::config::{Config, ConfigManager};
use crate::errors::{CheckoutError, ConfigError};
use crate::notifications::{NotificationEvent, NotificationPhase, Notifier};
use crate::payment::SimulatedGateway;
use crate::profile::ProfileController;
use crate::session::{CheckoutHandle, CheckoutSession, SessionDeps, SessionSettings};
use crate::ui::{ids, MemoryUi};

pub type CommandResult = Result<(), CommandError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Exit,
}

/// Fatal shell errors; the binary exits with status 1 on these.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Readline(#[from] rustyline::error::ReadlineError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Dialoguer(#[from] dialoguer::Error),
    #[error(transparent)]
    Checkout(#[from] CheckoutError),
}

/// Errors reported for a single command; the shell keeps running.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("{0}")]
    InvalidArguments(String),
    #[error(transparent)]
    Checkout(#[from] CheckoutError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Dialoguer(#[from] dialoguer::Error),
    #[error("exit requested")]
    ExitRequested,
}

pub struct ShellContext {
    pub(crate) mode: CliMode,
    pub(crate) running: bool,
    pub(crate) registry: CommandRegistry,
    pub(crate) theme: ColorfulTheme,
    pub(crate) last_command: Option<String>,
    pub(crate) config: Config,
    pub(crate) config_manager: ConfigManager,
    pub(crate) ui: Arc<MemoryUi>,
    pub(crate) notifier: Notifier,
    pub(crate) checkout: CheckoutHandle,
    pub(crate) profile: ProfileController,
    pub(crate) catalog: CreatorCatalog,
    runtime: Handle,
    toasts: broadcast::Receiver<NotificationEvent>,
}

impl ShellContext {
    /// Builds the page, the notifier and the checkout session on `runtime`.
    ///
    /// The caller must keep the runtime entered for the lifetime of the context.
    pub fn new(mode: CliMode, runtime: Handle) -> Result<Self, CliError> {
        let config_manager = ConfigManager::new()?;
        let config = config_manager.load()?;
        debug!(path = %config_manager.path().display(), "shell configuration ready");

        let mut elements = ids::subscription_page(&config.labels.complete_payment);
        elements.extend(ids::profile_page());
        let catalog = CreatorCatalog::featured();
        elements.extend(
            catalog
                .cards()
                .iter()
                .map(|card| (card.element_id(), crate::ui::Element::default())),
        );
        let ui = Arc::new(MemoryUi::with_elements(elements));
        let clock = Arc::new(SystemClock);

        let notifier = Notifier::new(ui.clone(), clock.clone(), config.notification_timings());
        let toasts = notifier.subscribe();
        let gateway = SimulatedGateway::new(config.payment_delay(), config.simulated_outcome.clone());
        let deps = SessionDeps {
            ui: ui.clone(),
            animator: Arc::new(TokioAnimator::new(ui.clone())),
            notifier: notifier.clone(),
            gateway: Arc::new(gateway),
            clock,
        };
        let checkout = CheckoutSession::spawn(deps, SessionSettings::from(&config));
        let profile = ProfileController::new(ui.clone(), notifier.clone(), config.creator_name.clone());

        Ok(Self {
            mode,
            running: true,
            registry: CommandRegistry::new(commands::all_definitions()),
            theme: ColorfulTheme::default(),
            last_command: None,
            config,
            config_manager,
            ui,
            notifier,
            checkout,
            profile,
            catalog,
            runtime,
            toasts,
        })
    }

    pub(crate) fn prompt(&self) -> String {
        format!("creatorhub [{}]> ", self.step_label())
    }

    fn step_label(&self) -> String {
        self.block_on(self.checkout.snapshot())
            .map(|snapshot| snapshot.state.current_step.title().to_lowercase())
            .unwrap_or_else(|_| "closed".into())
    }

    pub(crate) fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    pub(crate) fn command_names(&self) -> Vec<&'static str> {
        self.registry.names().collect()
    }

    pub(crate) fn command(&self, name: &str) -> Option<&CommandDefinition> {
        self.registry.get(name)
    }

    pub(crate) fn dispatch(
        &mut self,
        command: &str,
        raw: &str,
        args: &[&str],
    ) -> Result<LoopControl, CommandError> {
        let Some(handler) = self.registry.get(command).map(|definition| definition.handler)
        else {
            self.suggest_command(raw);
            return Ok(LoopControl::Continue);
        };
        let outcome = match handler(self, args) {
            Ok(()) => Ok(LoopControl::Continue),
            Err(CommandError::ExitRequested) => Ok(LoopControl::Exit),
            Err(err) => Err(err),
        };
        self.flush_toasts();
        outcome
    }

    pub(crate) fn suggest_command(&self, input: &str) {
        output::warning(format!(
            "Unknown command `{}`. Type `help` to see available commands.",
            input
        ));

        let lowered = input.to_lowercase();
        let best = self
            .registry
            .names()
            .map(|name| (levenshtein(name, &lowered), name))
            .min_by_key(|(distance, _)| *distance);

        if let Some((distance, name)) = best {
            if distance <= 3 {
                output::hint(format!("Did you mean `{}`?", name));
            }
        }
    }

    /// Prints toasts created since the last call.
    pub(crate) fn flush_toasts(&mut self) {
        loop {
            match self.toasts.try_recv() {
                Ok(event) if event.phase == NotificationPhase::Entering => {
                    output::toast(event.kind, &event.message);
                }
                Ok(_) => {}
                Err(TryRecvError::Lagged(skipped)) => {
                    debug!(skipped, "toast display lagged");
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }
    }

    pub(crate) fn confirm_exit(&self) -> Result<bool, CliError> {
        if self.mode == CliMode::Script {
            return Ok(true);
        }
        cli_io::confirm_action(&self.theme, "Exit shell?", true).map_err(|err| match err {
            CommandError::Dialoguer(err) => CliError::Dialoguer(err),
            other => CliError::Io(io::Error::new(io::ErrorKind::Other, other.to_string())),
        })
    }

    pub(crate) fn report_error(&self, err: CommandError) {
        match err {
            CommandError::ExitRequested => {}
            CommandError::InvalidArguments(message) => {
                output::error(message);
                output::hint("Use `help <command>` for usage details.");
            }
            other => output::error(other),
        }
    }

    /// Cancels pending work before the runtime goes away.
    pub(crate) fn shutdown(&mut self) {
        if let Err(err) = self.block_on(self.checkout.shutdown()) {
            debug!(error = %err, "checkout session already closed");
        }
        self.notifier.shutdown();
        self.flush_toasts();
        self.running = false;
    }
}
