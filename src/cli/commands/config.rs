use crate::cli::commands::CommandDefinition;
use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::output;
use crate::config::SETTABLE_KEYS;

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![CommandDefinition::new(
        "config",
        "Show, locate or change the configuration",
        "config [show|path|set <key> <value>]",
        cmd_config,
    )]
}

fn cmd_config(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    match args.first().copied().unwrap_or("show") {
        "show" => {
            let config = &context.config;
            output::section("Configuration");
            output::info(format!("  Creator        : {}", config.creator_name));
            output::info(format!("  Default plan   : {}", config.default_period));
            output::info(format!(
                "  Payment delay  : {} ms",
                config.timings.payment_delay_ms
            ));
            output::info(format!(
                "  Toast timings  : enter {} ms, display {} ms, exit {} ms",
                config.timings.notification_enter_ms,
                config.timings.notification_display_ms,
                config.timings.notification_exit_ms
            ));
            output::info(format!(
                "  Progress fill  : {:.2}% / {:.2}% / {:.2}%",
                config.progress_fill.details,
                config.progress_fill.payment,
                config.progress_fill.confirmation
            ));
            output::info(format!(
                "  Gateway result : {:?}",
                config.simulated_outcome
            ));
            Ok(())
        }
        "path" => {
            output::info(context.config_manager.path().display());
            Ok(())
        }
        "set" => {
            if args.len() < 3 {
                return Err(CommandError::InvalidArguments(format!(
                    "usage: config set <{}> <value>",
                    SETTABLE_KEYS.join("|")
                )));
            }
            let key = args[1];
            let value = args[2..].join(" ");
            let mut updated = context.config.clone();
            updated.set_value(key, &value)?;
            context.config_manager.save(&updated)?;
            context.config = updated;
            output::success(format!("Saved `{key}`."));
            output::hint("Changes take effect the next time the shell starts.");
            Ok(())
        }
        other => Err(CommandError::InvalidArguments(format!(
            "unknown config action `{other}` (use `show`, `path` or `set`)"
        ))),
    }
}
