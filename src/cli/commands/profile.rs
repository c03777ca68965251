use crate::cli::commands::{joined_argument, CommandDefinition};
use crate::cli::core::{CliMode, CommandResult, ShellContext};
use crate::cli::{io, output};

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![
        CommandDefinition::new(
            "follow",
            "Follow or unfollow the creator",
            "follow",
            cmd_follow,
        ),
        CommandDefinition::new("tip", "Send the creator a tip", "tip <amount>", cmd_tip),
        CommandDefinition::new(
            "toasts",
            "List notifications currently on screen",
            "toasts",
            cmd_toasts,
        ),
    ]
}

fn cmd_follow(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    context.profile.toggle_follow();
    Ok(())
}

fn cmd_tip(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let amount = if args.is_empty() && context.mode == CliMode::Interactive {
        io::prompt_text(&context.theme, "Enter tip amount ($)")?
    } else {
        joined_argument(args, "tip <amount>")?
    };
    // The rejection is already shown as a toast.
    let _ = context.profile.send_tip(&amount);
    Ok(())
}

fn cmd_toasts(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let active = context.notifier.active();
    if active.is_empty() {
        output::info("No notifications on screen.");
        return Ok(());
    }
    output::section("Notifications");
    for toast in active {
        output::info(format!(
            "  {:<8} {:<9} {}",
            toast.kind.to_string(),
            format!("{:?}", toast.phase).to_lowercase(),
            toast.message
        ));
    }
    Ok(())
}
