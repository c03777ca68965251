use std::{
    borrow::Cow,
    collections::HashMap,
    io::{self, BufRead},
};

use colored::Colorize;
use rustyline::{
    completion::{Completer, Pair},
    error::ReadlineError,
    highlight::Highlighter,
    hint::{Hint, Hinter},
    history::DefaultHistory,
    validate::Validator,
    Cmd, Context as ReadlineContext, Editor, Helper, KeyEvent,
};

use crate::catalog::ALL_CATEGORIES;
use crate::cli::core::{CliError, CliMode, CommandError, LoopControl, ShellContext};
use crate::cli::output::{self, OutputPreferences};
use crate::config::SETTABLE_KEYS;
use crate::wizard::BillingPeriod;

const SCRIPT_ENV: &str = "CREATORHUB_CLI_SCRIPT";

pub fn run_cli() -> Result<(), CliError> {
    let mode = if std::env::var_os(SCRIPT_ENV).is_some() {
        CliMode::Script
    } else {
        CliMode::Interactive
    };
    output::set_preferences(OutputPreferences {
        plain: mode == CliMode::Script,
    });

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let _guard = runtime.enter();
    let mut context = ShellContext::new(mode, runtime.handle().clone())?;

    let result = match mode {
        CliMode::Interactive => run_interactive(&mut context),
        CliMode::Script => run_script(&mut context),
    };
    context.shutdown();
    result
}

fn run_interactive(context: &mut ShellContext) -> Result<(), CliError> {
    let mut editor = Editor::<CheckoutHelper, DefaultHistory>::new()?;
    editor.set_helper(Some(CheckoutHelper::for_context(context)));
    editor.bind_sequence(KeyEvent::from('?'), Cmd::Complete);
    output::info("CreatorHub checkout shell. Type `help` for commands.");

    while context.running {
        context.flush_toasts();
        let prompt = context.prompt();
        match editor.readline(&prompt) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                editor.add_history_entry(trimmed).ok();
                match handle_line(context, trimmed) {
                    Ok(LoopControl::Continue) => {}
                    Ok(LoopControl::Exit) => break,
                    Err(err) => context.report_error(err),
                }
            }
            Err(ReadlineError::Interrupted) => {
                if context.confirm_exit()? {
                    break;
                }
            }
            Err(ReadlineError::Eof) => {
                output::info("Exiting shell.");
                break;
            }
            Err(err) => return Err(err.into()),
        }
    }

    Ok(())
}

fn run_script(context: &mut ShellContext) -> Result<(), CliError> {
    for line in io::stdin().lock().lines() {
        if !context.running {
            break;
        }
        match handle_line(context, &line?) {
            Ok(LoopControl::Continue) => {}
            Ok(LoopControl::Exit) => break,
            Err(err) => context.report_error(err),
        }
    }
    Ok(())
}

/// A command name (lowercased) and its arguments. Blank and `#` lines yield `None`.
#[derive(Debug, PartialEq, Eq)]
struct ParsedLine {
    command: String,
    raw: String,
    args: Vec<String>,
}

fn tokenize(line: &str) -> Result<Option<ParsedLine>, shell_words::ParseError> {
    let mut tokens = shell_words::split(line)?.into_iter();
    let Some(raw) = tokens.next() else {
        return Ok(None);
    };
    if raw.starts_with('#') {
        return Ok(None);
    }
    Ok(Some(ParsedLine {
        command: raw.to_lowercase(),
        raw,
        args: tokens.collect(),
    }))
}

fn handle_line(context: &mut ShellContext, line: &str) -> Result<LoopControl, CommandError> {
    let parsed = match tokenize(line) {
        Ok(Some(parsed)) => parsed,
        Ok(None) => return Ok(LoopControl::Continue),
        Err(err) => {
            output::warning(format!("Could not read `{}`: {err}", line.trim()));
            return Ok(LoopControl::Continue);
        }
    };
    let args: Vec<&str> = parsed.args.iter().map(String::as_str).collect();
    context.last_command = Some(line.trim().to_string());

    let control = context.dispatch(&parsed.command, &parsed.raw, &args)?;
    if control == LoopControl::Exit {
        context.running = false;
    }
    Ok(control)
}

/// Usage text shown after a complete command name. Never inserted into the line.
struct UsageHint(String);

impl Hint for UsageHint {
    fn display(&self) -> &str {
        &self.0
    }

    fn completion(&self) -> Option<&str> {
        None
    }
}

/// Completes command names, then the values each command accepts: billing
/// periods, categories, creator names and configuration keys.
struct CheckoutHelper {
    commands: Vec<String>,
    arguments: HashMap<String, Vec<String>>,
    usages: HashMap<String, String>,
}

impl CheckoutHelper {
    fn for_context(context: &ShellContext) -> Self {
        let mut commands: Vec<String> = context
            .command_names()
            .into_iter()
            .map(str::to_string)
            .collect();
        commands.sort();

        let usages = context
            .registry
            .iter()
            .filter_map(|definition| {
                let rest = definition.usage.strip_prefix(definition.name)?.trim();
                (!rest.is_empty()).then(|| (definition.name.to_string(), rest.to_string()))
            })
            .collect();

        let mut arguments = HashMap::new();
        arguments.insert(
            "select".to_string(),
            BillingPeriod::ALL
                .iter()
                .map(|period| period.slug().to_string())
                .collect(),
        );
        arguments.insert(
            "filter".to_string(),
            std::iter::once(ALL_CATEGORIES)
                .chain(context.catalog.categories())
                .map(str::to_string)
                .collect(),
        );
        arguments.insert(
            "subscribe".to_string(),
            context
                .catalog
                .cards()
                .iter()
                .map(|card| card.name.clone())
                .collect(),
        );
        arguments.insert(
            "config".to_string(),
            vec!["show".into(), "path".into(), "set".into()],
        );
        arguments.insert("pay".to_string(), vec!["--wait".into()]);
        arguments.insert("help".to_string(), commands.clone());

        Self {
            commands,
            arguments,
            usages,
        }
    }

    fn candidates(&self, completed: &[&str]) -> Vec<String> {
        match completed {
            [] => self.commands.clone(),
            ["config", "set"] => SETTABLE_KEYS.iter().map(|key| key.to_string()).collect(),
            [command] => self
                .arguments
                .get(&command.to_ascii_lowercase())
                .cloned()
                .unwrap_or_default(),
            _ => Vec::new(),
        }
    }
}

/// Splits the text before the cursor into finished words and the word being typed.
fn split_at_cursor(prefix: &str) -> (Vec<&str>, &str) {
    let mut words: Vec<&str> = prefix.split_whitespace().collect();
    let current = if prefix.ends_with(char::is_whitespace) {
        ""
    } else {
        words.pop().unwrap_or("")
    };
    (words, current)
}

impl Helper for CheckoutHelper {}

impl Completer for CheckoutHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &ReadlineContext<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let (completed, current) = split_at_cursor(&line[..pos]);
        let needle = current.to_ascii_lowercase();
        let matches = self
            .candidates(&completed)
            .into_iter()
            .filter(|candidate| candidate.to_ascii_lowercase().starts_with(&needle))
            .map(|candidate| Pair {
                display: candidate.clone(),
                replacement: candidate,
            })
            .collect();
        Ok((pos - current.len(), matches))
    }
}

impl Hinter for CheckoutHelper {
    type Hint = UsageHint;

    fn hint(&self, line: &str, pos: usize, _ctx: &ReadlineContext<'_>) -> Option<UsageHint> {
        if pos < line.len() {
            return None;
        }
        match split_at_cursor(line) {
            (words, "") if words.len() == 1 => self
                .usages
                .get(&words[0].to_ascii_lowercase())
                .map(|usage| UsageHint(usage.clone())),
            _ => None,
        }
    }
}

impl Highlighter for CheckoutHelper {
    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        Cow::Owned(hint.dimmed().to_string())
    }
}

impl Validator for CheckoutHelper {}

#[cfg(test)]
mod tests {
    use super::*;

    fn helper() -> CheckoutHelper {
        let mut arguments = HashMap::new();
        arguments.insert("select".to_string(), vec!["monthly".into(), "yearly".into()]);
        arguments.insert(
            "subscribe".to_string(),
            vec!["Sophia Chen".into(), "Marcus Webb".into()],
        );
        CheckoutHelper {
            commands: vec!["config".into(), "search".into(), "select".into()],
            arguments,
            usages: HashMap::new(),
        }
    }

    #[test]
    fn tokenize_respects_quotes_and_skips_comments() {
        let parsed = tokenize("Search \"digital artist\"").unwrap().unwrap();
        assert_eq!(parsed.command, "search");
        assert_eq!(parsed.raw, "Search");
        assert_eq!(parsed.args, vec!["digital artist".to_string()]);

        assert_eq!(tokenize("# pay now").unwrap(), None);
        assert_eq!(tokenize("   ").unwrap(), None);
        assert!(tokenize("search \"unterminated").is_err());
    }

    #[test]
    fn split_tracks_the_word_under_the_cursor() {
        assert_eq!(split_at_cursor("sel"), (vec![], "sel"));
        assert_eq!(split_at_cursor("select "), (vec!["select"], ""));
        assert_eq!(split_at_cursor("config set pay"), (vec!["config", "set"], "pay"));
    }

    #[test]
    fn candidates_follow_the_command_being_typed() {
        let helper = helper();
        assert_eq!(helper.candidates(&[]).len(), 3);
        assert_eq!(helper.candidates(&["SELECT"]), vec!["monthly", "yearly"]);
        assert_eq!(
            helper.candidates(&["config", "set"]),
            SETTABLE_KEYS.iter().map(|key| key.to_string()).collect::<Vec<_>>()
        );
        assert!(helper.candidates(&["select", "yearly"]).is_empty());
        assert!(helper.candidates(&["search"]).is_empty());
    }
}
