use crate::catalog::{CreatorCard, ALL_CATEGORIES, SUBSCRIBE_REDIRECT_MESSAGE};
use crate::cli::commands::{joined_argument, CommandDefinition};
use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::{output, render};
use crate::notifications::NotificationKind;

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![
        CommandDefinition::new("creators", "List featured creators", "creators", cmd_creators),
        CommandDefinition::new(
            "filter",
            "Show creators in one category",
            "filter <all|category>",
            cmd_filter,
        ),
        CommandDefinition::new(
            "search",
            "Find creators by name or description",
            "search <term>",
            cmd_search,
        ),
        CommandDefinition::new(
            "subscribe",
            "Open the checkout for a creator",
            "subscribe <creator name>",
            cmd_subscribe,
        ),
    ]
}

fn cmd_creators(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let cards: Vec<&CreatorCard> = context.catalog.cards().iter().collect();
    context.catalog.apply(context.ui.as_ref(), &cards);
    print_cards("Featured creators", &cards);
    output::hint(format!(
        "Categories: {}, {}",
        ALL_CATEGORIES,
        context.catalog.categories().join(", ")
    ));
    Ok(())
}

fn cmd_filter(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let category = args.first().ok_or_else(|| {
        CommandError::InvalidArguments("usage: filter <all|category>".into())
    })?;
    let shown = context.catalog.filter(category);
    context.catalog.apply(context.ui.as_ref(), &shown);
    print_cards(&format!("Category: {category}"), &shown);
    Ok(())
}

fn cmd_search(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let term = joined_argument(args, "search <term>")?;
    let shown = context.catalog.search(&term);
    context.catalog.apply(context.ui.as_ref(), &shown);
    print_cards(&format!("Search: {term}"), &shown);
    Ok(())
}

fn cmd_subscribe(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let name = joined_argument(args, "subscribe <creator name>")?;
    let Some(card) = context.catalog.find(&name) else {
        return Err(CommandError::InvalidArguments(format!(
            "no featured creator named `{name}` (see `creators`)"
        )));
    };
    let creator = card.name.clone();
    context.block_on(context.checkout.restart())?;
    context
        .notifier
        .emit(SUBSCRIBE_REDIRECT_MESSAGE, NotificationKind::Success);
    let snapshot = context.block_on(context.checkout.snapshot())?;
    output::info(format!("Subscribing to {creator}."));
    render::print_checkout(context.ui.as_ref(), &snapshot);
    Ok(())
}

fn print_cards(title: &str, cards: &[&CreatorCard]) {
    output::section(title);
    if cards.is_empty() {
        output::info("  No creators match.");
        return;
    }
    for card in cards {
        output::info(format!(
            "  {:<14} {:<20} [{}]",
            card.name, card.kind, card.category
        ));
    }
}
