use crate::cli::commands::{joined_argument, CommandDefinition};
use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::{output, render};
use crate::errors::CheckoutError;
use crate::formatting::PaymentField;
use crate::payment::{format_long_date, PaymentSettlement};
use crate::wizard::BillingPeriod;

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![
        CommandDefinition::new("status", "Show the checkout wizard", "status", cmd_status),
        CommandDefinition::new("plans", "List billing periods", "plans", cmd_plans),
        CommandDefinition::new(
            "select",
            "Choose a billing period",
            "select <monthly|quarterly|yearly|lifetime>",
            cmd_select,
        ),
        CommandDefinition::new(
            "continue",
            "Move from details to payment",
            "continue",
            cmd_continue,
        ),
        CommandDefinition::new("back", "Return from payment to details", "back", cmd_back),
        CommandDefinition::new("card", "Type the card number", "card <digits>", cmd_card),
        CommandDefinition::new("expiry", "Type the expiry date", "expiry <MMYY>", cmd_expiry),
        CommandDefinition::new("cvv", "Type the security code", "cvv <digits>", cmd_cvv),
        CommandDefinition::new(
            "pay",
            "Submit the payment",
            "pay [--wait]",
            cmd_pay,
        ),
        CommandDefinition::new(
            "wait",
            "Wait for the payment in flight to settle",
            "wait",
            cmd_wait,
        ),
    ]
}

fn cmd_status(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let snapshot = context.block_on(context.checkout.snapshot())?;
    render::print_checkout(context.ui.as_ref(), &snapshot);
    Ok(())
}

fn cmd_plans(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let snapshot = context.block_on(context.checkout.snapshot())?;
    output::section("Billing periods");
    for period in BillingPeriod::ALL {
        let marker = if period == snapshot.state.selected_period {
            "*"
        } else {
            " "
        };
        let cadence = match period.months() {
            Some(1) => "covers 1 month".to_string(),
            Some(months) => format!("covers {months} months"),
            None => "lifetime access".to_string(),
        };
        output::info(format!(
            "  {marker} {:<10} {:<10} {cadence}",
            period.slug(),
            period.label()
        ));
    }
    Ok(())
}

fn cmd_select(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let raw = args.first().ok_or_else(|| {
        CommandError::InvalidArguments(
            "usage: select <monthly|quarterly|yearly|lifetime>".into(),
        )
    })?;
    let period: BillingPeriod = raw.parse()?;
    context.block_on(context.checkout.select_period(period))?;
    output::success(format!("{} plan selected.", period.label()));
    Ok(())
}

fn cmd_continue(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let checkout = context.checkout.clone();
    context.block_on(async move {
        checkout.continue_to_payment().await?.finished().await;
        Ok::<_, CheckoutError>(())
    })?;
    output::info("Step 2 of 3: Payment");
    Ok(())
}

fn cmd_back(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let checkout = context.checkout.clone();
    context.block_on(async move {
        checkout.back_to_details().await?.finished().await;
        Ok::<_, CheckoutError>(())
    })?;
    output::info("Step 1 of 3: Details");
    Ok(())
}

fn cmd_card(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    type_into(context, PaymentField::CardNumber, args, "card <digits>")
}

fn cmd_expiry(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    type_into(context, PaymentField::Expiry, args, "expiry <MMYY>")
}

fn cmd_cvv(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    type_into(context, PaymentField::Cvv, args, "cvv <digits>")
}

fn type_into(
    context: &mut ShellContext,
    field: PaymentField,
    args: &[&str],
    usage: &str,
) -> CommandResult {
    let raw = joined_argument(args, usage)?;
    let formatted = context.block_on(context.checkout.input(field, raw))?;
    output::info(format!("{}: {}", field.label(), formatted));
    Ok(())
}

fn cmd_pay(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let wait = match args.first().copied() {
        None => false,
        Some("--wait") => true,
        Some(other) => {
            return Err(CommandError::InvalidArguments(format!(
                "unknown option `{other}` (usage: pay [--wait])"
            )))
        }
    };
    context.block_on(context.checkout.complete_payment())?;
    output::info(&context.config.labels.processing);
    if wait {
        cmd_wait(context, &[])?;
    }
    Ok(())
}

fn cmd_wait(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let checkout = context.checkout.clone();
    let snapshot = context.block_on(async move {
        checkout.wait_idle().await?;
        checkout.snapshot().await
    })?;
    match snapshot.last_settlement {
        Some(PaymentSettlement::Confirmed {
            receipt,
            next_billing,
        }) => {
            output::success(format!(
                "Payment confirmed for the {} plan (reference {}).",
                receipt.period.label(),
                short_reference(&receipt.reference.simple().to_string())
            ));
            if let Some(next) = next_billing {
                output::info(format!("Next billing: {}", format_long_date(next)));
            }
        }
        Some(PaymentSettlement::Failed(err)) => {
            output::warning(format!("Last payment did not go through: {err}"));
        }
        None => output::info("No payment has been submitted."),
    }
    Ok(())
}

fn short_reference(reference: &str) -> &str {
    reference.get(..8).unwrap_or(reference)
}
