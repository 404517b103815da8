//! `/bill` - billing operations.
//!
//! `view` is self-service; `admin`, `create`, and `delete` are staff
//! operations on another user's bill list.

use std::sync::Arc;

use serenity::all::{
    CommandInteraction, CommandOptionType, Context, CreateCommand, CreateCommandOption,
    CreateInteractionResponse, CreateInteractionResponseMessage, CreateMessage, ResolvedOption,
};
use tracing::warn;

use crate::common::error::AppError;
use crate::discord::client::AppState;
use crate::discord::commands::{
    option_str, option_user, reply_ephemeral, require_admin, subcommand,
};
use crate::discord::messages::{bills_embed, paid_row, payment_request_embed};
use crate::store::types::Recurrence;

pub fn register() -> CreateCommand {
    CreateCommand::new("bill")
        .description("Billing commands")
        .add_option(CreateCommandOption::new(
            CommandOptionType::SubCommand,
            "view",
            "View your current bill status",
        ))
        .add_option(
            CreateCommandOption::new(
                CommandOptionType::SubCommand,
                "admin",
                "View another user's bills (Admin only)",
            )
            .add_sub_option(
                CreateCommandOption::new(CommandOptionType::User, "user", "Bill owner")
                    .required(true),
            ),
        )
        .add_option(
            CreateCommandOption::new(
                CommandOptionType::SubCommand,
                "create",
                "Create a bill for a user (Admin only)",
            )
            .add_sub_option(
                CreateCommandOption::new(CommandOptionType::User, "user", "Bill owner")
                    .required(true),
            )
            .add_sub_option(
                CreateCommandOption::new(CommandOptionType::String, "amount", "Amount due")
                    .required(true),
            )
            .add_sub_option(
                CreateCommandOption::new(CommandOptionType::String, "type", "Recurrence")
                    .required(true)
                    .add_string_choice("One-time", "one_time")
                    .add_string_choice("Weekly", "weekly")
                    .add_string_choice("Monthly", "monthly")
                    .add_string_choice("Yearly", "yearly"),
            )
            .add_sub_option(
                CreateCommandOption::new(
                    CommandOptionType::String,
                    "due",
                    "Due date (MM/DD/YYYY)",
                )
                .required(true),
            ),
        )
        .add_option(
            CreateCommandOption::new(
                CommandOptionType::SubCommand,
                "delete",
                "Delete a bill (Admin only)",
            )
            .add_sub_option(
                CreateCommandOption::new(CommandOptionType::User, "user", "Bill owner")
                    .required(true),
            )
            .add_sub_option(
                CreateCommandOption::new(CommandOptionType::String, "id", "Bill ID")
                    .required(true),
            ),
        )
}

pub async fn run(
    context: &Context,
    state: &Arc<AppState>,
    command: &CommandInteraction,
) -> Result<(), AppError> {
    let options = command.data.options();
    match subcommand(&options) {
        Some(("view", _)) => view(context, state, command).await,
        Some(("admin", nested)) => admin_view(context, state, command, nested).await,
        Some(("create", nested)) => create(context, state, command, nested).await,
        Some(("delete", nested)) => delete(context, state, command, nested).await,
        _ => reply_ephemeral(context, command, "❌ Unknown bill subcommand.").await,
    }
}

async fn view(
    context: &Context,
    state: &Arc<AppState>,
    command: &CommandInteraction,
) -> Result<(), AppError> {
    let bills = {
        let store = state.store.lock().await;
        store.bills_for(command.user.id).to_vec()
    };
    if bills.is_empty() {
        return reply_ephemeral(context, command, "You have no active bills.").await;
    }

    command
        .create_response(
            &context.http,
            CreateInteractionResponse::Message(
                CreateInteractionResponseMessage::new()
                    .embed(bills_embed("Your Bills", &bills, false))
                    .ephemeral(true),
            ),
        )
        .await?;
    Ok(())
}

async fn admin_view(
    context: &Context,
    state: &Arc<AppState>,
    command: &CommandInteraction,
    options: &[ResolvedOption<'_>],
) -> Result<(), AppError> {
    if !require_admin(context, command).await? {
        return Ok(());
    }
    let Some(owner) = option_user(options, "user") else {
        return reply_ephemeral(context, command, "❌ No user provided.").await;
    };

    let bills = {
        let store = state.store.lock().await;
        store.bills_for(owner).to_vec()
    };
    if bills.is_empty() {
        return reply_ephemeral(context, command, format!("<@{}> has no bills.", owner)).await;
    }

    command
        .create_response(
            &context.http,
            CreateInteractionResponse::Message(
                CreateInteractionResponseMessage::new()
                    .content(format!("Bills for <@{}>:", owner))
                    .embed(bills_embed("Bills", &bills, true))
                    .ephemeral(true),
            ),
        )
        .await?;
    Ok(())
}

async fn create(
    context: &Context,
    state: &Arc<AppState>,
    command: &CommandInteraction,
    options: &[ResolvedOption<'_>],
) -> Result<(), AppError> {
    if !require_admin(context, command).await? {
        return Ok(());
    }
    let (Some(owner), Some(amount), Some(kind), Some(due)) = (
        option_user(options, "user"),
        option_str(options, "amount"),
        option_str(options, "type"),
        option_str(options, "due"),
    ) else {
        return reply_ephemeral(context, command, "❌ Missing bill details.").await;
    };
    let Some(recurrence) = Recurrence::from_choice(&kind) else {
        return reply_ephemeral(context, command, "❌ Unknown recurrence type.").await;
    };

    let bill = {
        let mut store = state.store.lock().await;
        let id = store.create_bill(owner, recurrence, &amount, &due);
        store
            .bills_for(owner)
            .iter()
            .find(|bill| bill.id == id)
            .cloned()
    };
    let Some(bill) = bill else {
        return reply_ephemeral(context, command, "❌ Failed to create the bill.").await;
    };

    // DM the owner a payment confirmation button; failure to deliver does
    // not undo the bill.
    let dm_note = match owner.create_dm_channel(&context.http).await {
        Ok(dm) => {
            let message = CreateMessage::new()
                .embed(payment_request_embed(&bill))
                .components(vec![paid_row(&bill.id)]);
            match dm.id.send_message(&context.http, message).await {
                Ok(_) => "",
                Err(e) => {
                    warn!("Failed to DM bill {} to {}: {}", bill.id, owner, e);
                    " (could not DM the user)"
                }
            }
        }
        Err(e) => {
            warn!("Failed to open DM channel to {}: {}", owner, e);
            " (could not DM the user)"
        }
    };

    reply_ephemeral(
        context,
        command,
        format!(
            "✅ Created bill `{}` of {} for <@{}>, due {}.{}",
            bill.id, bill.amount, owner, bill.due_date, dm_note
        ),
    )
    .await
}

async fn delete(
    context: &Context,
    state: &Arc<AppState>,
    command: &CommandInteraction,
    options: &[ResolvedOption<'_>],
) -> Result<(), AppError> {
    if !require_admin(context, command).await? {
        return Ok(());
    }
    let (Some(owner), Some(bill_id)) =
        (option_user(options, "user"), option_str(options, "id"))
    else {
        return reply_ephemeral(context, command, "❌ Missing user or bill id.").await;
    };

    let removed = {
        let mut store = state.store.lock().await;
        store.delete_bill(owner, &bill_id)
    };
    match removed {
        Ok(bill) => {
            reply_ephemeral(
                context,
                command,
                format!("✅ Deleted bill `{}` ({}) for <@{}>.", bill.id, bill.status, owner),
            )
            .await
        }
        Err(e) => reply_ephemeral(context, command, format!("❌ {}", e)).await,
    }
}
