//! `/client` and `/close` - in-ticket commands.

use std::sync::Arc;

use serenity::all::{
    ButtonStyle, CommandInteraction, Context, CreateActionRow, CreateButton, CreateCommand,
    CreateEmbed, CreateInteractionResponse, CreateInteractionResponseMessage,
};

use crate::common::error::AppError;
use crate::discord::client::AppState;
use crate::discord::commands::{is_admin, reply_ephemeral, require_admin};
use crate::discord::messages::YELLOW;

pub fn register_client() -> CreateCommand {
    CreateCommand::new("client").description("Give the ticket creator the client role (Admin only)")
}

pub fn register_close() -> CreateCommand {
    CreateCommand::new("close").description("Close the current ticket and create a transcript")
}

/// Grant the configured client role to the current ticket's creator.
pub async fn run_client(
    context: &Context,
    state: &Arc<AppState>,
    command: &CommandInteraction,
) -> Result<(), AppError> {
    if !require_admin(context, command).await? {
        return Ok(());
    }
    let Some(guild_id) = command.guild_id else {
        return reply_ephemeral(context, command, "❌ This command only works in a server.").await;
    };

    let ticket = {
        let store = state.store.lock().await;
        store.ticket_for_channel(command.channel_id).cloned()
    };
    let Some(ticket) = ticket else {
        return reply_ephemeral(
            context,
            command,
            "❌ This command can only be used in ticket channels.",
        )
        .await;
    };

    let role_name = &state.config.roles.client_role_name;
    let roles = guild_id.roles(&context.http).await?;
    let Some((role_id, _)) = roles.iter().find(|(_, role)| &role.name == role_name) else {
        return reply_ephemeral(
            context,
            command,
            format!("❌ Client role \"{}\" not found. Please create it first.", role_name),
        )
        .await;
    };

    let creator = guild_id.member(&context.http, ticket.user_id).await?;
    creator.add_role(&context.http, *role_id).await?;

    command
        .create_response(
            &context.http,
            CreateInteractionResponse::Message(CreateInteractionResponseMessage::new().content(
                format!("✅ <@{}> has been given the <@&{}> role!", ticket.user_id, role_id),
            )),
        )
        .await?;
    Ok(())
}

/// Ask for confirmation before closing the current ticket.
pub async fn run_close(
    context: &Context,
    state: &Arc<AppState>,
    command: &CommandInteraction,
) -> Result<(), AppError> {
    let ticket = {
        let store = state.store.lock().await;
        store.ticket_for_channel(command.channel_id).cloned()
    };
    let Some(ticket) = ticket else {
        return reply_ephemeral(
            context,
            command,
            "❌ This command can only be used in ticket channels.",
        )
        .await;
    };

    if command.user.id != ticket.user_id && !is_admin(command) {
        return reply_ephemeral(
            context,
            command,
            "❌ Only the ticket creator or an administrator can close this ticket.",
        )
        .await;
    }

    let embed = CreateEmbed::new()
        .title("⚠️ Close Ticket?")
        .description("Are you sure you want to close this ticket? A transcript will be created.")
        .color(YELLOW);
    let row = CreateActionRow::Buttons(vec![
        CreateButton::new("close_confirm")
            .label("Yes, Close Ticket")
            .style(ButtonStyle::Danger),
        CreateButton::new("close_cancel")
            .label("Cancel")
            .style(ButtonStyle::Secondary),
    ]);

    command
        .create_response(
            &context.http,
            CreateInteractionResponse::Message(
                CreateInteractionResponseMessage::new()
                    .embed(embed)
                    .components(vec![row])
                    .ephemeral(true),
            ),
        )
        .await?;
    Ok(())
}
