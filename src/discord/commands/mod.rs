//! Slash command registration and dispatch.

pub mod bill;
pub mod contract;
pub mod corporate;
pub mod setup;
pub mod ticket;

use std::sync::Arc;

use serenity::all::{
    CommandInteraction, Context, CreateCommand, CreateInteractionResponse,
    CreateInteractionResponseMessage, ResolvedOption, ResolvedValue,
};
use serenity::model::id::{ChannelId, UserId};
use tracing::warn;

use crate::common::error::AppError;
use crate::discord::client::AppState;

/// The full command set, registered on ready.
pub fn register() -> Vec<CreateCommand> {
    vec![
        setup::register(),
        ticket::register_client(),
        ticket::register_close(),
        contract::register(),
        bill::register(),
        corporate::register(),
    ]
}

/// Route a slash command to its handler.
pub async fn dispatch(
    context: &Context,
    state: &Arc<AppState>,
    command: &CommandInteraction,
) -> Result<(), AppError> {
    match command.data.name.as_str() {
        "setup" => setup::run(context, state, command).await,
        "client" => ticket::run_client(context, state, command).await,
        "close" => ticket::run_close(context, state, command).await,
        "contract" => contract::run(context, state, command).await,
        "bill" => bill::run(context, state, command).await,
        "corporate" => corporate::run(context, state, command).await,
        other => {
            warn!("Received unknown command /{}", other);
            reply_ephemeral(context, command, "❌ Unknown command.").await
        }
    }
}

/// Administrator check from the interaction's resolved member permissions.
pub fn is_admin(command: &CommandInteraction) -> bool {
    crate::discord::member_is_admin(command.member.as_deref())
}

pub async fn reply_ephemeral(
    context: &Context,
    command: &CommandInteraction,
    content: impl Into<String>,
) -> Result<(), AppError> {
    command
        .create_response(
            &context.http,
            CreateInteractionResponse::Message(
                CreateInteractionResponseMessage::new()
                    .content(content)
                    .ephemeral(true),
            ),
        )
        .await?;
    Ok(())
}

/// Guard shared by the admin-only commands: replies ephemerally and
/// returns false when the invoker lacks Administrator.
pub async fn require_admin(
    context: &Context,
    command: &CommandInteraction,
) -> Result<bool, AppError> {
    if is_admin(command) {
        return Ok(true);
    }
    reply_ephemeral(
        context,
        command,
        "❌ You need Administrator permissions to use this command.",
    )
    .await?;
    Ok(false)
}

// Option extractors over the resolved option list.

pub fn option_channel(options: &[ResolvedOption<'_>], name: &str) -> Option<ChannelId> {
    options.iter().find_map(|option| match &option.value {
        ResolvedValue::Channel(channel) if option.name == name => Some(channel.id),
        _ => None,
    })
}

pub fn option_str(options: &[ResolvedOption<'_>], name: &str) -> Option<String> {
    options.iter().find_map(|option| match &option.value {
        ResolvedValue::String(value) if option.name == name => Some((*value).to_string()),
        _ => None,
    })
}

pub fn option_user(options: &[ResolvedOption<'_>], name: &str) -> Option<UserId> {
    options.iter().find_map(|option| match &option.value {
        ResolvedValue::User(user, _) if option.name == name => Some(user.id),
        _ => None,
    })
}

/// First subcommand in the option list, with its nested options.
pub fn subcommand<'a>(
    options: &'a [ResolvedOption<'a>],
) -> Option<(&'a str, &'a [ResolvedOption<'a>])> {
    options.iter().find_map(|option| match &option.value {
        ResolvedValue::SubCommand(nested) => Some((option.name, nested.as_slice())),
        _ => None,
    })
}
