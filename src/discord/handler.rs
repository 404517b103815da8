//! Gateway event handler: routes every event to the right module.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serenity::all::{
    ActivityData, Command, Context, CreateEmbed, CreateMessage, EventHandler, GuildId, Interaction,
    Member, Message, Ready, RoleId, Timestamp,
};
use serenity::async_trait;
use tracing::{error, info, warn};

use crate::discord::client::{app_state, AppState};
use crate::discord::commands;
use crate::discord::components;
use crate::discord::dispatch::{ComponentAction, ModalAction};
use crate::discord::messages::{paid_row, payment_request_embed, GOLD};
use crate::discord::modals;
use crate::discord::owner;
use crate::discord::ratelimit::ActionClass;
use crate::discord::reminders;

#[derive(Default)]
pub struct Handler {
    /// The reminder task must survive reconnects without duplicating.
    reminders_started: AtomicBool,
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, context: Context, ready: Ready) {
        info!("Connected as {}", ready.user.name);
        let state = app_state(&context).await;

        let status = {
            let store = state.store.lock().await;
            store
                .status_override()
                .map(str::to_string)
                .unwrap_or_else(|| state.config.bot.status.clone())
        };
        context.set_activity(Some(ActivityData::watching(status)));

        let registration = match state.config.discord.guild_id {
            Some(guild) => {
                GuildId::new(guild)
                    .set_commands(&context.http, commands::register())
                    .await
            }
            None => Command::set_global_commands(&context.http, commands::register()).await,
        };
        match registration {
            Ok(registered) => info!("Registered {} slash commands", registered.len()),
            Err(e) => error!("Failed to register slash commands: {}", e),
        }

        if !self.reminders_started.swap(true, Ordering::SeqCst) {
            reminders::spawn(context.clone(), state.clone());
        }
    }

    async fn guild_member_addition(&self, context: Context, member: Member) {
        let state = app_state(&context).await;

        if let Some(auto_role) = state.config.roles.auto_role_id {
            if let Err(e) = member.add_role(&context.http, RoleId::new(auto_role)).await {
                error!("Failed to assign auto-role to {}: {}", member.user.id, e);
            }
        }

        let Some(welcome) = state
            .config
            .channels
            .as_ref()
            .and_then(|channels| channels.welcome)
        else {
            return;
        };
        let firm = &state.config.contracts.firm_name;
        let embed = CreateEmbed::new()
            .title(format!("Welcome to {}", firm))
            .description(format!(
                "Welcome <@{}> to {}. We are here to help.\n\n\
                 Open a ticket from the panel to acquire our services, and use /bill view \
                 at any time to check your billing status.",
                member.user.id, firm
            ))
            .color(GOLD)
            .timestamp(Timestamp::now());
        let message = CreateMessage::new()
            .content(format!("<@{}>", member.user.id))
            .embed(embed);
        if let Err(e) = serenity::all::ChannelId::new(welcome)
            .send_message(&context.http, message)
            .await
        {
            error!("Failed to send welcome message: {}", e);
        }
    }

    async fn message(&self, context: Context, message: Message) {
        if message.author.bot {
            return;
        }
        let state = app_state(&context).await;

        match owner::handle(&context, &state, &message).await {
            Ok(true) => return,
            Ok(false) => {}
            Err(e) => {
                error!("Owner command failed: {}", e);
                return;
            }
        }

        // DM shortcut: "done" re-sends the payment confirmation button.
        if message.guild_id.is_none() && message.content.trim() == "done" {
            if let Err(e) = dm_done(&context, &state, &message).await {
                error!("Failed to handle DM payment signal: {}", e);
            }
        }
    }

    async fn interaction_create(&self, context: Context, interaction: Interaction) {
        let state = app_state(&context).await;

        match interaction {
            Interaction::Command(command) => {
                info!(
                    "COMMAND /{} | {} ({})",
                    command.data.name,
                    command.user.tag(),
                    command.user.id
                );
                if !state.limiter.check(command.user.id, ActionClass::Command) {
                    let _ = commands::reply_ephemeral(
                        &context,
                        &command,
                        "⏳ Please wait a few seconds before using another command.",
                    )
                    .await;
                    return;
                }
                if let Err(e) = commands::dispatch(&context, &state, &command).await {
                    error!("Command /{} failed: {}", command.data.name, e);
                    let _ = commands::reply_ephemeral(
                        &context,
                        &command,
                        "❌ Something went wrong. Please try again.",
                    )
                    .await;
                }
            }
            Interaction::Component(component) => {
                info!(
                    "COMPONENT {} | {} ({})",
                    component.data.custom_id,
                    component.user.tag(),
                    component.user.id
                );
                if !state.limiter.check(component.user.id, ActionClass::Component) {
                    let _ = components::reply_ephemeral(
                        &context,
                        &component,
                        "⏳ Please wait a moment before clicking again.",
                    )
                    .await;
                    return;
                }
                let Some(action) = ComponentAction::parse(&component.data.custom_id) else {
                    warn!("Unrecognized component id {}", component.data.custom_id);
                    return;
                };
                if let Err(e) = components::handle(&context, &state, &component, action).await {
                    error!("Component {} failed: {}", component.data.custom_id, e);
                    let _ = components::reply_ephemeral(
                        &context,
                        &component,
                        "❌ Something went wrong. Please try again.",
                    )
                    .await;
                }
            }
            Interaction::Modal(modal) => {
                info!(
                    "MODAL {} | {} ({})",
                    modal.data.custom_id,
                    modal.user.tag(),
                    modal.user.id
                );
                if !state.limiter.check(modal.user.id, ActionClass::Component) {
                    let _ = modals::reply_ephemeral(
                        &context,
                        &modal,
                        "⏳ Please wait a moment before submitting again.",
                    )
                    .await;
                    return;
                }
                let Some(action) = ModalAction::parse(&modal.data.custom_id) else {
                    warn!("Unrecognized modal id {}", modal.data.custom_id);
                    return;
                };
                if let Err(e) = modals::handle(&context, &state, &modal, action).await {
                    error!("Modal {} failed: {}", modal.data.custom_id, e);
                    let _ = modals::reply_ephemeral(
                        &context,
                        &modal,
                        "❌ Something went wrong. Please try again.",
                    )
                    .await;
                }
            }
            _ => {}
        }
    }
}

/// A bare "done" in DMs: resend the payment button for the first
/// actionable bill, or say there is nothing to pay.
async fn dm_done(
    context: &Context,
    state: &Arc<AppState>,
    message: &Message,
) -> Result<(), crate::common::error::AppError> {
    let bill = {
        let store = state.store.lock().await;
        store.find_actionable_bill(message.author.id).cloned()
    };
    match bill {
        Some(bill) => {
            let reply = CreateMessage::new()
                .embed(payment_request_embed(&bill))
                .components(vec![paid_row(&bill.id)]);
            message.channel_id.send_message(&context.http, reply).await?;
        }
        None => {
            message
                .reply(&context.http, "You have no outstanding bills. Thank you!")
                .await?;
        }
    }
    Ok(())
}
