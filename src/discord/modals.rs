//! Modal submission handlers: ticket intake and contract signature.

use std::sync::Arc;

use serenity::all::{
    ActionRowComponent, ChannelType, Context, CreateChannel, CreateEmbed, CreateMessage,
    EditInteractionResponse, ModalInteraction, PermissionOverwrite, PermissionOverwriteType,
    Permissions, RoleId, Timestamp,
};
use tracing::{error, info};

use crate::common::error::AppError;
use crate::contracts;
use crate::discord::client::AppState;
use crate::discord::dispatch::ModalAction;
use crate::discord::messages::{color_or, firm_footer, GREEN};

pub async fn handle(
    context: &Context,
    state: &Arc<AppState>,
    interaction: &ModalInteraction,
    action: ModalAction,
) -> Result<(), AppError> {
    match action {
        ModalAction::TicketIntake { category } => {
            ticket_intake(context, state, interaction, &category).await
        }
        ModalAction::ContractSignature { template } => {
            contract_signature(context, state, interaction, &template).await
        }
    }
}

/// Value of one text input in the submitted modal.
fn input_value(interaction: &ModalInteraction, id: &str) -> Option<String> {
    interaction
        .data
        .components
        .iter()
        .flat_map(|row| row.components.iter())
        .find_map(|component| match component {
            ActionRowComponent::InputText(input) if input.custom_id == id => {
                input.value.clone()
            }
            _ => None,
        })
}

/// Intake form submitted: create the ticket channel and record.
async fn ticket_intake(
    context: &Context,
    state: &Arc<AppState>,
    interaction: &ModalInteraction,
    category: &str,
) -> Result<(), AppError> {
    let Some(button) = state
        .config
        .ticket_panel
        .buttons
        .iter()
        .find(|button| button.id == category)
    else {
        return reply_ephemeral(context, interaction, "❌ Invalid ticket type.").await;
    };
    let Some(guild_id) = interaction.guild_id else {
        return reply_ephemeral(context, interaction, "❌ Tickets only work in a server.").await;
    };

    interaction.defer_ephemeral(&context.http).await?;

    // The lock is held from peeking the case number until the record is
    // written, so the number the channel was named after cannot be taken
    // by a concurrent intake.
    let mut store = state.store.lock().await;
    let Some(category_id) = store.category_id() else {
        drop(store);
        interaction
            .edit_response(
                &context.http,
                EditInteractionResponse::new()
                    .content("❌ Ticket system is not set up yet. Run /setup first."),
            )
            .await?;
        return Ok(());
    };
    let case_number = store.peek_case_number();
    let channel_name = format!("{}-{}", button.prefix, case_number);

    let mut overwrites = vec![
        PermissionOverwrite {
            allow: Permissions::empty(),
            deny: Permissions::VIEW_CHANNEL,
            kind: PermissionOverwriteType::Role(RoleId::new(guild_id.get())),
        },
        PermissionOverwrite {
            allow: Permissions::VIEW_CHANNEL
                | Permissions::SEND_MESSAGES
                | Permissions::READ_MESSAGE_HISTORY,
            deny: Permissions::empty(),
            kind: PermissionOverwriteType::Member(interaction.user.id),
        },
    ];
    let support_role = state.config.roles.support_role_id.map(RoleId::new);
    if let Some(support_role) = support_role {
        overwrites.push(PermissionOverwrite {
            allow: Permissions::VIEW_CHANNEL
                | Permissions::SEND_MESSAGES
                | Permissions::READ_MESSAGE_HISTORY
                | Permissions::MANAGE_MESSAGES,
            deny: Permissions::empty(),
            kind: PermissionOverwriteType::Role(support_role),
        });
    }

    let channel = guild_id
        .create_channel(
            &context.http,
            CreateChannel::new(&channel_name)
                .kind(ChannelType::Text)
                .category(category_id)
                .permissions(overwrites),
        )
        .await?;

    if let Err(e) =
        store.create_ticket(category, interaction.user.id, &interaction.user.name, channel.id)
    {
        drop(store);
        error!("Failed to record ticket for {}: {}", channel.id, e);
        if let Err(delete_err) = channel.delete(&context.http).await {
            error!("Failed to delete orphaned ticket channel: {}", delete_err);
        }
        interaction
            .edit_response(
                &context.http,
                EditInteractionResponse::new().content("❌ Failed to create the ticket."),
            )
            .await?;
        return Ok(());
    }
    drop(store);
    info!(
        "Opened ticket case {} ({}) for {}",
        case_number, channel_name, interaction.user.id
    );

    let responses: Vec<String> = button
        .fields
        .iter()
        .map(|field| {
            format!(
                "**{}:**\n{}",
                field.label,
                input_value(interaction, &field.id).unwrap_or_default()
            )
        })
        .collect();

    let embed_config = &state.config.ticket_embed;
    let mut embed = CreateEmbed::new()
        .title(embed_config.title.clone())
        .description(format!("{}\n\n{}", embed_config.description, responses.join("\n\n")))
        .color(color_or(embed_config.color.as_deref(), GREEN))
        .timestamp(Timestamp::now());
    if let Some(footer) = &embed_config.footer {
        embed = embed.footer(firm_footer(footer));
    }
    if let Some(image) = &embed_config.image {
        embed = embed.image(image.clone());
    }

    let greeting = match support_role {
        Some(role) => format!("<@{}> <@&{}>", interaction.user.id, role),
        None => format!("<@{}>", interaction.user.id),
    };
    channel
        .send_message(
            &context.http,
            CreateMessage::new().content(greeting).embed(embed),
        )
        .await?;

    interaction
        .edit_response(
            &context.http,
            EditInteractionResponse::new().content(format!("✅ Ticket created! <#{}>", channel.id)),
        )
        .await?;
    Ok(())
}

/// Signature form submitted: post the acknowledgment and log the signing.
async fn contract_signature(
    context: &Context,
    state: &Arc<AppState>,
    interaction: &ModalInteraction,
    template: &str,
) -> Result<(), AppError> {
    interaction.defer(&context.http).await?;

    let client_name = input_value(interaction, "client_name").unwrap_or_default();
    let sign_date = input_value(interaction, "sign_date").unwrap_or_default();
    let firm = &state.config.contracts.firm_name;
    let attorney = &state.config.contracts.attorney_name;
    info!(
        "Contract {} signed by {} ({}) on {}",
        template, client_name, interaction.user.id, sign_date
    );

    let embed = CreateEmbed::new()
        .title("✅ Contract Signed & Executed")
        .description(format!(
            "**CLIENT ACKNOWLEDGMENT**\n\n{}\nBy: {}\n\n\
             **CLIENT NAME:** __{}__  **DATE:** __{}__\n\n\
             **ATTORNEY NAME:** __{}__  **DATE:** __{}__",
            firm, attorney, client_name, sign_date, attorney, sign_date
        ))
        .color(GREEN)
        .footer(firm_footer(firm))
        .timestamp(Timestamp::now());
    interaction
        .edit_response(&context.http, EditInteractionResponse::new().embed(embed))
        .await?;

    let log_channel = {
        let store = state.store.lock().await;
        store.contract_log_channel_id()
    };
    if let Some(log_channel) = log_channel {
        let log_embed = CreateEmbed::new()
            .title(format!("📜 Signed: {}", contracts::heading_for(template)))
            .description(format!(
                "**Client:** {}\n**Discord User:** {} ({})\n**Date:** {}",
                client_name,
                interaction.user.tag(),
                interaction.user.id,
                sign_date
            ))
            .color(GREEN)
            .timestamp(Timestamp::now());
        if let Err(e) = log_channel
            .send_message(&context.http, CreateMessage::new().embed(log_embed))
            .await
        {
            error!("Failed to log signed contract {}: {}", template, e);
        }
    }
    Ok(())
}

pub async fn reply_ephemeral(
    context: &Context,
    interaction: &ModalInteraction,
    content: impl Into<String>,
) -> Result<(), AppError> {
    interaction
        .create_response(
            &context.http,
            serenity::all::CreateInteractionResponse::Message(
                serenity::all::CreateInteractionResponseMessage::new()
                    .content(content)
                    .ephemeral(true),
            ),
        )
        .await?;
    Ok(())
}
