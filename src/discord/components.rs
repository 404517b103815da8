//! Button and select menu interaction handlers.

use std::sync::Arc;
use std::time::Duration;

use serenity::all::{
    AutoArchiveDuration, ButtonStyle, ChannelType, ComponentInteraction,
    ComponentInteractionDataKind, Context, CreateActionRow, CreateButton, CreateEmbed,
    CreateInputText, CreateInteractionResponse, CreateInteractionResponseMessage, CreateMessage,
    CreateModal, CreateThread, GetMessages, InputTextStyle, ReactionType, RoleId, Timestamp,
    UserId,
};
use tracing::{error, info, warn};

use crate::common::error::AppError;
use crate::contracts;
use crate::discord::client::AppState;
use crate::discord::dispatch::{self, ComponentAction};
use crate::discord::messages::{
    payment_decided_row, payment_recorded_embed, payment_review_embed, payment_review_row, BLURPLE,
};
use crate::discord::transcript::{chunk_transcript, TranscriptLine};

pub async fn handle(
    context: &Context,
    state: &Arc<AppState>,
    interaction: &ComponentInteraction,
    action: ComponentAction,
) -> Result<(), AppError> {
    match action {
        ComponentAction::OpenTicketForm { category } => {
            open_ticket_form(context, state, interaction, &category).await
        }
        ComponentAction::CloseConfirm => close_confirm(context, state, interaction).await,
        ComponentAction::CloseCancel => {
            update(context, interaction, "❌ Ticket closure cancelled.").await
        }
        ComponentAction::Verify => verify(context, state, interaction).await,
        ComponentAction::ConfirmPayment { bill_id } => {
            confirm_payment(context, state, interaction, &bill_id).await
        }
        ComponentAction::ApprovePayment { owner, bill_id } => {
            review_payment(context, state, interaction, owner, &bill_id, true).await
        }
        ComponentAction::DenyPayment { owner, bill_id } => {
            review_payment(context, state, interaction, owner, &bill_id, false).await
        }
        ComponentAction::SelectContract => select_contract(context, state, interaction).await,
        ComponentAction::SignContract { template } => {
            sign_contract(context, interaction, &template).await
        }
    }
}

pub async fn reply_ephemeral(
    context: &Context,
    interaction: &ComponentInteraction,
    content: impl Into<String>,
) -> Result<(), AppError> {
    interaction
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

/// Replace the originating message with plain text, dropping embeds and
/// components.
async fn update(
    context: &Context,
    interaction: &ComponentInteraction,
    content: impl Into<String>,
) -> Result<(), AppError> {
    interaction
        .create_response(
            &context.http,
            CreateInteractionResponse::UpdateMessage(
                CreateInteractionResponseMessage::new()
                    .content(content)
                    .embeds(Vec::new())
                    .components(Vec::new()),
            ),
        )
        .await?;
    Ok(())
}

/// Ticket panel button: show the configured intake form.
async fn open_ticket_form(
    context: &Context,
    state: &Arc<AppState>,
    interaction: &ComponentInteraction,
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

    let rows = button
        .fields
        .iter()
        .map(|field| {
            let style = match field.style.as_deref() {
                Some("short") => InputTextStyle::Short,
                _ => InputTextStyle::Paragraph,
            };
            let mut input = CreateInputText::new(style, field.label.clone(), field.id.clone())
                .required(field.required.unwrap_or(true));
            if let Some(placeholder) = &field.placeholder {
                input = input.placeholder(placeholder.clone());
            }
            if let Some(max_length) = field.max_length {
                input = input.max_length(max_length);
            }
            CreateActionRow::InputText(input)
        })
        .collect();

    let modal = CreateModal::new(dispatch::ticket_modal_id(category), button.form_title.clone())
        .components(rows);
    interaction
        .create_response(&context.http, CreateInteractionResponse::Modal(modal))
        .await?;
    Ok(())
}

/// Confirmed close: archive a transcript thread, drop the record, delete
/// the channel.
async fn close_confirm(
    context: &Context,
    state: &Arc<AppState>,
    interaction: &ComponentInteraction,
) -> Result<(), AppError> {
    let channel_id = interaction.channel_id;
    let (ticket, transcript_channel) = {
        let store = state.store.lock().await;
        (
            store.ticket_for_channel(channel_id).cloned(),
            store.transcript_channel_id(),
        )
    };
    let Some(ticket) = ticket else {
        return update(context, interaction, "❌ Ticket data not found.").await;
    };

    update(context, interaction, "🔒 Closing ticket and creating transcript...").await?;

    let messages = channel_id
        .messages(&context.http, GetMessages::new().limit(100))
        .await?;
    let lines: Vec<TranscriptLine> = messages
        .iter()
        .rev()
        .map(|message| TranscriptLine {
            timestamp: message.timestamp.to_string(),
            author: message.author.tag(),
            content: message.content.clone(),
        })
        .collect();

    if let Some(transcript_channel) = transcript_channel {
        let embed = CreateEmbed::new()
            .title(format!("📝 Ticket Transcript - Case #{}", ticket.case_number))
            .description(format!(
                "**Created by:** <@{}>\n**Ticket Type:** {}\n**Closed by:** <@{}>",
                ticket.user_id, ticket.kind, interaction.user.id
            ))
            .color(BLURPLE)
            .timestamp(Timestamp::now());

        let archive = async {
            let thread = transcript_channel
                .create_thread(
                    &context.http,
                    CreateThread::new(format!("case-{}", ticket.case_number))
                        .kind(ChannelType::PublicThread)
                        .auto_archive_duration(AutoArchiveDuration::OneHour),
                )
                .await?;
            thread
                .send_message(&context.http, CreateMessage::new().embed(embed))
                .await?;
            for chunk in chunk_transcript(&lines) {
                thread
                    .send_message(
                        &context.http,
                        CreateMessage::new().content(format!("```\n{}\n```", chunk)),
                    )
                    .await?;
            }
            Ok::<(), serenity::Error>(())
        };
        if let Err(e) = archive.await {
            error!("Failed to archive transcript for case {}: {}", ticket.case_number, e);
        }
    } else {
        warn!(
            "No transcript channel bound, discarding transcript for case {}",
            ticket.case_number
        );
    }

    {
        let mut store = state.store.lock().await;
        if let Err(e) = store.close_ticket(channel_id) {
            warn!("Ticket for {} vanished while closing: {}", channel_id, e);
        }
    }
    info!("Closed ticket case {} ({})", ticket.case_number, channel_id);

    // Leave the closing notice readable for a moment before deleting.
    let http = context.http.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(5)).await;
        if let Err(e) = channel_id.delete(&http).await {
            error!("Failed to delete ticket channel {}: {}", channel_id, e);
        }
    });
    Ok(())
}

/// Verification button: grant the verified role, shed the auto-role.
async fn verify(
    context: &Context,
    state: &Arc<AppState>,
    interaction: &ComponentInteraction,
) -> Result<(), AppError> {
    let Some(verified_role) = state.config.roles.verified_role_id else {
        return reply_ephemeral(context, interaction, "❌ Verification role is not configured.")
            .await;
    };
    let Some(member) = interaction.member.as_ref() else {
        return reply_ephemeral(context, interaction, "❌ Verification only works in a server.")
            .await;
    };

    if let Err(e) = member.add_role(&context.http, RoleId::new(verified_role)).await {
        error!("Failed to grant verified role to {}: {}", interaction.user.id, e);
        return reply_ephemeral(
            context,
            interaction,
            "❌ Failed to assign verification role. Please contact an admin.",
        )
        .await;
    }
    if let Some(auto_role) = state.config.roles.auto_role_id {
        if let Err(e) = member.remove_role(&context.http, RoleId::new(auto_role)).await {
            warn!("Failed to remove auto-role from {}: {}", interaction.user.id, e);
        }
    }
    reply_ephemeral(context, interaction, "✅ You have been verified!").await
}

/// The bill owner pressed "Paid": move the bill under review and notify
/// staff.
async fn confirm_payment(
    context: &Context,
    state: &Arc<AppState>,
    interaction: &ComponentInteraction,
    bill_id: &str,
) -> Result<(), AppError> {
    let owner = interaction.user.id;
    let (bill, review_channel) = {
        let mut store = state.store.lock().await;
        match store.mark_reviewing(owner, bill_id) {
            Ok(bill) => {
                let review_channel = state
                    .config
                    .channels
                    .as_ref()
                    .and_then(|channels| channels.staff_review)
                    .map(serenity::all::ChannelId::new)
                    .or_else(|| store.transcript_channel_id());
                (bill, review_channel)
            }
            Err(e) => {
                return reply_ephemeral(context, interaction, format!("❌ {}", e)).await;
            }
        }
    };

    interaction
        .create_response(
            &context.http,
            CreateInteractionResponse::Message(
                CreateInteractionResponseMessage::new().embed(payment_recorded_embed()),
            ),
        )
        .await?;

    let Some(review_channel) = review_channel else {
        warn!("No staff review channel available for bill {}", bill.id);
        return Ok(());
    };
    let mut message = CreateMessage::new()
        .embed(payment_review_embed(owner, &bill))
        .components(vec![payment_review_row(owner, &bill.id)]);
    if let Some(support_role) = state.config.roles.support_role_id {
        message = message.content(format!("<@&{}>", support_role));
    }
    if let Err(e) = review_channel.send_message(&context.http, message).await {
        error!("Failed to post payment review for bill {}: {}", bill.id, e);
    }
    Ok(())
}

/// Staff approved or denied a payment under review.
async fn review_payment(
    context: &Context,
    state: &Arc<AppState>,
    interaction: &ComponentInteraction,
    owner: UserId,
    bill_id: &str,
    approve: bool,
) -> Result<(), AppError> {
    if !crate::discord::member_is_admin(interaction.member.as_ref()) {
        return reply_ephemeral(
            context,
            interaction,
            "❌ You need Administrator permissions to review payments.",
        )
        .await;
    }

    let result = {
        let mut store = state.store.lock().await;
        if approve {
            store.mark_paid(owner, bill_id)
        } else {
            store.mark_denied(owner, bill_id)
        }
    };
    if let Err(e) = result {
        return reply_ephemeral(context, interaction, format!("❌ {}", e)).await;
    }

    let dm_text = if approve {
        "Your bill has been considered paid! Thank you for your business."
    } else {
        "It seems like there was an issue with your bill and our staff team has considered it \
         NOT PAID. If you believe it was a mistake please create a support ticket."
    };
    match owner.create_dm_channel(&context.http).await {
        Ok(dm) => {
            if let Err(e) = dm
                .id
                .send_message(&context.http, CreateMessage::new().content(dm_text))
                .await
            {
                warn!("Failed to DM payment decision to {}: {}", owner, e);
            }
        }
        Err(e) => warn!("Failed to open DM channel to {}: {}", owner, e),
    }

    let notice = if approve {
        format!("✅ Payment approved for <@{}>", owner)
    } else {
        format!("❌ Payment denied for <@{}>", owner)
    };
    interaction
        .create_response(
            &context.http,
            CreateInteractionResponse::UpdateMessage(
                CreateInteractionResponseMessage::new()
                    .content(notice)
                    .components(vec![payment_decided_row()]),
            ),
        )
        .await?;
    Ok(())
}

/// Template chosen from the `/contract` menu: post the contract with a
/// signature button, addressed to the remembered target when there is one.
async fn select_contract(
    context: &Context,
    state: &Arc<AppState>,
    interaction: &ComponentInteraction,
) -> Result<(), AppError> {
    let ComponentInteractionDataKind::StringSelect { values } = &interaction.data.kind else {
        return Ok(());
    };
    let Some(file_name) = values.first() else {
        return Ok(());
    };

    let text = match contracts::read_template(&state.config.contracts.dir, file_name) {
        Ok(text) => text,
        Err(e) => {
            error!("Failed to read contract template {}: {}", file_name, e);
            return update(context, interaction, "❌ Failed to send the selected contract.").await;
        }
    };

    let mut body = text;
    body.truncate(4000);
    let embed = CreateEmbed::new()
        .title(format!("⚖️ {}", contracts::heading_for(file_name)))
        .description(body)
        .color(0x2C2F33)
        .footer(crate::discord::messages::firm_footer(&state.config.contracts.firm_name));
    let row = CreateActionRow::Buttons(vec![CreateButton::new(dispatch::sign_contract_id(
        file_name,
    ))
    .label("Sign Agreement")
    .style(ButtonStyle::Success)
    .emoji(ReactionType::Unicode("🖋️".to_string()))]);

    let target = state.contract_target(interaction.user.id);
    if let Some(target) = target {
        interaction
            .channel_id
            .send_message(
                &context.http,
                CreateMessage::new()
                    .content(format!("<@{}>", target))
                    .embed(embed)
                    .components(vec![row]),
            )
            .await?;
        update(context, interaction, format!("✅ Sent contract to <@{}>", target)).await?;
    } else {
        interaction
            .create_response(
                &context.http,
                CreateInteractionResponse::UpdateMessage(
                    CreateInteractionResponseMessage::new()
                        .content("")
                        .embed(embed)
                        .components(vec![row]),
                ),
            )
            .await?;
    }
    state.clear_contract_target(interaction.user.id);
    Ok(())
}

/// "Sign Agreement" button: collect the signer's name and date.
async fn sign_contract(
    context: &Context,
    interaction: &ComponentInteraction,
    template: &str,
) -> Result<(), AppError> {
    let modal = CreateModal::new(
        dispatch::contract_modal_id(template),
        "Sign Retainer Agreement",
    )
    .components(vec![
        CreateActionRow::InputText(
            CreateInputText::new(InputTextStyle::Short, "Full Legal Name", "client_name")
                .placeholder("Enter your full name")
                .required(true),
        ),
        CreateActionRow::InputText(
            CreateInputText::new(InputTextStyle::Short, "Date", "sign_date")
                .placeholder("MM/DD/YYYY")
                .required(true),
        ),
    ]);
    interaction
        .create_response(&context.http, CreateInteractionResponse::Modal(modal))
        .await?;
    Ok(())
}
