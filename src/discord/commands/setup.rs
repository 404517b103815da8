//! `/setup` - bind channels and post the ticket and verification panels.

use std::sync::Arc;

use serenity::all::{
    ButtonStyle, CommandInteraction, CommandOptionType, Context, CreateActionRow, CreateButton,
    CreateCommand, CreateCommandOption, CreateEmbed, CreateMessage, ReactionType, Timestamp,
};
use tracing::info;

use crate::common::error::AppError;
use crate::config::types::TicketButtonConfig;
use crate::discord::client::AppState;
use crate::discord::commands::{option_channel, reply_ephemeral, require_admin};
use crate::discord::dispatch;
use crate::discord::messages::{color_or, BLURPLE, GOLD};

pub fn register() -> CreateCommand {
    CreateCommand::new("setup")
        .description("Setup the ticket system (Admin only)")
        .add_option(
            CreateCommandOption::new(
                CommandOptionType::Channel,
                "channel",
                "Channel to send the ticket panel",
            )
            .required(true),
        )
        .add_option(
            CreateCommandOption::new(
                CommandOptionType::Channel,
                "category",
                "Category for ticket channels",
            )
            .required(true),
        )
        .add_option(CreateCommandOption::new(
            CommandOptionType::Channel,
            "verification",
            "Channel for verification system",
        ))
        .add_option(CreateCommandOption::new(
            CommandOptionType::Channel,
            "transcripts",
            "Channel for ticket transcripts",
        ))
        .add_option(CreateCommandOption::new(
            CommandOptionType::Channel,
            "contracts",
            "Channel for signed contract logs",
        ))
}

pub async fn run(
    context: &Context,
    state: &Arc<AppState>,
    command: &CommandInteraction,
) -> Result<(), AppError> {
    if !require_admin(context, command).await? {
        return Ok(());
    }

    let options = command.data.options();
    let (Some(panel), Some(category)) = (
        option_channel(&options, "channel"),
        option_channel(&options, "category"),
    ) else {
        return reply_ephemeral(context, command, "❌ Invalid channel or category provided.").await;
    };
    let verification = option_channel(&options, "verification");
    let transcripts = option_channel(&options, "transcripts");
    let contract_log = option_channel(&options, "contracts");

    {
        let mut store = state.store.lock().await;
        store.apply_setup(panel, category, verification, transcripts, contract_log);
    }

    // Ticket panel.
    let panel_config = &state.config.ticket_panel;
    let mut embed = CreateEmbed::new()
        .title(panel_config.title.clone())
        .description(panel_config.description.clone())
        .color(color_or(panel_config.color.as_deref(), GOLD))
        .timestamp(Timestamp::now());
    if let Some(image) = &panel_config.image {
        embed = embed.image(image.clone());
    }

    let buttons: Vec<CreateButton> = panel_config.buttons.iter().map(panel_button).collect();
    let rows: Vec<CreateActionRow> = buttons
        .chunks(5)
        .map(|chunk| CreateActionRow::Buttons(chunk.to_vec()))
        .collect();

    panel
        .send_message(
            &context.http,
            CreateMessage::new().embed(embed).components(rows),
        )
        .await?;

    // Verification panel, when a channel was given.
    if let Some(verification) = verification {
        let verify_config = &state.config.verification;
        let mut embed = CreateEmbed::new()
            .title(verify_config.title.clone())
            .description(verify_config.description.clone())
            .color(color_or(verify_config.color.as_deref(), BLURPLE))
            .timestamp(Timestamp::now());
        if let Some(image) = &verify_config.image {
            embed = embed.image(image.clone());
        }

        let row = CreateActionRow::Buttons(vec![CreateButton::new("verify_user")
            .label(verify_config.button_label.clone())
            .style(ButtonStyle::Success)]);

        verification
            .send_message(
                &context.http,
                CreateMessage::new().embed(embed).components(vec![row]),
            )
            .await?;
    }

    info!(
        "Setup complete: panel {}, category {}, verification {:?}, transcripts {:?}, contracts {:?}",
        panel, category, verification, transcripts, contract_log
    );

    let mut summary = format!("✅ Setup complete!\nPanel: <#{}>\nCategory: <#{}>", panel, category);
    if let Some(channel) = verification {
        summary.push_str(&format!("\nVerification: <#{}>", channel));
    }
    if let Some(channel) = transcripts {
        summary.push_str(&format!("\nTranscripts: <#{}>", channel));
    }
    if let Some(channel) = contract_log {
        summary.push_str(&format!("\nContract Logs: <#{}>", channel));
    }
    reply_ephemeral(context, command, summary).await
}

fn panel_button(button: &TicketButtonConfig) -> CreateButton {
    let mut built = CreateButton::new(dispatch::ticket_button_id(&button.id))
        .label(button.label.clone())
        .style(button_style(button.style.as_deref()));
    if let Some(emoji) = &button.emoji {
        built = built.emoji(ReactionType::Unicode(emoji.clone()));
    }
    built
}

fn button_style(style: Option<&str>) -> ButtonStyle {
    match style.map(str::to_ascii_lowercase).as_deref() {
        Some("secondary") => ButtonStyle::Secondary,
        Some("success") => ButtonStyle::Success,
        Some("danger") => ButtonStyle::Danger,
        _ => ButtonStyle::Primary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_configured_button_styles() {
        assert_eq!(button_style(Some("Danger")), ButtonStyle::Danger);
        assert_eq!(button_style(Some("success")), ButtonStyle::Success);
        assert_eq!(button_style(Some("secondary")), ButtonStyle::Secondary);
        assert_eq!(button_style(Some("primary")), ButtonStyle::Primary);
        assert_eq!(button_style(Some("unknown")), ButtonStyle::Primary);
        assert_eq!(button_style(None), ButtonStyle::Primary);
    }
}
