//! `/contract` - pick a contract template to send for signature.

use std::sync::Arc;

use serenity::all::{
    CommandInteraction, CommandOptionType, Context, CreateActionRow, CreateCommand,
    CreateCommandOption, CreateInteractionResponse, CreateInteractionResponseMessage,
    CreateSelectMenu, CreateSelectMenuKind, CreateSelectMenuOption,
};
use tracing::error;

use crate::common::error::AppError;
use crate::contracts;
use crate::discord::client::AppState;
use crate::discord::commands::{option_user, reply_ephemeral, require_admin};

pub fn register() -> CreateCommand {
    CreateCommand::new("contract")
        .description("Send a legal retainer agreement (Admin only)")
        .add_option(CreateCommandOption::new(
            CommandOptionType::User,
            "target",
            "User the contract is addressed to",
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

    let templates = match contracts::list_templates(&state.config.contracts.dir) {
        Ok(templates) => templates,
        Err(e) => {
            error!("Failed to list contract templates: {}", e);
            return reply_ephemeral(context, command, "❌ Failed to load contract templates.").await;
        }
    };
    if templates.is_empty() {
        return reply_ephemeral(context, command, "❌ No contract templates found.").await;
    }

    let target = option_user(&command.data.options(), "target");
    if let Some(target) = target {
        state.set_contract_target(command.user.id, target);
    }

    let options = templates
        .into_iter()
        .map(|template| CreateSelectMenuOption::new(template.title, template.file_name))
        .collect();
    let menu = CreateSelectMenu::new("select_contract", CreateSelectMenuKind::String { options })
        .placeholder("Select a contract to send");

    let content = match target {
        Some(target) => format!("Select which contract you would like to send to <@{}>:", target),
        None => "Select which contract you would like to send:".to_string(),
    };

    command
        .create_response(
            &context.http,
            CreateInteractionResponse::Message(
                CreateInteractionResponseMessage::new()
                    .content(content)
                    .components(vec![CreateActionRow::SelectMenu(menu)])
                    .ephemeral(true),
            ),
        )
        .await?;
    Ok(())
}
