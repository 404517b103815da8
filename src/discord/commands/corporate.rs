//! `/corporate create` - provision a role, category, and channel set for
//! a named corporate entity.

use std::sync::Arc;

use fancy_regex::Regex;
use serenity::all::{
    ChannelType, CommandInteraction, CommandOptionType, Context, CreateChannel, CreateCommand,
    CreateCommandOption, EditInteractionResponse, EditRole, PermissionOverwrite,
    PermissionOverwriteType, Permissions, RoleId, UserId,
};
use tracing::{error, warn};

use crate::common::error::AppError;
use crate::discord::client::AppState;
use crate::discord::commands::{option_str, reply_ephemeral, require_admin, subcommand};

pub fn register() -> CreateCommand {
    CreateCommand::new("corporate")
        .description("Create a corporate category and channels (Admin only)")
        .add_option(
            CreateCommandOption::new(
                CommandOptionType::SubCommand,
                "create",
                "Create a new corporate setup",
            )
            .add_sub_option(
                CreateCommandOption::new(
                    CommandOptionType::String,
                    "name",
                    "Name of the corporation",
                )
                .required(true),
            )
            .add_sub_option(
                CreateCommandOption::new(
                    CommandOptionType::String,
                    "users",
                    "Users to add (mention them)",
                )
                .required(true),
            )
            .add_sub_option(CreateCommandOption::new(
                CommandOptionType::String,
                "role",
                "Custom role name (optional)",
            )),
        )
}

pub async fn run(
    context: &Context,
    _state: &Arc<AppState>,
    command: &CommandInteraction,
) -> Result<(), AppError> {
    if !require_admin(context, command).await? {
        return Ok(());
    }
    let Some(guild_id) = command.guild_id else {
        return reply_ephemeral(context, command, "❌ This command only works in a server.").await;
    };

    let options = command.data.options();
    let Some(("create", nested)) = subcommand(&options) else {
        return reply_ephemeral(context, command, "❌ Unknown corporate subcommand.").await;
    };
    let (Some(name), Some(users)) =
        (option_str(nested, "name"), option_str(nested, "users"))
    else {
        return reply_ephemeral(context, command, "❌ Missing corporation details.").await;
    };
    let custom_role_name = option_str(nested, "role");

    command.defer_ephemeral(&context.http).await?;

    let user_ids = parse_mentions(&users);
    if user_ids.is_empty() {
        command
            .edit_response(
                &context.http,
                EditInteractionResponse::new().content("❌ No valid users mentioned."),
            )
            .await?;
        return Ok(());
    }

    // Optional shared role, granted to every mentioned member.
    let mut role_id = None;
    if let Some(role_name) = custom_role_name {
        let role = guild_id
            .create_role(&context.http, EditRole::new().name(role_name))
            .await?;
        for user in &user_ids {
            match guild_id.member(&context.http, *user).await {
                Ok(member) => {
                    if let Err(e) = member.add_role(&context.http, role.id).await {
                        warn!("Failed to add corporate role to {}: {}", user, e);
                    }
                }
                Err(e) => warn!("Failed to fetch member {}: {}", user, e),
            }
        }
        role_id = Some(role.id);
    }

    // Private category: hidden from everyone, visible to the members
    // (and role, when created).
    let member_allow =
        Permissions::VIEW_CHANNEL | Permissions::SEND_MESSAGES | Permissions::READ_MESSAGE_HISTORY;
    let mut overwrites = vec![PermissionOverwrite {
        allow: Permissions::empty(),
        deny: Permissions::VIEW_CHANNEL,
        kind: PermissionOverwriteType::Role(RoleId::new(guild_id.get())),
    }];
    overwrites.extend(user_ids.iter().map(|user| PermissionOverwrite {
        allow: member_allow,
        deny: Permissions::empty(),
        kind: PermissionOverwriteType::Member(*user),
    }));
    if let Some(role_id) = role_id {
        overwrites.push(PermissionOverwrite {
            allow: member_allow,
            deny: Permissions::empty(),
            kind: PermissionOverwriteType::Role(role_id),
        });
    }

    let category = match guild_id
        .create_channel(
            &context.http,
            CreateChannel::new(name.as_str())
                .kind(ChannelType::Category)
                .permissions(overwrites),
        )
        .await
    {
        Ok(category) => category,
        Err(e) => {
            error!("Failed to create corporate category {}: {}", name, e);
            command
                .edit_response(
                    &context.http,
                    EditInteractionResponse::new().content(format!("❌ Error: {}", e)),
                )
                .await?;
            return Ok(());
        }
    };

    for (suffix, kind) in [
        ("correspondence", ChannelType::Text),
        ("announcements", ChannelType::Text),
        ("meeting-room", ChannelType::Voice),
    ] {
        guild_id
            .create_channel(
                &context.http,
                CreateChannel::new(format!("{}-{}", name, suffix))
                    .kind(kind)
                    .category(category.id),
            )
            .await?;
    }

    command
        .edit_response(
            &context.http,
            EditInteractionResponse::new()
                .content(format!("✅ Corporate setup for **{}** created successfully!", name)),
        )
        .await?;
    Ok(())
}

/// Extract user ids from `<@123>` / `<@!123>` mentions.
fn parse_mentions(input: &str) -> Vec<UserId> {
    let Ok(pattern) = Regex::new(r"<@!?(\d+)>") else {
        return Vec::new();
    };
    pattern
        .captures_iter(input)
        .filter_map(|capture| {
            let capture = capture.ok()?;
            capture.get(1)?.as_str().parse().ok().map(UserId::new)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_and_nickname_mentions() {
        let ids = parse_mentions("<@123> some text <@!456>");
        assert_eq!(ids, vec![UserId::new(123), UserId::new(456)]);
    }

    #[test]
    fn ignores_non_mention_text() {
        assert!(parse_mentions("no mentions here, just <#999> and @everyone").is_empty());
    }
}
