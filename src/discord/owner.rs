//! Owner-only `$` maintenance commands, handled from plain messages.

use std::sync::Arc;

use fancy_regex::Regex;
use serenity::all::{ActivityData, Context, Message};
use tracing::{error, info};

use crate::common::error::AppError;
use crate::discord::client::AppState;

/// Handle a `$` maintenance command. Returns true when the message was
/// one, whether or not it succeeded.
pub async fn handle(
    context: &Context,
    state: &Arc<AppState>,
    message: &Message,
) -> Result<bool, AppError> {
    let Some(owner_id) = state.config.bot.owner_id else {
        return Ok(false);
    };
    if message.author.id.get() != owner_id {
        return Ok(false);
    }

    match message.content.as_str() {
        "$restart git" => {
            restart(context, state, message).await?;
            Ok(true)
        }
        "$git v" => {
            let status = current_status(state).await;
            message
                .reply(&context.http, format!("Running: {}", status))
                .await?;
            Ok(true)
        }
        "$statclear ADMIN ONLY" => {
            {
                let mut store = state.store.lock().await;
                store.set_status_override(None);
            }
            context.set_activity(Some(ActivityData::watching(state.config.bot.status.clone())));
            message
                .reply(
                    &context.http,
                    format!("✅ Status reset to '{}'", state.config.bot.status),
                )
                .await?;
            Ok(true)
        }
        _ => Ok(false),
    }
}

async fn current_status(state: &Arc<AppState>) -> String {
    let store = state.store.lock().await;
    store
        .status_override()
        .map(str::to_string)
        .unwrap_or_else(|| state.config.bot.status.clone())
}

/// Bump the status version, persist it, pull, and exit for the supervisor
/// to restart the process.
async fn restart(
    context: &Context,
    state: &Arc<AppState>,
    message: &Message,
) -> Result<(), AppError> {
    message
        .reply(&context.http, "🔄 Pulling latest changes and restarting...")
        .await?;

    let new_status = bump_version(&current_status(state).await);
    info!("Restarting with status '{}'", new_status);
    {
        let mut store = state.store.lock().await;
        store.set_status_override(Some(new_status));
    }

    match tokio::process::Command::new("git").arg("pull").output().await {
        Ok(output) => {
            info!("git pull: {}", String::from_utf8_lossy(&output.stdout).trim());
            if !output.status.success() {
                let stderr = String::from_utf8_lossy(&output.stderr);
                error!("git pull failed: {}", stderr.trim());
                message
                    .reply(&context.http, format!("❌ Git Pull Error: {}", stderr.trim()))
                    .await?;
            }
        }
        Err(e) => {
            error!("Failed to run git pull: {}", e);
            message
                .reply(&context.http, format!("❌ Git Pull Error: {}", e))
                .await?;
        }
    }

    std::process::exit(0);
}

/// Increment the minor version in a "... vX.Y" status string; statuses
/// without one get " v1.1" appended.
fn bump_version(status: &str) -> String {
    let Ok(pattern) = Regex::new(r"v(\d+)\.(\d+)") else {
        return status.to_string();
    };
    let capture = match pattern.captures(status) {
        Ok(Some(capture)) => capture,
        _ => return format!("{} v1.1", status),
    };
    let (Some(whole), Some(major), Some(minor)) = (capture.get(0), capture.get(1), capture.get(2))
    else {
        return format!("{} v1.1", status);
    };
    let major: u32 = major.as_str().parse().unwrap_or(1);
    let minor: u32 = minor.as_str().parse().unwrap_or(0);
    format!(
        "{}v{}.{}{}",
        &status[..whole.start()],
        major,
        minor + 1,
        &status[whole.end()..]
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bumps_the_minor_version() {
        assert_eq!(bump_version("Watching the law v1.0"), "Watching the law v1.1");
        assert_eq!(bump_version("Watching the law v2.9"), "Watching the law v2.10");
    }

    #[test]
    fn keeps_text_around_the_version() {
        assert_eq!(bump_version("v1.3 beta"), "v1.4 beta");
    }

    #[test]
    fn appends_a_version_when_missing() {
        assert_eq!(bump_version("Watching the law"), "Watching the law v1.1");
    }
}
