//! Environment variable overrides for configuration.
//!
//! Supports overriding config values with environment variables:
//! - `CHANCERY_CONFIG` - config file path (read by `get_config_path`)
//! - `CHANCERY_DISCORD_TOKEN` - Discord bot token
//! - `CHANCERY_GUILD_ID` - guild to register commands against
//! - `CHANCERY_OWNER_ID` - operator for the `$` maintenance commands
//! - `CHANCERY_STORE_PATH` - persisted state file

use std::env;

use crate::config::types::Config;

/// Environment variable prefix for all config overrides.
const ENV_PREFIX: &str = "CHANCERY";

/// Default config file path when `CHANCERY_CONFIG` is unset.
const DEFAULT_CONFIG_PATH: &str = "chancery.conf";

/// Resolve the config file path.
pub fn get_config_path() -> String {
    env::var(format!("{}_CONFIG", ENV_PREFIX)).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string())
}

/// Apply environment variable overrides to a config.
///
/// This allows sensitive values like the bot token to be provided via
/// the environment instead of the config file.
pub fn apply_env_overrides(mut config: Config) -> Config {
    if let Ok(token) = env::var(format!("{}_DISCORD_TOKEN", ENV_PREFIX)) {
        config.discord.token = token;
    }
    if let Ok(guild) = env::var(format!("{}_GUILD_ID", ENV_PREFIX)) {
        if let Ok(guild) = guild.parse() {
            config.discord.guild_id = Some(guild);
        }
    }
    if let Ok(owner) = env::var(format!("{}_OWNER_ID", ENV_PREFIX)) {
        if let Ok(owner) = owner.parse() {
            config.bot.owner_id = Some(owner);
        }
    }
    if let Ok(path) = env::var(format!("{}_STORE_PATH", ENV_PREFIX)) {
        config.storage.path = path;
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parser::load_config_str;
    use crate::config::types::Config;
    use std::sync::{Mutex, MutexGuard, OnceLock};

    // Process environment is shared across test threads.
    fn env_guard() -> MutexGuard<'static, ()> {
        static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        LOCK.get_or_init(|| Mutex::new(()))
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn make_test_config() -> Config {
        load_config_str(
            r#"
            discord { token = "original_token" }
            bot { status = "Watching the docket" }
            roles { client_role_name = "Client" }
            ticket_panel {
                title = "t", description = "d"
                buttons = [
                    { id = "a", label = "A", prefix = "case", form_title = "f",
                      fields = [ { id = "x", label = "X" } ] }
                ]
            }
            ticket_embed { title = "t", description = "d" }
            verification { title = "t", description = "d", button_label = "Verify" }
            contracts { dir = "assets", firm_name = "F", attorney_name = "A" }
            storage { path = "store.json" }
            "#,
        )
        .unwrap()
    }

    fn clear_override_vars() {
        env::remove_var("CHANCERY_DISCORD_TOKEN");
        env::remove_var("CHANCERY_GUILD_ID");
        env::remove_var("CHANCERY_OWNER_ID");
        env::remove_var("CHANCERY_STORE_PATH");
    }

    #[test]
    fn test_env_prefix() {
        assert_eq!(ENV_PREFIX, "CHANCERY");
    }

    #[test]
    fn test_get_config_path_default() {
        let _guard = env_guard();
        env::remove_var("CHANCERY_CONFIG");
        assert_eq!(get_config_path(), "chancery.conf");
    }

    #[test]
    fn test_get_config_path_from_env() {
        let _guard = env_guard();
        env::set_var("CHANCERY_CONFIG", "/etc/chancery/prod.conf");
        assert_eq!(get_config_path(), "/etc/chancery/prod.conf");
        env::remove_var("CHANCERY_CONFIG");
    }

    #[test]
    fn test_apply_env_overrides_no_vars() {
        let _guard = env_guard();
        clear_override_vars();

        let result = apply_env_overrides(make_test_config());

        // Should remain unchanged
        assert_eq!(result.discord.token, "original_token");
        assert_eq!(result.discord.guild_id, None);
        assert_eq!(result.storage.path, "store.json");
    }

    #[test]
    fn test_apply_env_overrides_lands() {
        let _guard = env_guard();
        clear_override_vars();
        env::set_var("CHANCERY_DISCORD_TOKEN", "env_token");
        env::set_var("CHANCERY_GUILD_ID", "123456789");
        env::set_var("CHANCERY_OWNER_ID", "42");
        env::set_var("CHANCERY_STORE_PATH", "/var/lib/chancery/store.json");

        let result = apply_env_overrides(make_test_config());
        clear_override_vars();

        assert_eq!(result.discord.token, "env_token");
        assert_eq!(result.discord.guild_id, Some(123456789));
        assert_eq!(result.bot.owner_id, Some(42));
        assert_eq!(result.storage.path, "/var/lib/chancery/store.json");
    }

    #[test]
    fn test_apply_env_overrides_bad_guild_id_ignored() {
        let _guard = env_guard();
        clear_override_vars();
        env::set_var("CHANCERY_GUILD_ID", "not-a-number");

        let result = apply_env_overrides(make_test_config());
        clear_override_vars();

        assert_eq!(result.discord.guild_id, None);
    }
}
