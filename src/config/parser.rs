//! Configuration file parsing (HOCON format).

use std::path::Path;

use hocon::HoconLoader;

use crate::common::error::ConfigError;
use crate::config::types::Config;

/// Load configuration from a HOCON file.
pub fn load_config(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let path = path.as_ref();

    HoconLoader::new()
        .load_file(path)
        .map_err(|e| ConfigError::IoError {
            path: path.display().to_string(),
            source: std::io::Error::new(std::io::ErrorKind::Other, e.to_string()),
        })?
        .resolve()
        .map_err(|e| ConfigError::ParseError {
            message: e.to_string(),
        })
}

/// Load configuration from a HOCON string.
#[allow(dead_code)]
pub fn load_config_str(content: &str) -> Result<Config, ConfigError> {
    HoconLoader::new()
        .load_str(content)
        .map_err(|e| ConfigError::ParseError {
            message: e.to_string(),
        })?
        .resolve()
        .map_err(|e| ConfigError::ParseError {
            message: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
    discord { token = "abc123" }
    bot { status = "Watching the law v1.0", owner_id = 848356730256883744 }
    roles { client_role_name = "Client" }
    ticket_panel {
        title = "Open a case"
        description = "Pick a category"
        buttons = [
            {
                id = "criminal"
                label = "Criminal Defense"
                prefix = "case"
                form_title = "Criminal intake"
                fields = [
                    { id = "summary", label = "What happened?", style = "paragraph" }
                ]
            }
        ]
    }
    ticket_embed { title = "Case opened", description = "A lawyer will be with you shortly." }
    verification { title = "Verify", description = "Press to verify", button_label = "Verify" }
    contracts { dir = "assets/contracts", firm_name = "Goodman & Haller", attorney_name = "Saul Goodman" }
    storage { path = "data/store.json" }
    "#;

    #[test]
    fn parses_minimal_config() {
        let config = load_config_str(MINIMAL).unwrap();
        assert_eq!(config.discord.token, "abc123");
        assert_eq!(config.bot.owner_id, Some(848356730256883744));
        assert_eq!(config.ticket_panel.buttons.len(), 1);
        assert_eq!(config.ticket_panel.buttons[0].fields[0].id, "summary");
        assert!(config.channels.is_none());
        assert!(config.reminders.is_none());
    }
}
