//! Configuration validation.
//!
//! Validates configuration values and provides helpful error messages.

use std::collections::HashSet;

use crate::common::error::ConfigError;
use crate::config::types::Config;

/// Validate a configuration and return detailed errors.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let mut errors = Vec::new();

    if config.discord.token.is_empty() {
        errors.push("discord.token is required".to_string());
    }
    if config.discord.token == "YOUR_DISCORD_TOKEN_HERE" {
        errors.push("discord.token has not been configured (still using placeholder)".to_string());
    }

    if config.roles.client_role_name.is_empty() {
        errors.push("roles.client_role_name is required".to_string());
    }

    if config.ticket_panel.buttons.is_empty() {
        errors.push("ticket_panel.buttons must define at least one category".to_string());
    }
    let mut seen = HashSet::new();
    for button in &config.ticket_panel.buttons {
        if button.id.is_empty() {
            errors.push("ticket_panel.buttons[].id must not be empty".to_string());
        }
        if !seen.insert(button.id.as_str()) {
            errors.push(format!("duplicate ticket button id '{}'", button.id));
        }
        // Discord modals are limited to five input rows.
        if button.fields.is_empty() || button.fields.len() > 5 {
            errors.push(format!(
                "ticket button '{}' must define 1-5 form fields (got {})",
                button.id,
                button.fields.len()
            ));
        }
    }

    if config.contracts.dir.is_empty() {
        errors.push("contracts.dir is required".to_string());
    }
    if config.storage.path.is_empty() {
        errors.push("storage.path is required".to_string());
    }

    if let Some(reminders) = &config.reminders {
        if let Some(hour) = reminders.hour {
            if hour > 23 {
                errors.push(format!("reminders.hour must be 0-23 (got {})", hour));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError {
            message: errors.join("; "),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parser::load_config_str;

    fn valid_config() -> Config {
        load_config_str(
            r#"
            discord { token = "abc" }
            bot { status = "Watching the law v1.0" }
            roles { client_role_name = "Client" }
            ticket_panel {
                title = "t", description = "d"
                buttons = [
                    { id = "a", label = "A", prefix = "case", form_title = "f",
                      fields = [ { id = "x", label = "X" } ] },
                    { id = "b", label = "B", prefix = "bill", form_title = "f",
                      fields = [ { id = "y", label = "Y" } ] }
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

    #[test]
    fn accepts_valid_config() {
        assert!(validate_config(&valid_config()).is_ok());
    }

    #[test]
    fn rejects_empty_token() {
        let mut config = valid_config();
        config.discord.token = String::new();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn rejects_duplicate_button_ids() {
        let mut config = valid_config();
        config.ticket_panel.buttons[1].id = "a".to_string();
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("duplicate ticket button id"));
    }

    #[test]
    fn rejects_oversized_forms() {
        let mut config = valid_config();
        let field = config.ticket_panel.buttons[0].fields[0].clone();
        config.ticket_panel.buttons[0].fields = vec![field; 6];
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn rejects_bad_reminder_hour() {
        let mut config = valid_config();
        config.reminders = Some(crate::config::types::RemindersConfig { hour: Some(24) });
        assert!(validate_config(&config).is_err());
    }
}
