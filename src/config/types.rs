//! Configuration type definitions.

use serde::Deserialize;

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub discord: DiscordConfig,
    pub bot: BotConfig,
    pub roles: RolesConfig,
    pub channels: Option<ChannelsConfig>,
    pub ticket_panel: TicketPanelConfig,
    pub ticket_embed: TicketEmbedConfig,
    pub verification: VerificationConfig,
    pub contracts: ContractsConfig,
    pub storage: StorageConfig,
    pub reminders: Option<RemindersConfig>,
}

/// Discord connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DiscordConfig {
    pub token: String,
    /// When set, slash commands are registered guild-scoped (instant),
    /// otherwise globally.
    pub guild_id: Option<u64>,
}

/// Bot identity settings.
#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
    /// Default presence text, e.g. "Watching the law v1.0".
    pub status: String,
    /// User allowed to run the `$`-prefixed maintenance commands.
    pub owner_id: Option<u64>,
}

/// Role bindings.
#[derive(Debug, Clone, Deserialize)]
pub struct RolesConfig {
    /// Assigned to every new member on join.
    pub auto_role_id: Option<u64>,
    /// Granted by the verification button (replaces the auto role).
    pub verified_role_id: Option<u64>,
    /// Pinged into new tickets and payment reviews.
    pub support_role_id: Option<u64>,
    /// Name of the role `/client` grants to a ticket's creator.
    pub client_role_name: String,
}

/// Optional fixed channels outside the `/setup` bindings.
#[derive(Debug, Clone, Deserialize)]
pub struct ChannelsConfig {
    /// Welcome embeds for new members.
    pub welcome: Option<u64>,
    /// Payment-review messages for staff; falls back to the transcript
    /// channel when unset.
    pub staff_review: Option<u64>,
}

/// The ticket panel posted by `/setup`.
#[derive(Debug, Clone, Deserialize)]
pub struct TicketPanelConfig {
    pub title: String,
    pub description: String,
    pub color: Option<String>,
    pub image: Option<String>,
    pub buttons: Vec<TicketButtonConfig>,
}

/// One ticket category button with its intake form.
#[derive(Debug, Clone, Deserialize)]
pub struct TicketButtonConfig {
    /// Stable tag carried in custom ids and ticket records.
    pub id: String,
    pub label: String,
    pub emoji: Option<String>,
    /// "primary", "secondary", "success", "danger".
    pub style: Option<String>,
    /// Channel name prefix, e.g. "case" -> case-17.
    pub prefix: String,
    pub form_title: String,
    pub fields: Vec<FormFieldConfig>,
}

/// One text input of an intake form. Discord allows at most five rows.
#[derive(Debug, Clone, Deserialize)]
pub struct FormFieldConfig {
    pub id: String,
    pub label: String,
    /// "short" or "paragraph" (default).
    pub style: Option<String>,
    pub placeholder: Option<String>,
    pub required: Option<bool>,
    pub max_length: Option<u16>,
}

/// Embed posted into a freshly created ticket channel.
#[derive(Debug, Clone, Deserialize)]
pub struct TicketEmbedConfig {
    pub title: String,
    pub description: String,
    pub color: Option<String>,
    pub footer: Option<String>,
    pub image: Option<String>,
}

/// Verification panel content.
#[derive(Debug, Clone, Deserialize)]
pub struct VerificationConfig {
    pub title: String,
    pub description: String,
    pub button_label: String,
    pub color: Option<String>,
    pub image: Option<String>,
}

/// Contract template assets and signature block text.
#[derive(Debug, Clone, Deserialize)]
pub struct ContractsConfig {
    /// Directory of `.txt` templates.
    pub dir: String,
    pub firm_name: String,
    pub attorney_name: String,
}

/// Store file location.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub path: String,
}

/// Daily billing reminder settings.
#[derive(Debug, Clone, Deserialize)]
pub struct RemindersConfig {
    /// Local hour (0-23) of the daily sweep. Defaults to 9.
    pub hour: Option<u32>,
}

/// Parse a "#RRGGBB" color string; returns `None` for anything else.
pub fn parse_color(value: &str) -> Option<u32> {
    let hex = value.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    u32::from_str_radix(hex, 16).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_colors() {
        assert_eq!(parse_color("#D4AF37"), Some(0xD4AF37));
        assert_eq!(parse_color("#57F287"), Some(0x57F287));
        assert_eq!(parse_color("D4AF37"), None);
        assert_eq!(parse_color("#D4AF"), None);
        assert_eq!(parse_color("#GGGGGG"), None);
    }
}
