//! Discord-facing layer: client construction, event handling, commands,
//! and interactive components.

pub mod client;
pub mod commands;
pub mod components;
pub mod dispatch;
pub mod handler;
pub mod messages;
pub mod modals;
pub mod owner;
pub mod ratelimit;
pub mod reminders;
pub mod transcript;

pub use client::{build_client, AppState};

use serenity::all::{Member, Permissions};

/// Administrator check from an interaction's resolved member. Both slash
/// commands and component clicks route through this so the gate cannot
/// drift between the two surfaces.
pub fn member_is_admin(member: Option<&Member>) -> bool {
    has_administrator(member.and_then(|member| member.permissions))
}

fn has_administrator(permissions: Option<Permissions>) -> bool {
    permissions.is_some_and(|permissions| permissions.administrator())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn administrator_permission_grants_access() {
        assert!(has_administrator(Some(Permissions::ADMINISTRATOR)));
        assert!(has_administrator(Some(
            Permissions::ADMINISTRATOR | Permissions::SEND_MESSAGES
        )));
    }

    #[test]
    fn other_permissions_do_not() {
        assert!(!has_administrator(Some(Permissions::SEND_MESSAGES)));
        assert!(!has_administrator(Some(Permissions::empty())));
    }

    #[test]
    fn missing_member_is_not_admin() {
        // DMs carry no member payload.
        assert!(!member_is_admin(None));
        assert!(!has_administrator(None));
    }
}
