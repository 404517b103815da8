//! Per-user interaction rate limiting.
//!
//! Slash commands and component clicks are throttled independently; a
//! user hammering a button cannot lock themselves out of commands.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use serenity::model::id::UserId;

/// Interaction families with independent cooldowns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionClass {
    Command,
    Component,
}

impl ActionClass {
    fn cooldown(self) -> Duration {
        match self {
            Self::Command => Duration::from_secs(3),
            Self::Component => Duration::from_secs(2),
        }
    }
}

/// Tracks the last accepted interaction per user and class.
#[derive(Debug, Default)]
pub struct RateLimiter {
    last_seen: Mutex<HashMap<(UserId, ActionClass), Instant>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true when the interaction may proceed, recording it as the
    /// new most-recent one. Returns false while the cooldown is running;
    /// rejected attempts do not extend the cooldown.
    pub fn check(&self, user: UserId, class: ActionClass) -> bool {
        self.check_at(user, class, Instant::now())
    }

    fn check_at(&self, user: UserId, class: ActionClass, now: Instant) -> bool {
        let mut last_seen = match self.last_seen.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        match last_seen.get(&(user, class)) {
            Some(last) if now.duration_since(*last) < class.cooldown() => false,
            _ => {
                // Drop expired entries so the map stays bounded by the
                // number of users active within a cooldown window.
                last_seen
                    .retain(|&(_, entry_class), last| {
                        now.duration_since(*last) < entry_class.cooldown()
                    });
                last_seen.insert((user, class), now);
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const USER: UserId = UserId::new(7);

    #[test]
    fn first_interaction_passes() {
        let limiter = RateLimiter::new();
        assert!(limiter.check(USER, ActionClass::Command));
    }

    #[test]
    fn repeat_within_cooldown_is_rejected() {
        let limiter = RateLimiter::new();
        let start = Instant::now();
        assert!(limiter.check_at(USER, ActionClass::Command, start));
        assert!(!limiter.check_at(USER, ActionClass::Command, start + Duration::from_secs(1)));
        assert!(limiter.check_at(USER, ActionClass::Command, start + Duration::from_secs(3)));
    }

    #[test]
    fn rejected_attempts_do_not_extend_cooldown() {
        let limiter = RateLimiter::new();
        let start = Instant::now();
        assert!(limiter.check_at(USER, ActionClass::Component, start));
        assert!(!limiter.check_at(USER, ActionClass::Component, start + Duration::from_secs(1)));
        assert!(limiter.check_at(USER, ActionClass::Component, start + Duration::from_secs(2)));
    }

    #[test]
    fn classes_are_independent() {
        let limiter = RateLimiter::new();
        let start = Instant::now();
        assert!(limiter.check_at(USER, ActionClass::Command, start));
        assert!(limiter.check_at(USER, ActionClass::Component, start));
    }

    #[test]
    fn expired_entries_are_pruned() {
        let limiter = RateLimiter::new();
        let start = Instant::now();
        assert!(limiter.check_at(UserId::new(1), ActionClass::Command, start));
        assert!(limiter.check_at(UserId::new(2), ActionClass::Component, start));

        // Both cooldowns have long expired by the next interaction.
        assert!(limiter.check_at(UserId::new(3), ActionClass::Command, start + Duration::from_secs(10)));

        let last_seen = limiter.last_seen.lock().unwrap();
        assert_eq!(last_seen.len(), 1);
        assert!(last_seen.contains_key(&(UserId::new(3), ActionClass::Command)));
    }

    #[test]
    fn users_are_independent() {
        let limiter = RateLimiter::new();
        let start = Instant::now();
        assert!(limiter.check_at(UserId::new(1), ActionClass::Command, start));
        assert!(limiter.check_at(UserId::new(2), ActionClass::Command, start));
    }
}
