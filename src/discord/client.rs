//! Discord client construction and shared bot state.

use std::collections::HashMap;
use std::sync::Arc;

use serenity::prelude::*;
use serenity::Client;
use serenity::model::id::UserId;

use crate::config::types::Config;
use crate::discord::handler::Handler;
use crate::discord::ratelimit::RateLimiter;
use crate::store::SharedStore;

/// State shared by every event handler, stored in serenity's type map.
pub struct AppState {
    pub config: Config,
    pub store: SharedStore,
    pub limiter: RateLimiter,
    /// Who a pending `/contract` send is addressed to, keyed by the
    /// staff member driving the select menu.
    pub contract_targets: std::sync::Mutex<HashMap<UserId, UserId>>,
}

impl AppState {
    pub fn new(config: Config, store: SharedStore) -> Self {
        Self {
            config,
            store,
            limiter: RateLimiter::new(),
            contract_targets: std::sync::Mutex::new(HashMap::new()),
        }
    }

    pub fn set_contract_target(&self, staff: UserId, target: UserId) {
        let mut targets = match self.contract_targets.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        targets.insert(staff, target);
    }

    pub fn contract_target(&self, staff: UserId) -> Option<UserId> {
        let targets = match self.contract_targets.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        targets.get(&staff).copied()
    }

    pub fn clear_contract_target(&self, staff: UserId) {
        let mut targets = match self.contract_targets.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        targets.remove(&staff);
    }
}

pub struct AppStateKey;

impl TypeMapKey for AppStateKey {
    type Value = Arc<AppState>;
}

/// Build the Discord client with the gateway intents the bot needs.
pub async fn build_client(state: Arc<AppState>) -> serenity::Result<Client> {
    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT
        | GatewayIntents::GUILD_MEMBERS
        | GatewayIntents::DIRECT_MESSAGES;

    let client = Client::builder(&state.config.discord.token, intents)
        .event_handler(Handler::default())
        .await?;

    client.data.write().await.insert::<AppStateKey>(state);

    Ok(client)
}

/// Fetch the shared state out of a context. Registered before the client
/// starts, so it is always present.
pub async fn app_state(context: &Context) -> Arc<AppState> {
    let data = context.data.read().await;
    data.get::<AppStateKey>()
        .cloned()
        .expect("application state registered at startup")
}
