//! Daily billing reminder task.
//!
//! A one-minute tick checks the local clock; on the first tick at or past
//! the configured hour each day, every user owning an actionable bill is
//! DMed the payment confirmation button. A process started after the hour
//! counts today as already done, so restarts never replay the sweep.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, NaiveDate, NaiveDateTime, Timelike};
use serenity::all::{Context, CreateMessage};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::discord::client::AppState;
use crate::discord::messages::{paid_row, payment_request_embed};

const DEFAULT_HOUR: u32 = 9;

pub fn spawn(context: Context, state: Arc<AppState>) -> JoinHandle<()> {
    let hour = state
        .config
        .reminders
        .as_ref()
        .and_then(|reminders| reminders.hour)
        .unwrap_or(DEFAULT_HOUR);

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(60));
        let mut last_run = initial_last_run(Local::now().naive_local(), hour);
        loop {
            interval.tick().await;
            let now = Local::now().naive_local();
            if !sweep_due(now, hour, last_run) {
                continue;
            }
            last_run = Some(now.date());
            run_sweep(&context, &state).await;
        }
    })
}

/// Today counts as already swept when the process comes up at or past
/// the configured hour.
fn initial_last_run(now: NaiveDateTime, hour: u32) -> Option<NaiveDate> {
    (now.hour() >= hour).then_some(now.date())
}

fn sweep_due(now: NaiveDateTime, hour: u32, last_run: Option<NaiveDate>) -> bool {
    now.hour() >= hour && last_run != Some(now.date())
}

async fn run_sweep(context: &Context, state: &Arc<AppState>) {
    let due = {
        let store = state.store.lock().await;
        store.actionable_bills()
    };
    if due.is_empty() {
        return;
    }
    info!("Sending {} billing reminders", due.len());

    for (owner, bill) in due {
        let message = CreateMessage::new()
            .embed(payment_request_embed(&bill))
            .components(vec![paid_row(&bill.id)]);
        let sent = match owner.create_dm_channel(&context.http).await {
            Ok(dm) => dm.id.send_message(&context.http, message).await.map(|_| ()),
            Err(e) => Err(e),
        };
        if let Err(e) = sent {
            warn!("Failed to send reminder to {}: {}", owner, e);
        }
    }
}
