//! Canonical state for open tickets and bills, with JSON persistence.

pub mod repository;
pub mod status;
pub mod types;

pub use repository::Store;
pub use status::BillAction;
pub use types::{Bill, BillStatus, Recurrence, StoreData, TicketRecord};

use std::sync::Arc;
use tokio::sync::Mutex;

/// Shared handle: every mutation goes through this single lock.
pub type SharedStore = Arc<Mutex<Store>>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::types::{BillStatus, Recurrence};
    use serenity::model::id::UserId;
    use tempfile::TempDir;

    #[tokio::test]
    async fn mutations_serialize_through_the_shared_lock() {
        let dir = TempDir::new().unwrap();
        let store = Store::open(dir.path().join("store.json")).unwrap();
        let shared: SharedStore = Arc::new(Mutex::new(store));
        let owner = UserId::new(5);

        let id = shared
            .lock()
            .await
            .create_bill(owner, Recurrence::Monthly, "500", "01/01/2025");

        // A confirmation racing an approval cannot interleave: the
        // approval sees either the pre-confirm state (and errors) or the
        // post-confirm state (and succeeds), never a torn read.
        let confirm = {
            let shared = shared.clone();
            let id = id.clone();
            tokio::spawn(async move {
                let mut store = shared.lock().await;
                store.mark_reviewing(owner, &id)
            })
        };
        confirm.await.unwrap().unwrap();

        let mut store = shared.lock().await;
        let bill = store.mark_paid(owner, &id).unwrap();
        assert_eq!(bill.status, BillStatus::Paid);
    }
}
