//! The ticket/bill lifecycle store.
//!
//! Owns the canonical in-memory state and mirrors it to a JSON file after
//! every mutation. The file is replaced atomically (write to a temp file,
//! then rename) so a crash mid-write leaves the previous snapshot intact.
//! Persistence failures are logged and the in-memory mutation stands; they
//! are never surfaced to the interacting user.
//!
//! Callers share one `Arc<tokio::sync::Mutex<Store>>`, which serializes
//! all mutations and closes the read-modify-write races earlier revisions
//! had between concurrently handled interactions.

use std::fs;
use std::path::PathBuf;

use chrono::Utc;
use serenity::model::id::{ChannelId, UserId};
use tracing::{error, info};

use crate::common::error::{StoreError, StoreResult};
use crate::store::status::BillAction;
use crate::store::types::{Bill, BillStatus, Recurrence, StoreData, TicketRecord};

pub struct Store {
    data: StoreData,
    path: PathBuf,
}

impl Store {
    /// Open the store at `path`, creating an empty one if the file does
    /// not exist yet.
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        let data = match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("No store file at {}, starting empty", path.display());
                StoreData::default()
            }
            Err(e) => return Err(e.into()),
        };
        Ok(Self { data, path })
    }

    /// Write the current state to disk via temp file + rename.
    fn write_snapshot(&self) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(&self.data)?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    /// Persist after a mutation. Failures are logged only.
    fn persist(&self) {
        if let Err(e) = self.write_snapshot() {
            error!("Failed to persist store to {}: {}", self.path.display(), e);
        }
    }

    // ------------------------------------------------------------------
    // Tickets
    // ------------------------------------------------------------------

    /// Case number the next `create_ticket` call will allocate.
    ///
    /// The caller is expected to hold the store lock from here through
    /// `create_ticket` so the number it used for the channel name cannot
    /// be taken by a concurrent intake.
    pub fn peek_case_number(&self) -> u64 {
        self.data.case_number
    }

    /// Allocate the next case number and record an open ticket.
    pub fn create_ticket(
        &mut self,
        kind: &str,
        user_id: UserId,
        username: &str,
        channel_id: ChannelId,
    ) -> StoreResult<u64> {
        if self.data.active_tickets.contains_key(&channel_id) {
            return Err(StoreError::DuplicateTicketChannel {
                channel: channel_id.get(),
            });
        }

        let case_number = self.data.case_number;
        self.data.case_number += 1;
        self.data.active_tickets.insert(
            channel_id,
            TicketRecord {
                case_number,
                user_id,
                username: username.to_string(),
                kind: kind.to_string(),
                channel_id,
            },
        );
        self.persist();
        Ok(case_number)
    }

    pub fn ticket_for_channel(&self, channel_id: ChannelId) -> Option<&TicketRecord> {
        self.data.active_tickets.get(&channel_id)
    }

    /// Remove a ticket record. The caller must produce the transcript
    /// first; the record is the only link between channel and case.
    pub fn close_ticket(&mut self, channel_id: ChannelId) -> StoreResult<TicketRecord> {
        let record = self
            .data
            .active_tickets
            .remove(&channel_id)
            .ok_or(StoreError::TicketNotFound {
                channel: channel_id.get(),
            })?;
        self.persist();
        Ok(record)
    }

    // ------------------------------------------------------------------
    // Bills
    // ------------------------------------------------------------------

    /// Append a new `Pending` bill to the owner's list.
    pub fn create_bill(
        &mut self,
        owner: UserId,
        recurrence: Recurrence,
        amount: &str,
        due_date: &str,
    ) -> String {
        let list = self.data.bills.entry(owner).or_default();
        let id = next_bill_id(list);
        list.push(Bill {
            id: id.clone(),
            amount: amount.to_string(),
            recurrence,
            due_date: due_date.to_string(),
            status: BillStatus::Pending,
        });
        self.persist();
        id
    }

    pub fn bills_for(&self, owner: UserId) -> &[Bill] {
        self.data.bills.get(&owner).map(Vec::as_slice).unwrap_or(&[])
    }

    /// First bill a payment confirmation from `owner` would act on.
    pub fn find_actionable_bill(&self, owner: UserId) -> Option<&Bill> {
        self.bills_for(owner).iter().find(|b| b.status.is_actionable())
    }

    /// The owning user confirmed payment: bill goes under review.
    pub fn mark_reviewing(&mut self, owner: UserId, bill_id: &str) -> StoreResult<Bill> {
        self.transition(owner, bill_id, BillAction::ConfirmPayment)
    }

    /// An administrator accepted the payment.
    pub fn mark_paid(&mut self, owner: UserId, bill_id: &str) -> StoreResult<Bill> {
        self.transition(owner, bill_id, BillAction::Approve)
    }

    /// An administrator rejected the payment; the bill becomes payable again.
    pub fn mark_denied(&mut self, owner: UserId, bill_id: &str) -> StoreResult<Bill> {
        self.transition(owner, bill_id, BillAction::Deny)
    }

    fn transition(
        &mut self,
        owner: UserId,
        bill_id: &str,
        action: BillAction,
    ) -> StoreResult<Bill> {
        let bill = self
            .data
            .bills
            .get_mut(&owner)
            .and_then(|list| list.iter_mut().find(|b| b.id == bill_id))
            .ok_or_else(|| StoreError::BillNotFound {
                owner: owner.get(),
                bill_id: bill_id.to_string(),
            })?;

        bill.status = bill.status.apply(action)?;
        let updated = bill.clone();
        self.persist();
        Ok(updated)
    }

    /// Administrative delete, irrespective of status.
    pub fn delete_bill(&mut self, owner: UserId, bill_id: &str) -> StoreResult<Bill> {
        let list = self
            .data
            .bills
            .get_mut(&owner)
            .ok_or_else(|| StoreError::BillNotFound {
                owner: owner.get(),
                bill_id: bill_id.to_string(),
            })?;
        let index = list.iter().position(|b| b.id == bill_id).ok_or_else(|| {
            StoreError::BillNotFound {
                owner: owner.get(),
                bill_id: bill_id.to_string(),
            }
        })?;
        let removed = list.remove(index);
        self.persist();
        Ok(removed)
    }

    /// All owners together with their first actionable bill, for the
    /// daily reminder sweep.
    pub fn actionable_bills(&self) -> Vec<(UserId, Bill)> {
        self.data
            .bills
            .iter()
            .filter_map(|(owner, list)| {
                list.iter()
                    .find(|b| b.status.is_actionable())
                    .map(|b| (*owner, b.clone()))
            })
            .collect()
    }

    // ------------------------------------------------------------------
    // Setup bindings & status override
    // ------------------------------------------------------------------

    /// Record the channel bindings from `/setup`. The transcript channel
    /// falls back to the panel channel when none was ever bound.
    pub fn apply_setup(
        &mut self,
        panel: ChannelId,
        category: ChannelId,
        verification: Option<ChannelId>,
        transcripts: Option<ChannelId>,
        contract_log: Option<ChannelId>,
    ) {
        self.data.panel_channel_id = Some(panel);
        self.data.category_id = Some(category);
        if verification.is_some() {
            self.data.verification_channel_id = verification;
        }
        match transcripts {
            Some(id) => self.data.transcript_channel_id = Some(id),
            None => {
                if self.data.transcript_channel_id.is_none() {
                    self.data.transcript_channel_id = Some(panel);
                }
            }
        }
        if contract_log.is_some() {
            self.data.contract_log_channel_id = contract_log;
        }
        self.persist();
    }

    pub fn category_id(&self) -> Option<ChannelId> {
        self.data.category_id
    }

    pub fn transcript_channel_id(&self) -> Option<ChannelId> {
        self.data.transcript_channel_id
    }

    pub fn contract_log_channel_id(&self) -> Option<ChannelId> {
        self.data.contract_log_channel_id
    }

    /// Presence-status override, set by the owner restart command.
    pub fn status_override(&self) -> Option<&str> {
        self.data.status.as_deref()
    }

    pub fn set_status_override(&mut self, status: Option<String>) {
        self.data.status = status;
        self.persist();
    }
}

/// Millisecond-timestamp bill id, bumped past any collision within the
/// owner's list. Uniqueness is per-owner only.
fn next_bill_id(existing: &[Bill]) -> String {
    let mut id = Utc::now().timestamp_millis();
    while existing.iter().any(|b| b.id == id.to_string()) {
        id += 1;
    }
    id.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn open_store(dir: &TempDir) -> Store {
        Store::open(dir.path().join("store.json")).unwrap()
    }

    #[test]
    fn case_numbers_are_gapless_across_types() {
        let dir = TempDir::new().unwrap();
        let mut store = open_store(&dir);

        for (i, kind) in ["criminal", "civil", "criminal", "billing"].iter().enumerate() {
            let case = store
                .create_ticket(kind, UserId::new(10), "client", ChannelId::new(100 + i as u64))
                .unwrap();
            assert_eq!(case, i as u64 + 1);
        }
    }

    #[test]
    fn duplicate_channel_is_rejected() {
        let dir = TempDir::new().unwrap();
        let mut store = open_store(&dir);

        store
            .create_ticket("civil", UserId::new(10), "client", ChannelId::new(100))
            .unwrap();
        let err = store
            .create_ticket("civil", UserId::new(11), "other", ChannelId::new(100))
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateTicketChannel { channel: 100 }));
        // The failed call must not burn a case number.
        assert_eq!(store.peek_case_number(), 2);
    }

    #[test]
    fn close_unknown_channel_leaves_store_untouched() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.json");
        let mut store = Store::open(&path).unwrap();

        let err = store.close_ticket(ChannelId::new(555)).unwrap_err();
        assert!(matches!(err, StoreError::TicketNotFound { channel: 555 }));
        // No mutation happened, so nothing was persisted either.
        assert!(!path.exists());
    }

    #[test]
    fn close_returns_the_removed_record() {
        let dir = TempDir::new().unwrap();
        let mut store = open_store(&dir);

        let case = store
            .create_ticket("criminal", UserId::new(7), "client", ChannelId::new(200))
            .unwrap();
        let record = store.close_ticket(ChannelId::new(200)).unwrap();
        assert_eq!(record.case_number, case);
        assert_eq!(record.user_id, UserId::new(7));
        assert!(store.ticket_for_channel(ChannelId::new(200)).is_none());
    }

    #[test]
    fn new_bill_is_pending_and_actionable() {
        let dir = TempDir::new().unwrap();
        let mut store = open_store(&dir);
        let owner = UserId::new(99);

        let id = store.create_bill(owner, Recurrence::Monthly, "500", "01/01/2025");
        let bill = store.find_actionable_bill(owner).unwrap();
        assert_eq!(bill.id, id);
        assert_eq!(bill.status, BillStatus::Pending);
    }

    #[test]
    fn bill_ids_unique_within_owner() {
        let dir = TempDir::new().unwrap();
        let mut store = open_store(&dir);
        let owner = UserId::new(99);

        let a = store.create_bill(owner, Recurrence::Weekly, "100", "01/01/2025");
        let b = store.create_bill(owner, Recurrence::Weekly, "100", "01/01/2025");
        assert_ne!(a, b);
    }

    #[test]
    fn payment_review_scenario() {
        let dir = TempDir::new().unwrap();
        let mut store = open_store(&dir);
        let owner = UserId::new(42);

        let id = store.create_bill(owner, Recurrence::Monthly, "500", "01/01/2025");
        assert_eq!(store.bills_for(owner)[0].status, BillStatus::Pending);

        // User signals payment.
        let bill = store.mark_reviewing(owner, &id).unwrap();
        assert_eq!(bill.status, BillStatus::Reviewing);

        // Admin denies; the bill becomes actionable again.
        let bill = store.mark_denied(owner, &id).unwrap();
        assert_eq!(bill.status, BillStatus::Rejected);
        assert_eq!(store.find_actionable_bill(owner).unwrap().id, id);

        // User retries, admin approves.
        store.mark_reviewing(owner, &id).unwrap();
        let bill = store.mark_paid(owner, &id).unwrap();
        assert_eq!(bill.status, BillStatus::Paid);

        // Replaying the approval is a no-op, not an error.
        let bill = store.mark_paid(owner, &id).unwrap();
        assert_eq!(bill.status, BillStatus::Paid);
        assert!(store.find_actionable_bill(owner).is_none());
    }

    #[test]
    fn delete_bill_ignores_status() {
        let dir = TempDir::new().unwrap();
        let mut store = open_store(&dir);
        let owner = UserId::new(42);

        let id = store.create_bill(owner, Recurrence::OneTime, "250", "03/01/2025");
        store.mark_reviewing(owner, &id).unwrap();
        store.mark_paid(owner, &id).unwrap();

        let removed = store.delete_bill(owner, &id).unwrap();
        assert_eq!(removed.status, BillStatus::Paid);
        assert!(store.bills_for(owner).is_empty());

        let err = store.delete_bill(owner, &id).unwrap_err();
        assert!(matches!(err, StoreError::BillNotFound { .. }));
    }

    #[test]
    fn reload_reproduces_state() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.json");
        let owner = UserId::new(11);

        let (case, bill_id) = {
            let mut store = Store::open(&path).unwrap();
            let case = store
                .create_ticket("civil", owner, "kim", ChannelId::new(301))
                .unwrap();
            let first = store.create_bill(owner, Recurrence::Yearly, "1200", "06/01/2025");
            store.create_bill(owner, Recurrence::OneTime, "75", "07/01/2025");
            store.mark_reviewing(owner, &first).unwrap();
            (case, first)
        };

        let store = Store::open(&path).unwrap();
        let ticket = store.ticket_for_channel(ChannelId::new(301)).unwrap();
        assert_eq!(ticket.case_number, case);
        assert_eq!(ticket.username, "kim");

        let bills = store.bills_for(owner);
        assert_eq!(bills.len(), 2);
        // List order survives the round trip.
        assert_eq!(bills[0].id, bill_id);
        assert_eq!(bills[0].status, BillStatus::Reviewing);
        assert_eq!(bills[1].status, BillStatus::Pending);
        assert_eq!(store.peek_case_number(), case + 1);
    }

    #[test]
    fn setup_defaults_transcripts_to_panel() {
        let dir = TempDir::new().unwrap();
        let mut store = open_store(&dir);

        store.apply_setup(ChannelId::new(1), ChannelId::new(2), None, None, None);
        assert_eq!(store.transcript_channel_id(), Some(ChannelId::new(1)));

        // A later setup with an explicit transcript channel overrides it.
        store.apply_setup(
            ChannelId::new(1),
            ChannelId::new(2),
            Some(ChannelId::new(3)),
            Some(ChannelId::new(4)),
            Some(ChannelId::new(5)),
        );
        assert_eq!(store.transcript_channel_id(), Some(ChannelId::new(4)));
        assert_eq!(store.contract_log_channel_id(), Some(ChannelId::new(5)));
    }

    #[test]
    fn actionable_sweep_skips_settled_owners() {
        let dir = TempDir::new().unwrap();
        let mut store = open_store(&dir);

        let a = UserId::new(1);
        let b = UserId::new(2);
        let bill_a = store.create_bill(a, Recurrence::Monthly, "100", "01/01/2025");
        let bill_b = store.create_bill(b, Recurrence::Monthly, "200", "01/01/2025");
        store.mark_reviewing(b, &bill_b).unwrap();
        store.mark_paid(b, &bill_b).unwrap();

        let sweep = store.actionable_bills();
        assert_eq!(sweep.len(), 1);
        assert_eq!(sweep[0].0, a);
        assert_eq!(sweep[0].1.id, bill_a);
    }
}
