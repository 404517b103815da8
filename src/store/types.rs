//! Persisted record types for tickets and bills.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serenity::model::id::{ChannelId, UserId};

/// An open support ticket, keyed by its backing channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketRecord {
    /// Monotonic case number, unique process-wide.
    pub case_number: u64,
    /// The user who opened the ticket.
    pub user_id: UserId,
    /// Username at creation time, kept for transcripts.
    pub username: String,
    /// Ticket category tag (matches a configured panel button id).
    #[serde(rename = "type")]
    pub kind: String,
    /// The private channel backing this ticket.
    pub channel_id: ChannelId,
}

/// How often a bill recurs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recurrence {
    #[serde(rename = "One-time")]
    OneTime,
    Weekly,
    Monthly,
    Yearly,
}

impl Recurrence {
    /// Parse the value side of a slash-command choice.
    pub fn from_choice(value: &str) -> Option<Self> {
        match value {
            "one_time" => Some(Self::OneTime),
            "weekly" => Some(Self::Weekly),
            "monthly" => Some(Self::Monthly),
            "yearly" => Some(Self::Yearly),
            _ => None,
        }
    }
}

impl fmt::Display for Recurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::OneTime => "One-time",
            Self::Weekly => "Weekly",
            Self::Monthly => "Monthly",
            Self::Yearly => "Yearly",
        };
        f.write_str(name)
    }
}

/// Payment status of a bill.
///
/// `Overdue` is never entered automatically; it exists so that records
/// written by earlier revisions still load and stay payable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BillStatus {
    Pending,
    Overdue,
    Reviewing,
    Paid,
    /// Earlier revisions wrote both "Denied" and "Rejected" for this state.
    #[serde(alias = "Denied")]
    Rejected,
}

impl BillStatus {
    /// Whether a payment confirmation from the owner has any effect.
    pub fn is_actionable(self) -> bool {
        matches!(self, Self::Pending | Self::Overdue | Self::Rejected)
    }
}

impl fmt::Display for BillStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pending => "Pending",
            Self::Overdue => "Overdue",
            Self::Reviewing => "Reviewing",
            Self::Paid => "Paid",
            Self::Rejected => "Rejected",
        };
        f.write_str(name)
    }
}

/// A billing obligation owned by one user.
///
/// The id is a millisecond timestamp string and is only unique within
/// one owner's list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bill {
    pub id: String,
    /// Free-form amount: "500", "Variable", ...
    pub amount: String,
    #[serde(rename = "type", default = "default_recurrence")]
    pub recurrence: Recurrence,
    /// Due date as entered, e.g. "01/01/2025".
    #[serde(rename = "date")]
    pub due_date: String,
    pub status: BillStatus,
}

fn default_recurrence() -> Recurrence {
    Recurrence::OneTime
}

/// The whole persisted document.
///
/// Serialized pretty-printed to a single JSON file; the field names match
/// the layout earlier revisions wrote so existing files keep loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StoreData {
    /// Next case number to allocate.
    pub case_number: u64,
    /// Open tickets keyed by backing channel.
    pub active_tickets: HashMap<ChannelId, TicketRecord>,
    /// Per-user bill lists, order preserved.
    pub bills: HashMap<UserId, Vec<Bill>>,
    pub panel_channel_id: Option<ChannelId>,
    pub category_id: Option<ChannelId>,
    pub verification_channel_id: Option<ChannelId>,
    pub transcript_channel_id: Option<ChannelId>,
    pub contract_log_channel_id: Option<ChannelId>,
    /// Presence-status override set by the owner restart command.
    pub status: Option<String>,
}

impl Default for StoreData {
    fn default() -> Self {
        Self {
            case_number: 1,
            active_tickets: HashMap::new(),
            bills: HashMap::new(),
            panel_channel_id: None,
            category_id: None,
            verification_channel_id: None,
            transcript_channel_id: None,
            contract_log_channel_id: None,
            status: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bill_status_actionable_set() {
        assert!(BillStatus::Pending.is_actionable());
        assert!(BillStatus::Overdue.is_actionable());
        assert!(BillStatus::Rejected.is_actionable());
        assert!(!BillStatus::Reviewing.is_actionable());
        assert!(!BillStatus::Paid.is_actionable());
    }

    #[test]
    fn legacy_denied_status_loads_as_rejected() {
        let bill: Bill = serde_json::from_str(
            r#"{"id":"1700000000000","amount":"500","date":"01/01/2025","status":"Denied"}"#,
        )
        .unwrap();
        assert_eq!(bill.status, BillStatus::Rejected);
        assert_eq!(bill.recurrence, Recurrence::OneTime);
    }

    #[test]
    fn store_data_round_trips() {
        let mut data = StoreData::default();
        data.case_number = 7;
        data.active_tickets.insert(
            ChannelId::new(42),
            TicketRecord {
                case_number: 6,
                user_id: UserId::new(99),
                username: "mickey".into(),
                kind: "criminal".into(),
                channel_id: ChannelId::new(42),
            },
        );
        data.bills.insert(
            UserId::new(99),
            vec![
                Bill {
                    id: "1700000000000".into(),
                    amount: "500".into(),
                    recurrence: Recurrence::Monthly,
                    due_date: "01/01/2025".into(),
                    status: BillStatus::Pending,
                },
                Bill {
                    id: "1700000000001".into(),
                    amount: "Variable".into(),
                    recurrence: Recurrence::OneTime,
                    due_date: "02/01/2025".into(),
                    status: BillStatus::Paid,
                },
            ],
        );

        let json = serde_json::to_string_pretty(&data).unwrap();
        let reloaded: StoreData = serde_json::from_str(&json).unwrap();
        assert_eq!(reloaded, data);
    }
}
