//! Typed dispatch for interaction custom ids.
//!
//! Component and modal custom ids are parsed once into tagged variants so
//! handler selection is a single match instead of string-prefix checks
//! scattered through the event handler. The constructors live here too,
//! keeping both directions of the encoding in one place.

use serenity::model::id::UserId;

/// A parsed component (button / select menu) custom id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComponentAction {
    /// `ticket_<category>` - panel button opening an intake form.
    OpenTicketForm { category: String },
    /// `close_confirm` - confirmed closing the current ticket.
    CloseConfirm,
    /// `close_cancel` - aborted closing.
    CloseCancel,
    /// `verify_user` - verification panel button.
    Verify,
    /// `paid_button_<bill>` - the owner confirms payment of a bill.
    ConfirmPayment { bill_id: String },
    /// `approve_payment_<user>_<bill>` - staff accepts a payment.
    ApprovePayment { owner: UserId, bill_id: String },
    /// `deny_payment_<user>_<bill>` - staff rejects a payment.
    DenyPayment { owner: UserId, bill_id: String },
    /// `select_contract` - template choice menu.
    SelectContract,
    /// `sign_contract_<file>` - opens the signature modal.
    SignContract { template: String },
}

impl ComponentAction {
    pub fn parse(custom_id: &str) -> Option<Self> {
        if let Some(category) = custom_id.strip_prefix("ticket_") {
            return Some(Self::OpenTicketForm {
                category: category.to_string(),
            });
        }
        if let Some(bill_id) = custom_id.strip_prefix("paid_button_") {
            return Some(Self::ConfirmPayment {
                bill_id: bill_id.to_string(),
            });
        }
        if let Some(rest) = custom_id.strip_prefix("approve_payment_") {
            let (owner, bill_id) = parse_owner_bill(rest)?;
            return Some(Self::ApprovePayment { owner, bill_id });
        }
        if let Some(rest) = custom_id.strip_prefix("deny_payment_") {
            let (owner, bill_id) = parse_owner_bill(rest)?;
            return Some(Self::DenyPayment { owner, bill_id });
        }
        if let Some(template) = custom_id.strip_prefix("sign_contract_") {
            return Some(Self::SignContract {
                template: template.to_string(),
            });
        }
        match custom_id {
            "close_confirm" => Some(Self::CloseConfirm),
            "close_cancel" => Some(Self::CloseCancel),
            "verify_user" => Some(Self::Verify),
            "select_contract" => Some(Self::SelectContract),
            _ => None,
        }
    }
}

/// A parsed modal custom id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModalAction {
    /// `modal_<category>` - ticket intake form submitted.
    TicketIntake { category: String },
    /// `modal_contract_sign_<file>` - signature form submitted.
    ContractSignature { template: String },
}

impl ModalAction {
    pub fn parse(custom_id: &str) -> Option<Self> {
        // The contract prefix embeds the generic modal prefix, so it has
        // to be peeled first.
        if let Some(template) = custom_id.strip_prefix("modal_contract_sign_") {
            return Some(Self::ContractSignature {
                template: template.to_string(),
            });
        }
        if let Some(category) = custom_id.strip_prefix("modal_") {
            return Some(Self::TicketIntake {
                category: category.to_string(),
            });
        }
        None
    }
}

// Custom id constructors, kept next to the parser.

pub fn ticket_button_id(category: &str) -> String {
    format!("ticket_{}", category)
}

pub fn ticket_modal_id(category: &str) -> String {
    format!("modal_{}", category)
}

pub fn paid_button_id(bill_id: &str) -> String {
    format!("paid_button_{}", bill_id)
}

pub fn approve_payment_id(owner: UserId, bill_id: &str) -> String {
    format!("approve_payment_{}_{}", owner.get(), bill_id)
}

pub fn deny_payment_id(owner: UserId, bill_id: &str) -> String {
    format!("deny_payment_{}_{}", owner.get(), bill_id)
}

pub fn sign_contract_id(template: &str) -> String {
    format!("sign_contract_{}", template)
}

pub fn contract_modal_id(template: &str) -> String {
    format!("modal_contract_sign_{}", template)
}

/// `<user>_<bill>` where the user id is numeric and the bill id carries
/// no underscores.
fn parse_owner_bill(rest: &str) -> Option<(UserId, String)> {
    let (owner, bill_id) = rest.split_once('_')?;
    let owner: u64 = owner.parse().ok()?;
    if owner == 0 || bill_id.is_empty() {
        return None;
    }
    Some((UserId::new(owner), bill_id.to_string()))
}
