//! Shared embed and component builders.
//!
//! Anything sent from more than one handler lives here: the payment
//! confirmation button travels with `/bill create`, the daily reminder,
//! and the DM "done" shortcut, and the staff review message follows every
//! payment confirmation.

use serenity::all::{
    ButtonStyle, CreateActionRow, CreateButton, CreateEmbed, CreateEmbedFooter, Timestamp, UserId,
};

use crate::config::types::parse_color;
use crate::discord::dispatch;
use crate::store::types::Bill;

/// Firm gold, the default accent for billing embeds.
pub const GOLD: u32 = 0xD4AF37;
/// Confirmation green.
pub const GREEN: u32 = 0x57F287;
/// Blurple, used for transcripts and verification.
pub const BLURPLE: u32 = 0x5865F2;
/// Warning yellow for the close confirmation.
pub const YELLOW: u32 = 0xFEE75C;

/// Resolve a configured "#RRGGBB" string, falling back to `default`.
pub fn color_or(value: Option<&str>, default: u32) -> u32 {
    value.and_then(parse_color).unwrap_or(default)
}

/// The "Paid" button the bill owner presses to confirm payment.
pub fn paid_row(bill_id: &str) -> CreateActionRow {
    CreateActionRow::Buttons(vec![CreateButton::new(dispatch::paid_button_id(bill_id))
        .label("Paid")
        .style(ButtonStyle::Success)])
}

/// DM embed carrying the payment confirmation button.
pub fn payment_request_embed(bill: &Bill) -> CreateEmbed {
    CreateEmbed::new()
        .title("💳 Payment Reminder")
        .description(format!(
            "Hello! This is a reminder regarding your outstanding bill from {}.\n\n\
             Please press the button below once you have completed the payment.",
            bill.due_date
        ))
        .color(GOLD)
        .timestamp(Timestamp::now())
}

/// Ephemeral acknowledgment after the owner confirms payment.
pub fn payment_recorded_embed() -> CreateEmbed {
    CreateEmbed::new()
        .title("Payment Recorded")
        .description(
            "Hello! Your payment has been recorded and sent to our staff team for \
             review and verification. Please type /bill view to see the status of your bill.",
        )
        .color(GREEN)
        .timestamp(Timestamp::now())
}

/// Staff review embed posted with the approve/deny buttons.
pub fn payment_review_embed(owner: UserId, bill: &Bill) -> CreateEmbed {
    CreateEmbed::new()
        .title("💰 Payment for Review")
        .description(format!(
            "<@{}> paid their bill of {}\n**Bill ID:** {}",
            owner.get(),
            bill.amount,
            bill.id
        ))
        .color(GOLD)
        .timestamp(Timestamp::now())
}

/// Approve/deny buttons for a payment under review.
pub fn payment_review_row(owner: UserId, bill_id: &str) -> CreateActionRow {
    CreateActionRow::Buttons(vec![
        CreateButton::new(dispatch::approve_payment_id(owner, bill_id))
            .label("Approve")
            .style(ButtonStyle::Success),
        CreateButton::new(dispatch::deny_payment_id(owner, bill_id))
            .label("Deny")
            .style(ButtonStyle::Danger),
    ])
}

/// Replacement row after a review decision, both buttons disabled.
pub fn payment_decided_row() -> CreateActionRow {
    CreateActionRow::Buttons(vec![
        CreateButton::new("approved")
            .label("Approved")
            .style(ButtonStyle::Success)
            .disabled(true),
        CreateButton::new("denied")
            .label("Denied")
            .style(ButtonStyle::Danger)
            .disabled(true),
    ])
}

/// Per-user bill listing for `/bill view` and `/bill admin`.
pub fn bills_embed(title: &str, bills: &[Bill], include_ids: bool) -> CreateEmbed {
    let mut description = String::new();
    for (index, bill) in bills.iter().enumerate() {
        description.push_str(&format!(
            "**Bill #{}**\nStatus: {}\nAmount: {}\nType: {}\nDate: {}\n",
            index + 1,
            bill.status,
            bill.amount,
            bill.recurrence,
            bill.due_date
        ));
        if include_ids {
            description.push_str(&format!("ID: {}\n", bill.id));
        }
        description.push('\n');
    }
    CreateEmbed::new()
        .title(title.to_string())
        .description(description)
        .color(GOLD)
        .timestamp(Timestamp::now())
}

/// Footer used across firm embeds.
pub fn firm_footer(firm_name: &str) -> CreateEmbedFooter {
    CreateEmbedFooter::new(firm_name.to_string())
}
