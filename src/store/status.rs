//! Bill status state machine.
//!
//! Earlier revisions wrote bill statuses unconditionally from whichever
//! handler fired, which let an approval land on a bill that was never
//! confirmed. All status changes now go through [`BillStatus::apply`],
//! which validates the predecessor state.

use std::fmt;

use crate::common::error::StoreError;
use crate::store::types::BillStatus;

/// The three actions that move a bill between states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BillAction {
    /// The owning user reports the bill as paid (button or DM keyword).
    ConfirmPayment,
    /// An administrator accepts the payment.
    Approve,
    /// An administrator rejects the payment.
    Deny,
}

impl fmt::Display for BillAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ConfirmPayment => "confirm payment on",
            Self::Approve => "approve",
            Self::Deny => "deny",
        };
        f.write_str(name)
    }
}

impl BillStatus {
    /// Apply an action, returning the successor state.
    ///
    /// Re-confirming a rejected bill is allowed (the user may retry
    /// payment), and replaying an administrator decision on a bill that
    /// already carries it is a no-op rather than an error.
    pub fn apply(self, action: BillAction) -> Result<BillStatus, StoreError> {
        use BillAction::*;
        use BillStatus::*;

        match (self, action) {
            (Pending | Overdue | Rejected, ConfirmPayment) => Ok(Reviewing),
            (Reviewing, Approve) => Ok(Paid),
            (Paid, Approve) => Ok(Paid),
            (Reviewing, Deny) => Ok(Rejected),
            (Rejected, Deny) => Ok(Rejected),
            (from, action) => Err(StoreError::InvalidTransition { from, action }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confirm_from_actionable_states() {
        for from in [BillStatus::Pending, BillStatus::Overdue, BillStatus::Rejected] {
            assert_eq!(
                from.apply(BillAction::ConfirmPayment).unwrap(),
                BillStatus::Reviewing
            );
        }
    }

    #[test]
    fn confirm_while_reviewing_is_rejected() {
        let err = BillStatus::Reviewing
            .apply(BillAction::ConfirmPayment)
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::InvalidTransition {
                from: BillStatus::Reviewing,
                action: BillAction::ConfirmPayment
            }
        ));
    }

    #[test]
    fn confirm_on_paid_bill_is_rejected() {
        assert!(BillStatus::Paid.apply(BillAction::ConfirmPayment).is_err());
    }

    #[test]
    fn approve_is_idempotent() {
        let paid = BillStatus::Reviewing.apply(BillAction::Approve).unwrap();
        assert_eq!(paid, BillStatus::Paid);
        assert_eq!(paid.apply(BillAction::Approve).unwrap(), BillStatus::Paid);
    }

    #[test]
    fn deny_then_reconfirm_reopens() {
        let rejected = BillStatus::Reviewing.apply(BillAction::Deny).unwrap();
        assert_eq!(rejected, BillStatus::Rejected);
        assert_eq!(
            rejected.apply(BillAction::ConfirmPayment).unwrap(),
            BillStatus::Reviewing
        );
    }

    #[test]
    fn approve_requires_review() {
        assert!(BillStatus::Pending.apply(BillAction::Approve).is_err());
        assert!(BillStatus::Rejected.apply(BillAction::Approve).is_err());
        assert!(BillStatus::Pending.apply(BillAction::Deny).is_err());
        assert!(BillStatus::Paid.apply(BillAction::Deny).is_err());
    }
}
