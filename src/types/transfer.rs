//! Transfer request types
//!
//! A `TransferRequest` is constructed per call and never persisted by the
//! coordinator. Only its `request_id` outlives the call, as an idempotency
//! record in the idempotency store.

use super::account::AccountId;
use rust_decimal::Decimal;
use std::fmt;

/// Client-supplied deduplication token
pub type RequestId = String;

/// A request to move `amount` from one account to another
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    /// Account to debit
    pub from: AccountId,

    /// Account to credit (must differ from `from`)
    pub to: AccountId,

    /// Amount to move (must be strictly positive)
    ///
    /// Kept signed so that zero and negative amounts reach validation and are
    /// rejected there rather than at parse time.
    pub amount: Decimal,

    /// Idempotency key for this logical transfer
    pub request_id: RequestId,
}

impl TransferRequest {
    pub fn new(
        from: AccountId,
        to: AccountId,
        amount: Decimal,
        request_id: impl Into<RequestId>,
    ) -> Self {
        Self {
            from,
            to,
            amount,
            request_id: request_id.into(),
        }
    }
}

/// Which side of a transfer an account is on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountSide {
    /// The debited account
    Source,
    /// The credited account
    Destination,
}

impl fmt::Display for AccountSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountSide::Source => write!(f, "source"),
            AccountSide::Destination => write!(f, "destination"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_accepts_str_request_id() {
        let req = TransferRequest::new(1, 2, Decimal::TEN, "r1");
        assert_eq!(req.request_id, "r1");
        assert_eq!(req.from, 1);
        assert_eq!(req.to, 2);
        assert_eq!(req.amount, Decimal::TEN);
    }

    #[test]
    fn test_account_side_display() {
        assert_eq!(AccountSide::Source.to_string(), "source");
        assert_eq!(AccountSide::Destination.to_string(), "destination");
    }
}
