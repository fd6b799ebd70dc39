use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use super::line_total;

pub type TransactionId = i64;

/// Text layout of `created_at`, both in the store and in exports.
pub const CREATED_AT_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Labels written by the earlier mobile app for the two statuses.
const LEGACY_UNPAID: &str = "未结清";
const LEGACY_PAID: &str = "已结清";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentStatus {
    /// Customer still owes the total
    #[default]
    Unpaid,
    /// Customer has settled the total
    Paid,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Unpaid => "Unpaid",
            PaymentStatus::Paid => "Paid",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim() {
            LEGACY_UNPAID => return Some(PaymentStatus::Unpaid),
            LEGACY_PAID => return Some(PaymentStatus::Paid),
            _ => {}
        }
        match s.trim().to_lowercase().as_str() {
            "unpaid" => Some(PaymentStatus::Unpaid),
            "paid" => Some(PaymentStatus::Paid),
            _ => None,
        }
    }

    /// Read a nullable stored status. Anything other than a paid label,
    /// including a missing status, counts as unpaid.
    pub fn from_stored(s: Option<&str>) -> Self {
        s.and_then(Self::from_str).unwrap_or_default()
    }

    /// The only transition: Unpaid <-> Paid.
    pub fn toggled(self) -> Self {
        match self {
            PaymentStatus::Unpaid => PaymentStatus::Paid,
            PaymentStatus::Paid => PaymentStatus::Unpaid,
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One sale in the ledger.
/// Name, weight, prices and creation time never change once stored; only the
/// payment status moves. A mis-entry is corrected by deleting and re-adding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Assigned by the store, never reused
    pub id: TransactionId,
    pub customer_name: String,
    /// Weight sold, in jin
    pub weight: f64,
    /// Price per jin at the time of sale
    pub unit_price: f64,
    /// `weight * unit_price` rounded to cents, frozen at creation
    pub total_price: f64,
    pub created_at: NaiveDateTime,
    pub status: PaymentStatus,
}

impl Transaction {
    /// Create a new unpaid sale. The id must be assigned by the repository.
    pub fn new(
        customer_name: impl Into<String>,
        weight: f64,
        unit_price: f64,
        created_at: NaiveDateTime,
    ) -> Self {
        Self {
            id: 0, // Will be set by repository
            customer_name: customer_name.into(),
            weight,
            unit_price,
            total_price: line_total(weight, unit_price),
            created_at: truncate_to_minute(created_at),
            status: PaymentStatus::Unpaid,
        }
    }

    pub fn created_at_text(&self) -> String {
        self.created_at.format(CREATED_AT_FORMAT).to_string()
    }
}

/// Parse a stored `created_at` value.
pub fn parse_created_at(s: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(s.trim(), CREATED_AT_FORMAT)
}

fn truncate_to_minute(dt: NaiveDateTime) -> NaiveDateTime {
    dt.with_second(0)
        .and_then(|dt| dt.with_nanosecond(0))
        .unwrap_or(dt)
}
