//! Balance view-model.
//!
//! Holds exactly what the balance elements display. A failed fetch leaves
//! both texts as they were.

use chrono::{DateTime, Utc};
use tracing::error;

use crate::api::ApiError;
use crate::editor::ElementId;
use crate::models::Balance;
use crate::utils::format_rupees;

/// Text for the `user-balance` element
pub fn format_balance(balance: f64) -> String {
    format!("Balance: {}", format_rupees(balance))
}

/// Text for the `total-earnings` element
pub fn format_earnings(ad_revenue: f64) -> String {
    format!("Earned: {}", format_rupees(ad_revenue))
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BalanceView {
    /// `None` until the first successful fetch
    pub balance_text: Option<String>,
    pub earnings_text: Option<String>,
    pub fetched_at: Option<DateTime<Utc>>,
}

impl BalanceView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render a fetched snapshot into both elements
    pub fn show(&mut self, balance: &Balance) {
        self.balance_text = Some(format_balance(balance.balance));
        self.earnings_text = Some(format_earnings(balance.ad_revenue));
        self.fetched_at = Some(Utc::now());
    }

    /// Apply a fetch outcome. Failures are logged and otherwise ignored.
    pub fn apply(&mut self, outcome: &Result<Balance, ApiError>) {
        match outcome {
            Ok(balance) => self.show(balance),
            Err(e) => error!(error = %e, "Error fetching balance"),
        }
    }

    /// Current text content of a display element
    pub fn text_of(&self, element: ElementId) -> Option<&str> {
        match element {
            ElementId::UserBalance => self.balance_text.as_deref(),
            ElementId::TotalEarnings => self.earnings_text.as_deref(),
            _ => None,
        }
    }
}
