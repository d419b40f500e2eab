// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Per-recipient send history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Send history of one recipient over the trailing 24 hours.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailHistory {
    /// Recipient address
    pub email: String,
    /// Sends counted against the quota; unordered
    pub sent_timestamps_24h: Vec<DateTime<Utc>>,
    /// Whether the limit warning went out during the current over-limit streak
    pub limit_warning_sent: bool,
}

impl EmailHistory {
    /// Empty history for a recipient the store has never seen.
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            sent_timestamps_24h: Vec::new(),
            limit_warning_sent: false,
        }
    }

    pub fn sent_count(&self) -> usize {
        self.sent_timestamps_24h.len()
    }

    /// Compares the raw stored count against `threshold`.
    ///
    /// Timestamps are not filtered by age here; the store owns windowing.
    pub fn is_over_limit(&self, threshold: u32) -> bool {
        self.sent_count() >= threshold as usize
    }

    /// Drop timestamps at or before `cutoff`. Returns how many were removed.
    pub fn retain_since(&mut self, cutoff: DateTime<Utc>) -> usize {
        let before = self.sent_timestamps_24h.len();
        self.sent_timestamps_24h.retain(|t| *t > cutoff);
        before - self.sent_timestamps_24h.len()
    }
}
