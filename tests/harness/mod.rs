// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! Test doubles for the limiter's collaborators.
//!
//! Both doubles record every call so tests can assert on exactly which
//! recipients were mailed and which records were written.

#![allow(dead_code)]

pub mod clock;
pub mod mailer;
pub mod store;

use chrono::Utc;
use email_send_limiter::EmailHistory;

pub fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

/// History with `sends` timestamps at the current time.
pub fn history(email: &str, sends: usize, warned: bool) -> EmailHistory {
    EmailHistory {
        email: email.to_string(),
        sent_timestamps_24h: vec![Utc::now(); sends],
        limit_warning_sent: warned,
    }
}
