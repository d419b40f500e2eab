// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Email Send Limiter
//!
//! Admission control in front of an outbound mail transport:
//!
//! - Per-recipient quota over a rolling 24h window (100 sends default)
//! - One limit warning per over-quota streak, then silence
//! - One mailer call per cohort (deliver, warn) per send
//! - Send history and warning flags persisted to a shared store
//!
//! The transport and the store are ports ([`Mailer`], [`HistoryStore`]);
//! [`MemoryHistoryStore`] and the adapters in [`mailer`] cover tests and
//! single-process deployments.

pub mod clock;
pub mod cohort;
pub mod config;
pub mod error;
pub mod history;
pub mod limiter;
pub mod locks;
pub mod mailer;
pub mod metrics;
pub mod ports;
pub mod store;
pub mod telemetry;

pub use config::Config;
pub use error::{LimiterError, MailerError, StoreError};
pub use history::EmailHistory;
pub use limiter::EmailLimiter;
pub use ports::{Clock, HistoryStore, Mailer};
pub use store::MemoryHistoryStore;
