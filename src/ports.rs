// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Collaborator interfaces the limiter depends on.
//!
//! Concrete adapters live in [`crate::mailer`], [`crate::store`] and
//! [`crate::clock`]; production deployments supply their own transport and
//! database-backed store.

use crate::error::{MailerError, StoreError};
use crate::history::EmailHistory;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt::Debug;

/// Outbound mail transport.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Whether the transport is configured to send at all.
    fn is_enabled(&self) -> bool;

    /// Deliver one message to all `recipients`.
    ///
    /// An error means the whole call failed; partial per-recipient failure
    /// is not reported.
    async fn send_to(
        &self,
        subject: &str,
        body: &str,
        recipients: &[String],
    ) -> Result<(), MailerError>;
}

/// Shared store of per-recipient send histories.
///
/// # Atomicity
///
/// The limiter reads histories, decides, then writes them back. Two
/// overlapping `send_to` calls for the same recipient decide from the same
/// read, so `EmailLimiter` serializes them per recipient by default.
/// Stores shared by several limiter instances should merge refreshes (or
/// compare-and-set) rather than overwrite, so no recorded send is lost.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Return existing histories for `recipients`.
    ///
    /// Recipients without history are omitted, not returned as empty records.
    async fn fetch_histories(
        &self,
        recipients: &[String],
    ) -> Result<Vec<EmailHistory>, StoreError>;

    /// Upsert every record in `records`.
    ///
    /// `warning_just_sent` marks a batch of recipients that just crossed into
    /// the warned state. It is for bookkeeping only: the records already carry
    /// every field to write.
    async fn refresh_histories(
        &self,
        records: &[EmailHistory],
        warning_just_sent: bool,
    ) -> Result<(), StoreError>;
}

/// Port for obtaining the current wall-clock time.
pub trait Clock: Send + Sync + Debug {
    fn now(&self) -> DateTime<Utc>;
}
