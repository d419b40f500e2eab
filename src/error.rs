// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Error types for the limiter and its collaborators.

use crate::cohort::Cohort;
use thiserror::Error;

/// Failure reported by a [`Mailer`](crate::ports::Mailer).
#[derive(Debug, Error)]
pub enum MailerError {
    #[error("Mailer is disabled")]
    Disabled,

    #[error("Delivery rejected: {0}")]
    Rejected(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Failure reported by a [`HistoryStore`](crate::ports::HistoryStore).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("History store unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Error returned by [`EmailLimiter::send_to`](crate::limiter::EmailLimiter::send_to).
#[derive(Debug, Error)]
pub enum LimiterError {
    #[error("No recipients given")]
    NoRecipients,

    #[error("Fetching email histories failed: {0}")]
    Fetch(#[source] StoreError),

    #[error("Sending to {cohort} cohort failed: {source}")]
    Deliver {
        cohort: Cohort,
        #[source]
        source: MailerError,
    },

    #[error("Refreshing {cohort} cohort histories failed: {source}")]
    Persist {
        cohort: Cohort,
        #[source]
        source: StoreError,
    },
}

/// Coarse classification of a [`LimiterError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Caller passed invalid arguments
    Input,
    /// Nothing was sent
    Fetch,
    /// A cohort could not be delivered
    Deliver,
    /// Mail may have gone out but history was not recorded
    Persist,
}

impl LimiterError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NoRecipients => ErrorKind::Input,
            Self::Fetch(_) => ErrorKind::Fetch,
            Self::Deliver { .. } => ErrorKind::Deliver,
            Self::Persist { .. } => ErrorKind::Persist,
        }
    }

    /// Whether re-running the whole `send_to` is a sensible reaction.
    ///
    /// Already-warned recipients are suppressed on the rerun, so retrying
    /// never duplicates a warning.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::NoRecipients => false,
            Self::Fetch(_) | Self::Persist { .. } => true,
            Self::Deliver { source, .. } => !matches!(source, MailerError::Disabled),
        }
    }

    /// Cohort the failure belongs to, if it happened after partitioning.
    pub fn cohort(&self) -> Option<Cohort> {
        match self {
            Self::Deliver { cohort, .. } | Self::Persist { cohort, .. } => Some(*cohort),
            Self::NoRecipients | Self::Fetch(_) => None,
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, LimiterError>;
