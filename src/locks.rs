// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Keyed async mutex serializing sends per recipient.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Lock table keyed by recipient address.
#[derive(Debug, Default)]
pub struct RecipientLocks {
    locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

/// Guards held for the duration of one send.
#[derive(Debug)]
pub struct RecipientGuards {
    _guards: Vec<OwnedMutexGuard<()>>,
}

impl RecipientLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock every distinct recipient.
    ///
    /// Keys are locked in sorted order so two overlapping batches cannot
    /// deadlock.
    pub async fn acquire(&self, recipients: &[String]) -> RecipientGuards {
        let keys: BTreeSet<&str> = recipients.iter().map(String::as_str).collect();

        let mutexes: Vec<Arc<AsyncMutex<()>>> = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            keys.into_iter()
                .map(|key| locks.entry(key.to_string()).or_default().clone())
                .collect()
        };

        let mut guards = Vec::with_capacity(mutexes.len());
        for mutex in mutexes {
            guards.push(mutex.lock_owned().await);
        }
        RecipientGuards { _guards: guards }
    }

    /// Drop entries nobody currently holds or waits on.
    pub fn cleanup(&self) {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        locks.retain(|_, mutex| Arc::strong_count(mutex) > 1);
    }

    pub fn len(&self) -> usize {
        self.locks.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
