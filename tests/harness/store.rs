// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! Scripted history store.
//!
//! Returns a fixed set of histories from every fetch (filtered to the
//! requested recipients) and records refresh calls without applying them.

use async_trait::async_trait;
use email_send_limiter::{EmailHistory, HistoryStore, StoreError};
use std::sync::Mutex;

/// One recorded `refresh_histories` call.
#[derive(Debug, Clone, PartialEq)]
pub struct Refresh {
    pub records: Vec<EmailHistory>,
    pub warning_just_sent: bool,
}

#[derive(Debug, Default)]
pub struct ScriptedStore {
    existing: Vec<EmailHistory>,
    fail_fetch: bool,
    /// Refresh calls with this flag value fail
    fail_refresh: Option<bool>,
    fetches: Mutex<Vec<Vec<String>>>,
    refreshes: Mutex<Vec<Refresh>>,
}

impl ScriptedStore {
    pub fn with_histories(existing: Vec<EmailHistory>) -> Self {
        Self {
            existing,
            ..Self::default()
        }
    }

    pub fn failing_fetch() -> Self {
        Self {
            fail_fetch: true,
            ..Self::default()
        }
    }

    pub fn failing_refresh(mut self, warning_just_sent: bool) -> Self {
        self.fail_refresh = Some(warning_just_sent);
        self
    }

    pub fn fetches(&self) -> Vec<Vec<String>> {
        self.fetches.lock().unwrap().clone()
    }

    pub fn refreshes(&self) -> Vec<Refresh> {
        self.refreshes.lock().unwrap().clone()
    }

    pub fn refresh_with_flag(&self, warning_just_sent: bool) -> Option<Refresh> {
        self.refreshes()
            .into_iter()
            .find(|r| r.warning_just_sent == warning_just_sent)
    }
}

#[async_trait]
impl HistoryStore for ScriptedStore {
    async fn fetch_histories(
        &self,
        recipients: &[String],
    ) -> Result<Vec<EmailHistory>, StoreError> {
        self.fetches.lock().unwrap().push(recipients.to_vec());
        if self.fail_fetch {
            return Err(StoreError::Unavailable("connection refused".to_string()));
        }
        Ok(self
            .existing
            .iter()
            .filter(|h| recipients.contains(&h.email))
            .cloned()
            .collect())
    }

    async fn refresh_histories(
        &self,
        records: &[EmailHistory],
        warning_just_sent: bool,
    ) -> Result<(), StoreError> {
        self.refreshes.lock().unwrap().push(Refresh {
            records: records.to_vec(),
            warning_just_sent,
        });
        if self.fail_refresh == Some(warning_just_sent) {
            return Err(StoreError::Other(anyhow::anyhow!("deadlock detected")));
        }
        Ok(())
    }
}
