// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! Clock that never returns the same instant twice.

use chrono::{DateTime, Duration, Utc};
use email_send_limiter::Clock;
use std::sync::atomic::{AtomicI64, Ordering};

#[derive(Debug)]
pub struct TickingClock {
    start: DateTime<Utc>,
    ticks: AtomicI64,
}

impl TickingClock {
    pub fn new() -> Self {
        Self {
            start: Utc::now(),
            ticks: AtomicI64::new(0),
        }
    }
}

impl Clock for TickingClock {
    fn now(&self) -> DateTime<Utc> {
        let tick = self.ticks.fetch_add(1, Ordering::SeqCst);
        self.start + Duration::microseconds(tick)
    }
}
