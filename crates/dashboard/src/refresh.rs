// Copyright 2026 Constellation Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Explicit refetch signalling.
//!
//! Anything that needs a dashboard refetch sends a [`RefreshReason`] through
//! a [`RefreshHandle`]; the service's run loop is the subscriber. This is an
//! injected bus with typed reasons, not an ambient global.

use tokio::sync::broadcast;

/// Why a refetch was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshReason {
    /// A wallet was connected or switched.
    WalletChanged,
    /// A process call succeeded and the event log should have caught up.
    RequestProcessed,
    /// Caller-initiated refresh.
    Manual,
}

/// Broadcast bus for refetch signals.
#[derive(Debug)]
pub struct RefreshBus {
    tx: broadcast::Sender<RefreshReason>,
}

impl RefreshBus {
    /// Create a bus retaining up to `capacity` undelivered signals.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// A cloneable trigger for this bus.
    pub fn handle(&self) -> RefreshHandle {
        RefreshHandle { tx: self.tx.clone() }
    }

    /// Subscribe to refresh signals.
    pub fn subscribe(&self) -> broadcast::Receiver<RefreshReason> {
        self.tx.subscribe()
    }
}

impl Default for RefreshBus {
    fn default() -> Self {
        Self::new(16)
    }
}

/// Cloneable trigger handed to components that may request a refetch.
#[derive(Debug, Clone)]
pub struct RefreshHandle {
    tx: broadcast::Sender<RefreshReason>,
}

impl RefreshHandle {
    /// Signal a refetch. A signal with no live subscriber is dropped.
    pub fn trigger(&self, reason: RefreshReason) {
        if self.tx.send(reason).is_err() {
            tracing::debug!(?reason, "refresh signal dropped, no subscribers");
        }
    }
}
