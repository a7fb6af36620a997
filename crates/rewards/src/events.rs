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

//! Verification-request events as indexed by the subgraph.
//!
//! The three streams share an opaque request id as their only correlation
//! key; no event carries an explicit status field. Records are immutable and
//! append-only — the reconciler only derives classifications from their
//! presence, it never mutates them.

use alloy_primitives::{Address, B256};
use serde::{Deserialize, Serialize};

/// A verification request was issued on-chain.
///
/// The underlying event carries no user field; attribution happens through
/// the Processed stream (see [`crate::reconcile::ReconcileScope`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentEvent {
    /// Correlation key shared across all three streams.
    pub request_id: B256,
    /// Block timestamp, unix seconds.
    pub block_timestamp: u64,
    /// Transaction that emitted the event.
    pub tx_hash: B256,
}

/// The oracle network returned a result for a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FulfilledEvent {
    /// Correlation key shared across all three streams.
    pub request_id: B256,
    /// Block timestamp, unix seconds.
    pub block_timestamp: u64,
    /// Transaction that emitted the event.
    pub tx_hash: B256,
}

/// A user finalized a fulfilled request on-chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessedEvent {
    /// Correlation key shared across all three streams.
    pub request_id: B256,
    /// Block timestamp, unix seconds.
    pub block_timestamp: u64,
    /// Transaction that emitted the event.
    pub tx_hash: B256,
    /// The acting user.
    pub user: Address,
    /// `false` for the initial registration, `true` for a verification
    /// refresh.
    pub is_verification: bool,
}
