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

//! Pure computation core for the Constellation delegation-rewards dApp:
//! tier classification for staked amounts and reconciliation of the
//! Sent → Fulfilled → Processed verification-request pipeline.
//!
//! Nothing in this crate performs I/O. Event lists arrive from the subgraph
//! (via `constellation-client`) and stake amounts from the delegation
//! verifier; everything here is derived fresh from those inputs.

pub mod events;
pub mod reconcile;
pub mod tiers;

pub use events::{FulfilledEvent, ProcessedEvent, SentEvent};
pub use reconcile::{reconcile, ReconcileScope, RequestStatus, RequestSummary};
pub use tiers::{
    format_amount, qualifies_for_tier, tier_for_amount, tier_progress, Tier, TierError,
    TierProgress,
};
