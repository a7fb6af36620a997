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

//! Request-lifecycle reconciliation.
//!
//! A request's logical state transitions Sent → Fulfilled → Processed, and
//! each transition is detected purely by set membership of the request id in
//! the next stream. Given a complete event log, the three states partition
//! the Sent set: every Sent entry is exactly one of pending, ready to
//! process, or verified.

use std::collections::HashSet;

use alloy_primitives::B256;
use serde::{Deserialize, Serialize};

use crate::events::{FulfilledEvent, ProcessedEvent, SentEvent};

/// Which Sent entries count as the user's request timeline.
///
/// The underlying Sent/Fulfilled events carry no user field, so the two
/// interpretations found in the wild diverge; both are kept here behind an
/// explicit choice instead of being duplicated per call site.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconcileScope {
    /// Classify every Sent entry. This is the dashboard default. When the
    /// Sent stream is global across users, counts include other users'
    /// requests; acceptable for display, not for per-user accounting.
    #[default]
    AllSent,
    /// Restrict Sent to ids present in the user's Processed set. Strictly
    /// user-scoped, but blind to pending and ready items for a user who has
    /// never processed anything.
    ProcessedOnly,
}

/// Derived state of a single Sent entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    /// Sent, no fulfillment yet.
    Pending,
    /// Fulfilled, awaiting the user's on-chain finalization.
    ReadyToProcess,
    /// Finalized on-chain.
    Verified,
}

/// Sent but not yet fulfilled.
pub fn is_pending(request: &SentEvent, fulfilled_ids: &HashSet<B256>) -> bool {
    !fulfilled_ids.contains(&request.request_id)
}

/// Fulfilled but not yet processed.
pub fn is_ready_to_process(
    request: &SentEvent,
    fulfilled_ids: &HashSet<B256>,
    processed_ids: &HashSet<B256>,
) -> bool {
    fulfilled_ids.contains(&request.request_id) && !processed_ids.contains(&request.request_id)
}

/// Processed on-chain.
pub fn is_verified(request: &SentEvent, processed_ids: &HashSet<B256>) -> bool {
    processed_ids.contains(&request.request_id)
}

/// Classify one Sent entry against the fulfilled and processed id sets.
pub fn status_of(
    request: &SentEvent,
    fulfilled_ids: &HashSet<B256>,
    processed_ids: &HashSet<B256>,
) -> RequestStatus {
    if is_verified(request, processed_ids) {
        RequestStatus::Verified
    } else if is_ready_to_process(request, fulfilled_ids, processed_ids) {
        RequestStatus::ReadyToProcess
    } else {
        RequestStatus::Pending
    }
}

/// Reconciled view of the request pipeline for one snapshot.
///
/// Lists are ordered by descending block timestamp; the `latest_*` fields
/// are the most recent event of each stream, `None` when the stream is
/// empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestSummary {
    /// Sent entries in scope.
    pub total_requests: usize,
    /// All fulfillments observed in the snapshot.
    pub total_fulfillments: usize,
    /// All Processed entries in the snapshot (includes verification
    /// refreshes, so this can exceed `total_verified`).
    pub total_processed: usize,
    /// Sent entries in scope with a Processed record.
    pub total_verified: usize,
    /// Sent entries with no fulfillment yet, newest first.
    pub pending: Vec<SentEvent>,
    /// Sent entries fulfilled but not yet processed, newest first. These
    /// gate the dashboard's process action.
    pub ready_to_process: Vec<SentEvent>,
    /// Most recent Sent entry in scope.
    pub latest_sent: Option<SentEvent>,
    /// Most recent fulfillment.
    pub latest_fulfillment: Option<FulfilledEvent>,
    /// Most recent Processed entry.
    pub latest_processed: Option<ProcessedEvent>,
}

/// Reconcile one snapshot of the three event streams.
///
/// Pure and idempotent: the same three inputs always produce the same
/// summary. The caller owns freshness — after a successful process call the
/// snapshot must be refetched and reconciliation re-run.
pub fn reconcile(
    sent: &[SentEvent],
    fulfilled: &[FulfilledEvent],
    processed: &[ProcessedEvent],
    scope: ReconcileScope,
) -> RequestSummary {
    let fulfilled_ids: HashSet<B256> = fulfilled.iter().map(|e| e.request_id).collect();
    let processed_ids: HashSet<B256> = processed.iter().map(|e| e.request_id).collect();

    let mut in_scope: Vec<SentEvent> = match scope {
        ReconcileScope::AllSent => sent.to_vec(),
        ReconcileScope::ProcessedOnly => sent
            .iter()
            .filter(|e| processed_ids.contains(&e.request_id))
            .cloned()
            .collect(),
    };
    in_scope.sort_by(|a, b| b.block_timestamp.cmp(&a.block_timestamp));

    let mut pending = Vec::new();
    let mut ready_to_process = Vec::new();
    let mut total_verified = 0;
    for request in &in_scope {
        match status_of(request, &fulfilled_ids, &processed_ids) {
            RequestStatus::Pending => pending.push(request.clone()),
            RequestStatus::ReadyToProcess => ready_to_process.push(request.clone()),
            RequestStatus::Verified => total_verified += 1,
        }
    }

    let latest_fulfillment =
        fulfilled.iter().max_by_key(|e| e.block_timestamp).cloned();
    let latest_processed =
        processed.iter().max_by_key(|e| e.block_timestamp).cloned();

    RequestSummary {
        total_requests: in_scope.len(),
        total_fulfillments: fulfilled.len(),
        total_processed: processed.len(),
        total_verified,
        latest_sent: in_scope.first().cloned(),
        pending,
        ready_to_process,
        latest_fulfillment,
        latest_processed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{Address, B256};

    fn id(byte: u8) -> B256 {
        B256::repeat_byte(byte)
    }

    fn sent(byte: u8, ts: u64) -> SentEvent {
        SentEvent { request_id: id(byte), block_timestamp: ts, tx_hash: id(byte) }
    }

    fn fulfilled(byte: u8, ts: u64) -> FulfilledEvent {
        FulfilledEvent { request_id: id(byte), block_timestamp: ts, tx_hash: id(byte) }
    }

    fn processed(byte: u8, ts: u64) -> ProcessedEvent {
        ProcessedEvent {
            request_id: id(byte),
            block_timestamp: ts,
            tx_hash: id(byte),
            user: Address::repeat_byte(0x11),
            is_verification: false,
        }
    }

    #[test]
    fn partitions_sent_abc() {
        // Sent = {A, B, C}, Fulfilled = {A, B}, Processed = {A}.
        let sent_events = vec![sent(0xaa, 100), sent(0xbb, 200), sent(0xcc, 300)];
        let fulfilled_events = vec![fulfilled(0xaa, 150), fulfilled(0xbb, 250)];
        let processed_events = vec![processed(0xaa, 180)];

        let summary =
            reconcile(&sent_events, &fulfilled_events, &processed_events, ReconcileScope::AllSent);

        assert_eq!(summary.total_requests, 3);
        assert_eq!(summary.total_fulfillments, 2);
        assert_eq!(summary.total_processed, 1);
        assert_eq!(summary.total_verified, 1);
        assert_eq!(summary.pending, vec![sent(0xcc, 300)]);
        assert_eq!(summary.ready_to_process, vec![sent(0xbb, 200)]);

        // The three classes are disjoint and together cover Sent.
        let classified = summary.pending.len() + summary.ready_to_process.len()
            + summary.total_verified;
        assert_eq!(classified, sent_events.len());
    }

    #[test]
    fn everything_pending_when_downstream_streams_empty() {
        let sent_events = vec![sent(1, 10), sent(2, 20), sent(3, 30)];
        let summary = reconcile(&sent_events, &[], &[], ReconcileScope::AllSent);

        assert_eq!(summary.pending.len(), 3);
        assert!(summary.ready_to_process.is_empty());
        assert_eq!(summary.total_verified, 0);
        assert_eq!(summary.latest_fulfillment, None);
        assert_eq!(summary.latest_processed, None);
    }

    #[test]
    fn lists_are_newest_first_and_latest_fields_are_heads() {
        let sent_events = vec![sent(1, 10), sent(3, 30), sent(2, 20)];
        let summary = reconcile(&sent_events, &[], &[], ReconcileScope::AllSent);

        let timestamps: Vec<u64> =
            summary.pending.iter().map(|e| e.block_timestamp).collect();
        assert_eq!(timestamps, vec![30, 20, 10]);
        assert_eq!(summary.latest_sent, Some(sent(3, 30)));
    }

    #[test]
    fn processed_only_scope_sees_only_processed_history() {
        // B is fulfilled and ready, but the user has only ever processed A:
        // under ProcessedOnly the timeline shrinks to {A}.
        let sent_events = vec![sent(0xaa, 100), sent(0xbb, 200)];
        let fulfilled_events = vec![fulfilled(0xaa, 150), fulfilled(0xbb, 250)];
        let processed_events = vec![processed(0xaa, 180)];

        let summary = reconcile(
            &sent_events,
            &fulfilled_events,
            &processed_events,
            ReconcileScope::ProcessedOnly,
        );

        assert_eq!(summary.total_requests, 1);
        assert_eq!(summary.total_verified, 1);
        assert!(summary.pending.is_empty());
        assert!(summary.ready_to_process.is_empty());
    }

    #[test]
    fn reconcile_is_idempotent() {
        let sent_events = vec![sent(1, 10), sent(2, 20)];
        let fulfilled_events = vec![fulfilled(1, 15)];
        let processed_events = vec![processed(1, 18)];

        let first =
            reconcile(&sent_events, &fulfilled_events, &processed_events, ReconcileScope::AllSent);
        let second =
            reconcile(&sent_events, &fulfilled_events, &processed_events, ReconcileScope::AllSent);
        assert_eq!(first, second);
    }

    #[test]
    fn statuses_are_mutually_exclusive() {
        let fulfilled_ids: HashSet<B256> = [id(1), id(2)].into();
        let processed_ids: HashSet<B256> = [id(1)].into();

        for request in [sent(1, 10), sent(2, 20), sent(3, 30)] {
            let flags = [
                is_pending(&request, &fulfilled_ids),
                is_ready_to_process(&request, &fulfilled_ids, &processed_ids),
                is_verified(&request, &processed_ids),
            ];
            assert_eq!(flags.iter().filter(|f| **f).count(), 1, "{request:?}");
        }
    }

    #[test]
    fn verification_refreshes_inflate_processed_but_not_verified() {
        let sent_events = vec![sent(1, 10)];
        let fulfilled_events = vec![fulfilled(1, 15)];
        let mut refresh = processed(1, 40);
        refresh.is_verification = true;
        let processed_events = vec![processed(1, 18), refresh];

        let summary =
            reconcile(&sent_events, &fulfilled_events, &processed_events, ReconcileScope::AllSent);
        assert_eq!(summary.total_processed, 2);
        assert_eq!(summary.total_verified, 1);
        assert_eq!(summary.latest_processed.unwrap().block_timestamp, 40);
    }
}
