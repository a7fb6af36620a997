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

//! Client for the verification-request subgraph.
//!
//! The subgraph exposes three flat streams — RequestSent, RequestFulfilled
//! and RequestProcessed — correlated only by the `internal_id` request key.
//! Numeric and byte fields arrive as strings and are parsed into typed form
//! here, at the boundary; downstream code never sees raw rows.

use alloy_primitives::{Address, B256};
use constellation_rewards::{
    events::{FulfilledEvent, ProcessedEvent, SentEvent},
    reconcile::{reconcile, ReconcileScope, RequestSummary},
};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::json;
use url::Url;

use crate::ClientError;

/// Rows fetched per query. Each stream is paged until a short page so the
/// reconciler always sees the full event log, not a truncated window.
const PAGE_SIZE: usize = 1000;

const SENT_QUERY: &str = r#"query ($first: Int!, $skip: Int!) {
  requestSents(orderBy: blockTimestamp, orderDirection: desc, first: $first, skip: $skip) {
    id internal_id blockTimestamp transactionHash
  }
}"#;

const FULFILLED_QUERY: &str = r#"query ($first: Int!, $skip: Int!) {
  requestFulfilleds(orderBy: blockTimestamp, orderDirection: desc, first: $first, skip: $skip) {
    id internal_id blockTimestamp transactionHash
  }
}"#;

const PROCESSED_QUERY: &str = r#"query ($user: Bytes!, $first: Int!, $skip: Int!) {
  requestProcesseds(where: { user: $user }, orderBy: blockTimestamp, orderDirection: desc, first: $first, skip: $skip) {
    id internal_id blockTimestamp transactionHash user isVerification
  }
}"#;

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    errors: Option<Vec<GraphQlError>>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct SentData {
    #[serde(rename = "requestSents")]
    rows: Vec<RawRequestRow>,
}

#[derive(Debug, Deserialize)]
struct FulfilledData {
    #[serde(rename = "requestFulfilleds")]
    rows: Vec<RawRequestRow>,
}

#[derive(Debug, Deserialize)]
struct ProcessedData {
    #[serde(rename = "requestProcesseds")]
    rows: Vec<RawProcessedRow>,
}

// Wire rows: everything is a string until proven otherwise.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRequestRow {
    #[serde(rename = "internal_id")]
    internal_id: String,
    block_timestamp: String,
    transaction_hash: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawProcessedRow {
    #[serde(rename = "internal_id")]
    internal_id: String,
    block_timestamp: String,
    transaction_hash: String,
    user: String,
    is_verification: bool,
}

fn parse_b256(field: &'static str, value: &str) -> Result<B256, ClientError> {
    value
        .parse()
        .map_err(|_| ClientError::MalformedField { field, value: value.to_string() })
}

fn parse_address(field: &'static str, value: &str) -> Result<Address, ClientError> {
    value
        .parse()
        .map_err(|_| ClientError::MalformedField { field, value: value.to_string() })
}

fn parse_timestamp(value: &str) -> Result<u64, ClientError> {
    value
        .parse()
        .map_err(|_| ClientError::MalformedField {
            field: "blockTimestamp",
            value: value.to_string(),
        })
}

impl RawRequestRow {
    fn into_sent(self) -> Result<SentEvent, ClientError> {
        Ok(SentEvent {
            request_id: parse_b256("internal_id", &self.internal_id)?,
            block_timestamp: parse_timestamp(&self.block_timestamp)?,
            tx_hash: parse_b256("transactionHash", &self.transaction_hash)?,
        })
    }

    fn into_fulfilled(self) -> Result<FulfilledEvent, ClientError> {
        Ok(FulfilledEvent {
            request_id: parse_b256("internal_id", &self.internal_id)?,
            block_timestamp: parse_timestamp(&self.block_timestamp)?,
            tx_hash: parse_b256("transactionHash", &self.transaction_hash)?,
        })
    }
}

impl RawProcessedRow {
    fn into_processed(self) -> Result<ProcessedEvent, ClientError> {
        Ok(ProcessedEvent {
            request_id: parse_b256("internal_id", &self.internal_id)?,
            block_timestamp: parse_timestamp(&self.block_timestamp)?,
            tx_hash: parse_b256("transactionHash", &self.transaction_hash)?,
            user: parse_address("user", &self.user)?,
            is_verification: self.is_verification,
        })
    }
}

/// One consistent fetch of all three event streams, tagged with the address
/// it was fetched for.
///
/// The tag is what makes stale-result discarding possible: a snapshot for a
/// previously connected wallet must never be applied to the current one.
#[derive(Debug, Clone)]
pub struct EventSnapshot {
    /// The user the Processed stream was scoped to.
    pub user: Address,
    /// RequestSent stream.
    pub sent: Vec<SentEvent>,
    /// RequestFulfilled stream.
    pub fulfilled: Vec<FulfilledEvent>,
    /// RequestProcessed stream, scoped to `user`.
    pub processed: Vec<ProcessedEvent>,
}

impl EventSnapshot {
    /// Reconcile this snapshot into a request summary.
    pub fn reconcile(&self, scope: ReconcileScope) -> RequestSummary {
        reconcile(&self.sent, &self.fulfilled, &self.processed, scope)
    }
}

/// Client for the verification-request subgraph.
#[derive(Debug, Clone)]
pub struct SubgraphClient {
    client: reqwest::Client,
    endpoint: Url,
}

impl SubgraphClient {
    /// Create a client against an explicit subgraph endpoint.
    pub fn new(endpoint: Url) -> Result<Self, ClientError> {
        Ok(Self { client: crate::default_http_client()?, endpoint })
    }

    async fn query<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<T, ClientError> {
        tracing::debug!(endpoint = %self.endpoint, "querying subgraph");
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(%status, "subgraph returned an error status");
            return Err(ClientError::Api { status, error: body, message: None });
        }

        let envelope: GraphQlResponse<T> = response.json().await?;
        if let Some(errors) = envelope.errors {
            let messages: Vec<String> = errors.into_iter().map(|e| e.message).collect();
            tracing::warn!(?messages, "subgraph returned graphql errors");
            return Err(ClientError::Graphql { messages });
        }
        envelope.data.ok_or(ClientError::Graphql {
            messages: vec!["response contained neither data nor errors".to_string()],
        })
    }

    /// Fetch the full RequestSent stream, paging until a short page.
    pub async fn fetch_sent(&self) -> Result<Vec<SentEvent>, ClientError> {
        let mut events = Vec::new();
        let mut skip = 0;
        loop {
            let data: SentData =
                self.query(SENT_QUERY, json!({ "first": PAGE_SIZE, "skip": skip })).await?;
            let page_len = data.rows.len();
            for row in data.rows {
                events.push(row.into_sent()?);
            }
            if page_len < PAGE_SIZE {
                return Ok(events);
            }
            skip += PAGE_SIZE;
        }
    }

    /// Fetch the full RequestFulfilled stream, paging until a short page.
    pub async fn fetch_fulfilled(&self) -> Result<Vec<FulfilledEvent>, ClientError> {
        let mut events = Vec::new();
        let mut skip = 0;
        loop {
            let data: FulfilledData =
                self.query(FULFILLED_QUERY, json!({ "first": PAGE_SIZE, "skip": skip })).await?;
            let page_len = data.rows.len();
            for row in data.rows {
                events.push(row.into_fulfilled()?);
            }
            if page_len < PAGE_SIZE {
                return Ok(events);
            }
            skip += PAGE_SIZE;
        }
    }

    /// Fetch the full RequestProcessed stream for one user, paging until a
    /// short page.
    pub async fn fetch_processed(
        &self,
        user: Address,
    ) -> Result<Vec<ProcessedEvent>, ClientError> {
        let mut events = Vec::new();
        let mut skip = 0;
        loop {
            let variables =
                json!({ "user": format!("{user:?}"), "first": PAGE_SIZE, "skip": skip });
            let data: ProcessedData = self.query(PROCESSED_QUERY, variables).await?;
            let page_len = data.rows.len();
            for row in data.rows {
                events.push(row.into_processed()?);
            }
            if page_len < PAGE_SIZE {
                return Ok(events);
            }
            skip += PAGE_SIZE;
        }
    }

    /// Fetch all three streams concurrently into one snapshot.
    ///
    /// The three queries are independent; any single failure fails the whole
    /// snapshot so a partial view is never mistaken for a complete one.
    pub async fn fetch_snapshot(&self, user: Address) -> Result<EventSnapshot, ClientError> {
        let (sent, fulfilled, processed) = tokio::try_join!(
            self.fetch_sent(),
            self.fetch_fulfilled(),
            self.fetch_processed(user),
        )?;
        tracing::debug!(
            %user,
            sent = sent.len(),
            fulfilled = fulfilled.len(),
            processed = processed.len(),
            "fetched event snapshot"
        );
        Ok(EventSnapshot { user, sent, fulfilled, processed })
    }
}
