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

//! Client for the delegation verifier API.
//!
//! `GET /verify?address=<bech32>` resolves a staker's delegation amount.
//! An insufficient stake is a successful response with `isQualified: false`;
//! only transport failures and non-2xx statuses are errors.

use alloy_primitives::{Address, U256};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use url::Url;

use crate::ClientError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawVerifyResponse {
    bech32_address: String,
    hex_address: String,
    delegation_amount: String,
    required_amount: String,
    is_qualified: bool,
    timestamp: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct VerifyErrorBody {
    error: String,
    message: Option<String>,
}

/// A verified delegation lookup. `delegation_amount` is the authoritative
/// input to tier classification, in micro-units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelegationVerification {
    /// The queried bech32 address.
    pub bech32_address: String,
    /// The equivalent hex address, used to scope the Processed stream.
    pub hex_address: Address,
    /// Staked amount in micro-units.
    pub delegation_amount: U256,
    /// Minimum stake the verifier checked against, in micro-units.
    pub required_amount: U256,
    /// Whether the stake meets the verifier's minimum.
    pub is_qualified: bool,
    /// When the verifier performed the lookup.
    pub timestamp: DateTime<Utc>,
}

fn parse_u256(field: &'static str, value: &str) -> Result<U256, ClientError> {
    U256::from_str_radix(value, 10)
        .map_err(|_| ClientError::MalformedField { field, value: value.to_string() })
}

impl RawVerifyResponse {
    fn into_verification(self) -> Result<DelegationVerification, ClientError> {
        Ok(DelegationVerification {
            hex_address: self.hex_address.parse().map_err(|_| ClientError::MalformedField {
                field: "hexAddress",
                value: self.hex_address.clone(),
            })?,
            delegation_amount: parse_u256("delegationAmount", &self.delegation_amount)?,
            required_amount: parse_u256("requiredAmount", &self.required_amount)?,
            bech32_address: self.bech32_address,
            is_qualified: self.is_qualified,
            timestamp: self.timestamp,
        })
    }
}

/// Client for the delegation verifier API.
#[derive(Debug, Clone)]
pub struct VerifierClient {
    client: reqwest::Client,
    base_url: Url,
}

impl VerifierClient {
    /// Create a client against an explicit verifier base URL.
    pub fn new(base_url: Url) -> Result<Self, ClientError> {
        Ok(Self { client: crate::default_http_client()?, base_url })
    }

    /// Look up the delegation amount for a bech32 address.
    pub async fn verify(&self, address: &str) -> Result<DelegationVerification, ClientError> {
        let mut url = self.base_url.join("verify").map_err(|_| ClientError::MalformedField {
            field: "base_url",
            value: self.base_url.to_string(),
        })?;
        url.query_pairs_mut().append_pair("address", address);

        tracing::debug!(%address, "looking up delegation");
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let (error, message) = match serde_json::from_str::<VerifyErrorBody>(&body) {
                Ok(parsed) => (parsed.error, parsed.message),
                Err(_) => (body, None),
            };
            tracing::warn!(%status, %error, "delegation lookup failed");
            return Err(ClientError::Api { status, error, message });
        }

        let raw: RawVerifyResponse = response.json().await?;
        let verification = raw.into_verification()?;
        tracing::debug!(
            address = %verification.bech32_address,
            amount = %verification.delegation_amount,
            qualified = verification.is_qualified,
            "delegation lookup complete"
        );
        Ok(verification)
    }
}
