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

//! HTTP clients for the two external collaborators of the Constellation
//! core: the subgraph exposing the verification-request event streams, and
//! the delegation verifier returning stake amounts for an address.
//!
//! Failure semantics matter here: a failed or timed-out fetch is always an
//! error, never an empty result set. Consumers that need loading/error/ready
//! distinctions layer them on top (see `constellation-dashboard`).

mod error;
pub mod subgraph;
pub mod verifier;

pub use error::ClientError;
pub use subgraph::{EventSnapshot, SubgraphClient};
pub use verifier::{DelegationVerification, VerifierClient};

/// Default timeout applied to every collaborator request.
pub const DEFAULT_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

pub(crate) fn default_http_client() -> Result<reqwest::Client, ClientError> {
    Ok(reqwest::Client::builder()
        .timeout(DEFAULT_TIMEOUT)
        .user_agent("constellation-client/0.1")
        .build()?)
}
