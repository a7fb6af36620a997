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

use reqwest::StatusCode;
use thiserror::Error;

/// Errors from the subgraph and verifier clients.
///
/// Every variant is a real failure. "No matching rows" and "not qualified"
/// are successful responses and never map here.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport-level failure, including timeouts.
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The collaborator answered with a non-2xx status.
    #[error("api error ({status}): {error}")]
    Api {
        /// HTTP status returned.
        status: StatusCode,
        /// The `error` field of the response body, or the raw body.
        error: String,
        /// Optional human-readable detail from the response body.
        message: Option<String>,
    },

    /// The subgraph returned GraphQL-level errors.
    #[error("graphql errors: {}", .messages.join("; "))]
    Graphql {
        /// Messages from the `errors` array.
        messages: Vec<String>,
    },

    /// A response field could not be parsed into its typed form.
    #[error("malformed {field} in response: {value:?}")]
    MalformedField {
        /// Which field failed to parse.
        field: &'static str,
        /// The raw value as received.
        value: String,
    },
}
