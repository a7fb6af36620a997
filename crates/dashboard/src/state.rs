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

use std::sync::Arc;

use crate::ServiceError;

/// Tagged load state handed to consumers.
///
/// A fetch failure is [`DataState::Failed`], never an empty
/// [`DataState::Ready`]: an empty-but-healthy dashboard and an unavailable
/// one must stay distinguishable.
#[derive(Debug, Clone)]
pub enum DataState<T> {
    /// No wallet connected.
    NotLoaded,
    /// A fetch for the current wallet is in flight.
    Loading,
    /// Data for the current wallet.
    Ready(T),
    /// The last fetch for the current wallet failed.
    Failed(Arc<ServiceError>),
}

impl<T> DataState<T> {
    /// The ready value, if any.
    pub fn ready(&self) -> Option<&T> {
        match self {
            DataState::Ready(value) => Some(value),
            _ => None,
        }
    }

    /// The failure, if any.
    pub fn error(&self) -> Option<&ServiceError> {
        match self {
            DataState::Failed(err) => Some(err),
            _ => None,
        }
    }

    /// Whether a fetch is in flight.
    pub fn is_loading(&self) -> bool {
        matches!(self, DataState::Loading)
    }
}
