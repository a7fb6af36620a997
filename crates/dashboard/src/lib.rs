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

//! Orchestration service behind the Constellation dashboard UI.
//!
//! Joins the two derivations the UI depends on — stake amount → tier
//! progression, and event snapshot → request summary — into one
//! [`Dashboard`] per connected wallet, published through a watch channel as
//! a tagged [`DataState`]. Wallet switches bump a generation counter so that
//! results from in-flight fetches for a previous wallet are discarded, never
//! applied.

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use std::time::Duration;

use alloy_primitives::{Address, B256};
use async_trait::async_trait;
use constellation_client::{
    ClientError, DelegationVerification, SubgraphClient, VerifierClient,
};
use constellation_rewards::{
    reconcile::{ReconcileScope, RequestSummary},
    tiers::{tier_for_amount, tier_progress, Tier, TierError, TierProgress},
};
use thiserror::Error;
use tokio::sync::{broadcast, watch, Mutex};

mod refresh;
mod state;

pub use refresh::{RefreshBus, RefreshHandle, RefreshReason};
pub use state::DataState;

/// Errors from the dashboard service.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// A collaborator fetch failed.
    #[error("client error: {0}")]
    Client(#[from] ClientError),

    /// Strict tier classification failed.
    #[error("tier classification error: {0}")]
    Tier(#[from] TierError),

    /// The request is not in the ready-to-process set.
    #[error("request {0} is not ready to process")]
    NotReady(B256),

    /// The external process call failed.
    #[error("process call failed: {0}")]
    Processor(#[from] anyhow::Error),
}

/// The external write call that finalizes a fulfilled request on-chain.
///
/// Wallet plumbing and transaction signing live behind this seam; the
/// service only needs the resulting transaction hash, or the failure.
#[async_trait]
pub trait RequestProcessor: Send + Sync {
    /// Submit the process transaction for `request_id`.
    async fn process(&self, request_id: B256) -> anyhow::Result<B256>;
}

/// Service configuration.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// How Sent entries are scoped during reconciliation.
    pub scope: ReconcileScope,
    /// Wait between a successful process call and the refetch signal, to
    /// let subgraph indexing catch up. An accommodation, not a guarantee:
    /// a refetch may still observe the pre-process state.
    pub settle_delay: Duration,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self { scope: ReconcileScope::default(), settle_delay: Duration::from_secs(5) }
    }
}

/// Everything the UI renders for one wallet.
#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    /// The wallet's hex address, as resolved by the verifier.
    pub user: Address,
    /// The delegation lookup this dashboard was derived from.
    pub stake: DelegationVerification,
    /// Tier progression for the staked amount.
    pub tiers: TierProgress,
    /// Reconciled request pipeline.
    pub requests: RequestSummary,
}

impl Dashboard {
    /// Strict classification of the staked amount, for gating registration.
    ///
    /// Unlike the `tiers` progression (which falls back below the minimum),
    /// this fails for stakes under the lowest threshold.
    pub fn registration_tier(&self) -> Result<Tier, TierError> {
        tier_for_amount(self.stake.delegation_amount)
    }
}

#[derive(Debug)]
struct Wallet {
    bech32: String,
    generation: u64,
}

/// Orchestrates fetching, derivation and refresh for the dashboard.
pub struct DashboardService<P> {
    subgraph: SubgraphClient,
    verifier: VerifierClient,
    processor: P,
    config: DashboardConfig,
    refresh: RefreshBus,
    // Subscription taken at construction so signals fired before run()
    // starts are buffered rather than dropped.
    signals: Mutex<Option<broadcast::Receiver<RefreshReason>>>,
    generation: AtomicU64,
    wallet: Mutex<Option<Wallet>>,
    state: watch::Sender<DataState<Dashboard>>,
}

impl<P: RequestProcessor> DashboardService<P> {
    /// Create a service over the two collaborator clients and the process
    /// write seam.
    pub fn new(
        subgraph: SubgraphClient,
        verifier: VerifierClient,
        processor: P,
        config: DashboardConfig,
    ) -> Self {
        let (state, _) = watch::channel(DataState::NotLoaded);
        let refresh = RefreshBus::default();
        let signals = Mutex::new(Some(refresh.subscribe()));
        Self {
            subgraph,
            verifier,
            processor,
            config,
            refresh,
            signals,
            generation: AtomicU64::new(0),
            wallet: Mutex::new(None),
            state,
        }
    }

    /// Subscribe to dashboard state updates.
    pub fn subscribe(&self) -> watch::Receiver<DataState<Dashboard>> {
        self.state.subscribe()
    }

    /// A trigger for external refetch requests.
    pub fn refresh_handle(&self) -> RefreshHandle {
        self.refresh.handle()
    }

    /// Connect or switch the active wallet.
    ///
    /// Bumps the generation so any in-flight fetch for the previous wallet
    /// is discarded when it lands, and signals the run loop to load.
    pub async fn connect_wallet(&self, bech32: impl Into<String>) {
        let bech32 = bech32.into();
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        *self.wallet.lock().await = Some(Wallet { bech32: bech32.clone(), generation });
        self.state.send_replace(DataState::Loading);
        tracing::info!(%bech32, generation, "wallet connected");
        self.refresh.handle().trigger(RefreshReason::WalletChanged);
    }

    /// Disconnect the active wallet and clear all derived state.
    pub async fn disconnect_wallet(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        *self.wallet.lock().await = None;
        self.state.send_replace(DataState::NotLoaded);
        tracing::info!("wallet disconnected");
    }

    /// Fetch and derive a dashboard for a bech32 address.
    ///
    /// Stake lookup resolves the hex address, which then scopes the event
    /// snapshot. Any fetch failure propagates; there is no empty-dashboard
    /// fallback.
    pub async fn load(&self, bech32: &str) -> Result<Dashboard, ServiceError> {
        let stake = self.verifier.verify(bech32).await?;
        let tiers = tier_progress(stake.delegation_amount);
        let snapshot = self.subgraph.fetch_snapshot(stake.hex_address).await?;
        let requests = snapshot.reconcile(self.config.scope);
        tracing::debug!(
            user = %stake.hex_address,
            current_tier = %tiers.current,
            pending = requests.pending.len(),
            ready = requests.ready_to_process.len(),
            "dashboard loaded"
        );
        Ok(Dashboard { user: stake.hex_address, stake, tiers, requests })
    }

    /// Reload the dashboard for the currently connected wallet, if any.
    pub async fn reload(&self) {
        let Some((bech32, generation)) = self.current_wallet().await else {
            tracing::debug!("reload requested with no wallet connected");
            return;
        };
        let result = self.load(&bech32).await;
        self.apply(generation, result);
    }

    /// Finalize a ready-to-process request through the external write call.
    ///
    /// Only ids currently listed as ready are accepted. On success, waits
    /// the settle delay and signals a refetch so the reconciler re-runs on a
    /// fresh snapshot.
    pub async fn process_request(&self, request_id: B256) -> Result<B256, ServiceError> {
        let ready = self
            .state
            .borrow()
            .ready()
            .map(|d| d.requests.ready_to_process.iter().any(|r| r.request_id == request_id))
            .unwrap_or(false);
        if !ready {
            return Err(ServiceError::NotReady(request_id));
        }

        let tx_hash = self.processor.process(request_id).await?;
        tracing::info!(%request_id, %tx_hash, "request processed on-chain");

        if !self.config.settle_delay.is_zero() {
            tokio::time::sleep(self.config.settle_delay).await;
        }
        self.refresh.handle().trigger(RefreshReason::RequestProcessed);
        Ok(tx_hash)
    }

    /// Serve refresh signals until the bus closes.
    ///
    /// The first call drains the subscription taken at construction, so a
    /// wallet connected before this loop starts is still loaded; a repeat
    /// call falls back to a fresh subscription.
    pub async fn run(&self) {
        let mut signals = match self.signals.lock().await.take() {
            Some(signals) => signals,
            None => self.refresh.subscribe(),
        };
        loop {
            match signals.recv().await {
                Ok(reason) => {
                    tracing::debug!(?reason, "refresh signal received");
                    self.reload().await;
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "refresh bus lagged, reloading once");
                    self.reload().await;
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    }

    async fn current_wallet(&self) -> Option<(String, u64)> {
        self.wallet.lock().await.as_ref().map(|w| (w.bech32.clone(), w.generation))
    }

    /// Publish a load result unless the wallet changed while it was in
    /// flight. Stale results are dropped silently: discarding is not an
    /// error state.
    fn apply(&self, generation: u64, result: Result<Dashboard, ServiceError>) {
        if generation != self.generation.load(Ordering::SeqCst) {
            tracing::debug!(generation, "discarding stale dashboard snapshot");
            return;
        }
        match result {
            Ok(dashboard) => {
                self.state.send_replace(DataState::Ready(dashboard));
            }
            Err(err) => {
                tracing::error!(%err, "dashboard load failed");
                self.state.send_replace(DataState::Failed(Arc::new(err)));
            }
        }
    }
}
