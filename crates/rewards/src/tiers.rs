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

//! Delegation tier classification.
//!
//! All amounts are integers in micro-units (10^-6 of the display unit).
//! Classification never looks at formatted values; [`format_amount`] exists
//! for presentation only.

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Decimals used for on-chain stake amounts.
pub const STAKE_DECIMALS: u32 = 6;

/// One whole display unit in micro-units.
pub const UNIT: u64 = 1_000_000;

/// Reward tiers, ordered low to high by minimum stake.
///
/// Variant order matters: the derived `Ord` matches the threshold order, and
/// [`tier_for_amount`] scans from the highest tier down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// 5 units staked.
    Asteroid,
    /// 20 units staked.
    Comet,
    /// 100 units staked.
    Star,
    /// 1000 units staked.
    Galaxy,
}

impl Tier {
    /// All tiers, low to high.
    pub const ALL: [Tier; 4] = [Tier::Asteroid, Tier::Comet, Tier::Star, Tier::Galaxy];

    /// Minimum stake for this tier, in micro-units.
    pub fn threshold(self) -> U256 {
        let whole: u64 = match self {
            Tier::Asteroid => 5,
            Tier::Comet => 20,
            Tier::Star => 100,
            Tier::Galaxy => 1000,
        };
        U256::from(whole * UNIT)
    }

    /// Display name.
    pub fn name(self) -> &'static str {
        match self {
            Tier::Asteroid => "Asteroid",
            Tier::Comet => "Comet",
            Tier::Star => "Star",
            Tier::Galaxy => "Galaxy",
        }
    }

    /// Display label shown next to the tier name.
    pub fn emoji(self) -> &'static str {
        match self {
            Tier::Asteroid => "🪨",
            Tier::Comet => "☄️",
            Tier::Star => "⭐",
            Tier::Galaxy => "🌌",
        }
    }

    /// CSS class used by the dashboard for tier accents.
    pub fn color_class(self) -> &'static str {
        match self {
            Tier::Asteroid => "text-slate-400",
            Tier::Comet => "text-cyan-400",
            Tier::Star => "text-amber-400",
            Tier::Galaxy => "text-purple-400",
        }
    }

    /// The next tier up, or `None` at the top.
    pub fn next(self) -> Option<Tier> {
        match self {
            Tier::Asteroid => Some(Tier::Comet),
            Tier::Comet => Some(Tier::Star),
            Tier::Star => Some(Tier::Galaxy),
            Tier::Galaxy => None,
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Classification failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TierError {
    /// The stake does not reach the lowest tier. Recoverable; callers must
    /// surface this distinctly from "not yet loaded".
    #[error("stake amount {amount} is below the {} minimum of {minimum}", Tier::Asteroid)]
    BelowMinimum {
        /// The stake amount that failed to classify, in micro-units.
        amount: U256,
        /// The lowest tier threshold, in micro-units.
        minimum: U256,
    },
}

/// Classify a stake amount into the highest tier whose threshold it meets.
///
/// Fails with [`TierError::BelowMinimum`] for amounts under the
/// [`Tier::Asteroid`] threshold.
pub fn tier_for_amount(amount: U256) -> Result<Tier, TierError> {
    for tier in Tier::ALL.iter().rev() {
        if amount >= tier.threshold() {
            return Ok(*tier);
        }
    }
    Err(TierError::BelowMinimum { amount, minimum: Tier::Asteroid.threshold() })
}

/// Whether `amount` meets the minimum stake for `tier`. Boundary inclusive.
pub fn qualifies_for_tier(amount: U256, tier: Tier) -> bool {
    amount >= tier.threshold()
}

/// Progression snapshot for a stake amount. Computed fresh on every call,
/// never persisted.
///
/// When `next` is present, `remaining_amount = required_amount - amount`
/// and is never negative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierProgress {
    /// The tier the amount currently sits in.
    pub current: Tier,
    /// The next tier up; `None` at [`Tier::Galaxy`].
    pub next: Option<Tier>,
    /// Minimum stake for `next`, in micro-units.
    pub required_amount: Option<U256>,
    /// Additional stake needed to reach `next`, in micro-units.
    pub remaining_amount: Option<U256>,
}

/// Compute the current tier and next-tier progression for a stake amount.
///
/// Below-minimum amounts do not fail here: the dashboard always shows a path
/// into the lowest tier, so the fallback reports [`Tier::Asteroid`] as both
/// current and next, with the full Asteroid threshold as the requirement.
/// Callers that need the strict classification use [`tier_for_amount`].
pub fn tier_progress(amount: U256) -> TierProgress {
    let current = match tier_for_amount(amount) {
        Ok(tier) => tier,
        Err(TierError::BelowMinimum { minimum, .. }) => {
            return TierProgress {
                current: Tier::Asteroid,
                next: Some(Tier::Asteroid),
                required_amount: Some(minimum),
                remaining_amount: Some(minimum - amount),
            };
        }
    };

    match current.next() {
        Some(next) => {
            let required = next.threshold();
            TierProgress {
                current,
                next: Some(next),
                required_amount: Some(required),
                remaining_amount: Some(required - amount),
            }
        }
        None => TierProgress {
            current,
            next: None,
            required_amount: None,
            remaining_amount: None,
        },
    }
}

/// Format a micro-unit amount as a display-unit decimal string.
///
/// Presentation only; the result must never feed back into classification.
pub fn format_amount(amount: U256) -> String {
    let unit = U256::from(UNIT);
    let whole = amount / unit;
    let frac = (amount % unit).to::<u64>();
    if frac == 0 {
        return whole.to_string();
    }
    let frac = format!("{frac:06}");
    format!("{}.{}", whole, frac.trim_end_matches('0'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn micro(whole: u64) -> U256 {
        U256::from(whole * UNIT)
    }

    #[test]
    fn classifies_each_band() {
        assert_eq!(tier_for_amount(micro(5)).unwrap(), Tier::Asteroid);
        assert_eq!(tier_for_amount(micro(19)).unwrap(), Tier::Asteroid);
        assert_eq!(tier_for_amount(micro(20)).unwrap(), Tier::Comet);
        assert_eq!(tier_for_amount(micro(99)).unwrap(), Tier::Comet);
        assert_eq!(tier_for_amount(micro(100)).unwrap(), Tier::Star);
        assert_eq!(tier_for_amount(micro(999)).unwrap(), Tier::Star);
        assert_eq!(tier_for_amount(micro(1000)).unwrap(), Tier::Galaxy);
        assert_eq!(tier_for_amount(micro(50_000)).unwrap(), Tier::Galaxy);
    }

    #[test]
    fn below_minimum_fails() {
        let err = tier_for_amount(U256::from(4_999_999u64)).unwrap_err();
        assert_eq!(
            err,
            TierError::BelowMinimum {
                amount: U256::from(4_999_999u64),
                minimum: micro(5),
            }
        );
    }

    #[test]
    fn thresholds_are_boundary_inclusive() {
        for tier in Tier::ALL {
            assert!(qualifies_for_tier(tier.threshold(), tier));
            assert!(!qualifies_for_tier(tier.threshold() - U256::from(1u8), tier));
        }
    }

    #[test]
    fn progress_at_five_units() {
        // 5 whole units: Asteroid, 15 more to Comet.
        let progress = tier_progress(U256::from(5_000_000u64));
        assert_eq!(
            progress,
            TierProgress {
                current: Tier::Asteroid,
                next: Some(Tier::Comet),
                required_amount: Some(U256::from(20_000_000u64)),
                remaining_amount: Some(U256::from(15_000_000u64)),
            }
        );
    }

    #[test]
    fn progress_below_minimum_falls_back_to_asteroid() {
        let progress = tier_progress(U256::from(999_999u64));
        assert_eq!(
            progress,
            TierProgress {
                current: Tier::Asteroid,
                next: Some(Tier::Asteroid),
                required_amount: Some(U256::from(5_000_000u64)),
                remaining_amount: Some(U256::from(4_000_001u64)),
            }
        );
    }

    #[test]
    fn progress_at_top_tier_has_no_next() {
        let progress = tier_progress(micro(2500));
        assert_eq!(progress.current, Tier::Galaxy);
        assert_eq!(progress.next, None);
        assert_eq!(progress.required_amount, None);
        assert_eq!(progress.remaining_amount, None);
    }

    #[test]
    fn tier_order_matches_threshold_order() {
        for pair in Tier::ALL.windows(2) {
            assert!(pair[0] < pair[1]);
            assert!(pair[0].threshold() < pair[1].threshold());
        }
    }

    #[test]
    fn formats_amounts_for_display() {
        assert_eq!(format_amount(U256::from(5_000_000u64)), "5");
        assert_eq!(format_amount(U256::from(5_500_000u64)), "5.5");
        assert_eq!(format_amount(U256::from(999_999u64)), "0.999999");
        assert_eq!(format_amount(U256::ZERO), "0");
    }

    proptest! {
        #[test]
        fn galaxy_amounts_have_no_next(extra in 0u64..u64::MAX / 2) {
            let amount = Tier::Galaxy.threshold() + U256::from(extra);
            prop_assert_eq!(tier_for_amount(amount).unwrap(), Tier::Galaxy);
            let progress = tier_progress(amount);
            prop_assert_eq!(progress.next, None);
        }

        #[test]
        fn comet_band_is_comet(whole in 20u64..100) {
            prop_assert_eq!(tier_for_amount(micro(whole)).unwrap(), Tier::Comet);
        }

        #[test]
        fn remaining_never_exceeds_required(amount in 0u64..2_000_000_000) {
            let progress = tier_progress(U256::from(amount));
            if let (Some(required), Some(remaining)) =
                (progress.required_amount, progress.remaining_amount)
            {
                prop_assert!(remaining <= required);
                // remaining = required - amount whenever the amount actually
                // classifies; the below-minimum fallback keeps the same shape.
                prop_assert_eq!(remaining, required - U256::from(amount));
            }
        }
    }
}
