//! Allocation of a session's question count across difficulty bands.

use thiserror::Error;

use crate::model::{DifficultyCounts, DifficultyRatio};

/// Share of every session reserved for easy questions.
pub const MIN_EASY_SHARE: f64 = 0.2;

/// Absolute minimum number of easy questions per session.
pub const MIN_EASY_COUNT: u32 = 2;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum MixError {
    #[error("session total must be > 0")]
    ZeroTotal,

    #[error("easy floor of {min_easy} exceeds session total of {total}")]
    FloorExceedsTotal { min_easy: u32, total: u32 },
}

/// Minimum number of easy questions for a session of `total`.
#[must_use]
pub fn min_easy_floor(total: u32) -> u32 {
    MIN_EASY_COUNT.max(round_share(u64::from(total), MIN_EASY_SHARE))
}

/// Split `total` questions across bands according to `ratio`.
///
/// Each band is rounded independently, the easy band is lifted to its floor,
/// and the rounding error is then corrected one band at a time:
///
/// - a surplus is taken from `difficult`, then `moderate`, then `easy` down to
///   its floor;
/// - a shortfall is given to whichever of `moderate` and `difficult` is
///   smaller, `moderate` on ties. `easy` never grows here.
///
/// # Errors
///
/// Returns `MixError::ZeroTotal` for an empty session and
/// `MixError::FloorExceedsTotal` when the easy floor alone is larger than
/// `total`.
pub fn compute_mix(total: u32, ratio: &DifficultyRatio) -> Result<DifficultyCounts, MixError> {
    if total == 0 {
        return Err(MixError::ZeroTotal);
    }
    let min_easy = min_easy_floor(total);
    if min_easy > total {
        return Err(MixError::FloorExceedsTotal { min_easy, total });
    }

    let total = u64::from(total);
    let min_easy = u64::from(min_easy);
    let mut easy = min_easy.max(u64::from(round_share(total, ratio.easy)));
    let mut moderate = u64::from(round_share(total, ratio.moderate));
    let mut difficult = u64::from(round_share(total, ratio.difficult));

    let sum = easy + moderate + difficult;
    if sum > total {
        // Draining a band in one step is the same as decrementing it until
        // either the surplus or the band runs out.
        let mut surplus = sum - total;
        for band in [&mut difficult, &mut moderate] {
            let take = surplus.min(*band);
            *band -= take;
            surplus -= take;
        }
        let take = surplus.min(easy - min_easy);
        easy -= take;
        surplus -= take;
        if surplus > 0 {
            return Err(MixError::FloorExceedsTotal {
                min_easy: narrow(min_easy),
                total: narrow(total),
            });
        }
    }

    while easy + moderate + difficult < total {
        if moderate <= difficult {
            moderate += 1;
        } else {
            difficult += 1;
        }
    }

    debug_assert_eq!(easy + moderate + difficult, total);
    Ok(DifficultyCounts::new(
        narrow(easy),
        narrow(moderate),
        narrow(difficult),
    ))
}

/// `round(total * weight)`, rounding halves away from zero. Negative and
/// non-finite weights count as zero.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
fn round_share(total: u64, weight: f64) -> u32 {
    if !weight.is_finite() || weight <= 0.0 {
        return 0;
    }
    // Float-to-int `as` saturates, so oversized weights clamp to u32::MAX.
    (total as f64 * weight).round() as u32
}

// Every band is bounded by `total`, which came from a u32.
fn narrow(value: u64) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}
