use thiserror::Error;

use crate::mix::min_easy_floor;
use crate::model::difficulty::DifficultyRatio;

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("session size must be > 0")]
    InvalidSessionSize,

    #[error("pool limit must be > 0")]
    InvalidPoolLimit,

    #[error("session size {session_size} cannot hold the easy floor of {min_easy}")]
    FloorExceedsSessionSize { session_size: u32, min_easy: u32 },

    #[error("default ratio weights must be finite and non-negative")]
    InvalidDefaultRatio,
}

/// Knobs for assembling the daily question set.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyMixConfig {
    session_size: u32,
    pool_limit: u32,
    default_ratio: DifficultyRatio,
}

impl DailyMixConfig {
    pub const DEFAULT_SESSION_SIZE: u32 = 10;
    pub const DEFAULT_POOL_LIMIT: u32 = 50;

    /// Creates validated settings.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a size is zero, the session cannot hold the easy
    /// floor, or the fallback ratio has a negative or non-finite weight.
    pub fn new(
        session_size: u32,
        pool_limit: u32,
        default_ratio: DifficultyRatio,
    ) -> Result<Self, ConfigError> {
        if session_size == 0 {
            return Err(ConfigError::InvalidSessionSize);
        }
        if pool_limit == 0 {
            return Err(ConfigError::InvalidPoolLimit);
        }
        let min_easy = min_easy_floor(session_size);
        if min_easy > session_size {
            return Err(ConfigError::FloorExceedsSessionSize {
                session_size,
                min_easy,
            });
        }
        if !default_ratio.is_well_formed() {
            return Err(ConfigError::InvalidDefaultRatio);
        }

        Ok(Self {
            session_size,
            pool_limit,
            default_ratio,
        })
    }

    #[must_use]
    pub fn session_size(&self) -> u32 {
        self.session_size
    }

    #[must_use]
    pub fn pool_limit(&self) -> u32 {
        self.pool_limit
    }

    /// Ratio applied when a profile has none stored or it cannot be read.
    #[must_use]
    pub fn default_ratio(&self) -> DifficultyRatio {
        self.default_ratio
    }
}

impl Default for DailyMixConfig {
    fn default() -> Self {
        Self {
            session_size: Self::DEFAULT_SESSION_SIZE,
            pool_limit: Self::DEFAULT_POOL_LIMIT,
            default_ratio: DifficultyRatio::default(),
        }
    }
}
