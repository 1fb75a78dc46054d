use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

//
// ─── BAND ──────────────────────────────────────────────────────────────────────
//

/// Difficulty band of a question.
///
/// The set is closed and ordered; `Difficulty::ALL` is the canonical iteration
/// order used for selection and tie-breaking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Moderate,
    Difficult,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Moderate, Difficulty::Difficult];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Moderate => "moderate",
            Difficulty::Difficult => "difficult",
        }
    }

    /// Position of the band inside `Difficulty::ALL`.
    #[must_use]
    pub(crate) fn index(self) -> usize {
        match self {
            Difficulty::Easy => 0,
            Difficulty::Moderate => 1,
            Difficulty::Difficult => 2,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseDifficultyError {
    raw: String,
}

impl fmt::Display for ParseDifficultyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid difficulty value: {}", self.raw)
    }
}

impl std::error::Error for ParseDifficultyError {}

impl FromStr for Difficulty {
    type Err = ParseDifficultyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "easy" => Ok(Difficulty::Easy),
            "moderate" => Ok(Difficulty::Moderate),
            "difficult" => Ok(Difficulty::Difficult),
            other => Err(ParseDifficultyError {
                raw: other.to_string(),
            }),
        }
    }
}

//
// ─── RATIO ─────────────────────────────────────────────────────────────────────
//

/// Preferred share of each band in a session.
///
/// Weights are applied against the session total and are not required to sum
/// to one. Entries missing from persisted JSON read as zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DifficultyRatio {
    #[serde(default)]
    pub easy: f64,
    #[serde(default)]
    pub moderate: f64,
    #[serde(default)]
    pub difficult: f64,
}

impl DifficultyRatio {
    #[must_use]
    pub fn new(easy: f64, moderate: f64, difficult: f64) -> Self {
        Self {
            easy,
            moderate,
            difficult,
        }
    }

    #[must_use]
    pub fn get(&self, band: Difficulty) -> f64 {
        match band {
            Difficulty::Easy => self.easy,
            Difficulty::Moderate => self.moderate,
            Difficulty::Difficult => self.difficult,
        }
    }

    /// Returns true when every weight is finite and non-negative.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        Difficulty::ALL
            .iter()
            .all(|band| self.get(*band).is_finite() && self.get(*band) >= 0.0)
    }
}

/// Parses `easy,moderate,difficult`, e.g. `0.6,0.3,0.1`.
impl FromStr for DifficultyRatio {
    type Err = ParseDifficultyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseDifficultyError { raw: s.to_string() };
        let weights = s
            .split(',')
            .map(|part| part.trim().parse::<f64>().map_err(|_| invalid()))
            .collect::<Result<Vec<_>, _>>()?;
        let [easy, moderate, difficult] = weights.as_slice() else {
            return Err(invalid());
        };
        let ratio = Self::new(*easy, *moderate, *difficult);
        if ratio.is_well_formed() {
            Ok(ratio)
        } else {
            Err(invalid())
        }
    }
}

impl Default for DifficultyRatio {
    /// Mostly easy with some moderate; used when a profile has no preference.
    fn default() -> Self {
        Self::new(0.8, 0.2, 0.0)
    }
}

//
// ─── COUNTS ────────────────────────────────────────────────────────────────────
//

/// Number of questions to draw from each band.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DifficultyCounts {
    pub easy: u32,
    pub moderate: u32,
    pub difficult: u32,
}

impl DifficultyCounts {
    #[must_use]
    pub fn new(easy: u32, moderate: u32, difficult: u32) -> Self {
        Self {
            easy,
            moderate,
            difficult,
        }
    }

    #[must_use]
    pub fn get(&self, band: Difficulty) -> u32 {
        match band {
            Difficulty::Easy => self.easy,
            Difficulty::Moderate => self.moderate,
            Difficulty::Difficult => self.difficult,
        }
    }

    /// Sum across all bands.
    #[must_use]
    pub fn total(&self) -> u32 {
        self.easy + self.moderate + self.difficult
    }

    /// Bands with a positive count, in canonical order.
    pub fn requested_bands(&self) -> impl Iterator<Item = Difficulty> + '_ {
        Difficulty::ALL
            .into_iter()
            .filter(move |band| self.get(*band) > 0)
    }
}
