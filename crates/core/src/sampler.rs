//! Randomized selection of questions from per-band pools.
//!
//! All functions take the random source as a parameter and never touch the
//! caller's collections; they work on copies.

use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::HashSet;
use std::hash::Hash;

use crate::model::{Difficulty, DifficultyCounts, QuestionPools};

/// An item that can be drawn into a session.
pub trait Candidate {
    type Id: Eq + Hash + Clone;

    /// Identity used to keep a selection free of duplicates.
    fn candidate_id(&self) -> Self::Id;

    fn difficulty(&self) -> Difficulty;
}

/// Result of drawing a session from the pools.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection<T> {
    items: Vec<T>,
    requested: usize,
    filled_from_fallback: usize,
}

impl<T> Selection<T> {
    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    #[must_use]
    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of items the counts asked for.
    #[must_use]
    pub fn requested(&self) -> usize {
        self.requested
    }

    /// Items that came from another band's pool to cover a shortfall.
    #[must_use]
    pub fn filled_from_fallback(&self) -> usize {
        self.filled_from_fallback
    }

    /// How many requested items the pools could not supply.
    #[must_use]
    pub fn shortfall(&self) -> usize {
        self.requested.saturating_sub(self.items.len())
    }

    #[must_use]
    pub fn is_underfilled(&self) -> bool {
        self.shortfall() > 0
    }
}

/// Uniformly random permutation of a copy of `items`.
pub fn shuffle<T: Clone, R: Rng + ?Sized>(items: &[T], rng: &mut R) -> Vec<T> {
    let mut shuffled = items.to_vec();
    shuffled.as_mut_slice().shuffle(rng);
    shuffled
}

/// Up to `n` distinct positions of `items`, in random order.
pub fn sample<T: Clone, R: Rng + ?Sized>(items: &[T], n: usize, rng: &mut R) -> Vec<T> {
    if n == 0 {
        return Vec::new();
    }
    let mut picked = shuffle(items, rng);
    picked.truncate(n);
    picked
}

/// Draw `counts` items per band from `pools`.
///
/// Bands are sampled in `Difficulty::ALL` order. No id is drawn twice, even
/// when a pool repeats an id or two pools share one. When a pool is too small, the
/// missing items are taken from the pools in a random band order, skipping
/// anything already chosen, until every shortfall is covered or the pools run
/// dry. In the latter case the selection is simply shorter than requested.
pub fn select_questions<T, R>(
    counts: &DifficultyCounts,
    pools: &QuestionPools<T>,
    rng: &mut R,
) -> Selection<T>
where
    T: Candidate + Clone,
    R: Rng + ?Sized,
{
    let requested = usize::try_from(counts.total()).unwrap_or(usize::MAX);
    let mut chosen: Vec<T> = Vec::with_capacity(requested);
    let mut chosen_ids: HashSet<T::Id> = HashSet::with_capacity(requested);
    let mut deficits = [0_usize; 3];

    for band in Difficulty::ALL {
        let need = usize::try_from(counts.get(band)).unwrap_or(usize::MAX);
        if need == 0 {
            continue;
        }
        // Ids already taken by an earlier band, and repeats within this pool,
        // are not eligible.
        let mut seen: HashSet<T::Id> = HashSet::new();
        let eligible: Vec<&T> = pools
            .get(band)
            .iter()
            .filter(|c| {
                let id = c.candidate_id();
                !chosen_ids.contains(&id) && seen.insert(id)
            })
            .collect();
        let picked = sample(&eligible, need, rng);
        deficits[band.index()] = need - picked.len();
        for item in picked {
            chosen_ids.insert(item.candidate_id());
            chosen.push(item.clone());
        }
    }

    let mut filled_from_fallback = 0;
    if deficits.iter().any(|d| *d > 0) {
        for source in shuffle(&Difficulty::ALL, rng) {
            if deficits.iter().all(|d| *d == 0) {
                break;
            }
            let mut available: Vec<&T> = pools
                .get(source)
                .iter()
                .filter(|c| !chosen_ids.contains(&c.candidate_id()))
                .collect();

            for band in Difficulty::ALL {
                let deficit = &mut deficits[band.index()];
                while *deficit > 0 {
                    let Some(next) = available.pop() else {
                        break;
                    };
                    // Pools may repeat an id; only the first copy counts.
                    if !chosen_ids.insert(next.candidate_id()) {
                        continue;
                    }
                    chosen.push(next.clone());
                    *deficit -= 1;
                    filled_from_fallback += 1;
                }
            }
        }
    }

    chosen.truncate(requested);

    Selection {
        items: chosen,
        requested,
        filled_from_fallback,
    }
}
