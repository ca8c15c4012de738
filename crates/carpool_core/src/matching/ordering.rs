use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::household::RiderGroup;

/// Strategy deciding the order in which rider groups are offered seats.
///
/// Earlier groups get first pick of nearby drivers, so the order matters.
/// Implementations must be deterministic for a given input; randomness is
/// only allowed through an explicit seed.
pub trait GroupOrdering: Send + Sync {
    /// Return a permutation of `0..groups.len()`.
    fn order(&self, groups: &[RiderGroup]) -> Vec<usize>;
}

/// Keep submission order.
#[derive(Debug, Default, Clone, Copy)]
pub struct InputOrder;

impl GroupOrdering for InputOrder {
    fn order(&self, groups: &[RiderGroup]) -> Vec<usize> {
        (0..groups.len()).collect()
    }
}

/// Sort by household name; submission order breaks ties between equal names.
#[derive(Debug, Default, Clone, Copy)]
pub struct NameOrder;

impl GroupOrdering for NameOrder {
    fn order(&self, groups: &[RiderGroup]) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..groups.len()).collect();
        indices.sort_by(|&a, &b| groups[a].name.cmp(&groups[b].name));
        indices
    }
}

/// Seeded Fisher-Yates shuffle; the same seed always yields the same order.
#[derive(Debug, Clone, Copy)]
pub struct SeededShuffle {
    pub seed: u64,
}

impl GroupOrdering for SeededShuffle {
    fn order(&self, groups: &[RiderGroup]) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..groups.len()).collect();
        let mut rng = StdRng::seed_from_u64(self.seed);
        indices.shuffle(&mut rng);
        indices
    }
}

/// Serializable selector for the ordering strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum GroupOrderingKind {
    #[default]
    InputOrder,
    ByName,
    SeededShuffle {
        seed: u64,
    },
}

/// Construct a boxed [`GroupOrdering`] from its descriptor.
pub fn build_group_ordering(kind: GroupOrderingKind) -> Box<dyn GroupOrdering> {
    match kind {
        GroupOrderingKind::InputOrder => Box::new(InputOrder),
        GroupOrderingKind::ByName => Box::new(NameOrder),
        GroupOrderingKind::SeededShuffle { seed } => Box::new(SeededShuffle { seed }),
    }
}
