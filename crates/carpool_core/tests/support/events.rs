use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use carpool_core::household::HouseholdEntry;
use carpool_core::test_helpers::{child_names, offset_km};

/// Shape of a generated event.
#[derive(Clone, Copy, Debug)]
pub struct EventShape {
    pub households: usize,
    /// Share of households offering seats.
    pub driver_ratio: f64,
    /// Share of households without a resolved location.
    pub unlocated_ratio: f64,
    pub radius_km: f64,
}

impl Default for EventShape {
    fn default() -> Self {
        Self {
            households: 30,
            driver_ratio: 0.4,
            unlocated_ratio: 0.05,
            radius_km: 15.0,
        }
    }
}

/// Deterministic random event: same seed, same households.
pub fn random_households(seed: u64, shape: EventShape) -> Vec<HouseholdEntry> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..shape.households)
        .map(|index| {
            let name = format!("H{index:03}");
            let location = if rng.gen_bool(shape.unlocated_ratio) {
                None
            } else {
                Some(offset_km(
                    rng.gen_range(-shape.radius_km..shape.radius_km),
                    rng.gen_range(-shape.radius_km..shape.radius_km),
                ))
            };
            let children = rng.gen_range(0..=3);
            let mut entry = HouseholdEntry::new(name.clone(), location)
                .with_children(child_names(&name, children));
            if rng.gen_bool(shape.driver_ratio) {
                entry = entry
                    .with_capacity(carpool_core::Direction::Go, rng.gen_range(1..=6))
                    .with_capacity(carpool_core::Direction::Back, rng.gen_range(0..=6));
            }
            entry
        })
        .collect()
}
