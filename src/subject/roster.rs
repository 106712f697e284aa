//! Synthetic subjects for demos and tests.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::features::{FeatureKey, FeatureVector, ProfileId, ProfileStore};

use super::Subject;

const FIRST_NAMES: &[&str] = &[
    "Ana", "Ben", "Carla", "Dmitri", "Emeka", "Farah", "Goran", "Hana", "Ibrahim", "Joana",
    "Kenji", "Lucia", "Mateo", "Nadia", "Omar", "Priya", "Rafael", "Sofia", "Tomas", "Yusuf",
];

const LAST_NAMES: &[&str] = &[
    "Alvarez", "Becker", "Costa", "Dubois", "Eze", "Fischer", "Garcia", "Haddad", "Ivanova",
    "Jensen", "Kowalski", "Lopez", "Moreau", "Nakamura", "Okafor", "Petrov", "Rossi", "Silva",
];

/// Relative jitter applied to each environmental and statistical field.
const FEATURE_JITTER: f64 = 0.03;

pub fn generate_name(rng: &mut impl Rng) -> String {
    let first = FIRST_NAMES.choose(rng).copied().unwrap_or("Worker");
    let last = LAST_NAMES.choose(rng).copied().unwrap_or("Doe");
    format!("{first} {last}")
}

/// One subject near the neutral profile, with random demographics.
pub fn generate_subject(id: impl Into<String>, profiles: &ProfileStore, rng: &mut impl Rng) -> Subject {
    let mut features: FeatureVector = profiles
        .get(ProfileId::Neutral)
        .values
        .iter()
        .map(|(key, value)| {
            let jitter = rng.gen_range(-FEATURE_JITTER..=FEATURE_JITTER);
            (key, value * (1.0 + jitter))
        })
        .collect();

    let height_cm: f64 = rng.gen_range(155.0..195.0);
    let weight_kg: f64 = rng.gen_range(52.0..110.0);
    let height_m = height_cm / 100.0;
    features.set(FeatureKey::Age, rng.gen_range(19..64) as f64);
    features.set(FeatureKey::Gender, if rng.gen_bool(0.5) { 1.0 } else { 0.0 });
    features.set(FeatureKey::HeightCm, height_cm.round());
    features.set(FeatureKey::WeightKg, weight_kg.round());
    features.set(FeatureKey::Bmi, (weight_kg / (height_m * height_m) * 10.0).round() / 10.0);

    Subject::new(id, generate_name(rng), features)
}

/// `count` subjects with ids `worker-001`, `worker-002`, ...
pub fn generate_roster(count: usize, profiles: &ProfileStore, rng: &mut impl Rng) -> Vec<Subject> {
    (1..=count)
        .map(|index| generate_subject(format!("worker-{index:03}"), profiles, rng))
        .collect()
}
