use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{FeatureKey, FeatureVector};
use crate::simulation::ScenarioKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProfileId {
    Neutral,
    ExtremeHeat,
    ExtremeCold,
}

impl ProfileId {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Neutral => "neutral",
            Self::ExtremeHeat => "extreme-heat",
            Self::ExtremeCold => "extreme-cold",
        }
    }

    pub const fn all() -> &'static [ProfileId] {
        &[
            ProfileId::Neutral,
            ProfileId::ExtremeHeat,
            ProfileId::ExtremeCold,
        ]
    }
}

impl fmt::Display for ProfileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ProfileId {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "neutral" | "comfortable" | "baseline" => Ok(Self::Neutral),
            "extreme-heat" | "extreme_heat" | "heat" => Ok(Self::ExtremeHeat),
            "extreme-cold" | "extreme_cold" | "cold" => Ok(Self::ExtremeCold),
            _ => Err(format!("unknown feature profile: {value}")),
        }
    }
}

/// An immutable named interpolation endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureProfile {
    pub id: ProfileId,
    pub values: FeatureVector,
}

impl FeatureProfile {
    pub fn new(id: ProfileId, values: FeatureVector) -> Self {
        Self { id, values }
    }
}

// Columns: neutral, extreme heat, extreme cold.
const PROFILE_TABLE: &[(FeatureKey, f64, f64, f64)] = &[
    (FeatureKey::AmbientTemperature, 22.0, 41.0, -8.0),
    (FeatureKey::RelativeHumidity, 45.0, 78.0, 35.0),
    (FeatureKey::WindSpeed, 1.5, 0.4, 7.5),
    (FeatureKey::SolarRadiation, 250.0, 950.0, 120.0),
    (FeatureKey::WetBulbGlobeTemperature, 18.5, 33.5, -6.0),
    (FeatureKey::ApparentTemperature, 22.0, 58.0, -15.0),
    (FeatureKey::MeanRr, 850.0, 520.0, 930.0),
    (FeatureKey::MedianRr, 845.0, 515.0, 925.0),
    (FeatureKey::Sdrr, 110.0, 45.0, 95.0),
    (FeatureKey::Rmssd, 35.0, 12.0, 30.0),
    (FeatureKey::Sdsd, 35.0, 12.0, 30.0),
    (FeatureKey::SdrrRmssd, 3.1, 3.75, 3.2),
    (FeatureKey::HeartRate, 72.0, 118.0, 64.0),
    (FeatureKey::Pnn25, 20.0, 3.0, 16.0),
    (FeatureKey::Pnn50, 8.0, 0.5, 6.0),
    (FeatureKey::Sd1, 25.0, 8.5, 21.0),
    (FeatureKey::Sd2, 150.0, 62.0, 132.0),
    (FeatureKey::Kurt, 1.5, 4.2, 1.9),
    (FeatureKey::Skew, 0.1, -0.9, 0.2),
    (FeatureKey::MeanRelRr, 0.0, -0.001, 0.0),
    (FeatureKey::MedianRelRr, 0.0, -0.0005, 0.0),
    (FeatureKey::SdrrRelRr, 0.015, 0.007, 0.013),
    (FeatureKey::RmssdRelRr, 0.011, 0.004, 0.010),
    (FeatureKey::SdsdRelRr, 0.011, 0.004, 0.010),
    (FeatureKey::SdrrRmssdRelRr, 1.4, 1.75, 1.3),
    (FeatureKey::KurtRelRr, 4.0, 9.5, 4.6),
    (FeatureKey::SkewRelRr, 0.0, -0.35, 0.05),
    (FeatureKey::Vlf, 1200.0, 420.0, 1350.0),
    (FeatureKey::VlfPct, 30.0, 22.0, 33.0),
    (FeatureKey::Lf, 1800.0, 1250.0, 1500.0),
    (FeatureKey::LfPct, 45.0, 66.0, 40.0),
    (FeatureKey::LfNu, 60.0, 84.0, 55.0),
    (FeatureKey::Hf, 1000.0, 230.0, 1050.0),
    (FeatureKey::HfPct, 25.0, 12.0, 27.0),
    (FeatureKey::HfNu, 40.0, 16.0, 45.0),
    (FeatureKey::Tp, 4000.0, 1900.0, 3900.0),
    (FeatureKey::LfHf, 1.8, 5.4, 1.45),
    (FeatureKey::HfLf, 0.55, 0.185, 0.69),
    (FeatureKey::SampleEntropy, 1.6, 0.85, 1.45),
    (FeatureKey::HiguchiFd, 1.05, 1.22, 1.08),
    (FeatureKey::SkinTemperature, 33.0, 37.8, 27.5),
    (FeatureKey::CoreTemperature, 37.0, 39.4, 36.1),
    (FeatureKey::RespirationRate, 14.0, 26.0, 13.0),
    (FeatureKey::Spo2, 98.0, 95.0, 97.0),
    (FeatureKey::EdaMean, 2.5, 11.5, 1.2),
    (FeatureKey::EdaPeaks, 3.0, 14.0, 1.0),
    (FeatureKey::SweatRate, 0.3, 1.6, 0.05),
    (FeatureKey::ActivityLevel, 1.5, 3.5, 2.2),
    (FeatureKey::MetabolicRate, 120.0, 380.0, 210.0),
    (FeatureKey::HydrationLevel, 95.0, 78.0, 92.0),
];

fn profile_from_column(id: ProfileId, column: usize) -> FeatureProfile {
    let values = PROFILE_TABLE
        .iter()
        .map(|(key, neutral, heat, cold)| {
            let value = match column {
                1 => *heat,
                2 => *cold,
                _ => *neutral,
            };
            (*key, value)
        })
        .collect();
    FeatureProfile::new(id, values)
}

/// Read-only collection of interpolation endpoints, built once and shared.
#[derive(Debug, Clone)]
pub struct ProfileStore {
    profiles: HashMap<ProfileId, FeatureProfile>,
}

impl ProfileStore {
    pub fn builtin() -> Self {
        let profiles = [
            profile_from_column(ProfileId::Neutral, 0),
            profile_from_column(ProfileId::ExtremeHeat, 1),
            profile_from_column(ProfileId::ExtremeCold, 2),
        ]
        .into_iter()
        .map(|profile| (profile.id, profile))
        .collect();
        Self { profiles }
    }

    /// Builds a store from caller-provided profiles. Missing ids fall back to
    /// the built-in values.
    pub fn with_profiles(profiles: impl IntoIterator<Item = FeatureProfile>) -> Self {
        let mut store = Self::builtin();
        for profile in profiles {
            store.profiles.insert(profile.id, profile);
        }
        store
    }

    pub fn get(&self, id: ProfileId) -> &FeatureProfile {
        // builtin() seeds every ProfileId, and entries are only ever replaced.
        &self.profiles[&id]
    }

    /// Start and end profiles for a scenario.
    pub fn endpoints(&self, scenario: ScenarioKind) -> (&FeatureProfile, &FeatureProfile) {
        match scenario {
            ScenarioKind::HeatUp => (self.get(ProfileId::Neutral), self.get(ProfileId::ExtremeHeat)),
            ScenarioKind::CoolDown => (self.get(ProfileId::Neutral), self.get(ProfileId::ExtremeCold)),
        }
    }
}

impl Default for ProfileStore {
    fn default() -> Self {
        Self::builtin()
    }
}
