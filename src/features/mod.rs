//! Typed feature vectors for the heat-stress model.
//!
//! Every value the pipeline moves around (interpolated telemetry, prediction
//! payloads, subject records) is keyed by [`FeatureKey`], a closed set of
//! named fields. The wire name of each key is the name the prediction service
//! expects in its flat JSON payload.
//!
//! # Sub-modules
//!
//! - `profiles`: fixed interpolation endpoints and scenario selection
//! - `interpolate`: per-field linear interpolation between two profiles

mod interpolate;
mod profiles;

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use interpolate::interpolate;
pub use profiles::{FeatureProfile, ProfileId, ProfileStore};

/// Domain tag for a feature. Demographic fields describe the subject and are
/// never interpolated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureDomain {
    Demographic,
    Environmental,
    Statistical,
}

/// Closed set of model input fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FeatureKey {
    // demographic
    Age,
    Gender,
    HeightCm,
    WeightKg,
    Bmi,
    // environmental
    AmbientTemperature,
    RelativeHumidity,
    WindSpeed,
    SolarRadiation,
    WetBulbGlobeTemperature,
    ApparentTemperature,
    // statistical: RR-interval time domain
    MeanRr,
    MedianRr,
    Sdrr,
    Rmssd,
    Sdsd,
    SdrrRmssd,
    HeartRate,
    Pnn25,
    Pnn50,
    Sd1,
    Sd2,
    Kurt,
    Skew,
    // statistical: relative RR
    MeanRelRr,
    MedianRelRr,
    SdrrRelRr,
    RmssdRelRr,
    SdsdRelRr,
    SdrrRmssdRelRr,
    KurtRelRr,
    SkewRelRr,
    // statistical: frequency domain
    Vlf,
    VlfPct,
    Lf,
    LfPct,
    LfNu,
    Hf,
    HfPct,
    HfNu,
    Tp,
    LfHf,
    HfLf,
    // statistical: nonlinear
    SampleEntropy,
    HiguchiFd,
    // statistical: thermoregulation and activity
    SkinTemperature,
    CoreTemperature,
    RespirationRate,
    Spo2,
    EdaMean,
    EdaPeaks,
    SweatRate,
    ActivityLevel,
    MetabolicRate,
    HydrationLevel,
}

impl FeatureKey {
    pub const fn all() -> &'static [FeatureKey] {
        &[
            FeatureKey::Age,
            FeatureKey::Gender,
            FeatureKey::HeightCm,
            FeatureKey::WeightKg,
            FeatureKey::Bmi,
            FeatureKey::AmbientTemperature,
            FeatureKey::RelativeHumidity,
            FeatureKey::WindSpeed,
            FeatureKey::SolarRadiation,
            FeatureKey::WetBulbGlobeTemperature,
            FeatureKey::ApparentTemperature,
            FeatureKey::MeanRr,
            FeatureKey::MedianRr,
            FeatureKey::Sdrr,
            FeatureKey::Rmssd,
            FeatureKey::Sdsd,
            FeatureKey::SdrrRmssd,
            FeatureKey::HeartRate,
            FeatureKey::Pnn25,
            FeatureKey::Pnn50,
            FeatureKey::Sd1,
            FeatureKey::Sd2,
            FeatureKey::Kurt,
            FeatureKey::Skew,
            FeatureKey::MeanRelRr,
            FeatureKey::MedianRelRr,
            FeatureKey::SdrrRelRr,
            FeatureKey::RmssdRelRr,
            FeatureKey::SdsdRelRr,
            FeatureKey::SdrrRmssdRelRr,
            FeatureKey::KurtRelRr,
            FeatureKey::SkewRelRr,
            FeatureKey::Vlf,
            FeatureKey::VlfPct,
            FeatureKey::Lf,
            FeatureKey::LfPct,
            FeatureKey::LfNu,
            FeatureKey::Hf,
            FeatureKey::HfPct,
            FeatureKey::HfNu,
            FeatureKey::Tp,
            FeatureKey::LfHf,
            FeatureKey::HfLf,
            FeatureKey::SampleEntropy,
            FeatureKey::HiguchiFd,
            FeatureKey::SkinTemperature,
            FeatureKey::CoreTemperature,
            FeatureKey::RespirationRate,
            FeatureKey::Spo2,
            FeatureKey::EdaMean,
            FeatureKey::EdaPeaks,
            FeatureKey::SweatRate,
            FeatureKey::ActivityLevel,
            FeatureKey::MetabolicRate,
            FeatureKey::HydrationLevel,
        ]
    }

    /// Wire name used in prediction payloads.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Age => "age",
            Self::Gender => "gender",
            Self::HeightCm => "height_cm",
            Self::WeightKg => "weight_kg",
            Self::Bmi => "bmi",
            Self::AmbientTemperature => "ambient_temperature",
            Self::RelativeHumidity => "relative_humidity",
            Self::WindSpeed => "wind_speed",
            Self::SolarRadiation => "solar_radiation",
            Self::WetBulbGlobeTemperature => "wbgt",
            Self::ApparentTemperature => "apparent_temperature",
            Self::MeanRr => "mean_rr",
            Self::MedianRr => "median_rr",
            Self::Sdrr => "sdrr",
            Self::Rmssd => "rmssd",
            Self::Sdsd => "sdsd",
            Self::SdrrRmssd => "sdrr_rmssd",
            Self::HeartRate => "hr",
            Self::Pnn25 => "pnn25",
            Self::Pnn50 => "pnn50",
            Self::Sd1 => "sd1",
            Self::Sd2 => "sd2",
            Self::Kurt => "kurt",
            Self::Skew => "skew",
            Self::MeanRelRr => "mean_rel_rr",
            Self::MedianRelRr => "median_rel_rr",
            Self::SdrrRelRr => "sdrr_rel_rr",
            Self::RmssdRelRr => "rmssd_rel_rr",
            Self::SdsdRelRr => "sdsd_rel_rr",
            Self::SdrrRmssdRelRr => "sdrr_rmssd_rel_rr",
            Self::KurtRelRr => "kurt_rel_rr",
            Self::SkewRelRr => "skew_rel_rr",
            Self::Vlf => "vlf",
            Self::VlfPct => "vlf_pct",
            Self::Lf => "lf",
            Self::LfPct => "lf_pct",
            Self::LfNu => "lf_nu",
            Self::Hf => "hf",
            Self::HfPct => "hf_pct",
            Self::HfNu => "hf_nu",
            Self::Tp => "tp",
            Self::LfHf => "lf_hf",
            Self::HfLf => "hf_lf",
            Self::SampleEntropy => "sampen",
            Self::HiguchiFd => "higuci",
            Self::SkinTemperature => "skin_temperature",
            Self::CoreTemperature => "core_temperature",
            Self::RespirationRate => "respiration_rate",
            Self::Spo2 => "spo2",
            Self::EdaMean => "eda_mean",
            Self::EdaPeaks => "eda_peaks",
            Self::SweatRate => "sweat_rate",
            Self::ActivityLevel => "activity_level",
            Self::MetabolicRate => "metabolic_rate",
            Self::HydrationLevel => "hydration_level",
        }
    }

    pub const fn domain(&self) -> FeatureDomain {
        match self {
            Self::Age | Self::Gender | Self::HeightCm | Self::WeightKg | Self::Bmi => {
                FeatureDomain::Demographic
            }
            Self::AmbientTemperature
            | Self::RelativeHumidity
            | Self::WindSpeed
            | Self::SolarRadiation
            | Self::WetBulbGlobeTemperature
            | Self::ApparentTemperature => FeatureDomain::Environmental,
            _ => FeatureDomain::Statistical,
        }
    }

    pub fn in_domain(domain: FeatureDomain) -> impl Iterator<Item = FeatureKey> {
        Self::all()
            .iter()
            .copied()
            .filter(move |key| key.domain() == domain)
    }
}

impl fmt::Display for FeatureKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for FeatureKey {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let needle = value.trim();
        Self::all()
            .iter()
            .copied()
            .find(|key| key.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| format!("unknown feature: {value}"))
    }
}

impl Serialize for FeatureKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for FeatureKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        FeatureKey::from_str(&s).map_err(serde::de::Error::custom)
    }
}

/// Sparse mapping from feature key to value. Serializes as a flat JSON object
/// keyed by wire names, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureVector(BTreeMap<FeatureKey, f64>);

impl FeatureVector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: FeatureKey) -> Option<f64> {
        self.0.get(&key).copied()
    }

    pub fn set(&mut self, key: FeatureKey, value: f64) {
        self.0.insert(key, value);
    }

    pub fn contains(&self, key: FeatureKey) -> bool {
        self.0.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FeatureKey, f64)> + '_ {
        self.0.iter().map(|(key, value)| (*key, *value))
    }

    pub fn keys(&self) -> impl Iterator<Item = FeatureKey> + '_ {
        self.0.keys().copied()
    }

    /// Copies every field of `other` into `self`, replacing existing values.
    pub fn overlay(&mut self, other: &FeatureVector) {
        for (key, value) in other.iter() {
            self.0.insert(key, value);
        }
    }

    /// Returns a copy restricted to the given domain.
    pub fn filter_domain(&self, domain: FeatureDomain) -> FeatureVector {
        self.iter()
            .filter(|(key, _)| key.domain() == domain)
            .collect()
    }
}

impl FromIterator<(FeatureKey, f64)> for FeatureVector {
    fn from_iter<I: IntoIterator<Item = (FeatureKey, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
