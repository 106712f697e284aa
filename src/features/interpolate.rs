use super::{FeatureProfile, FeatureVector};

/// Linear per-field interpolation between two profiles.
///
/// `t` is clamped to `[0, 1]` (NaN is treated as 0). Only fields present in
/// both profiles appear in the result. At the endpoints the profile values are
/// returned exactly rather than recomputed, so `t == 1` reproduces `end` with
/// no floating-point drift.
pub fn interpolate(start: &FeatureProfile, end: &FeatureProfile, t: f64) -> FeatureVector {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };

    start
        .values
        .iter()
        .filter_map(|(key, from)| {
            let to = end.values.get(key)?;
            let value = if t == 0.0 {
                from
            } else if t == 1.0 {
                to
            } else {
                from + (to - from) * t
            };
            Some((key, value))
        })
        .collect()
}
