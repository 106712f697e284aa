use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Channel-wise linear blend, `t` clamped to `[0, 1]`.
    pub fn lerp(a: Rgb, b: Rgb, t: f64) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let channel = |x: u8, y: u8| -> u8 {
            (x as f64 + (y as f64 - x as f64) * t)
                .round()
                .clamp(0.0, 255.0) as u8
        };
        Rgb {
            r: channel(a.r, b.r),
            g: channel(a.g, b.g),
            b: channel(a.b, b.b),
        }
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Largest absolute per-channel difference.
    pub fn max_channel_delta(&self, other: &Rgb) -> u8 {
        [
            self.r.abs_diff(other.r),
            self.g.abs_diff(other.g),
            self.b.abs_diff(other.b),
        ]
        .into_iter()
        .max()
        .unwrap_or(0)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorStop {
    pub at: f64,
    pub color: Rgb,
}

pub const SAFE_COLOR: Rgb = Rgb::new(34, 197, 94);
pub const CAUTION_COLOR: Rgb = Rgb::new(234, 179, 8);
pub const DANGER_COLOR: Rgb = Rgb::new(249, 115, 22);
pub const CRITICAL_COLOR: Rgb = Rgb::new(220, 38, 38);

const DEFAULT_STOPS: [ColorStop; 4] = [
    ColorStop { at: 0.0, color: SAFE_COLOR },
    ColorStop { at: 0.35, color: CAUTION_COLOR },
    ColorStop { at: 0.65, color: DANGER_COLOR },
    ColorStop { at: 1.0, color: CRITICAL_COLOR },
];

/// Ordered green→yellow→orange→red stops spanning `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskPalette {
    stops: Vec<ColorStop>,
}

impl RiskPalette {
    pub fn new(stops: Vec<ColorStop>) -> Result<Self, String> {
        if stops.len() < 2 {
            return Err("risk palette needs at least two stops".to_string());
        }
        if stops.iter().any(|stop| !stop.at.is_finite()) {
            return Err("risk palette stops must be finite".to_string());
        }
        if stops.windows(2).any(|pair| pair[1].at <= pair[0].at) {
            return Err("risk palette stops must be strictly increasing".to_string());
        }
        let first = stops[0].at;
        let last = stops[stops.len() - 1].at;
        if first != 0.0 || last != 1.0 {
            return Err(format!(
                "risk palette must span [0, 1], got [{first}, {last}]"
            ));
        }
        Ok(Self { stops })
    }

    pub fn stops(&self) -> &[ColorStop] {
        &self.stops
    }

    pub fn safe(&self) -> Rgb {
        self.stops[0].color
    }

    pub fn critical(&self) -> Rgb {
        self.stops[self.stops.len() - 1].color
    }

    /// Maps a score to a color. NaN maps to the safe end; infinities and
    /// out-of-range values clamp to the nearest end.
    pub fn color_for(&self, score: f64) -> Rgb {
        let score = if score.is_nan() {
            0.0
        } else {
            score.clamp(0.0, 1.0)
        };

        for pair in self.stops.windows(2) {
            let (lo, hi) = (pair[0], pair[1]);
            if score <= hi.at {
                let t = (score - lo.at) / (hi.at - lo.at);
                return Rgb::lerp(lo.color, hi.color, t);
            }
        }
        self.critical()
    }
}

impl Default for RiskPalette {
    fn default() -> Self {
        Self {
            stops: DEFAULT_STOPS.to_vec(),
        }
    }
}

/// Display color for a risk score using the default palette.
pub fn risk_color(score: f64) -> Rgb {
    RiskPalette::default().color_for(score)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAX_STEP_DELTA: u8 = 8;

    #[test]
    fn test_defined_for_edge_inputs() {
        let inputs = [
            f64::NEG_INFINITY,
            -0.5,
            0.0,
            0.001,
            0.5,
            0.999,
            1.0,
            1.5,
            f64::INFINITY,
            f64::NAN,
        ];
        for input in inputs {
            let color = risk_color(input);
            assert_eq!(color.to_hex().len(), 7, "input {input}");
        }
    }

    #[test]
    fn test_endpoints_match_configured_stops() {
        assert_eq!(risk_color(0.0), SAFE_COLOR);
        assert_eq!(risk_color(1.0), CRITICAL_COLOR);
        assert_eq!(risk_color(-0.5), SAFE_COLOR);
        assert_eq!(risk_color(f64::NEG_INFINITY), SAFE_COLOR);
        assert_eq!(risk_color(1.5), CRITICAL_COLOR);
        assert_eq!(risk_color(f64::INFINITY), CRITICAL_COLOR);
    }

    #[test]
    fn test_nan_maps_to_safe_end() {
        assert_eq!(risk_color(f64::NAN), SAFE_COLOR);
    }

    #[test]
    fn test_interior_stops_are_hit() {
        assert_eq!(risk_color(0.35), CAUTION_COLOR);
        assert_eq!(risk_color(0.65), DANGER_COLOR);
    }

    #[test]
    fn test_small_score_steps_give_small_color_steps() {
        let a = risk_color(0.2);
        let b = risk_color(0.21);
        assert!(a.max_channel_delta(&b) <= MAX_STEP_DELTA);

        for step in 0..100 {
            let lo = risk_color(step as f64 / 100.0);
            let hi = risk_color((step + 1) as f64 / 100.0);
            assert!(
                lo.max_channel_delta(&hi) <= MAX_STEP_DELTA,
                "jump between {step} and {}: {lo} -> {hi}",
                step + 1
            );
        }
    }

    #[test]
    fn test_green_channel_never_rises_with_score() {
        let mut previous = risk_color(0.0);
        for step in 1..=200 {
            let current = risk_color(step as f64 / 200.0);
            assert!(current.g <= previous.g, "green rose at {step}");
            previous = current;
        }
    }

    #[test]
    fn test_palette_rejects_bad_stops() {
        assert!(RiskPalette::new(vec![ColorStop { at: 0.0, color: SAFE_COLOR }]).is_err());
        assert!(RiskPalette::new(vec![
            ColorStop { at: 0.0, color: SAFE_COLOR },
            ColorStop { at: 0.8, color: CRITICAL_COLOR },
        ])
        .is_err());
        assert!(RiskPalette::new(vec![
            ColorStop { at: 0.0, color: SAFE_COLOR },
            ColorStop { at: 0.5, color: CAUTION_COLOR },
            ColorStop { at: 0.5, color: DANGER_COLOR },
            ColorStop { at: 1.0, color: CRITICAL_COLOR },
        ])
        .is_err());

        let two_stop = RiskPalette::new(vec![
            ColorStop { at: 0.0, color: SAFE_COLOR },
            ColorStop { at: 1.0, color: CRITICAL_COLOR },
        ])
        .unwrap();
        assert_eq!(two_stop.safe(), SAFE_COLOR);
        assert_eq!(two_stop.critical(), CRITICAL_COLOR);
    }

    #[test]
    fn test_hex_format() {
        assert_eq!(Rgb::new(255, 0, 16).to_hex(), "#ff0010");
    }
}
