/// A normalization curve mapping one raw stat onto the 0-100 score scale.
///
/// Every tuning constant lives in the table at the bottom of this file, so the
/// full scoring policy is auditable in one place instead of being spread
/// across one bespoke function per stat.
#[derive(Debug, Clone, Copy)]
pub enum Curve {
    /// Full marks inside `[low, high]`, linear penalty by distance outside.
    Band { low: f64, high: f64, slope: f64 },
    /// `100 - x`, clamped. Less of the measured thing is better.
    LinearInverse,
    /// Logistic decay over elapsed days: `100 / (1 + e^(k(x - midpoint)))`.
    /// Forced to exactly 0 once `x` reaches the zero clamp, so the long tail
    /// never reports meaningless near-zero scores.
    LogisticDecay {
        k: f64,
        midpoint_days: f64,
        zero_clamp_days: f64,
    },
    /// `x * 100 / cap`, flattened to 100 at and beyond the cap.
    LinearCap { cap: f64 },
    /// The value already lives on the 0-100 scale; round and clamp.
    IdentityClamp,
    /// Ordered table of (years-elapsed limit, score); first matching bracket
    /// wins, anything past the last bracket scores 0.
    AgeBrackets { brackets: &'static [(f64, u32)] },
    /// 0 events scores 0, exactly 1 earns partial credit, 2 or more max out.
    CountStep { partial: u32 },
    /// Lower variance scores higher: `100 - normalize(x, low, high) * 100`.
    VarianceInverse { low: f64, high: f64 },
}

impl Curve {
    /// Score a raw value. Non-finite input fails closed to 0 so a malformed
    /// stat can never poison a weighted sum downstream.
    pub fn score(&self, x: f64) -> u32 {
        if !x.is_finite() {
            return 0;
        }

        let raw = match *self {
            Curve::Band { low, high, slope } => {
                if x >= low && x <= high {
                    100.0
                } else {
                    let distance = if x < low { low - x } else { x - high };
                    100.0 - slope * distance
                }
            }
            Curve::LinearInverse => 100.0 - x,
            Curve::LogisticDecay {
                k,
                midpoint_days,
                zero_clamp_days,
            } => {
                let days = x.max(0.0);
                if days >= zero_clamp_days {
                    return 0;
                }
                100.0 / (1.0 + (k * (days - midpoint_days)).exp())
            }
            Curve::LinearCap { cap } => {
                if x > cap {
                    100.0
                } else {
                    x * 100.0 / cap
                }
            }
            Curve::IdentityClamp => x,
            Curve::AgeBrackets { brackets } => {
                return brackets
                    .iter()
                    .find(|(limit, _)| x <= *limit)
                    .map(|(_, score)| *score)
                    .unwrap_or(0);
            }
            Curve::CountStep { partial } => {
                return if x > 1.0 {
                    100
                } else if x > 0.0 {
                    partial
                } else {
                    0
                };
            }
            Curve::VarianceInverse { low, high } => {
                let normalized = (x - low) / (high - low);
                100.0 - normalized * 100.0
            }
        };

        raw.round().clamp(0.0, 100.0) as u32
    }
}

// The scoring policy, one named curve per stat.

pub const SONG_COUNT: Curve = Curve::Band {
    low: 70.0,
    high: 80.0,
    slope: 2.0,
};
pub const TWO_YEAR_OLD_PERCENTAGE: Curve = Curve::LinearInverse;
pub const AVG_SONG_ADDED_DATE: Curve = Curve::LogisticDecay {
    k: 0.012,
    midpoint_days: 548.0,
    zero_clamp_days: 730.0,
};
pub const LAST_SONG_ADDED_DATE: Curve = Curve::LogisticDecay {
    k: 0.03,
    midpoint_days: 183.0,
    zero_clamp_days: 270.0,
};
pub const SHORT_TERM_MOST_PLAYED: Curve = Curve::LinearCap { cap: 20.0 };
pub const MEDIUM_TERM_MOST_PLAYED: Curve = Curve::LinearCap { cap: 25.0 };
pub const LONG_TERM_MOST_PLAYED: Curve = Curve::LinearCap { cap: 50.0 };
pub const SAVED_SONG_PERCENTAGE: Curve = Curve::IdentityClamp;
pub const TIMES_RECENTLY_PLAYED: Curve = Curve::CountStep { partial: 90 };
pub const AVG_SONG_RELEASE_DATE: Curve = Curve::AgeBrackets {
    brackets: RELEASE_AGE_BRACKETS,
};
pub const AVG_SONG_POPULARITY: Curve = Curve::IdentityClamp;
pub const ARTIST_DIVERSITY: Curve = Curve::IdentityClamp;
pub const SONG_DURATION_VARIANCE: Curve = Curve::VarianceInverse { low: 0.0, high: 1.0 };
pub const SONG_RELEASE_DATE_VARIANCE: Curve = Curve::VarianceInverse { low: 0.0, high: 1.0 };

const RELEASE_AGE_BRACKETS: &[(f64, u32)] = &[
    (5.0, 100),
    (10.0, 90),
    (20.0, 80),
    (30.0, 70),
    (40.0, 60),
    (50.0, 50),
];
