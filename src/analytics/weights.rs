//! The fixed aggregation weights. These are design constants, not
//! configuration: every category total is a weighted mean of its sub-scores,
//! and the overall total is a weighted mean of the five category totals.

/// songCount, twoYearOldPercentage, avgSongAddedDate, lastSongAddedDate.
pub const MAINTENANCE: [f64; 4] = [10.0 / 35.0, 10.0 / 35.0, 10.0 / 35.0, 5.0 / 35.0];

/// shortTerm, mediumTerm, longTerm, savedSongPercentage, timesRecentlyPlayed.
pub const USER_RELEVANCE: [f64; 5] = [
    10.0 / 35.0,
    10.0 / 35.0,
    5.0 / 35.0,
    5.0 / 35.0,
    5.0 / 35.0,
];

/// avgSongReleaseDate, avgSongPopularity.
pub const GENERAL_RELEVANCE: [f64; 2] = [1.0 / 3.0, 2.0 / 3.0];

/// artistDiversity is the category's only input.
pub const ARTIST_DIVERSITY: [f64; 1] = [1.0];

/// songDurationVariance, songReleaseDateVariance.
pub const SONG_LIKENESS: [f64; 2] = [0.5, 0.5];

/// maintenance, userRelevance, generalRelevance, artistDiversity, songLikeness.
pub const OVERALL: [f64; 5] = [0.35, 0.35, 0.10, 0.10, 0.10];

/// Weighted mean of sub-scores, rounded to one decimal place.
pub fn weighted_mean(scores: &[f64], weights: &[f64]) -> f64 {
    debug_assert_eq!(scores.len(), weights.len());
    round1(scores.iter().zip(weights).map(|(s, w)| s * w).sum())
}

/// Round to one decimal place, half away from zero.
pub fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

/// Round to two decimal places, half away from zero.
pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
