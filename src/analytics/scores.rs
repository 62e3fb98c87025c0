use chrono::{DateTime, Utc};

use super::curves::{self, Curve};
use super::report::{
    ArtistDiversityScores, GeneralRelevanceScores, MaintenanceScores, PlaylistScores,
    PlaylistStats, SongLikenessScores, UserRelevanceScores,
};
use super::weights;

const DAYS_PER_YEAR: f64 = 365.25;

/// Turns a stats record into a scores record. Holds the reference instant so
/// the date-based curves are deterministic under test.
#[derive(Debug, Clone, Copy)]
pub struct ScoreCalculator {
    now: DateTime<Utc>,
}

impl ScoreCalculator {
    pub fn new() -> Self {
        Self::at(Utc::now())
    }

    pub fn at(now: DateTime<Utc>) -> Self {
        Self { now }
    }

    fn days_since(&self, date: DateTime<Utc>) -> f64 {
        (self.now - date).num_seconds() as f64 / 86_400.0
    }

    fn years_since(&self, date: DateTime<Utc>) -> f64 {
        self.days_since(date) / DAYS_PER_YEAR
    }

    /// Absent stats score 0 across the board.
    fn score_opt(curve: Curve, value: Option<f64>) -> u32 {
        value.map(|v| curve.score(v)).unwrap_or(0)
    }

    pub fn score_song_count(count: usize) -> u32 {
        curves::SONG_COUNT.score(count as f64)
    }

    pub fn score_two_year_old_percentage(percentage: Option<f64>) -> u32 {
        Self::score_opt(curves::TWO_YEAR_OLD_PERCENTAGE, percentage)
    }

    pub fn score_avg_song_added_date(&self, date: Option<DateTime<Utc>>) -> u32 {
        Self::score_opt(curves::AVG_SONG_ADDED_DATE, date.map(|d| self.days_since(d)))
    }

    pub fn score_last_song_added_date(&self, date: Option<DateTime<Utc>>) -> u32 {
        Self::score_opt(
            curves::LAST_SONG_ADDED_DATE,
            date.map(|d| self.days_since(d)),
        )
    }

    pub fn score_short_term_most_played(percentage: Option<f64>) -> u32 {
        Self::score_opt(curves::SHORT_TERM_MOST_PLAYED, percentage)
    }

    pub fn score_medium_term_most_played(percentage: Option<f64>) -> u32 {
        Self::score_opt(curves::MEDIUM_TERM_MOST_PLAYED, percentage)
    }

    pub fn score_long_term_most_played(percentage: Option<f64>) -> u32 {
        Self::score_opt(curves::LONG_TERM_MOST_PLAYED, percentage)
    }

    pub fn score_saved_song_percentage(percentage: Option<f64>) -> u32 {
        Self::score_opt(curves::SAVED_SONG_PERCENTAGE, percentage)
    }

    pub fn score_times_recently_played(times: Option<u32>) -> u32 {
        Self::score_opt(curves::TIMES_RECENTLY_PLAYED, times.map(f64::from))
    }

    pub fn score_avg_song_release_date(&self, date: Option<DateTime<Utc>>) -> u32 {
        Self::score_opt(
            curves::AVG_SONG_RELEASE_DATE,
            date.map(|d| self.years_since(d)),
        )
    }

    pub fn score_avg_song_popularity(popularity: Option<f64>) -> u32 {
        Self::score_opt(curves::AVG_SONG_POPULARITY, popularity)
    }

    pub fn score_artist_diversity(diversity: Option<f64>) -> u32 {
        Self::score_opt(curves::ARTIST_DIVERSITY, diversity)
    }

    pub fn score_song_duration_variance(variance: Option<f64>) -> u32 {
        Self::score_opt(curves::SONG_DURATION_VARIANCE, variance)
    }

    pub fn score_song_release_date_variance(variance: Option<f64>) -> u32 {
        Self::score_opt(curves::SONG_RELEASE_DATE_VARIANCE, variance)
    }

    pub fn total_maintenance_score(scores: &MaintenanceScores) -> f64 {
        weights::weighted_mean(
            &[
                scores.song_count_score as f64,
                scores.two_year_old_percentage_score as f64,
                scores.avg_song_added_date_score as f64,
                scores.last_song_added_date_score as f64,
            ],
            &weights::MAINTENANCE,
        )
    }

    pub fn total_user_relevance_score(scores: &UserRelevanceScores) -> f64 {
        weights::weighted_mean(
            &[
                scores.short_term_most_played_percentage_score as f64,
                scores.medium_term_most_played_percentage_score as f64,
                scores.long_term_most_played_percentage_score as f64,
                scores.saved_song_percentage_score as f64,
                scores.times_recently_played_score as f64,
            ],
            &weights::USER_RELEVANCE,
        )
    }

    pub fn total_general_relevance_score(scores: &GeneralRelevanceScores) -> f64 {
        weights::weighted_mean(
            &[
                scores.avg_song_release_date_score as f64,
                scores.avg_song_popularity_score as f64,
            ],
            &weights::GENERAL_RELEVANCE,
        )
    }

    pub fn total_artist_diversity_score(scores: &ArtistDiversityScores) -> f64 {
        weights::weighted_mean(
            &[scores.artist_diversity_score as f64],
            &weights::ARTIST_DIVERSITY,
        )
    }

    pub fn total_song_likeness_score(scores: &SongLikenessScores) -> f64 {
        weights::weighted_mean(
            &[
                scores.song_duration_variance_score as f64,
                scores.song_release_date_variance_score as f64,
            ],
            &weights::SONG_LIKENESS,
        )
    }

    pub fn total_score(scores: &PlaylistScores) -> f64 {
        weights::weighted_mean(
            &[
                scores.maintenance_scores.total_maintenance_score,
                scores.user_relevance_scores.total_user_relevance_score,
                scores.general_relevance_scores.total_general_relevance_score,
                scores.artist_diversity_scores.total_artist_diversity_score,
                scores.song_likeness_scores.total_song_likeness_score,
            ],
            &weights::OVERALL,
        )
    }

    /// Score every stat, then fill in the category totals and overall total.
    pub fn score_playlist(&self, stats: &PlaylistStats) -> PlaylistScores {
        let mut maintenance_scores = MaintenanceScores {
            song_count_score: Self::score_song_count(stats.maintenance.song_count),
            two_year_old_percentage_score: Self::score_two_year_old_percentage(
                stats.maintenance.two_year_old_percentage,
            ),
            avg_song_added_date_score: self
                .score_avg_song_added_date(stats.maintenance.avg_song_added_date),
            last_song_added_date_score: self
                .score_last_song_added_date(stats.maintenance.last_song_added_date),
            total_maintenance_score: 0.0,
        };
        maintenance_scores.total_maintenance_score =
            Self::total_maintenance_score(&maintenance_scores);

        let mut user_relevance_scores = UserRelevanceScores {
            short_term_most_played_percentage_score: Self::score_short_term_most_played(
                stats.user_relevance.short_term_most_played_percentage,
            ),
            medium_term_most_played_percentage_score: Self::score_medium_term_most_played(
                stats.user_relevance.medium_term_most_played_percentage,
            ),
            long_term_most_played_percentage_score: Self::score_long_term_most_played(
                stats.user_relevance.long_term_most_played_percentage,
            ),
            saved_song_percentage_score: Self::score_saved_song_percentage(
                stats.user_relevance.saved_song_percentage,
            ),
            times_recently_played_score: Self::score_times_recently_played(
                stats.user_relevance.times_recently_played,
            ),
            total_user_relevance_score: 0.0,
        };
        user_relevance_scores.total_user_relevance_score =
            Self::total_user_relevance_score(&user_relevance_scores);

        let mut general_relevance_scores = GeneralRelevanceScores {
            avg_song_release_date_score: self
                .score_avg_song_release_date(stats.general_relevance.avg_song_release_date),
            avg_song_popularity_score: Self::score_avg_song_popularity(
                stats.general_relevance.avg_song_popularity,
            ),
            total_general_relevance_score: 0.0,
        };
        general_relevance_scores.total_general_relevance_score =
            Self::total_general_relevance_score(&general_relevance_scores);

        let mut artist_diversity_scores = ArtistDiversityScores {
            artist_diversity_score: Self::score_artist_diversity(
                stats.artist_stats.artist_diversity,
            ),
            total_artist_diversity_score: 0.0,
        };
        artist_diversity_scores.total_artist_diversity_score =
            Self::total_artist_diversity_score(&artist_diversity_scores);

        let mut song_likeness_scores = SongLikenessScores {
            song_duration_variance_score: Self::score_song_duration_variance(
                stats.advanced_song_stats.song_duration_variance,
            ),
            song_release_date_variance_score: Self::score_song_release_date_variance(
                stats.advanced_song_stats.song_release_date_variance,
            ),
            total_song_likeness_score: 0.0,
        };
        song_likeness_scores.total_song_likeness_score =
            Self::total_song_likeness_score(&song_likeness_scores);

        let mut scores = PlaylistScores {
            maintenance_scores,
            user_relevance_scores,
            general_relevance_scores,
            artist_diversity_scores,
            song_likeness_scores,
            total_score: 0.0,
        };
        scores.total_score = Self::total_score(&scores);
        scores
    }
}

impl Default for ScoreCalculator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::report::{
        AdvancedSongStats, ArtistStats, GeneralRelevanceStats, MaintenanceStats, SongStats,
        UserRelevanceStats,
    };
    use approx::assert_relative_eq;

    fn fixed_now() -> DateTime<Utc> {
        "2025-06-01T00:00:00Z".parse().unwrap()
    }

    fn empty_stats() -> PlaylistStats {
        PlaylistStats {
            maintenance: MaintenanceStats {
                song_count: 0,
                two_year_old_percentage: None,
                six_month_new_percentage: None,
                avg_song_added_date: None,
                last_song_added_date: None,
            },
            user_relevance: UserRelevanceStats {
                short_term_most_played_percentage: None,
                medium_term_most_played_percentage: None,
                long_term_most_played_percentage: None,
                saved_song_percentage: None,
                times_recently_played: None,
            },
            general_relevance: GeneralRelevanceStats {
                avg_song_release_date: None,
                avg_song_popularity: None,
            },
            artist_stats: ArtistStats {
                artist_diversity: None,
                most_frequent_artist_by_count: None,
                most_frequent_artist_by_percentage: None,
            },
            song_stats: SongStats {
                avg_song_duration: None,
            },
            advanced_song_stats: AdvancedSongStats {
                song_duration_variance: None,
                song_release_date_variance: None,
            },
        }
    }

    #[test]
    fn test_absent_stats_score_zero() {
        let calc = ScoreCalculator::at(fixed_now());
        assert_eq!(ScoreCalculator::score_two_year_old_percentage(None), 0);
        assert_eq!(calc.score_avg_song_added_date(None), 0);
        assert_eq!(calc.score_last_song_added_date(None), 0);
        assert_eq!(ScoreCalculator::score_short_term_most_played(None), 0);
        assert_eq!(ScoreCalculator::score_saved_song_percentage(None), 0);
        assert_eq!(ScoreCalculator::score_times_recently_played(None), 0);
        assert_eq!(calc.score_avg_song_release_date(None), 0);
        assert_eq!(ScoreCalculator::score_avg_song_popularity(None), 0);
        assert_eq!(ScoreCalculator::score_artist_diversity(None), 0);
        assert_eq!(ScoreCalculator::score_song_duration_variance(None), 0);
        assert_eq!(ScoreCalculator::score_song_release_date_variance(None), 0);
    }

    #[test]
    fn test_date_scores_against_fixed_clock() {
        let calc = ScoreCalculator::at(fixed_now());

        // Added yesterday: effectively fresh.
        let yesterday = "2025-05-31T00:00:00Z".parse().unwrap();
        assert_eq!(calc.score_last_song_added_date(Some(yesterday)), 100);

        // Exactly 183 days ago is the logistic midpoint.
        let midpoint = "2024-11-30T00:00:00Z".parse().unwrap();
        assert_eq!(calc.score_last_song_added_date(Some(midpoint)), 50);

        // Past the two-year clamp the average-added score bottoms out.
        let ancient = "2022-01-01T00:00:00Z".parse().unwrap();
        assert_eq!(calc.score_avg_song_added_date(Some(ancient)), 0);

        // Release date three years back lands in the freshest age bracket.
        let recent_release = "2022-06-01T00:00:00Z".parse().unwrap();
        assert_eq!(calc.score_avg_song_release_date(Some(recent_release)), 100);

        // A 1970s release falls past the last bracket.
        let vintage_release = "1972-01-01T00:00:00Z".parse().unwrap();
        assert_eq!(calc.score_avg_song_release_date(Some(vintage_release)), 0);
    }

    #[test]
    fn test_category_totals_at_endpoints() {
        let maxed = MaintenanceScores {
            song_count_score: 100,
            two_year_old_percentage_score: 100,
            avg_song_added_date_score: 100,
            last_song_added_date_score: 100,
            total_maintenance_score: 0.0,
        };
        assert_relative_eq!(ScoreCalculator::total_maintenance_score(&maxed), 100.0);

        let zeroed = UserRelevanceScores {
            short_term_most_played_percentage_score: 0,
            medium_term_most_played_percentage_score: 0,
            long_term_most_played_percentage_score: 0,
            saved_song_percentage_score: 0,
            times_recently_played_score: 0,
            total_user_relevance_score: 0.0,
        };
        assert_relative_eq!(ScoreCalculator::total_user_relevance_score(&zeroed), 0.0);
    }

    #[test]
    fn test_general_relevance_weighting() {
        // Release date weighs a third, popularity two thirds:
        // 100/3 + 2*60/3 = 73.33..., one decimal.
        let scores = GeneralRelevanceScores {
            avg_song_release_date_score: 100,
            avg_song_popularity_score: 60,
            total_general_relevance_score: 0.0,
        };
        assert_relative_eq!(
            ScoreCalculator::total_general_relevance_score(&scores),
            73.3
        );
    }

    #[test]
    fn test_empty_playlist_scores_all_zero() {
        let calc = ScoreCalculator::at(fixed_now());
        let scores = calc.score_playlist(&empty_stats());

        assert_eq!(scores.maintenance_scores.song_count_score, 0);
        assert_relative_eq!(scores.maintenance_scores.total_maintenance_score, 0.0);
        assert_relative_eq!(
            scores.user_relevance_scores.total_user_relevance_score,
            0.0
        );
        assert_relative_eq!(
            scores.general_relevance_scores.total_general_relevance_score,
            0.0
        );
        assert_relative_eq!(
            scores.artist_diversity_scores.total_artist_diversity_score,
            0.0
        );
        assert_relative_eq!(scores.song_likeness_scores.total_song_likeness_score, 0.0);
        assert_relative_eq!(scores.total_score, 0.0);
    }

    #[test]
    fn test_healthy_playlist_scores_full_marks() {
        let calc = ScoreCalculator::at(fixed_now());
        let mut stats = empty_stats();
        stats.maintenance.song_count = 75;
        stats.maintenance.two_year_old_percentage = Some(0.0);
        stats.maintenance.avg_song_added_date = Some("2025-05-01T00:00:00Z".parse().unwrap());
        stats.maintenance.last_song_added_date = Some("2025-05-28T00:00:00Z".parse().unwrap());
        stats.user_relevance.short_term_most_played_percentage = Some(25.0);
        stats.user_relevance.medium_term_most_played_percentage = Some(30.0);
        stats.user_relevance.long_term_most_played_percentage = Some(55.0);
        stats.user_relevance.saved_song_percentage = Some(100.0);
        stats.user_relevance.times_recently_played = Some(3);
        stats.general_relevance.avg_song_release_date =
            Some("2023-01-01T00:00:00Z".parse().unwrap());
        stats.general_relevance.avg_song_popularity = Some(100.0);
        stats.artist_stats.artist_diversity = Some(100.0);
        stats.advanced_song_stats.song_duration_variance = Some(0.0);
        stats.advanced_song_stats.song_release_date_variance = Some(0.0);

        let scores = calc.score_playlist(&stats);
        assert_relative_eq!(scores.total_score, 100.0);
    }

    #[test]
    fn test_total_score_preserves_uniform_categories() {
        let calc = ScoreCalculator::at(fixed_now());
        let mut stats = empty_stats();
        // Saved percentage maps through the identity curve; everything else 0.
        stats.user_relevance.saved_song_percentage = Some(70.0);
        let scores = calc.score_playlist(&stats);

        // savedSong weighs 5/35 of user relevance: 70 * 5/35 = 10.0.
        assert_relative_eq!(
            scores.user_relevance_scores.total_user_relevance_score,
            10.0
        );
        // User relevance weighs 0.35 overall: 10.0 * 0.35 = 3.5.
        assert_relative_eq!(scores.total_score, 3.5);
    }
}
