use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::models::{Playlist, PlaylistSong};

/// The most frequent primary artist in a playlist. `artist_count` is an
/// occurrence count or a percentage of the playlist, depending on how the
/// stat was requested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtistFrequency {
    #[serde(rename = "artistName")]
    pub artist_name: String,
    #[serde(rename = "artistCount")]
    pub artist_count: f64,
}

impl fmt::Display for ArtistFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.artist_name, self.artist_count)
    }
}

/// Raw facts about one playlist, grouped into the six stat categories.
/// A `None` leaf means the playlist had no songs to compute it from and is
/// rendered as `"N/A"`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistStats {
    pub maintenance: MaintenanceStats,
    #[serde(rename = "userRelevance")]
    pub user_relevance: UserRelevanceStats,
    #[serde(rename = "generalRelevance")]
    pub general_relevance: GeneralRelevanceStats,
    #[serde(rename = "artistStats")]
    pub artist_stats: ArtistStats,
    #[serde(rename = "songStats")]
    pub song_stats: SongStats,
    #[serde(rename = "advancedSongStats")]
    pub advanced_song_stats: AdvancedSongStats,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaintenanceStats {
    #[serde(rename = "songCount")]
    pub song_count: usize,
    #[serde(rename = "twoYearOldPercentage")]
    pub two_year_old_percentage: Option<f64>,
    #[serde(rename = "sixMonthNewPercentage")]
    pub six_month_new_percentage: Option<f64>,
    #[serde(rename = "avgSongAddedDate")]
    pub avg_song_added_date: Option<DateTime<Utc>>,
    #[serde(rename = "lastSongAddedDate")]
    pub last_song_added_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRelevanceStats {
    #[serde(rename = "shortTermMostPlayedPercentage")]
    pub short_term_most_played_percentage: Option<f64>,
    #[serde(rename = "mediumTermMostPlayedPercentage")]
    pub medium_term_most_played_percentage: Option<f64>,
    #[serde(rename = "longTermMostPlayedPercentage")]
    pub long_term_most_played_percentage: Option<f64>,
    #[serde(rename = "savedSongPercentage")]
    pub saved_song_percentage: Option<f64>,
    #[serde(rename = "timesRecentlyPlayed")]
    pub times_recently_played: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralRelevanceStats {
    #[serde(rename = "avgSongReleaseDate")]
    pub avg_song_release_date: Option<DateTime<Utc>>,
    #[serde(rename = "avgSongPopularity")]
    pub avg_song_popularity: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtistStats {
    #[serde(rename = "artistDiversity")]
    pub artist_diversity: Option<f64>,
    #[serde(rename = "mostFrequentArtistByCount")]
    pub most_frequent_artist_by_count: Option<ArtistFrequency>,
    #[serde(rename = "mostFrequentArtistByPercentage")]
    pub most_frequent_artist_by_percentage: Option<ArtistFrequency>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SongStats {
    /// Average duration formatted `M:SS`.
    #[serde(rename = "avgSongDuration")]
    pub avg_song_duration: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvancedSongStats {
    #[serde(rename = "songDurationVariance")]
    pub song_duration_variance: Option<f64>,
    #[serde(rename = "songReleaseDateVariance")]
    pub song_release_date_variance: Option<f64>,
}

/// Normalized 0-100 scores mirroring the stats shape, with fixed-weight
/// category totals and one overall total, all totals at one decimal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistScores {
    #[serde(rename = "maintenanceScores")]
    pub maintenance_scores: MaintenanceScores,
    #[serde(rename = "userRelevanceScores")]
    pub user_relevance_scores: UserRelevanceScores,
    #[serde(rename = "generalRelevanceScores")]
    pub general_relevance_scores: GeneralRelevanceScores,
    #[serde(rename = "artistDiversityScores")]
    pub artist_diversity_scores: ArtistDiversityScores,
    #[serde(rename = "songLikenessScores")]
    pub song_likeness_scores: SongLikenessScores,
    #[serde(rename = "totalScore")]
    pub total_score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaintenanceScores {
    #[serde(rename = "songCountScore")]
    pub song_count_score: u32,
    #[serde(rename = "twoYearOldPercentageScore")]
    pub two_year_old_percentage_score: u32,
    #[serde(rename = "avgSongAddedDateScore")]
    pub avg_song_added_date_score: u32,
    #[serde(rename = "lastSongAddedDateScore")]
    pub last_song_added_date_score: u32,
    #[serde(rename = "totalMaintenanceScore")]
    pub total_maintenance_score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRelevanceScores {
    #[serde(rename = "shortTermMostPlayedPercentageScore")]
    pub short_term_most_played_percentage_score: u32,
    #[serde(rename = "mediumTermMostPlayedPercentageScore")]
    pub medium_term_most_played_percentage_score: u32,
    #[serde(rename = "longTermMostPlayedPercentageScore")]
    pub long_term_most_played_percentage_score: u32,
    #[serde(rename = "savedSongPercentageScore")]
    pub saved_song_percentage_score: u32,
    #[serde(rename = "timesRecentlyPlayedScore")]
    pub times_recently_played_score: u32,
    #[serde(rename = "totalUserRelevanceScore")]
    pub total_user_relevance_score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralRelevanceScores {
    #[serde(rename = "avgSongReleaseDateScore")]
    pub avg_song_release_date_score: u32,
    #[serde(rename = "avgSongPopularityScore")]
    pub avg_song_popularity_score: u32,
    #[serde(rename = "totalGeneralRelevanceScore")]
    pub total_general_relevance_score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtistDiversityScores {
    #[serde(rename = "artistDiversityScore")]
    pub artist_diversity_score: u32,
    #[serde(rename = "totalArtistDiversityScore")]
    pub total_artist_diversity_score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SongLikenessScores {
    #[serde(rename = "songDurationVarianceScore")]
    pub song_duration_variance_score: u32,
    #[serde(rename = "songReleaseDateVarianceScore")]
    pub song_release_date_variance_score: u32,
    #[serde(rename = "totalSongLikenessScore")]
    pub total_song_likeness_score: f64,
}

/// A name paired with how many times it appeared across all playlists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaCount {
    pub name: String,
    pub count: usize,
}

impl fmt::Display for MediaCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.count)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopPlaylist {
    pub name: String,
    pub score: f64,
}

impl fmt::Display for TopPlaylist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.score)
    }
}

/// Statistics aggregated across every playlist. Each field degrades to `None`
/// independently when its inputs are missing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaStats {
    #[serde(rename = "profilePicUrl")]
    pub profile_pic_url: Option<String>,
    pub username: Option<String>,
    #[serde(rename = "playlistCount")]
    pub playlist_count: usize,
    #[serde(rename = "savedSongCount")]
    pub saved_song_count: usize,
    #[serde(rename = "mostPopularArtist")]
    pub most_popular_artist: Option<MediaCount>,
    #[serde(rename = "mostPopularSong")]
    pub most_popular_song: Option<MediaCount>,
    #[serde(rename = "highestScoringPlaylist")]
    pub highest_scoring_playlist: Option<TopPlaylist>,
    #[serde(rename = "averageTotalScore")]
    pub average_total_score: Option<f64>,
}

/// Everything a full analysis pass hands to the presentation layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzedLibrary {
    pub playlists: Vec<Playlist>,
    #[serde(rename = "playlistSongs")]
    pub playlist_songs: HashMap<String, Vec<PlaylistSong>>,
    #[serde(rename = "playlistStats")]
    pub playlist_stats: HashMap<String, PlaylistStats>,
    #[serde(rename = "playlistScores")]
    pub playlist_scores: HashMap<String, PlaylistScores>,
    #[serde(rename = "metaStats")]
    pub meta_stats: MetaStats,
}

/// Result of a single-playlist refresh. The caller merges this fragment into
/// its own state; nothing else is recomputed.
#[derive(Debug, Clone)]
pub struct PlaylistRefresh {
    pub songs: Vec<PlaylistSong>,
    pub stats: PlaylistStats,
    pub scores: PlaylistScores,
}

/// Render an optional stat, using the `"N/A"` sentinel for absent values.
pub fn display_or_na<T: fmt::Display>(value: &Option<T>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => "N/A".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_or_na() {
        assert_eq!(display_or_na(&Some(42.5)), "42.5");
        assert_eq!(display_or_na::<f64>(&None), "N/A");
    }

    #[test]
    fn test_artist_frequency_display() {
        let by_count = ArtistFrequency {
            artist_name: "Artist A".to_string(),
            artist_count: 3.0,
        };
        assert_eq!(by_count.to_string(), "Artist A: 3");

        let by_percentage = ArtistFrequency {
            artist_name: "Artist A".to_string(),
            artist_count: 37.5,
        };
        assert_eq!(by_percentage.to_string(), "Artist A: 37.5");
    }
}
