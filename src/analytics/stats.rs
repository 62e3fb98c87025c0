use chrono::{DateTime, Datelike, Months, NaiveDate, TimeZone, Utc};
use std::collections::{HashMap, HashSet};

use super::report::{
    AdvancedSongStats, ArtistFrequency, ArtistStats, GeneralRelevanceStats, MaintenanceStats,
    PlaylistStats, SongStats, UserRelevanceStats,
};
use super::weights::{round1, round2};
use crate::models::{parse_release_date, PlaylistSong, Track, TopSongs};

/// A run of at least this many consecutive recently-played entries from one
/// playlist counts as a play of that playlist.
const PLAY_RUN_LENGTH: u32 = 4;

/// The date bounds every maintenance stat is measured against, derived once
/// per pass from a single reference instant so a full load is internally
/// consistent.
#[derive(Debug, Clone, Copy)]
pub struct RelevantDates {
    pub today: NaiveDate,
    pub six_months_ago: NaiveDate,
    pub two_years_ago: NaiveDate,
    /// Lower bound for the stale-song window; nothing in a streaming library
    /// predates it.
    pub library_epoch: NaiveDate,
}

impl RelevantDates {
    pub fn at(now: DateTime<Utc>) -> Self {
        let today = now.date_naive();
        Self {
            today,
            six_months_ago: today.checked_sub_months(Months::new(6)).unwrap_or(today),
            two_years_ago: today.checked_sub_months(Months::new(24)).unwrap_or(today),
            library_epoch: NaiveDate::from_ymd_opt(2000, 1, 1).unwrap_or(NaiveDate::MIN),
        }
    }
}

/// Pure stat derivation over one playlist's songs. Each function assumes a
/// non-empty list; `compute_playlist_stats` owns the empty-list short-circuit.
pub struct StatsCalculator;

impl StatsCalculator {
    /// Percentage of songs added strictly between the two dates (both bounds
    /// exclusive), one decimal.
    pub fn song_time_range_percentage(
        songs: &[PlaylistSong],
        start: NaiveDate,
        end: NaiveDate,
    ) -> f64 {
        let in_range = songs
            .iter()
            .filter(|song| {
                let added = song.added_at.date_naive();
                start < added && added < end
            })
            .count();

        round1(in_range as f64 / songs.len() as f64 * 100.0)
    }

    /// Arithmetic mean of the songs' added-at timestamps.
    pub fn average_song_date_added(songs: &[PlaylistSong]) -> DateTime<Utc> {
        let sum: i64 = songs.iter().map(|s| s.added_at.timestamp_millis()).sum();
        let avg = sum / songs.len() as i64;
        Utc.timestamp_millis_opt(avg)
            .single()
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
    }

    /// Arithmetic mean of the songs' album release dates. Unparseable release
    /// dates are skipped; `None` if no song has a usable one.
    pub fn average_song_release_date(songs: &[PlaylistSong]) -> Option<DateTime<Utc>> {
        let timestamps: Vec<i64> = songs
            .iter()
            .filter_map(|s| parse_release_date(&s.track.album.release_date))
            .filter_map(|date| date.and_hms_opt(0, 0, 0))
            .map(|dt| dt.and_utc().timestamp_millis())
            .collect();

        if timestamps.is_empty() {
            return None;
        }

        let avg = timestamps.iter().sum::<i64>() / timestamps.len() as i64;
        Utc.timestamp_millis_opt(avg).single()
    }

    /// Percentage of songs whose track appears in the given top-track list.
    pub fn most_played_percentage(songs: &[PlaylistSong], top_tracks: &[Track]) -> f64 {
        let top_ids: HashSet<&str> = top_tracks.iter().map(|t| t.id.as_str()).collect();
        let hits = songs
            .iter()
            .filter(|s| top_ids.contains(s.track.id.as_str()))
            .count();

        round1(hits as f64 / songs.len() as f64 * 100.0)
    }

    /// Percentage of songs present in the user's saved-track library.
    pub fn saved_song_percentage(songs: &[PlaylistSong], saved_songs: &[PlaylistSong]) -> f64 {
        let saved_ids: HashSet<&str> = saved_songs.iter().map(|s| s.track.id.as_str()).collect();
        let hits = songs
            .iter()
            .filter(|s| saved_ids.contains(s.track.id.as_str()))
            .count();

        round1(hits as f64 / songs.len() as f64 * 100.0)
    }

    /// Count play events of this playlist in the recently-played history.
    /// A play event is a run of at least `PLAY_RUN_LENGTH` consecutive entries
    /// belonging to the playlist; each qualifying run counts once, and the
    /// streak resets on any non-member entry.
    pub fn times_recently_played(
        songs: &[PlaylistSong],
        recently_played: &[PlaylistSong],
    ) -> u32 {
        let member_ids: HashSet<&str> = songs.iter().map(|s| s.track.id.as_str()).collect();

        let mut count = 0;
        let mut streak = 0;
        let mut counted_this_run = false;

        for entry in recently_played {
            if member_ids.contains(entry.track.id.as_str()) {
                streak += 1;
                if streak >= PLAY_RUN_LENGTH && !counted_this_run {
                    count += 1;
                    counted_this_run = true;
                }
            } else {
                streak = 0;
                counted_this_run = false;
            }
        }

        count
    }

    /// Mean track popularity (0-100), one decimal.
    pub fn average_song_popularity(songs: &[PlaylistSong]) -> f64 {
        let sum: u64 = songs.iter().map(|s| s.track.popularity as u64).sum();
        round1(sum as f64 / songs.len() as f64)
    }

    /// The most frequent primary artist, ties broken by first encounter in
    /// iteration order. With `by_count == false` the count is reported as a
    /// percentage of the playlist (one decimal).
    pub fn most_frequent_artist(songs: &[PlaylistSong], by_count: bool) -> ArtistFrequency {
        let mut frequency: HashMap<&str, usize> = HashMap::new();
        for song in songs {
            *frequency.entry(song.track.primary_artist()).or_insert(0) += 1;
        }

        // Walk the songs in order with a strictly-greater comparison so the
        // first artist to reach the top count wins ties.
        let mut best_name = "No Artists";
        let mut best_count = 0;
        for song in songs {
            let name = song.track.primary_artist();
            let count = frequency[name];
            if count > best_count {
                best_name = name;
                best_count = count;
            }
        }

        let artist_count = if by_count {
            best_count as f64
        } else {
            round1(best_count as f64 / songs.len() as f64 * 100.0)
        };

        ArtistFrequency {
            artist_name: best_name.to_string(),
            artist_count,
        }
    }

    /// Artist diversity on a 0-100 scale: richness (distinct artists over
    /// songs) discounted by the Gini concentration of the per-artist shares.
    /// Many artists spread evenly approaches 100; one dominant artist drives
    /// the score toward 0.
    pub fn artist_diversity(songs: &[PlaylistSong]) -> f64 {
        let mut frequency: HashMap<&str, usize> = HashMap::new();
        for song in songs {
            *frequency.entry(song.track.primary_artist()).or_insert(0) += 1;
        }

        let richness = frequency.len() as f64 / songs.len() as f64;
        let shares: Vec<f64> = frequency
            .values()
            .map(|&count| count as f64 / songs.len() as f64)
            .collect();
        let evenness = gini(&shares);

        round1(richness * (1.0 - evenness) * 100.0)
    }

    /// Mean song duration formatted `M:SS`.
    pub fn average_song_duration(songs: &[PlaylistSong]) -> String {
        let sum: u64 = songs.iter().map(|s| s.track.duration_ms).sum();
        let avg_seconds = sum as f64 / songs.len() as f64 / 1000.0;

        let minutes = (avg_seconds / 60.0).floor() as u64;
        let seconds = (avg_seconds % 60.0).floor() as u64;
        format!("{minutes}:{seconds:02}")
    }

    /// Population variance of song durations in minutes, two decimals.
    pub fn song_duration_variance(songs: &[PlaylistSong]) -> f64 {
        let durations: Vec<f64> = songs
            .iter()
            .map(|s| round2(s.track.duration_ms as f64 / 60_000.0))
            .collect();

        round2(population_variance(&durations))
    }

    /// Population variance of release dates in fractional years, two decimals.
    /// Songs without a parseable release date are skipped.
    pub fn song_release_date_variance(songs: &[PlaylistSong]) -> f64 {
        let years: Vec<f64> = songs
            .iter()
            .filter_map(|s| parse_release_date(&s.track.album.release_date))
            .map(|date| date.num_days_from_ce() as f64 / 365.25)
            .collect();

        if years.is_empty() {
            return 0.0;
        }

        round2(population_variance(&years))
    }

    /// Derive the full stats record for one playlist. Every stat except the
    /// song count is absent (`None`) when the playlist has no songs.
    pub fn compute_playlist_stats(
        songs: &[PlaylistSong],
        top_songs: &TopSongs,
        saved_songs: &[PlaylistSong],
        recently_played: &[PlaylistSong],
        dates: &RelevantDates,
    ) -> PlaylistStats {
        fn with_songs<T>(
            songs: &[PlaylistSong],
            f: impl FnOnce(&[PlaylistSong]) -> T,
        ) -> Option<T> {
            if songs.is_empty() { None } else { Some(f(songs)) }
        }

        PlaylistStats {
            maintenance: MaintenanceStats {
                song_count: songs.len(),
                two_year_old_percentage: with_songs(songs, |s| {
                    Self::song_time_range_percentage(s, dates.library_epoch, dates.two_years_ago)
                }),
                six_month_new_percentage: with_songs(songs, |s| {
                    Self::song_time_range_percentage(s, dates.six_months_ago, dates.today)
                }),
                avg_song_added_date: with_songs(songs, Self::average_song_date_added),
                last_song_added_date: songs.last().map(|s| s.added_at),
            },
            user_relevance: UserRelevanceStats {
                short_term_most_played_percentage: with_songs(songs, |s| {
                    Self::most_played_percentage(s, &top_songs.short_term)
                }),
                medium_term_most_played_percentage: with_songs(songs, |s| {
                    Self::most_played_percentage(s, &top_songs.medium_term)
                }),
                long_term_most_played_percentage: with_songs(songs, |s| {
                    Self::most_played_percentage(s, &top_songs.long_term)
                }),
                saved_song_percentage: with_songs(songs, |s| {
                    Self::saved_song_percentage(s, saved_songs)
                }),
                times_recently_played: with_songs(songs, |s| {
                    Self::times_recently_played(s, recently_played)
                }),
            },
            general_relevance: GeneralRelevanceStats {
                avg_song_release_date: with_songs(songs, Self::average_song_release_date)
                    .flatten(),
                avg_song_popularity: with_songs(songs, Self::average_song_popularity),
            },
            artist_stats: ArtistStats {
                artist_diversity: with_songs(songs, Self::artist_diversity),
                most_frequent_artist_by_count: with_songs(songs, |s| {
                    Self::most_frequent_artist(s, true)
                }),
                most_frequent_artist_by_percentage: with_songs(songs, |s| {
                    Self::most_frequent_artist(s, false)
                }),
            },
            song_stats: SongStats {
                avg_song_duration: with_songs(songs, Self::average_song_duration),
            },
            advanced_song_stats: AdvancedSongStats {
                song_duration_variance: with_songs(songs, Self::song_duration_variance),
                song_release_date_variance: with_songs(songs, Self::song_release_date_variance),
            },
        }
    }
}

/// Gini coefficient of a discrete distribution: 0 is a perfectly even spread,
/// 1 is maximal concentration. Standard sorted-shares definition:
/// `G = 2·Σ(i·xᵢ) / (n·Σxᵢ) − (n+1)/n` with `i` 1-based over ascending `xᵢ`.
pub fn gini(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let n = sorted.len() as f64;
    let total: f64 = sorted.iter().sum();
    if total <= 0.0 {
        return 0.0;
    }

    let rank_weighted: f64 = sorted
        .iter()
        .enumerate()
        .map(|(i, x)| (i as f64 + 1.0) * x)
        .sum();

    (2.0 * rank_weighted / (n * total) - (n + 1.0) / n).max(0.0)
}

fn population_variance(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n
}
