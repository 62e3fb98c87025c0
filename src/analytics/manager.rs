use rayon::prelude::*;
use std::collections::{HashMap, HashSet};
use std::fmt;
use tracing::{debug, info};

use super::report::{
    AnalyzedLibrary, MediaCount, MetaStats, PlaylistRefresh, PlaylistScores, PlaylistStats,
    TopPlaylist,
};
use super::scores::ScoreCalculator;
use super::stats::{RelevantDates, StatsCalculator};
use super::weights::round2;
use crate::models::{Library, Playlist, PlaylistSong, TopSongs, UserProfile};
use chrono::{DateTime, Utc};

/// Where a load pass currently stands. Purely observational; nothing branches
/// on it except progress reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadPhase {
    Idle,
    Fetching,
    Decorating,
    ComputingStats,
    ComputingScores,
    ComputingMeta,
    Ready,
    Failed,
}

impl fmt::Display for LoadPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LoadPhase::Idle => "idle",
            LoadPhase::Fetching => "fetching",
            LoadPhase::Decorating => "decorating",
            LoadPhase::ComputingStats => "computing stats",
            LoadPhase::ComputingScores => "computing scores",
            LoadPhase::ComputingMeta => "computing meta stats",
            LoadPhase::Ready => "ready",
            LoadPhase::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Track id sets for each top-songs horizon, built once per pass so the
/// decoration stage does set lookups instead of list scans.
pub struct TopSongIds {
    short_term: HashSet<String>,
    medium_term: HashSet<String>,
    long_term: HashSet<String>,
}

impl TopSongIds {
    pub fn from_top_songs(top_songs: &TopSongs) -> Self {
        fn ids(tracks: &[crate::models::Track]) -> HashSet<String> {
            tracks.iter().map(|t| t.id.clone()).collect()
        }
        Self {
            short_term: ids(&top_songs.short_term),
            medium_term: ids(&top_songs.medium_term),
            long_term: ids(&top_songs.long_term),
        }
    }
}

/// Set the membership flags on every song. Pure assignment, so running it
/// twice over the same inputs is a no-op.
pub fn decorate_songs(
    mut songs: Vec<PlaylistSong>,
    saved_ids: &HashSet<String>,
    top_ids: &TopSongIds,
) -> Vec<PlaylistSong> {
    for song in &mut songs {
        song.is_saved = saved_ids.contains(&song.track.id);
        song.is_top_short_term = top_ids.short_term.contains(&song.track.id);
        song.is_top_medium_term = top_ids.medium_term.contains(&song.track.id);
        song.is_top_long_term = top_ids.long_term.contains(&song.track.id);
    }
    songs
}

/// Drives a full analysis pass: decorate songs, fan stats and scores out per
/// playlist, then aggregate the cross-playlist meta stats.
pub struct PlaylistDataManager {
    scores: ScoreCalculator,
    dates: RelevantDates,
    phase: LoadPhase,
}

impl PlaylistDataManager {
    pub fn new() -> Self {
        Self::at(Utc::now())
    }

    /// Pin the reference instant; every date-relative stat and score in the
    /// pass is measured against it.
    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            scores: ScoreCalculator::at(now),
            dates: RelevantDates::at(now),
            phase: LoadPhase::Idle,
        }
    }

    pub fn phase(&self) -> LoadPhase {
        self.phase
    }

    /// The caller is about to hand us a library it is still assembling.
    pub fn mark_fetching(&mut self) {
        self.enter(LoadPhase::Fetching);
    }

    /// The load could not complete; the manager holds no partial results.
    pub fn mark_failed(&mut self) {
        self.enter(LoadPhase::Failed);
    }

    fn enter(&mut self, next: LoadPhase) {
        debug!(phase = %next, "load phase");
        self.phase = next;
    }

    /// Run the full pass over an assembled library.
    pub fn analyze(&mut self, library: Library) -> AnalyzedLibrary {
        let Library {
            playlists,
            playlist_songs,
            top_songs,
            saved_songs,
            recently_played_songs,
            user_profile,
        } = library;

        self.enter(LoadPhase::Decorating);
        let saved_ids: HashSet<String> =
            saved_songs.iter().map(|s| s.track.id.clone()).collect();
        let top_ids = TopSongIds::from_top_songs(&top_songs);
        let playlist_songs: HashMap<String, Vec<PlaylistSong>> = playlist_songs
            .into_iter()
            .map(|(id, songs)| (id, decorate_songs(songs, &saved_ids, &top_ids)))
            .collect();

        self.enter(LoadPhase::ComputingStats);
        let playlist_stats: HashMap<String, PlaylistStats> = playlist_songs
            .par_iter()
            .map(|(id, songs)| {
                let stats = StatsCalculator::compute_playlist_stats(
                    songs,
                    &top_songs,
                    &saved_songs,
                    &recently_played_songs,
                    &self.dates,
                );
                (id.clone(), stats)
            })
            .collect();

        self.enter(LoadPhase::ComputingScores);
        let playlist_scores: HashMap<String, PlaylistScores> = playlist_stats
            .par_iter()
            .map(|(id, stats)| (id.clone(), self.scores.score_playlist(stats)))
            .collect();

        self.enter(LoadPhase::ComputingMeta);
        let meta_stats = Self::compute_meta_stats(
            &playlists,
            &playlist_songs,
            &playlist_scores,
            &saved_songs,
            user_profile.as_ref(),
        );

        self.enter(LoadPhase::Ready);
        info!(playlists = playlists.len(), "library analysis complete");

        AnalyzedLibrary {
            playlists,
            playlist_songs,
            playlist_stats,
            playlist_scores,
            meta_stats,
        }
    }

    /// Recompute one playlist from fresh songs without touching any other
    /// playlist's results. The caller merges the returned fragment.
    pub fn refresh_playlist(
        &self,
        songs: Vec<PlaylistSong>,
        top_songs: &TopSongs,
        saved_songs: &[PlaylistSong],
        recently_played: &[PlaylistSong],
    ) -> PlaylistRefresh {
        let saved_ids: HashSet<String> =
            saved_songs.iter().map(|s| s.track.id.clone()).collect();
        let top_ids = TopSongIds::from_top_songs(top_songs);
        let songs = decorate_songs(songs, &saved_ids, &top_ids);

        let stats = StatsCalculator::compute_playlist_stats(
            &songs,
            top_songs,
            saved_songs,
            recently_played,
            &self.dates,
        );
        let scores = self.scores.score_playlist(&stats);

        PlaylistRefresh {
            songs,
            stats,
            scores,
        }
    }

    /// Cross-playlist aggregates. Each field degrades to `None` on its own
    /// when its inputs are missing, so a library with no profile still gets
    /// its popularity counts and vice versa.
    fn compute_meta_stats(
        playlists: &[Playlist],
        playlist_songs: &HashMap<String, Vec<PlaylistSong>>,
        playlist_scores: &HashMap<String, PlaylistScores>,
        saved_songs: &[PlaylistSong],
        user_profile: Option<&UserProfile>,
    ) -> MetaStats {
        // Walk playlists in declared order so ties resolve to the first
        // occurrence deterministically.
        let all_songs = || {
            playlists
                .iter()
                .filter_map(|p| playlist_songs.get(&p.id))
                .flatten()
        };

        let most_popular_artist =
            Self::most_popular_media(all_songs().map(|s| s.track.primary_artist()));
        let most_popular_song =
            Self::most_popular_media(all_songs().map(|s| s.track.name.as_str()));

        let mut highest_scoring_playlist: Option<TopPlaylist> = None;
        for playlist in playlists {
            let Some(scores) = playlist_scores.get(&playlist.id) else {
                continue;
            };
            let beats_current = highest_scoring_playlist
                .as_ref()
                .map(|best| scores.total_score > best.score)
                .unwrap_or(true);
            if beats_current {
                highest_scoring_playlist = Some(TopPlaylist {
                    name: playlist.name.clone(),
                    score: scores.total_score,
                });
            }
        }

        let scored: Vec<f64> = playlists
            .iter()
            .filter_map(|p| playlist_scores.get(&p.id))
            .map(|s| s.total_score)
            .collect();
        let average_total_score = if scored.is_empty() {
            None
        } else {
            Some(round2(scored.iter().sum::<f64>() / scored.len() as f64))
        };

        MetaStats {
            profile_pic_url: user_profile
                .and_then(|p| p.images.first())
                .map(|img| img.url.clone()),
            username: user_profile.and_then(|p| p.display_name.clone()),
            playlist_count: playlists.len(),
            saved_song_count: saved_songs.len(),
            most_popular_artist,
            most_popular_song,
            highest_scoring_playlist,
            average_total_score,
        }
    }

    /// Most frequent name in the stream, ties broken by first encounter.
    fn most_popular_media<'a>(names: impl Iterator<Item = &'a str>) -> Option<MediaCount> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        let mut order: Vec<&str> = Vec::new();
        for name in names {
            let count = counts.entry(name).or_insert(0);
            if *count == 0 {
                order.push(name);
            }
            *count += 1;
        }

        let mut best: Option<MediaCount> = None;
        for name in order {
            let count = counts[name];
            if best.as_ref().map(|b| count > b.count).unwrap_or(true) {
                best = Some(MediaCount {
                    name: name.to_string(),
                    count,
                });
            }
        }
        best
    }
}

impl Default for PlaylistDataManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Album, Artist, ProfileImage, Track};
    use approx::assert_relative_eq;

    fn make_song(id: &str, artist: &str, added_at: &str) -> PlaylistSong {
        PlaylistSong {
            added_at: added_at.parse().unwrap(),
            track: Track {
                id: id.to_string(),
                name: format!("Song {id}"),
                artists: vec![Artist {
                    name: artist.to_string(),
                }],
                album: Album {
                    name: "Test Album".to_string(),
                    release_date: "2022-05-01".to_string(),
                },
                duration_ms: 210_000,
                popularity: 60,
            },
            is_saved: false,
            is_top_short_term: false,
            is_top_medium_term: false,
            is_top_long_term: false,
        }
    }

    fn make_playlist(id: &str, name: &str, track_count: u32) -> Playlist {
        Playlist {
            id: id.to_string(),
            name: name.to_string(),
            owner: "tester".to_string(),
            track_count,
        }
    }

    fn fixed_now() -> DateTime<Utc> {
        "2025-06-01T00:00:00Z".parse().unwrap()
    }

    fn small_library() -> Library {
        let a_songs = vec![
            make_song("a1", "Artist A", "2025-04-01T00:00:00Z"),
            make_song("a2", "Artist A", "2025-04-02T00:00:00Z"),
            make_song("a3", "Artist B", "2025-04-03T00:00:00Z"),
        ];
        let mut playlist_songs = HashMap::new();
        playlist_songs.insert("pl-a".to_string(), a_songs);
        playlist_songs.insert("pl-empty".to_string(), vec![]);

        Library {
            playlists: vec![
                make_playlist("pl-a", "Daily Mix", 3),
                make_playlist("pl-empty", "Empty One", 0),
            ],
            playlist_songs,
            top_songs: TopSongs {
                short_term: vec![make_song("a1", "Artist A", "2025-04-01T00:00:00Z").track],
                medium_term: vec![],
                long_term: vec![],
            },
            saved_songs: vec![make_song("a2", "Artist A", "2025-04-02T00:00:00Z")],
            recently_played_songs: vec![],
            user_profile: Some(UserProfile {
                display_name: Some("Tester".to_string()),
                images: vec![ProfileImage {
                    url: "https://example.com/pic.jpg".to_string(),
                }],
            }),
        }
    }

    #[test]
    fn test_decorate_songs_sets_flags() {
        let songs = vec![
            make_song("1", "A", "2025-01-01T00:00:00Z"),
            make_song("2", "A", "2025-01-02T00:00:00Z"),
        ];
        let saved_ids: HashSet<String> = ["1".to_string()].into();
        let top_ids = TopSongIds::from_top_songs(&TopSongs {
            short_term: vec![make_song("2", "A", "2025-01-02T00:00:00Z").track],
            medium_term: vec![make_song("1", "A", "2025-01-01T00:00:00Z").track],
            long_term: vec![],
        });

        let decorated = decorate_songs(songs, &saved_ids, &top_ids);
        assert!(decorated[0].is_saved);
        assert!(!decorated[0].is_top_short_term);
        assert!(decorated[0].is_top_medium_term);
        assert!(!decorated[1].is_saved);
        assert!(decorated[1].is_top_short_term);
        assert!(!decorated[1].is_top_long_term);
    }

    #[test]
    fn test_decorate_songs_is_idempotent() {
        let songs = vec![make_song("1", "A", "2025-01-01T00:00:00Z")];
        let saved_ids: HashSet<String> = ["1".to_string()].into();
        let top_ids = TopSongIds::from_top_songs(&TopSongs::default());

        let once = decorate_songs(songs, &saved_ids, &top_ids);
        let twice = decorate_songs(once.clone(), &saved_ids, &top_ids);
        assert_eq!(once[0].is_saved, twice[0].is_saved);
        assert_eq!(once[0].is_top_short_term, twice[0].is_top_short_term);
    }

    #[test]
    fn test_analyze_full_pass() {
        let mut manager = PlaylistDataManager::at(fixed_now());
        assert_eq!(manager.phase(), LoadPhase::Idle);
        manager.mark_fetching();
        assert_eq!(manager.phase(), LoadPhase::Fetching);

        let analyzed = manager.analyze(small_library());
        assert_eq!(manager.phase(), LoadPhase::Ready);

        // Both playlists got stats and scores, including the empty one.
        assert_eq!(analyzed.playlist_stats.len(), 2);
        assert_eq!(analyzed.playlist_scores.len(), 2);

        let a_stats = &analyzed.playlist_stats["pl-a"];
        assert_eq!(a_stats.maintenance.song_count, 3);
        assert_relative_eq!(
            a_stats.user_relevance.saved_song_percentage.unwrap(),
            33.3
        );
        assert_relative_eq!(
            a_stats
                .user_relevance
                .short_term_most_played_percentage
                .unwrap(),
            33.3
        );

        let empty_stats = &analyzed.playlist_stats["pl-empty"];
        assert_eq!(empty_stats.maintenance.song_count, 0);
        assert!(empty_stats.artist_stats.artist_diversity.is_none());
        assert_relative_eq!(analyzed.playlist_scores["pl-empty"].total_score, 0.0);

        // Decoration flags landed on the stored songs.
        let a_songs = &analyzed.playlist_songs["pl-a"];
        assert!(a_songs[0].is_top_short_term);
        assert!(a_songs[1].is_saved);

        // Meta stats aggregate across playlists.
        let meta = &analyzed.meta_stats;
        assert_eq!(meta.playlist_count, 2);
        assert_eq!(meta.saved_song_count, 1);
        assert_eq!(meta.username.as_deref(), Some("Tester"));
        assert_eq!(
            meta.profile_pic_url.as_deref(),
            Some("https://example.com/pic.jpg")
        );
        assert_eq!(
            meta.most_popular_artist,
            Some(MediaCount {
                name: "Artist A".to_string(),
                count: 2
            })
        );
        assert_eq!(
            meta.highest_scoring_playlist.as_ref().unwrap().name,
            "Daily Mix"
        );
        let expected_avg = round2(
            (analyzed.playlist_scores["pl-a"].total_score
                + analyzed.playlist_scores["pl-empty"].total_score)
                / 2.0,
        );
        assert_relative_eq!(meta.average_total_score.unwrap(), expected_avg);
    }

    #[test]
    fn test_analyze_without_profile_degrades_profile_fields_only() {
        let mut manager = PlaylistDataManager::at(fixed_now());
        let mut library = small_library();
        library.user_profile = None;

        let analyzed = manager.analyze(library);
        let meta = &analyzed.meta_stats;
        assert!(meta.username.is_none());
        assert!(meta.profile_pic_url.is_none());
        // Everything else still computed.
        assert_eq!(meta.playlist_count, 2);
        assert!(meta.most_popular_artist.is_some());
        assert!(meta.average_total_score.is_some());
    }

    #[test]
    fn test_analyze_empty_library() {
        let mut manager = PlaylistDataManager::at(fixed_now());
        let analyzed = manager.analyze(Library {
            playlists: vec![],
            playlist_songs: HashMap::new(),
            top_songs: TopSongs::default(),
            saved_songs: vec![],
            recently_played_songs: vec![],
            user_profile: None,
        });

        let meta = &analyzed.meta_stats;
        assert_eq!(meta.playlist_count, 0);
        assert!(meta.most_popular_artist.is_none());
        assert!(meta.most_popular_song.is_none());
        assert!(meta.highest_scoring_playlist.is_none());
        assert!(meta.average_total_score.is_none());
    }

    #[test]
    fn test_most_popular_media_tie_goes_to_first_encountered() {
        let names = ["B", "A", "A", "B"];
        let best = PlaylistDataManager::most_popular_media(names.into_iter()).unwrap();
        assert_eq!(best.name, "B");
        assert_eq!(best.count, 2);
    }

    #[test]
    fn test_highest_scoring_tie_goes_to_first_playlist() {
        // Two playlists with identical content score identically; the first
        // declared playlist wins the tie.
        let songs = vec![make_song("1", "A", "2025-04-01T00:00:00Z")];
        let mut playlist_songs = HashMap::new();
        playlist_songs.insert("first".to_string(), songs.clone());
        playlist_songs.insert("second".to_string(), songs);

        let mut manager = PlaylistDataManager::at(fixed_now());
        let analyzed = manager.analyze(Library {
            playlists: vec![
                make_playlist("first", "First", 1),
                make_playlist("second", "Second", 1),
            ],
            playlist_songs,
            top_songs: TopSongs::default(),
            saved_songs: vec![],
            recently_played_songs: vec![],
            user_profile: None,
        });

        assert_eq!(
            analyzed.meta_stats.highest_scoring_playlist.as_ref().unwrap().name,
            "First"
        );
    }

    #[test]
    fn test_refresh_playlist_leaves_rest_untouched() {
        let mut manager = PlaylistDataManager::at(fixed_now());
        let analyzed = manager.analyze(small_library());
        let before_empty = analyzed.playlist_scores["pl-empty"].total_score;
        let before_meta = analyzed.meta_stats.clone();

        // Refresh playlist A with an extra song.
        let mut new_songs = analyzed.playlist_songs["pl-a"].clone();
        new_songs.push(make_song("a4", "Artist C", "2025-05-20T00:00:00Z"));
        let library = small_library();
        let refresh = manager.refresh_playlist(
            new_songs,
            &library.top_songs,
            &library.saved_songs,
            &library.recently_played_songs,
        );

        assert_eq!(refresh.stats.maintenance.song_count, 4);
        assert_eq!(refresh.songs.len(), 4);
        // The fragment carries fresh decoration.
        assert!(refresh.songs[0].is_top_short_term);

        // Nothing outside the fragment moved.
        assert_relative_eq!(
            analyzed.playlist_scores["pl-empty"].total_score,
            before_empty
        );
        assert_eq!(
            analyzed.meta_stats.playlist_count,
            before_meta.playlist_count
        );
    }
}
