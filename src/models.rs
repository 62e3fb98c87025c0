use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A playlist as fetched from the music service. Never mutated by the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Playlist {
    pub id: String,
    pub name: String,
    pub owner: String,
    #[serde(rename = "trackCount")]
    pub track_count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artist {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Album {
    pub name: String,
    /// Release date as reported by the service: `YYYY`, `YYYY-MM` or `YYYY-MM-DD`.
    #[serde(rename = "releaseDate")]
    pub release_date: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub name: String,
    pub artists: Vec<Artist>,
    pub album: Album,
    #[serde(rename = "durationMs")]
    pub duration_ms: u64,
    /// 0-100, where 100 is the most popular.
    pub popularity: u8,
}

impl Track {
    /// Primary artist name; only the first listed artist counts for stats.
    pub fn primary_artist(&self) -> &str {
        self.artists
            .first()
            .map(|a| a.name.as_str())
            .unwrap_or("Unknown Artist")
    }
}

/// A track's membership in one playlist, plus the decoration flags applied
/// before stats run. Flags default to false until the decoration stage sets them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistSong {
    #[serde(rename = "addedAt")]
    pub added_at: DateTime<Utc>,
    pub track: Track,
    #[serde(default, rename = "isSaved")]
    pub is_saved: bool,
    #[serde(default, rename = "isTopShortTerm")]
    pub is_top_short_term: bool,
    #[serde(default, rename = "isTopMediumTerm")]
    pub is_top_medium_term: bool,
    #[serde(default, rename = "isTopLongTerm")]
    pub is_top_long_term: bool,
}

/// The user's top tracks per listening horizon.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TopSongs {
    #[serde(rename = "shortTerm")]
    pub short_term: Vec<Track>,
    #[serde(rename = "mediumTerm")]
    pub medium_term: Vec<Track>,
    #[serde(rename = "longTerm")]
    pub long_term: Vec<Track>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileImage {
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(rename = "displayName")]
    pub display_name: Option<String>,
    #[serde(default)]
    pub images: Vec<ProfileImage>,
}

/// The full inbound bundle: everything the fetch layer hands over, already
/// paginated and assembled. The engine never fetches anything itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Library {
    pub playlists: Vec<Playlist>,
    #[serde(rename = "playlistSongs")]
    pub playlist_songs: HashMap<String, Vec<PlaylistSong>>,
    #[serde(rename = "topSongs")]
    pub top_songs: TopSongs,
    #[serde(rename = "savedSongs")]
    pub saved_songs: Vec<PlaylistSong>,
    #[serde(rename = "recentlyPlayedSongs")]
    pub recently_played_songs: Vec<PlaylistSong>,
    #[serde(rename = "userProfile")]
    pub user_profile: Option<UserProfile>,
}

/// Parse a service release date at whatever precision it was reported.
/// `YYYY-MM` resolves to the first of the month, `YYYY` to January 1st.
pub fn parse_release_date(raw: &str) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(date) = NaiveDate::parse_from_str(&format!("{raw}-01"), "%Y-%m-%d") {
        return Some(date);
    }
    NaiveDate::parse_from_str(&format!("{raw}-01-01"), "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_release_date_precisions() {
        assert_eq!(
            parse_release_date("2021-06-15"),
            NaiveDate::from_ymd_opt(2021, 6, 15)
        );
        assert_eq!(
            parse_release_date("2021-06"),
            NaiveDate::from_ymd_opt(2021, 6, 1)
        );
        assert_eq!(
            parse_release_date("1999"),
            NaiveDate::from_ymd_opt(1999, 1, 1)
        );
        assert_eq!(parse_release_date("not-a-date"), None);
        assert_eq!(parse_release_date(""), None);
    }

    #[test]
    fn test_primary_artist_fallback() {
        let track = Track {
            id: "t1".to_string(),
            name: "Song".to_string(),
            artists: vec![],
            album: Album {
                name: "Album".to_string(),
                release_date: "2020-01-01".to_string(),
            },
            duration_ms: 200_000,
            popularity: 50,
        };
        assert_eq!(track.primary_artist(), "Unknown Artist");
    }

    #[test]
    fn test_playlist_song_flags_default_false() {
        let json = r#"{
            "addedAt": "2023-04-01T12:00:00Z",
            "track": {
                "id": "t1",
                "name": "Song",
                "artists": [{"name": "Artist A"}],
                "album": {"name": "Album", "releaseDate": "2020-03-01"},
                "durationMs": 180000,
                "popularity": 42
            }
        }"#;
        let song: PlaylistSong = serde_json::from_str(json).unwrap();
        assert!(!song.is_saved);
        assert!(!song.is_top_short_term);
        assert!(!song.is_top_medium_term);
        assert!(!song.is_top_long_term);
        assert_eq!(song.track.primary_artist(), "Artist A");
    }
}
