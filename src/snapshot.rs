use anyhow::{Context, Result};
use std::fs;

use crate::models::Library;

/// Load a library snapshot from a JSON file written by the fetch layer.
pub fn load_snapshot(path: &str) -> Result<Library> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read snapshot file {path}"))?;
    let library: Library = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse snapshot file {path}"))?;
    Ok(library)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_snapshot_missing_file() {
        let result = load_snapshot("/nonexistent/library.json");
        assert!(result.is_err());
        let message = format!("{:#}", result.unwrap_err());
        assert!(message.contains("Failed to read snapshot file"));
    }

    #[test]
    fn test_load_snapshot_parses_library() {
        let json = r#"{
            "playlists": [
                {"id": "pl-1", "name": "Mix", "owner": "me", "trackCount": 1}
            ],
            "playlistSongs": {
                "pl-1": [{
                    "addedAt": "2024-01-01T00:00:00Z",
                    "track": {
                        "id": "t1",
                        "name": "Song",
                        "artists": [{"name": "Artist"}],
                        "album": {"name": "Album", "releaseDate": "2020"},
                        "durationMs": 180000,
                        "popularity": 55
                    }
                }]
            },
            "topSongs": {"shortTerm": [], "mediumTerm": [], "longTerm": []},
            "savedSongs": [],
            "recentlyPlayedSongs": [],
            "userProfile": null
        }"#;

        let dir = std::env::temp_dir().join("playlist-health-test");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("library.json");
        fs::write(&path, json).unwrap();

        let library = load_snapshot(path.to_str().unwrap()).unwrap();
        assert_eq!(library.playlists.len(), 1);
        assert_eq!(library.playlist_songs["pl-1"].len(), 1);
        assert!(library.user_profile.is_none());
    }
}
