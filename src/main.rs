use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod analytics;
mod models;
mod snapshot;

use crate::analytics::registry::{StatCategory, STAT_REGISTRY};
use crate::analytics::report::{PlaylistScores, PlaylistStats};
use crate::analytics::{display_or_na, PlaylistDataManager};
use crate::snapshot::load_snapshot;

#[derive(Parser)]
#[command(name = "playlist-health")]
#[command(about = "Health and relevance analysis for a music library snapshot")]
#[command(version)]
struct Args {
    /// Path to the library snapshot JSON file
    #[arg(short = 's', long = "snapshot", default_value = "library.json")]
    snapshot_file: String,

    /// Analyze a single playlist by id instead of the whole library
    #[arg(short = 'p', long = "playlist")]
    playlist: Option<String>,

    /// Quiet mode - only print playlist totals
    #[arg(short = 'q', long = "quiet")]
    quiet: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    if !std::path::Path::new(&args.snapshot_file).exists() {
        eprintln!(
            "Error: Library snapshot file '{}' not found.",
            args.snapshot_file
        );
        eprintln!("Please ensure the file exists or specify a different file with --snapshot.");
        return Err(anyhow::anyhow!(
            "Snapshot file '{}' not found",
            args.snapshot_file
        ));
    }

    let mut manager = PlaylistDataManager::new();
    manager.mark_fetching();

    println!("Loading library snapshot from: {}", args.snapshot_file);
    let library = match load_snapshot(&args.snapshot_file) {
        Ok(library) => library,
        Err(e) => {
            manager.mark_failed();
            eprintln!("Failed to load library snapshot: {e:#}");
            return Err(e);
        }
    };
    println!(
        "Loaded {} playlists, {} saved songs",
        library.playlists.len(),
        library.saved_songs.len()
    );

    if let Some(playlist_id) = &args.playlist {
        return analyze_single_playlist(&manager, library, playlist_id, args.quiet);
    }

    let analyzed = manager.analyze(library);

    // Rank playlists by total score, best first.
    let mut ranked: Vec<_> = analyzed
        .playlists
        .iter()
        .filter_map(|p| analyzed.playlist_scores.get(&p.id).map(|s| (p, s)))
        .collect();
    ranked.sort_by(|a, b| {
        b.1.total_score
            .partial_cmp(&a.1.total_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    println!("\n=== PLAYLIST HEALTH REPORT ===");
    for (rank, (playlist, scores)) in ranked.iter().enumerate() {
        println!(
            "{}. {} - {:.1}/100",
            rank + 1,
            playlist.name,
            scores.total_score
        );
        if !args.quiet {
            print_score_breakdown(scores);
            if let Some(stats) = analyzed.playlist_stats.get(&playlist.id) {
                print_stat_categories(stats);
            }
            println!();
        }
    }

    let meta = &analyzed.meta_stats;
    println!("\n=== LIBRARY OVERVIEW ===");
    if let Some(username) = &meta.username {
        println!("User: {username}");
    }
    println!("Playlists: {}", meta.playlist_count);
    println!("Saved songs: {}", meta.saved_song_count);
    println!(
        "Most popular artist: {}",
        display_or_na(&meta.most_popular_artist)
    );
    println!(
        "Most popular song: {}",
        display_or_na(&meta.most_popular_song)
    );
    println!(
        "Highest scoring playlist: {}",
        display_or_na(&meta.highest_scoring_playlist)
    );
    println!(
        "Average total score: {}",
        display_or_na(&meta.average_total_score)
    );

    Ok(())
}

fn analyze_single_playlist(
    manager: &PlaylistDataManager,
    library: crate::models::Library,
    playlist_id: &str,
    quiet: bool,
) -> Result<()> {
    let playlist = library
        .playlists
        .iter()
        .find(|p| p.id == playlist_id)
        .ok_or_else(|| anyhow::anyhow!("Playlist '{}' not found in snapshot", playlist_id))?
        .clone();
    let songs = library
        .playlist_songs
        .get(playlist_id)
        .cloned()
        .unwrap_or_default();

    let refresh = manager.refresh_playlist(
        songs,
        &library.top_songs,
        &library.saved_songs,
        &library.recently_played_songs,
    );

    println!("\n{}", playlist.name);
    println!("{}", "=".repeat(playlist.name.len()));
    println!("Total score: {:.1}/100", refresh.scores.total_score);
    if !quiet {
        print_score_breakdown(&refresh.scores);
        print_stat_categories(&refresh.stats);
    }

    Ok(())
}

fn print_score_breakdown(scores: &PlaylistScores) {
    println!(
        "   Maintenance: {:.1} | User Relevance: {:.1} | General Relevance: {:.1}",
        scores.maintenance_scores.total_maintenance_score,
        scores.user_relevance_scores.total_user_relevance_score,
        scores.general_relevance_scores.total_general_relevance_score,
    );
    println!(
        "   Artist Diversity: {:.1} | Song Likeness: {:.1}",
        scores.artist_diversity_scores.total_artist_diversity_score,
        scores.song_likeness_scores.total_song_likeness_score,
    );
}

/// Print every stat through the registry so the report stays in sync with the
/// stats shape without a hardcoded field list.
fn print_stat_categories(stats: &PlaylistStats) {
    let value = match serde_json::to_value(stats) {
        Ok(value) => value,
        Err(_) => return,
    };

    for category in StatCategory::ALL {
        let Some(group) = value.get(category.stat_group_key()) else {
            continue;
        };
        println!("   {}:", category.display_name());
        for info in STAT_REGISTRY.iter().filter(|i| i.category == category) {
            let rendered = match group.get(info.key) {
                Some(serde_json::Value::Null) | None => "N/A".to_string(),
                Some(serde_json::Value::String(s)) => s.clone(),
                Some(serde_json::Value::Object(obj)) => {
                    // Artist frequency: name plus count or percentage.
                    let name = obj.get("artistName").and_then(|v| v.as_str()).unwrap_or("?");
                    let count = obj.get("artistCount").and_then(|v| v.as_f64()).unwrap_or(0.0);
                    format!("{name}: {count}")
                }
                Some(other) => other.to_string(),
            };
            println!("      {}: {}", info.name, rendered);
        }
    }
}
