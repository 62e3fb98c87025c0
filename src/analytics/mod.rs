pub mod curves;
pub mod manager;
pub mod registry;
pub mod report;
pub mod scores;
pub mod stats;
pub mod weights;

pub use manager::{decorate_songs, LoadPhase, PlaylistDataManager};
pub use report::{display_or_na, AnalyzedLibrary, PlaylistRefresh};
pub use scores::ScoreCalculator;
pub use stats::{RelevantDates, StatsCalculator};
