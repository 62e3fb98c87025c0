//! A small catalog describing every stat the engine produces: which category
//! group it lives under, its serialized key, and how a front end should render
//! its value. Presentation layers iterate this instead of hardcoding field
//! lists.

/// The six stat categories, in report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatCategory {
    Maintenance,
    UserRelevance,
    GeneralRelevance,
    ArtistStats,
    SongStats,
    AdvancedSongStats,
}

impl StatCategory {
    pub const ALL: [StatCategory; 6] = [
        StatCategory::Maintenance,
        StatCategory::UserRelevance,
        StatCategory::GeneralRelevance,
        StatCategory::ArtistStats,
        StatCategory::SongStats,
        StatCategory::AdvancedSongStats,
    ];

    /// Human-readable heading for report output.
    pub fn display_name(&self) -> &'static str {
        match self {
            StatCategory::Maintenance => "Maintenance",
            StatCategory::UserRelevance => "User Relevance",
            StatCategory::GeneralRelevance => "General Relevance",
            StatCategory::ArtistStats => "Artist Stats",
            StatCategory::SongStats => "Song Stats",
            StatCategory::AdvancedSongStats => "Advanced Song Stats",
        }
    }

    /// Key of the category's group in a serialized stats record.
    pub fn stat_group_key(&self) -> &'static str {
        match self {
            StatCategory::Maintenance => "maintenance",
            StatCategory::UserRelevance => "userRelevance",
            StatCategory::GeneralRelevance => "generalRelevance",
            StatCategory::ArtistStats => "artistStats",
            StatCategory::SongStats => "songStats",
            StatCategory::AdvancedSongStats => "advancedSongStats",
        }
    }

    /// Key of the matching group in a serialized scores record, if the
    /// category is scored at all. Display-only categories return `None`.
    pub fn score_group_key(&self) -> Option<&'static str> {
        match self {
            StatCategory::Maintenance => Some("maintenanceScores"),
            StatCategory::UserRelevance => Some("userRelevanceScores"),
            StatCategory::GeneralRelevance => Some("generalRelevanceScores"),
            StatCategory::ArtistStats => Some("artistDiversityScores"),
            StatCategory::SongStats => None,
            StatCategory::AdvancedSongStats => Some("songLikenessScores"),
        }
    }
}

/// How a stat's value should be rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    Number,
    Percentage,
    DateTime,
    /// `M:SS` duration string.
    Time,
    /// Artist name with an occurrence count.
    ArtistNumber,
    /// Artist name with a percentage.
    ArtistPercentage,
}

#[derive(Debug, Clone, Copy)]
pub struct StatInfo {
    pub name: &'static str,
    pub category: StatCategory,
    pub key: &'static str,
    pub value_type: ValueType,
}

pub const STAT_REGISTRY: &[StatInfo] = &[
    StatInfo {
        name: "Song Count",
        category: StatCategory::Maintenance,
        key: "songCount",
        value_type: ValueType::Number,
    },
    StatInfo {
        name: "Two Year Old Songs",
        category: StatCategory::Maintenance,
        key: "twoYearOldPercentage",
        value_type: ValueType::Percentage,
    },
    StatInfo {
        name: "Songs Added In Last Six Months",
        category: StatCategory::Maintenance,
        key: "sixMonthNewPercentage",
        value_type: ValueType::Percentage,
    },
    StatInfo {
        name: "Average Song Added Date",
        category: StatCategory::Maintenance,
        key: "avgSongAddedDate",
        value_type: ValueType::DateTime,
    },
    StatInfo {
        name: "Last Song Added Date",
        category: StatCategory::Maintenance,
        key: "lastSongAddedDate",
        value_type: ValueType::DateTime,
    },
    StatInfo {
        name: "Short Term Most Played",
        category: StatCategory::UserRelevance,
        key: "shortTermMostPlayedPercentage",
        value_type: ValueType::Percentage,
    },
    StatInfo {
        name: "Medium Term Most Played",
        category: StatCategory::UserRelevance,
        key: "mediumTermMostPlayedPercentage",
        value_type: ValueType::Percentage,
    },
    StatInfo {
        name: "Long Term Most Played",
        category: StatCategory::UserRelevance,
        key: "longTermMostPlayedPercentage",
        value_type: ValueType::Percentage,
    },
    StatInfo {
        name: "Saved Songs",
        category: StatCategory::UserRelevance,
        key: "savedSongPercentage",
        value_type: ValueType::Percentage,
    },
    StatInfo {
        name: "Times Recently Played",
        category: StatCategory::UserRelevance,
        key: "timesRecentlyPlayed",
        value_type: ValueType::Number,
    },
    StatInfo {
        name: "Average Song Release Date",
        category: StatCategory::GeneralRelevance,
        key: "avgSongReleaseDate",
        value_type: ValueType::DateTime,
    },
    StatInfo {
        name: "Average Song Popularity",
        category: StatCategory::GeneralRelevance,
        key: "avgSongPopularity",
        value_type: ValueType::Number,
    },
    StatInfo {
        name: "Artist Diversity",
        category: StatCategory::ArtistStats,
        key: "artistDiversity",
        value_type: ValueType::Number,
    },
    StatInfo {
        name: "Most Frequent Artist By Count",
        category: StatCategory::ArtistStats,
        key: "mostFrequentArtistByCount",
        value_type: ValueType::ArtistNumber,
    },
    StatInfo {
        name: "Most Frequent Artist By Percentage",
        category: StatCategory::ArtistStats,
        key: "mostFrequentArtistByPercentage",
        value_type: ValueType::ArtistPercentage,
    },
    StatInfo {
        name: "Average Song Duration",
        category: StatCategory::SongStats,
        key: "avgSongDuration",
        value_type: ValueType::Time,
    },
    StatInfo {
        name: "Song Duration Variance",
        category: StatCategory::AdvancedSongStats,
        key: "songDurationVariance",
        value_type: ValueType::Number,
    },
    StatInfo {
        name: "Song Release Date Variance",
        category: StatCategory::AdvancedSongStats,
        key: "songReleaseDateVariance",
        value_type: ValueType::Number,
    },
];

/// Look up a stat by its serialized key.
pub fn find(key: &str) -> Option<&'static StatInfo> {
    STAT_REGISTRY.iter().find(|info| info.key == key)
}
