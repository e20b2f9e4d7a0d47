//! Shared, codec-agnostic helpers used across the workspace: timing and
//! human-readable statistics reporting for an encode or decode run.

pub mod stats;

pub use stats::{
    BuilderError, CompressionStats, CompressionStatsBuilder, OptinalStatsTimer, SectionStats,
    StatsTimer, SubSectionTimer,
};
