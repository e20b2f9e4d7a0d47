//! # Performance and Stats Utility Module
//!
//! This module provides a comprehensive suite of utilities for **performance measurement**,
//! **statistical aggregation**, and **human-readable data formatting**, for the encode and
//! decode passes of an audio compression run.
//!
//! ## Key Features
//!
//! * **Precision Timing**: The [`StatsTimer`] and [`SubSectionTimer`] structs offer
//!     accurate measurement of both total operation time and detailed, step-by-step
//!     processing durations.
//! * **Zero-Cost Optional Stats**: The [`OptinalStatsTimer`] allows performance tracking
//!     to be conditionally enabled or disabled at runtime without incurring any overhead
//!     when disabled.
//! * **Data Aggregation**: The [`CompressionStats`] struct collects and calculates all
//!     relevant metrics (e.g., **Compression Ratio**, **Processing Speed (MiB/s)**,
//!     and **Percentage Change**) for a complete operation.
//! * **Builder Pattern**: The [`CompressionStatsBuilder`] ensures that all necessary
//!     fields for statistics calculation are provided, returning a robust [`BuilderError`]
//!     if mandatory fields are missing.
//! * **Formatting**: Includes the `format_bytes` helper function and custom `Display`
//!     implementations for clear, human-readable terminal output of all collected data.
//!
//! ## Example Usage: Required and Optional Timing
//!
//! The following example demonstrates how to use the mandatory [`StatsTimer`] for overall
//! measurement and the flexible [`OptinalStatsTimer`] for detailed, conditional step timing.
//!
//! ```rust
//! use zcac_common::{
//!     StatsTimer, OptinalStatsTimer, CompressionStatsBuilder, SectionStats, BuilderError,
//!     CompressionStats
//! };
//! use std::time::Duration;
//!
//! /// Runs an encode pass, collecting stats based on the 'is_stats_enabled' flag.
//! fn run_operation(input_data: &[u8], is_stats_enabled: bool) -> Result<CompressionStats, BuilderError> {
//!     // 1. Mandatory Overall Timer: Used to measure the total execution time.
//!     let mut overall_timer = StatsTimer::new();
//!     let original_len = input_data.len();
//!
//!     // 2. Optional Section Timer: Used to track detailed steps only if stats are enabled.
//!     // This is zero-cost if 'is_stats_enabled' is false.
//!     let mut optional_timer = OptinalStatsTimer::new(is_stats_enabled);
//!
//!     // --- Step 1: Data Preparation (Optional Timing) ---
//!     let prep_timer = optional_timer.start_section("FFT Framing");
//!     // ... frame the channel into FFT blocks ...
//!     optional_timer.add_section(prep_timer);
//!
//!     // --- Step 2: Core Processing (Required Timing) ---
//!     let compression_timer = overall_timer.start_section("Quantize + Entropy Code");
//!     // Perform the main compression work here...
//!     let processed_data_len = original_len / 2; // Mock result
//!     overall_timer.add_section(compression_timer.end());
//!
//!     // --- Step 3: Finalization (Optional Timing) ---
//!     let final_timer = optional_timer.start_section("Header Write");
//!     // ... write the container header ...
//!     optional_timer.add_section(final_timer);
//!
//!     // 3. End Timers and Collect Results
//!     let (total_duration, required_sections) = overall_timer.end();
//!     let (_, optional_sections) = optional_timer.end();
//!
//!     let sections: Vec<SectionStats> = required_sections
//!         .into_iter()
//!         .chain(optional_sections.into_iter())
//!         .collect();
//!
//!     CompressionStatsBuilder::new()
//!         .algorithm_name("ZCAC")
//!         .algorithm_id(1)
//!         .version_used(1)
//!         .original_len(original_len)
//!         .processed_len(processed_data_len)
//!         .duration(total_duration)
//!         .is_compression(true)
//!         .sections(sections)
//!         .build()
//! }
//!
//! fn main() {
//!     let data = vec![0; 1024 * 1024]; // 1 MiB
//!
//!     let stats_full = run_operation(&data, true).unwrap();
//!     println!("{}", stats_full);
//!
//!     let stats_minimal = run_operation(&data, false).unwrap();
//!     let _ = stats_minimal;
//! }
//! ```
use std::error::Error;
use std::fmt::{self, Display};
use std::time::{Duration, Instant};

const KIB: usize = 1024;
const MIB: usize = KIB * 1024;
const GIB: usize = MIB * 1024;
const TIB: usize = GIB * 1024;

/// Formats a raw byte count into a human-readable string using binary prefixes (KiB, MiB, GiB, TiB).
///
/// # Examples
///
/// ```
/// assert_eq!(zcac_common::stats::format_bytes(512), "512 Bytes");
/// assert_eq!(zcac_common::stats::format_bytes(1024), "1.00 KiB");
/// assert_eq!(zcac_common::stats::format_bytes(1572864), "1.50 MiB");
/// ```
pub fn format_bytes(bytes: usize) -> String {
    if bytes >= TIB {
        format!("{:.2} TiB", bytes as f64 / TIB as f64)
    } else if bytes >= GIB {
        format!("{:.2} GiB", bytes as f64 / GIB as f64)
    } else if bytes >= MIB {
        format!("{:.2} MiB", bytes as f64 / MIB as f64)
    } else if bytes >= KIB {
        format!("{:.2} KiB", bytes as f64 / KIB as f64)
    } else {
        format!("{} Bytes", bytes)
    }
}

/// A custom error type used to represent failures during the construction
/// of an object using the builder pattern.
#[derive(Debug)]
pub enum BuilderError {
    /// Indicates that a required configuration field was never set on the builder.
    ///
    /// The string slice identifies the name of the missing field (e.g., "algorithm_name").
    MissingField(&'static str),
}

impl Display for BuilderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuilderError::MissingField(field) => {
                write!(f, "Builder Error: Missing required field '{}'", field)
            }
        }
    }
}

impl Error for BuilderError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        None
    }
}

/// Stores detailed statistics for an encode or decode run.
///
/// This structure encapsulates metadata (algorithm used, version) and
/// performance metrics (lengths, time, ratio, speed) related to a single
/// processing task.
#[derive(Debug, Clone)]
pub struct CompressionStats {
    /// The human-readable name of the algorithm used (e.g. `"ZCAC"`).
    pub algorithm_name: &'static str,
    /// A unique numerical identifier for the algorithm.
    pub algorithm_id: u8,
    /// The specific version of the algorithm used for this run.
    pub version_used: u8,
    /// The length of the data **before** processing (in bytes).
    /// (Uncompressed size for compression, compressed size for decompression).
    pub original_len: usize,
    /// The length of the data **after** processing (in bytes).
    /// (Compressed size for compression, uncompressed size for decompression).
    pub processed_len: usize,
    /// The total time taken for the entire process.
    pub duration: Duration,
    /// True if the process was compression (encode), false if decompression (decode).
    pub is_compression: bool,

    /// A list of timed steps within the overall process, providing a detailed
    /// breakdown of time consumption.
    pub sections: Vec<SectionStats>,

    /// The compression ratio factor, calculated as `uncompressed_len / compressed_len`.
    pub compression_ratio_factor: f64,
    /// The processing speed, calculated in Mebibytes per second (MiB/s).
    pub speed_mib_s: f64,
    /// The raw difference in bytes: `uncompressed_len - compressed_len`.
    pub raw_byte_difference: i64,
    /// The absolute percentage change in size relative to the uncompressed size.
    pub percentage_change: f64,
}

/// A struct to hold the name and duration for a specific processing step.
#[derive(Debug, Clone)]
pub struct SectionStats {
    /// The descriptive name of the step (e.g. `"FFT Framing"`).
    pub name: String,
    /// The time taken for this specific step.
    pub duration: Duration,
}

impl SectionStats {
    pub fn new(name: &str, duration: Duration) -> Self {
        SectionStats {
            name: name.to_string(),
            duration,
        }
    }
}

impl Display for SectionStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<30} {:.3} seconds",
            self.name,
            self.duration.as_secs_f64()
        )
    }
}

/// A simple timer used to measure the duration of a specific code section.
///
/// Consumes itself when stopped, preventing double-timing.
pub struct SubSectionTimer {
    start_time: Instant,
    section_name: String,
}

impl SubSectionTimer {
    pub fn new(name: &str) -> Self {
        SubSectionTimer {
            start_time: Instant::now(),
            section_name: name.to_string(),
        }
    }

    pub fn end(self) -> SectionStats {
        let duration = self.start_time.elapsed();
        SectionStats::new(&self.section_name, duration)
    }
}

/// The main performance timer, which measures the overall program time and collects statistics from sub-sections.
pub struct StatsTimer {
    start_time: Instant,
    sections: Vec<SectionStats>,
}

impl Default for StatsTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl StatsTimer {
    pub fn new() -> Self {
        StatsTimer {
            start_time: Instant::now(),
            sections: Vec::new(),
        }
    }

    pub fn start_section(&mut self, name: &str) -> SubSectionTimer {
        SubSectionTimer::new(name)
    }

    pub fn add_section(&mut self, section_stats: SectionStats) {
        self.sections.push(section_stats);
    }

    pub fn end(self) -> (Duration, Vec<SectionStats>) {
        (self.start_time.elapsed(), self.sections)
    }
}

/// A wrapper struct that holds either a real StatsTimer or nothing (None).
///
/// It provides the same methods as StatsTimer but is entirely zero-cost and
/// performs no operations when statistics are disabled (i.e., when the internal
/// timer is None).
pub struct OptinalStatsTimer(Option<StatsTimer>);

impl OptinalStatsTimer {
    pub fn new(enabled: bool) -> Self {
        if enabled {
            OptinalStatsTimer(Some(StatsTimer::new()))
        } else {
            OptinalStatsTimer(None)
        }
    }

    pub fn start_section(&mut self, name: &str) -> Option<SubSectionTimer> {
        self.0.as_mut().map(|t| t.start_section(name))
    }

    pub fn add_section(&mut self, timer: Option<SubSectionTimer>) {
        if let Some(sub_timer) = timer {
            if let Some(main_t) = self.0.as_mut() {
                main_t.add_section(sub_timer.end());
            }
        }
    }

    pub fn end(self) -> (Duration, Vec<SectionStats>) {
        self.0
            .map_or((Duration::from_secs(0), Vec::new()), |t| t.end())
    }
}

/// Builder for constructing [`CompressionStats`] using the method chaining pattern.
#[derive(Default)]
pub struct CompressionStatsBuilder {
    algorithm_name: Option<&'static str>,
    algorithm_id: Option<u8>,
    version_used: Option<u8>,
    original_len: Option<usize>,
    processed_len: Option<usize>,
    duration: Option<Duration>,
    is_compression: Option<bool>,
    sections: Vec<SectionStats>,
}

impl CompressionStats {
    fn calculate_stats(
        algorithm_name: &'static str,
        algorithm_id: u8,
        version_used: u8,
        original_len: usize,
        processed_len: usize,
        duration: Duration,
        is_compression: bool,
        sections: Vec<SectionStats>,
    ) -> Self {
        let (uncompressed_len, compressed_len) = if is_compression {
            (original_len, processed_len)
        } else {
            (processed_len, original_len)
        };

        let compression_ratio_factor = if compressed_len == 0 {
            0.0
        } else {
            uncompressed_len as f64 / compressed_len as f64
        };

        let duration_secs = duration.as_secs_f64();
        let speed_mib_s = if duration_secs == 0.0 {
            f64::INFINITY
        } else {
            (uncompressed_len as f64 / (1024.0 * 1024.0)) / duration_secs
        };

        let raw_byte_difference = uncompressed_len as i64 - compressed_len as i64;
        let difference_bytes = raw_byte_difference.unsigned_abs() as usize;
        let percentage_base = uncompressed_len as f64;
        let percentage_change = if percentage_base == 0.0 {
            0.0
        } else {
            (difference_bytes as f64 / percentage_base) * 100.0
        };

        CompressionStats {
            algorithm_name,
            algorithm_id,
            version_used,
            original_len,
            processed_len,
            duration,
            is_compression,
            sections,
            compression_ratio_factor,
            speed_mib_s,
            raw_byte_difference,
            percentage_change,
        }
    }
}

impl CompressionStatsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn algorithm_name(mut self, name: &'static str) -> Self {
        self.algorithm_name = Some(name);
        self
    }
    pub fn algorithm_id(mut self, id: u8) -> Self {
        self.algorithm_id = Some(id);
        self
    }
    pub fn version_used(mut self, version: u8) -> Self {
        self.version_used = Some(version);
        self
    }
    pub fn original_len(mut self, len: usize) -> Self {
        self.original_len = Some(len);
        self
    }
    pub fn processed_len(mut self, len: usize) -> Self {
        self.processed_len = Some(len);
        self
    }
    pub fn duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }
    pub fn is_compression(mut self, is_comp: bool) -> Self {
        self.is_compression = Some(is_comp);
        self
    }
    pub fn sections(mut self, sections: Vec<SectionStats>) -> Self {
        self.sections = sections;
        self
    }
    pub fn add_section(mut self, name: &str, duration: Duration) -> Self {
        self.sections.push(SectionStats::new(name, duration));
        self
    }

    /// Attempts to build the final [`CompressionStats`] struct.
    ///
    /// # Errors
    ///
    /// Returns an `Err(BuilderError)` if any required field is missing.
    pub fn build(self) -> Result<CompressionStats, BuilderError> {
        let name = self
            .algorithm_name
            .ok_or(BuilderError::MissingField("algorithm_name"))?;
        let id = self
            .algorithm_id
            .ok_or(BuilderError::MissingField("algorithm_id"))?;
        let version = self
            .version_used
            .ok_or(BuilderError::MissingField("version_used"))?;
        let original = self
            .original_len
            .ok_or(BuilderError::MissingField("original_len"))?;
        let processed = self
            .processed_len
            .ok_or(BuilderError::MissingField("processed_len"))?;
        let duration = self
            .duration
            .ok_or(BuilderError::MissingField("duration"))?;
        let is_comp = self
            .is_compression
            .ok_or(BuilderError::MissingField("is_compression"))?;

        Ok(CompressionStats::calculate_stats(
            name,
            id,
            version,
            original,
            processed,
            duration,
            is_comp,
            self.sections,
        ))
    }
}

impl Display for CompressionStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (uncompressed_len, compressed_len) = if self.is_compression {
            (self.original_len, self.processed_len)
        } else {
            (self.processed_len, self.original_len)
        };
        let title_name = if self.is_compression {
            "Encode"
        } else {
            "Decode"
        };
        let speed_name = if self.is_compression {
            "Encode Speed"
        } else {
            "Decode Speed"
        };
        let raw_byte_difference_abs = self.raw_byte_difference.unsigned_abs() as usize;
        let (savings_label, bytes_label) = if compressed_len < uncompressed_len {
            (
                format!("Compression Savings :  {:.2}(%)", self.percentage_change),
                "Space Saved:".to_string(),
            )
        } else if compressed_len > uncompressed_len {
            (
                format!("File Bloat :          {:.2}(%)", self.percentage_change),
                "Space Wasted:".to_string(),
            )
        } else {
            (
                "File Size Change :    0.00% (No Change)".to_string(),
                "Bytes Difference:".to_string(),
            )
        };

        writeln!(f, "\n--- {} Statistics 📊 ---", title_name)?;
        writeln!(f, "    Algorithm name:       {}", self.algorithm_name)?;
        writeln!(f, "    Algorithm ID:           {}", self.algorithm_id)?;
        writeln!(f, "    Version Used:         {}", self.version_used)?;
        writeln!(
            f,
            "    Original Size:        {}",
            format_bytes(uncompressed_len)
        )?;
        writeln!(
            f,
            "    Processed Size:      {}",
            format_bytes(compressed_len)
        )?;
        writeln!(
            f,
            "    Bytes Difference:     {} ({})",
            self.raw_byte_difference,
            format_bytes(raw_byte_difference_abs)
        )?;
        writeln!(
            f,
            "    Compression Ratio:    {:.3}:1 (Original / Processed)",
            self.compression_ratio_factor
        )?;
        writeln!(
            f,
            "    {:<21} {}",
            bytes_label,
            format_bytes(raw_byte_difference_abs)
        )?;
        writeln!(f, "    {}", savings_label)?;
        writeln!(
            f,
            "    Processing Time:      {:.3} seconds",
            self.duration.as_secs_f64()
        )?;
        write!(f, "    {:<21} {:.2} MiB/s", speed_name, self.speed_mib_s)?;

        writeln!(f, "\n\n--- Detailed Processing Steps ⏱️ ---")?;
        if self.sections.is_empty() {
            writeln!(f, "    (No detailed sections recorded)")?;
        } else {
            for section in &self.sections {
                writeln!(f, "    - {}", section)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_rejects_missing_fields() {
        let result = CompressionStatsBuilder::new().algorithm_name("ZCAC").build();
        assert!(matches!(result, Err(BuilderError::MissingField("algorithm_id"))));
    }

    #[test]
    fn builder_computes_ratio_and_savings() {
        let stats = CompressionStatsBuilder::new()
            .algorithm_name("ZCAC")
            .algorithm_id(1)
            .version_used(1)
            .original_len(1000)
            .processed_len(250)
            .duration(Duration::from_secs(1))
            .is_compression(true)
            .build()
            .unwrap();

        assert_eq!(stats.compression_ratio_factor, 4.0);
        assert_eq!(stats.raw_byte_difference, 750);
        assert!((stats.percentage_change - 75.0).abs() < 1e-9);
    }

    #[test]
    fn optional_timer_disabled_is_zero_cost() {
        let mut timer = OptinalStatsTimer::new(false);
        let section = timer.start_section("noop");
        assert!(section.is_none());
        timer.add_section(section);
        let (duration, sections) = timer.end();
        assert_eq!(duration, Duration::from_secs(0));
        assert!(sections.is_empty());
    }
}
