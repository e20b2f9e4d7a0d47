use clap::Parser;
use std::path::PathBuf;

/// Command line arguments for the ZCAC encode/decode round-trip driver.
///
/// Takes one input WAV file, encodes it to `test_encoded.zcac` and decodes
/// that straight back out to `test_decoded.wav`, both written next to the
/// current directory.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "ZCAC lossy audio codec round-trip driver.",
    long_about = "Encodes a WAV file to a ZCAC container and immediately decodes it back, \
writing both `test_encoded.zcac` and `test_decoded.wav` for inspection.",
    after_help = "
    EXAMPLES:
    # 1. Round-trip a WAV file with default quality
    zcac input.wav

    # 2. Round-trip at the lowest quality, skipping the omission mask
    zcac -q 1 --no-omit input.wav

    # 3. Round-trip and print a compression report
    zcac --stats input.wav
"
)]
pub struct CliArgs {
    /// The WAV file to encode and then decode.
    pub input_file: PathBuf,

    /// Prints a compression report (ratio, timing, per-step breakdown).
    #[arg(short, long)]
    pub stats: bool,

    /// Quality 1 (most aggressive) through 10 (least aggressive).
    #[arg(short, long, default_value_t = 5, value_parser = clap::value_parser!(u8).range(1..=10))]
    pub quality: u8,

    /// Disables omission of low-salience FFT coefficients.
    #[arg(long)]
    pub no_omit: bool,

    /// Disables the outer DEFLATE compression pass over the container body.
    #[arg(long)]
    pub no_outer_compression: bool,
}

impl CliArgs {
    /// Checks that `input_file` exists and is a regular file.
    pub fn validate(&self) -> Result<(), CliError> {
        if !self.input_file.exists() {
            return Err(CliError::InputFileNotFound(self.input_file.clone()));
        }
        if !self.input_file.is_file() {
            return Err(CliError::InputNotFile(self.input_file.clone()));
        }
        Ok(())
    }

    pub fn to_config(&self) -> zcac::Config {
        zcac::Config {
            quality: self.quality,
            omit_unimportant_freqs: !self.no_omit,
            outer_compression: !self.no_outer_compression,
        }
    }
}

/// Errors encountered while parsing or validating command line arguments.
#[derive(Debug)]
pub enum CliError {
    /// The specified input file could not be found.
    InputFileNotFound(PathBuf),
    /// The specified input path exists, but is not a file.
    InputNotFile(PathBuf),
    /// An error originating directly from the argument parsing library.
    ClapError(clap::Error),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::InputFileNotFound(path) => write!(f, "input file not found: {}", path.display()),
            CliError::InputNotFile(path) => write!(f, "input path is not a file: {}", path.display()),
            CliError::ClapError(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for CliError {}

impl From<clap::Error> for CliError {
    fn from(error: clap::Error) -> Self {
        CliError::ClapError(error)
    }
}

/// Parses and validates command line arguments.
pub fn parse_args() -> Result<CliArgs, CliError> {
    let args = CliArgs::try_parse()?;
    args.validate()?;
    Ok(args)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_missing_input_file() {
        let args = CliArgs {
            input_file: PathBuf::from("/nonexistent/path/to/audio.wav"),
            stats: false,
            quality: 5,
            no_omit: false,
            no_outer_compression: false,
        };
        assert!(matches!(args.validate(), Err(CliError::InputFileNotFound(_))));
    }

    #[test]
    fn to_config_maps_flags() {
        let args = CliArgs {
            input_file: PathBuf::from("."),
            stats: false,
            quality: 7,
            no_omit: true,
            no_outer_compression: true,
        };
        let config = args.to_config();
        assert_eq!(config.quality, 7);
        assert!(!config.omit_unimportant_freqs);
        assert!(!config.outer_compression);
    }
}
