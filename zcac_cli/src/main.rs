//! ZCAC round-trip driver: reads a WAV file, encodes it to a ZCAC container,
//! decodes that container straight back, and writes the result out again.

mod cli_parse;

use cli_parse::{CliError, parse_args};
use std::process::ExitCode;
use zcac_common::{CompressionStatsBuilder, OptinalStatsTimer, StatsTimer};

const ENCODED_PATH: &str = "test_encoded.zcac";
const DECODED_PATH: &str = "test_decoded.wav";

fn main() -> ExitCode {
    env_logger::init();

    let args = match parse_args() {
        Ok(args) => args,
        Err(CliError::ClapError(e)) => {
            e.exit();
        }
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = run(&args) {
        eprintln!("error: {e}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn run(args: &cli_parse::CliArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = args.to_config();
    log::info!(
        "quality={} omit={} outer_compression={}",
        config.quality,
        config.omit_unimportant_freqs,
        config.outer_compression
    );

    let mut overall = StatsTimer::new();
    let mut steps = OptinalStatsTimer::new(args.stats);

    let read_timer = steps.start_section("Read WAV");
    let audio = wav_io::read_wav(&args.input_file)?;
    steps.add_section(read_timer);

    let original_len = audio
        .channels
        .iter()
        .map(|c| c.len() * std::mem::size_of::<f32>())
        .sum::<usize>();

    let encode_timer = overall.start_section("Encode");
    let encoded = zcac::encode(&audio, &config)?;
    overall.add_section(encode_timer.end());
    std::fs::write(ENCODED_PATH, &encoded)?;
    log::info!("wrote {} ({} bytes)", ENCODED_PATH, encoded.len());

    let decode_timer = overall.start_section("Decode");
    let decoded = zcac::decode(&encoded)?;
    overall.add_section(decode_timer.end());

    let write_timer = steps.start_section("Write WAV");
    wav_io::write_wav(DECODED_PATH, &decoded)?;
    steps.add_section(write_timer);
    log::info!("wrote {DECODED_PATH}");

    let (duration, required_sections) = overall.end();
    let (_, optional_sections) = steps.end();

    if args.stats {
        let sections = required_sections.into_iter().chain(optional_sections).collect();
        let stats = CompressionStatsBuilder::new()
            .algorithm_name("ZCAC")
            .algorithm_id(1)
            .version_used(0)
            .original_len(original_len)
            .processed_len(encoded.len())
            .duration(duration)
            .is_compression(true)
            .sections(sections)
            .build()?;
        println!("{stats}");
    }

    Ok(())
}
