//! Command-line surface, built with `clap`'s derive API.

use std::path::PathBuf;

use clap::Parser;

use crate::constants::MAX_STATIONS_COUNT;
use crate::error::SimError;
use crate::payload::{parse_payload_file, Payload};

/// A discrete-event simulator of the CSMA/CD medium-access protocol.
#[derive(Debug, Parser)]
#[command(name = "csma-cd-sim", version)]
pub struct Cli {
    /// Number of stations sharing the bus.
    #[arg(short = 'N', long = "stations", value_parser = clap::value_parser!(u32).range(1..=MAX_STATIONS_COUNT as i64))]
    pub stations_count: u32,

    /// Path to the payload file (see the payload-file format in the docs).
    #[arg(short = 'f', long = "payload-file")]
    pub payload_file: PathBuf,

    /// Optional wall-clock delay between ticks, in milliseconds, for
    /// human-paced playback. Never affects virtual time.
    #[arg(short = 's', long = "tick-delay-ms")]
    pub tick_delay_ms: Option<u64>,
}

/// Reads and parses the payload file named by `path`.
pub fn load_payloads(path: &std::path::Path) -> Result<Vec<Payload>, SimError> {
    let contents = std::fs::read_to_string(path).map_err(|err| SimError::PayloadFileIo {
        path: path.display().to_string(),
        reason: err.to_string(),
    })?;
    parse_payload_file(&contents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_required_flags() {
        let cli = Cli::try_parse_from(["csma-cd-sim", "-N", "4", "-f", "payload.txt"]).unwrap();
        assert_eq!(cli.stations_count, 4);
        assert_eq!(cli.payload_file, PathBuf::from("payload.txt"));
        assert_eq!(cli.tick_delay_ms, None);
    }

    #[test]
    fn rejects_stations_count_above_max() {
        let result = Cli::try_parse_from(["csma-cd-sim", "-N", "2000", "-f", "payload.txt"]);
        assert!(result.is_err());
    }

    #[test]
    fn rejects_missing_payload_file_flag() {
        let result = Cli::try_parse_from(["csma-cd-sim", "-N", "4"]);
        assert!(result.is_err());
    }

    #[test]
    fn load_payloads_reports_missing_file_as_io_error() {
        let err = load_payloads(std::path::Path::new("/nonexistent/payload.txt")).unwrap_err();
        assert!(matches!(err, SimError::PayloadFileIo { .. }));
    }

    #[test]
    fn load_payloads_reads_and_parses_a_real_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("payload.txt");
        std::fs::write(&path, "0 1 hello\n").unwrap();
        let payloads = load_payloads(&path).unwrap();
        assert_eq!(payloads.len(), 1);
        assert_eq!(payloads[0].src_id, 0);
    }
}
