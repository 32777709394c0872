//! The deterministic, time-stamped protocol trace.
//!
//! This is the simulator's primary observable output, kept deliberately
//! separate from the `log`-crate-based operational diagnostics in
//! [`crate::cli`]: it is written straight to an explicit [`std::io::Write`]
//! sink (stdout in production, an in-memory buffer in tests) so tests can
//! assert on it byte-for-byte without depending on a logging backend.

use std::io::Write;
use std::time::Duration;

use crate::constants::BROADCAST_SENTINEL;
use crate::frame::Frame;
use crate::payload::Payload;

/// Writes formatted protocol events to a sink, timestamped against the
/// simulation's virtual clock.
pub struct Logger {
    sink: Box<dyn Write + Send>,
    id_width: usize,
}

impl Logger {
    /// Creates a logger writing to `sink`. `max_station_id` sets the width
    /// the `station <id>` subject column is right-aligned to.
    pub fn new(sink: Box<dyn Write + Send>, max_station_id: usize) -> Self {
        Logger {
            sink,
            id_width: max_station_id.to_string().len(),
        }
    }

    fn subject_for(&self, station_id: usize) -> String {
        if station_id >= BROADCAST_SENTINEL {
            "all stations".to_string()
        } else {
            format!("station {station_id:>width$}", width = self.id_width)
        }
    }

    fn write_line(&mut self, clock: Duration, subject: &str, message: &str, suffix: Option<&str>) {
        let timestamp = format_timestamp(clock);
        let _ = write!(self.sink, "{timestamp}:\t{subject}:\t{message}");
        if let Some(suffix) = suffix {
            let _ = write!(self.sink, "{suffix}");
        }
        let _ = writeln!(self.sink);
    }

    /// Logs a plain message attributed to a single station.
    pub fn log_message(&mut self, clock: Duration, station_id: usize, message: &str) {
        let subject = self.subject_for(station_id);
        self.write_line(clock, &subject, message, None);
    }

    /// Logs a bus-level message (e.g. a collision).
    pub fn log_bus_message(&mut self, clock: Duration, message: &str) {
        self.write_line(clock, "-- bus --", message, None);
    }

    /// Logs a message about a payload, appending its source/destination/data.
    pub fn log_payload(&mut self, clock: Duration, station_id: usize, message: &str, payload: &Payload) {
        let subject = self.subject_for(station_id);
        let destination = if payload.is_broadcast() {
            "all stations".to_string()
        } else {
            format!("station {}", payload.dst_id)
        };
        let data = String::from_utf8_lossy(&payload.data);
        let suffix = format!(
            ",\tsource = station {},\tdestination = {destination},\tdata = \"{data}\"",
            payload.src_id
        );
        self.write_line(clock, &subject, message, Some(&suffix));
    }

    /// Logs a message about a frame on the bus, by reconstructing its payload.
    ///
    /// Silently does nothing if the frame's addresses don't decode (a
    /// corrupted frame should be reported via [`Logger::log_message`] instead).
    pub fn log_frame(&mut self, clock: Duration, station_id: usize, message: &str, frame: &Frame) {
        if let (Some(src_id), Some(dst_id)) = (frame.src_id(), frame.dst_id()) {
            let payload = Payload {
                src_id,
                dst_id,
                data: frame.payload_bytes().to_vec(),
            };
            self.log_payload(clock, station_id, message, &payload);
        }
    }
}

/// Formats a virtual clock reading as `HH:MM:SS.mmmuuu`.
fn format_timestamp(clock: Duration) -> String {
    let total_ns = clock.as_nanos();
    const NS_PER_US: u128 = 1_000;
    const NS_PER_MS: u128 = 1_000_000;
    const NS_PER_S: u128 = 1_000_000_000;
    const NS_PER_MIN: u128 = 60 * NS_PER_S;
    const NS_PER_HOUR: u128 = 60 * NS_PER_MIN;

    let hours = total_ns / NS_PER_HOUR;
    let rem = total_ns % NS_PER_HOUR;
    let minutes = rem / NS_PER_MIN;
    let rem = rem % NS_PER_MIN;
    let seconds = rem / NS_PER_S;
    let rem = rem % NS_PER_S;
    let millis = rem / NS_PER_MS;
    let micros = (rem % NS_PER_MS) / NS_PER_US;

    format!("{hours:02}:{minutes:02}:{seconds:02}.{millis:03}{micros:03}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_zero() {
        assert_eq!(format_timestamp(Duration::ZERO), "00:00:00.000000");
    }

    #[test]
    fn formats_one_tick() {
        assert_eq!(
            format_timestamp(crate::constants::TICK_DURATION),
            "00:00:00.051200"
        );
    }

    #[test]
    fn formats_past_an_hour() {
        let clock = Duration::from_nanos(3_661_123_456_000);
        assert_eq!(format_timestamp(clock), "01:01:01.123456");
    }

    #[test]
    fn subject_right_aligns_to_max_id_width() {
        let logger = Logger::new(Box::new(Vec::new()), 99);
        assert_eq!(logger.subject_for(5), "station  5");
        assert_eq!(logger.subject_for(42), "station 42");
    }

    #[test]
    fn subject_for_broadcast_sentinel_is_all_stations() {
        let logger = Logger::new(Box::new(Vec::new()), 9);
        assert_eq!(logger.subject_for(BROADCAST_SENTINEL), "all stations");
    }

    #[test]
    fn log_message_writes_expected_line() {
        let shared = crate::test_support::SharedBuf::default();
        let mut logger = Logger::new(Box::new(shared.clone()), 9);
        logger.log_message(Duration::ZERO, 3, "start sending frame");
        let text = String::from_utf8(shared.contents()).unwrap();
        assert_eq!(text, "00:00:00.000000:\tstation 3:\tstart sending frame\n");
    }
}
