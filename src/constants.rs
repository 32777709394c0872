//! CSMA/CD protocol constants.

use std::time::Duration;

/// Maximum number of stations the bus can be constructed with.
pub const MAX_STATIONS_COUNT: usize = 1024;

/// A payload's `dst_id` at or above this value is the broadcast sentinel.
pub const BROADCAST_SENTINEL: usize = MAX_STATIONS_COUNT;

/// Collisions allowed per payload before it is dropped.
pub const MAX_RETRIES: u32 = 16;

/// Upper bound on the backoff exponent (`2^min(MAX_SLEEP_INCREASE, retry_count)`).
pub const MAX_SLEEP_INCREASE: u32 = 10;

/// Ticks a frame occupies the bus: `1526 bytes * 8 bits / 512 slot-time units`.
pub const FRAME_LENGTH_IN_TICKS: u32 = 24;

/// Virtual duration of one simulation tick.
pub const TICK_DURATION: Duration = Duration::from_nanos(51_200);

/// Maximum payload data length, in bytes.
pub const MAX_PAYLOAD_DATA_LEN: usize = 1500;

/// Fixed "length" field value stamped into every frame.
pub const FRAME_DATA_LEN: u16 = 1500;

/// Organizationally-unique-identifier prefix for unicast addresses.
pub const UNICAST_OUI: [u8; 3] = [0x00, 0xBA, 0xBA];

/// The fixed broadcast MAC address.
pub const BROADCAST_ADDRESS: [u8; 6] = [0x80, 0xBA, 0xBA, 0xFF, 0xFF, 0xFF];

/// Frame preamble byte, repeated 7 times.
pub const PREAMBLE_BYTE: u8 = 0xAA;

/// Preamble length in bytes.
pub const PREAMBLE_LEN: usize = 7;

/// Start-of-frame delimiter.
pub const START_OF_FRAME_DELIM: u8 = 0xAB;

/// Total wire size of a frame, in bytes (1526).
pub const FRAME_WIRE_LEN: usize =
    PREAMBLE_LEN + 1 + 6 + 6 + 2 + MAX_PAYLOAD_DATA_LEN + 4;
