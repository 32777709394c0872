//! Station id ↔ 6-byte MAC address codec.
//!
//! `id` is packed as a big-endian 24-bit integer into the low 3 bytes of
//! the address, behind the fixed unicast OUI, so that
//! `decode(encode(id)) == id` holds for every `id` in
//! `[0, MAX_STATIONS_COUNT)`.

use crate::constants::{BROADCAST_ADDRESS, BROADCAST_SENTINEL, MAX_STATIONS_COUNT, UNICAST_OUI};

/// Encodes a destination or source id into its on-wire 6-byte address.
///
/// `id >= MAX_STATIONS_COUNT` (the broadcast sentinel) maps to the fixed
/// broadcast address; callers are responsible for rejecting broadcast
/// source ids earlier (a frame's source can never be broadcast).
pub fn encode_address(id: usize) -> [u8; 6] {
    if id >= MAX_STATIONS_COUNT {
        return BROADCAST_ADDRESS;
    }
    let id = id as u32;
    [
        UNICAST_OUI[0],
        UNICAST_OUI[1],
        UNICAST_OUI[2],
        ((id >> 16) & 0xFF) as u8,
        ((id >> 8) & 0xFF) as u8,
        (id & 0xFF) as u8,
    ]
}

/// Decodes a 6-byte on-wire address back to a station id, or the broadcast
/// sentinel. Returns `None` if the address matches neither the unicast OUI
/// nor the broadcast pattern (a corrupted address).
pub fn decode_address(address: &[u8; 6]) -> Option<usize> {
    if *address == BROADCAST_ADDRESS {
        return Some(BROADCAST_SENTINEL);
    }
    if address[0..3] != UNICAST_OUI {
        return None;
    }
    let id = ((address[3] as u32) << 16) | ((address[4] as u32) << 8) | (address[5] as u32);
    let id = id as usize;
    if id < MAX_STATIONS_COUNT {
        Some(id)
    } else {
        None
    }
}

/// `true` iff `dst_id` denotes the broadcast sentinel rather than a real station.
pub fn is_broadcast(dst_id: usize) -> bool {
    dst_id >= MAX_STATIONS_COUNT
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_id_zero() {
        assert_eq!(decode_address(&encode_address(0)), Some(0));
    }

    #[test]
    fn round_trips_max_valid_id() {
        let id = MAX_STATIONS_COUNT - 1;
        assert_eq!(decode_address(&encode_address(id)), Some(id));
    }

    #[test]
    fn broadcast_round_trips_to_sentinel() {
        assert_eq!(
            decode_address(&encode_address(BROADCAST_SENTINEL)),
            Some(BROADCAST_SENTINEL)
        );
        assert_eq!(
            decode_address(&BROADCAST_ADDRESS),
            Some(BROADCAST_SENTINEL)
        );
    }

    #[test]
    fn corrupted_oui_decodes_to_none() {
        let bad = [0x11, 0x22, 0x33, 0x00, 0x00, 0x01];
        assert_eq!(decode_address(&bad), None);
    }
}
