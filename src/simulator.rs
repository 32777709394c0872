//! The tick driver, wiring together the clock, bus, stations, and logger.
//! Medium state lives in [`crate::bus::Bus`]; this module owns the clock
//! and station roster and orchestrates each tick, so a station never holds
//! a reference back to the container that owns it.

use std::io::Write;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::bus::Bus;
use crate::constants::{BROADCAST_SENTINEL, MAX_PAYLOAD_DATA_LEN, MAX_STATIONS_COUNT, TICK_DURATION};
use crate::error::SimError;
use crate::frame::Frame;
use crate::logger::Logger;
use crate::payload::Payload;
use crate::station::Station;

/// Owns the whole simulation: virtual clock, bus, station roster, and trace logger.
pub struct Simulator {
    clock: Duration,
    bus: Bus,
    stations: Vec<Station>,
    logger: Logger,
}

impl Simulator {
    /// Builds a simulation with `stations_count` stations, pre-loading each
    /// payload onto its source station's queue.
    ///
    /// `seed` fixes every station's RNG from a single base seed (offset by
    /// station id) for deterministic tests; `None` seeds each station from OS
    /// entropy for production use.
    pub fn new(
        stations_count: usize,
        payloads: Vec<Payload>,
        seed: Option<u64>,
        sink: Box<dyn Write + Send>,
    ) -> Result<Self, SimError> {
        if stations_count > MAX_STATIONS_COUNT {
            return Err(SimError::TooManyStations {
                requested: stations_count,
                max: MAX_STATIONS_COUNT,
            });
        }

        let mut stations: Vec<Station> = (0..stations_count)
            .map(|id| Station::new(id, seed_rng(seed, id)))
            .collect();

        for payload in payloads {
            if payload.src_id >= stations_count {
                return Err(SimError::UnknownSource { src_id: payload.src_id });
            }
            if payload.dst_id >= stations_count && payload.dst_id < BROADCAST_SENTINEL {
                return Err(SimError::UnknownDestination { dst_id: payload.dst_id });
            }
            if payload.data.len() > MAX_PAYLOAD_DATA_LEN {
                return Err(SimError::PayloadTooLarge {
                    len: payload.data.len(),
                    max: MAX_PAYLOAD_DATA_LEN,
                });
            }
            stations[payload.src_id].add_payload(payload);
        }

        let max_station_id = stations_count.saturating_sub(1);
        Ok(Simulator {
            clock: Duration::ZERO,
            bus: Bus::new(),
            stations,
            logger: Logger::new(sink, max_station_id),
        })
    }

    /// `true` once the bus is free and every station is idle.
    pub fn is_idle(&self) -> bool {
        self.bus.is_free() && !self.bus.is_jammed() && self.stations.iter().all(Station::is_idle)
    }

    pub fn clock(&self) -> Duration {
        self.clock
    }

    /// Runs one tick: polls every station against the frozen bus snapshot in
    /// ascending id order, then applies the bus transition, then advances the
    /// clock.
    pub fn process_tick(&mut self) {
        let snapshot = self.bus.snapshot();
        let mut frequency_rate: u32 = if snapshot.free { 0 } else { 1 };
        let mut selected_payload: Option<Payload> = None;

        for station in &mut self.stations {
            let was_idle = station.is_idle();
            if let Some(payload) = station.process_tick(self.clock, &mut self.logger, &snapshot) {
                frequency_rate += 1;
                if frequency_rate > 1 {
                    self.logger.log_bus_message(
                        self.clock,
                        &format!("collision,\trate {frequency_rate}"),
                    );
                }
                selected_payload = Some(payload);
            }
            if !was_idle && station.is_idle() {
                self.logger
                    .log_bus_message(self.clock, &format!("station {} now idle", station.id()));
            }
        }

        let collided = frequency_rate > 1;
        let new_frame = selected_payload
            .map(|payload| Frame::new(payload.src_id, payload.dst_id, &payload.data))
            .transpose()
            .expect("a station only ever offers a payload it already validated");

        self.bus.advance(new_frame, collided);
        self.clock += TICK_DURATION;
    }

    /// Presets a station's collision counter, driving it to retry-exhaustion
    /// without waiting on sixteen real collisions.
    #[cfg(any(test, feature = "test-util"))]
    pub fn set_retry_count_for_test(&mut self, station_id: usize, retry_count: u32) {
        self.stations[station_id].set_retry_count_for_test(retry_count);
    }

    /// Injects a frame directly onto the bus, bypassing station arbitration,
    /// to simulate a frame appearing on the wire outside normal arbitration.
    #[cfg(any(test, feature = "test-util"))]
    pub fn inject_frame_for_test(&mut self, frame: Frame) {
        self.bus.inject_frame_for_test(frame);
    }
}

fn seed_rng(base_seed: Option<u64>, station_id: usize) -> StdRng {
    match base_seed {
        Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(station_id as u64)),
        None => StdRng::from_entropy(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(src: usize, dst: usize, data: &[u8]) -> Payload {
        Payload { src_id: src, dst_id: dst, data: data.to_vec() }
    }

    #[test]
    fn rejects_too_many_stations() {
        let err = Simulator::new(MAX_STATIONS_COUNT + 1, vec![], Some(0), Box::new(Vec::new()))
            .unwrap_err();
        assert!(matches!(err, SimError::TooManyStations { .. }));
    }

    #[test]
    fn rejects_payload_from_unknown_source() {
        let err = Simulator::new(2, vec![payload(5, 0, b"x")], Some(0), Box::new(Vec::new()))
            .unwrap_err();
        assert!(matches!(err, SimError::UnknownSource { src_id: 5 }));
    }

    #[test]
    fn rejects_payload_to_unknown_destination() {
        let err = Simulator::new(2, vec![payload(0, 5, b"x")], Some(0), Box::new(Vec::new()))
            .unwrap_err();
        assert!(matches!(err, SimError::UnknownDestination { dst_id: 5 }));
    }

    #[test]
    fn broadcast_destination_is_accepted_regardless_of_station_count() {
        let sim = Simulator::new(2, vec![payload(0, BROADCAST_SENTINEL, b"x")], Some(0), Box::new(Vec::new()));
        assert!(sim.is_ok());
    }

    #[test]
    fn single_sender_eventually_goes_idle() {
        let mut sim = Simulator::new(2, vec![payload(0, 1, b"hello")], Some(1), Box::new(Vec::new())).unwrap();
        assert!(!sim.is_idle());
        let mut ticks = 0;
        while !sim.is_idle() && ticks < 1_000 {
            sim.process_tick();
            ticks += 1;
        }
        assert!(sim.is_idle());
    }

    #[test]
    fn empty_simulation_is_immediately_idle() {
        let sim = Simulator::new(0, vec![], Some(0), Box::new(Vec::new())).unwrap();
        assert!(sim.is_idle());
    }

    #[test]
    fn logs_now_idle_the_tick_a_station_finishes_its_queue() {
        let shared = crate::test_support::SharedBuf::default();
        let mut sim = Simulator::new(2, vec![payload(0, 1, b"hi")], Some(1), Box::new(shared.clone()))
            .unwrap();
        let mut ticks = 0;
        while !sim.is_idle() && ticks < 1_000 {
            sim.process_tick();
            ticks += 1;
        }
        let log = String::from_utf8(shared.contents()).unwrap();
        assert!(log.contains("station 0 now idle"));
    }

    #[test]
    fn rejects_oversized_payload_data_at_construction() {
        let data = vec![b'x'; crate::constants::MAX_PAYLOAD_DATA_LEN + 1];
        let err = Simulator::new(2, vec![payload(0, 1, &data)], Some(0), Box::new(Vec::new()))
            .unwrap_err();
        assert!(matches!(err, SimError::PayloadTooLarge { .. }));
    }

    #[test]
    fn identical_seed_produces_identical_trace() {
        let run = |seed: u64| {
            let shared = crate::test_support::SharedBuf::default();
            let mut sim = Simulator::new(
                4,
                vec![payload(0, 1, b"hi"), payload(2, 3, b"there")],
                Some(seed),
                Box::new(shared.clone()),
            )
            .unwrap();
            let mut ticks = 0;
            while !sim.is_idle() && ticks < 1_000 {
                sim.process_tick();
                ticks += 1;
            }
            shared.contents()
        };
        assert_eq!(run(7), run(7));
    }
}
