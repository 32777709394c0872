//! A discrete-event simulator of the CSMA/CD medium-access protocol.
//!
//! Stations share a single bus and advance a virtual clock in fixed
//! `kTickDuration` steps; each tick drives carrier sense, transmission,
//! collision detection and backoff, and reception, producing a
//! deterministic, time-stamped protocol trace.
//!
//! ```no_run
//! use csma_cd_sim::payload::Payload;
//! use csma_cd_sim::simulator::Simulator;
//!
//! let payloads = vec![Payload { src_id: 0, dst_id: 1, data: b"hello".to_vec() }];
//! let mut sim = Simulator::new(2, payloads, None, Box::new(std::io::stdout())).unwrap();
//! while !sim.is_idle() {
//!     sim.process_tick();
//! }
//! ```

pub mod address;
pub mod bus;
pub mod cli;
pub mod constants;
pub mod crc;
pub mod error;
pub mod frame;
pub mod logger;
pub mod logging;
pub mod payload;
pub mod simulator;
pub mod station;

#[cfg(any(test, feature = "test-util"))]
pub mod test_support;

pub use error::SimError;
pub use frame::Frame;
pub use payload::Payload;
pub use simulator::Simulator;
