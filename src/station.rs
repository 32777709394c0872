//! A single station's CSMA/CD state machine: receive and send sub-phases,
//! force-stop-on-collision semantics, and truncated binary exponential
//! backoff.

use std::collections::VecDeque;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::Rng;

use crate::constants::{BROADCAST_SENTINEL, MAX_SLEEP_INCREASE};
use crate::frame::Frame;
use crate::logger::Logger;
use crate::payload::Payload;

/// The bus state a station observes during one tick, frozen at tick entry:
/// every station sees the same snapshot regardless of poll order.
pub struct BusSnapshot<'a> {
    pub jammed: bool,
    pub free: bool,
    pub new_frame_start: bool,
    pub frame: Option<&'a Frame>,
}

/// One station on the shared bus.
pub struct Station {
    id: usize,
    queue: VecDeque<Payload>,
    sleep_timer: u32,
    is_receiving_frame: bool,
    is_sending_frame: bool,
    retry_count: u32,
    rng: StdRng,
}

impl Station {
    pub fn new(id: usize, rng: StdRng) -> Self {
        Station {
            id,
            queue: VecDeque::new(),
            sleep_timer: 0,
            is_receiving_frame: false,
            is_sending_frame: false,
            retry_count: 0,
            rng,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    /// Queues a payload for this station to send.
    pub fn add_payload(&mut self, payload: Payload) {
        self.queue.push_back(payload);
    }

    /// `true` iff this station has nothing left to do: not sleeping, not
    /// mid-transmission, and no queued payload.
    pub fn is_idle(&self) -> bool {
        self.sleep_timer == 0 && !self.is_sending_frame && self.queue.is_empty()
    }

    /// Runs one tick: receive sub-phase, then send sub-phase. Returns the
    /// payload this station wants to put on the bus this tick, if any.
    pub fn process_tick(
        &mut self,
        clock: Duration,
        logger: &mut Logger,
        bus: &BusSnapshot<'_>,
    ) -> Option<Payload> {
        self.process_receive(clock, logger, bus);
        self.process_send(clock, logger, bus)
    }

    fn process_receive(&mut self, clock: Duration, logger: &mut Logger, bus: &BusSnapshot<'_>) {
        if bus.jammed {
            self.force_stop_receive(clock, logger);
            return;
        }

        let Some(frame) = bus.frame else {
            return;
        };

        if !frame.verify() {
            logger.log_message(clock, self.id, "!!! received corrupted frame");
            self.force_stop_receive(clock, logger);
            return;
        }

        let (Some(src_id), Some(dst_id)) = (frame.src_id(), frame.dst_id()) else {
            logger.log_message(clock, self.id, "!!! received corrupted frame");
            self.force_stop_receive(clock, logger);
            return;
        };

        let addressed_to_us = (dst_id >= BROADCAST_SENTINEL || dst_id == self.id) && src_id != self.id;
        if !addressed_to_us {
            self.force_stop_receive(clock, logger);
            return;
        }

        if bus.new_frame_start {
            self.force_stop_receive(clock, logger);
            logger.log_frame(clock, self.id, "start receiving frame", frame);
            self.is_receiving_frame = true;
        } else if bus.free {
            if self.is_receiving_frame {
                logger.log_frame(clock, self.id, "successfully received frame", frame);
            } else {
                logger.log_frame(clock, self.id, "!!! missed frame", frame);
            }
            self.is_receiving_frame = false;
        }
        // else: frame still mid-flight, hold state unchanged.
    }

    fn process_send(
        &mut self,
        clock: Duration,
        logger: &mut Logger,
        bus: &BusSnapshot<'_>,
    ) -> Option<Payload> {
        if self.sleep_timer > 0 {
            self.sleep_timer -= 1;
            return None;
        }

        if self.is_sending_frame {
            if bus.jammed {
                self.is_sending_frame = false;
                self.retry_count += 1;
                if self.retry_count > crate::constants::MAX_RETRIES {
                    if let Some(payload) = self.queue.front() {
                        logger.log_payload(clock, self.id, "max retries exceeded while sending frame", payload);
                    }
                    self.force_stop_send();
                    return None;
                }
                logger.log_message(clock, self.id, &format!("retry count = {}", self.retry_count));
                self.start_sleep();
                return None;
            }
            if bus.free {
                if let Some(payload) = self.queue.front() {
                    logger.log_payload(clock, self.id, "finish sending frame", payload);
                }
                self.force_stop_send();
            } else {
                return None;
            }
        }

        if let Some(payload) = self.queue.front() {
            if bus.free {
                self.is_sending_frame = true;
                logger.log_payload(clock, self.id, "start sending frame", payload);
                return Some(payload.clone());
            }
            self.start_sleep();
        }

        None
    }

    fn start_sleep(&mut self) {
        let max_delay = 2u32.pow(MAX_SLEEP_INCREASE.min(self.retry_count));
        self.sleep_timer = self.rng.gen_range(0..=max_delay);
    }

    fn force_stop_receive(&mut self, clock: Duration, logger: &mut Logger) {
        if self.is_receiving_frame {
            logger.log_message(clock, self.id, "!!! frame receive interrupt");
        }
        self.is_receiving_frame = false;
    }

    fn force_stop_send(&mut self) {
        self.is_sending_frame = false;
        self.retry_count = 0;
        self.queue.pop_front();
    }

    /// Presets the collision counter, so a test can drive a station to
    /// retry-exhaustion after a single additional collision instead of
    /// waiting on sixteen real ones.
    #[cfg(any(test, feature = "test-util"))]
    pub fn set_retry_count_for_test(&mut self, retry_count: u32) {
        self.retry_count = retry_count;
    }
}
