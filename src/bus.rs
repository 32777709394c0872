//! The shared bus: carrier/jam state plus per-tick concurrent-sender
//! detection, kept separate from station storage so the tick driver in
//! [`crate::simulator`] can own stations and bus independently without a
//! reference cycle.

use crate::constants::FRAME_LENGTH_IN_TICKS;
use crate::frame::Frame;
use crate::station::BusSnapshot;

/// State of the shared medium: idle, carrying a frame, or jammed by a collision.
pub struct Bus {
    frame: Option<Frame>,
    send_timer: u32,
    jammed: bool,
}

/// A coarse view of [`Bus`] state, useful for asserting invariants in tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusState {
    Free,
    Carrying,
    Jammed,
}

impl Bus {
    pub fn new() -> Self {
        Bus {
            frame: None,
            send_timer: 0,
            jammed: false,
        }
    }

    pub fn is_jammed(&self) -> bool {
        self.jammed
    }

    pub fn is_free(&self) -> bool {
        !self.jammed && self.send_timer == 0
    }

    pub fn is_new_frame_start(&self) -> bool {
        self.send_timer == FRAME_LENGTH_IN_TICKS - 1
    }

    pub fn frame(&self) -> Option<&Frame> {
        self.frame.as_ref()
    }

    pub fn state(&self) -> BusState {
        if self.jammed {
            BusState::Jammed
        } else if self.frame.is_some() {
            BusState::Carrying
        } else {
            BusState::Free
        }
    }

    /// The snapshot every station observes this tick, frozen before any
    /// station is polled.
    pub fn snapshot(&self) -> BusSnapshot<'_> {
        BusSnapshot {
            jammed: self.jammed,
            free: self.is_free(),
            new_frame_start: self.is_new_frame_start(),
            frame: self.frame.as_ref(),
        }
    }

    /// Clears a prior jam, retires an expired frame, ages the send timer,
    /// then latches a new jam or loads a newly-selected frame, given the
    /// outcome of polling every station this tick (the winning payload's
    /// frame, if any, already constructed by the caller, plus whether more
    /// than one station emitted).
    pub fn advance(&mut self, new_frame: Option<Frame>, collided: bool) {
        if self.jammed {
            self.jammed = false;
            self.send_timer = 0;
        }
        if self.send_timer == 0 && self.frame.is_some() {
            self.frame = None;
        }
        if self.send_timer > 0 {
            self.send_timer -= 1;
        }

        if collided {
            self.jammed = true;
        }

        // A jam just latched this tick takes precedence over loading a new
        // frame, even though one was selected during polling.
        if let Some(frame) = new_frame {
            if !self.jammed {
                self.frame = Some(frame);
                self.send_timer = FRAME_LENGTH_IN_TICKS - 1;
            }
        }
    }

    #[cfg(any(test, feature = "test-util"))]
    pub fn inject_frame_for_test(&mut self, frame: Frame) {
        self.frame = Some(frame);
        self.send_timer = FRAME_LENGTH_IN_TICKS - 1;
        self.jammed = false;
    }
}

impl Default for Bus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_free() {
        let bus = Bus::new();
        assert_eq!(bus.state(), BusState::Free);
        assert!(bus.is_free());
        assert!(!bus.is_jammed());
    }

    #[test]
    fn loading_a_frame_marks_bus_carrying_and_starts_timer() {
        let mut bus = Bus::new();
        let frame = Frame::new(0, 1, b"hi").unwrap();
        bus.advance(Some(frame), false);
        assert_eq!(bus.state(), BusState::Carrying);
        assert!(!bus.is_free());
        assert!(bus.is_new_frame_start());
    }

    #[test]
    fn collision_jams_and_suppresses_frame_load() {
        let mut bus = Bus::new();
        let frame = Frame::new(0, 1, b"hi").unwrap();
        bus.advance(Some(frame), true);
        assert_eq!(bus.state(), BusState::Jammed);
        assert!(bus.frame().is_none());
    }

    #[test]
    fn jam_clears_after_one_tick() {
        let mut bus = Bus::new();
        let frame = Frame::new(0, 1, b"hi").unwrap();
        bus.advance(Some(frame), true);
        assert!(bus.is_jammed());
        bus.advance(None, false);
        assert!(!bus.is_jammed());
        assert!(bus.is_free());
    }

    #[test]
    fn frame_retires_once_timer_expires() {
        let mut bus = Bus::new();
        let frame = Frame::new(0, 1, b"hi").unwrap();
        bus.advance(Some(frame), false);
        for _ in 0..FRAME_LENGTH_IN_TICKS {
            bus.advance(None, false);
        }
        assert_eq!(bus.state(), BusState::Free);
    }
}
