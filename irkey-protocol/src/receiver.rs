//! IR capture capability
//!
//! The capture driver timestamps edges (possibly in interrupt context) and
//! hands over one finished frame at a time. The frame stays held until
//! [`IrReceiver::rearm`] discards it and re-enables capture.

use std::collections::VecDeque;

use crate::types::RawFrame;

pub trait IrReceiver {
    /// The captured frame waiting for decode, if any
    fn try_receive(&mut self) -> Option<RawFrame>;

    /// Discard the held frame and arm for the next transmission
    fn rearm(&mut self);
}

/// Receiver backed by a queue of pre-recorded frames
#[derive(Debug, Default)]
pub struct QueueReceiver {
    frames: VecDeque<RawFrame>,
    rearms: usize,
}

impl QueueReceiver {
    pub fn new(frames: impl IntoIterator<Item = RawFrame>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
            rearms: 0,
        }
    }

    pub fn push(&mut self, frame: RawFrame) {
        self.frames.push_back(frame);
    }

    /// Frames not yet discarded
    pub fn pending(&self) -> usize {
        self.frames.len()
    }

    /// How many times `rearm` was called
    pub fn rearm_count(&self) -> usize {
        self.rearms
    }
}

impl IrReceiver for QueueReceiver {
    fn try_receive(&mut self) -> Option<RawFrame> {
        self.frames.front().cloned()
    }

    fn rearm(&mut self) {
        self.frames.pop_front();
        self.rearms += 1;
    }
}
