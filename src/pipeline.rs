//! Receive, decode, dispatch, rearm
//!
//! One [`Pipeline::poll`] handles at most one captured frame. The receiver is
//! rearmed after every decode attempt, whatever the outcome, so a bad frame
//! never affects the next one.

use c64_matrix::{Dispatched, KeyEventDispatcher, MatrixError, SharedController, SwitchLines};
use irkey_protocol::{FrameValidator, IrReceiver, KeyEvent, ProtocolError};
use tracing::{debug, info, warn};

/// Joystick state delivered to the sink
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JoystickState {
    pub x: i8,
    pub y: i8,
    pub button1: bool,
    pub button2: bool,
}

/// Consumer of joystick events (the matrix is never touched by them)
pub trait JoystickSink {
    fn update(&mut self, state: JoystickState);
}

/// Sink that only logs
#[derive(Debug, Default)]
pub struct LoggingJoystickSink {
    last: Option<JoystickState>,
}

impl JoystickSink for LoggingJoystickSink {
    fn update(&mut self, state: JoystickState) {
        if self.last != Some(state) {
            info!(
                "Joystick x={:+4} y={:+4} b1={} b2={}",
                state.x, state.y, state.button1 as u8, state.button2 as u8
            );
        }
        self.last = Some(state);
    }
}

/// What happened to one frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Key edge applied to the matrix (or an invalid event skipped)
    Dispatched(Dispatched),
    /// Joystick event handed to the sink
    Joystick(JoystickState),
    /// Joystick event dropped because forwarding is off
    JoystickDropped,
    /// Frame failed to decode or validate
    Rejected(ProtocolError),
    /// Valid key with no translation
    Unmapped(MatrixError),
}

/// Running counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    pub frames: usize,
    pub keys: usize,
    pub joystick: usize,
    pub malformed: usize,
    pub checksum_failures: usize,
    pub unmapped: usize,
}

impl PipelineStats {
    fn record(&mut self, outcome: &FrameOutcome) {
        self.frames += 1;
        match outcome {
            FrameOutcome::Dispatched(Dispatched::Applied { .. }) => self.keys += 1,
            FrameOutcome::Dispatched(_) => {}
            FrameOutcome::Joystick(_) | FrameOutcome::JoystickDropped => self.joystick += 1,
            FrameOutcome::Rejected(e) if e.is_malformed() => self.malformed += 1,
            FrameOutcome::Rejected(_) => self.checksum_failures += 1,
            FrameOutcome::Unmapped(_) => self.unmapped += 1,
        }
    }
}

pub struct Pipeline<R, L, J> {
    receiver: R,
    validator: FrameValidator,
    dispatcher: KeyEventDispatcher,
    controller: SharedController<L>,
    sink: J,
    forward_joystick: bool,
    stats: PipelineStats,
}

impl<R, L, J> Pipeline<R, L, J>
where
    R: IrReceiver,
    L: SwitchLines,
    J: JoystickSink,
{
    pub fn new(
        receiver: R,
        validator: FrameValidator,
        dispatcher: KeyEventDispatcher,
        controller: SharedController<L>,
        sink: J,
    ) -> Self {
        Self {
            receiver,
            validator,
            dispatcher,
            controller,
            sink,
            forward_joystick: true,
            stats: PipelineStats::default(),
        }
    }

    pub fn with_joystick_forwarding(mut self, forward: bool) -> Self {
        self.forward_joystick = forward;
        self
    }

    pub fn controller(&self) -> &SharedController<L> {
        &self.controller
    }

    pub fn receiver(&self) -> &R {
        &self.receiver
    }

    pub fn sink(&self) -> &J {
        &self.sink
    }

    pub fn stats(&self) -> PipelineStats {
        self.stats
    }

    /// Process the pending frame, if any
    pub fn poll(&mut self) -> Option<FrameOutcome> {
        let frame = self.receiver.try_receive()?;
        let outcome = match self.validator.decode(&frame) {
            Ok(event) => self.handle_event(event),
            Err(e) => {
                match e {
                    ProtocolError::ChecksumMismatch { .. } => warn!("Discarding frame: {}", e),
                    _ => debug!("Discarding frame of {} pulses: {}", frame.len(), e),
                }
                FrameOutcome::Rejected(e)
            }
        };
        self.receiver.rearm();
        self.stats.record(&outcome);
        Some(outcome)
    }

    /// Drain the receiver
    pub fn run(&mut self) -> PipelineStats {
        while self.poll().is_some() {}
        self.stats
    }

    fn handle_event(&mut self, event: KeyEvent) -> FrameOutcome {
        if let KeyEvent::Joystick {
            x,
            y,
            button1,
            button2,
        } = event
        {
            if !self.forward_joystick {
                return FrameOutcome::JoystickDropped;
            }
            let state = JoystickState {
                x,
                y,
                button1,
                button2,
            };
            self.sink.update(state);
            return FrameOutcome::Joystick(state);
        }

        let mut controller = self.controller.lock();
        match self.dispatcher.dispatch(&event, &mut controller) {
            Ok(dispatched) => FrameOutcome::Dispatched(dispatched),
            Err(e) => {
                debug!("Ignoring key: {}", e);
                FrameOutcome::Unmapped(e)
            }
        }
    }
}
