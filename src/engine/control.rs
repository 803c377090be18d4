//! Messages from the control thread to the audio callback, and meter
//! readings travelling the other way.
//!
//! Both directions are single-producer single-consumer ring buffers. The
//! audio side only ever calls `pop`/`push`, which neither block nor allocate;
//! a full queue drops the newest item instead of waiting.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

#[cfg(feature = "rtrb")]
use rtrb::{Consumer, Producer, RingBuffer};

#[cfg(feature = "rtrb")]
use crate::engine::record::RecordTap;
use crate::{config::StageConfig, engine::pipeline::MeterReading};

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum ControlMessage {
    /// Replace a stage's parameters with a validated snapshot.
    SetParams { stage: usize, params: StageConfig },
    SetBypass { stage: usize, bypassed: bool },
    ToggleBypass { stage: usize },
    SetMetering(bool),
    /// Clear every stage's state (delay buffers, phaser memories, carries).
    Reset,
}

/// Audio-side end of the control link.
pub trait ControlPort: Send {
    fn poll(&mut self) -> Option<ControlMessage>;

    /// Hand a reading to the control thread. Dropped if nobody listens.
    fn publish(&mut self, _reading: MeterReading) {}

    /// See one processed stereo chunk, e.g. to record it.
    fn capture(&mut self, _left: &[f32], _right: &[f32]) {}
}

/// No control link: the pipeline runs with the parameters it was built with.
#[derive(Debug, Default, Clone, Copy)]
pub struct Detached;

impl ControlPort for Detached {
    fn poll(&mut self) -> Option<ControlMessage> {
        None
    }
}

#[cfg(feature = "rtrb")]
impl ControlPort for Consumer<ControlMessage> {
    fn poll(&mut self) -> Option<ControlMessage> {
        Consumer::pop(self).ok()
    }
}

/// Audio-side queues: commands in, readings out.
#[cfg(feature = "rtrb")]
pub struct ControlChannel {
    commands: Consumer<ControlMessage>,
    readings: Producer<MeterReading>,
    record: Option<RecordTap>,
}

#[cfg(feature = "rtrb")]
impl ControlChannel {
    /// Feed processed output into a recording tap.
    pub fn with_recorder(mut self, tap: RecordTap) -> Self {
        self.record = Some(tap);
        self
    }
}

#[cfg(feature = "rtrb")]
impl ControlPort for ControlChannel {
    fn poll(&mut self) -> Option<ControlMessage> {
        self.commands.pop().ok()
    }

    fn publish(&mut self, reading: MeterReading) {
        let _ = self.readings.push(reading);
    }

    fn capture(&mut self, left: &[f32], right: &[f32]) {
        if let Some(tap) = self.record.as_mut() {
            tap.capture(left, right);
        }
    }
}

/// Control-thread side of a [`ControlChannel`].
#[cfg(feature = "rtrb")]
pub struct ControlHandle {
    commands: Producer<ControlMessage>,
    readings: Consumer<MeterReading>,
}

#[cfg(feature = "rtrb")]
impl ControlHandle {
    /// Queue a message. Gives it back if the queue is full.
    pub fn send(&mut self, message: ControlMessage) -> Result<(), ControlMessage> {
        self.commands
            .push(message)
            .map_err(|err| match err {
                rtrb::PushError::Full(message) => message,
            })
    }

    /// Drain every reading published since the last call.
    pub fn readings(&mut self) -> impl Iterator<Item = MeterReading> + '_ {
        std::iter::from_fn(move || self.readings.pop().ok())
    }

    /// Most recent reading, discarding older ones.
    pub fn latest_reading(&mut self) -> Option<MeterReading> {
        self.readings().last()
    }
}

/// Create a linked pair of control queues, each holding `capacity` items.
#[cfg(feature = "rtrb")]
pub fn control_channel(capacity: usize) -> (ControlHandle, ControlChannel) {
    let (command_tx, command_rx) = RingBuffer::new(capacity);
    let (reading_tx, reading_rx) = RingBuffer::new(capacity);
    (
        ControlHandle {
            commands: command_tx,
            readings: reading_rx,
        },
        ControlChannel {
            commands: command_rx,
            readings: reading_tx,
            record: None,
        },
    )
}

/// Cooperative stop flag shared between the callback and its owner.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_stop(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}
