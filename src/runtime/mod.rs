//! The two entry points of a live engine, joined by lock-free rings.
//!
//! ```text
//!   control thread                         audio callback
//!  ┌──────────────┐  ControlMessage ring  ┌──────────────┐
//!  │  Controller  │ ───────────────────▶  │ AudioContext │
//!  │  (Panel)     │ ◀───────────────────  │  (Engine)    │
//!  └──────────────┘  EngineSnapshot ring  └──────────────┘
//! ```
//!
//! Each ring has exactly one writer. The audio side never blocks: a full
//! snapshot or scope ring drops the newest data, and the control side learns
//! about a full message ring through [`EngineError::QueueFull`].

use rtrb::{Consumer, Producer, PushError, RingBuffer};

use crate::{
    control::{ControlInputs, Panel},
    engine::{ControlMessage, Engine, EngineError, EngineSnapshot},
    MAX_BLOCK_SIZE,
};

/// Snapshots buffered between two control polls.
const SNAPSHOT_RING: usize = 32;

/// Audio-side half: owns the engine.
pub struct AudioContext {
    engine: Engine,
    control_rx: Consumer<ControlMessage>,
    snapshot_tx: Producer<EngineSnapshot>,
    scope_tx: Option<Producer<f32>>,
}

impl AudioContext {
    /// Fill an interleaved output buffer.
    ///
    /// Pending control messages are applied first, then the buffer is rendered
    /// in blocks of at most [`MAX_BLOCK_SIZE`] frames, publishing a snapshot
    /// after each block.
    pub fn process(&mut self, out: &mut [f32], channels: usize) {
        self.engine.drain(&mut self.control_rx);
        if channels == 0 {
            return;
        }

        for block in out.chunks_mut(MAX_BLOCK_SIZE * channels) {
            self.engine.process_interleaved(block, channels);

            if let Some(scope_tx) = self.scope_tx.as_mut() {
                for frame in block.chunks_exact(channels) {
                    if let Err(PushError::Full(_)) = scope_tx.push(frame[0]) {
                        break;
                    }
                }
            }

            // Drop on overflow; the control side only wants the latest.
            let _ = self.snapshot_tx.push(self.engine.snapshot());
        }
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }
}

/// Control-side half: turns panel polls into messages and tracks engine state.
pub struct Controller {
    panel: Panel,
    control_tx: Producer<ControlMessage>,
    snapshot_rx: Consumer<EngineSnapshot>,
    latest: EngineSnapshot,
    dropped: u64,
}

impl Controller {
    /// Send one message to the audio side.
    pub fn send(&mut self, message: ControlMessage) -> Result<(), EngineError> {
        self.control_tx
            .push(message)
            .map_err(|_| EngineError::QueueFull)
    }

    /// Translate one panel poll into messages and pick up the newest snapshot.
    ///
    /// Messages that do not fit in the ring are dropped and counted.
    pub fn control_tick(&mut self, inputs: &ControlInputs) -> &EngineSnapshot {
        let Self {
            panel,
            control_tx,
            dropped,
            ..
        } = self;
        panel.tick(inputs, |message| {
            if control_tx.push(message).is_err() {
                *dropped += 1;
                log::warn!("control queue full, dropped {:?}", message);
            }
        });
        self.poll_snapshot()
    }

    /// Drain the snapshot ring, keeping the newest.
    pub fn poll_snapshot(&mut self) -> &EngineSnapshot {
        while let Ok(snapshot) = self.snapshot_rx.pop() {
            self.latest = snapshot;
        }
        &self.latest
    }

    pub fn latest(&self) -> &EngineSnapshot {
        &self.latest
    }

    /// Messages lost to a full ring since creation.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

/// Split an engine into its audio and control halves.
///
/// `capacity` is the number of control messages that can be in flight.
pub fn channel(engine: Engine, capacity: usize) -> (AudioContext, Controller) {
    let (control_tx, control_rx) = RingBuffer::new(capacity);
    let (snapshot_tx, snapshot_rx) = RingBuffer::new(SNAPSHOT_RING);

    let panel = Panel::with_steps(
        engine.primary().len(),
        engine.secondary().len(),
        engine.pitch().len(),
    );
    let latest = engine.snapshot();

    log::debug!("runtime channel created, {} control slots", capacity);

    (
        AudioContext {
            engine,
            control_rx,
            snapshot_tx,
            scope_tx: None,
        },
        Controller {
            panel,
            control_tx,
            snapshot_rx,
            latest,
            dropped: 0,
        },
    )
}

/// Like [`channel`], plus a ring carrying the left output channel for a scope.
pub fn channel_with_scope(
    engine: Engine,
    capacity: usize,
    scope_capacity: usize,
) -> (AudioContext, Controller, Consumer<f32>) {
    let (mut audio, controller) = channel(engine, capacity);
    let (scope_tx, scope_rx) = RingBuffer::new(scope_capacity);
    audio.scope_tx = Some(scope_tx);
    (audio, controller, scope_rx)
}
