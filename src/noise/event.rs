//! Noise payloads and the per-guard single-slot inbox.

use glam::Vec2;

use crate::spatial::ListenerId;

/// Noise delivered to a listener.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoiseEvent {
    /// Where the noise started.
    pub origin: Vec2,
    /// Radius of the ring when the listener was reached.
    pub current_radius: f32,
    /// Full radius of the noise.
    pub max_radius: f32,
    /// Simulation time of delivery.
    pub timestamp: f32,
    /// Loudness at the listener, `0..=1`.
    pub strength: f32,
}

/// Receiver of noise deliveries, keyed by listener identity.
pub trait NoiseSink {
    /// Hand `event` to `listener`.
    fn deliver(&mut self, listener: ListenerId, event: &NoiseEvent);
}

impl NoiseSink for Vec<(ListenerId, NoiseEvent)> {
    fn deliver(&mut self, listener: ListenerId, event: &NoiseEvent) {
        self.push((listener, *event));
    }
}

/// A noise accepted by a guard, waiting to be investigated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoiseSignal {
    /// Point to investigate.
    pub point: Vec2,
    /// Time the noise was accepted.
    pub time: f32,
    /// Loudness as heard by the guard.
    pub strength: f32,
}

/// Single-slot mailbox; a newer write replaces an unconsumed signal.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NoiseInbox {
    slot: Option<NoiseSignal>,
}

impl NoiseInbox {
    /// Store `signal`, overwriting any pending one.
    pub const fn write(&mut self, signal: NoiseSignal) {
        self.slot = Some(signal);
    }

    /// Pending signal, if any, without consuming it.
    #[must_use]
    pub const fn peek(&self) -> Option<&NoiseSignal> {
        self.slot.as_ref()
    }

    /// Consume the pending signal.
    pub const fn take(&mut self) -> Option<NoiseSignal> {
        self.slot.take()
    }

    /// Whether a signal is waiting.
    #[must_use]
    pub const fn has_signal(&self) -> bool {
        self.slot.is_some()
    }

    /// Drop the pending signal.
    pub const fn clear(&mut self) {
        self.slot = None;
    }
}
