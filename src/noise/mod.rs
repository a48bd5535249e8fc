//! Noise propagation: expanding pulses, instant broadcasts and the payloads
//! handed to listeners.

pub mod event;
pub mod pulse;
pub mod system;

pub use event::{NoiseEvent, NoiseInbox, NoiseSignal, NoiseSink};
pub use pulse::{NoiseEmission, NoisePulse, PulseId, PulsePhase};
pub use system::NoiseSystem;
