//! Audio seams used by the game. The game only ever starts a mono 16-bit
//! stream with a fill callback and then brackets its own writes to shared
//! mixer state with `lock`/`unlock`. Music is a fire-and-forget trigger.

use std::error::Error;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

pub const AUDIO_FREQ: i32 = 22050;
pub const AUDIO_CHANNELS: u8 = 1;
/// Samples per callback
pub const AUDIO_SAMPLES: u16 = 2048;

/// Fills one buffer of signed 16-bit mono samples. Runs on the audio thread.
pub type AudioFill = Box<dyn FnMut(&mut [i16]) + Send>;

#[derive(Debug)]
pub enum AudioError {
    /// The device could not be opened
    Open(String),
}

impl fmt::Display for AudioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AudioError::Open(e) => write!(f, "could not open audio device: {e}"),
        }
    }
}

impl Error for AudioError {}

pub trait AudioServer {
    /// Open the device and begin pulling samples from `fill`
    fn start(&mut self, fill: AudioFill) -> Result<(), AudioError>;

    /// Close the device, the fill callback is dropped
    fn stop(&mut self);

    /// Wait for any running fill to finish and hold further fills off until
    /// `unlock`
    fn lock(&mut self);

    fn unlock(&mut self);

    fn pause(&mut self, paused: bool);
}

/// Plays one of the game's music tracks
pub trait MusicPlayer {
    fn play_music(&mut self, track: u8);
}

#[derive(Default)]
struct GateState {
    fill: Option<AudioFill>,
    locked: bool,
}

/// Shared between the game thread and the audio callback. Holding the mutex
/// for the whole fill makes `lock` wait for a fill in flight.
#[derive(Default, Clone)]
pub struct AudioGate {
    state: Arc<Mutex<GateState>>,
}

impl AudioGate {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, GateState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_fill(&self, fill: Option<AudioFill>) {
        self.state().fill = fill;
    }

    pub fn has_fill(&self) -> bool {
        self.state().fill.is_some()
    }

    pub fn lock(&self) {
        self.state().locked = true;
    }

    pub fn unlock(&self) {
        self.state().locked = false;
    }

    pub fn is_locked(&self) -> bool {
        self.state().locked
    }

    /// Called from the audio thread. Silence while locked or unset.
    pub fn render(&self, out: &mut [i16]) {
        let mut state = self.state();
        let GateState { fill, locked } = &mut *state;
        match fill {
            Some(fill) if !*locked => fill(out),
            _ => out.fill(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[test]
    fn silent_without_fill() {
        let gate = AudioGate::new();
        let mut buf = [7i16; 16];
        gate.render(&mut buf);
        assert!(buf.iter().all(|s| *s == 0));
    }

    #[test]
    fn fill_runs_until_locked() {
        let calls = Arc::new(AtomicUsize::new(0));
        let c = calls.clone();
        let gate = AudioGate::new();
        gate.set_fill(Some(Box::new(move |out: &mut [i16]| {
            c.fetch_add(1, Ordering::SeqCst);
            out.fill(100);
        })));
        let mut buf = [0i16; 8];
        gate.render(&mut buf);
        assert_eq!(buf[0], 100);

        gate.lock();
        gate.render(&mut buf);
        assert_eq!(buf[0], 0);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        gate.unlock();
        gate.render(&mut buf);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn clones_share_state() {
        let gate = AudioGate::new();
        let other = gate.clone();
        other.lock();
        assert!(gate.is_locked());
        other.set_fill(Some(Box::new(|_: &mut [i16]| {})));
        assert!(gate.has_fill());
    }
}
