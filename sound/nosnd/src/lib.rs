//! Silent audio and music. Used with `--nosound`, when no audio device can be
//! opened, and by tests.

use log::debug;
use sound_traits::{AudioError, AudioFill, AudioGate, AudioServer, MusicPlayer};

/// Keeps the fill callback but never runs it on its own. `pull` runs one
/// fill by hand.
#[derive(Default)]
pub struct NoAudio {
    gate: AudioGate,
    pub paused: bool,
    pub started: bool,
}

impl NoAudio {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pull(&self, out: &mut [i16]) {
        self.gate.render(out);
    }

    pub fn is_locked(&self) -> bool {
        self.gate.is_locked()
    }
}

impl AudioServer for NoAudio {
    fn start(&mut self, fill: AudioFill) -> Result<(), AudioError> {
        self.gate.set_fill(Some(fill));
        self.started = true;
        Ok(())
    }

    fn stop(&mut self) {
        self.gate.set_fill(None);
        self.started = false;
    }

    fn lock(&mut self) {
        self.gate.lock();
    }

    fn unlock(&mut self) {
        self.gate.unlock();
    }

    fn pause(&mut self, paused: bool) {
        self.paused = paused;
    }
}

/// Remembers the requested tracks
#[derive(Debug, Default)]
pub struct NoMusic {
    pub played: Vec<u8>,
}

impl MusicPlayer for NoMusic {
    fn play_music(&mut self, track: u8) {
        debug!("Music track {track}");
        self.played.push(track);
    }
}
