//! SDL2 audio device for the game's mixer.
//!
//! The game hands over a fill callback once; the device pulls 2048 mono
//! samples at a time from it on SDL's audio thread. Locking goes through an
//! `AudioGate` shared with the callback rather than `SDL_LockAudio`.

use log::{info, warn};
use sdl2::AudioSubsystem;
use sdl2::audio::{AudioCallback, AudioDevice, AudioSpecDesired};
use sound_traits::{
    AUDIO_CHANNELS, AUDIO_FREQ, AUDIO_SAMPLES, AudioError, AudioFill, AudioGate, AudioServer,
};

struct GateCallback {
    gate: AudioGate,
}

impl AudioCallback for GateCallback {
    type Channel = i16;

    fn callback(&mut self, out: &mut [i16]) {
        self.gate.render(out);
    }
}

pub struct SdlAudio {
    audio: AudioSubsystem,
    device: Option<AudioDevice<GateCallback>>,
    gate: AudioGate,
}

impl SdlAudio {
    pub fn new(audio: AudioSubsystem) -> Self {
        Self {
            audio,
            device: None,
            gate: AudioGate::new(),
        }
    }
}

impl AudioServer for SdlAudio {
    fn start(&mut self, fill: AudioFill) -> Result<(), AudioError> {
        let desired_spec = AudioSpecDesired {
            freq: Some(AUDIO_FREQ),
            channels: Some(AUDIO_CHANNELS),
            samples: Some(AUDIO_SAMPLES),
        };
        self.gate.set_fill(Some(fill));
        let gate = self.gate.clone();
        let device = self
            .audio
            .open_playback(None, &desired_spec, |spec| {
                info!(
                    "Audio device: {} Hz, {} channel(s), {} samples",
                    spec.freq, spec.channels, spec.samples
                );
                GateCallback { gate }
            })
            .map_err(|e| {
                warn!("Could not open audio: {e}");
                AudioError::Open(e)
            })?;
        device.resume();
        self.device = Some(device);
        Ok(())
    }

    fn stop(&mut self) {
        // Dropping the device closes it
        self.device = None;
        self.gate.set_fill(None);
    }

    fn lock(&mut self) {
        self.gate.lock();
    }

    fn unlock(&mut self) {
        self.gate.unlock();
    }

    fn pause(&mut self, paused: bool) {
        if let Some(device) = &self.device {
            if paused {
                device.pause();
            } else {
                device.resume();
            }
        }
    }
}
