//! All input handling. Backend events come in as `SysEvent`, get translated
//! into the game facing `InputState` and the shared `SysState` flags. Hotkeys
//! that need the screen or audio (scaling, fullscreen, messages) come back
//! out as `SysCommand`s for the system layer to carry out.
//!
//! Also does config options for controls.

pub mod config;

use std::collections::VecDeque;

use config::InputConfig;
use log::{debug, info};

pub const INPUT_DIRECTION_LEFT: u8 = 1 << 0;
pub const INPUT_DIRECTION_RIGHT: u8 = 1 << 1;
pub const INPUT_DIRECTION_UP: u8 = 1 << 2;
pub const INPUT_DIRECTION_DOWN: u8 = 1 << 3;

pub const HAT_UP: u8 = 0x01;
pub const HAT_RIGHT: u8 = 0x02;
pub const HAT_DOWN: u8 = 0x04;
pub const HAT_LEFT: u8 = 0x08;

/// The keys the game and its hotkeys care about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    Return,
    Space,
    Escape,
    /// Function keys, `F(1)` to `F(12)`
    F(u8),
    Kp2,
    Kp4,
    Kp6,
    Kp8,
    Minus,
    Equals,
    Plus,
    /// Number row, `Num(0)` to `Num(9)`
    Num(u8),
    /// Lower case letters
    Char(char),
    Other,
}

impl Key {
    /// The hex digit this key types in raw mode
    pub fn hex_char(self) -> Option<u8> {
        match self {
            Key::Num(n) if n <= 9 => Some(b'0' + n),
            Key::Char(c @ 'a'..='f') => Some(c as u8),
            _ => None,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct KeyMods {
    pub lalt: bool,
}

/// A backend neutral event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SysEvent {
    Quit,
    /// Window gained (`true`) or lost input focus
    Focus(bool),
    WindowResized(i32, i32),
    Key { key: Key, down: bool, mods: KeyMods },
    JoyHat(u8),
    JoyAxis { axis: u8, value: i16 },
    JoyButton { button: u8, down: bool },
}

/// What the game reads every frame
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct InputState {
    pub direction: u8,
    /// Latched, nothing clears it
    pub quit: bool,
    pub space: bool,
    pub digit1: bool,
    pub digit2: bool,
    pub digit3: bool,
    pub jump_button: u8,
    /// Code entry mode, hex keys are captured into `hex`
    pub raw: bool,
    /// Last hex character typed, 0 once consumed
    pub hex: u8,
}

/// Flags shared between the system layer and the game
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SysState {
    pub paused: bool,
    pub audio: bool,
    pub resize: bool,
    pub redraw_cache: bool,
    pub cycle_palette: bool,
    pub palette_offset: i8,
    pub hybrid_color: bool,
    pub animate_tiles: bool,
    pub reset_cache_counters: bool,
    pub centred: bool,
    pub sine: bool,
    pub debug_mask: u16,
}

/// Hotkey actions the translator cannot carry out on its own
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SysCommand {
    /// Step the display scale
    Rescale(i32),
    ToggleScale,
    ToggleFullscreen,
    RestoreOriginal,
    WindowResized(i32, i32),
    ToggleSizeLock,
    /// Move the palette swatch overlay
    NudgeSwatch(i32, i32),
    ToggleSwatch,
    ToggleSinePlot,
    ReverseSine,
    SineOffset(i32),
    /// `true` grows, `false` shrinks
    SineAmplitude(bool),
    /// Pause (`true`) or resume the audio device
    PauseAudio(bool),
    /// Swap an on-screen message, `clear` is dropped before `add` is queued
    Notify { clear: Option<String>, add: String },
}

impl SysCommand {
    fn notify(add: impl Into<String>) -> Self {
        SysCommand::Notify {
            clear: None,
            add: add.into(),
        }
    }

    /// "X on" replaces "X off" and the other way round
    fn swap(what: &str, on: bool) -> Self {
        let (now, was) = if on { ("on", "off") } else { ("off", "on") };
        SysCommand::Notify {
            clear: Some(format!("{what} {was}")),
            add: format!("{what} {now}"),
        }
    }
}

/// Where events come from. Must not block.
pub trait EventSource {
    fn poll_event(&mut self) -> Option<SysEvent>;
}

/// An in-memory event source, events are handed out in push order
#[derive(Debug, Default, Clone)]
pub struct QueuedEvents {
    events: VecDeque<SysEvent>,
}

impl QueuedEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, ev: SysEvent) {
        self.events.push_back(ev);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl EventSource for QueuedEvents {
    fn poll_event(&mut self) -> Option<SysEvent> {
        self.events.pop_front()
    }
}

/// Turns events into state changes and commands
#[derive(Debug, Default, Clone)]
pub struct Translator {
    config: InputConfig,
    /// Next joystick button press becomes the jump button
    jump_capture: bool,
    /// Joystick events are ignored without one attached
    joystick: bool,
}

impl Translator {
    pub fn new(config: InputConfig, joystick: bool) -> Self {
        Self {
            config,
            jump_capture: false,
            joystick,
        }
    }

    pub fn config(&self) -> &InputConfig {
        &self.config
    }

    pub fn capturing_jump(&self) -> bool {
        self.jump_capture
    }

    pub fn handle(
        &mut self,
        ev: &SysEvent,
        input: &mut InputState,
        sys: &mut SysState,
        out: &mut Vec<SysCommand>,
    ) {
        match *ev {
            SysEvent::Quit => input.quit = true,
            SysEvent::Focus(gained) => {
                sys.paused = !gained;
                if sys.audio {
                    out.push(SysCommand::PauseAudio(sys.paused));
                }
            }
            SysEvent::WindowResized(w, h) => out.push(SysCommand::WindowResized(w, h)),
            SysEvent::Key { key, down, mods } => self.key(key, down, mods, input, sys, out),
            SysEvent::JoyHat(value) if self.joystick => hat(value, input),
            SysEvent::JoyAxis { axis, value } if self.joystick => {
                self.axis(axis, value, input)
            }
            SysEvent::JoyButton { button, down } if self.joystick => {
                self.button(button, down, input, sys, out)
            }
            _ => {}
        }
    }

    fn key(
        &mut self,
        key: Key,
        down: bool,
        mods: KeyMods,
        input: &mut InputState,
        sys: &mut SysState,
        out: &mut Vec<SysCommand>,
    ) {
        if input.raw && down {
            if let Some(c) = key.hex_char() {
                input.hex = c;
                return;
            }
        }
        let arrow = |bit: u8, dx: i32, dy: i32, input: &mut InputState, out: &mut Vec<_>, sys: &mut SysState| {
            if !down {
                input.direction &= !bit;
            } else if mods.lalt {
                out.push(SysCommand::NudgeSwatch(dx, dy));
                sys.redraw_cache = true;
            } else {
                input.direction |= bit;
            }
        };
        match key {
            Key::Left => arrow(INPUT_DIRECTION_LEFT, -1, 0, input, out, sys),
            Key::Right => arrow(INPUT_DIRECTION_RIGHT, 1, 0, input, out, sys),
            Key::Up => arrow(INPUT_DIRECTION_UP, 0, -1, input, out, sys),
            Key::Down => arrow(INPUT_DIRECTION_DOWN, 0, 1, input, out, sys),
            Key::Return if mods.lalt => {
                if down {
                    out.push(SysCommand::ToggleFullscreen);
                }
            }
            Key::Return | Key::Space => input.space = down,
            Key::Escape if down => input.quit = true,
            Key::F(n @ 1..=12) if down => {
                let level = 1u16 << (n - 1);
                let enabled = sys.debug_mask & level != 0;
                sys.debug_mask ^= level;
                let (was, now) = if enabled { ("En", "Dis") } else { ("Dis", "En") };
                out.push(SysCommand::Notify {
                    clear: Some(format!("{was}abled debug {level}")),
                    add: format!("{now}abled debug {level}"),
                });
            }
            Key::Kp2 if down => out.push(SysCommand::SineOffset(1)),
            Key::Kp8 if down => out.push(SysCommand::SineOffset(-1)),
            Key::Kp4 if down => out.push(SysCommand::SineAmplitude(true)),
            Key::Kp6 if down => out.push(SysCommand::SineAmplitude(false)),
            Key::Minus if down => {
                sys.palette_offset = -1;
                sys.cycle_palette = true;
            }
            Key::Equals | Key::Plus if down => {
                sys.palette_offset = 1;
                sys.cycle_palette = true;
            }
            Key::Num(1) => input.digit1 = down,
            Key::Num(2) => input.digit2 = down,
            Key::Num(3) => input.digit3 = down,
            Key::Char(c) if down => self.letter(c, sys, out),
            _ => {}
        }
    }

    fn letter(&mut self, c: char, sys: &mut SysState, out: &mut Vec<SysCommand>) {
        match c {
            'a' => {
                sys.audio = !sys.audio;
                out.push(SysCommand::PauseAudio(!sys.audio));
                out.push(SysCommand::swap("Sound", sys.audio));
            }
            'c' => sys.reset_cache_counters = true,
            'd' => out.push(SysCommand::Rescale(-1)),
            'e' => {
                sys.redraw_cache = true;
                out.push(SysCommand::ToggleSwatch);
            }
            'g' => {
                sys.animate_tiles = !sys.animate_tiles;
                out.push(SysCommand::swap("Animated tiles", sys.animate_tiles));
            }
            'h' => {
                sys.hybrid_color = !sys.hybrid_color;
                sys.cycle_palette = true;
                out.push(SysCommand::swap("Hybrid colour", sys.hybrid_color));
            }
            'i' => out.push(SysCommand::Rescale(1)),
            'j' => {
                self.jump_capture = true;
                out.push(SysCommand::notify("Press jump button"));
            }
            'k' => out.push(SysCommand::ToggleSinePlot),
            'o' => out.push(SysCommand::RestoreOriginal),
            'p' => toggle_pause(sys, out),
            'q' => out.push(SysCommand::ReverseSine),
            's' => out.push(SysCommand::ToggleSizeLock),
            't' => out.push(SysCommand::ToggleScale),
            _ => {}
        }
    }

    fn axis(&self, axis: u8, value: i16, input: &mut InputState) {
        let threshold = self.config.axis_threshold;
        let (pos, neg) = match axis {
            0 => (INPUT_DIRECTION_RIGHT, INPUT_DIRECTION_LEFT),
            1 => (INPUT_DIRECTION_DOWN, INPUT_DIRECTION_UP),
            _ => return,
        };
        input.direction &= !(pos | neg);
        if value > threshold {
            input.direction |= pos;
        } else if value < -threshold {
            input.direction |= neg;
        }
    }

    fn button(
        &mut self,
        button: u8,
        down: bool,
        input: &mut InputState,
        sys: &mut SysState,
        out: &mut Vec<SysCommand>,
    ) {
        if self.jump_capture && down {
            input.jump_button = button;
            self.config.jump_button = button;
            self.jump_capture = false;
            info!("Jump button set to {button}");
            out.push(SysCommand::notify(format!("Jump on {button} key")));
            return;
        }
        if button == input.jump_button {
            if down {
                input.direction |= INPUT_DIRECTION_UP;
            } else {
                input.direction &= !INPUT_DIRECTION_UP;
            }
            return;
        }
        match button {
            0..=3 => input.space = down,
            4 if down => out.push(SysCommand::Rescale(-1)),
            5 if down => out.push(SysCommand::Rescale(1)),
            8 => input.quit = true,
            9 if down => toggle_pause(sys, out),
            _ => debug!("Unmapped joystick button {button}"),
        }
    }
}

fn toggle_pause(sys: &mut SysState, out: &mut Vec<SysCommand>) {
    sys.paused = !sys.paused;
    if sys.audio {
        out.push(SysCommand::PauseAudio(sys.paused));
    }
}

/// The hat replaces the whole direction mask
fn hat(value: u8, input: &mut InputState) {
    input.direction = 0;
    if value & HAT_UP != 0 {
        input.direction |= INPUT_DIRECTION_UP;
    }
    if value & HAT_DOWN != 0 {
        input.direction |= INPUT_DIRECTION_DOWN;
    }
    if value & HAT_LEFT != 0 {
        input.direction |= INPUT_DIRECTION_LEFT;
    }
    if value & HAT_RIGHT != 0 {
        input.direction |= INPUT_DIRECTION_RIGHT;
    }
}
