use input::{EventSource, HAT_DOWN, HAT_LEFT, HAT_RIGHT, HAT_UP, Key, KeyMods, SysEvent};
use log::{info, warn};
use sdl2::event::{Event, WindowEvent};
use sdl2::joystick::{HatState, Joystick};
use sdl2::keyboard::{Mod, Scancode as Sc};
use sdl2::{EventPump, JoystickSubsystem};

/// SDL events as `SysEvent`s. Events the game has no use for are skipped.
pub struct SdlEvents {
    pump: EventPump,
    /// Kept open for as long as events are wanted from it
    joystick: Option<Joystick>,
}

impl SdlEvents {
    pub fn new(pump: EventPump, joysticks: Option<JoystickSubsystem>) -> Self {
        let joystick = joysticks.and_then(|sys| open_joystick(&sys));
        Self { pump, joystick }
    }

    pub fn has_joystick(&self) -> bool {
        self.joystick.is_some()
    }
}

fn open_joystick(sys: &JoystickSubsystem) -> Option<Joystick> {
    let count = sys.num_joysticks().ok()?;
    if count == 0 {
        return None;
    }
    match sys.open(0) {
        Ok(j) => {
            info!("Using joystick '{}'", j.name());
            Some(j)
        }
        Err(e) => {
            warn!("Could not open joystick: {e}");
            None
        }
    }
}

impl EventSource for SdlEvents {
    fn poll_event(&mut self) -> Option<SysEvent> {
        while let Some(ev) = self.pump.poll_event() {
            if let Some(ev) = translate(&ev) {
                return Some(ev);
            }
        }
        None
    }
}

fn translate(ev: &Event) -> Option<SysEvent> {
    Some(match ev {
        Event::Quit { .. } => SysEvent::Quit,
        Event::Window { win_event, .. } => match win_event {
            WindowEvent::FocusGained => SysEvent::Focus(true),
            WindowEvent::FocusLost => SysEvent::Focus(false),
            WindowEvent::Resized(w, h) => SysEvent::WindowResized(*w, *h),
            _ => return None,
        },
        Event::KeyDown {
            scancode: Some(sc),
            keymod,
            ..
        } => SysEvent::Key {
            key: key(*sc),
            down: true,
            mods: mods(*keymod),
        },
        Event::KeyUp {
            scancode: Some(sc),
            keymod,
            ..
        } => SysEvent::Key {
            key: key(*sc),
            down: false,
            mods: mods(*keymod),
        },
        Event::JoyHatMotion { state, .. } => SysEvent::JoyHat(hat(*state)),
        Event::JoyAxisMotion {
            axis_idx, value, ..
        } => SysEvent::JoyAxis {
            axis: *axis_idx,
            value: *value,
        },
        Event::JoyButtonDown { button_idx, .. } => SysEvent::JoyButton {
            button: *button_idx,
            down: true,
        },
        Event::JoyButtonUp { button_idx, .. } => SysEvent::JoyButton {
            button: *button_idx,
            down: false,
        },
        _ => return None,
    })
}

fn mods(m: Mod) -> KeyMods {
    KeyMods {
        lalt: m.contains(Mod::LALTMOD),
    }
}

fn hat(state: HatState) -> u8 {
    match state {
        HatState::Centered => 0,
        HatState::Up => HAT_UP,
        HatState::Right => HAT_RIGHT,
        HatState::Down => HAT_DOWN,
        HatState::Left => HAT_LEFT,
        HatState::RightUp => HAT_RIGHT | HAT_UP,
        HatState::RightDown => HAT_RIGHT | HAT_DOWN,
        HatState::LeftUp => HAT_LEFT | HAT_UP,
        HatState::LeftDown => HAT_LEFT | HAT_DOWN,
    }
}

fn key(sc: Sc) -> Key {
    match sc {
        Sc::Left => Key::Left,
        Sc::Right => Key::Right,
        Sc::Up => Key::Up,
        Sc::Down => Key::Down,
        Sc::Return | Sc::KpEnter => Key::Return,
        Sc::Space => Key::Space,
        Sc::Escape => Key::Escape,
        Sc::F1 => Key::F(1),
        Sc::F2 => Key::F(2),
        Sc::F3 => Key::F(3),
        Sc::F4 => Key::F(4),
        Sc::F5 => Key::F(5),
        Sc::F6 => Key::F(6),
        Sc::F7 => Key::F(7),
        Sc::F8 => Key::F(8),
        Sc::F9 => Key::F(9),
        Sc::F10 => Key::F(10),
        Sc::F11 => Key::F(11),
        Sc::F12 => Key::F(12),
        Sc::Kp2 => Key::Kp2,
        Sc::Kp4 => Key::Kp4,
        Sc::Kp6 => Key::Kp6,
        Sc::Kp8 => Key::Kp8,
        Sc::Minus | Sc::KpMinus => Key::Minus,
        Sc::Equals => Key::Equals,
        Sc::KpPlus => Key::Plus,
        Sc::Num0 => Key::Num(0),
        Sc::Num1 => Key::Num(1),
        Sc::Num2 => Key::Num(2),
        Sc::Num3 => Key::Num(3),
        Sc::Num4 => Key::Num(4),
        Sc::Num5 => Key::Num(5),
        Sc::Num6 => Key::Num(6),
        Sc::Num7 => Key::Num(7),
        Sc::Num8 => Key::Num(8),
        Sc::Num9 => Key::Num(9),
        _ => letter(sc).map(Key::Char).unwrap_or(Key::Other),
    }
}

fn letter(sc: Sc) -> Option<char> {
    let i = sc as i32 - Sc::A as i32;
    if (0..26).contains(&i) {
        char::from_u32('a' as u32 + i as u32)
    } else {
        None
    }
}
