//! Session variables shared by every screen, plus the random number
//! generators and the timing helpers built on the `System` clock.

use chrono::{DateTime, Datelike, Local, TimeZone, Utc};
use gamestate_traits::{
    INPUT_DIRECTION_DOWN, INPUT_DIRECTION_LEFT, INPUT_DIRECTION_RIGHT, INPUT_DIRECTION_UP, System,
};

/// Per session starting values
pub const START_LIVES: u8 = 2;
pub const START_CLUB_POWER: u16 = 20;

/// Input as the game logic sees it, keys are `0xFF` while held
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct GameInput {
    pub key_left: u8,
    pub key_right: u8,
    pub key_up: u8,
    pub key_down: u8,
    pub key_space: u8,
    /// Only the number row is tracked, `keystate[2..=4]` are keys 1 to 3
    pub keystate: [bool; 8],
}

/// The four register generator
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Random {
    pub a: u8,
    pub b: u8,
    pub c: u8,
    pub d: u16,
    /// State of `get_number2`
    pub e: u16,
}

impl Random {
    pub fn reset(&mut self) {
        self.a = 5;
        self.b = 34;
        self.c = 134;
        self.d = 58765;
    }

    pub fn get_number(&mut self) -> u8 {
        self.d = self.d.wrapping_add(self.a as u16);
        self.a = self.a.wrapping_add(3).wrapping_add((self.d >> 8) as u8);

        self.b = self.b.wrapping_add(self.c);
        self.b = self.b.wrapping_mul(2);
        self.b = self.b.wrapping_add(self.a);

        self.c ^= self.a;
        self.c ^= self.b;

        self.b
    }

    pub fn get_number2(&mut self) -> u16 {
        let x = self.e.wrapping_add(0x9248);
        self.e = x.rotate_right(3);
        self.e
    }
}

/// Level codes. The DOS game derived these from the BIOS and CPU, this is
/// the value a stock DOSBox gives.
pub const fn random_get_number3(x: u16) -> u16 {
    let x = (x ^ 0x55a3).wrapping_mul(0xb297);
    x.rotate_left(3)
}

#[derive(Debug, Default, Clone)]
pub struct Vars {
    pub level_num: u8,
    pub expert_flag: bool,
    pub player_lifes: u8,
    pub player_bonus_letters_mask: u16,
    pub player_club_power: u16,
    pub player_club_type: u8,
    pub input: GameInput,
    /// Timestamp the timer counter runs from
    pub starttime: u32,
    /// Current entry of the unique palette table
    pub palette: u8,
    /// Password stages entered so far
    pub password_flag: u8,
    pub random: Random,
    pub animate_tiles: bool,
    pub redraw_cache: bool,
    pub redraw_counter: u32,
    pub cache_counter: u32,
}

impl Vars {
    pub fn new_run(&mut self) {
        self.player_lifes = START_LIVES;
        self.player_bonus_letters_mask = 0;
        self.player_club_power = START_CLUB_POWER;
        self.player_club_type = 0;
    }

    /// Time since `starttime` in PIT ticks of the 18.2Hz DOS timer, per
    /// thousand
    pub fn timer_get_counter(&self, now: u32) -> u32 {
        let elapsed = now.wrapping_sub(self.starttime) as u64;
        ((elapsed * 1193182 / 0x4000) / 1000) as u32
    }
}

/// Poll events and copy the system input into `vars`
pub fn update_input<S: System + ?Sized>(sys: &mut S, vars: &mut Vars) {
    sys.process_events();

    let held = |bit: u8| if sys.input().direction & bit != 0 { 0xFF } else { 0 };
    vars.input.key_left = held(INPUT_DIRECTION_LEFT);
    vars.input.key_right = held(INPUT_DIRECTION_RIGHT);
    vars.input.key_up = held(INPUT_DIRECTION_UP);
    vars.input.key_down = held(INPUT_DIRECTION_DOWN);
    vars.input.key_space = if sys.input().space { 0xFF } else { 0 };

    vars.input.keystate[2] = sys.input().digit1;
    vars.input.keystate[3] = sys.input().digit2;
    vars.input.keystate[4] = sys.input().digit3;

    let state = sys.state_mut();
    if state.redraw_cache {
        vars.redraw_cache = true;
    }
    if state.reset_cache_counters {
        vars.redraw_counter = 0;
        vars.cache_counter = 0;
        state.reset_cache_counters = false;
    }
    vars.animate_tiles = state.animate_tiles;
}

/// Wait up to `timeout` ms. Returns early on quit, action or resize.
pub fn wait_input<S: System + ?Sized>(sys: &mut S, timeout: u32) {
    let end = sys.get_timestamp().wrapping_add(timeout);
    while sys.get_timestamp() < end {
        sys.process_events();
        if sys.input().quit || sys.input().space || sys.state().resize {
            break;
        }
        sys.sleep(2);
    }
}

/// Calendar year of the wall clock, in local time
pub fn current_year() -> i32 {
    year_in(Utc::now(), &Local)
}

/// Year of `now` on the calendar of `tz`
fn year_in<Tz: TimeZone>(now: DateTime<Utc>, tz: &Tz) -> i32 {
    now.with_timezone(tz).year()
}

#[cfg(test)]
mod tests {
    use chrono::FixedOffset;

    use super::*;

    #[test]
    fn random3_is_pure() {
        for x in 0..20 {
            assert_eq!(random_get_number3(x), random_get_number3(x));
        }
    }

    #[test]
    fn random3_reproduces_code_table() {
        let normal: Vec<u16> = (0..8).map(random_get_number3).collect();
        let expert: Vec<u16> = (10..18).map(random_get_number3).collect();
        assert_eq!(
            normal,
            [0xc92e, 0x3471, 0x9fbb, 0x0b06, 0x1c0d, 0x8757, 0xf299, 0x5de4]
        );
        assert_eq!(
            expert,
            [0x4578, 0xb0c2, 0xc1c9, 0x2d14, 0x985e, 0x03a1, 0x14a8, 0x7ff2]
        );
    }

    #[test]
    fn random_sequence() {
        let mut r = Random::default();
        r.reset();
        // d = 58770, a = 5 + 3 + 0xe5 = 0xed, b = (34 + 134) * 2 + 0xed
        assert_eq!(r.get_number(), ((168u16 * 2 + 0xed) & 0xff) as u8);
        assert_eq!(r.d, 58770);
        assert_eq!(r.a, 0xed);
    }

    #[test]
    fn random2_rotates() {
        let mut r = Random {
            e: 0x1234,
            ..Random::default()
        };
        let x: u16 = 0x1234 + 0x9248;
        assert_eq!(r.get_number2(), x.rotate_right(3));
    }

    #[test]
    fn timer_counts_pit_ticks() {
        let vars = Vars {
            starttime: 1000,
            ..Vars::default()
        };
        assert_eq!(vars.timer_get_counter(1000), 0);
        // one second is 72.8 ticks of 1193182 / 0x4000 Hz, in thousandths
        assert_eq!(vars.timer_get_counter(2000), 72);
        assert_eq!(vars.timer_get_counter(11000), 728);
    }

    #[test]
    fn year_follows_local_calendar() {
        // 2025-01-01 01:30 UTC is still New Year's Eve two hours west
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 1, 30, 0).unwrap();
        let west = FixedOffset::west_opt(2 * 3600).unwrap();
        let east = FixedOffset::east_opt(3600).unwrap();
        assert_eq!(year_in(now, &west), 2024);
        assert_eq!(year_in(now, &Utc), 2025);
        assert_eq!(year_in(now, &east), 2025);
    }

    #[test]
    fn current_year_is_local() {
        let year = current_year();
        assert!(year >= 2024);
        assert!((Local::now().year() - year).abs() <= 1);
    }
}
