//! Code entry. Four hex digits select a level directly (the per level codes
//! come from `random_get_number3`), or walk through the password stages
//! after which any value is taken as a level number.

use gamestate_traits::System;
use log::debug;

use crate::vars::{Vars, random_get_number3, wait_input};

/// Nibbles in a code
pub const CODE_LEN: u8 = 4;
/// Password stages before direct level entry opens
pub const CODE_COUNT: u8 = 3;
/// Levels that have a code
pub const CODE_LEVELS: u16 = 8;
/// Levels that can be entered by number
pub const LEVEL_COUNT: u16 = 14;
/// Offset of the expert codes in the code table
const EXPERT: u16 = 10;

/// The password stages, in order
pub const LEVEL_CODE: [u16; CODE_COUNT as usize] = [0x1992, 0x0286, 0x0012];

/// Hex character to its value
pub fn atoh(data: u8) -> u8 {
    let data = if data > b'9' { data.wrapping_add(9) } else { data };
    data & 0x0F
}

/// Digits typed so far
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CodeEntry {
    pub buf: u16,
    pub index: u8,
}

impl CodeEntry {
    pub fn clear(&mut self) {
        self.buf = 0;
        self.index = 0;
    }

    pub fn complete(&self) -> bool {
        self.index == CODE_LEN
    }

    /// Take the last typed hex key into the buffer. A key typed into a full
    /// buffer starts over.
    pub fn update<S: System + ?Sized>(&mut self, sys: &mut S) {
        let hex = sys.input().hex;
        if hex == 0 {
            return;
        }
        let i = atoh(hex) as u16;
        if self.index < CODE_LEN {
            let shift = (CODE_LEN - self.index - 1) * 4;
            self.buf = self.buf.wrapping_add(i << shift);
            self.index += 1;
        } else {
            wait_input(sys, 100);
            self.clear();
        }
        sys.input_mut().hex = 0;
    }

    /// Check a complete code. True when the code screen is done, with
    /// `level_num` and `expert_flag` set if the code picked a level.
    pub fn parse(&mut self, vars: &mut Vars) -> bool {
        if !self.complete() {
            return false;
        }
        debug!("parse_code: {:04X}", self.buf);
        if let Some(r) = level_for_code(self.buf) {
            vars.level_num = (r % EXPERT) as u8;
            vars.expert_flag = r / EXPERT != 0;
            debug!(
                "parse_code: level {}, expert {}",
                vars.level_num, vars.expert_flag
            );
            return true;
        }
        if LEVEL_CODE.get(vars.password_flag as usize) == Some(&self.buf) {
            debug!("parse_code: password matched {:04X}", self.buf);
            if vars.password_flag == CODE_COUNT - 1 {
                debug!("parse_code: now enter level");
            }
            vars.password_flag += 1;
            self.clear();
            return false;
        }
        if vars.password_flag == CODE_COUNT {
            if self.buf < LEVEL_COUNT {
                vars.level_num = self.buf as u8;
            }
            vars.expert_flag = self.buf / EXPERT != 0;
        }
        vars.password_flag = 0;
        debug!(
            "parse_code: level {}, expert {}",
            vars.level_num, vars.expert_flag
        );
        true
    }
}

/// Table index of a level code, expert codes are offset by ten
fn level_for_code(code: u16) -> Option<u16> {
    (0..CODE_LEVELS)
        .flat_map(|l| [l, l + EXPERT])
        .find(|&r| random_get_number3(r) == code)
}

pub fn print_codes() {
    for l in 0..CODE_LEVELS {
        debug!(
            "print_codes: level {l} = {:04X} expert {:04X}",
            random_get_number3(l),
            random_get_number3(l + EXPERT)
        );
    }
}
