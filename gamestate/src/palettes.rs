//! Palettes that are not part of a screen's data file. All are 6 bits per
//! channel.

/// Entries in the unique palette table cycled with `-` and `=`
pub const UNIQUE_PALETTES: u8 = 6;

/// The text screens' background, past the 16 text colours
pub const TEXT_BACKGROUND: u8 = 16;

const EGA: [u8; 48] = [
    0, 0, 0, 0, 0, 42, 0, 42, 0, 0, 42, 42, 42, 0, 0, 42, 0, 42, 42, 21, 0, 42, 42, 42, 21, 21, 21,
    21, 21, 63, 21, 63, 21, 21, 63, 63, 63, 21, 21, 63, 21, 63, 63, 63, 21, 63, 63, 63,
];

/// Credits and the vanity screen, index 0 is a text colour
pub const CREDITS_PALETTE: [u8; 48] = [
    63, 63, 63, 0, 0, 42, 0, 42, 0, 0, 42, 42, 42, 0, 0, 42, 0, 42, 42, 21, 0, 42, 42, 42, 21, 21,
    21, 21, 21, 63, 21, 63, 21, 21, 63, 63, 63, 21, 21, 63, 21, 63, 63, 63, 21, 63, 48, 16,
];

pub const MOTIF_PALETTE: [u8; 48] = EGA;

pub const JOYSTICK_PALETTE: [u8; 48] = EGA;

pub const GAMEOVER_PALETTE: [u8; 48] = [
    0, 0, 0, 8, 0, 0, 16, 0, 0, 24, 4, 0, 32, 8, 0, 40, 12, 0, 48, 16, 0, 56, 24, 4, 63, 32, 8, 63,
    40, 16, 63, 48, 24, 63, 56, 32, 63, 63, 40, 63, 63, 48, 63, 63, 56, 63, 63, 63,
];

/// The map's level palette
pub const MAP_PALETTE: [u8; 48] = [
    0, 0, 0, 8, 16, 40, 12, 24, 48, 20, 32, 56, 8, 24, 8, 16, 36, 12, 28, 48, 20, 40, 28, 12, 52,
    40, 20, 60, 52, 32, 32, 32, 32, 44, 44, 44, 56, 56, 56, 48, 8, 8, 63, 48, 0, 63, 63, 63,
];

/// Swap the channels of every colour, `k` times
const fn rotate_channels(src: [u8; 48], k: usize) -> [u8; 48] {
    let mut out = [0u8; 48];
    let mut i = 0;
    while i < 16 {
        let mut c = 0;
        while c < 3 {
            out[i * 3 + c] = src[i * 3 + (c + k) % 3];
            c += 1;
        }
        i += 1;
    }
    out
}

/// Halve every channel
const fn darken(src: [u8; 48]) -> [u8; 48] {
    let mut out = [0u8; 48];
    let mut i = 0;
    while i < 48 {
        out[i] = src[i] / 2;
        i += 1;
    }
    out
}

pub const UNIQUE_PALETTES_TBL: [[u8; 48]; UNIQUE_PALETTES as usize] = [
    EGA,
    rotate_channels(EGA, 1),
    rotate_channels(EGA, 2),
    MAP_PALETTE,
    rotate_channels(MAP_PALETTE, 1),
    darken(EGA),
];

/// What the presentation screen fades towards, a sepia ramp
pub const PRESENT_PALETTE: [u8; 768] = sepia();

const fn sepia() -> [u8; 768] {
    let mut out = [0u8; 768];
    let mut i = 0;
    while i < 256 {
        let v = (i / 4) as u8;
        out[i * 3] = v;
        out[i * 3 + 1] = v * 3 / 4;
        out[i * 3 + 2] = v / 2;
        i += 1;
    }
    out
}

/// Next entry of the unique palette table, `offset` is -1 or 1
pub fn cycle(current: u8, offset: i8) -> u8 {
    let n = UNIQUE_PALETTES as i16;
    ((current as i16 + offset as i16 + n) % n) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_wraps_both_ways() {
        assert_eq!(cycle(0, -1), UNIQUE_PALETTES - 1);
        assert_eq!(cycle(UNIQUE_PALETTES - 1, 1), 0);
        assert_eq!(cycle(2, 1), 3);
    }

    #[test]
    fn tables_stay_6_bit() {
        assert!(PRESENT_PALETTE.iter().all(|&v| v < 64));
        for p in UNIQUE_PALETTES_TBL {
            assert!(p.iter().all(|&v| v < 64));
        }
    }
}
