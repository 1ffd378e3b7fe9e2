//! Colour conversion for the indexed game screen.
//!
//! Stored palettes come in three flavours: VGA triples of 6 (sometimes 8)
//! bits per channel, Amiga 12-bit words with 4 bits per channel, and copper
//! bar lists which are Amiga words preceded by the colour register they
//! replace. All of them end up as native ARGB8888 values.

use log::{debug, warn};

pub const PALETTE_SIZE: usize = 256;
/// Rows of copper bar colours, each one covers two scaled scanlines
pub const COPPER_BARS_H: usize = 80;
/// First Amiga colour register
const COLOR00: u16 = 0x180;

/// Widen a `depth`-bit channel to 8 bits, filling the low bits from the top
/// ones so that the full range maps onto 0..=255.
#[inline]
pub const fn expand_channel(v: u8, depth: u8) -> u8 {
    let shift = 8 - depth;
    (v << shift) | (v >> (depth - shift))
}

#[inline]
pub const fn expand6(v: u8) -> u8 {
    expand_channel(v & 0x3F, 6)
}

/// Amiga nibble replication
#[inline]
pub const fn expand4(v: u8) -> u8 {
    let v = v & 0xF;
    (v << 4) | v
}

pub const fn amiga_rgb(color: u16) -> [u8; 3] {
    [
        expand4((color >> 8) as u8),
        expand4((color >> 4) as u8),
        expand4(color as u8),
    ]
}

#[inline]
pub const fn native(rgb: [u8; 3]) -> u32 {
    0xFF00_0000 | (rgb[0] as u32) << 16 | (rgb[1] as u32) << 8 | rgb[2] as u32
}

/// The current on-screen palette. `rgb` keeps the expanded triples so they
/// can be read back, `native` is what the compositor looks pixels up in.
#[derive(Debug, Clone)]
pub struct Palette {
    rgb: [[u8; 3]; PALETTE_SIZE],
    native: [u32; PALETTE_SIZE],
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            rgb: [[0; 3]; PALETTE_SIZE],
            native: [native([0; 3]); PALETTE_SIZE],
        }
    }
}

impl Palette {
    /// Bulk set from packed RGB triples. A depth of 8 is taken as is, 4 to
    /// 7 bit channels are expanded. Anything else is logged and copied
    /// unchanged. With `hybrid` the green channel of the first two entries
    /// set by this call is zeroed.
    pub fn set(&mut self, colors: &[u8], offset: usize, count: usize, depth: u8, hybrid: bool) {
        let expand = match depth {
            8 => false,
            4..=7 => true,
            _ => {
                warn!("Unhandled palette depth {depth}, using raw values");
                false
            }
        };
        let count = count
            .min(PALETTE_SIZE.saturating_sub(offset))
            .min(colors.len() / 3);
        for (i, c) in colors.chunks_exact(3).take(count).enumerate() {
            let mut rgb = [c[0], c[1], c[2]];
            if expand {
                for v in rgb.iter_mut() {
                    *v = expand_channel(*v, depth);
                }
            }
            if hybrid && i < 2 {
                rgb[1] = 0;
            }
            self.store(offset + i, rgb);
        }
    }

    /// Set 16 entries from Amiga colour words
    pub fn set_amiga(&mut self, colors: &[u16], offset: usize) {
        for (i, c) in colors.iter().take(16).enumerate() {
            if offset + i < PALETTE_SIZE {
                self.store(offset + i, amiga_rgb(*c));
            }
        }
    }

    /// Single 6-bit entry. Only the native lookup changes, the stored
    /// triples are left for whole-palette operations.
    pub fn set_color(&mut self, i: usize, rgb6: [u8; 3]) {
        if i < PALETTE_SIZE {
            self.native[i] = native(rgb6.map(expand6));
        }
    }

    #[inline]
    fn store(&mut self, i: usize, rgb: [u8; 3]) {
        self.rgb[i] = rgb;
        self.native[i] = native(rgb);
    }

    #[inline]
    pub fn native(&self, i: u8) -> u32 {
        self.native[i as usize]
    }

    pub fn natives(&self) -> &[u32; PALETTE_SIZE] {
        &self.native
    }

    #[inline]
    pub fn rgb(&self, i: u8) -> [u8; 3] {
        self.rgb[i as usize]
    }
}

/// A horizontal raster bar ramp replacing one colour register near the top
/// of the screen.
#[derive(Debug, Clone)]
pub struct CopperBars {
    key: u8,
    ramp: [u32; COPPER_BARS_H],
}

impl CopperBars {
    /// `data[0]` is the Amiga colour register, followed by at least 17
    /// colour words. Each group of five rows alternates between two
    /// neighbouring colours to dither the gradient.
    pub fn new(data: &[u16]) -> Option<Self> {
        let groups = COPPER_BARS_H / 5;
        if data.len() < groups + 2 {
            warn!("Copper bar list too short ({} words)", data.len());
            return None;
        }
        let key = data[0].wrapping_sub(COLOR00) / 2;
        let Ok(key) = u8::try_from(key) else {
            warn!("Copper bar register {:#x} out of range", data[0]);
            return None;
        };
        let src = &data[1..];
        let mut ramp = [0; COPPER_BARS_H];
        for i in 0..groups {
            let j = i + 1;
            let (a, b) = (native(amiga_rgb(src[j])), native(amiga_rgb(src[i])));
            ramp[i * 5..i * 5 + 5].copy_from_slice(&[a, b, a, b, a]);
        }
        debug!("Copper bars on colour {key}");
        Some(Self { key, ramp })
    }

    #[inline]
    pub fn key(&self) -> u8 {
        self.key
    }

    /// Bar colour for a scaled scanline, if it is inside the band
    #[inline]
    pub fn line_color(&self, row: usize) -> Option<u32> {
        self.ramp.get(row / 2).copied()
    }
}

/// Step every channel of `current` towards `target` by two, snapping when
/// within one. Returns true while any channel has yet to arrive.
pub fn fade_palettes(target: &[u8], current: &mut [u8]) -> bool {
    let mut pending = false;
    for (cur, &tgt) in current.iter_mut().zip(target) {
        let diff = tgt as i32 - *cur as i32;
        if diff == 0 {
            continue;
        }
        if diff.abs() < 2 {
            *cur = tgt;
        } else if tgt < *cur {
            *cur -= 2;
        } else {
            *cur += 2;
        }
        pending |= *cur != tgt;
    }
    pending
}

#[cfg(test)]
mod tests {
    use crate::palette::*;

    #[test]
    fn six_bit_expansion_spans_range() {
        let out: Vec<u8> = (0..64).map(expand6).collect();
        assert_eq!(out[0], 0);
        assert_eq!(out[63], 255);
        for w in out.windows(2) {
            assert!(w[1] > w[0]);
            // evenly spaced, steps of 4 with the occasional carry from the
            // replicated high bits
            assert!((4..=5).contains(&(w[1] - w[0])));
        }
    }

    #[test]
    fn four_bit_expansion_spans_range() {
        let out: Vec<u8> = (0..16).map(expand4).collect();
        assert_eq!(out.first(), Some(&0));
        assert_eq!(out.last(), Some(&255));
        assert!(out.windows(2).all(|w| w[1] - w[0] == 17));
    }

    #[test]
    fn amiga_words() {
        assert_eq!(amiga_rgb(0x0F80), [0xFF, 0x88, 0x00]);
        let mut pal = Palette::default();
        pal.set_amiga(&[0x0FFF; 16], 16);
        assert_eq!(pal.native(16), 0xFFFF_FFFF);
        assert_eq!(pal.native(15), 0xFF00_0000);
    }

    #[test]
    fn hybrid_zeroes_green_of_first_two() {
        let mut pal = Palette::default();
        pal.set(&[63; 9], 0, 3, 6, true);
        assert_eq!(pal.rgb(0), [255, 0, 255]);
        assert_eq!(pal.rgb(1), [255, 0, 255]);
        assert_eq!(pal.rgb(2), [255, 255, 255]);
    }

    #[test]
    fn single_color_leaves_triples() {
        let mut pal = Palette::default();
        pal.set_color(5, [63, 0, 0]);
        assert_eq!(pal.native(5), 0xFFFF_0000);
        assert_eq!(pal.rgb(5), [0, 0, 0]);
    }

    #[test]
    fn copper_ramp_layout() {
        let mut data = vec![0x180 + 2 * 7];
        data.extend((0..17).map(|n| n as u16));
        let bars = CopperBars::new(&data).unwrap();
        assert_eq!(bars.key(), 7);
        let c0 = native(amiga_rgb(0));
        let c1 = native(amiga_rgb(1));
        assert_eq!(bars.line_color(0), Some(c1));
        assert_eq!(bars.line_color(2), Some(c0));
        assert_eq!(bars.line_color(4), Some(c1));
        assert_eq!(bars.line_color(159), bars.line_color(158));
        assert_eq!(bars.line_color(160), None);
    }

    #[test]
    fn fade_converges_without_overshoot() {
        let target = [255u8, 0, 128];
        let mut current = [0u8, 255, 127];
        let mut calls = 0;
        loop {
            let last = current;
            let pending = fade_palettes(&target, &mut current);
            calls += 1;
            for c in 0..3 {
                let before = (target[c] as i32 - last[c] as i32).abs();
                let after = (target[c] as i32 - current[c] as i32).abs();
                assert!(after < before || before == 0);
            }
            if !pending {
                break;
            }
        }
        assert_eq!(calls, 128);
        assert_eq!(current, target);
    }
}
