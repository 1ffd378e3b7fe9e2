//! Wrap-around wave scroll used behind the mode select and code entry
//! screens.

use std::f64::consts::TAU;

use log::debug;

use crate::surface::Surface;
use crate::{ORIG_H, ORIG_W, Rect};

const PLOT_COLOUR: u32 = 0xFFFF_0000;
const AMPLITUDE: f64 = 16.0;

fn sine_table() -> [u8; ORIG_W as usize] {
    let mut tbl = [0; ORIG_W as usize];
    for (i, v) in tbl.iter_mut().enumerate() {
        let a = TAU * i as f64 / ORIG_W as f64;
        *v = (AMPLITUDE + AMPLITUDE * a.sin()).round() as u8;
    }
    tbl
}

#[derive(Debug, Clone)]
pub struct Sine {
    table: [u8; ORIG_W as usize],
    pub index: i32,
    pub direction: i32,
    pub plot: bool,
    pub offset_y: i32,
    pub scale_x: i32,
    /// Tenths
    pub scale_y: i32,
    orig_scale_y: i32,
}

impl Default for Sine {
    fn default() -> Self {
        let mut s = Self {
            table: sine_table(),
            index: 0,
            direction: 1,
            plot: false,
            offset_y: 0,
            scale_x: 2,
            scale_y: 10,
            orig_scale_y: 10,
        };
        s.reset();
        s
    }
}

impl Sine {
    /// Back to the start of the wave, called on every screen resize
    pub fn reset(&mut self) {
        self.index = 0;
        self.direction = 1;
        self.offset_y = ORIG_H / 2 - self.table[0] as i32;
        self.scale_x = 2;
        self.scale_y = 10;
        self.orig_scale_y = self.scale_y;
    }

    fn wave_y(&self, x: usize, scale: i32) -> i32 {
        (self.table[x] as i32 + self.offset_y) * self.scale_y / 10 * self.scale_x * scale
    }

    /// Current shift in frame pixels, both wrapped into the playfield
    pub fn shift(&self, scale: i32) -> (i32, i32) {
        let sx = self.index * scale;
        let sy = self.wave_y(self.index as usize, scale).rem_euclid(ORIG_H * scale);
        (sx, sy)
    }

    pub fn reverse(&mut self) {
        self.direction = -self.direction;
    }

    pub fn nudge_offset(&mut self, dy: i32) {
        self.offset_y += dy;
    }

    pub fn grow_amplitude(&mut self) {
        self.scale_y += self.orig_scale_y / 10;
        self.offset_y -= 2 * self.orig_scale_y / 10;
    }

    pub fn shrink_amplitude(&mut self) {
        self.scale_y -= self.orig_scale_y / 10;
        self.offset_y += 2 * self.orig_scale_y / 10;
    }

    /// Blit the centred playfield of `texture` into `frame` shifted by the
    /// current wave position, wrapping on both axes, then step the wave.
    pub fn draw(&mut self, frame: &mut Surface, texture: &Surface, centre: (i32, i32), scale: i32) {
        let (cx, cy) = centre;
        let (w, h) = (ORIG_W * scale, ORIG_H * scale);
        let (sx, sy) = self.shift(scale);
        debug!("Sine wave: {sx}, {sy} @ {} dir {}", self.index, self.direction);

        let quads = [
            // main body moves right and down
            (Rect::new(0, 0, w - sx, h - sy), (sx, sy)),
            // bottom right corner wraps to top left
            (Rect::new(w - sx, h - sy, sx, sy), (0, 0)),
            // bottom strip wraps to the top
            (Rect::new(0, h - sy, w - sx, sy), (sx, 0)),
            // right strip wraps to the left
            (Rect::new(w - sx, 0, sx, h - sy), (0, sy)),
        ];
        for (src, (dx, dy)) in quads {
            if src.w > 0 && src.h > 0 {
                let src = Rect::new(src.x + cx, src.y + cy, src.w, src.h);
                frame.blit(texture, Some(src), cx + dx, cy + dy);
            }
        }

        if self.plot {
            for x in 1..=self.index.min(ORIG_W - 1) {
                let y = self.wave_y(x as usize, scale);
                if y > 0 && y < h {
                    frame.set_pixel(x * scale + cx, y + cy, PLOT_COLOUR);
                }
            }
        }
        self.index = (self.index + self.direction + ORIG_W) % ORIG_W;
    }
}
