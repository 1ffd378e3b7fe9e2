//! The indexed screen buffer the screens draw into, and the decoders for the
//! 4 bitplane images the game ships.

use gamestate_traits::{IndexedImage, ORIG_H, ORIG_W, Rect, SpriteCmd, SpriteKind, System};
use log::{debug, warn};

use crate::font::{GLYPH_COUNT, GLYPH_H, GLYPH_W, glyph, glyph_for, glyph_index};

pub const MAP_W: i32 = 640;
pub const MAP_H: i32 = 200;

/// Bytes per row of a planar 320 wide screen, text offsets count in these
const TEXT_PITCH: usize = (ORIG_W / 8) as usize;

/// Motif letters are the font at twice the size
const MOTIF_GLYPH: i32 = GLYPH_W * 2;
/// Colours the motif letters come in
const MOTIF_COLORS: usize = 4;
/// Player marker on the map
pub const MAP_MARKER_SPR: usize = 457;
const MARKER: [u8; 8] = [0x18, 0x3C, 0x7E, 0xFF, 0xFF, 0x7E, 0x3C, 0x18];
const MARKER_COLOR: u8 = 15;
const MESSAGE_COLOR: u8 = 15;
/// Transparent in the sprite atlas
const ATLAS_KEY: u8 = 0xFF;

#[derive(Debug, Default)]
pub struct Video {
    /// The logical screen, `w * h`
    pub vga: Vec<u8>,
    pub w: i32,
    pub h: i32,
    /// Last decoded 320x200 image
    pub background: Vec<u8>,
    /// Decoded world map, `MAP_W * MAP_H`
    pub map: Vec<u8>,
}

impl Video {
    pub fn new(w: i32, h: i32) -> Self {
        Self {
            vga: vec![0; (w * h) as usize],
            w,
            h,
            background: vec![0; (ORIG_W * ORIG_H) as usize],
            map: Vec::new(),
        }
    }

    #[inline]
    pub fn size(&self) -> usize {
        (self.w * self.h) as usize
    }

    /// Follow the system screen size, consuming a pending resize
    pub fn resize<S: System + ?Sized>(&mut self, sys: &mut S) {
        let (w, h) = sys.screen_size();
        if (w, h) != (self.w, self.h) {
            debug!("Screen buffer {}x{} -> {w}x{h}", self.w, self.h);
            self.w = w;
            self.h = h;
            self.vga = vec![0; self.size()];
        }
        sys.state_mut().resize = false;
    }

    pub fn clear(&mut self) {
        self.clear_to(0);
    }

    pub fn clear_to(&mut self, color: u8) {
        self.vga.fill(color);
    }

    /// Offset of the original 320x200 area in the screen
    #[inline]
    pub fn centring(&self) -> (i32, i32) {
        ((self.w - ORIG_W).max(0) / 2, (self.h - ORIG_H).max(0) / 2)
    }

    /// Copy a `w * h` image to `(x, y)`, clipped to the screen
    fn blit(&mut self, src: &[u8], w: i32, h: i32, x: i32, y: i32) {
        for row in 0..h {
            let dy = y + row;
            if dy < 0 || dy >= self.h {
                continue;
            }
            let x0 = x.max(0);
            let x1 = (x + w).min(self.w);
            if x1 <= x0 {
                return;
            }
            let s = (row * w + (x0 - x)) as usize;
            let d = (dy * self.w + x0) as usize;
            let n = (x1 - x0) as usize;
            let (Some(src_row), Some(dst_row)) = (src.get(s..s + n), self.vga.get_mut(d..d + n))
            else {
                warn!("Image smaller than {w}x{h}");
                return;
            };
            dst_row.copy_from_slice(src_row);
        }
    }

    pub fn copy_centred(&mut self, src: &[u8], w: i32, h: i32) {
        let x = (self.w - w) / 2;
        let y = (self.h - h) / 2;
        self.blit(src, w, h, x, y);
    }

    /// Copy to the top left corner
    pub fn copy(&mut self, src: &[u8], w: i32, h: i32) {
        self.blit(src, w, h, 0, 0);
    }

    /// Decode a planar 320x200 image into `background`
    pub fn copy_img(&mut self, data: &[u8]) {
        decode_planar(data, ORIG_W, ORIG_H, &mut self.background);
    }

    /// Decode the planar world map into `map`
    pub fn copy_map(&mut self, data: &[u8]) {
        self.map.resize((MAP_W * MAP_H) as usize, 0);
        decode_planar(data, MAP_W, MAP_H, &mut self.map);
    }

    /// The map scrolled `x` pixels in from the right edge. Past the end of
    /// the map the columns are blank.
    pub fn draw_map_window(&mut self, x: i32) {
        let y_offs = (self.h - MAP_H) / 2;
        let pitch = x.min(self.w);
        let window_w = (x - self.w).max(0);
        let n = pitch.min(MAP_W - window_w).max(0) as usize;
        for y in 0..MAP_H {
            let dst = ((y_offs + y) * self.w + self.w - pitch) as usize;
            let src = (y * MAP_W + window_w) as usize;
            let Some(row) = self.vga.get_mut(dst..dst + pitch as usize) else {
                continue;
            };
            match self.map.get(src..src + n) {
                Some(map) => {
                    row[..n].copy_from_slice(map);
                    row[n..].fill(0);
                }
                None => row.fill(0),
            }
        }
    }

    /// Draw `s` on text row `offset / 40` of the original area, centred
    pub fn draw_string(&mut self, offset: usize, color: u8, s: &str) {
        let (cx, cy) = self.centring();
        let len = s.chars().count() as i32;
        let y = (offset / TEXT_PITCH) as i32 + cy;
        let mut x = (offset % TEXT_PITCH) as i32 * 8;
        if x == 0 {
            x = (ORIG_W - len * GLYPH_W) / 2;
        }
        x += cx;
        for c in s.chars() {
            if let Some(rows) = glyph_for(c) {
                self.draw_glyph(rows, x, y, color);
            }
            x += GLYPH_W;
        }
    }

    /// Overlay the message `sys` has on display on the top text row
    pub fn draw_message<S: System + ?Sized>(&mut self, sys: &S) {
        if let Some(msg) = sys.get_message() {
            self.draw_string(0, MESSAGE_COLOR, msg);
        }
    }

    fn draw_glyph(&mut self, rows: &[u8; 8], x: i32, y: i32, color: u8) {
        for (j, bits) in rows.iter().enumerate() {
            let py = y + j as i32;
            if py < 0 || py >= self.h {
                continue;
            }
            for i in 0..GLYPH_W {
                let px = x + i;
                if bits & (1 << i) != 0 && px >= 0 && px < self.w {
                    self.vga[(py * self.w + px) as usize] = color;
                }
            }
        }
    }

    /// Build the game sprite sheet: motif letters in each colour and the
    /// map marker
    pub fn load_sprites<S: System + ?Sized>(&self, sys: &mut S) {
        let (frames, image) = sprite_atlas();
        sys.render_load_sprites(SpriteKind::Game, &frames, image, true);
    }

    /// Queue `s` as motif letters, centred in the original area and moved
    /// by `(dx, dy)`
    pub fn draw_motif_string<S: System + ?Sized>(
        &self,
        sys: &mut S,
        s: &str,
        dx: i32,
        dy: i32,
        color: u8,
    ) {
        let color = (color as usize).min(MOTIF_COLORS - 1);
        let len = s.chars().count() as i32;
        let mut x = (ORIG_W - len * MOTIF_GLYPH) / 2 + dx;
        let y = (ORIG_H - MOTIF_GLYPH) / 2 + dy;
        for c in s.chars() {
            if let Some(g) = glyph_index(c) {
                sys.render_add_sprite(SpriteCmd {
                    kind: SpriteKind::Game,
                    frame: color * GLYPH_COUNT + g,
                    x,
                    y,
                    xflip: false,
                    centred: true,
                });
            }
            x += MOTIF_GLYPH;
        }
    }

    pub fn draw_sprite<S: System + ?Sized>(
        &self,
        sys: &mut S,
        num: usize,
        x: i32,
        y: i32,
        xflip: bool,
    ) {
        sys.render_add_sprite(SpriteCmd {
            kind: SpriteKind::Game,
            frame: num,
            x,
            y,
            xflip,
            centred: false,
        });
    }
}

/// Four bitplanes one after the other, plane 0 is the low bit
pub fn decode_planar(src: &[u8], w: i32, h: i32, dst: &mut [u8]) {
    let pitch = (w / 8) as usize;
    let plane = pitch * h as usize;
    if src.len() < plane * 4 {
        warn!("Planar image short, {} of {} bytes", src.len(), plane * 4);
    }
    for y in 0..h as usize {
        for xb in 0..pitch {
            let planes: [u8; 4] =
                std::array::from_fn(|p| src.get(p * plane + y * pitch + xb).copied().unwrap_or(0));
            for bit in 0..8 {
                let mut color = 0;
                for (p, byte) in planes.iter().enumerate() {
                    color |= ((byte >> (7 - bit)) & 1) << p;
                }
                if let Some(px) = dst.get_mut(y * w as usize + xb * 8 + bit) {
                    *px = color;
                }
            }
        }
    }
}

/// Frame rects and pixels of the game sprite sheet
fn sprite_atlas() -> (Vec<Rect>, IndexedImage) {
    let width = GLYPH_COUNT as i32 * MOTIF_GLYPH;
    let height = (MOTIF_COLORS as i32 + 1) * MOTIF_GLYPH;
    let mut pixels = vec![ATLAS_KEY; (width * height) as usize];
    let mut frames = vec![Rect::new(0, 0, 0, 0); MAP_MARKER_SPR + 1];

    let mut plot = |rows: &[u8; 8], ox: i32, oy: i32, color: u8| {
        for (j, bits) in rows.iter().enumerate() {
            for i in 0..GLYPH_W {
                if bits & (1 << i) == 0 {
                    continue;
                }
                for (sx, sy) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
                    let x = ox + i * 2 + sx;
                    let y = oy + j as i32 * 2 + sy;
                    pixels[(y * width + x) as usize] = color;
                }
            }
        }
    };
    for color in 0..MOTIF_COLORS {
        for g in 0..GLYPH_COUNT {
            let Some(rows) = glyph(g) else { continue };
            let (x, y) = (g as i32 * MOTIF_GLYPH, color as i32 * MOTIF_GLYPH);
            plot(rows, x, y, color as u8);
            frames[color * GLYPH_COUNT + g] = Rect::new(x, y, MOTIF_GLYPH, GLYPH_H * 2);
        }
    }
    let y = MOTIF_COLORS as i32 * MOTIF_GLYPH;
    plot(&MARKER, 0, y, MARKER_COLOR);
    frames[MAP_MARKER_SPR] = Rect::new(0, y, MOTIF_GLYPH, MOTIF_GLYPH);

    let image = IndexedImage {
        width,
        height,
        pixels,
        color_key: ATLAS_KEY,
    };
    (frames, image)
}
