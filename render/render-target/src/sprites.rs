use std::collections::HashMap;

use log::debug;

use crate::palette::Palette;
use crate::surface::Surface;
use crate::{DisplayError, Rect};

pub const MAX_SPRITES: usize = 512;
pub const MAX_SPRITESHEETS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpriteKind {
    /// Player sprites
    Game = 0,
    /// Level sprites
    Level = 1,
    /// Foreground tiles
    Fg = 2,
}

impl SpriteKind {
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    pub const ALL: [SpriteKind; MAX_SPRITESHEETS] =
        [SpriteKind::Game, SpriteKind::Level, SpriteKind::Fg];
}

/// Indexed pixels with one transparent colour
#[derive(Debug, Clone)]
pub struct IndexedImage {
    pub width: i32,
    pub height: i32,
    pub pixels: Vec<u8>,
    pub color_key: u8,
}

impl IndexedImage {
    /// Convert through `palette`, upscaling by `scale` with nearest
    /// neighbour. Colour keyed pixels become fully transparent.
    pub fn to_surface(&self, palette: &Palette, scale: i32) -> Result<Surface, DisplayError> {
        let scale = scale.max(1);
        let (w, h) = (self.width * scale, self.height * scale);
        let mut out = Surface::new(w, h)?;
        let pixels = out.pixels_mut();
        for y in 0..h {
            let src = ((y / scale) * self.width) as usize;
            let dst = (y * w) as usize;
            for x in 0..w {
                let i = self.pixels.get(src + (x / scale) as usize).copied().unwrap_or(0);
                pixels[dst + x as usize] = if i == self.color_key {
                    0
                } else {
                    palette.native(i)
                };
            }
        }
        Ok(out)
    }
}

#[derive(Debug)]
pub struct SpriteSheet {
    /// Frame rects in sheet pixels (unscaled)
    pub frames: Vec<Rect>,
    /// Kept when the sheet follows palette changes
    pub source: Option<IndexedImage>,
    pub texture: Surface,
    /// Scale `texture` was built at
    pub scale: i32,
}

impl SpriteSheet {
    #[inline]
    pub fn count(&self) -> usize {
        self.frames.len()
    }

    /// Rebuild the texture from the retained source. Sheets loaded without
    /// one keep their texture.
    pub fn rebuild(&mut self, palette: &Palette, scale: i32) -> Result<bool, DisplayError> {
        let Some(src) = &self.source else {
            return Ok(false);
        };
        self.texture = src.to_surface(palette, scale)?;
        self.scale = scale;
        Ok(true)
    }
}

/// One queued draw
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpriteCmd {
    pub kind: SpriteKind,
    pub frame: usize,
    pub x: i32,
    pub y: i32,
    pub xflip: bool,
    pub centred: bool,
}

/// Lazily built mirror images keyed by sheet and frame
#[derive(Debug, Default)]
pub struct FlipCache {
    entries: HashMap<(SpriteKind, usize), Surface>,
    misses: usize,
}

impl FlipCache {
    pub fn get_or_insert(
        &mut self,
        kind: SpriteKind,
        frame: usize,
        texture: &Surface,
        r: Rect,
    ) -> &Surface {
        self.entries.entry((kind, frame)).or_insert_with(|| {
            debug!("Rendering flipped sprite {frame} from sheet {kind:?}");
            self.misses += 1;
            texture.flipped(r)
        })
    }

    pub fn invalidate(&mut self, kind: SpriteKind) {
        self.entries.retain(|(k, _), _| *k != kind);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of mirror images built so far
    pub fn misses(&self) -> usize {
        self.misses
    }
}
