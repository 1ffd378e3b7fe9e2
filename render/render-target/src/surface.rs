//! A plain ARGB8888 pixel surface. Everything the compositor draws ends up in
//! one of these before the backend copies it to a window texture.

use crate::{DisplayError, Rect};

/// Opaque black
pub const BLACK: u32 = 0xFF00_0000;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Surface {
    width: i32,
    height: i32,
    /// Row-major, `width * height` long
    pixels: Vec<u32>,
    clip: Option<Rect>,
}

impl Surface {
    /// Allocate a black surface. Reports an allocation failure instead of
    /// aborting since the size is driven by the window dimensions.
    pub fn new(width: i32, height: i32) -> Result<Self, DisplayError> {
        let width = width.max(0);
        let height = height.max(0);
        let len = width as usize * height as usize;
        let mut pixels = Vec::new();
        pixels
            .try_reserve_exact(len)
            .map_err(|_| DisplayError::Alloc { width, height })?;
        pixels.resize(len, BLACK);
        Ok(Self {
            width,
            height,
            pixels,
            clip: None,
        })
    }

    pub(crate) fn from_pixels(width: i32, height: i32, pixels: Vec<u32>) -> Self {
        debug_assert_eq!(pixels.len(), (width * height) as usize);
        Self {
            width,
            height,
            pixels,
            clip: None,
        }
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.height
    }

    #[inline]
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    #[inline]
    pub(crate) fn pixels_mut(&mut self) -> &mut [u32] {
        &mut self.pixels
    }

    #[inline]
    pub fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }

    /// Read the colour of a single pixel at X|Y
    #[inline]
    pub fn pixel(&self, x: i32, y: i32) -> Option<u32> {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[(y * self.width + x) as usize])
    }

    #[inline]
    pub fn set_pixel(&mut self, x: i32, y: i32, colour: u32) {
        if let Some(r) = self.clip_rect().intersect(&Rect::new(x, y, 1, 1)) {
            self.pixels[(r.y * self.width + r.x) as usize] = colour;
        }
    }

    /// Restrict all following draws. `None` resets to the full surface.
    pub fn set_clip(&mut self, clip: Option<Rect>) {
        self.clip = clip;
    }

    fn clip_rect(&self) -> Rect {
        match self.clip {
            Some(c) => c.intersect(&self.bounds()).unwrap_or_default(),
            None => self.bounds(),
        }
    }

    /// Fill `rect` (or everything) inside the clip rect
    pub fn fill(&mut self, rect: Option<Rect>, colour: u32) {
        let target = rect.unwrap_or_else(|| self.bounds());
        let Some(r) = target.intersect(&self.clip_rect()) else {
            return;
        };
        for y in r.y..r.y + r.h {
            let start = (y * self.width + r.x) as usize;
            self.pixels[start..start + r.w as usize].fill(colour);
        }
    }

    /// Copy `src_rect` of `src` to `dx,dy`. Pixels with a zero alpha are
    /// the colour key and are skipped.
    pub fn blit(&mut self, src: &Surface, src_rect: Option<Rect>, dx: i32, dy: i32) {
        let Some(s) = src_rect
            .unwrap_or_else(|| src.bounds())
            .intersect(&src.bounds())
        else {
            return;
        };
        // Shift the destination by however much the source was trimmed
        let (ox, oy) = match src_rect {
            Some(req) => (s.x - req.x, s.y - req.y),
            None => (0, 0),
        };
        let d = Rect::new(dx + ox, dy + oy, s.w, s.h);
        let Some(visible) = d.intersect(&self.clip_rect()) else {
            return;
        };
        let sx0 = s.x + (visible.x - d.x);
        let sy0 = s.y + (visible.y - d.y);
        for row in 0..visible.h {
            let si = ((sy0 + row) * src.width + sx0) as usize;
            let di = ((visible.y + row) * self.width + visible.x) as usize;
            let src_row = &src.pixels[si..si + visible.w as usize];
            let dst_row = &mut self.pixels[di..di + visible.w as usize];
            for (d, s) in dst_row.iter_mut().zip(src_row) {
                if s >> 24 != 0 {
                    *d = *s;
                }
            }
        }
    }

    /// Darken every pixel towards black, `alpha` 255 is fully black
    pub fn blend_black(&mut self, alpha: u8) {
        let keep = 255 - alpha as u32;
        let Some(r) = self.clip_rect().intersect(&self.bounds()) else {
            return;
        };
        for y in r.y..r.y + r.h {
            let start = (y * self.width + r.x) as usize;
            for px in &mut self.pixels[start..start + r.w as usize] {
                let c = *px;
                let red = ((c >> 16) & 0xFF) * keep / 255;
                let green = ((c >> 8) & 0xFF) * keep / 255;
                let blue = (c & 0xFF) * keep / 255;
                *px = BLACK | red << 16 | green << 8 | blue;
            }
        }
    }

    /// A new surface holding `r` mirrored left to right
    pub fn flipped(&self, r: Rect) -> Surface {
        let Some(r) = r.intersect(&self.bounds()) else {
            return Surface::default();
        };
        let mut pixels = Vec::with_capacity((r.w * r.h) as usize);
        for y in r.y..r.y + r.h {
            let row = (y * self.width) as usize;
            for x in (r.x..r.x + r.w).rev() {
                pixels.push(self.pixels[row + x as usize]);
            }
        }
        Surface::from_pixels(r.w, r.h, pixels)
    }
}
