//! Software compositor for the indexed 320x200 (or larger) game screen.
//!
//! The game draws palette indices into a byte buffer. `RenderTarget` turns
//! that buffer into a true colour frame, layers sprites and transition
//! effects on top and hands the result to a `Display` backend. All drawing
//! happens here in plain memory so the backend only has to copy a finished
//! frame to the window.

mod geometry;
mod headless;
pub mod palette;
mod sine;
mod slide;
mod sprites;
mod surface;
mod wipe;

#[cfg(test)]
mod tests;

use std::error::Error;
use std::fmt;

use log::{debug, info, warn};

pub use geometry::{DisplayMode, Geometry, OrigMode, ScaleFilter, ScaleOutcome, ScreenRequest};
pub use headless::{HeadlessDisplay, ManualClock};
use palette::{CopperBars, Palette};
pub use sine::Sine;
pub use slide::{Slide, SlideKind, SlideRequest};
pub use sprites::{
    FlipCache, IndexedImage, MAX_SPRITES, MAX_SPRITESHEETS, SpriteCmd, SpriteKind, SpriteSheet,
};
pub use surface::{BLACK, Surface};
pub use wipe::{TransitionKind, Wipe};

pub const ORIG_W: i32 = 320;
pub const ORIG_H: i32 = 200;
/// Window size used for fullscreen when the desktop size is unknown
pub const FULLSCREEN_W: i32 = 640;
pub const FULLSCREEN_H: i32 = 360;
pub const FADE_STEPS: i32 = 16;
/// Delay between fade and wipe steps in ms
pub const TRANSITION_DELAY: u32 = 30;
/// Sprite frames still drawn while paused, the pause banner glyphs
const PAUSED_FRAMES: std::ops::RangeInclusive<usize> = 241..=273;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    pub const fn scaled(&self, s: i32) -> Self {
        Self::new(self.x * s, self.y * s, self.w * s, self.h * s)
    }

    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = (self.x + self.w).min(other.x + other.w);
        let y1 = (self.y + self.h).min(other.y + other.h);
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some(Rect::new(x0, y0, x1 - x0, y1 - y0))
    }
}

#[derive(Debug)]
pub enum DisplayError {
    Init(String),
    Mode(String),
    Present(String),
    Alloc { width: i32, height: i32 },
}

impl fmt::Display for DisplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayError::Init(e) => write!(f, "display init failed: {e}"),
            DisplayError::Mode(e) => write!(f, "couldn't set video mode: {e}"),
            DisplayError::Present(e) => write!(f, "couldn't present frame: {e}"),
            DisplayError::Alloc { width, height } => {
                write!(f, "failed to allocate {width}x{height} screen buffer")
            }
        }
    }
}

impl Error for DisplayError {}

/// The window end of the pipeline
pub trait Display {
    /// Called after every accepted geometry change
    fn reconfigure(&mut self, mode: &DisplayMode) -> Result<(), DisplayError>;

    /// Copy a finished frame to the screen
    fn present(&mut self, frame: &Surface) -> Result<(), DisplayError>;

    /// Fullscreen switch without a geometry change, used while the size is
    /// locked
    fn set_fullscreen(&mut self, on: bool) -> Result<(), DisplayError>;

    /// Size of the desktop if the backend can tell
    fn desktop_size(&self) -> Option<(i32, i32)>;
}

/// Millisecond clock
pub trait Clock {
    fn ticks(&self) -> u32;
    fn delay(&mut self, ms: u32);
}

/// Screen wide state owned by the caller that changes how a frame is drawn
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PresentFlags {
    /// Clip sprites to the centred original playfield
    pub centred: bool,
    /// Only draw the pause banner sprites
    pub paused: bool,
    /// Draw the playfield through the sine scroller
    pub sine: bool,
}

/// Developer overlay of the 256 palette entries
#[derive(Debug, Default, Clone, Copy)]
pub struct Swatch {
    pub visible: bool,
    pub x: i32,
    pub y: i32,
}

pub struct RenderTarget<D: Display> {
    display: D,
    geom: Geometry,
    palette: Palette,
    copper: Option<CopperBars>,
    sheets: [Option<SpriteSheet>; MAX_SPRITESHEETS],
    flips: FlipCache,
    sprites: Vec<SpriteCmd>,
    sprites_clip: Rect,
    /// Last converted game screen
    texture: Surface,
    /// Composition target handed to the display
    frame: Surface,
    shake: (i32, i32),
    slide_req: Option<SlideRequest>,
    slide: Option<Slide>,
    sine: Sine,
    /// Flags of the last presented frame
    last_flags: PresentFlags,
    pub swatch: Swatch,
}

impl<D: Display> RenderTarget<D> {
    pub fn new(display: D) -> Self {
        Self {
            display,
            geom: Geometry::default(),
            palette: Palette::default(),
            copper: None,
            sheets: [None, None, None],
            flips: FlipCache::default(),
            sprites: Vec::with_capacity(MAX_SPRITES),
            sprites_clip: Rect::default(),
            texture: Surface::default(),
            frame: Surface::default(),
            shake: (0, 0),
            slide_req: None,
            slide: None,
            sine: Sine::default(),
            last_flags: PresentFlags::default(),
            swatch: Swatch::default(),
        }
    }

    #[inline]
    pub fn display(&self) -> &D {
        &self.display
    }

    #[inline]
    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }

    #[inline]
    pub fn geometry(&self) -> &Geometry {
        &self.geom
    }

    #[inline]
    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    #[inline]
    pub fn flip_cache(&self) -> &FlipCache {
        &self.flips
    }

    #[inline]
    pub fn sine_mut(&mut self) -> &mut Sine {
        &mut self.sine
    }

    #[inline]
    pub fn slide(&self) -> Option<&Slide> {
        self.slide.as_ref()
    }

    #[inline]
    pub fn sprites(&self) -> &[SpriteCmd] {
        &self.sprites
    }

    pub fn sheet(&self, kind: SpriteKind) -> Option<&SpriteSheet> {
        self.sheets[kind.index()].as_ref()
    }

    /// Fit the logical screen into a window. A refused request changes
    /// nothing and is not an error.
    pub fn set_screen_size(&mut self, req: &ScreenRequest) -> Result<ScaleOutcome, DisplayError> {
        let prev = self.geom.clone();
        let outcome = self.geom.fit(req);
        if outcome != ScaleOutcome::Applied {
            return Ok(outcome);
        }
        let (fw, fh) = (self.geom.frame_w(), self.geom.frame_h());
        let buffers = Surface::new(fw, fh).and_then(|t| Ok((t, Surface::new(fw, fh)?)));
        let (texture, frame) = match buffers {
            Ok(b) => b,
            Err(e) => {
                self.geom = prev;
                return Err(e);
            }
        };
        self.texture = texture;
        self.frame = frame;
        self.display.reconfigure(&self.geom.display_mode())?;
        info!(
            "Size: {}x{} Window: {}x{} scale {}",
            self.geom.w, self.geom.h, self.geom.window_w, self.geom.window_h, self.geom.scale
        );
        self.sprites_clip = Rect::new(0, 0, fw, fh);
        self.sine.reset();
        Ok(outcome)
    }

    /// Re-derive everything from the last window size
    pub fn resize(&mut self) -> Result<ScaleOutcome, DisplayError> {
        let req = self.geom.request(self.geom.scale);
        self.apply_resize(&req)
    }

    fn apply_resize(&mut self, req: &ScreenRequest) -> Result<ScaleOutcome, DisplayError> {
        let outcome = self.set_screen_size(req)?;
        self.rescale_spritesheets()?;
        self.reinit_slide();
        Ok(outcome)
    }

    /// The window was resized by the user
    pub fn window_resized(&mut self, w: i32, h: i32) -> Result<Option<ScaleOutcome>, DisplayError> {
        info!("Resizing to {w}x{h}");
        if self.geom.size_lock {
            info!("Scaling is locked");
            return Ok(None);
        }
        let mut req = self.geom.request(self.geom.scale);
        (req.window_w, req.window_h) = (w, h);
        self.apply_resize(&req).map(Some)
    }

    /// Step the scale by `n`. Scaling below 1 is ignored.
    pub fn rescale(&mut self, n: i32) -> Result<Option<ScaleOutcome>, DisplayError> {
        let scale = self.geom.scale;
        if scale <= 1 && n <= 0 {
            return Ok(None);
        }
        info!(
            "Scale {scale}, {}creasing to {}",
            if n > 0 { "in" } else { "de" },
            scale + n
        );
        let req = self.geom.request(scale + n);
        self.apply_resize(&req).map(Some)
    }

    /// Flip between scale 1 and the original scale, resizing the window to
    /// match
    pub fn toggle_scale(&mut self) -> Result<ScaleOutcome, DisplayError> {
        let orig = self.geom.orig.map(|o| o.scale).unwrap_or(1);
        let scale = if self.geom.scale == orig { 1 } else { orig };
        info!("Toggling scale to {scale}");
        let mut req = self.geom.request(scale);
        req.window_w = self.geom.w * scale;
        req.window_h = self.geom.h * scale;
        self.apply_resize(&req)
    }

    /// Back to the first configuration, unlocking the size
    pub fn restore_original(&mut self) -> Result<ScaleOutcome, DisplayError> {
        let Some(orig) = self.geom.orig else {
            return Ok(ScaleOutcome::Applied);
        };
        info!(
            "Restoring original window size {}x{}, scale {}, fullscreen {}",
            orig.w, orig.h, orig.scale, orig.fullscreen
        );
        self.geom.size_lock = false;
        let req = ScreenRequest {
            window_w: orig.w * orig.scale,
            window_h: orig.h * orig.scale,
            caption: self.geom.caption.clone(),
            scale: orig.scale,
            filter: self.geom.filter,
            fullscreen: orig.fullscreen,
            hybrid_color: orig.hybrid_color,
        };
        self.apply_resize(&req)
    }

    pub fn toggle_fullscreen(&mut self) -> Result<ScaleOutcome, DisplayError> {
        let on = !self.geom.fullscreen;
        info!("Toggling fullscreen {}", if on { "on" } else { "off" });
        if self.geom.size_lock {
            self.display.set_fullscreen(on)?;
            self.geom.fullscreen = on;
            return Ok(ScaleOutcome::Applied);
        }
        let mut req = self.geom.request(self.geom.scale);
        req.fullscreen = on;
        let orig = self
            .geom
            .orig
            .map(|o| (o.w * o.scale, o.h * o.scale))
            .unwrap_or((req.window_w, req.window_h));
        if !on {
            (req.window_w, req.window_h) = orig;
        } else if let Some(desktop) = self.display.desktop_size() {
            (req.window_w, req.window_h) = desktop;
        } else if self.geom.w == ORIG_W && self.geom.h == ORIG_H {
            (req.window_w, req.window_h) = (FULLSCREEN_W, FULLSCREEN_H);
        }
        self.apply_resize(&req)
    }

    /// Returns the new lock state
    pub fn toggle_size_lock(&mut self) -> bool {
        self.geom.size_lock = !self.geom.size_lock;
        self.geom.size_lock
    }

    /// Applies from the next bulk palette set
    pub fn set_hybrid_color(&mut self, on: bool) {
        self.geom.hybrid_color = on;
    }

    fn rescale_spritesheets(&mut self) -> Result<(), DisplayError> {
        let scale = self.geom.scale;
        for kind in SpriteKind::ALL {
            let Some(sheet) = &mut self.sheets[kind.index()] else {
                continue;
            };
            if sheet.scale == scale {
                debug!("Spritesheet {kind:?} already at scale {scale}");
                continue;
            }
            if !sheet.rebuild(&self.palette, scale)? {
                debug!("No surface found for rescaling in spritesheet {kind:?}");
            }
            self.flips.invalidate(kind);
        }
        Ok(())
    }

    /// Bulk palette set. Rebuilds every sheet that follows the palette and
    /// drops all mirrored sprites.
    pub fn set_palette(
        &mut self,
        colors: &[u8],
        offset: usize,
        count: usize,
        depth: u8,
    ) -> Result<(), DisplayError> {
        self.palette
            .set(colors, offset, count, depth, self.geom.hybrid_color);
        self.palette_changed()
    }

    pub fn set_palette_amiga(&mut self, colors: &[u16], offset: usize) -> Result<(), DisplayError> {
        self.palette.set_amiga(colors, offset);
        self.palette_changed()
    }

    fn palette_changed(&mut self) -> Result<(), DisplayError> {
        let scale = self.geom.scale;
        for sheet in self.sheets.iter_mut().flatten() {
            sheet.rebuild(&self.palette, scale)?;
        }
        self.flips.clear();
        Ok(())
    }

    /// Single 6-bit entry, cached textures are left alone
    pub fn set_palette_color(&mut self, i: usize, rgb6: [u8; 3]) {
        self.palette.set_color(i, rgb6);
    }

    /// `None` turns the bars off
    pub fn set_copper_bars(&mut self, data: Option<&[u16]>) {
        self.copper = data.and_then(CopperBars::new);
    }

    pub fn shake(&mut self, dx: i32, dy: i32) {
        self.shake = (dx, dy);
    }

    pub fn load_sprites(
        &mut self,
        kind: SpriteKind,
        frames: &[Rect],
        image: IndexedImage,
        update_pal: bool,
    ) -> Result<(), DisplayError> {
        let scale = self.geom.scale;
        let texture = image.to_surface(&self.palette, scale)?;
        debug!("Loaded {} sprites into sheet {kind:?}", frames.len());
        self.flips.invalidate(kind);
        self.sheets[kind.index()] = Some(SpriteSheet {
            frames: frames.to_vec(),
            source: update_pal.then_some(image),
            texture,
            scale,
        });
        Ok(())
    }

    pub fn unload_sprites(&mut self, kind: SpriteKind) {
        self.flips.invalidate(kind);
        self.sheets[kind.index()] = None;
    }

    pub fn add_sprite(&mut self, cmd: SpriteCmd) {
        if self.sprites.len() >= MAX_SPRITES {
            warn!("Sprite list full, dropping frame {} of {:?}", cmd.frame, cmd.kind);
            return;
        }
        self.sprites.push(cmd);
    }

    pub fn clear_sprites(&mut self) {
        self.sprites.clear();
    }

    /// Logical coordinates
    pub fn set_sprites_clip(&mut self, x: i32, y: i32, w: i32, h: i32) {
        self.sprites_clip = Rect::new(x, y, w, h).scaled(self.geom.scale);
    }

    pub fn begin_slide(&mut self, req: SlideRequest) {
        self.slide_req = Some(req);
    }

    pub fn clear_slide(&mut self) {
        self.slide_req = None;
        self.slide = None;
    }

    fn reinit_slide(&mut self) {
        if let Some(req) = self.slide_req {
            let last_pos = self.slide.as_ref().map(|s| s.last_pos).unwrap_or(0);
            let finished = self.slide.as_ref().is_some_and(Slide::finished);
            let centred = self.last_flags.centred;
            let mut slide = Slide::new(&req, &self.geom, centred, last_pos);
            if finished {
                slide.finish();
            }
            self.slide = Some(slide);
        }
    }

    /// Convert the indexed screen `p` and present it
    pub fn update_screen(
        &mut self,
        p: &[u8],
        present: bool,
        flags: PresentFlags,
    ) -> Result<(), DisplayError> {
        self.update_screen_cached(p, present, false, flags)
    }

    /// With `cache_redraw` the previous conversion is reused and only the
    /// composition runs again.
    pub fn update_screen_cached(
        &mut self,
        p: &[u8],
        present: bool,
        cache_redraw: bool,
        flags: PresentFlags,
    ) -> Result<(), DisplayError> {
        if !cache_redraw {
            self.convert(p);
        }
        if !present {
            return Ok(());
        }
        self.last_flags = flags;
        let (fw, fh) = (self.geom.frame_w(), self.geom.frame_h());
        let r = Rect::new(self.shake.0, self.shake.1, fw, fh);
        if let Some(req) = self.slide_req {
            if self.slide.is_none() {
                self.slide = Some(Slide::new(&req, &self.geom, flags.centred, 0));
            }
        }
        let clip = self.slide.as_ref().map(|s| s.clip);
        self.frame.set_clip(clip);
        self.frame.fill(Some(r), BLACK);
        if flags.sine {
            let centre = self.geom.centring_scaled();
            self.sine
                .draw(&mut self.frame, &self.texture, centre, self.geom.scale);
        } else if let Some(slide) = &self.slide {
            self.frame
                .blit(&self.texture, Some(slide.base), slide.reveal.x, slide.reveal.y);
        } else {
            self.frame.blit(&self.texture, None, r.x, r.y);
        }
        self.draw_sprites(flags);
        self.draw_fixed_panel();
        self.display.present(&self.frame)?;
        if let Some(slide) = &mut self.slide {
            slide.advance();
        }
        Ok(())
    }

    fn convert(&mut self, p: &[u8]) {
        let (w, h, s) = (self.geom.w, self.geom.h, self.geom.scale);
        if p.len() < (w * h) as usize {
            warn!("Screen buffer too small: {} for {w}x{h}", p.len());
            return;
        }
        let (fw, fh) = (w * s, h * s);
        let natives = self.palette.natives();
        let out = self.texture.pixels_mut();
        for y in 0..fh {
            let src = &p[((y / s) * w) as usize..((y / s + 1) * w) as usize];
            let dst = &mut out[(y * fw) as usize..((y + 1) * fw) as usize];
            let bar = self
                .copper
                .as_ref()
                .and_then(|c| c.line_color(y as usize).map(|col| (c.key(), col)));
            for (x, px) in dst.iter_mut().enumerate() {
                let i = src[x / s as usize];
                *px = match bar {
                    Some((key, col)) if i == key => col,
                    _ => natives[i as usize],
                };
            }
        }
        if self.copper.is_none() && self.swatch.visible {
            self.draw_swatch();
        }
    }

    fn draw_swatch(&mut self) {
        let cell = 2 * self.geom.scale;
        for i in 0..256 {
            let rect = Rect::new(
                self.swatch.x + (i % 16) * cell,
                self.swatch.y + (i / 16) * cell,
                cell,
                cell,
            );
            self.texture
                .fill(Some(rect), self.palette.native(i as u8));
        }
    }

    fn draw_sprites(&mut self, flags: PresentFlags) {
        let s = self.geom.scale;
        let (cx, cy) = self.geom.centring_scaled();
        let clip = if flags.centred {
            self.geom.centred_rect()
        } else if let Some(slide) = &self.slide {
            slide.clip
        } else {
            self.sprites_clip
        };
        self.frame.set_clip(Some(clip));
        for spr in &self.sprites {
            let Some(sheet) = &self.sheets[spr.kind.index()] else {
                continue;
            };
            if spr.frame >= sheet.count() {
                continue;
            }
            if flags.paused && !PAUSED_FRAMES.contains(&spr.frame) {
                continue;
            }
            let mut x = (spr.x + self.shake.0) * s;
            let mut y = (spr.y + self.shake.1) * s;
            if let Some(slide) = &self.slide {
                x += slide.reveal.x - cx;
                y += slide.reveal.y - cy;
            }
            if spr.centred {
                x += cx;
                y += cy;
            }
            let t = sheet.frames[spr.frame].scaled(s);
            if spr.xflip {
                if t.w == 0 || t.h == 0 {
                    continue;
                }
                let flipped = self
                    .flips
                    .get_or_insert(spr.kind, spr.frame, &sheet.texture, t);
                self.frame.blit(flipped, None, x, y);
            } else {
                self.frame.blit(&sheet.texture, Some(t), x, y);
            }
        }
        self.frame.set_clip(None);
    }

    fn draw_fixed_panel(&mut self) {
        if let Some(slide) = &self.slide {
            self.frame.set_clip(None);
            self.frame
                .blit(&self.texture, Some(slide.fixed), slide.fixed.x, slide.fixed.y);
        }
    }

    /// Ramp a black overlay over the last frame, `fade_in` goes from black
    /// to the picture. Clears the sprite list when done.
    pub fn fade(
        &mut self,
        fade_in: bool,
        clock: &mut impl Clock,
        flags: PresentFlags,
    ) -> Result<(), DisplayError> {
        for i in 0..=FADE_STEPS {
            let mut alpha = 255 * i / FADE_STEPS;
            if fade_in {
                alpha = 255 - alpha;
            }
            self.frame.set_clip(None);
            self.frame.fill(None, BLACK);
            self.frame.blit(&self.texture, None, 0, 0);
            self.draw_sprites(flags);
            self.draw_fixed_panel();
            self.frame.blend_black(alpha as u8);
            self.display.present(&self.frame)?;
            clock.delay(TRANSITION_DELAY);
        }
        self.clear_sprites();
        Ok(())
    }

    /// Wipe the last frame in or out. `area` is in logical pixels.
    pub fn transition(
        &mut self,
        area: Rect,
        kind: TransitionKind,
        open: bool,
        clock: &mut impl Clock,
    ) -> Result<(), DisplayError> {
        let s = self.geom.scale;
        let (w, h) = (area.w * s, area.h * s);
        let all = Rect::new(0, 0, w, h);
        self.frame.set_clip(None);
        for r in Wipe::new(w, h, kind, open) {
            debug!("Transition {r:?} open {open}");
            self.frame.fill(Some(all), BLACK);
            self.frame.blit(&self.texture, Some(r), r.x, r.y);
            self.display.present(&self.frame)?;
            clock.delay(TRANSITION_DELAY);
        }
        Ok(())
    }
}
