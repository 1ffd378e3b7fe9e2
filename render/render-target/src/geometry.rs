//! Window, scale and logical screen bookkeeping.

use std::str::FromStr;

use log::{debug, info, warn};

use crate::{ORIG_H, ORIG_W, Rect};

/// Texture scaling quality handed to the backend
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ScaleFilter {
    #[default]
    Nearest,
    Linear,
    Best,
}

impl ScaleFilter {
    /// Lenient parse used for user supplied names, unknown names fall back
    /// to `Nearest`.
    pub fn from_name(name: &str) -> Self {
        name.parse().unwrap_or_else(|_| {
            warn!("Unknown scale filter '{name}', using nearest");
            Self::Nearest
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            ScaleFilter::Nearest => "nearest",
            ScaleFilter::Linear => "linear",
            ScaleFilter::Best => "best",
        }
    }
}

impl FromStr for ScaleFilter {
    type Err = std::io::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "nearest" | "0" => Ok(Self::Nearest),
            "linear" | "1" => Ok(Self::Linear),
            "best" | "anisotropic" | "2" => Ok(Self::Best),
            _ => Err(std::io::Error::new(
                std::io::ErrorKind::Unsupported,
                "Invalid scale filter",
            )),
        }
    }
}

/// A request to (re)configure the screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenRequest {
    pub window_w: i32,
    pub window_h: i32,
    pub caption: String,
    pub scale: i32,
    pub filter: ScaleFilter,
    pub fullscreen: bool,
    pub hybrid_color: bool,
}

/// What the backend needs to know to build its window and texture
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayMode {
    pub window_w: i32,
    pub window_h: i32,
    /// Size of the presented frame in pixels, logical size times scale
    pub frame_w: i32,
    pub frame_h: i32,
    pub caption: String,
    pub fullscreen: bool,
    pub filter: ScaleFilter,
}

/// The first accepted configuration, kept for the restore hotkey
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrigMode {
    pub w: i32,
    pub h: i32,
    pub scale: i32,
    pub fullscreen: bool,
    pub hybrid_color: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleOutcome {
    Applied,
    /// The scaled screen would not fit in the window, nothing was changed
    Refused { requested: i32 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Geometry {
    /// Logical game resolution
    pub w: i32,
    pub h: i32,
    pub scale: i32,
    pub window_w: i32,
    pub window_h: i32,
    pub caption: String,
    pub filter: ScaleFilter,
    pub fullscreen: bool,
    pub hybrid_color: bool,
    /// Freeze the logical resolution on window changes
    pub size_lock: bool,
    pub orig: Option<OrigMode>,
}

impl Default for Geometry {
    fn default() -> Self {
        Self {
            w: 0,
            h: 0,
            scale: 1,
            window_w: 0,
            window_h: 0,
            caption: String::new(),
            filter: ScaleFilter::Nearest,
            fullscreen: false,
            hybrid_color: false,
            size_lock: false,
            orig: None,
        }
    }
}

impl Geometry {
    /// Fit the requested scale into the window. The logical size never drops
    /// below the original playfield. A request that cannot fit is refused
    /// without touching any field.
    pub fn fit(&mut self, req: &ScreenRequest) -> ScaleOutcome {
        let scale = req.scale.max(1);
        let screen_w = (req.window_w / scale).max(ORIG_W);
        let screen_h = (req.window_h / scale).max(ORIG_H);
        if screen_w * scale > req.window_w || screen_h * scale > req.window_h {
            warn!(
                "Unable to fit {}x scaled {}x{} screen within {}x{} window bounds",
                scale, screen_w, screen_h, req.window_w, req.window_h
            );
            return ScaleOutcome::Refused {
                requested: req.scale,
            };
        }

        self.window_w = req.window_w;
        self.window_h = req.window_h;
        req.caption.clone_into(&mut self.caption);
        self.fullscreen = req.fullscreen;
        self.filter = req.filter;
        self.hybrid_color = req.hybrid_color;
        self.scale = scale;
        if !self.size_lock {
            self.w = screen_w;
            self.h = screen_h;
        } else {
            debug!("Size locked, keeping {}x{}", self.w, self.h);
        }
        if self.orig.is_none() {
            let orig = OrigMode {
                w: screen_w,
                h: screen_h,
                scale,
                fullscreen: req.fullscreen,
                hybrid_color: req.hybrid_color,
            };
            info!(
                "Original window size: {}x{}, scale {}, fullscreen: {}, hybrid colour: {}",
                orig.w, orig.h, orig.scale, orig.fullscreen, orig.hybrid_color
            );
            self.orig = Some(orig);
        }
        ScaleOutcome::Applied
    }

    /// The same request with the last window but a different scale
    pub fn request(&self, scale: i32) -> ScreenRequest {
        ScreenRequest {
            window_w: self.window_w,
            window_h: self.window_h,
            caption: self.caption.clone(),
            scale,
            filter: self.filter,
            fullscreen: self.fullscreen,
            hybrid_color: self.hybrid_color,
        }
    }

    pub fn display_mode(&self) -> DisplayMode {
        DisplayMode {
            window_w: self.window_w,
            window_h: self.window_h,
            frame_w: self.frame_w(),
            frame_h: self.frame_h(),
            caption: self.caption.clone(),
            fullscreen: self.fullscreen,
            filter: self.filter,
        }
    }

    #[inline]
    pub fn frame_w(&self) -> i32 {
        self.w * self.scale
    }

    #[inline]
    pub fn frame_h(&self) -> i32 {
        self.h * self.scale
    }

    /// Offset of the original 320x200 playfield inside the logical screen,
    /// in logical pixels
    #[inline]
    pub fn centring(&self) -> (i32, i32) {
        ((self.w - ORIG_W) / 2, (self.h - ORIG_H) / 2)
    }

    /// `centring` in frame pixels
    #[inline]
    pub fn centring_scaled(&self) -> (i32, i32) {
        let (x, y) = self.centring();
        (x * self.scale, y * self.scale)
    }

    /// The centred playfield in frame pixels
    pub fn centred_rect(&self) -> Rect {
        let (x, y) = self.centring_scaled();
        Rect::new(x, y, ORIG_W * self.scale, ORIG_H * self.scale)
    }
}

#[cfg(test)]
mod tests {
    use crate::geometry::{Geometry, ScaleFilter, ScaleOutcome, ScreenRequest};

    fn req(w: i32, h: i32, scale: i32) -> ScreenRequest {
        ScreenRequest {
            window_w: w,
            window_h: h,
            caption: "Prehistorik 2".to_string(),
            scale,
            filter: ScaleFilter::Nearest,
            fullscreen: false,
            hybrid_color: false,
        }
    }

    #[test]
    fn logical_size_has_a_floor() {
        let mut g = Geometry::default();
        assert_eq!(g.fit(&req(640, 400, 2)), ScaleOutcome::Applied);
        assert_eq!((g.w, g.h, g.scale), (320, 200, 2));
        assert_eq!(g.fit(&req(640, 400, 1)), ScaleOutcome::Applied);
        assert_eq!((g.w, g.h, g.scale), (640, 400, 1));
        assert_eq!(g.centring(), (160, 100));
        assert_eq!(g.centring_scaled(), (160, 100));
    }

    #[test]
    fn refusal_leaves_everything() {
        let mut g = Geometry::default();
        g.fit(&req(640, 400, 2));
        let before = g.clone();
        for (w, h, s) in [(640, 400, 3), (320, 200, 2), (100, 100, 1), (639, 1000, 2)] {
            assert_eq!(
                g.fit(&req(w, h, s)),
                ScaleOutcome::Refused { requested: s }
            );
            assert_eq!(g, before);
        }
    }

    #[test]
    fn size_lock_freezes_logical() {
        let mut g = Geometry::default();
        g.fit(&req(320, 200, 1));
        g.size_lock = true;
        g.fit(&req(800, 600, 1));
        assert_eq!((g.w, g.h), (320, 200));
        assert_eq!((g.window_w, g.window_h), (800, 600));
    }

    #[test]
    fn original_mode_recorded_once() {
        let mut g = Geometry::default();
        g.fit(&req(640, 400, 2));
        g.fit(&req(1280, 800, 2));
        let orig = g.orig.unwrap();
        assert_eq!((orig.w, orig.h, orig.scale), (320, 200, 2));
    }

    #[test]
    fn filter_names() {
        assert_eq!(ScaleFilter::from_name("Linear"), ScaleFilter::Linear);
        assert_eq!(ScaleFilter::from_name("bogus"), ScaleFilter::Nearest);
    }
}
