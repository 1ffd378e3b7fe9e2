//! Panel reveal animation. The base playfield slides into place while a
//! fixed panel (the status bar) stays where it is.

use log::debug;

use crate::geometry::Geometry;
use crate::{ORIG_H, ORIG_W, Rect};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlideKind {
    /// Playfield rises from below the screen
    Bottom,
}

/// What the caller asks for, in logical pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlideRequest {
    pub kind: SlideKind,
    /// `y` of the fixed panel, 0 to put it at the bottom of the screen
    pub panel_y: i32,
    pub panel_h: i32,
    /// Final position in frame pixels, 0 to derive it from the geometry
    pub end: i32,
}

/// All rects are in frame pixels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slide {
    pub kind: SlideKind,
    /// Source of the moving region
    pub base: Rect,
    /// Where the moving region is drawn, the animated rect
    pub reveal: Rect,
    pub clip: Rect,
    /// The panel drawn on top unmoved
    pub fixed: Rect,
    pub end: i32,
    pub step: i32,
    /// Steps taken so far, survives a rebuild
    pub last_pos: i32,
}

impl Slide {
    pub fn new(req: &SlideRequest, geom: &Geometry, centred: bool, last_pos: i32) -> Self {
        let s = geom.scale;
        let (cx, cy) = geom.centring_scaled();
        let fixed_y = if req.panel_y != 0 {
            req.panel_y * s
        } else {
            geom.h * s - req.panel_h * s
        };
        let fixed = Rect::new(0, fixed_y, geom.w * s, req.panel_h * s);
        let base = Rect::new(0, 0, ORIG_W * s, ORIG_H * s);
        let mut reveal = base;
        let (end, step) = match req.kind {
            SlideKind::Bottom => {
                if !centred {
                    reveal.x += cx;
                }
                let end = if req.end != 0 {
                    req.end
                } else if base.y > cy {
                    fixed.y + fixed.h
                } else {
                    cy
                };
                // a smaller screen may already be past the end
                reveal.y = (geom.h * s - last_pos).max(end);
                (end, -1)
            }
        };
        let clip = Rect::new(cx, 0, ORIG_W * s, fixed.y);
        debug!("Slide {:?} from {} to {}, {} steps in", req.kind, reveal.y, end, last_pos);
        Self {
            kind: req.kind,
            base,
            reveal,
            clip,
            fixed,
            end,
            step,
            last_pos,
        }
    }

    #[inline]
    fn pos(&self) -> i32 {
        match self.kind {
            SlideKind::Bottom => self.reveal.y,
        }
    }

    /// One step per presented frame, holding at the end
    pub fn advance(&mut self) {
        if !self.finished() {
            match self.kind {
                SlideKind::Bottom => self.reveal.y += self.step,
            }
            self.last_pos += 1;
        }
    }

    /// Jump to the end position
    pub fn finish(&mut self) {
        match self.kind {
            SlideKind::Bottom => self.reveal.y = self.end,
        }
    }

    pub fn finished(&self) -> bool {
        match self.kind {
            SlideKind::Bottom => self.pos() <= self.end,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::geometry::{Geometry, ScaleFilter, ScreenRequest};
    use crate::slide::{Slide, SlideKind, SlideRequest};

    fn geom(w: i32, h: i32, scale: i32) -> Geometry {
        let mut g = Geometry::default();
        g.fit(&ScreenRequest {
            window_w: w,
            window_h: h,
            caption: String::new(),
            scale,
            filter: ScaleFilter::Nearest,
            fullscreen: false,
            hybrid_color: false,
        });
        g
    }

    const PANEL: SlideRequest = SlideRequest {
        kind: SlideKind::Bottom,
        panel_y: 0,
        panel_h: 40,
        end: 0,
    };

    #[test]
    fn bottom_slide_runs_to_centre() {
        let g = geom(320, 240, 1);
        let mut slide = Slide::new(&PANEL, &g, false, 0);
        assert_eq!(slide.reveal.y, 240);
        assert_eq!(slide.end, 20);
        assert_eq!(slide.fixed.y, 200);
        assert_eq!(slide.clip.h, 200);
        for _ in 0..500 {
            slide.advance();
        }
        assert!(slide.finished());
        assert_eq!(slide.reveal.y, 20);
        assert_eq!(slide.last_pos, 220);
    }

    #[test]
    fn explicit_end_is_kept() {
        let g = geom(320, 200, 1);
        let slide = Slide::new(&SlideRequest { end: 7, ..PANEL }, &g, false, 0);
        assert_eq!(slide.end, 7);
    }

    #[test]
    fn rebuild_past_end_holds_at_end() {
        let g = geom(320, 240, 1);
        let mut slide = Slide::new(&PANEL, &g, false, 340);
        assert_eq!(slide.reveal.y, 20);
        assert!(slide.finished());
        slide.advance();
        assert_eq!(slide.reveal.y, 20);
        assert_eq!(slide.last_pos, 340);
    }

    #[test]
    fn rebuild_resumes_progress() {
        let g = geom(320, 240, 1);
        let slide = Slide::new(&PANEL, &g, false, 10);
        assert_eq!(slide.reveal.y, 230);
        assert_eq!(slide.last_pos, 10);
    }
}
