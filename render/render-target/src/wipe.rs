//! Square and curtain screen wipes. The wipe only decides which part of the
//! last frame is visible at each step, the caller draws and waits.

use crate::{FADE_STEPS, Rect};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionKind {
    /// Rectangle growing out of (or shrinking into) the centre
    Square,
    /// Full height band opening sideways, or closing from the top
    Curtain,
}

/// Rect sequence for a `w` x `h` frame area
pub struct Wipe {
    r: Rect,
    w: i32,
    h: i32,
    step_w: i32,
    step_h: i32,
    kind: TransitionKind,
    open: bool,
    done: bool,
}

impl Wipe {
    pub fn new(w: i32, h: i32, kind: TransitionKind, open: bool) -> Self {
        let step_w = (w / (FADE_STEPS + 1)).max(1);
        let step_h = if h > 0 {
            (h / (FADE_STEPS + 1) * w / h).max(1)
        } else {
            1
        };
        let r = Rect::new(
            0,
            0,
            0,
            if kind == TransitionKind::Curtain { h } else { 0 },
        );
        Self {
            r,
            w,
            h,
            step_w,
            step_h,
            kind,
            open,
            done: w <= 0 || h <= 0,
        }
    }

    fn step(&mut self) -> Rect {
        let r = &mut self.r;
        if self.open {
            r.w += self.step_w;
            r.x = (self.w - r.w) / 2;
        } else {
            r.w = self.w;
            r.y += self.step_h / 2 + self.step_h % 2;
            r.h -= self.step_h.min(r.h);
        }
        if self.kind == TransitionKind::Square {
            r.y = ((self.h - r.h) / 2).max(0);
            r.h += self.step_h;
            if r.y + r.h > self.h {
                r.h = self.h - r.y;
            }
        }
        let growing = (self.open && r.x > r.x % self.step_w) || (!self.open && r.y < self.h / 2);
        let inside = self.kind == TransitionKind::Curtain || r.y > r.y % self.step_h;
        self.done = !(growing && inside);
        *r
    }
}

impl Iterator for Wipe {
    type Item = Rect;

    fn next(&mut self) -> Option<Rect> {
        if self.done {
            return None;
        }
        Some(self.step())
    }
}
