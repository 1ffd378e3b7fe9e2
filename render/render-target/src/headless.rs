//! Backends that never touch a window. Used when running without video and
//! by tests in every crate that needs a display or a clock.

use crate::{Clock, Display, DisplayError, DisplayMode, Surface};

#[derive(Debug, Default)]
pub struct HeadlessDisplay {
    pub mode: Option<DisplayMode>,
    /// Frames presented so far
    pub presented: usize,
    pub last_frame: Surface,
    pub fullscreen: bool,
    pub desktop: Option<(i32, i32)>,
}

impl Display for HeadlessDisplay {
    fn reconfigure(&mut self, mode: &DisplayMode) -> Result<(), DisplayError> {
        self.fullscreen = mode.fullscreen;
        self.mode = Some(mode.clone());
        Ok(())
    }

    fn present(&mut self, frame: &Surface) -> Result<(), DisplayError> {
        self.presented += 1;
        self.last_frame.clone_from(frame);
        Ok(())
    }

    fn set_fullscreen(&mut self, on: bool) -> Result<(), DisplayError> {
        self.fullscreen = on;
        Ok(())
    }

    fn desktop_size(&self) -> Option<(i32, i32)> {
        self.desktop
    }
}

/// A clock that only moves when told to, `delay` advances it
#[derive(Debug, Default, Clone)]
pub struct ManualClock {
    pub now: u32,
}

impl Clock for ManualClock {
    fn ticks(&self) -> u32 {
        self.now
    }

    fn delay(&mut self, ms: u32) {
        self.now = self.now.wrapping_add(ms);
    }
}
