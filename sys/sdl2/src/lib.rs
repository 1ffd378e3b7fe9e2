//! SDL2 ends of the system seams: a window that shows finished frames, the
//! event pump and the millisecond clock.

mod events;

pub use events::SdlEvents;

use log::{debug, info, warn};
use render_target::{Clock, Display, DisplayError, DisplayMode, Surface};
use sdl2::pixels::PixelFormatEnum;
use sdl2::rect::Rect as SdlRect;
use sdl2::render::{Canvas, Texture, TextureCreator};
use sdl2::video::{FullscreenType, Window, WindowContext};
use sdl2::{TimerSubsystem, VideoSubsystem};

const SCALE_QUALITY_HINT: &str = "SDL_RENDER_SCALE_QUALITY";

pub struct SdlDisplay {
    video: VideoSubsystem,
    canvas: Canvas<Window>,
    creator: TextureCreator<WindowContext>,
    texture: Option<Texture>,
    frame_w: u32,
    frame_h: u32,
}

impl SdlDisplay {
    /// The window stays hidden until the first `reconfigure`
    pub fn new(video: VideoSubsystem, caption: &str) -> Result<Self, DisplayError> {
        let num_disp = video
            .num_video_displays()
            .map_err(DisplayError::Init)?;
        for n in 0..num_disp {
            if let Ok(name) = video.display_name(n) {
                info!("Found display {name:?}");
            }
        }
        let window = video
            .window(caption, 320, 200)
            .position_centered()
            .resizable()
            .hidden()
            .build()
            .map_err(|e| DisplayError::Init(e.to_string()))?;
        let canvas = window
            .into_canvas()
            .accelerated()
            .build()
            .map_err(|e| DisplayError::Init(e.to_string()))?;
        let creator = canvas.texture_creator();
        Ok(Self {
            video,
            canvas,
            creator,
            texture: None,
            frame_w: 0,
            frame_h: 0,
        })
    }
}

impl Display for SdlDisplay {
    fn reconfigure(&mut self, mode: &DisplayMode) -> Result<(), DisplayError> {
        let window = self.canvas.window_mut();
        window
            .set_title(&mode.caption)
            .map_err(|e| DisplayError::Mode(e.to_string()))?;
        let fs = if mode.fullscreen {
            FullscreenType::Desktop
        } else {
            FullscreenType::Off
        };
        window.set_fullscreen(fs).map_err(DisplayError::Mode)?;
        if !mode.fullscreen {
            window
                .set_size(mode.window_w as u32, mode.window_h as u32)
                .map_err(|e| DisplayError::Mode(e.to_string()))?;
        }
        window.show();

        if !sdl2::hint::set(SCALE_QUALITY_HINT, mode.filter.name()) {
            warn!("Could not set scale filter {}", mode.filter.name());
        }
        // A resized window also needs a new texture, the old one is dropped
        let (w, h) = (mode.frame_w as u32, mode.frame_h as u32);
        let texture = self
            .creator
            .create_texture_streaming(PixelFormatEnum::ARGB8888, w, h)
            .map_err(|e| DisplayError::Mode(e.to_string()))?;
        if let Some(old) = self.texture.replace(texture) {
            // SAFETY: the creator that made it is still alive and nothing
            // else holds the texture
            unsafe { old.destroy() };
        }
        (self.frame_w, self.frame_h) = (w, h);
        debug!("Display texture {w}x{h} filter {:?}", mode.filter);
        Ok(())
    }

    fn present(&mut self, frame: &Surface) -> Result<(), DisplayError> {
        let Some(texture) = &mut self.texture else {
            return Err(DisplayError::Present("no texture".to_string()));
        };
        let w = frame.width() as usize;
        texture
            .with_lock(None, |buf: &mut [u8], pitch: usize| {
                for (row, src) in frame.pixels().chunks_exact(w).enumerate() {
                    let dst = &mut buf[row * pitch..row * pitch + w * 4];
                    for (d, s) in dst.chunks_exact_mut(4).zip(src) {
                        d.copy_from_slice(&s.to_ne_bytes());
                    }
                }
            })
            .map_err(DisplayError::Present)?;

        // Centre the frame, the window can be larger than the scaled screen
        let (out_w, out_h) = self
            .canvas
            .output_size()
            .map_err(DisplayError::Present)?;
        let dst = SdlRect::new(
            (out_w as i32 - self.frame_w as i32) / 2,
            (out_h as i32 - self.frame_h as i32) / 2,
            self.frame_w,
            self.frame_h,
        );
        self.canvas.clear();
        self.canvas
            .copy(texture, None, dst)
            .map_err(DisplayError::Present)?;
        self.canvas.present();
        Ok(())
    }

    fn set_fullscreen(&mut self, on: bool) -> Result<(), DisplayError> {
        let fs = if on {
            FullscreenType::Desktop
        } else {
            FullscreenType::Off
        };
        self.canvas
            .window_mut()
            .set_fullscreen(fs)
            .map_err(DisplayError::Mode)
    }

    fn desktop_size(&self) -> Option<(i32, i32)> {
        let index = self.canvas.window().display_index().unwrap_or(0);
        self.video
            .desktop_display_mode(index)
            .map(|m| (m.w, m.h))
            .ok()
    }
}

impl Drop for SdlDisplay {
    fn drop(&mut self) {
        if let Some(texture) = self.texture.take() {
            // SAFETY: dropped before the creator and canvas
            unsafe { texture.destroy() };
        }
    }
}

pub struct SdlClock {
    timer: TimerSubsystem,
}

impl SdlClock {
    pub fn new(timer: TimerSubsystem) -> Self {
        Self { timer }
    }
}

impl Clock for SdlClock {
    fn ticks(&self) -> u32 {
        self.timer.ticks()
    }

    fn delay(&mut self, ms: u32) {
        self.timer.delay(ms);
    }
}

