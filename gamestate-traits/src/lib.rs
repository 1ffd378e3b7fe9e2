//! The boundary between the game and whatever drives the window, input and
//! audio. The screens in `gamestate` only ever talk to a `System` and an
//! `AssetLoader`, so they run the same against SDL or an in-memory backend.

pub use input::{
    INPUT_DIRECTION_DOWN, INPUT_DIRECTION_LEFT, INPUT_DIRECTION_RIGHT, INPUT_DIRECTION_UP,
    InputState, SysState,
};
pub use render_target::palette::fade_palettes;
pub use render_target::{
    DisplayError, IndexedImage, ORIG_H, ORIG_W, Rect, ScaleFilter, ScaleOutcome, ScreenRequest,
    SlideKind, SlideRequest, SpriteCmd, SpriteKind, TransitionKind,
};
pub use sound_traits::{AUDIO_FREQ, AudioFill, MusicPlayer};

/// System services used by the game
pub trait System {
    fn input(&self) -> &InputState;
    fn input_mut(&mut self) -> &mut InputState;
    fn state(&self) -> &SysState;
    fn state_mut(&mut self) -> &mut SysState;

    /// Logical screen size in game pixels
    fn screen_size(&self) -> (i32, i32);

    /// Fit the screen into a window. A scale that doesn't fit is refused
    /// with a message and the previous size stays.
    fn set_screen_size(&mut self, req: &ScreenRequest) -> Result<ScaleOutcome, DisplayError>;

    fn set_screen_palette(&mut self, colors: &[u8], offset: usize, count: usize, depth: u8);

    /// 16 Amiga 12-bit colours
    fn set_palette_amiga(&mut self, colors: &[u16], offset: usize);

    /// `None` removes the bars
    fn set_copper_bars(&mut self, data: Option<&[u16]>);

    /// One 6-bit colour, sprite caches are kept
    fn set_palette_color(&mut self, i: usize, rgb6: [u8; 3]);

    /// Both fades return at once when quit is requested
    fn fade_in_palette(&mut self);
    fn fade_out_palette(&mut self);

    fn resize_screen(&mut self);

    /// `p` is the logical screen, one palette index per pixel
    fn update_screen(&mut self, p: &[u8], present: bool);
    fn update_screen_cached(&mut self, p: &[u8], present: bool, cache_redraw: bool);

    fn shake_screen(&mut self, dx: i32, dy: i32);

    fn transition_screen(&mut self, area: Rect, kind: TransitionKind, open: bool);

    /// Drain pending events without blocking
    fn process_events(&mut self);

    fn sleep(&mut self, ms: u32);

    /// Milliseconds since start
    fn get_timestamp(&self) -> u32;

    fn start_audio(&mut self, fill: AudioFill);
    fn stop_audio(&mut self);
    fn lock_audio(&mut self);
    fn unlock_audio(&mut self);

    fn render_load_sprites(
        &mut self,
        kind: SpriteKind,
        frames: &[Rect],
        image: IndexedImage,
        update_pal: bool,
    );
    fn render_unload_sprites(&mut self, kind: SpriteKind);
    fn render_add_sprite(&mut self, cmd: SpriteCmd);
    fn render_clear_sprites(&mut self);
    /// Logical coordinates
    fn render_set_sprites_clipping_rect(&mut self, x: i32, y: i32, w: i32, h: i32);

    fn begin_slide(&mut self, req: SlideRequest);
    fn clear_slide(&mut self);

    fn add_message(&mut self, msg: &str);
    fn get_message(&self) -> Option<&str>;
    fn clear_message(&mut self, msg: &str);
    fn clear_messages(&mut self);
}

/// Game data files by name. The name match is case insensitive.
pub trait AssetLoader {
    /// `None` if the file is missing or unreadable
    fn load_file(&self, name: &str) -> Option<Vec<u8>>;
}
