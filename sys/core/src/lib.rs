//! The one `System` the game runs on. Backends only provide the four seams:
//! a `Display` for finished frames, an `EventSource`, an `AudioServer` and a
//! `Clock`. Everything else (compositing, hotkeys, messages) lives here.


use gamestate_traits::{
    AudioFill, DisplayError, IndexedImage, InputState, Rect, ScaleOutcome, ScreenRequest,
    SlideRequest, SpriteCmd, SpriteKind, SysState, System, TransitionKind,
};
use hud_messages::MessageQueue;
use input::{EventSource, SysCommand, Translator};
use log::{LevelFilter, error, info, warn};
use render_target::{Clock, Display, PresentFlags, RenderTarget};
use sound_traits::AudioServer;

pub struct Sys<D: Display, E: EventSource, A: AudioServer, C: Clock> {
    render: RenderTarget<D>,
    events: E,
    audio: A,
    clock: C,
    translator: Translator,
    input: InputState,
    state: SysState,
    messages: MessageQueue,
    commands: Vec<SysCommand>,
    /// Log level to fall back to when no debug channel is on
    log_level: LevelFilter,
    debug_mask: u16,
}

impl<D: Display, E: EventSource, A: AudioServer, C: Clock> Sys<D, E, A, C> {
    pub fn new(
        display: D,
        events: E,
        audio: A,
        clock: C,
        translator: Translator,
        audio_enabled: bool,
    ) -> Self {
        let input = InputState {
            jump_button: translator.config().jump_button,
            ..InputState::default()
        };
        let state = SysState {
            audio: audio_enabled,
            ..SysState::default()
        };
        Self {
            render: RenderTarget::new(display),
            events,
            audio,
            clock,
            translator,
            input,
            state,
            messages: MessageQueue::new(),
            commands: Vec::new(),
            log_level: log::max_level(),
            debug_mask: 0,
        }
    }

    pub fn render(&self) -> &RenderTarget<D> {
        &self.render
    }

    pub fn render_mut(&mut self) -> &mut RenderTarget<D> {
        &mut self.render
    }

    pub fn events_mut(&mut self) -> &mut E {
        &mut self.events
    }

    pub fn audio(&self) -> &A {
        &self.audio
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Current bindings, including a jump button captured at runtime
    pub fn translator(&self) -> &Translator {
        &self.translator
    }

    /// Debug channels raise logging to `Debug`, this is the level used
    /// when all are off
    pub fn set_log_level(&mut self, level: LevelFilter) {
        self.log_level = level;
        self.sync_log_level();
    }

    fn flags(&self) -> PresentFlags {
        PresentFlags {
            centred: self.state.centred,
            paused: self.state.paused,
            sine: self.state.sine,
        }
    }

    fn sync_log_level(&mut self) {
        self.debug_mask = self.state.debug_mask;
        if self.debug_mask != 0 {
            log::set_max_level(self.log_level.max(LevelFilter::Debug));
        } else {
            log::set_max_level(self.log_level);
        }
    }

    fn run_commands(&mut self) {
        let commands = std::mem::take(&mut self.commands);
        for cmd in commands {
            self.run_command(cmd);
        }
    }

    fn run_command(&mut self, cmd: SysCommand) {
        let outcome = match cmd {
            SysCommand::Rescale(n) => self.render.rescale(n),
            SysCommand::ToggleScale => self.render.toggle_scale().map(Some),
            SysCommand::ToggleFullscreen => self.render.toggle_fullscreen().map(Some),
            SysCommand::RestoreOriginal => self.render.restore_original().map(Some),
            SysCommand::WindowResized(w, h) => self.render.window_resized(w, h),
            SysCommand::ToggleSizeLock => {
                let locked = self.render.toggle_size_lock();
                let (now, was) = if locked {
                    ("locked", "unlocked")
                } else {
                    ("unlocked", "locked")
                };
                self.messages.clear(&format!("Size {was}"));
                self.messages.add(format!("Size {now}"));
                Ok(None)
            }
            SysCommand::NudgeSwatch(dx, dy) => {
                self.render.swatch.x += dx;
                self.render.swatch.y += dy;
                Ok(None)
            }
            SysCommand::ToggleSwatch => {
                self.render.swatch.visible = !self.render.swatch.visible;
                Ok(None)
            }
            SysCommand::ToggleSinePlot => {
                let sine = self.render.sine_mut();
                sine.plot = !sine.plot;
                Ok(None)
            }
            SysCommand::ReverseSine => {
                self.render.sine_mut().reverse();
                Ok(None)
            }
            SysCommand::SineOffset(dy) => {
                self.render.sine_mut().nudge_offset(dy);
                Ok(None)
            }
            SysCommand::SineAmplitude(grow) => {
                let sine = self.render.sine_mut();
                if grow {
                    sine.grow_amplitude();
                } else {
                    sine.shrink_amplitude();
                }
                Ok(None)
            }
            SysCommand::PauseAudio(paused) => {
                self.audio.pause(paused);
                Ok(None)
            }
            SysCommand::Notify { clear, add } => {
                if let Some(clear) = clear {
                    self.messages.clear(&clear);
                }
                self.messages.add(add);
                Ok(None)
            }
        };
        match outcome {
            Ok(Some(outcome)) => self.geometry_changed(outcome),
            Ok(None) => {}
            Err(e) => error!("Resize failed: {e}"),
        }
    }

    fn geometry_changed(&mut self, outcome: ScaleOutcome) {
        self.state.resize = true;
        match outcome {
            ScaleOutcome::Applied => {
                self.state.hybrid_color = self.render.geometry().hybrid_color;
            }
            ScaleOutcome::Refused { requested } => {
                self.messages.add(format!("Unable to scale to {requested}"));
            }
        }
    }
}

impl<D: Display, E: EventSource, A: AudioServer, C: Clock> System for Sys<D, E, A, C> {
    fn input(&self) -> &InputState {
        &self.input
    }

    fn input_mut(&mut self) -> &mut InputState {
        &mut self.input
    }

    fn state(&self) -> &SysState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut SysState {
        &mut self.state
    }

    fn screen_size(&self) -> (i32, i32) {
        let g = self.render.geometry();
        (g.w, g.h)
    }

    fn set_screen_size(&mut self, req: &ScreenRequest) -> Result<ScaleOutcome, DisplayError> {
        let outcome = self.render.set_screen_size(req)?;
        match outcome {
            ScaleOutcome::Applied => self.state.hybrid_color = req.hybrid_color,
            ScaleOutcome::Refused { requested } => {
                self.messages.add(format!("Unable to scale to {requested}"))
            }
        }
        Ok(outcome)
    }

    fn set_screen_palette(&mut self, colors: &[u8], offset: usize, count: usize, depth: u8) {
        if let Err(e) = self.render.set_palette(colors, offset, count, depth) {
            error!("Failed to set palette: {e}");
        }
    }

    fn set_palette_amiga(&mut self, colors: &[u16], offset: usize) {
        if let Err(e) = self.render.set_palette_amiga(colors, offset) {
            error!("Failed to set palette: {e}");
        }
    }

    fn set_copper_bars(&mut self, data: Option<&[u16]>) {
        self.render.set_copper_bars(data);
    }

    fn set_palette_color(&mut self, i: usize, rgb6: [u8; 3]) {
        self.render.set_palette_color(i, rgb6);
    }

    fn fade_in_palette(&mut self) {
        if self.input.quit {
            return;
        }
        let flags = self.flags();
        if let Err(e) = self.render.fade(true, &mut self.clock, flags) {
            error!("Fade in failed: {e}");
        }
    }

    fn fade_out_palette(&mut self) {
        if self.input.quit {
            return;
        }
        let flags = self.flags();
        if let Err(e) = self.render.fade(false, &mut self.clock, flags) {
            error!("Fade out failed: {e}");
        }
    }

    fn resize_screen(&mut self) {
        match self.render.resize() {
            Ok(outcome) => self.geometry_changed(outcome),
            Err(e) => error!("Resize failed: {e}"),
        }
    }

    fn update_screen(&mut self, p: &[u8], present: bool) {
        self.update_screen_cached(p, present, false);
    }

    fn update_screen_cached(&mut self, p: &[u8], present: bool, cache_redraw: bool) {
        // a resize leaves the converted frame at the old size
        let cache_redraw = cache_redraw && !self.state.resize;
        let flags = self.flags();
        if let Err(e) = self
            .render
            .update_screen_cached(p, present, cache_redraw, flags)
        {
            error!("Failed to present frame: {e}");
        }
    }

    fn shake_screen(&mut self, dx: i32, dy: i32) {
        self.render.shake(dx, dy);
    }

    fn transition_screen(&mut self, area: Rect, kind: TransitionKind, open: bool) {
        if let Err(e) = self.render.transition(area, kind, open, &mut self.clock) {
            error!("Transition failed: {e}");
        }
    }

    fn process_events(&mut self) {
        while let Some(ev) = self.events.poll_event() {
            self.translator
                .handle(&ev, &mut self.input, &mut self.state, &mut self.commands);
            self.render.set_hybrid_color(self.state.hybrid_color);
            self.run_commands();
            if self.input.quit {
                break;
            }
        }
        if self.state.debug_mask != self.debug_mask {
            self.sync_log_level();
        }
        self.messages.ticker(self.clock.ticks());
    }

    fn sleep(&mut self, ms: u32) {
        self.clock.delay(ms);
    }

    fn get_timestamp(&self) -> u32 {
        self.clock.ticks()
    }

    fn start_audio(&mut self, fill: AudioFill) {
        if !self.state.audio {
            return;
        }
        match self.audio.start(fill) {
            Ok(()) => info!("Audio started"),
            Err(e) => warn!("{e}"),
        }
    }

    fn stop_audio(&mut self) {
        if self.state.audio {
            self.audio.stop();
        }
    }

    fn lock_audio(&mut self) {
        if self.state.audio {
            self.audio.lock();
        }
    }

    fn unlock_audio(&mut self) {
        if self.state.audio {
            self.audio.unlock();
        }
    }

    fn render_load_sprites(
        &mut self,
        kind: SpriteKind,
        frames: &[Rect],
        image: IndexedImage,
        update_pal: bool,
    ) {
        if let Err(e) = self.render.load_sprites(kind, frames, image, update_pal) {
            error!("Failed to load sprites for {kind:?}: {e}");
        }
    }

    fn render_unload_sprites(&mut self, kind: SpriteKind) {
        self.render.unload_sprites(kind);
    }

    fn render_add_sprite(&mut self, cmd: SpriteCmd) {
        self.render.add_sprite(cmd);
    }

    fn render_clear_sprites(&mut self) {
        self.render.clear_sprites();
    }

    fn render_set_sprites_clipping_rect(&mut self, x: i32, y: i32, w: i32, h: i32) {
        self.render.set_sprites_clip(x, y, w, h);
    }

    fn begin_slide(&mut self, req: SlideRequest) {
        self.render.begin_slide(req);
    }

    fn clear_slide(&mut self) {
        self.render.clear_slide();
    }

    fn add_message(&mut self, msg: &str) {
        self.messages.add(msg);
    }

    fn get_message(&self) -> Option<&str> {
        self.messages.get()
    }

    fn clear_message(&mut self, msg: &str) {
        self.messages.clear(msg);
    }

    fn clear_messages(&mut self) {
        self.messages.clear_all();
    }
}
