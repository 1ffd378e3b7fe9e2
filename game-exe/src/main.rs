#![doc = include_str!("../../README.md")]

mod cli;
mod config;

use std::error::Error;

use assets::DataDir;
use cli::*;
use gamestate::{Game, GameOptions, LevelCards};
use gamestate_traits::{ScaleOutcome, ScreenRequest, System};
use input::Translator;
use log::{error, info, warn};
use mimalloc::MiMalloc;
use simplelog::TermLogger;
use sound_nosnd::{NoAudio, NoMusic};
use sound_sdl2::SdlAudio;
use sound_traits::AudioServer;
use sys_core::Sys;
use sys_sdl2::{SdlClock, SdlDisplay, SdlEvents};

use crate::config::UserConfig;

const BASE_DIR: &str = "pre2/";
const CAPTION: &str = "Prehistorik 2";
/// Any of these in the data path means the game is there
const DATA_FILES: &[&str] = &["MENU.SQZ", "TITUS.SQZ", "MOTIF.SQZ", "MAP.SQZ"];

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// The main `game-exe` crate should take care of initialising a few things
fn main() -> Result<(), Box<dyn Error>> {
    let mut options: CLIOptions = argh::from_env();
    let log_level = options.verbose.unwrap_or(log::LevelFilter::Warn);

    TermLogger::init(
        log_level,
        simplelog::ConfigBuilder::default()
            .set_time_level(log::LevelFilter::Trace)
            .build(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let mut user_config = UserConfig::load();
    user_config.sync_cli(&mut options);
    user_config.write();

    let data = DataDir::new(options.data_path());
    if !data.detect(DATA_FILES) {
        error!("No data files found in {:?}", data.path());
        return Ok(());
    }

    let sdl_ctx = sdl2::init()?;
    info!("Init SDL2 main");
    let video_ctx = sdl_ctx.video()?;
    info!("Init SDL2 video");
    let timer = sdl_ctx.timer()?;
    let joysticks = match sdl_ctx.joystick() {
        Ok(j) => Some(j),
        Err(e) => {
            warn!("No joystick support: {e}");
            None
        }
    };
    let events = SdlEvents::new(sdl_ctx.event_pump()?, joysticks);
    let display = SdlDisplay::new(video_ctx, CAPTION)?;
    let translator = Translator::new(user_config.input.clone(), events.has_joystick());
    let clock = SdlClock::new(timer);

    if options.nosound {
        info!("Sound disabled");
        let sys = Sys::new(display, events, NoAudio::new(), clock, translator, false);
        run(sys, data, &options, &mut user_config, log_level)
    } else {
        let audio = SdlAudio::new(sdl_ctx.audio()?);
        info!("Init SDL2 sound");
        let sys = Sys::new(display, events, audio, clock, translator, true);
        run(sys, data, &options, &mut user_config, log_level)
    }
}

fn run<A: AudioServer>(
    mut sys: Sys<SdlDisplay, SdlEvents, A, SdlClock>,
    data: DataDir,
    options: &CLIOptions,
    user_config: &mut UserConfig,
    log_level: log::LevelFilter,
) -> Result<(), Box<dyn Error>> {
    sys.set_log_level(log_level);
    sys.state_mut().debug_mask = options.debug;

    let size = options.screensize.unwrap_or(ScreenSize {
        w: render_target::ORIG_W,
        h: render_target::ORIG_H,
    });
    let scale = options.scale();
    let req = ScreenRequest {
        window_w: size.w * scale,
        window_h: size.h * scale,
        caption: CAPTION.to_string(),
        scale,
        filter: options.filter.unwrap_or_default(),
        fullscreen: options.fullscreen,
        hybrid_color: options.hybrid,
    };
    if let ScaleOutcome::Refused { requested } = sys.set_screen_size(&req)? {
        let msg = format!(
            "Unable to open a {}x{} screen at scale {requested}",
            size.w, size.h
        );
        return Err(msg.into());
    }
    let (w, h) = sys.screen_size();
    info!("Screen {w}x{h}, scale {scale}");

    let game_options = GameOptions::from(options);
    let mut game = Game::new(sys, data, NoMusic::default(), LevelCards, game_options);
    game.run();
    if user_config.sync_input(game.sys.translator().config()) {
        user_config.write();
    }
    info!("Bye");
    Ok(())
}
