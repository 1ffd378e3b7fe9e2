//! The screen sequencer. A session runs through a fixed set of stages:
//!
//! - intro: the vanity screen, Titus splash and the presentation
//! - a new run: lives and club reset, the joystick screen in the demo data
//! - the menu, which may go through code entry or the promo screen
//! - the motif (difficulty) screen when no code picked a level
//! - levels, each behind the map scroll, for as long as they are completed
//!
//! then back to a new run until quit. Each stage is one blocking screen
//! routine from `screens`. A screen whose picture is missing is skipped.
//!
//! The game side of a level is behind the `Gameplay` trait; `LevelCards` is
//! a stand in that lets the whole sequence run.

pub mod code;
pub mod font;
pub mod level;
pub mod palettes;
mod screens;
pub mod vars;
pub mod video;

#[cfg(test)]
mod tests;

use gamestate_traits::{AssetLoader, MusicPlayer, System};
use log::{debug, info};

pub use crate::level::{Gameplay, LevelCards, LevelOutcome};
use crate::level::PANEL_H;
use crate::palettes::UNIQUE_PALETTES;
use crate::vars::Vars;
use crate::video::Video;

/// Music played over the presentation
pub const INTRO_TRACK: u8 = 3;

/// Mixer output until a level brings its own sound
fn silence(out: &mut [i16]) {
    out.fill(0);
}

/// Flat options from the command line and user config
#[derive(Debug, Clone)]
pub struct GameOptions {
    pub start_level: u8,
    /// Scroll the map before each level
    pub show_map: bool,
    /// Show the castle cutscene before levels 8 and 9
    pub castle: bool,
    pub cheats: u16,
    pub start_pos: Option<(i32, i32)>,
    pub dos_scroll: bool,
    pub cga: bool,
    /// Starting entry in the unique palette table
    pub palette: u8,
    pub animate_tiles: bool,
    /// Calendar year, some screens depend on it
    pub year: i32,
}

impl Default for GameOptions {
    fn default() -> Self {
        Self {
            start_level: 0,
            show_map: true,
            castle: false,
            cheats: 0,
            start_pos: None,
            dos_scroll: false,
            cga: false,
            palette: 0,
            animate_tiles: true,
            year: vars::current_year(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Intro,
    NewRun,
    Menu,
    Motif,
    /// One level, preceded by the castle or map
    Level,
    /// Level and difficulty go back to zero
    EndRun,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    /// No menu picture, or the menu was quit
    None,
    Start,
    Code,
    Promo,
}

/// The game session: everything the screens share
pub struct Game<S: System, L: AssetLoader, M: MusicPlayer, P: Gameplay> {
    pub sys: S,
    assets: L,
    music: M,
    play: P,
    pub vars: Vars,
    pub video: Video,
    options: GameOptions,
    stage: Stage,
    /// The data is the DOS demo
    dos_demo: bool,
}

impl<S: System, L: AssetLoader, M: MusicPlayer, P: Gameplay> Game<S, L, M, P> {
    pub fn new(sys: S, assets: L, music: M, play: P, options: GameOptions) -> Self {
        let (w, h) = sys.screen_size();
        // only the demo ships the joystick screen
        let dos_demo = assets.load_file("JOYSTICK.SQZ").is_some();
        if dos_demo {
            info!("Demo data detected");
        }
        let mut vars = Vars {
            level_num: options.start_level,
            animate_tiles: options.animate_tiles,
            palette: options.palette % UNIQUE_PALETTES,
            ..Vars::default()
        };
        vars.random.reset();
        Self {
            sys,
            assets,
            music,
            play,
            vars,
            video: Video::new(w, h),
            options,
            stage: Stage::Intro,
            dos_demo,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn music(&self) -> &M {
        &self.music
    }

    pub fn is_demo(&self) -> bool {
        self.dos_demo
    }

    fn load(&self, name: &str) -> Option<Vec<u8>> {
        let data = self.assets.load_file(name);
        if data.is_none() {
            debug!("Skipping screen, no {name}");
        }
        data
    }

    /// Run stages until quit
    pub fn run(&mut self) {
        self.sys.state_mut().animate_tiles = self.options.animate_tiles;
        self.sys.start_audio(Box::new(silence));
        while self.stage != Stage::Quit {
            self.tick();
        }
        self.sys.stop_audio();
    }

    /// Run the current stage to completion and pick the next one
    pub fn tick(&mut self) -> Stage {
        let next = match self.stage {
            Stage::Intro => {
                self.do_programmed_in_1992_screen();
                if !self.sys.input().space && !self.sys.input().quit {
                    self.do_titus_screen();
                    self.music.play_music(INTRO_TRACK);
                    self.do_present_screen();
                }
                self.vars.random.e = 0x1234;
                self.vars.expert_flag = false;
                self.vars.starttime = self.sys.get_timestamp();
                Stage::NewRun
            }
            Stage::NewRun if self.sys.input().quit => Stage::Quit,
            Stage::NewRun => {
                self.vars.new_run();
                if self.dos_demo {
                    self.do_demo_screen();
                }
                Stage::Menu
            }
            Stage::Menu => match self.do_menu() {
                MenuChoice::Start | MenuChoice::None => self.after_menu(),
                MenuChoice::Code => {
                    self.do_code_screen();
                    if self.vars.level_num != 0 || self.vars.expert_flag {
                        self.after_menu()
                    } else {
                        Stage::Menu
                    }
                }
                MenuChoice::Promo => {
                    self.do_menu2();
                    Stage::Menu
                }
            },
            Stage::Motif => {
                self.do_motif_screen();
                Stage::Level
            }
            Stage::Level => self.play_level(),
            Stage::EndRun => {
                self.vars.level_num = 0;
                self.vars.expert_flag = false;
                if self.sys.input().quit {
                    Stage::Quit
                } else {
                    Stage::NewRun
                }
            }
            Stage::Quit => Stage::Quit,
        };
        if next != self.stage {
            debug!("Stage {:?} -> {next:?}", self.stage);
        }
        self.stage = next;
        next
    }

    fn after_menu(&self) -> Stage {
        if self.sys.input().quit {
            Stage::Quit
        } else if self.vars.level_num != 0 || self.vars.expert_flag {
            Stage::Level
        } else {
            Stage::Motif
        }
    }

    /// Levels repeat while each one moves `level_num` on
    fn play_level(&mut self) -> Stage {
        let (w, h) = self.sys.screen_size();
        self.sys.render_set_sprites_clipping_rect(0, 0, w, h - PANEL_H);
        let level_num = self.vars.level_num;
        if (8..10).contains(&level_num) && self.options.castle {
            self.do_castle_screen();
            return Stage::EndRun;
        }
        if level_num < 10 && self.options.show_map {
            self.do_map();
        }
        if self.sys.input().quit {
            return Stage::EndRun;
        }
        let outcome = self.play.do_level(
            &mut self.sys,
            &mut self.vars,
            &mut self.video,
            &self.options,
        );
        debug!("previous level {level_num} current {}", self.vars.level_num);
        match outcome {
            LevelOutcome::GameOver => {
                self.do_gameover_screen();
                Stage::EndRun
            }
            LevelOutcome::Finished => {
                self.do_theend_screen();
                Stage::EndRun
            }
            LevelOutcome::Quit => Stage::EndRun,
            LevelOutcome::Completed if !self.dos_demo && self.vars.level_num != level_num => {
                Stage::Level
            }
            LevelOutcome::Completed => Stage::EndRun,
        }
    }
}
