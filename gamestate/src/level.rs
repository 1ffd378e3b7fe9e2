//! What runs between the map and the next level. The sequencer only needs
//! to know how a level ended, the `Gameplay` trait is that seam.

use gamestate_traits::{
    INPUT_DIRECTION_DOWN, ORIG_H, ORIG_W, Rect, SlideKind, SlideRequest, System, TransitionKind,
};
use log::{debug, info};

use crate::GameOptions;
use crate::palettes::{CREDITS_PALETTE, TEXT_BACKGROUND};
use crate::vars::{Vars, update_input, wait_input};
use crate::video::Video;

/// Height of the status panel under the playfield
pub const PANEL_H: i32 = 40;
/// Completing this level finishes the game
pub const LAST_LEVEL: u8 = 9;

pub const CHEATS_UNLIMITED_LIFES: u16 = 1 << 1;

const FRAME_MS: u32 = 20;

const CGA_PALETTE: [u8; 48] = [
    0, 0, 0, 0, 42, 42, 42, 0, 42, 42, 42, 42, 0, 0, 0, 0, 42, 42, 42, 0, 42, 42, 42, 42, 0, 0, 0,
    0, 63, 63, 63, 0, 63, 63, 63, 63, 0, 0, 0, 0, 63, 63, 63, 0, 63, 63, 63, 63,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelOutcome {
    /// `level_num` now holds the next level
    Completed,
    GameOver,
    /// The last level is done
    Finished,
    Quit,
}

pub trait Gameplay {
    /// Play `vars.level_num`
    fn do_level(
        &mut self,
        sys: &mut dyn System,
        vars: &mut Vars,
        video: &mut Video,
        options: &GameOptions,
    ) -> LevelOutcome;

    /// Runs over the game over picture
    fn do_gameover_animation(&mut self, _sys: &mut dyn System, _video: &mut Video) {}

    /// Runs over the promo picture
    fn do_demo_animation(&mut self, _sys: &mut dyn System, _video: &mut Video) {}
}

/// A title card per level with the status panel sliding in under it.
/// Action completes the level, down costs a life.
#[derive(Debug, Default)]
pub struct LevelCards;

impl LevelCards {
    fn draw(&self, video: &mut Video, vars: &Vars) {
        video.clear_to(TEXT_BACKGROUND);
        video.draw_string(0x960, 14, &format!("LEVEL {}", vars.level_num + 1));
        let mode = if vars.expert_flag { "EXPERT" } else { "BEGINNER" };
        video.draw_string(0x960 + 0x1E0, 11, mode);
        video.draw_string(0x1680, 15, &format!("LIVES {}", vars.player_lifes));

        let panel = ((video.h - PANEL_H) * video.w) as usize;
        if let Some(rows) = video.vga.get_mut(panel..) {
            rows.fill(1);
        }
    }
}

impl Gameplay for LevelCards {
    fn do_level(
        &mut self,
        sys: &mut dyn System,
        vars: &mut Vars,
        video: &mut Video,
        options: &GameOptions,
    ) -> LevelOutcome {
        info!("Level {} expert {}", vars.level_num, vars.expert_flag);
        if let Some((x, y)) = options.start_pos {
            debug!("Start position {x}x{y}");
        }
        let palette = if options.cga {
            &CGA_PALETTE
        } else {
            &CREDITS_PALETTE
        };
        sys.render_clear_sprites();
        sys.set_screen_palette(palette, 0, 16, 6);
        sys.set_palette_color(TEXT_BACKGROUND as usize, [0, 0, 0]);
        sys.begin_slide(SlideRequest {
            kind: SlideKind::Bottom,
            panel_y: 0,
            panel_h: PANEL_H,
            end: 0,
        });

        // held keys from the previous screen do not count
        update_input(sys, vars);
        let mut space = vars.input.key_space;
        let mut down = vars.input.key_down;
        let outcome = loop {
            video.resize(sys);
            self.draw(video, vars);
            video.draw_message(&*sys);
            sys.update_screen(&video.vga, true);
            sys.sleep(FRAME_MS);
            update_input(sys, vars);
            if sys.input().quit {
                break LevelOutcome::Quit;
            }
            while sys.state().paused && !sys.input().quit {
                wait_input(sys, 100);
            }
            let pressed = |now: u8, before: u8| now != 0 && before == 0;
            if pressed(vars.input.key_space, space) {
                if vars.level_num >= LAST_LEVEL {
                    break LevelOutcome::Finished;
                }
                vars.level_num += 1;
                break LevelOutcome::Completed;
            }
            if pressed(vars.input.key_down, down) {
                sys.input_mut().direction &= !INPUT_DIRECTION_DOWN;
                if options.cheats & CHEATS_UNLIMITED_LIFES == 0 {
                    vars.player_lifes = vars.player_lifes.saturating_sub(1);
                }
                if vars.player_lifes == 0 {
                    break LevelOutcome::GameOver;
                }
            }
            space = vars.input.key_space;
            down = vars.input.key_down;
        };
        sys.clear_slide();
        sys.fade_out_palette();
        outcome
    }

    fn do_gameover_animation(&mut self, sys: &mut dyn System, video: &mut Video) {
        sys.update_screen(&video.vga, false);
        sys.fade_in_palette();
        for i in 0..16 {
            let dx = if i % 2 == 0 { 2 } else { -2 };
            sys.shake_screen(dx, 0);
            sys.update_screen_cached(&video.vga, true, true);
            wait_input(sys, 50);
            if sys.input().quit {
                break;
            }
        }
        sys.shake_screen(0, 0);
    }

    fn do_demo_animation(&mut self, sys: &mut dyn System, _video: &mut Video) {
        let area = Rect::new(0, 0, ORIG_W, ORIG_H);
        sys.transition_screen(area, TransitionKind::Square, true);
        wait_input(sys, 5000);
    }
}
