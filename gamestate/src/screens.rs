//! The screen routines. Each loads its own picture, draws, waits and fades
//! out. Screens that react to resizing redraw until a wait finishes without
//! the geometry changing under them.

use gamestate_traits::{AssetLoader, MusicPlayer, ORIG_H, ORIG_W, System, fade_palettes};
use log::{debug, warn};

use crate::code::{CodeEntry, print_codes};
use crate::level::Gameplay;
use crate::palettes::{
    CREDITS_PALETTE, GAMEOVER_PALETTE, JOYSTICK_PALETTE, MAP_PALETTE, MOTIF_PALETTE,
    PRESENT_PALETTE, TEXT_BACKGROUND, UNIQUE_PALETTES_TBL, cycle,
};
use crate::vars::{update_input, wait_input};
use crate::video::{MAP_MARKER_SPR, MAP_W};
use crate::{Game, MenuChoice};

/// A 256 colour palette ahead of the pixels
const PAL_SIZE: usize = 256 * 3;
/// PRESENT.SQZ of the demo, the full game's is larger
const DEMO_PRESENT_SIZE: usize = 65536 + PAL_SIZE;
/// The full game's presentation picture starts this far in
const PRESENT_IMG_OFFSET: usize = 0x1030 * 16;
const PRESENT_IMG_ROWS: usize = 93;
/// MENU2.SQZ keeps its palette after the planar picture
const MENU2_PAL_OFFSET: usize = 32000;
const MENU_TIMEOUT: u32 = 15 * 1000;

/// Marker position on the map for levels 0 to 9
const MAP_SPR_Y: [i32; 10] = [53, 63, 95, 115, 106, 81, 74, 146, 76, 48];
const MAP_SPR_X: [i32; 10] = [0, 80, 120, 152, 232, 328, 424, 528, 600, 600];

/// Marker on screen for `level` once the map has scrolled `x` pixels in
pub(crate) fn map_marker_pos(level: u8, w: i32, h: i32, x: i32) -> (i32, i32) {
    let level = (level as usize).min(MAP_SPR_X.len() - 1);
    let y_offs = (h - ORIG_H) / 2;
    (w - x + MAP_SPR_X[level], MAP_SPR_Y[level] + y_offs)
}

#[inline]
fn image(data: &[u8]) -> &[u8] {
    data.get(PAL_SIZE..).unwrap_or(&[])
}

impl<S: System, L: AssetLoader, M: MusicPlayer, P: Gameplay> Game<S, L, M, P> {
    fn wait(&mut self, ms: u32) {
        wait_input(&mut self.sys, ms);
    }

    fn wait_while_paused(&mut self, ms: u32) {
        loop {
            self.wait(ms);
            if !self.sys.state().paused || self.sys.input().quit {
                break;
            }
        }
    }

    /// Run `draw` again whenever the screen was resized during it
    fn retry_on_resize(&mut self, mut draw: impl FnMut(&mut Self)) {
        loop {
            draw(self);
            if !self.sys.state().resize || self.sys.input().quit {
                break;
            }
            debug!("Screen resized, drawing again");
        }
    }

    fn set_text_palette(&mut self) {
        self.sys.set_screen_palette(&CREDITS_PALETTE, 0, 16, 6);
        self.sys
            .set_palette_color(TEXT_BACKGROUND as usize, [0, 0, 0]);
    }

    fn cycle_palette(&mut self) {
        if !self.sys.state().cycle_palette {
            return;
        }
        self.vars.palette = cycle(self.vars.palette, self.sys.state().palette_offset);
        if let Some(p) = UNIQUE_PALETTES_TBL.get(self.vars.palette as usize) {
            self.sys.set_screen_palette(p, 0, 16, 6);
        }
        self.sys.state_mut().cycle_palette = false;
    }

    /// Show a 320x200 picture, centred when the screen is larger
    fn update_screen_img(&mut self, src: &[u8], present: bool) {
        let size = self.video.size();
        let orig = (ORIG_W * ORIG_H) as usize;
        if size < orig {
            return;
        }
        if size == orig {
            self.sys.update_screen(src, present);
            return;
        }
        if !self.sys.state().resize {
            self.video.clear();
        } else {
            self.video.resize(&mut self.sys);
        }
        self.video.copy_centred(src, ORIG_W, ORIG_H);
        self.sys.update_screen(&self.video.vga, present);
    }

    /// Redraw a 320x200 picture with the current message over it
    fn update_screen_img_message(&mut self, src: &[u8]) {
        self.video.clear();
        self.video.copy_centred(src, ORIG_W, ORIG_H);
        self.video.draw_message(&self.sys);
        self.sys.update_screen(&self.video.vga, true);
    }

    fn update_screen_background(&mut self, present: bool) {
        let bg = std::mem::take(&mut self.video.background);
        self.update_screen_img(&bg, present);
        self.video.background = bg;
    }

    fn copy_background_centred(&mut self) {
        let bg = std::mem::take(&mut self.video.background);
        self.video.copy_centred(&bg, ORIG_W, ORIG_H);
        self.video.background = bg;
    }

    pub fn do_programmed_in_1992_screen(&mut self) {
        let year = self.options.year;
        if year < 1996 {
            return;
        }
        self.set_text_palette();
        self.retry_on_resize(|g| {
            g.video.resize(&mut g.sys);
            g.video.clear_to(TEXT_BACKGROUND);
            let mut offset = 0x960;
            g.video.draw_string(offset, 5, "YEAAA > > >");
            offset += 0x1E0;
            let line = format!("MY GAME IS STILL WORKING IN {year:04} <<");
            g.video.draw_string(offset, 0, &line);
            offset = 0x1680;
            g.video
                .draw_string(offset, 1, "PROGRAMMED IN 1992 ON AT >286 12MHZ>");
            offset += 0x1E0;
            g.video.draw_string(offset, 3, "> > > ENJOY OLDIES<<");
            g.sys.update_screen(&g.video.vga, true);
            g.wait(1000);
        });
        self.video.clear();
    }

    pub fn do_credits(&mut self) {
        self.retry_on_resize(|g| {
            g.video.resize(&mut g.sys);
            g.set_text_palette();
            g.video.clear_to(TEXT_BACKGROUND);
            let mut offset = 0x140;
            g.video
                .draw_string(offset, 1, "CODER> DESIGNER AND ARTIST DIRECTOR>");
            offset += 0x230;
            g.video.draw_string(offset, 14, "ERIC ZMIRO");
            offset += 0x460;
            g.video
                .draw_string(offset, 4, ">MAIN GRAPHICS AND BACKGROUND>");
            offset += 0x230;
            g.video.draw_string(offset, 11, "FRANCIS FOURNIER");
            offset += 0x460;
            g.video.draw_string(offset, 9, ">MONSTERS AND HEROS>");
            offset += 0x230;
            g.video.draw_string(offset, 11, "LYES  BELAIDOUNI");
            offset = 0x1770;
            g.video.draw_string(offset, 15, "THANKS TO");
            offset = 0x1A40;
            g.video
                .draw_string(offset, 2, "CRISTELLE> GIL ESPECHE AND CORINNE>");
            offset += 0x1E0;
            g.video
                .draw_string(offset, 0, "SEBASTIEN BECHET AND OLIVIER AKA DELTA>");
            g.sys.update_screen(&g.video.vga, true);
            g.wait(1000);
        });
    }

    pub fn do_titus_screen(&mut self) {
        let Some(data) = self.load("TITUS.SQZ") else {
            return;
        };
        self.sys.set_screen_palette(&data, 0, 256, 6);
        self.retry_on_resize(|g| {
            g.video.resize(&mut g.sys);
            g.update_screen_img(image(&data), false);
            g.sys.fade_in_palette();
            g.wait(700);
            g.sys.fade_out_palette();
        });
    }

    pub fn do_motif_screen(&mut self) {
        let data = self.load("MOTIF.SQZ");
        self.sys.state_mut().sine = true;
        if let Some(data) = data {
            self.sys.set_screen_palette(&MOTIF_PALETTE, 0, 16, 6);
            self.video.load_sprites(&mut self.sys);
            loop {
                self.video.resize(&mut self.sys);
                self.video.copy_img(&data);
                self.copy_background_centred();
                self.video.draw_message(&self.sys);
                self.cycle_palette();
                self.sys.update_screen(&self.video.vga, false);
                self.video
                    .draw_motif_string(&mut self.sys, "MODE", 0, 0, 1);
                let mode = if self.vars.expert_flag {
                    "EXPERT"
                } else {
                    "BEGINNER"
                };
                self.video.draw_motif_string(&mut self.sys, mode, 0, 32, 2);
                self.sys.update_screen_cached(&self.video.vga, true, true);
                self.wait(1);
                if self.sys.input().direction != 0 {
                    self.vars.expert_flag = !self.vars.expert_flag;
                    self.sys.input_mut().direction = 0;
                }
                while self.sys.state().paused && !self.sys.input().quit {
                    self.wait(100);
                }
                if self.sys.input().space || self.sys.input().quit {
                    break;
                }
                self.sys.render_clear_sprites();
            }
            self.sys.render_clear_sprites();
            self.vars.input.key_space = 0;
            self.sys.fade_out_palette();
        }
        self.sys.state_mut().sine = false;
    }

    pub fn do_code_screen(&mut self) {
        let data = self.load("MOTIF.SQZ");
        self.sys.state_mut().sine = true;
        if let Some(data) = data {
            let mut code = CodeEntry::default();
            self.sys.input_mut().raw = true;
            self.sys.set_screen_palette(&MOTIF_PALETTE, 0, 16, 6);
            self.video.load_sprites(&mut self.sys);
            loop {
                self.video.resize(&mut self.sys);
                self.video.copy_img(&data);
                self.copy_background_centred();
                self.video.draw_message(&self.sys);
                self.cycle_palette();
                self.sys.update_screen(&self.video.vga, false);
                self.video
                    .draw_motif_string(&mut self.sys, "ENTER CODE", 0, -10, 2);
                let digits = format!("{:04X}", code.buf);
                self.video
                    .draw_motif_string(&mut self.sys, &digits, 0, 40, 1);
                self.sys.update_screen_cached(&self.video.vga, true, true);
                if self.sys.input().space || code.parse(&mut self.vars) {
                    break;
                }
                self.wait_while_paused(5);
                code.update(&mut self.sys);
                self.sys.render_clear_sprites();
                if self.sys.input().quit {
                    break;
                }
            }
            self.sys.render_clear_sprites();
            self.vars.input.key_space = 0;
            self.sys.input_mut().raw = false;
            self.sys.fade_out_palette();
            print_codes();
        }
        self.sys.state_mut().sine = false;
    }

    pub fn do_present_screen(&mut self) {
        let Some(mut data) = self.load("PRESENT.SQZ") else {
            return;
        };
        if data.len() == DEMO_PRESENT_SIZE {
            self.sys.set_screen_palette(&data, 0, 256, 6);
            self.update_screen_img(image(&data), false);
            self.sys.fade_in_palette();
        } else {
            let rows = PRESENT_IMG_ROWS * ORIG_W as usize;
            if data.len() >= PRESENT_IMG_OFFSET + rows {
                data.copy_within(PRESENT_IMG_OFFSET..PRESENT_IMG_OFFSET + rows, PAL_SIZE);
            } else {
                warn!("PRESENT.SQZ too short: {} bytes", data.len());
            }
            self.sys.set_screen_palette(&data, 0, 256, 6);
            self.update_screen_img(image(&data), false);
            self.sys.fade_in_palette();
            let mut palette = [0u8; PAL_SIZE];
            if let Some(src) = data.get(..PAL_SIZE) {
                palette.copy_from_slice(src);
            }
            while fade_palettes(&PRESENT_PALETTE, &mut palette) && !self.sys.input().quit {
                self.sys.set_screen_palette(&palette, 0, 256, 6);
                self.update_screen_img(image(&data), true);
                self.wait(100);
            }
        }
        self.sys.fade_out_palette();
    }

    /// Joystick instructions, demo data only
    pub fn do_demo_screen(&mut self) {
        let Some(data) = self.load("JOYSTICK.SQZ") else {
            return;
        };
        self.retry_on_resize(|g| {
            g.video.resize(&mut g.sys);
            g.video.copy_img(&data);
            g.sys.set_screen_palette(&JOYSTICK_PALETTE, 0, 16, 6);
            g.update_screen_background(false);
            g.sys.fade_in_palette();
            g.wait(10000);
        });
    }

    pub fn do_castle_screen(&mut self) {
        let Some(data) = self.load("CASTLE.SQZ") else {
            return;
        };
        self.retry_on_resize(|g| {
            g.video.resize(&mut g.sys);
            g.sys.set_screen_palette(&data, 0, 256, 6);
            g.update_screen_img(image(&data), true);
            g.sys.fade_in_palette();
            g.wait(10000);
        });
    }

    /// Scroll the world map in from the right, the marker shows where the
    /// level is
    pub fn do_map(&mut self) {
        let Some(data) = self.load("MAP.SQZ") else {
            return;
        };
        self.video.copy_map(&data);
        self.video.clear();
        self.sys.set_screen_palette(&MAP_PALETTE, 0, 16, 6);
        self.video.load_sprites(&mut self.sys);
        let (w, _) = self.sys.screen_size();
        let last = MAP_W + if w < MAP_W { 0 } else { (w - MAP_W) / 2 };
        for x in 1..=last {
            self.cycle_palette();
            self.video.resize(&mut self.sys);
            let (w, h) = (self.video.w, self.video.h);
            self.sys.render_set_sprites_clipping_rect(0, 0, w, h);
            self.sys.render_clear_sprites();
            let (mx, my) = map_marker_pos(self.vars.level_num, w, h, x);
            self.video
                .draw_sprite(&mut self.sys, MAP_MARKER_SPR, mx, my, false);
            self.video.draw_map_window(x);
            self.video.draw_message(&self.sys);
            self.sys.update_screen(&self.video.vga, true);
            self.wait(1);
            if self.sys.input().quit || self.sys.input().space {
                break;
            }
            self.wait_while_paused(10);
        }
        self.sys.sleep(1000);
        self.sys.fade_out_palette();
    }

    pub fn do_gameover_screen(&mut self) {
        let Some(data) = self.load("GAMEOVER.SQZ") else {
            return;
        };
        self.video.clear();
        self.video.copy_img(&data);
        let bg = std::mem::take(&mut self.video.background);
        self.video.copy(&bg, ORIG_W, ORIG_H);
        self.video.background = bg;
        self.sys.set_screen_palette(&GAMEOVER_PALETTE, 0, 16, 6);
        self.play
            .do_gameover_animation(&mut self.sys, &mut self.video);
        self.video.clear();
        self.copy_background_centred();
        self.sys.update_screen(&self.video.vga, false);
        self.sys.fade_out_palette();
    }

    /// The promo screen
    pub fn do_menu2(&mut self) {
        let Some(data) = self.load("MENU2.SQZ") else {
            return;
        };
        self.video.copy_img(&data);
        self.copy_background_centred();
        let palette = data.get(MENU2_PAL_OFFSET..).unwrap_or(&[]);
        self.sys.set_screen_palette(palette, 0, 16, 6);
        self.sys.update_screen(&self.video.vga, false);
        self.sys.fade_in_palette();
        self.play.do_demo_animation(&mut self.sys, &mut self.video);
        self.sys.fade_out_palette();
    }

    pub fn do_menu(&mut self) -> MenuChoice {
        let Some(data) = self.load("MENU.SQZ") else {
            return MenuChoice::None;
        };
        let mut choice = MenuChoice::None;
        self.sys.set_screen_palette(&data, 0, 256, 6);
        self.retry_on_resize(|g| {
            g.video.resize(&mut g.sys);
            g.sys.state_mut().centred = true;
            g.update_screen_img(image(&data), false);
            g.sys.fade_in_palette();
            g.vars.input.keystate = Default::default();
            let start = g.sys.get_timestamp();
            let mut shown = false;
            while !g.sys.input().quit {
                g.wait(300);
                update_input(&mut g.sys, &mut g.vars);
                // redraw once more when a message retires to wipe it
                let message = g.sys.get_message().is_some();
                if message || shown {
                    g.update_screen_img_message(image(&data));
                }
                shown = message;
                if g.vars.input.keystate[2] || g.sys.input().space {
                    g.sys.input_mut().space = false;
                    g.sys.fade_out_palette();
                    choice = MenuChoice::Start;
                    break;
                }
                if g.vars.input.keystate[3] {
                    g.sys.fade_out_palette();
                    choice = MenuChoice::Code;
                    break;
                }
                if g.sys.state().resize {
                    break;
                }
                if !g.dos_demo && g.sys.get_timestamp().wrapping_sub(start) >= MENU_TIMEOUT {
                    g.sys.fade_out_palette();
                    choice = MenuChoice::Promo;
                    break;
                }
            }
        });
        self.sys.state_mut().centred = false;
        choice
    }

    pub fn do_photos_screen(&mut self) {
        self.do_credits();
        self.wait(600);
    }

    pub fn do_theend_screen(&mut self) {
        if let Some(data) = self.load("THEEND.SQZ") {
            self.retry_on_resize(|g| {
                g.video.resize(&mut g.sys);
                g.sys.set_screen_palette(&data, 0, 256, 6);
                g.update_screen_img(image(&data), false);
                g.sys.fade_in_palette();
                g.wait(10000);
            });
        }
        if self.options.year < 1994 {
            return;
        }
        self.do_photos_screen();
    }
}
