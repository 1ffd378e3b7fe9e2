use std::collections::VecDeque;

use assets::MemAssets;
use gamestate_traits::{ScaleFilter, ScreenRequest, System};
use input::config::InputConfig;
use input::{EventSource, Key, KeyMods, SysEvent, Translator};
use render_target::{HeadlessDisplay, ManualClock};
use sound_nosnd::{NoAudio, NoMusic};
use sound_traits::{AudioError, AudioFill, AudioServer};
use sys_core::Sys;

use crate::level::{Gameplay, LevelCards, LevelOutcome};
use crate::palettes::TEXT_BACKGROUND;
use crate::vars::{Vars, random_get_number3};
use crate::screens::map_marker_pos;
use crate::video::{MAP_H, MAP_W, Video};
use crate::{Game, GameOptions, MenuChoice, Stage};

/// Hands out at most one event per `process_events`
#[derive(Debug, Default)]
struct Drip {
    queue: VecDeque<SysEvent>,
    gap: bool,
}

impl Drip {
    fn push(&mut self, ev: SysEvent) {
        self.queue.push_back(ev);
    }

    /// Events nothing reacts to, to space out the ones that matter
    fn pad(&mut self, n: usize) {
        for _ in 0..n {
            self.push(key(Key::Other, false));
        }
    }
}

impl EventSource for Drip {
    fn poll_event(&mut self) -> Option<SysEvent> {
        if self.gap {
            self.gap = false;
            return None;
        }
        self.gap = true;
        self.queue.pop_front()
    }
}

type TestSys = Sys<HeadlessDisplay, Drip, NoAudio, ManualClock>;

/// Records the levels it was asked to play
#[derive(Debug, Default)]
struct Script {
    outcomes: VecDeque<LevelOutcome>,
    played: Vec<u8>,
}

impl Gameplay for Script {
    fn do_level(
        &mut self,
        _sys: &mut dyn System,
        vars: &mut Vars,
        _video: &mut Video,
        _options: &GameOptions,
    ) -> LevelOutcome {
        self.played.push(vars.level_num);
        let outcome = self.outcomes.pop_front().unwrap_or(LevelOutcome::Quit);
        if outcome == LevelOutcome::Completed {
            vars.level_num += 1;
        }
        outcome
    }
}

fn key(key: Key, down: bool) -> SysEvent {
    SysEvent::Key {
        key,
        down,
        mods: KeyMods::default(),
    }
}

fn sys() -> TestSys {
    sys_with(NoAudio::new(), false)
}

fn sys_with<A: AudioServer>(
    audio: A,
    enabled: bool,
) -> Sys<HeadlessDisplay, Drip, A, ManualClock> {
    let mut sys = Sys::new(
        HeadlessDisplay::default(),
        Drip::default(),
        audio,
        ManualClock::default(),
        Translator::new(InputConfig::default(), false),
        enabled,
    );
    sys.set_screen_size(&ScreenRequest {
        window_w: 320,
        window_h: 200,
        caption: "test".to_string(),
        scale: 1,
        filter: ScaleFilter::Nearest,
        fullscreen: false,
        hybrid_color: false,
    })
    .unwrap();
    sys
}

fn options() -> GameOptions {
    GameOptions {
        year: 1993,
        ..GameOptions::default()
    }
}

fn game<P: Gameplay>(
    assets: MemAssets,
    play: P,
    options: GameOptions,
) -> Game<TestSys, MemAssets, NoMusic, P> {
    Game::new(sys(), assets, NoMusic::default(), play, options)
}

fn picture() -> Vec<u8> {
    vec![1; 768 + 64000]
}

fn planar() -> Vec<u8> {
    vec![0x55; 32000]
}

#[test]
fn no_data_goes_straight_to_motif() {
    let mut g = game(MemAssets::new(), Script::default(), options());
    assert_eq!(g.tick(), Stage::NewRun);
    assert_eq!(g.vars.random.e, 0x1234);
    assert_eq!(g.vars.player_lifes, 0);
    assert_eq!(g.tick(), Stage::Menu);
    assert_eq!(g.vars.player_lifes, 2);
    assert_eq!(g.vars.player_club_power, 20);
    assert_eq!(g.tick(), Stage::Motif);
    assert_eq!(g.tick(), Stage::Level);
}

#[test]
fn intro_plays_music() {
    let mut assets = MemAssets::new();
    assets.insert("TITUS.SQZ", picture());
    let mut g = game(assets, Script::default(), options());
    g.tick();
    assert_eq!(g.music().played, vec![3]);
    assert!(g.sys.render().display().presented > 0);
}

#[test]
fn space_on_vanity_skips_intro() {
    let mut assets = MemAssets::new();
    assets.insert("TITUS.SQZ", picture());
    let opts = GameOptions {
        year: 2024,
        ..GameOptions::default()
    };
    let mut g = game(assets, Script::default(), opts);
    g.sys.events_mut().push(key(Key::Space, true));
    g.tick();
    assert!(g.music().played.is_empty());
    // cut short, well before the second is up
    assert!(g.sys.get_timestamp() < 1000);
}

#[test]
fn vanity_only_from_1996() {
    let mut g = game(MemAssets::new(), Script::default(), options());
    g.do_programmed_in_1992_screen();
    assert_eq!(g.sys.render().display().presented, 0);

    let opts = GameOptions {
        year: 1996,
        ..GameOptions::default()
    };
    let mut g = game(MemAssets::new(), Script::default(), opts);
    g.do_programmed_in_1992_screen();
    assert_eq!(g.sys.render().display().presented, 1);
    assert!(g.sys.get_timestamp() >= 1000);
}

#[test]
fn resize_redraws_vanity() {
    let opts = GameOptions {
        year: 2000,
        ..GameOptions::default()
    };
    let mut g = game(MemAssets::new(), Script::default(), opts);
    g.sys.events_mut().push(SysEvent::WindowResized(640, 400));
    g.do_programmed_in_1992_screen();
    assert_eq!((g.video.w, g.video.h), (640, 400));
    assert!(!g.sys.state().resize);
    assert_eq!(g.sys.render().display().presented, 2);
}

#[test]
fn text_screen_background() {
    let mut g = game(MemAssets::new(), Script::default(), options());
    g.do_credits();
    assert_eq!(g.video.vga[0], TEXT_BACKGROUND);
    assert!(g.video.vga.contains(&14));
}

#[test]
fn menu_times_out_to_promo() {
    let mut assets = MemAssets::new();
    assets.insert("MENU.SQZ", picture());
    let mut g = game(assets, Script::default(), options());
    assert_eq!(g.do_menu(), MenuChoice::Promo);
    assert!(g.sys.get_timestamp() >= 15000);
    assert!(!g.sys.state().centred);
}

#[test]
fn menu_keys() {
    let mut assets = MemAssets::new();
    assets.insert("MENU.SQZ", picture());
    let mut g = game(assets.clone(), Script::default(), options());
    g.sys.events_mut().push(key(Key::Num(2), true));
    assert_eq!(g.do_menu(), MenuChoice::Code);

    let mut g = game(assets, Script::default(), options());
    g.sys.events_mut().push(key(Key::Space, true));
    assert_eq!(g.do_menu(), MenuChoice::Start);
    assert!(!g.sys.input().space);
}

#[test]
fn demo_menu_has_no_timeout() {
    let mut assets = MemAssets::new();
    assets.insert("MENU.SQZ", picture());
    assets.insert("JOYSTICK.SQZ", planar());
    let mut g = game(assets, Script::default(), options());
    assert!(g.is_demo());
    // a wait of 300 takes about 150 events
    g.sys.events_mut().pad(12000);
    g.sys.events_mut().push(SysEvent::Quit);
    assert_eq!(g.do_menu(), MenuChoice::None);
    assert!(g.sys.get_timestamp() > 15000);
}

#[test]
fn code_screen_takes_level_code() {
    let mut assets = MemAssets::new();
    assets.insert("MOTIF.SQZ", planar());
    let mut g = game(assets, Script::default(), options());
    let code = format!("{:04x}", random_get_number3(13));
    for c in code.chars() {
        let k = match c.to_digit(10) {
            Some(n) => Key::Num(n as u8),
            None => Key::Char(c),
        };
        g.sys.events_mut().push(key(k, true));
        g.sys.events_mut().pad(4);
    }
    g.do_code_screen();
    assert_eq!(g.vars.level_num, 3);
    assert!(g.vars.expert_flag);
    assert!(!g.sys.input().raw);
    assert!(!g.sys.state().sine);
}

#[test]
fn code_screen_left_with_space() {
    let mut assets = MemAssets::new();
    assets.insert("MOTIF.SQZ", planar());
    assets.insert("MENU.SQZ", picture());
    let mut g = game(assets, Script::default(), options());
    g.sys.events_mut().push(key(Key::Num(2), true));
    // outlast the menu's wait so space lands on the code screen
    g.sys.events_mut().pad(200);
    g.sys.events_mut().push(key(Key::Space, true));
    g.tick();
    g.tick();
    // menu -> code entry -> back to the menu with nothing picked
    assert_eq!(g.tick(), Stage::Menu);
    assert_eq!(g.vars.level_num, 0);
}

#[test]
fn motif_toggles_expert() {
    let mut assets = MemAssets::new();
    assets.insert("MOTIF.SQZ", planar());
    let mut g = game(assets, Script::default(), options());
    g.sys.events_mut().push(key(Key::Right, true));
    g.sys.events_mut().pad(3);
    g.sys.events_mut().push(key(Key::Space, true));
    g.do_motif_screen();
    assert!(g.vars.expert_flag);
    assert_eq!(g.sys.input().direction, 0);
    assert!(!g.sys.state().sine);
}

#[test]
fn map_scrolls_fully_in() {
    let mut assets = MemAssets::new();
    assets.insert("MAP.SQZ", vec![0xFF; (MAP_W * MAP_H / 2) as usize]);
    let mut g = game(assets, Script::default(), options());
    g.vars.level_num = 7;
    g.do_map();
    assert_eq!(g.video.map.len(), (MAP_W * MAP_H) as usize);
    assert!(g.video.vga.iter().all(|&p| p == 15));
    // one frame per column plus the closing second
    assert!(g.sys.get_timestamp() >= MAP_W as u32 * 12 + 1000);
}

#[test]
fn map_space_stops_scroll() {
    let mut assets = MemAssets::new();
    assets.insert("MAP.SQZ", vec![0xFF; (MAP_W * MAP_H / 2) as usize]);
    let mut g = game(assets, Script::default(), options());
    g.sys.events_mut().push(key(Key::Space, true));
    g.do_map();
    // only the first column was drawn
    assert_eq!(g.video.vga[319], 15);
    assert_eq!(g.video.vga[318], 0);
}

#[test]
fn map_marker_follows_scroll() {
    assert_eq!(map_marker_pos(7, 320, 200, 640), (208, 146));
    assert_eq!(map_marker_pos(0, 320, 200, 1), (319, 53));
    assert_eq!(map_marker_pos(9, 640, 400, 640), (600, 148));
    // past the table the last level is used
    assert_eq!(map_marker_pos(12, 320, 200, 640), (280, 48));
}

#[test]
fn level_loop_follows_level_changes() {
    let script = Script {
        outcomes: [LevelOutcome::Completed, LevelOutcome::Completed, LevelOutcome::GameOver]
            .into_iter()
            .collect(),
        ..Script::default()
    };
    let opts = GameOptions {
        start_level: 1,
        show_map: false,
        ..options()
    };
    let mut g = game(MemAssets::new(), script, opts);
    assert_eq!(g.tick(), Stage::NewRun);
    assert_eq!(g.tick(), Stage::Menu);
    // a level is already picked, no motif
    assert_eq!(g.tick(), Stage::Level);
    assert_eq!(g.tick(), Stage::Level);
    assert_eq!(g.tick(), Stage::Level);
    assert_eq!(g.tick(), Stage::EndRun);
    assert_eq!(g.vars.level_num, 3);
    assert_eq!(g.play.played, vec![1, 2, 3]);
    assert_eq!(g.tick(), Stage::NewRun);
    assert_eq!(g.vars.level_num, 0);
    assert!(!g.vars.expert_flag);
}

#[test]
fn castle_replaces_levels_8_and_9() {
    let opts = GameOptions {
        start_level: 8,
        castle: true,
        ..options()
    };
    let mut g = game(MemAssets::new(), Script::default(), opts);
    g.tick();
    g.tick();
    assert_eq!(g.tick(), Stage::Level);
    assert_eq!(g.tick(), Stage::EndRun);
}

#[test]
fn quit_ends_the_session() {
    let mut g = game(MemAssets::new(), LevelCards, options());
    g.sys.events_mut().push(SysEvent::Quit);
    g.run();
    assert_eq!(g.stage(), Stage::Quit);
}

/// Counts device starts and stops, keeps what the fill wrote on start
#[derive(Default)]
struct AudioLog {
    starts: usize,
    stops: usize,
    first_fill: Vec<i16>,
}

impl AudioServer for AudioLog {
    fn start(&mut self, mut fill: AudioFill) -> Result<(), AudioError> {
        self.starts += 1;
        let mut buf = [7i16; 32];
        fill(&mut buf);
        self.first_fill = buf.to_vec();
        Ok(())
    }

    fn stop(&mut self) {
        self.stops += 1;
    }

    fn lock(&mut self) {}

    fn unlock(&mut self) {}

    fn pause(&mut self, _paused: bool) {}
}

#[test]
fn run_opens_and_closes_audio() {
    let mut sys = sys_with(AudioLog::default(), true);
    sys.events_mut().push(SysEvent::Quit);
    let mut g = Game::new(sys, MemAssets::new(), NoMusic::default(), LevelCards, options());
    g.run();
    assert_eq!(g.sys.audio().starts, 1);
    assert_eq!(g.sys.audio().stops, 1);
    assert_eq!(g.sys.audio().first_fill, vec![0; 32]);
}

#[test]
fn present_fades_to_target() {
    let mut assets = MemAssets::new();
    let mut data = vec![0u8; 0x1030 * 16 + 93 * 320];
    data[0x1030 * 16] = 9;
    assets.insert("PRESENT.SQZ", data);
    let mut g = game(assets, Script::default(), options());
    g.do_present_screen();
    // 0 to 63 is 31 steps of 2 and a snap, a wait of 100 each
    assert!(g.sys.get_timestamp() >= 3100);
}

#[test]
fn level_cards_space_completes() {
    let mut sys = sys();
    let mut vars = Vars::default();
    let mut video = Video::new(320, 200);
    sys.events_mut().pad(1);
    sys.events_mut().push(key(Key::Space, true));
    let out = LevelCards.do_level(&mut sys, &mut vars, &mut video, &options());
    assert_eq!(out, LevelOutcome::Completed);
    assert_eq!(vars.level_num, 1);
    assert!(sys.render().slide().is_none());
}

fn level_cards_top_row(message: Option<&str>) -> Vec<u8> {
    let mut sys = sys();
    let mut vars = Vars::default();
    let mut video = Video::new(320, 200);
    if let Some(msg) = message {
        sys.add_message(msg);
    }
    sys.events_mut().pad(1);
    sys.events_mut().push(key(Key::Space, true));
    LevelCards.do_level(&mut sys, &mut vars, &mut video, &options());
    video.vga[..320 * 8].to_vec()
}

#[test]
fn level_cards_show_messages() {
    assert!(!level_cards_top_row(None).contains(&15));
    assert!(level_cards_top_row(Some("Sound off")).contains(&15));
}

#[test]
fn level_cards_lose_lives() {
    let mut sys = sys();
    let mut vars = Vars {
        player_lifes: 2,
        ..Vars::default()
    };
    let mut video = Video::new(320, 200);
    sys.events_mut().pad(1);
    sys.events_mut().push(key(Key::Down, true));
    sys.events_mut().push(key(Key::Down, false));
    sys.events_mut().push(key(Key::Down, true));
    let out = LevelCards.do_level(&mut sys, &mut vars, &mut video, &options());
    assert_eq!(out, LevelOutcome::GameOver);
    assert_eq!(vars.player_lifes, 0);
}

#[test]
fn last_level_finishes() {
    let mut sys = sys();
    let mut vars = Vars {
        level_num: crate::level::LAST_LEVEL,
        ..Vars::default()
    };
    let mut video = Video::new(320, 200);
    sys.events_mut().pad(1);
    sys.events_mut().push(key(Key::Space, true));
    let out = LevelCards.do_level(&mut sys, &mut vars, &mut video, &options());
    assert_eq!(out, LevelOutcome::Finished);
}
