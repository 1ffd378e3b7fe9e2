use crate::palette::native;
use crate::*;

const WHITE: u32 = 0xFFFF_FFFF;

fn target(w: i32, h: i32, scale: i32) -> RenderTarget<HeadlessDisplay> {
    let mut rt = RenderTarget::new(HeadlessDisplay::default());
    rt.set_screen_size(&ScreenRequest {
        window_w: w,
        window_h: h,
        caption: "test".to_string(),
        scale,
        filter: ScaleFilter::Nearest,
        fullscreen: false,
        hybrid_color: false,
    })
    .unwrap();
    rt
}

fn screen(rt: &RenderTarget<HeadlessDisplay>, index: u8) -> Vec<u8> {
    let g = rt.geometry();
    vec![index; (g.w * g.h) as usize]
}

/// Two colours: 1 is red, 2 is white
fn load_sheet(rt: &mut RenderTarget<HeadlessDisplay>, update_pal: bool) {
    let mut pal = [0u8; 9];
    pal[3] = 63;
    pal[6..9].copy_from_slice(&[63, 63, 63]);
    rt.set_palette(&pal, 0, 3, 6).unwrap();
    rt.load_sprites(
        SpriteKind::Game,
        &[Rect::new(0, 0, 2, 1), Rect::new(0, 0, 0, 0)],
        IndexedImage {
            width: 2,
            height: 1,
            pixels: vec![1, 2],
            color_key: 0,
        },
        update_pal,
    )
    .unwrap();
}

fn sprite(frame: usize, xflip: bool) -> SpriteCmd {
    SpriteCmd {
        kind: SpriteKind::Game,
        frame,
        x: 0,
        y: 0,
        xflip,
        centred: false,
    }
}

#[test]
fn refused_scale_keeps_geometry() {
    let mut rt = target(640, 400, 2);
    let before = rt.geometry().clone();
    let presented = rt.display().mode.clone();
    let out = rt
        .set_screen_size(&ScreenRequest {
            window_w: 640,
            window_h: 400,
            caption: "test".to_string(),
            scale: 3,
            filter: ScaleFilter::Nearest,
            fullscreen: false,
            hybrid_color: false,
        })
        .unwrap();
    assert_eq!(out, ScaleOutcome::Refused { requested: 3 });
    assert_eq!(rt.geometry(), &before);
    assert_eq!(rt.display().mode, presented);

    assert_eq!(rt.rescale(1).unwrap(), Some(ScaleOutcome::Refused { requested: 3 }));
    assert_eq!(rt.geometry().scale, 2);
}

#[test]
fn scale_down_stops_at_one() {
    let mut rt = target(640, 400, 2);
    assert_eq!(rt.rescale(-1).unwrap(), Some(ScaleOutcome::Applied));
    assert_eq!((rt.geometry().w, rt.geometry().scale), (640, 1));
    assert_eq!(rt.rescale(-1).unwrap(), None);
}

#[test]
fn toggle_scale_and_restore() {
    let mut rt = target(640, 400, 2);
    rt.toggle_scale().unwrap();
    assert_eq!(rt.geometry().scale, 1);
    assert_eq!(rt.geometry().window_w, 320);
    rt.toggle_scale().unwrap();
    assert_eq!(rt.geometry().scale, 2);

    rt.window_resized(1000, 800).unwrap();
    rt.toggle_size_lock();
    rt.restore_original().unwrap();
    assert!(!rt.geometry().size_lock);
    assert_eq!((rt.geometry().window_w, rt.geometry().window_h), (640, 400));
}

#[test]
fn fullscreen_without_desktop_size() {
    let mut rt = target(320, 200, 1);
    rt.toggle_fullscreen().unwrap();
    assert!(rt.geometry().fullscreen);
    assert_eq!(rt.geometry().window_w, FULLSCREEN_W);
    assert_eq!(rt.geometry().w, 640);
    rt.toggle_fullscreen().unwrap();
    assert_eq!((rt.geometry().w, rt.geometry().h), (320, 200));
}

#[test]
fn locked_window_resize_ignored() {
    let mut rt = target(320, 200, 1);
    rt.toggle_size_lock();
    assert_eq!(rt.window_resized(800, 600).unwrap(), None);
    assert_eq!(rt.geometry().window_w, 320);
}

#[test]
fn frame_is_scaled_and_converted() {
    let mut rt = target(640, 400, 2);
    load_sheet(&mut rt, false);
    let buf = screen(&rt, 2);
    rt.update_screen(&buf, true, PresentFlags::default()).unwrap();
    let frame = &rt.display().last_frame;
    assert_eq!((frame.width(), frame.height()), (640, 400));
    assert!(frame.pixels().iter().all(|p| *p == WHITE));
}

#[test]
fn copper_bars_replace_key_near_top() {
    let mut rt = target(320, 200, 1);
    let mut data = vec![0x180 + 2 * 5];
    data.extend([0x0F00; 17]);
    rt.set_copper_bars(Some(&data));
    let buf = screen(&rt, 5);
    rt.update_screen(&buf, true, PresentFlags::default()).unwrap();
    let frame = &rt.display().last_frame;
    assert_eq!(frame.pixel(10, 0), Some(0xFFFF_0000));
    assert_eq!(frame.pixel(10, 159), Some(0xFFFF_0000));
    assert_eq!(frame.pixel(10, 160), Some(rt.palette().native(5)));

    rt.set_copper_bars(None);
    rt.update_screen(&buf, true, PresentFlags::default()).unwrap();
    assert_eq!(rt.display().last_frame.pixel(10, 0), Some(rt.palette().native(5)));
}

#[test]
fn cached_redraw_skips_conversion() {
    let mut rt = target(320, 200, 1);
    load_sheet(&mut rt, false);
    rt.update_screen(&screen(&rt, 2), true, PresentFlags::default()).unwrap();
    rt.update_screen_cached(&screen(&rt, 1), true, true, PresentFlags::default())
        .unwrap();
    assert_eq!(rt.display().last_frame.pixel(0, 0), Some(WHITE));
}

#[test]
fn flipped_sprite_cached_once() {
    let mut rt = target(320, 200, 1);
    load_sheet(&mut rt, true);
    let buf = screen(&rt, 0);
    rt.add_sprite(sprite(0, true));
    rt.update_screen(&buf, true, PresentFlags::default()).unwrap();
    let first = rt.display().last_frame.clone();
    rt.update_screen(&buf, true, PresentFlags::default()).unwrap();
    assert_eq!(rt.flip_cache().misses(), 1);
    assert_eq!(rt.display().last_frame, first);
    // mirrored: white first, then red
    assert_eq!(first.pixel(0, 0), Some(WHITE));
    assert_eq!(first.pixel(1, 0), Some(native([255, 0, 0])));

    // a palette swap drops the mirror
    let pal = [0u8; 9];
    rt.set_palette(&pal, 0, 3, 6).unwrap();
    assert!(rt.flip_cache().is_empty());
    // single colour updates do not
    rt.update_screen(&buf, true, PresentFlags::default()).unwrap();
    rt.set_palette_color(2, [63, 0, 0]);
    assert_eq!(rt.flip_cache().len(), 1);
}

#[test]
fn zero_sized_and_out_of_range_frames_skipped() {
    let mut rt = target(320, 200, 1);
    load_sheet(&mut rt, false);
    rt.add_sprite(sprite(1, true));
    rt.add_sprite(sprite(9, false));
    rt.update_screen(&screen(&rt, 0), true, PresentFlags::default())
        .unwrap();
    assert!(rt.flip_cache().is_empty());
    assert_eq!(rt.display().last_frame.pixel(0, 0), Some(BLACK));
}

#[test]
fn paused_draws_only_banner() {
    let mut rt = target(320, 200, 1);
    load_sheet(&mut rt, false);
    rt.add_sprite(sprite(0, false));
    let flags = PresentFlags {
        paused: true,
        ..Default::default()
    };
    rt.update_screen(&screen(&rt, 0), true, flags).unwrap();
    assert_eq!(rt.display().last_frame.pixel(0, 0), Some(BLACK));
}

#[test]
fn sprite_list_is_bounded() {
    let mut rt = target(320, 200, 1);
    for _ in 0..MAX_SPRITES + 10 {
        rt.add_sprite(sprite(0, false));
    }
    assert_eq!(rt.sprites().len(), MAX_SPRITES);
    rt.clear_sprites();
    assert!(rt.sprites().is_empty());
}

#[test]
fn sprites_clip_rect() {
    let mut rt = target(320, 200, 1);
    load_sheet(&mut rt, false);
    rt.set_sprites_clip(1, 0, 10, 10);
    rt.add_sprite(sprite(0, false));
    rt.update_screen(&screen(&rt, 0), true, PresentFlags::default())
        .unwrap();
    let frame = &rt.display().last_frame;
    assert_eq!(frame.pixel(0, 0), Some(BLACK));
    assert_eq!(frame.pixel(1, 0), Some(WHITE));
}

#[test]
fn fade_presents_every_step() {
    let mut rt = target(320, 200, 1);
    load_sheet(&mut rt, false);
    rt.add_sprite(sprite(0, false));
    let mut clock = ManualClock::default();
    let before = rt.display().presented;
    rt.fade(true, &mut clock, PresentFlags::default()).unwrap();
    assert_eq!(rt.display().presented - before, FADE_STEPS as usize + 1);
    assert_eq!(clock.now, (FADE_STEPS as u32 + 1) * TRANSITION_DELAY);
    assert!(rt.sprites().is_empty());
    // faded in, the last step is the plain picture
    assert_eq!(rt.display().last_frame.pixel(1, 0), Some(WHITE));
}

#[test]
fn transition_presents_and_waits() {
    let mut rt = target(320, 200, 1);
    let mut clock = ManualClock::default();
    rt.transition(Rect::new(0, 0, 320, 200), TransitionKind::Curtain, false, &mut clock)
        .unwrap();
    assert!(rt.display().presented > 1);
    assert_eq!(clock.now, rt.display().presented as u32 * TRANSITION_DELAY);
}

#[test]
fn slide_survives_resize() {
    let mut rt = target(320, 240, 1);
    rt.begin_slide(SlideRequest {
        kind: SlideKind::Bottom,
        panel_y: 0,
        panel_h: 40,
        end: 0,
    });
    let buf = screen(&rt, 0);
    for _ in 0..10 {
        rt.update_screen(&buf, true, PresentFlags::default()).unwrap();
    }
    let slide = rt.slide().unwrap();
    assert_eq!(slide.last_pos, 10);
    assert_eq!(slide.end, 20);

    rt.window_resized(640, 480).unwrap();
    let slide = rt.slide().unwrap();
    assert_eq!(slide.last_pos, 10);
    assert_eq!(slide.end, 140);
    assert_eq!(slide.reveal.y, 470);

    rt.clear_slide();
    assert!(rt.slide().is_none());
}

#[test]
fn slide_holds_end_after_shrink() {
    let mut rt = target(640, 480, 1);
    rt.begin_slide(SlideRequest {
        kind: SlideKind::Bottom,
        panel_y: 0,
        panel_h: 40,
        end: 0,
    });
    let buf = screen(&rt, 0);
    for _ in 0..400 {
        rt.update_screen(&buf, true, PresentFlags::default()).unwrap();
    }
    let slide = rt.slide().unwrap();
    assert!(slide.finished());
    assert_eq!((slide.reveal.y, slide.end, slide.last_pos), (140, 140, 340));

    rt.window_resized(320, 240).unwrap();
    let buf = screen(&rt, 0);
    for _ in 0..100 {
        rt.update_screen(&buf, true, PresentFlags::default()).unwrap();
    }
    let slide = rt.slide().unwrap();
    assert!(slide.finished());
    assert_eq!((slide.reveal.y, slide.end, slide.last_pos), (20, 20, 340));
}

#[test]
fn finished_slide_stays_finished_on_grow() {
    let mut rt = target(320, 240, 1);
    rt.begin_slide(SlideRequest {
        kind: SlideKind::Bottom,
        panel_y: 0,
        panel_h: 40,
        end: 0,
    });
    let buf = screen(&rt, 0);
    for _ in 0..300 {
        rt.update_screen(&buf, true, PresentFlags::default()).unwrap();
    }
    assert!(rt.slide().unwrap().finished());

    rt.window_resized(640, 480).unwrap();
    let slide = rt.slide().unwrap();
    assert!(slide.finished());
    assert_eq!(slide.reveal.y, 140);
    let buf = screen(&rt, 0);
    rt.update_screen(&buf, true, PresentFlags::default()).unwrap();
    assert_eq!(rt.slide().unwrap().reveal.y, 140);
}

#[test]
fn swatch_overlay() {
    let mut rt = target(320, 200, 1);
    load_sheet(&mut rt, false);
    rt.swatch = Swatch {
        visible: true,
        x: 4,
        y: 0,
    };
    rt.update_screen(&screen(&rt, 0), true, PresentFlags::default())
        .unwrap();
    let frame = &rt.display().last_frame;
    // cells are two pixels wide, entry 2 starts at x 4 + 4
    assert_eq!(frame.pixel(8, 0), Some(WHITE));
    assert_eq!(frame.pixel(6, 1), Some(native([255, 0, 0])));
}
