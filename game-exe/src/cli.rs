use std::str::FromStr;

use argh::FromArgs;
use gamestate::GameOptions;
use log::LevelFilter;
use render_target::ScaleFilter;

use crate::config::DEFAULT_SCALE;

/// Height of the status panel added under a user picked screen size
const PANEL_H: i32 = 40;

/// CLI options for pre2
#[derive(Debug, Clone, FromArgs)]
pub struct CLIOptions {
    /// verbose level: off, error, warn, info, debug, trace
    #[argh(option)]
    pub verbose: Option<LevelFilter>,
    /// path to the data files (default '.')
    #[argh(option)]
    pub datapath: Option<String>,
    /// start at level NUM
    #[argh(option, default = "0")]
    pub level: u8,
    /// debug channel mask
    #[argh(option, default = "0")]
    pub debug: u16,
    /// cheats mask
    #[argh(option, default = "0")]
    pub cheats: u16,
    /// start at position XxY
    #[argh(option)]
    pub startpos: Option<Position>,
    /// enable fullscreen
    #[argh(switch)]
    pub fullscreen: bool,
    /// graphics screen size WxH (default 320x200)
    #[argh(option)]
    pub screensize: Option<ScreenSize>,
    /// window scale factor
    #[argh(option)]
    pub scale: Option<i32>,
    /// scale filter <nearest, linear, best>
    #[argh(option)]
    pub filter: Option<ScaleFilter>,
    /// enable CGA colors
    #[argh(switch)]
    pub cga: bool,
    /// enable DOS style screen scrolling
    #[argh(switch)]
    pub dosscroll: bool,
    /// enable fuchsia color as in Hybrid crack
    #[argh(switch)]
    pub hybrid: bool,
    /// pick palette NUM for screen colors
    #[argh(option)]
    pub palette: Option<u8>,
    /// do not scroll map before each level
    #[argh(switch)]
    pub nomap: bool,
    /// select button NUM for jump (default 0)
    #[argh(option)]
    pub jumpbtn: Option<u8>,
    /// disable sound
    #[argh(switch)]
    pub nosound: bool,
    /// show the castle before levels 8 and 9
    #[argh(switch)]
    pub castle: bool,
    /// data directory, the same as --datapath
    #[argh(positional)]
    pub path: Option<String>,
}

impl CLIOptions {
    pub fn data_path(&self) -> &str {
        self.datapath
            .as_deref()
            .or(self.path.as_deref())
            .unwrap_or(".")
    }

    /// Window scale, anything below 1 falls back to the default
    pub fn scale(&self) -> i32 {
        self.scale.filter(|s| *s >= 1).unwrap_or(DEFAULT_SCALE)
    }
}

impl From<&CLIOptions> for GameOptions {
    fn from(g: &CLIOptions) -> Self {
        GameOptions {
            start_level: g.level,
            show_map: !g.nomap,
            castle: g.castle,
            cheats: g.cheats,
            start_pos: g.startpos.map(|p| (p.x, p.y)),
            dos_scroll: g.dosscroll,
            cga: g.cga,
            palette: g.palette.unwrap_or_default(),
            ..GameOptions::default()
        }
    }
}

fn parse_pair(s: &str) -> Option<(i32, i32)> {
    let (a, b) = s.split_once(['x', 'X'])?;
    Some((a.trim().parse().ok()?, b.trim().parse().ok()?))
}

fn invalid(what: &str) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::InvalidInput, what.to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl FromStr for Position {
    type Err = std::io::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (x, y) = parse_pair(s).ok_or_else(|| invalid("Expected a position as XxY"))?;
        Ok(Self { x, y })
    }
}

/// Logical screen size, aligned to 16x16 tiles with room for the panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenSize {
    pub w: i32,
    pub h: i32,
}

impl FromStr for ScreenSize {
    type Err = std::io::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (w, h) = parse_pair(s).ok_or_else(|| invalid("Expected a screen size as WxH"))?;
        if w <= 0 || h <= 0 {
            return Err(invalid("Screen size must be positive"));
        }
        Ok(Self {
            w: (w + 15) & !15,
            h: ((h + 15) & !15) + PANEL_H,
        })
    }
}
