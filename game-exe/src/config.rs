//! User configuration options.

use std::fs::{File, OpenOptions, create_dir_all};
use std::io::{Read, Write};
use std::path::PathBuf;

use dirs::config_dir;
use input::config::InputConfig;
use log::{error, info, warn};
use nanoserde::{DeRon, SerRon};
use render_target::{ORIG_H, ORIG_W, ScaleFilter};

use crate::cli::{CLIOptions, ScreenSize};
use crate::BASE_DIR;

const LOG_TAG: &str = "UserConfig";
pub const DEFAULT_SCALE: i32 = 2;

fn get_cfg_file() -> Option<PathBuf> {
    let Some(mut dir) = config_dir() else {
        warn!(target: LOG_TAG, "Couldn't find the user config dir");
        return None;
    };
    dir.push(BASE_DIR);
    if let Err(e) = create_dir_all(&dir) {
        warn!(target: LOG_TAG, "Couldn't create {dir:?}: {e}");
        return None;
    }
    dir.push("user.ron");
    Some(dir)
}

#[derive(Debug, Clone, PartialEq, DeRon, SerRon)]
pub struct UserConfig {
    pub data_path: String,
    pub screen_w: i32,
    pub screen_h: i32,
    pub scale: i32,
    /// One of nearest, linear, best
    pub filter: String,
    pub fullscreen: bool,
    pub hybrid_color: bool,
    pub sound: bool,
    pub show_map: bool,
    pub palette: u8,
    pub input: InputConfig,
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            data_path: ".".to_string(),
            screen_w: ORIG_W,
            screen_h: ORIG_H,
            scale: DEFAULT_SCALE,
            filter: ScaleFilter::Nearest.name().to_string(),
            fullscreen: false,
            hybrid_color: false,
            sound: true,
            show_map: true,
            palette: 0,
            input: InputConfig::default(),
        }
    }
}

impl UserConfig {
    /// `load` will attempt to read the config, falling back to the defaults
    /// if it is missing or unreadable
    pub fn load() -> Self {
        let Some(path) = get_cfg_file() else {
            return UserConfig::default();
        };
        let mut file = match OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
        {
            Ok(f) => f,
            Err(e) => {
                warn!(target: LOG_TAG, "Couldn't open {path:?}, {e}");
                return UserConfig::default();
            }
        };
        let mut buf = String::new();
        if let Ok(read_len) = file.read_to_string(&mut buf) {
            if read_len == 0 {
                return UserConfig::create_default(&mut file);
            }
            if let Ok(data) = UserConfig::deserialize_ron(&buf) {
                info!(target: LOG_TAG, "Loaded user config file");
                return data;
            }
            warn!(target: LOG_TAG, "Could not deserialise {path:?} recreating config");
        }
        UserConfig::create_default(&mut file)
    }

    fn create_default(file: &mut File) -> Self {
        let config = UserConfig::default();
        info!(target: LOG_TAG, "Created default user config file");
        let data = config.serialize_ron();
        if let Err(e) = file.set_len(0).and_then(|_| file.write_all(data.as_bytes())) {
            error!(target: LOG_TAG, "Could not write config: {e}");
        }
        config
    }

    pub fn write(&self) {
        let Some(path) = get_cfg_file() else {
            return;
        };
        let data = self.serialize_ron();
        match File::create(&path).and_then(|mut f| f.write_all(data.as_bytes())) {
            Ok(()) => info!(target: LOG_TAG, "Saved user config to {path:?}"),
            Err(e) => error!(target: LOG_TAG, "Could not write config: {e}"),
        }
    }

    pub fn filter(&self) -> ScaleFilter {
        ScaleFilter::from_name(&self.filter)
    }

    /// Take input settings changed while playing, such as a captured jump
    /// button. Returns true when the config needs writing.
    pub fn sync_input(&mut self, input: &InputConfig) -> bool {
        if self.input == *input {
            return false;
        }
        info!(target: LOG_TAG, "Jump button is now {}", input.jump_button);
        self.input = input.clone();
        true
    }

    /// Sync the CLI options and UserOptions with each other. Anything given
    /// on the command line is kept for next time.
    pub fn sync_cli(&mut self, cli: &mut CLIOptions) {
        info!(target: LOG_TAG, "Checking CLI options");

        match cli.datapath.as_ref().or(cli.path.as_ref()) {
            Some(path) if *path != self.data_path => {
                path.clone_into(&mut self.data_path);
                info!(target: LOG_TAG, "Data path changed to: {path}");
            }
            Some(_) => {}
            None => cli.datapath = Some(self.data_path.clone()),
        }

        if let Some(size) = cli.screensize {
            self.screen_w = size.w;
            self.screen_h = size.h;
        } else {
            cli.screensize = Some(ScreenSize {
                w: self.screen_w,
                h: self.screen_h,
            });
        }

        match cli.scale {
            Some(scale) if scale >= 1 => self.scale = scale,
            _ => cli.scale = Some(self.scale.max(1)),
        }

        if let Some(filter) = cli.filter {
            filter.name().clone_into(&mut self.filter);
        } else {
            cli.filter = Some(self.filter());
        }

        if let Some(palette) = cli.palette {
            self.palette = palette;
        } else {
            cli.palette = Some(self.palette);
        }

        if let Some(button) = cli.jumpbtn {
            self.input.jump_button = button;
        } else {
            cli.jumpbtn = Some(self.input.jump_button);
        }

        // switches can only turn things on, the config keeps them on
        if cli.fullscreen {
            self.fullscreen = true;
        } else {
            cli.fullscreen = self.fullscreen;
        }
        if cli.hybrid {
            self.hybrid_color = true;
        } else {
            cli.hybrid = self.hybrid_color;
        }
        if cli.nosound {
            self.sound = false;
        } else {
            cli.nosound = !self.sound;
        }
        if cli.nomap {
            self.show_map = false;
        } else {
            cli.nomap = !self.show_map;
        }
    }
}

#[cfg(test)]
mod tests {
    use argh::FromArgs;
    use nanoserde::{DeRon, SerRon};

    use super::*;

    fn cli(args: &[&str]) -> CLIOptions {
        CLIOptions::from_args(&["pre2"], args).unwrap()
    }

    #[test]
    fn ron_round_trip() {
        let cfg = UserConfig {
            scale: 3,
            filter: "linear".to_string(),
            ..UserConfig::default()
        };
        let back = UserConfig::deserialize_ron(&cfg.serialize_ron()).unwrap();
        assert_eq!(back, cfg);
    }

    #[test]
    fn cli_overrides_config() {
        let mut cfg = UserConfig::default();
        let mut opts = cli(&["--scale", "4", "--screensize", "640x360", "--jumpbtn", "2"]);
        cfg.sync_cli(&mut opts);
        assert_eq!(cfg.scale, 4);
        assert_eq!((cfg.screen_w, cfg.screen_h), (640, 408));
        assert_eq!(cfg.input.jump_button, 2);
        assert_eq!(opts.data_path(), ".");
    }

    #[test]
    fn config_fills_missing_cli() {
        let mut cfg = UserConfig {
            data_path: "/games/pre2".to_string(),
            scale: 3,
            filter: "best".to_string(),
            fullscreen: true,
            sound: false,
            ..UserConfig::default()
        };
        let mut opts = cli(&[]);
        cfg.sync_cli(&mut opts);
        assert_eq!(opts.scale, Some(3));
        assert_eq!(opts.filter, Some(ScaleFilter::Best));
        assert_eq!(opts.screensize, Some(ScreenSize { w: 320, h: 200 }));
        assert!(opts.fullscreen);
        assert!(opts.nosound);
        assert_eq!(opts.data_path(), "/games/pre2");
    }

    #[test]
    fn bad_scale_is_ignored() {
        let mut cfg = UserConfig::default();
        let mut opts = cli(&["--scale", "0"]);
        cfg.sync_cli(&mut opts);
        assert_eq!(cfg.scale, DEFAULT_SCALE);
        assert_eq!(opts.scale, Some(DEFAULT_SCALE));
    }

    #[test]
    fn captured_jump_button_is_kept() {
        let mut cfg = UserConfig::default();
        assert!(!cfg.sync_input(&InputConfig::default()));
        let captured = InputConfig {
            jump_button: 3,
            ..InputConfig::default()
        };
        assert!(cfg.sync_input(&captured));
        assert_eq!(cfg.input.jump_button, 3);
        let back = UserConfig::deserialize_ron(&cfg.serialize_ron()).unwrap();
        assert_eq!(back.input.jump_button, 3);
    }
}
