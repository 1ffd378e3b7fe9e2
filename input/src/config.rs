use nanoserde::{DeRon, SerRon};

/// Joystick axis dead zone
pub const AXIS_THRESHOLD: i16 = 3200;

#[derive(Debug, Clone, PartialEq, Eq, DeRon, SerRon)]
pub struct InputConfig {
    /// Joystick button that jumps (acts as up)
    pub jump_button: u8,
    pub axis_threshold: i16,
}

impl Default for InputConfig {
    fn default() -> Self {
        InputConfig {
            jump_button: 0,
            axis_threshold: AXIS_THRESHOLD,
        }
    }
}

#[cfg(test)]
mod tests {
    use nanoserde::{DeRon, SerRon};

    use super::InputConfig;

    #[test]
    fn ron_keeps_bindings() {
        let cfg = InputConfig {
            jump_button: 3,
            axis_threshold: 1000,
        };
        let text = cfg.serialize_ron();
        let back = InputConfig::deserialize_ron(&text).unwrap();
        assert_eq!(back, cfg);
    }
}
