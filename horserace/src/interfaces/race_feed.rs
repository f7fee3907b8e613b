use crate::core::horse::Horse;
use crate::post::race_result::{RaceEvent, RaceResult};

/// Maximum number of progress snapshots per second of race time.
pub const MAX_FEED_UPDATE_FREQUENCY: f64 = 20.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RgbColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

const FALLBACK_COLOR: RgbColor = RgbColor { r: 255, g: 0, b: 0 };

/// Resets the terminal colors set by `RgbColor::ansi_fg`.
pub const ANSI_RESET: &str = "\x1b[0m";

impl RgbColor {
    /// Parses a CSS color string. Unparsable colors are shown in red.
    pub fn parse_or_fallback(color: &str) -> RgbColor {
        match color.parse::<css_color_parser::Color>() {
            Ok(c) => RgbColor {
                r: c.r,
                g: c.g,
                b: c.b,
            },
            Err(_) => FALLBACK_COLOR,
        }
    }

    /// 24 bit terminal escape sequence that sets this color as foreground color.
    pub fn ansi_fg(&self) -> String {
        format!("\x1b[38;2;{};{};{}m", self.r, self.g, self.b)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HorseState {
    pub name: String,
    pub color: RgbColor,
    pub progress: f64,
}

impl From<&Horse> for HorseState {
    fn from(horse: &Horse) -> Self {
        HorseState {
            name: horse.name.to_owned(),
            color: RgbColor::parse_or_fallback(&horse.color),
            progress: horse.progress(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RaceState {
    pub tick: u64,
    pub race_time: f64,
    pub horse_states: Vec<HorseState>,
}

/// Messages sent by the race driver. Every race ends with exactly one `Finished` or `Stopped`.
#[derive(Debug, Clone)]
pub enum RaceMsg {
    Progress(RaceState),
    Event(RaceEvent),
    Finished {
        winner: Option<String>,
        result: RaceResult,
    },
    Stopped(RaceResult),
}

impl RaceMsg {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RaceMsg::Finished { .. } | RaceMsg::Stopped(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_colors_are_parsed() {
        assert_eq!(
            RgbColor::parse_or_fallback("#FFA500"),
            RgbColor {
                r: 255,
                g: 165,
                b: 0
            }
        );
    }

    #[test]
    fn invalid_colors_fall_back_to_red() {
        assert_eq!(RgbColor::parse_or_fallback("not a color"), FALLBACK_COLOR);
    }

    #[test]
    fn terminal_color_sequence() {
        let color = RgbColor::parse_or_fallback("#8B4513");
        assert_eq!(color.ansi_fg(), "\x1b[38;2;139;69;19m");
    }
}
