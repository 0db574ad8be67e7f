use crate::level_bar::ColorTier;
use crossterm::event::KeyCode;
use crossterm::style::Color;

/// Colors used to draw bars: one per tier plus the peak marker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub tiers: [Color; 4],
    pub marker: Color,
}

impl Palette {
    pub fn tier(&self, tier: ColorTier) -> Color {
        self.tiers[tier.index()]
    }
}

impl Default for Palette {
    fn default() -> Self {
        palette_for(0)
    }
}

/// Number of selectable schemes
pub const SCHEME_COUNT: u8 = 5;

/// Get the palette for a scheme, lowest tier first
pub fn palette_for(scheme: u8) -> Palette {
    match scheme {
        1 => Palette {  // Red/Yellow (fire)
            tiers: [Color::DarkRed, Color::Red, Color::DarkYellow, Color::Yellow],
            marker: Color::White,
        },
        2 => Palette {  // Blue/Cyan (ice)
            tiers: [Color::DarkBlue, Color::Blue, Color::DarkCyan, Color::Cyan],
            marker: Color::White,
        },
        3 => Palette {  // White/Grey (mono)
            tiers: [Color::DarkGrey, Color::Grey, Color::White, Color::White],
            marker: Color::Grey,
        },
        4 => Palette {  // Blue/Magenta (neon)
            tiers: [Color::DarkBlue, Color::Blue, Color::Magenta, Color::AnsiValue(13)],
            marker: Color::White,
        },
        _ => Palette {  // Classic: cyan, green, yellow, red
            tiers: [Color::Cyan, Color::Green, Color::Yellow, Color::Red],
            marker: Color::White,
        },
    }
}

/// Shared color scheme state
#[derive(Debug, Clone, Copy)]
pub struct ColorState {
    pub scheme: u8,
}

impl ColorState {
    pub fn new(default_scheme: u8) -> Self {
        Self { scheme: default_scheme % SCHEME_COUNT }
    }

    pub fn palette(&self) -> Palette {
        palette_for(self.scheme)
    }

    /// Handle color scheme key input. Returns true if key was handled.
    pub fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('!') => self.scheme = 1,  // Shift+1: fire
            KeyCode::Char('@') => self.scheme = 2,  // Shift+2: ice
            KeyCode::Char('#') => self.scheme = 3,  // Shift+3: mono
            KeyCode::Char('$') => self.scheme = 4,  // Shift+4: neon
            KeyCode::Char(')') => self.scheme = 0,  // Shift+0: classic
            _ => return false,
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classic_palette_is_cyan_green_yellow_red() {
        let palette = Palette::default();
        assert_eq!(palette.tier(ColorTier::new(0)), Color::Cyan);
        assert_eq!(palette.tier(ColorTier::new(1)), Color::Green);
        assert_eq!(palette.tier(ColorTier::new(2)), Color::Yellow);
        assert_eq!(palette.tier(ColorTier::new(3)), Color::Red);
        assert_eq!(palette.marker, Color::White);
    }

    #[test]
    fn shift_digits_select_schemes() {
        let mut state = ColorState::new(0);
        assert!(state.handle_key(KeyCode::Char('@')));
        assert_eq!(state.scheme, 2);
        assert!(state.handle_key(KeyCode::Char(')')));
        assert_eq!(state.scheme, 0);
        assert!(!state.handle_key(KeyCode::Char('x')));
    }

    #[test]
    fn out_of_range_default_wraps() {
        assert_eq!(ColorState::new(7).scheme, 2);
    }
}
