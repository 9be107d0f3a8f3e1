//! ANSI colors for speaker labels and banners.

pub const RESET: &str = "\x1b[0m";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Red,
    Green,
    Purple,
}

impl Color {
    pub fn sgr(self) -> &'static str {
        match self {
            Self::Red => "\x1b[91m",
            Self::Green => "\x1b[92m",
            Self::Purple => "\x1b[95m",
        }
    }
}

/// Applies colors, or leaves text untouched when colors are disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    enabled: bool,
}

impl Palette {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn plain() -> Self {
        Self::new(false)
    }

    pub fn paint(&self, color: Color, text: &str) -> String {
        if self.enabled {
            format!("{}{text}{RESET}", color.sgr())
        } else {
            text.to_string()
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::new(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paint_wraps_text_in_sgr_and_reset() {
        let palette = Palette::default();
        assert_eq!(palette.paint(Color::Red, "Socrates"), "\x1b[91mSocrates\x1b[0m");
        assert_eq!(palette.paint(Color::Green, "Ana"), "\x1b[92mAna\x1b[0m");
    }

    #[test]
    fn plain_palette_leaves_text_untouched() {
        assert_eq!(Palette::plain().paint(Color::Purple, "banner"), "banner");
    }
}
