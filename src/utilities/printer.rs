//! ANSI-coloured console output for verbose agent traces.

use serde::{Deserialize, Serialize};

/// Colours used by the agent trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrinterColor {
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    BoldYellow,
    BoldMagenta,
}

impl PrinterColor {
    fn ansi_code(&self) -> &'static str {
        match self {
            Self::Red => "\x1b[31m",
            Self::Green => "\x1b[32m",
            Self::Yellow => "\x1b[33m",
            Self::Blue => "\x1b[34m",
            Self::Magenta => "\x1b[35m",
            Self::Cyan => "\x1b[36m",
            Self::BoldYellow => "\x1b[1;33m",
            Self::BoldMagenta => "\x1b[1;35m",
        }
    }
}

const RESET: &str = "\x1b[0m";

/// Writes coloured lines to stdout.
#[derive(Debug, Clone, Default)]
pub struct Printer;

impl Printer {
    pub fn new() -> Self {
        Self
    }

    /// Render `content` wrapped in the colour's escape codes.
    pub fn paint(&self, content: &str, color: PrinterColor) -> String {
        format!("{}{}{}", color.ansi_code(), content, RESET)
    }

    pub fn print(&self, content: &str, color: PrinterColor) {
        println!("{}", self.paint(content, color));
    }

    /// Print a titled block: a blank line, the title, a blank line, the body.
    pub fn print_block(&self, title: &str, body: &str, color: PrinterColor) {
        self.print(&format!("\n\n{}\n\n{}", title, body), color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paint_wraps_with_reset() {
        let painted = Printer::new().paint("hi", PrinterColor::Green);
        assert_eq!(painted, "\x1b[32mhi\x1b[0m");
    }
}
