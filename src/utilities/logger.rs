//! Verbose, timestamped trace of agent steps.
//!
//! Disabled loggers print nothing. The `log` facade records are emitted by the
//! callers independently of this trace.

use chrono::Local;

use crate::utilities::printer::{Printer, PrinterColor};

/// Width of the step tracker banner.
const STEP_BANNER_WIDTH: usize = 50;

/// Console trace with optional verbose output and timestamps.
#[derive(Debug, Clone)]
pub struct Logger {
    /// Enables the trace.
    pub verbose: bool,
    /// Colour used when a call does not pick one.
    pub default_color: PrinterColor,
    printer: Printer,
}

impl Default for Logger {
    fn default() -> Self {
        Self::new(false)
    }
}

impl Logger {
    pub fn new(verbose: bool) -> Self {
        Self {
            verbose,
            default_color: PrinterColor::BoldYellow,
            printer: Printer::new(),
        }
    }

    /// Print `[timestamp][LEVEL]: message` when verbose.
    pub fn log(&self, level: &str, message: &str, color: Option<PrinterColor>) {
        if !self.verbose {
            return;
        }
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
        let color = color.unwrap_or(self.default_color);
        let formatted = format!("\n[{}][{}]: {}", timestamp, level.to_uppercase(), message);
        self.printer.print(&formatted, color);
    }

    /// Print a titled block when verbose.
    pub fn block(&self, title: &str, body: &str, color: PrinterColor) {
        if self.verbose {
            self.printer.print_block(title, body, color);
        }
    }

    /// Print a `STEP i/N` banner when verbose.
    pub fn step(&self, step: usize, total: usize) {
        if self.verbose {
            self.printer
                .print(&step_banner(step, total), PrinterColor::BoldMagenta);
        }
    }
}

fn step_banner(step: usize, total: usize) -> String {
    let rule = "=".repeat(STEP_BANNER_WIDTH);
    let label = format!("STEP {}/{}", step, total);
    format!("\n{}\n{:^width$}\n{}\n", rule, label, rule, width = STEP_BANNER_WIDTH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_banner_centres_label() {
        let banner = step_banner(2, 10);
        let lines: Vec<&str> = banner.trim().lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].len(), STEP_BANNER_WIDTH);
        assert_eq!(lines[1].trim(), "STEP 2/10");
    }

    #[test]
    fn test_default_logger_is_quiet() {
        let logger = Logger::default();
        assert!(!logger.verbose);
        assert_eq!(logger.default_color, PrinterColor::BoldYellow);
    }
}
