//! Busy indicator for the mode bar.

use std::time::Instant;

use crate::app::Mode;

/// Shown while a query runs.
const BRAILLE_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Shown while the translator works.
const DOT_FRAMES: &[&str] = &["", ".", "..", "..."];

const FRAME_MS: u128 = 100;

/// Animation picked from the mode that was active when work started.
#[derive(Debug, Clone)]
pub struct Spinner {
    frames: &'static [&'static str],
    label: &'static str,
    started: Instant,
}

impl Spinner {
    /// Dots and "Thinking" in AI mode, a braille wheel and "Executing" otherwise.
    pub fn for_mode(mode: Mode) -> Self {
        let (frames, label) = match mode {
            Mode::DirectQuery => (BRAILLE_FRAMES, "Executing"),
            Mode::Assisted => (DOT_FRAMES, "Thinking"),
        };
        Self {
            frames,
            label,
            started: Instant::now(),
        }
    }

    fn frame(&self) -> &'static str {
        let index = (self.started.elapsed().as_millis() / FRAME_MS) as usize;
        self.frames[index % self.frames.len()]
    }

    /// Current text: the wheel leads, the dots trail.
    pub fn display(&self) -> String {
        if self.frames == DOT_FRAMES {
            format!("{}{}", self.label, self.frame())
        } else {
            format!("{} {}", self.frame(), self.label)
        }
    }

    pub fn label(&self) -> &str {
        self.label
    }
}
