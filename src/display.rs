//! Display side of the widget
//!
//! The widget never talks to a terminal or a page directly. It builds a
//! [`DisplayFrame`] describing everything that should be visible and hands it
//! to a [`DisplaySink`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Write;

use crate::Result;
use crate::category::Presentation;

/// Shown in place of an AQI value when there is none
pub const AQI_PLACEHOLDER: &str = "---";

/// Color of the AQI value while no reading is shown
pub const NEUTRAL_COLOR: &str = "#9ca3af";

/// Severity of the status line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Pending,
    Success,
}

impl Severity {
    fn ansi_code(self) -> &'static str {
        match self {
            Severity::Error => "31",
            Severity::Pending => "34",
            Severity::Success => "32",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Pending => write!(f, "pending"),
            Severity::Success => write!(f, "success"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusLine {
    pub message: String,
    pub severity: Severity,
}

/// Complete visible state of the widget
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayFrame {
    pub status: StatusLine,
    /// AQI value, `None` shows the placeholder
    pub aqi: Option<i32>,
    /// Color of the AQI value
    pub color: String,
    /// Style tag of the advice box, empty for none
    pub style_tag: String,
    pub advice: String,
    /// Whether the submit action is available
    pub trigger_enabled: bool,
}

impl DisplayFrame {
    /// Frame with the AQI reset to the placeholder
    #[must_use]
    pub fn blank(status: StatusLine, advice: impl Into<String>, trigger_enabled: bool) -> Self {
        Self {
            status,
            aqi: None,
            color: NEUTRAL_COLOR.to_string(),
            style_tag: String::new(),
            advice: advice.into(),
            trigger_enabled,
        }
    }

    /// Frame showing a fetched value
    #[must_use]
    pub fn reading(status: StatusLine, aqi: i32, presentation: &Presentation) -> Self {
        Self {
            status,
            aqi: Some(aqi),
            color: presentation.color.clone(),
            style_tag: presentation.style_tag.clone(),
            advice: presentation.advice.clone(),
            trigger_enabled: true,
        }
    }

    /// The AQI as displayed: the number or the placeholder
    #[must_use]
    pub fn aqi_text(&self) -> String {
        self.aqi
            .map_or_else(|| AQI_PLACEHOLDER.to_string(), |aqi| aqi.to_string())
    }
}

/// Receives frames from the widget
pub trait DisplaySink: Send {
    fn render(&mut self, frame: &DisplayFrame) -> Result<()>;
}

/// Keeps every frame it receives
#[derive(Debug, Default, Clone)]
pub struct MemoryDisplay {
    frames: Vec<DisplayFrame>,
}

impl MemoryDisplay {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn frames(&self) -> &[DisplayFrame] {
        &self.frames
    }

    #[must_use]
    pub fn last(&self) -> Option<&DisplayFrame> {
        self.frames.last()
    }
}

impl DisplaySink for MemoryDisplay {
    fn render(&mut self, frame: &DisplayFrame) -> Result<()> {
        self.frames.push(frame.clone());
        Ok(())
    }
}

/// Writes frames as text, optionally with ANSI colors
pub struct TerminalDisplay<W> {
    out: W,
    ansi: bool,
}

impl TerminalDisplay<std::io::Stdout> {
    /// Display on stdout, colored when stdout is a terminal
    #[must_use]
    pub fn stdout() -> Self {
        use std::io::IsTerminal;
        let out = std::io::stdout();
        let ansi = out.is_terminal();
        Self { out, ansi }
    }
}

impl<W: Write + Send> TerminalDisplay<W> {
    pub fn new(out: W, ansi: bool) -> Self {
        Self { out, ansi }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn paint_status(&self, status: &StatusLine) -> String {
        if self.ansi {
            format!(
                "\x1b[{}m{}\x1b[0m",
                status.severity.ansi_code(),
                status.message
            )
        } else {
            format!("[{}] {}", status.severity, status.message)
        }
    }

    fn paint_aqi(&self, frame: &DisplayFrame) -> String {
        let text = frame.aqi_text();
        match (self.ansi, parse_hex_color(&frame.color)) {
            (true, Some((r, g, b))) => format!("\x1b[1;38;2;{r};{g};{b}m{text}\x1b[0m"),
            _ => text,
        }
    }
}

impl<W: Write + Send> DisplaySink for TerminalDisplay<W> {
    fn render(&mut self, frame: &DisplayFrame) -> Result<()> {
        let status = self.paint_status(&frame.status);
        writeln!(self.out, "{status}")?;

        // Pending frames only carry the status line
        if frame.status.severity != Severity::Pending {
            let aqi = self.paint_aqi(frame);
            writeln!(self.out, "AQI: {aqi}")?;
            if !frame.advice.is_empty() {
                if frame.style_tag.is_empty() {
                    writeln!(self.out, "{}", frame.advice)?;
                } else {
                    writeln!(self.out, "[{}] {}", frame.style_tag, frame.advice)?;
                }
            }
        }

        self.out.flush()?;
        Ok(())
    }
}

/// Parse a `#rrggbb` color
#[must_use]
pub fn parse_hex_color(color: &str) -> Option<(u8, u8, u8)> {
    let hex = color.strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}
