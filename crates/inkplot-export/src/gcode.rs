//! G-code export serializer.
//!
//! Writes one command per line:
//!
//! | Command | Text |
//! |---|---|
//! | pen down | `M3` |
//! | pen up | `M5` |
//! | home | `G28` |
//! | linear move | `G1 X<x> Y<y> F<feed>` |
//! | arc move | `G2`/`G3 X<x> Y<y> I<i> J<j> F<feed>` |
//!
//! Every number has exactly two decimals. Negative zero is written as
//! `0.00` so that identical programs always serialize identically.
//!
//! Lines beginning with `;` are metadata comments, ignored by firmware
//! and by [`parse_gcode`](crate::parse_gcode).
//!
//! This is a pure function with no I/O; it returns a `String`.

use std::fmt::Write;

use inkplot_engine::MotionCommand;

/// Metadata to embed as `;`-prefixed comment lines at the top of the
/// program.
///
/// All fields are optional. When present, the corresponding comment
/// line is emitted.
#[derive(Debug, Clone, Default)]
pub struct GcodeMetadata<'a> {
    /// Source image filename: emitted as `; Source: <filename>`.
    pub title: Option<&'a str>,

    /// Pen nib width: emitted as `; Pen nib: <mm> mm`.
    pub pen_nib_mm: Option<f64>,

    /// Free-form description: emitted as a `;` comment.
    pub description: Option<&'a str>,

    /// Full `SynthesisConfig` JSON: emitted as `; Config: <json>`.
    ///
    /// Allows re-running synthesis with the exact same settings.
    pub config_json: Option<&'a str>,
}

/// Serialize a motion program into G-code text.
///
/// # Examples
///
/// ```
/// use inkplot_engine::MotionCommand;
/// use inkplot_export::gcode::{GcodeMetadata, to_gcode};
///
/// let program = [
///     MotionCommand::PenUp,
///     MotionCommand::LinearMove { x: 1.5, y: 2.0, feed: 5000.0 },
/// ];
/// let text = to_gcode(&program, &GcodeMetadata::default());
/// assert!(text.contains("M5\nG1 X1.50 Y2.00 F5000.00\n"));
/// ```
#[must_use]
pub fn to_gcode(commands: &[MotionCommand], metadata: &GcodeMetadata<'_>) -> String {
    let mut out = String::new();

    // --- Metadata header ---
    let _ = writeln!(out, "; inkplot");
    if let Some(title) = metadata.title {
        for line in title.lines() {
            let _ = writeln!(out, "; Source: {line}");
        }
    }
    if let Some(nib) = metadata.pen_nib_mm {
        let _ = writeln!(out, "; Pen nib: {} mm", number(nib));
    }
    if let Some(description) = metadata.description {
        for line in description.lines() {
            let _ = writeln!(out, "; {line}");
        }
    }
    if let Some(config_json) = metadata.config_json {
        for line in config_json.lines() {
            let _ = writeln!(out, "; Config: {line}");
        }
    }

    // --- Commands ---
    for command in commands {
        let _ = writeln!(out, "{}", format_command(command));
    }

    out
}

/// A single command as one line of G-code, without the newline.
#[must_use]
pub fn format_command(command: &MotionCommand) -> String {
    match *command {
        MotionCommand::Home => "G28".to_owned(),
        MotionCommand::PenUp => "M5".to_owned(),
        MotionCommand::PenDown => "M3".to_owned(),
        MotionCommand::LinearMove { x, y, feed } => format!(
            "G1 X{} Y{} F{}",
            number(x),
            number(y),
            number(feed)
        ),
        MotionCommand::ArcMove {
            x,
            y,
            i,
            j,
            feed,
            direction,
        } => format!(
            "{} X{} Y{} I{} J{} F{}",
            direction.gcode_word(),
            number(x),
            number(y),
            number(i),
            number(j),
            number(feed)
        ),
    }
}

/// Two-decimal formatting with negative zero folded to `0.00`.
fn number(value: f64) -> String {
    let s = format!("{value:.2}");
    if s == "-0.00" { "0.00".to_owned() } else { s }
}
