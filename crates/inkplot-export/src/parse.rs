//! G-code text parser.
//!
//! Reads the command subset written by [`to_gcode`](crate::to_gcode) back
//! into [`MotionCommand`]s, so saved programs can be analyzed or
//! previewed. The parser is lenient about everything it can ignore:
//!
//! - blank lines, `;` comments (full-line or trailing) and `(` comment
//!   lines are skipped
//! - words are case-insensitive and may be packed (`G1X10Y5`)
//! - `X`, `Y` and `F` are modal: a missing axis keeps its last value,
//!   and a line with only axis words repeats the last motion command
//! - unsupported commands and words are skipped with a warning
//!
//! Numbers it cannot read are errors, reported with the 1-based line.

use inkplot_engine::{ArcDirection, MotionCommand, SynthesisConfig};
use tracing::warn;

/// Errors from [`parse_gcode`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// A word's value is not a number.
    #[error("line {line}: invalid number in `{word}`")]
    InvalidNumber {
        /// 1-based line number.
        line: usize,
        /// The offending word as written.
        word: String,
    },

    /// A command lacks a value it cannot do without.
    #[error("line {line}: {command} requires {letter}")]
    MissingValue {
        /// 1-based line number.
        line: usize,
        /// The command word, e.g. `G2`.
        command: String,
        /// The missing word letter.
        letter: char,
    },
}

/// Motion mode remembered between lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Motion {
    Linear,
    Arc(ArcDirection),
}

/// A recognized command word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Word {
    Move(Motion),
    Home,
    PenDown,
    PenUp,
}

/// Parameters read from one line.
#[derive(Debug, Clone, Copy, Default)]
struct Params {
    x: Option<f64>,
    y: Option<f64>,
    i: Option<f64>,
    j: Option<f64>,
    f: Option<f64>,
}

impl Params {
    const fn has_axis(&self) -> bool {
        self.x.is_some() || self.y.is_some()
    }
}

/// Modal machine state carried across lines.
#[derive(Debug, Clone, Copy)]
struct Modal {
    x: f64,
    y: f64,
    feed: f64,
    motion: Option<Motion>,
}

impl Default for Modal {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            feed: SynthesisConfig::DEFAULT_DRAW_FEED,
            motion: None,
        }
    }
}

/// Parse G-code text into a motion program.
///
/// A move with no feed word before any `F` has been seen uses
/// [`SynthesisConfig::DEFAULT_DRAW_FEED`].
///
/// # Errors
///
/// Returns [`ParseError::InvalidNumber`] for a word whose value is not a
/// number, and [`ParseError::MissingValue`] for an arc with neither `I`
/// nor `J`.
pub fn parse_gcode(text: &str) -> Result<Vec<MotionCommand>, ParseError> {
    let mut modal = Modal::default();
    let mut commands = Vec::new();

    for (index, raw) in text.lines().enumerate() {
        let line = index + 1;
        let code = raw.split(';').next().unwrap_or_default().trim();
        if code.is_empty() || code.starts_with('(') {
            continue;
        }

        let mut word = None;
        let mut params = Params::default();
        for (letter, value) in split_words(code) {
            let number = || -> Result<f64, ParseError> {
                value.parse::<f64>().map_err(|_| ParseError::InvalidNumber {
                    line,
                    word: format!("{letter}{value}"),
                })
            };
            match letter {
                'G' | 'M' => {
                    let code_number = number()?;
                    match command_word(letter, code_number) {
                        Some(found) if word.is_none() => word = Some(found),
                        Some(_) => {
                            warn!(line, "skipping extra command word {letter}{value}");
                        }
                        None => warn!(line, "skipping unsupported command {letter}{value}"),
                    }
                }
                'X' => params.x = Some(number()?),
                'Y' => params.y = Some(number()?),
                'I' => params.i = Some(number()?),
                'J' => params.j = Some(number()?),
                'F' => params.f = Some(number()?),
                _ => warn!(line, "skipping unsupported word {letter}{value}"),
            }
        }

        let word = match word {
            Some(word) => word,
            None if params.has_axis() => match modal.motion {
                Some(motion) => Word::Move(motion),
                None => {
                    warn!(line, "skipping coordinates with no motion mode");
                    continue;
                }
            },
            None => continue,
        };

        if let Some(feed) = params.f {
            modal.feed = feed;
        }

        match word {
            Word::PenDown => commands.push(MotionCommand::PenDown),
            Word::PenUp => commands.push(MotionCommand::PenUp),
            Word::Home => {
                commands.push(MotionCommand::Home);
                modal.x = 0.0;
                modal.y = 0.0;
            }
            Word::Move(motion) => {
                modal.motion = Some(motion);
                modal.x = params.x.unwrap_or(modal.x);
                modal.y = params.y.unwrap_or(modal.y);
                commands.push(move_command(motion, &params, &modal, line)?);
            }
        }
    }

    Ok(commands)
}

fn move_command(
    motion: Motion,
    params: &Params,
    modal: &Modal,
    line: usize,
) -> Result<MotionCommand, ParseError> {
    match motion {
        Motion::Linear => Ok(MotionCommand::LinearMove {
            x: modal.x,
            y: modal.y,
            feed: modal.feed,
        }),
        Motion::Arc(direction) => {
            if params.i.is_none() && params.j.is_none() {
                return Err(ParseError::MissingValue {
                    line,
                    command: direction.gcode_word().to_owned(),
                    letter: 'I',
                });
            }
            Ok(MotionCommand::ArcMove {
                x: modal.x,
                y: modal.y,
                i: params.i.unwrap_or(0.0),
                j: params.j.unwrap_or(0.0),
                feed: modal.feed,
                direction,
            })
        }
    }
}

/// Map a `G`/`M` number to a supported command.
#[allow(clippy::float_cmp)]
fn command_word(letter: char, number: f64) -> Option<Word> {
    match (letter, number) {
        ('G', n) if n == 0.0 || n == 1.0 => Some(Word::Move(Motion::Linear)),
        ('G', n) if n == 2.0 => Some(Word::Move(Motion::Arc(ArcDirection::Clockwise))),
        ('G', n) if n == 3.0 => Some(Word::Move(Motion::Arc(ArcDirection::CounterClockwise))),
        ('G', n) if n == 28.0 => Some(Word::Home),
        ('M', n) if n == 3.0 => Some(Word::PenDown),
        ('M', n) if n == 5.0 => Some(Word::PenUp),
        _ => None,
    }
}

/// Split a comment-free line into `(letter, value)` words.
///
/// A word starts at an ASCII letter and runs until the next letter or
/// whitespace. Letters are upper-cased.
fn split_words(code: &str) -> Vec<(char, &str)> {
    let mut words = Vec::new();
    let mut current: Option<(char, usize)> = None;

    for (pos, c) in code.char_indices() {
        if c.is_ascii_alphabetic() || c.is_whitespace() {
            if let Some((letter, start)) = current.take() {
                words.push((letter, &code[start..pos]));
            }
            if c.is_ascii_alphabetic() {
                current = Some((c.to_ascii_uppercase(), pos + c.len_utf8()));
            }
        }
    }
    if let Some((letter, start)) = current {
        words.push((letter, &code[start..]));
    }

    words
}
