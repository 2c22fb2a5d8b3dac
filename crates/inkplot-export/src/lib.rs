//! inkplot-export: Pure G-code serializer and parser (sans-IO)
//!
//! Converts motion programs to and from the plain-text command subset the
//! plotter firmware accepts (`M3`, `M5`, `G1`, `G2`, `G3`, `G28`).

pub mod gcode;
pub mod parse;

pub use gcode::{GcodeMetadata, format_command, to_gcode};
pub use parse::{ParseError, parse_gcode};
