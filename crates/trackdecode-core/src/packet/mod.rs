//! Tracker packet decoding.
//!
//! The packet layer follows the same split for every message kind:
//! - `layout`: byte offsets and ranges (source of truth)
//! - `reader`: safe byte access plus the coordinate, time and voltage conventions
//! - `gps` / `sensor` / `management`: one decoder per message kind
//! - `parser`: discriminant and header dispatch
//! - `error`: explicit, actionable errors
//!
//! Every field sits at a fixed offset, and each decoder checks the full
//! layout length before reading. Decoding is pure and holds no state.

pub mod error;
pub mod gps;
pub mod layout;
pub mod management;
pub mod parser;
pub mod reader;
pub mod sensor;

pub use parser::{DecodePolicy, parse_packet};
