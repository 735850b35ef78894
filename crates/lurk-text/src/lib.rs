#![forbid(unsafe_code)]

//! Text wrapping with Unicode correctness.
//!
//! # Role in lurk
//! `lurk-text` turns one logical record into the display lines the record
//! cache counts and the renderer paints. Wrapping respects:
//!
//! - Grapheme cluster boundaries (never break emoji or combining sequences)
//! - Cell widths (CJK characters are 2 cells wide)
//! - Word boundaries when possible, with a character fallback for words
//!   wider than the terminal
//!
//! Every input — including the empty string — wraps to at least one display
//! line, and embedded newlines always force hard breaks. The record cache
//! relies on both guarantees.

pub mod wrap;

pub use wrap::{display_width, truncate_to_width, wrap_text, WrapMode};
