#![forbid(unsafe_code)]

//! Line scanners for seekable, possibly still-growing byte streams.
//!
//! # Role in lurk
//! `lurk-reader` is the I/O layer. It owns the two scanning primitives the
//! buffer coordinator drives:
//!
//! - [`BackwardsLineScanner`]: yields lines in reverse order from an absolute
//!   position, by chunked backwards seeks. Each line comes back with the
//!   absolute offset of its first byte.
//! - [`ForwardsLineScanner`]: yields lines in forward order and treats EOF as
//!   "pause" rather than "terminate", so a file that grows between calls can
//!   be resumed without losing a partial trailing line.
//!
//! The low-level [`read_backwards_from`] primitive does a single
//! seek-back-then-read-forward step and leaves all retry policy to callers:
//! the underlying file may be truncated or rewritten between reads, and only
//! the scanner knows whether that is fatal.

pub mod backward;
pub mod error;
pub mod forward;
pub mod read_backwards;

pub use backward::{BackwardLine, BackwardsLineScanner};
pub use error::{ReaderError, Result};
pub use forward::ForwardsLineScanner;
pub use read_backwards::{read_backwards, read_backwards_from, BackwardRead};
