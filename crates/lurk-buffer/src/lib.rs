#![forbid(unsafe_code)]

//! The bidirectional streaming buffer behind the lurk viewer.
//!
//! # Role in lurk
//! `lurk-buffer` keeps a bounded window of a log file's records cached
//! around the visible screen, while the file is scrolled in either
//! direction or grows under follow mode.
//!
//! # Key components
//!
//! - [`Record`]: one projected, word-wrapped logical line.
//! - [`RecordList`]: the double-ended record cache with a screen cursor and
//!   incrementally maintained display-line counters.
//! - [`Buffer`]: the coordinator. Owns the scanners from `lurk-reader`, the
//!   shared cache, and the two producer threads that fill it: the reverse
//!   producer prepends history above the screen, the forward producer
//!   appends below (indefinitely in follow mode).
//!
//! # Concurrency
//! Producers run on plain threads, poked by a broadcast [`wake::Wake`] and
//! stopped by a condvar-backed [`cancel::CancelToken`]. All cache mutations
//! happen under one lock via [`SharedRecordList::with_lock`], so inserts
//! and the cursor adjustments they imply are atomic to readers. Re-seeks
//! are serialized: cancel, join, reorient, restart.

pub mod buffer;
pub mod cancel;
pub mod error;
pub mod projection;
pub mod record;
pub mod record_list;
pub mod shared;
pub mod wake;

pub use buffer::{Buffer, BufferConfig, Phase, FOLLOW_POLL_INTERVAL};
pub use error::{BufferError, Result};
pub use projection::{JsonCompact, Passthrough, Project};
pub use record::Record;
pub use record_list::{RecordList, ScreenLines};
pub use shared::SharedRecordList;
