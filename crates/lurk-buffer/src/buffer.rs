//! The buffer coordinator: scanners, record cache, and producer pair.
//!
//! A [`Buffer`] owns one backwards and one forwards scanner over the same
//! file (distinct handles), the shared record cache, and two producer
//! threads that keep the cache filled around the visible window. User
//! intents (seek, scroll, resize, follow toggles) update coordinator state
//! and poke the producers through a broadcast [`Wake`]; producers snapshot
//! their read targets, pull lines through the scanners, and insert records
//! atomically with any cursor adjustment the insert requires.
//!
//! Re-seeking is serialized by a cancel-then-start lock: the previous
//! producer pair is cancelled and joined before the scanners are reoriented
//! and a new pair is started, so a record can never be torn across
//! populations.

use std::fs::File;
use std::io::{Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, error};

use lurk_reader::{BackwardsLineScanner, ForwardsLineScanner};
use lurk_text::WrapMode;

use crate::cancel::{CancelSource, CancelToken};
use crate::error::{BufferError, Result};
use crate::projection::Project;
use crate::record::Record;
use crate::record_list::ScreenLines;
use crate::shared::SharedRecordList;
use crate::wake::Wake;

/// How long the forward producer sleeps after hitting EOF in follow mode
/// before probing the file again. Cancellation interrupts the sleep.
pub const FOLLOW_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Lifecycle of the producer pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No producers running.
    Idle,
    /// A producer pair is active.
    Running,
    /// The pair has been cancelled and is being joined.
    Cancelling,
    /// The buffer was closed; no pair will run again.
    Terminated,
}

/// Static configuration for a [`Buffer`].
#[derive(Debug, Clone)]
pub struct BufferConfig {
    /// Terminal width in cells; records wrap to this.
    pub width: usize,
    /// Terminal height in rows.
    pub height: usize,
    /// Keep reading at EOF and anchor the cursor to the bottom.
    pub follow: bool,
    /// Display lines of read-ahead kept below the screen.
    pub fwd_eager: usize,
    /// Display lines of read-ahead kept above the screen.
    pub bkd_eager: usize,
    /// Wrap mode for record display lines.
    pub wrap_mode: WrapMode,
    /// Chunk size for backwards reads.
    pub chunk_size: usize,
}

impl BufferConfig {
    /// Defaults for a `width` × `height` screen: read-ahead of twice the
    /// screen height on both sides, word wrapping with character fallback,
    /// 1 KiB backward chunks.
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
            follow: false,
            fwd_eager: 2 * height,
            bkd_eager: 2 * height,
            wrap_mode: WrapMode::WordChar,
            chunk_size: 1024,
        }
    }

    #[must_use]
    pub fn follow(mut self, follow: bool) -> Self {
        self.follow = follow;
        self
    }

    #[must_use]
    pub fn eagerness(mut self, fwd: usize, bkd: usize) -> Self {
        self.fwd_eager = fwd;
        self.bkd_eager = bkd;
        self
    }

    #[must_use]
    pub fn wrap_mode(mut self, mode: WrapMode) -> Self {
        self.wrap_mode = mode;
        self
    }

    #[must_use]
    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }
}

type PostEvent = Box<dyn Fn() + Send + Sync>;

/// Coordinator state guarded by the config lock. Producers only hold it
/// long enough to snapshot; never across reads.
struct State {
    width: usize,
    height: usize,
    follow: bool,
    fwd_eager: usize,
    bkd_eager: usize,
    wrap_mode: WrapMode,
    chunk_size: usize,
    /// The current population seeded an anchor record at the seek target.
    /// While anchored, backward inserts stack above the screen instead of
    /// scrolling the anchor line away from the top row.
    anchored: bool,
    /// Head pruning moved the cache edge; the reverse producer must rebuild
    /// its scanner at this line-start offset before reading again.
    bkd_rewind: Option<u64>,
    /// The reverse side cannot be resupplied until the next re-seek.
    bkd_stopped: bool,
    /// The forward side cannot be resupplied until the next re-seek
    /// (its tail was pruned and the scanner cannot go back).
    fwd_stopped: bool,
    closed: bool,
}

struct Shared {
    path: PathBuf,
    state: Mutex<State>,
    records: SharedRecordList,
    bkd: Mutex<Option<BackwardsLineScanner<File>>>,
    fwd: Mutex<Option<ForwardsLineScanner<File>>>,
    post_event: Mutex<Option<PostEvent>>,
    projection: Arc<dyn Project>,
    wake: Wake,
}

struct ProducerPair {
    cancel: CancelSource,
    reverse: Option<JoinHandle<()>>,
    forward: Option<JoinHandle<()>>,
}

struct PairSlot {
    pair: Option<ProducerPair>,
    phase: Phase,
}

/// The bidirectional streaming buffer over one log file.
pub struct Buffer {
    shared: Arc<Shared>,
    /// Serializes cancel-then-start sequences (seek, close).
    slot: Mutex<PairSlot>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

impl Buffer {
    /// Open `path` and populate: from the end of the file in follow mode,
    /// from the start otherwise.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be opened or the initial orientation fails.
    pub fn open(
        path: impl AsRef<Path>,
        config: BufferConfig,
        projection: Arc<dyn Project>,
    ) -> Result<Self> {
        let initial = if config.follow {
            SeekFrom::End(0)
        } else {
            SeekFrom::Start(0)
        };

        let buffer = Self {
            shared: Arc::new(Shared {
                path: path.as_ref().to_path_buf(),
                state: Mutex::new(State {
                    width: config.width.max(1),
                    height: config.height.max(1),
                    follow: config.follow,
                    fwd_eager: config.fwd_eager,
                    bkd_eager: config.bkd_eager,
                    wrap_mode: config.wrap_mode,
                    chunk_size: config.chunk_size.max(1),
                    anchored: false,
                    bkd_rewind: None,
                    bkd_stopped: false,
                    fwd_stopped: false,
                    closed: false,
                }),
                records: SharedRecordList::new(),
                bkd: Mutex::new(None),
                fwd: Mutex::new(None),
                post_event: Mutex::new(None),
                projection,
                wake: Wake::new(),
            }),
            slot: Mutex::new(PairSlot {
                pair: None,
                phase: Phase::Idle,
            }),
        };
        buffer.seek_and_populate(initial)?;
        Ok(buffer)
    }

    /// Cancel any running producers, reorient both scanners to `pos`, clear
    /// the cache, and restart population.
    ///
    /// # Errors
    ///
    /// Surfaces orientation I/O errors; the buffer is left valid but empty.
    pub fn seek_and_populate(&self, pos: SeekFrom) -> Result<()> {
        let mut slot = lock(&self.slot);
        if lock(&self.shared.state).closed {
            return Err(BufferError::Closed);
        }

        cancel_pair(&self.shared, &mut slot);
        self.shared.records.with_lock(|r| r.clear());
        {
            let mut st = lock(&self.shared.state);
            st.anchored = false;
            st.bkd_rewind = None;
            st.bkd_stopped = false;
            st.fwd_stopped = false;
        }

        orient(&self.shared, pos)?;
        start_pair(&self.shared, &mut slot)?;
        post_event(&self.shared);
        Ok(())
    }

    /// Scroll the view: positive `lines` scrolls down, negative up.
    ///
    /// Returns the signed number of display lines actually moved, then
    /// wakes the producers so the read-ahead window refills.
    pub fn scroll(&self, lines: isize) -> isize {
        let moved = self.shared.records.with_lock(|r| {
            if lines < 0 {
                -(r.scroll_up(lines.unsigned_abs()) as isize)
            } else {
                r.scroll_down(lines as usize) as isize
            }
        });
        self.shared.wake.notify();
        moved
    }

    /// Update the screen dimensions and re-wrap every cached record.
    ///
    /// # Errors
    ///
    /// Fails on a closed buffer.
    pub fn resize(&self, width: usize, height: usize) -> Result<()> {
        let (width, height) = (width.max(1), height.max(1));
        let mode = {
            let mut st = lock(&self.shared.state);
            if st.closed {
                return Err(BufferError::Closed);
            }
            st.width = width;
            st.height = height;
            st.wrap_mode
        };
        self.shared.records.with_lock(|r| r.rewrap(width, mode));
        self.shared.wake.notify();
        post_event(&self.shared);
        Ok(())
    }

    /// Toggle follow mode.
    ///
    /// Enabling follow anchors the view to the bottom of the cache. If the
    /// tail cache was pruned (the live end is no longer contiguous with the
    /// cache), the buffer re-seeks to the end of the file instead.
    ///
    /// # Errors
    ///
    /// Fails on a closed buffer, or if the re-seek fails.
    pub fn set_follow(&self, follow: bool) -> Result<()> {
        let stale = {
            let mut st = lock(&self.shared.state);
            if st.closed {
                return Err(BufferError::Closed);
            }
            st.follow = follow;
            follow && st.fwd_stopped
        };
        if stale {
            return self.seek_and_populate(SeekFrom::End(0));
        }
        if follow {
            let height = lock(&self.shared.state).height;
            self.shared.records.with_lock(|r| r.scroll_to_bottom(height));
            post_event(&self.shared);
        }
        self.shared.wake.notify();
        Ok(())
    }

    /// Update the read-ahead window sizes (display lines beyond each edge
    /// of the screen).
    ///
    /// # Errors
    ///
    /// Fails on a closed buffer.
    pub fn set_eagerness(&self, fwd: usize, bkd: usize) -> Result<()> {
        {
            let mut st = lock(&self.shared.state);
            if st.closed {
                return Err(BufferError::Closed);
            }
            st.fwd_eager = fwd;
            st.bkd_eager = bkd;
        }
        self.shared.wake.notify();
        Ok(())
    }

    /// Register a best-effort repaint notifier, invoked whenever records
    /// change. Errors and return values of the callback are the caller's
    /// business.
    pub fn set_post_event(&self, callback: impl Fn() + Send + Sync + 'static) {
        *lock(&self.shared.post_event) = Some(Box::new(callback));
    }

    /// Up to `count` display lines starting at the screen cursor.
    #[must_use]
    pub fn lines_to_render(&self, count: usize) -> Vec<String> {
        self.shared.records.with_lock(|r| r.lines_to_render(count))
    }

    /// Cached display lines around a screen of `height` rows.
    #[must_use]
    pub fn screen_lines(&self, height: usize) -> ScreenLines {
        self.shared.records.with_lock(|r| r.screen_lines(height))
    }

    /// Shared handle to the record cache (for the renderer and tests).
    #[must_use]
    pub fn records(&self) -> SharedRecordList {
        self.shared.records.clone()
    }

    #[must_use]
    pub fn follow(&self) -> bool {
        lock(&self.shared.state).follow
    }

    /// Current `(width, height)`.
    #[must_use]
    pub fn size(&self) -> (usize, usize) {
        let st = lock(&self.shared.state);
        (st.width, st.height)
    }

    /// Producer-pair lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        lock(&self.slot).phase
    }

    /// Cancel producers, close both scanners, and refuse further
    /// operations. Idempotent.
    pub fn close(&self) {
        let mut slot = lock(&self.slot);
        cancel_pair(&self.shared, &mut slot);
        if let Some(mut scanner) = lock(&self.shared.bkd).take() {
            scanner.close();
        }
        lock(&self.shared.fwd).take();
        lock(&self.shared.state).closed = true;
        slot.phase = Phase::Terminated;
    }
}

impl Drop for Buffer {
    fn drop(&mut self) {
        self.close();
    }
}

/// Seek to `pos` and align both scanners on a line boundary.
///
/// The backwards scanner is recreated at `pos` and asked for one line: if
/// `pos` lies inside a line this consumes the partial prefix that would
/// otherwise be misattributed, and reports the offset of the line's first
/// byte. The forward handle (reused across reorientations) is re-seeked
/// there, so the two producers never double-emit or split a line.
fn orient(shared: &Shared, pos: SeekFrom) -> Result<()> {
    let (chunk_size, width, mode) = {
        let st = lock(&shared.state);
        (st.chunk_size, st.width, st.wrap_mode)
    };

    if let Some(mut old) = lock(&shared.bkd).take() {
        old.close();
    }

    let file = File::open(&shared.path)?;
    let mut bkd = BackwardsLineScanner::new(file, chunk_size, pos)?;
    let line_start = bkd.read_line()?.offset;

    let mut fwd_guard = lock(&shared.fwd);
    let mut file = match fwd_guard.take() {
        Some(scanner) => scanner.into_inner(),
        None => File::open(&shared.path)?,
    };
    file.seek(SeekFrom::Start(line_start))?;
    let mut fwd = ForwardsLineScanner::new(file);

    // Seed the anchor record: the first line at or after the requested
    // position that survives projection. When it exists the cursor pins to
    // it and backward reads stack up above the screen; when it doesn't (a
    // seek at EOF) backward reads fill the screen bottom-up instead.
    let mut anchored = false;
    let mut at = line_start;
    while fwd.scan() {
        let Some(bytes) = fwd.bytes() else { break };
        let advance = bytes.len() as u64 + 1;
        if let Some(record) =
            Record::build(Some(at), bytes, width, mode, shared.projection.as_ref())
        {
            shared.records.with_lock(|r| r.append(Arc::new(record)));
            anchored = true;
            break;
        }
        at += advance;
    }

    *fwd_guard = Some(fwd);
    drop(fwd_guard);
    *lock(&shared.bkd) = Some(bkd);
    lock(&shared.state).anchored = anchored;
    Ok(())
}

fn cancel_pair(shared: &Shared, slot: &mut PairSlot) {
    if let Some(mut pair) = slot.pair.take() {
        slot.phase = Phase::Cancelling;
        pair.cancel.cancel();
        shared.wake.notify();
        if let Some(handle) = pair.reverse.take() {
            let _ = handle.join();
        }
        if let Some(handle) = pair.forward.take() {
            let _ = handle.join();
        }
        slot.phase = Phase::Idle;
    }
}

fn start_pair(shared: &Arc<Shared>, slot: &mut PairSlot) -> Result<()> {
    let cancel = CancelSource::new();

    let reverse = {
        let shared = Arc::clone(shared);
        let token = cancel.token();
        thread::Builder::new()
            .name("lurk-reverse".into())
            .spawn(move || reverse_producer(&shared, &token))?
    };
    let forward = {
        let shared_clone = Arc::clone(shared);
        let token = cancel.token();
        match thread::Builder::new()
            .name("lurk-forward".into())
            .spawn(move || forward_producer(&shared_clone, &token))
        {
            Ok(handle) => handle,
            Err(e) => {
                cancel.cancel();
                shared.wake.notify();
                let _ = reverse.join();
                return Err(e.into());
            }
        }
    };

    slot.pair = Some(ProducerPair {
        cancel,
        reverse: Some(reverse),
        forward: Some(forward),
    });
    slot.phase = Phase::Running;
    Ok(())
}

fn post_event(shared: &Shared) {
    let guard = lock(&shared.post_event);
    if let Some(callback) = guard.as_ref() {
        callback();
    }
}

/// Reverse producer: drain work, then wait for the next wake.
fn reverse_producer(shared: &Shared, token: &CancelToken) {
    let mut seen = shared.wake.subscribe();
    loop {
        if token.is_cancelled() {
            return;
        }
        if !reverse_drain(shared, token) {
            return;
        }
        shared.wake.wait(&mut seen);
    }
}

/// Read backwards until the target is satisfied or the scanner runs out.
///
/// Returns `false` when the producer must terminate (fatal error).
fn reverse_drain(shared: &Shared, token: &CancelToken) -> bool {
    loop {
        if token.is_cancelled() {
            return true;
        }

        let (height, width, mode, bkd_eager, anchored, rewind, stopped) = {
            let mut st = lock(&shared.state);
            (
                st.height,
                st.width,
                st.wrap_mode,
                st.bkd_eager,
                st.anchored,
                st.bkd_rewind.take(),
                st.bkd_stopped,
            )
        };
        if stopped {
            return true;
        }

        if let Some(offset) = rewind {
            if let Err(e) = rebuild_backward(shared, offset) {
                error!("failed to reopen source at cache edge: {e}");
                post_event(shared);
                return false;
            }
        }

        let target = shared.records.with_lock(|r| {
            let s = r.screen_lines(height);
            bkd_eager.saturating_sub(s.above).max(height - s.on)
        });
        if target == 0 {
            return true;
        }

        let line = {
            let mut guard = lock(&shared.bkd);
            let Some(scanner) = guard.as_mut() else {
                return true;
            };
            if scanner.exhausted() {
                return true;
            }
            scanner.read_line()
        };

        match line {
            Ok(line) => {
                match Record::build(
                    Some(line.offset),
                    &line.bytes,
                    width,
                    mode,
                    shared.projection.as_ref(),
                ) {
                    Some(record) => {
                        let record = Arc::new(record);
                        shared.records.with_lock(|r| {
                            let count = record.line_count();
                            r.prepend(record);
                            if !anchored {
                                // Records pulled from the top must not leave
                                // blank rows when nothing below can fill the
                                // screen.
                                let s = r.screen_lines(height);
                                let fill = (height - s.on).min(count);
                                if fill > 0 {
                                    r.scroll_up(fill);
                                }
                            }
                        });
                        post_event(shared);
                        prune(shared);
                    }
                    None => debug!(offset = line.offset, "record dropped by projection"),
                }
                if line.at_start {
                    return true;
                }
            }
            Err(e) => {
                error!("backwards read failed: {e}");
                post_event(shared);
                return false;
            }
        }
    }
}

/// Rebuild the backwards scanner at a line-start offset (the cache edge
/// after head pruning), so the next line read is contiguous with the head.
fn rebuild_backward(shared: &Shared, offset: u64) -> Result<()> {
    let chunk_size = lock(&shared.state).chunk_size;
    let file = File::open(&shared.path)?;
    let scanner = BackwardsLineScanner::new(file, chunk_size, SeekFrom::Start(offset))?;
    let mut guard = lock(&shared.bkd);
    if let Some(mut old) = guard.take() {
        old.close();
    }
    *guard = Some(scanner);
    Ok(())
}

/// Forward producer: drain work, then wait for the next wake.
fn forward_producer(shared: &Shared, token: &CancelToken) {
    let mut seen = shared.wake.subscribe();
    loop {
        if token.is_cancelled() {
            return;
        }
        if !forward_drain(shared, token) {
            return;
        }
        shared.wake.wait(&mut seen);
    }
}

enum ForwardStep {
    Line(Vec<u8>),
    Eof,
    Fail,
}

/// Read forwards until the target is satisfied, EOF (non-follow), or
/// cancellation (follow).
///
/// Returns `false` when the producer must terminate (fatal error).
fn forward_drain(shared: &Shared, token: &CancelToken) -> bool {
    loop {
        if token.is_cancelled() {
            return true;
        }

        let (height, width, mode, fwd_eager, follow, stopped) = {
            let st = lock(&shared.state);
            (
                st.height,
                st.width,
                st.wrap_mode,
                st.fwd_eager,
                st.follow,
                st.fwd_stopped,
            )
        };
        if stopped {
            return true;
        }

        if !follow {
            let target = shared.records.with_lock(|r| {
                let s = r.screen_lines(height);
                (height - s.on) + fwd_eager.saturating_sub(s.below)
            });
            if target == 0 {
                return true;
            }
        }

        let step = {
            let mut guard = lock(&shared.fwd);
            let Some(scanner) = guard.as_mut() else {
                return true;
            };
            if scanner.scan() {
                match scanner.bytes() {
                    Some(bytes) => ForwardStep::Line(bytes.to_vec()),
                    None => ForwardStep::Eof,
                }
            } else if let Some(e) = scanner.last_error() {
                error!("forwards read failed: {e}");
                ForwardStep::Fail
            } else {
                ForwardStep::Eof
            }
        };

        match step {
            ForwardStep::Line(bytes) => {
                match Record::build(None, &bytes, width, mode, shared.projection.as_ref()) {
                    Some(record) => {
                        shared.records.with_lock(|r| {
                            r.append(Arc::new(record));
                            if follow {
                                r.scroll_to_bottom(height);
                            }
                        });
                        post_event(shared);
                        prune(shared);
                    }
                    None => debug!("record dropped by projection"),
                }
            }
            ForwardStep::Eof => {
                if follow {
                    if token.wait_timeout(FOLLOW_POLL_INTERVAL) {
                        return true;
                    }
                } else {
                    // Nothing more to read until the file grows or follow is
                    // enabled; park on the wake signal.
                    return true;
                }
            }
            ForwardStep::Fail => {
                post_event(shared);
                return false;
            }
        }
    }
}

/// Trim the cache back to the read-ahead window.
///
/// Pops head records while more than `bkd_eager` display lines sit above
/// the screen beyond the head record itself; symmetrically for the tail
/// against `fwd_eager`, but never in follow mode (the tail is the live
/// window). The conditions guarantee the cursor record is never popped.
fn prune(shared: &Shared) {
    let (height, fwd_eager, bkd_eager, follow) = {
        let st = lock(&shared.state);
        (st.height, st.fwd_eager, st.bkd_eager, st.follow)
    };

    let mut head_pruned = false;
    let mut new_head_offset = None;
    let mut tail_pruned = false;

    shared.records.with_lock(|r| {
        let mut s = r.screen_lines(height);
        while let Some(head) = r.first() {
            let count = head.line_count();
            if s.above <= count + bkd_eager {
                break;
            }
            r.pop_first();
            s.above -= count;
            head_pruned = true;
        }
        if head_pruned {
            new_head_offset = r.first().and_then(|h| h.offset());
        }
        if !follow {
            while let Some(tail) = r.last() {
                let count = tail.line_count();
                if s.below <= count + fwd_eager {
                    break;
                }
                r.pop_last();
                s.below -= count;
                tail_pruned = true;
            }
        }
    });

    if head_pruned || tail_pruned {
        let mut st = lock(&shared.state);
        if head_pruned {
            match new_head_offset {
                // Nothing exists above a head that starts at byte 0.
                Some(0) | None => st.bkd_stopped = true,
                Some(offset) => st.bkd_rewind = Some(offset),
            }
        }
        if tail_pruned {
            st.fwd_stopped = true;
        }
    }
}
