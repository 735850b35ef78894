//! The interactive event loop: keys in, painted lines out.

use std::io::{self, SeekFrom, Write};
use std::sync::mpsc::Receiver;
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tracing::warn;

use lurk_buffer::Buffer;

use crate::render;

/// How long to block on terminal input before draining repaint events.
const INPUT_POLL: Duration = Duration::from_millis(50);

enum Action {
    None,
    Redraw,
    Quit,
}

/// Drives the viewer: terminal events scroll and re-seek the buffer,
/// repaint notifications from the producers trigger redraws.
pub struct App {
    buffer: Arc<Buffer>,
    repaint: Receiver<()>,
    width: u16,
    height: u16,
}

impl App {
    pub fn new(buffer: Arc<Buffer>, repaint: Receiver<()>, width: u16, height: u16) -> Self {
        Self {
            buffer,
            repaint,
            width,
            height,
        }
    }

    /// Run until the user quits.
    ///
    /// # Errors
    ///
    /// Terminal I/O failures end the loop.
    pub fn run(&mut self, out: &mut impl Write) -> io::Result<()> {
        let mut dirty = true;
        loop {
            if dirty {
                self.draw(out)?;
                dirty = false;
            }

            if crossterm::event::poll(INPUT_POLL)? {
                match crossterm::event::read()? {
                    Event::Key(key) if key.kind != KeyEventKind::Release => {
                        match self.handle_key(key) {
                            Action::Quit => return Ok(()),
                            Action::Redraw => dirty = true,
                            Action::None => {}
                        }
                    }
                    Event::Resize(width, height) => {
                        self.width = width;
                        self.height = height;
                        if let Err(e) = self.buffer.resize(width as usize, height as usize) {
                            warn!("resize failed: {e}");
                        }
                        let height = height as usize;
                        if let Err(e) = self.buffer.set_eagerness(2 * height, 2 * height) {
                            warn!("eagerness update failed: {e}");
                        }
                        dirty = true;
                    }
                    _ => {}
                }
            }

            while self.repaint.try_recv().is_ok() {
                dirty = true;
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Action {
        let page = (self.height as isize - 1).max(1);
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Action::Quit,
            KeyCode::Char('j') | KeyCode::Down => self.scroll(1),
            KeyCode::Char('k') | KeyCode::Up => self.scroll(-1),
            KeyCode::Char(' ') | KeyCode::PageDown => self.scroll(page),
            KeyCode::PageUp => self.scroll(-page),
            KeyCode::Char('g') => {
                self.quietly(|b| {
                    b.set_follow(false)?;
                    b.seek_and_populate(SeekFrom::Start(0))
                });
                Action::Redraw
            }
            KeyCode::Char('G') => {
                self.quietly(|b| b.seek_and_populate(SeekFrom::End(0)));
                Action::Redraw
            }
            KeyCode::Char('f') => {
                let follow = !self.buffer.follow();
                self.quietly(|b| b.set_follow(follow));
                Action::Redraw
            }
            _ => Action::None,
        }
    }

    fn scroll(&self, lines: isize) -> Action {
        // Scrolling by hand leaves follow mode; the user is looking at
        // history now.
        if lines < 0 && self.buffer.follow() {
            self.quietly(|b| b.set_follow(false));
        }
        if self.buffer.scroll(lines) != 0 {
            Action::Redraw
        } else {
            Action::None
        }
    }

    fn quietly(&self, f: impl FnOnce(&Buffer) -> lurk_buffer::Result<()>) {
        if let Err(e) = f(&self.buffer) {
            warn!("viewer action failed: {e}");
        }
    }

    fn draw(&self, out: &mut impl Write) -> io::Result<()> {
        let lines = self.buffer.lines_to_render(self.height as usize);
        render::draw(out, &lines, self.width, self.height)
    }
}
