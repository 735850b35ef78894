//! Paints the buffer's visible lines onto the terminal.

use std::io::{self, Write};

use crossterm::cursor::MoveTo;
use crossterm::style::Print;
use crossterm::terminal::{Clear, ClearType};

use lurk_text::{display_width, truncate_to_width};

/// Draw `lines` on a `width` × `height` screen, one per row, clearing
/// whatever each row held before. Rows past the last line are cleared.
pub fn draw(out: &mut impl Write, lines: &[String], width: u16, height: u16) -> io::Result<()> {
    for row in 0..height {
        crossterm::queue!(out, MoveTo(0, row), Clear(ClearType::CurrentLine))?;
        if let Some(line) = lines.get(row as usize) {
            // Wrapped lines already fit; unwrapped ones are clipped so the
            // terminal never auto-wraps underneath us.
            if display_width(line) > width as usize {
                crossterm::queue!(out, Print(truncate_to_width(line, width as usize)))?;
            } else {
                crossterm::queue!(out, Print(line))?;
            }
        }
    }
    out.flush()
}
