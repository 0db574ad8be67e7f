use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{poll, read, Event, KeyCode, KeyModifiers},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{
        disable_raw_mode, enable_raw_mode, size, Clear, ClearType, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use std::io::{self, stdout, Write};
use std::time::Duration;

/// Drawing target for bars: a (row, column) grid of colored glyphs.
///
/// Writes outside the grid are dropped silently.
pub trait Surface {
    /// (width, height) in cells
    fn size(&self) -> (u16, u16);

    fn put(&mut self, row: i32, col: i32, glyph: char, color: Color);

    /// Blank every cell.
    fn clear(&mut self);

    /// Push accumulated writes to wherever the surface is displayed.
    fn flush(&mut self) -> io::Result<()>;
}

/// A single cell in the frame buffer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    pub ch: char,
    pub fg: Option<Color>,
}

impl Default for Cell {
    fn default() -> Self {
        Self { ch: ' ', fg: None }
    }
}

/// In-memory grid of cells.
#[derive(Debug, Clone)]
pub struct FrameBuffer {
    width: u16,
    height: u16,
    cells: Vec<Vec<Cell>>,
}

impl FrameBuffer {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            cells: vec![vec![Cell::default(); width as usize]; height as usize],
        }
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        *self = Self::new(width, height);
    }

    pub fn cell(&self, row: i32, col: i32) -> Option<Cell> {
        if self.contains(row, col) {
            Some(self.cells[row as usize][col as usize])
        } else {
            None
        }
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.iter().map(|row| row.as_slice())
    }

    /// Write a string left to right starting at (row, col)
    pub fn put_str(&mut self, row: i32, col: i32, s: &str, color: Color) {
        for (i, ch) in s.chars().enumerate() {
            self.put(row, col + i as i32, ch, color);
        }
    }

    fn contains(&self, row: i32, col: i32) -> bool {
        row >= 0 && row < self.height as i32 && col >= 0 && col < self.width as i32
    }
}

impl Surface for FrameBuffer {
    fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    fn put(&mut self, row: i32, col: i32, glyph: char, color: Color) {
        if self.contains(row, col) {
            self.cells[row as usize][col as usize] = Cell { ch: glyph, fg: Some(color) };
        }
    }

    fn clear(&mut self) {
        for row in &mut self.cells {
            for cell in row {
                *cell = Cell::default();
            }
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Full-screen crossterm terminal backed by a frame buffer.
pub struct Terminal {
    buffer: FrameBuffer,
}

impl Terminal {
    /// Enter raw mode and the alternate screen; both are undone on drop.
    pub fn new() -> io::Result<Self> {
        let (width, height) = size()?;

        enable_raw_mode()?;
        execute!(stdout(), EnterAlternateScreen, Hide)?;

        Ok(Self {
            buffer: FrameBuffer::new(width, height),
        })
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.buffer.resize(width, height);
    }

    /// Clear the actual terminal
    pub fn clear_screen(&self) -> io::Result<()> {
        execute!(stdout(), Clear(ClearType::All))?;
        Ok(())
    }
}

impl Surface for Terminal {
    fn size(&self) -> (u16, u16) {
        self.buffer.size()
    }

    fn put(&mut self, row: i32, col: i32, glyph: char, color: Color) {
        self.buffer.put(row, col, glyph, color);
    }

    fn clear(&mut self) {
        self.buffer.clear();
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut out = stdout();

        for (y, row) in self.buffer.rows().enumerate() {
            queue!(out, MoveTo(0, y as u16))?;

            for cell in row {
                match cell.fg {
                    Some(color) => queue!(out, SetForegroundColor(color), Print(cell.ch), ResetColor)?,
                    None => queue!(out, Print(cell.ch))?,
                }
            }
        }

        out.flush()
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        let _ = execute!(stdout(), Show, LeaveAlternateScreen);
        let _ = disable_raw_mode();
    }
}

/// Wait up to `timeout` for a keypress, returns (code, modifiers)
pub fn poll_key(timeout: Duration) -> io::Result<Option<(KeyCode, KeyModifiers)>> {
    if poll(timeout)? {
        if let Event::Key(key_event) = read()? {
            return Ok(Some((key_event.code, key_event.modifiers)));
        }
    }
    Ok(None)
}
