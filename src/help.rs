use crate::terminal::Surface;
use crossterm::style::Color;

/// Help text for the equalizer
pub const HELP: &str = "\
TERMEQ
─────────────────
r    Reset peaks
!@#$) Color scheme
?    Toggle help
q    Quit";

/// Render a centered help overlay box with the provided text.
pub fn render_help_overlay<S: Surface + ?Sized>(surface: &mut S, width: u16, height: u16, help_text: &str) {
    if help_text.is_empty() {
        return;
    }

    let lines: Vec<&str> = help_text.lines().collect();
    let max_width = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    let box_width = max_width + 4; // 2 chars padding each side
    let box_height = lines.len() + 2; // 1 row padding top/bottom

    let left = ((width as usize).saturating_sub(box_width) / 2) as i32;
    let top = ((height as usize).saturating_sub(box_height) / 2) as i32;
    let right = left + box_width as i32 - 1;
    let bottom = top + box_height as i32 - 1;

    let border_color = Color::White;
    let text_color = Color::Grey;

    // ┌─────┐
    surface.put(top, left, '┌', border_color);
    surface.put(top, right, '┐', border_color);
    surface.put(bottom, left, '└', border_color);
    surface.put(bottom, right, '┘', border_color);
    for col in left + 1..right {
        surface.put(top, col, '─', border_color);
        surface.put(bottom, col, '─', border_color);
    }

    for (i, line) in lines.iter().enumerate() {
        let row = top + 1 + i as i32;
        surface.put(row, left, '│', border_color);

        let padding = max_width.saturating_sub(line.chars().count());
        let padded = format!(" {}{} ", line, " ".repeat(padding));
        for (j, ch) in padded.chars().enumerate() {
            surface.put(row, left + 1 + j as i32, ch, text_color);
        }

        surface.put(row, right, '│', border_color);
    }
}
