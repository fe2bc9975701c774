use std::io::{stdout, Stdout, Write};

use crossterm::{cursor, terminal, ExecutableCommand, Result};

use crate::modules::elevator::ElevatorSnapshot;

const MIN_CELL_WIDTH: usize = 25;

/// What the frame shows for one floor.
#[derive(Debug, Clone, Default)]
pub struct FloorView {
    pub waiting: bool,
    pub elevators: Vec<ElevatorSnapshot>,
}

/// Renders one frame, top floor first:
///
/// ```text
/// +----------------frame-0----------------------+
/// | floor  1:         [A()->1]                  |
/// | floor  0: waiting []                        |
/// +---------------------------------------------+
/// ```
pub fn format_frame(frame: usize, floors: &[FloorView]) -> String {
    let cells: Vec<String> = floors
        .iter()
        .map(|view| {
            let names: Vec<String> = view.elevators.iter().map(|e| e.to_string()).collect();
            format!("[{}]", names.join(", "))
        })
        .collect();
    let cell_width = cells.iter().map(|c| c.len()).max().unwrap_or(0).max(MIN_CELL_WIDTH);

    let rows: Vec<String> = floors
        .iter()
        .zip(&cells)
        .enumerate()
        .rev()
        .map(|(floor, (view, cell))| {
            let button = if view.waiting { "waiting" } else { "" };
            format!("| floor {:>2}: {:<7} {:<width$} |", floor, button, cell, width = cell_width)
        })
        .collect();
    let inner_width = rows.first().map(|r| r.len() - 2).unwrap_or(cell_width + 20);

    let title = format!("----------------frame-{}", frame);
    let mut out = String::new();
    out.push('+');
    out.push_str(&title);
    out.push_str(&"-".repeat(inner_width.saturating_sub(title.len())));
    out.push_str("+\n");
    for row in &rows {
        out.push_str(row);
        out.push('\n');
    }
    out.push('+');
    out.push_str(&"-".repeat(inner_width));
    out.push_str("+\n");
    out
}

pub struct Debug {
    stdout: Stdout,
    frame: usize,
    last_height: u16,
}

impl Debug {
    pub fn new() -> Self {
        Debug {
            stdout: stdout(),
            frame: 0,
            last_height: 0,
        }
    }

    /// Redraws the state frame over the previous one.
    pub fn print_state(&mut self, floors: &[FloorView]) -> Result<()> {
        if self.last_height > 0 {
            self.stdout.execute(cursor::MoveUp(self.last_height))?;
            self.stdout.execute(terminal::Clear(terminal::ClearType::FromCursorDown))?;
        }
        let frame = format_frame(self.frame, floors);
        write!(self.stdout, "{}", frame)?;
        self.stdout.flush()?;
        self.last_height = frame.lines().count() as u16;
        self.frame += 1;
        Ok(())
    }
}

impl Default for Debug {
    fn default() -> Self {
        Debug::new()
    }
}
