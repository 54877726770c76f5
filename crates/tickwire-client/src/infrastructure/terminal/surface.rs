//! A character-cell drawing surface.
//!
//! Each cell stands for `CELL_WIDTH` x `CELL_HEIGHT` logical pixels, so a
//! 640x480 game maps onto an 80x34 grid and a text line (14 px) onto exactly
//! one row.  Anything drawn outside the grid is clipped.

use crate::application::game::Surface;

/// Logical pixels per cell, horizontally.
pub const CELL_WIDTH: i32 = 8;
/// Logical pixels per cell, vertically.  Matches the game's line height.
pub const CELL_HEIGHT: i32 = 14;

const BLANK: char = ' ';
const BLOCK: char = '█';

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellSurface {
    cols: usize,
    rows: usize,
    cells: Vec<char>,
}

impl CellSurface {
    pub fn new(cols: usize, rows: usize) -> Self {
        Self {
            cols,
            rows,
            cells: vec![BLANK; cols * rows],
        }
    }

    /// A grid covering a `width` x `height` pixel screen.
    pub fn for_screen(width: i32, height: i32) -> Self {
        let cols = usize::try_from(width / CELL_WIDTH).unwrap_or(0);
        let rows = usize::try_from(height / CELL_HEIGHT).unwrap_or(0);
        Self::new(cols, rows)
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn clear(&mut self) {
        self.cells.fill(BLANK);
    }

    /// The characters of `row`, or `None` past the last row.
    pub fn row_text(&self, row: usize) -> Option<String> {
        if row >= self.rows {
            return None;
        }
        let start = row * self.cols;
        Some(self.cells[start..start + self.cols].iter().collect())
    }

    fn col_of(&self, x: i32) -> Option<usize> {
        usize::try_from(x.div_euclid(CELL_WIDTH))
            .ok()
            .filter(|col| *col < self.cols)
    }

    fn row_of(&self, y: i32) -> Option<usize> {
        usize::try_from(y.div_euclid(CELL_HEIGHT))
            .ok()
            .filter(|row| *row < self.rows)
    }

    fn set(&mut self, col: usize, row: usize, ch: char) {
        if col < self.cols && row < self.rows {
            self.cells[row * self.cols + col] = ch;
        }
    }
}

impl Surface for CellSurface {
    fn fill_rect(&mut self, x: i32, y: i32, width: i32, height: i32) {
        if width <= 0 || height <= 0 {
            return;
        }
        let max_col = i32::try_from(self.cols).unwrap_or(i32::MAX) - 1;
        let max_row = i32::try_from(self.rows).unwrap_or(i32::MAX) - 1;
        let first_col = x.div_euclid(CELL_WIDTH).max(0);
        let last_col = x.saturating_add(width - 1).div_euclid(CELL_WIDTH).min(max_col);
        let first_row = y.div_euclid(CELL_HEIGHT).max(0);
        let last_row = y.saturating_add(height - 1).div_euclid(CELL_HEIGHT).min(max_row);

        for row in first_row..=last_row {
            for col in first_col..=last_col {
                if let (Ok(col), Ok(row)) = (usize::try_from(col), usize::try_from(row)) {
                    self.set(col, row, BLOCK);
                }
            }
        }
    }

    fn draw_text(&mut self, text: &str, x: i32, y: i32) {
        let Some(row) = self.row_of(y) else {
            return;
        };
        // Text starting left of the grid keeps its visible tail.
        let skip = usize::try_from((-x).div_euclid(CELL_WIDTH).max(0)).unwrap_or(0);
        let start = self.col_of(x.max(0)).unwrap_or(self.cols);
        for (offset, ch) in text.chars().skip(skip).enumerate() {
            let col = start + offset;
            if col >= self.cols {
                break;
            }
            self.set(col, row, ch);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_screen_is_80_by_34() {
        let surface = CellSurface::for_screen(640, 480);
        assert_eq!((surface.cols(), surface.rows()), (80, 34));
    }

    #[test]
    fn test_text_lands_on_its_row() {
        // Arrange
        let mut surface = CellSurface::new(10, 3);

        // Act: y = 28 is the third row
        surface.draw_text("hello", 8, 28);

        // Assert
        assert_eq!(surface.row_text(2).unwrap(), " hello    ");
        assert_eq!(surface.row_text(0).unwrap(), " ".repeat(10));
    }

    #[test]
    fn test_text_is_clipped_at_right_edge() {
        let mut surface = CellSurface::new(4, 1);
        surface.draw_text("overflowing", 0, 0);
        assert_eq!(surface.row_text(0).unwrap(), "over");
    }

    #[test]
    fn test_offscreen_text_is_ignored() {
        let mut surface = CellSurface::new(4, 1);
        surface.draw_text("above", 0, -14);
        surface.draw_text("below", 0, 14);
        assert_eq!(surface.row_text(0).unwrap(), "    ");
    }

    #[test]
    fn test_player_square_covers_overlapping_cells() {
        // Arrange
        let mut surface = CellSurface::new(6, 4);

        // Act: 20x20 at (8, 14) spans cols 1..=3, rows 1..=2
        surface.fill_rect(8, 14, 20, 20);

        // Assert
        assert_eq!(surface.row_text(0).unwrap(), "      ");
        assert_eq!(surface.row_text(1).unwrap(), " ███  ");
        assert_eq!(surface.row_text(2).unwrap(), " ███  ");
        assert_eq!(surface.row_text(3).unwrap(), "      ");
    }

    #[test]
    fn test_clear_blanks_everything() {
        let mut surface = CellSurface::new(3, 1);
        surface.fill_rect(0, 0, 24, 14);
        surface.clear();
        assert_eq!(surface.row_text(0).unwrap(), "   ");
    }
}
