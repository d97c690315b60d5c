use std::fmt;
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;

/// Errors produced while reading a puzzle grid.
#[derive(Debug, Error)]
pub enum GridParseError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("empty grid")]
    Empty,
    #[error("line {line}: expected {expected} cells, found {found}")]
    RaggedRow {
        line: usize,
        expected: usize,
        found: usize,
    },
    #[error("line {line}: invalid cell '{token}'")]
    InvalidCell { line: usize, token: String },
    #[error("line {line}: island degree {degree} out of range 1..8")]
    DegreeOutOfRange { line: usize, degree: u32 },
}

/// An island: a grid cell with a required bridge count.
///
/// Islands are numbered in row-major scan order; `index` is stable for the
/// whole solve and doubles as the node id in connectivity checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Island {
    pub index: usize,
    pub row: usize,
    pub col: usize,
    pub degree: u8,
}

/// A rectangular puzzle grid. Cell value 0 is water, 1..8 is an island with
/// that required degree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    cells: Vec<Vec<u8>>,
}

impl Grid {
    /// Parse a puzzle from text: one row per line, cells separated by `,`
    /// with optional whitespace.
    pub fn from_text(text: &str) -> Result<Self, GridParseError> {
        let mut cells: Vec<Vec<u8>> = Vec::new();

        for (line_no, line) in text.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            let mut row = Vec::new();
            for token in trimmed.split(',') {
                let token = token.trim();
                let value: u32 =
                    token
                        .parse()
                        .map_err(|_| GridParseError::InvalidCell {
                            line: line_no + 1,
                            token: token.to_string(),
                        })?;
                if value > 8 {
                    return Err(GridParseError::DegreeOutOfRange {
                        line: line_no + 1,
                        degree: value,
                    });
                }
                row.push(value as u8);
            }

            if let Some(first) = cells.first()
                && first.len() != row.len()
            {
                return Err(GridParseError::RaggedRow {
                    line: line_no + 1,
                    expected: first.len(),
                    found: row.len(),
                });
            }
            cells.push(row);
        }

        if cells.is_empty() {
            return Err(GridParseError::Empty);
        }
        Ok(Grid { cells })
    }

    /// Read a puzzle from a file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, GridParseError> {
        let content = fs::read_to_string(path)?;
        Self::from_text(&content)
    }

    pub fn rows(&self) -> usize {
        self.cells.len()
    }

    pub fn cols(&self) -> usize {
        self.cells[0].len()
    }

    pub fn value(&self, row: usize, col: usize) -> u8 {
        self.cells[row][col]
    }

    pub fn in_bounds(&self, row: isize, col: isize) -> bool {
        row >= 0 && (row as usize) < self.rows() && col >= 0 && (col as usize) < self.cols()
    }

    /// Enumerate islands in row-major scan order with sequential indices.
    pub fn islands(&self) -> Vec<Island> {
        let mut islands = Vec::new();
        for (r, row) in self.cells.iter().enumerate() {
            for (c, &degree) in row.iter().enumerate() {
                if degree > 0 {
                    islands.push(Island {
                        index: islands.len(),
                        row: r,
                        col: c,
                        degree,
                    });
                }
            }
        }
        islands
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.cells.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            for (j, cell) in row.iter().enumerate() {
                if j > 0 {
                    write!(f, " ")?;
                }
                write!(f, "{cell}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_text() {
        let grid = Grid::from_text("0,2,0\n2, 0, 2\n0,2,0").unwrap();
        assert_eq!(grid.rows(), 3);
        assert_eq!(grid.cols(), 3);
        assert_eq!(grid.value(1, 2), 2);

        let islands = grid.islands();
        assert_eq!(islands.len(), 4);
        // Row-major scan order, dense indices.
        assert_eq!(islands[0].index, 0);
        assert_eq!((islands[0].row, islands[0].col), (0, 1));
        assert_eq!((islands[3].row, islands[3].col), (2, 1));
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let err = Grid::from_text("1,2\n3").unwrap_err();
        assert!(matches!(err, GridParseError::RaggedRow { line: 2, .. }));
    }

    #[test]
    fn test_bad_cell_rejected() {
        assert!(matches!(
            Grid::from_text("1,x"),
            Err(GridParseError::InvalidCell { .. })
        ));
        assert!(matches!(
            Grid::from_text("1,9"),
            Err(GridParseError::DegreeOutOfRange { degree: 9, .. })
        ));
    }

    #[test]
    fn test_empty_input_rejected() {
        assert!(matches!(Grid::from_text("\n  \n"), Err(GridParseError::Empty)));
    }
}
