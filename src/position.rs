/// A board cell. Row 0 is the top row; cell `(row, col)` is bit `row * width + col`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub fn new(row: usize, col: usize) -> Self {
        Position { row, col }
    }

    pub fn from_index(index: usize, width: usize) -> Self {
        Position {
            row: index / width,
            col: index % width,
        }
    }

    pub fn to_index(&self, width: usize) -> usize {
        self.row * width + self.col
    }

    pub fn is_valid(&self, width: usize, height: usize) -> bool {
        self.col < width && self.row < height
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.row, self.col)
    }
}
