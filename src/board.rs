use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use tracing::{debug, trace};

use crate::bignum::{Bignum, WORD_BITS};
use crate::error::MoveError;
use crate::outcome::GameState;
use crate::player::Player;
use crate::position::Position;

/// Largest supported board side.
pub const MAX_SIDE: usize = 15;

/// Side length substituted for a zero (after wrapping) input.
pub const DEFAULT_SIDE: usize = 3;

/// Number of win-lines on a `width × height` board with runs of `line`.
pub const fn win_line_count(width: usize, height: usize, line: usize) -> usize {
    height * (width - line + 1)
        + width * (height - line + 1)
        + 2 * (height - line + 1) * (width - line + 1)
}

/// Wrap a requested side length into `1..=MAX_SIDE`: absolute value modulo
/// `MAX_SIDE + 1`, with 0 replaced by `DEFAULT_SIDE`.
pub fn normalize_side(side: i32) -> usize {
    let side = (side % (MAX_SIDE as i32 + 1)).unsigned_abs() as usize;
    if side == 0 {
        DEFAULT_SIDE
    } else {
        side
    }
}

/// A generalized tic-tac-toe board stored as bit vectors.
///
/// Width is always at least height. Cell `(row, col)` is bit `row * width + col`.
/// The win-line masks are computed once and shared between clones.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    width: usize,
    height: usize,
    line: usize,
    word_count: usize,
    x: Bignum,
    o: Bignum,
    filled: Bignum,
    wins: Arc<[Bignum]>,
}

impl Hash for Board {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.x.hash(state);
        self.o.hash(state);
        self.width.hash(state);
        self.height.hash(state);
        self.line.hash(state);
    }
}

impl Board {
    /// Build an empty board. Out-of-range inputs are normalized rather than rejected:
    /// sides go through [`normalize_side`], a taller-than-wide board is transposed, and
    /// a `line` outside `1..=height` becomes `height`.
    ///
    /// Use [`BoardConfig::build`](crate::config::BoardConfig::build) for strict validation.
    pub fn new(width: i32, height: i32, line: i32) -> Self {
        let mut width = normalize_side(width);
        let mut height = normalize_side(height);
        if height > width {
            std::mem::swap(&mut width, &mut height);
        }
        let line = if line <= 0 || line as usize > height {
            height
        } else {
            line as usize
        };
        Self::with_geometry(width, height, line)
    }

    fn with_geometry(width: usize, height: usize, line: usize) -> Self {
        let area = width * height;
        let word_count = area.div_ceil(WORD_BITS);

        let mut filled = Bignum::zero(word_count);
        let mut one = Bignum::one(word_count);
        for _ in 0..area {
            filled.or(&one);
            one.shift(1);
        }

        let wins = win_lines(width, height, line, word_count);
        debug_assert_eq!(wins.len(), win_line_count(width, height, line));
        debug!(width, height, line, word_count, wins = wins.len(), "built board");

        Board {
            width,
            height,
            line,
            word_count,
            x: Bignum::zero(word_count),
            o: Bignum::zero(word_count),
            filled,
            wins: wins.into(),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Length of a winning run.
    pub fn line(&self) -> usize {
        self.line
    }

    /// Words per bit vector on this board.
    pub fn word_count(&self) -> usize {
        self.word_count
    }

    /// Every win-line mask, horizontals first, then verticals, then diagonal pairs.
    pub fn wins(&self) -> &[Bignum] {
        &self.wins
    }

    /// Mask of every playable cell.
    pub fn filled_mask(&self) -> Bignum {
        self.filled
    }

    #[inline]
    pub fn stones(&self, player: Player) -> Bignum {
        match player {
            Player::X => self.x,
            Player::O => self.o,
        }
    }

    #[inline]
    fn stones_mut(&mut self, player: Player) -> &mut Bignum {
        match player {
            Player::X => &mut self.x,
            Player::O => &mut self.o,
        }
    }

    #[inline]
    pub fn occupied(&self) -> Bignum {
        self.x | self.o
    }

    /// Mask of every empty cell.
    #[inline]
    pub fn empty_cells(&self) -> Bignum {
        self.occupied() ^ self.filled
    }

    /// Single-cell move at `(row, col)`. Panics if the cell is off the board.
    pub fn move_at(&self, row: usize, col: usize) -> Bignum {
        let pos = Position::new(row, col);
        assert!(
            pos.is_valid(self.width, self.height),
            "cell ({}, {}) is outside a {}x{} board",
            row,
            col,
            self.width,
            self.height
        );
        Bignum::single(self.word_count, pos.to_index(self.width))
    }

    /// Who occupies `(row, col)`, if anyone. Panics if the cell is off the board.
    pub fn cell_state(&self, row: usize, col: usize) -> Option<Player> {
        let mask = self.move_at(row, col);
        if !(mask & self.x).is_zero() {
            Some(Player::X)
        } else if !(mask & self.o).is_zero() {
            Some(Player::O)
        } else {
            None
        }
    }

    /// Cells of `set` as positions, in index order.
    pub fn positions(&self, set: &Bignum) -> Vec<Position> {
        set.iter_ones()
            .map(|index| Position::from_index(index, self.width))
            .collect()
    }

    /// Place `player`'s stone on the single cell of `mv`.
    pub fn try_make_move(&mut self, mv: &Bignum, player: Player) -> Result<(), MoveError> {
        let count = mv.count();
        if count != 1 {
            return Err(MoveError::NotSingleCell { count });
        }
        if !(*mv & !self.filled).is_zero() {
            return Err(MoveError::OffBoard);
        }
        if !(*mv & self.occupied()).is_zero() {
            return Err(MoveError::Occupied);
        }
        self.stones_mut(player).or(mv);
        Ok(())
    }

    /// Like [`Board::try_make_move`], reporting only whether the move was applied.
    pub fn make_move(&mut self, mv: &Bignum, player: Player) -> bool {
        match self.try_make_move(mv, player) {
            Ok(()) => true,
            Err(err) => {
                trace!(%player, %err, "rejected move");
                false
            }
        }
    }

    /// Take back a move. The caller must have applied `mv` for `player` and not yet
    /// undone it; no check is made.
    #[inline]
    pub fn undo_move(&mut self, mv: &Bignum, player: Player) {
        self.stones_mut(player).xor(mv);
    }

    /// Remove every stone.
    pub fn clear(&mut self) {
        self.x = Bignum::zero(self.word_count);
        self.o = Bignum::zero(self.word_count);
    }

    /// Win for whoever owns a complete line (first line found), otherwise draw on a
    /// full board, otherwise unfinished.
    #[cfg_attr(feature = "hotpath", hotpath::measure)]
    pub fn terminal_state(&self) -> GameState {
        for &line in self.wins.iter() {
            if (line & self.x) == line {
                return GameState::Won {
                    player: Player::X,
                    line,
                };
            }
            if (line & self.o) == line {
                return GameState::Won {
                    player: Player::O,
                    line,
                };
            }
        }
        if self.occupied() == self.filled {
            GameState::Draw
        } else {
            GameState::Unfinished
        }
    }

    /// Every empty cell as a single-cell move, lowest index first.
    pub fn possible_moves(&self) -> Vec<Bignum> {
        self.empty_cells().extract_set_bits()
    }

    /// Render with the cells of `cells` drawn as `*`.
    pub fn highlight<'a>(&'a self, cells: &'a Bignum) -> Highlight<'a> {
        Highlight { board: self, cells }
    }

    fn write_rows(&self, f: &mut fmt::Formatter<'_>, overlay: Option<&Bignum>) -> fmt::Result {
        for row in 0..self.height {
            for col in 0..self.width {
                let index = row * self.width + col;
                let c = if overlay.is_some_and(|cells| cells.get(index)) {
                    '*'
                } else {
                    match self.cell_state(row, col) {
                        Some(player) => player.to_char(),
                        None => '_',
                    }
                };
                write!(f, "|{}", c)?;
            }
            writeln!(f, "|")?;
        }
        Ok(())
    }
}

fn win_lines(width: usize, height: usize, line: usize, word_count: usize) -> Vec<Bignum> {
    let mut wins = Vec::with_capacity(win_line_count(width, height, line));
    let bit = |index: usize| Bignum::single(word_count, index);

    // Horizontals
    let mut horizontal = Bignum::zero(word_count);
    for i in 0..line {
        horizontal.or(&bit(i));
    }
    for col in 0..=width - line {
        for row in 0..height {
            wins.push(horizontal.shifted((row * width + col) as isize));
        }
    }

    // Verticals
    let mut vertical = Bignum::zero(word_count);
    for i in 0..line {
        vertical.or(&bit(i * width));
    }
    for row in 0..=height - line {
        for col in 0..width {
            wins.push(vertical.shifted((row * width + col) as isize));
        }
    }

    // Diagonals. The down-left base starts in the last column so that placing it
    // only ever shifts right by the anchor column.
    let mut down_right = Bignum::zero(word_count);
    let mut down_left = Bignum::zero(word_count);
    for i in 0..line {
        down_right.or(&bit(i * width + i));
        down_left.or(&bit(i * width + width - 1 - i));
    }
    for col in 0..=width - line {
        for row in 0..=height - line {
            wins.push(down_right.shifted((row * width + col) as isize));
            wins.push(
                down_left
                    .shifted((row * width) as isize)
                    .shifted(-(col as isize)),
            );
        }
    }

    wins
}

impl Default for Board {
    fn default() -> Self {
        Self::with_geometry(DEFAULT_SIDE, DEFAULT_SIDE, DEFAULT_SIDE)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_rows(f, None)
    }
}

/// A board rendering with a set of cells overlaid.
pub struct Highlight<'a> {
    board: &'a Board,
    cells: &'a Bignum,
}

impl fmt::Display for Highlight<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.board.write_rows(f, Some(self.cells))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::prelude::IndexedRandom;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn play(board: &mut Board, cells: &[(usize, usize)], player: Player) {
        for &(row, col) in cells {
            let mv = board.move_at(row, col);
            assert!(board.make_move(&mv, player), "({}, {}) rejected", row, col);
        }
    }

    macro_rules! win_line_tests {
        ($(($w:literal, $h:literal, $l:literal)),* $(,)?) => {
            paste::paste! {
                $(
                    #[test]
                    fn [<test_win_lines_ $w x $h _line $l>]() {
                        let board = Board::new($w, $h, $l);
                        let (w, h, l) = (board.width(), board.height(), board.line());
                        assert_eq!(board.wins().len(), win_line_count(w, h, l));

                        let filled = board.filled_mask();
                        let mut seen = HashSet::new();
                        for win in board.wins() {
                            assert_eq!(win.count() as usize, l);
                            assert_eq!(*win & filled, *win, "line leaves the board");
                            assert!(seen.insert(*win) || l == 1, "duplicate line");
                        }
                    }
                )*
            }
        };
    }

    win_line_tests!(
        (3, 3, 3),
        (4, 4, 3),
        (5, 3, 3),
        (3, 5, 2),
        (7, 6, 4),
        (8, 8, 5),
        (9, 9, 5),
        (15, 15, 5),
        (15, 10, 10),
        (6, 1, 1),
    );

    #[test]
    fn test_normalization() {
        let board = Board::new(-5, 0, 0);
        assert_eq!((board.width(), board.height(), board.line()), (5, 3, 3));

        let board = Board::new(17, 4, 9);
        assert_eq!((board.width(), board.height(), board.line()), (4, 1, 1));

        let board = Board::new(16, -16, -2);
        assert_eq!((board.width(), board.height(), board.line()), (3, 3, 3));

        let board = Board::new(3, 7, 2);
        assert_eq!((board.width(), board.height(), board.line()), (7, 3, 2));
    }

    #[test]
    fn test_word_count() {
        assert_eq!(Board::new(3, 3, 3).word_count(), 1);
        assert_eq!(Board::new(8, 8, 3).word_count(), 1);
        assert_eq!(Board::new(9, 8, 3).word_count(), 2);
        assert_eq!(Board::new(15, 15, 5).word_count(), 4);
    }

    #[test]
    fn test_filled_mask() {
        for (w, h) in [(3, 3), (8, 8), (15, 15), (11, 7)] {
            let board = Board::new(w, h, 3);
            let filled = board.filled_mask();
            let area = board.width() * board.height();
            assert_eq!(filled.count() as usize, area);
            assert_eq!(filled.lowest_bit_index(), Some(0));
            assert!(filled.iter_ones().all(|i| i < area));
        }
    }

    #[test]
    fn test_3x3_win_masks() {
        let board = Board::default();
        let masks: HashSet<u64> = board.wins().iter().map(|w| w.words()[0]).collect();
        let expected: HashSet<u64> = [
            0b000_000_111,
            0b000_111_000,
            0b111_000_000,
            0b001_001_001,
            0b010_010_010,
            0b100_100_100,
            0b100_010_001,
            0b001_010_100,
        ]
        .into_iter()
        .collect();
        assert_eq!(masks, expected);
    }

    #[test]
    fn test_diagonals_do_not_wrap() {
        let board = Board::new(5, 4, 3);
        for win in board.wins() {
            let cells = board.positions(win);
            let rows: HashSet<usize> = cells.iter().map(|p| p.row).collect();
            let cols: HashSet<usize> = cells.iter().map(|p| p.col).collect();
            let row_span = cells.iter().map(|p| p.row).max().expect("cells")
                - cells.iter().map(|p| p.row).min().expect("cells");
            let col_span = cells.iter().map(|p| p.col).max().expect("cells")
                - cells.iter().map(|p| p.col).min().expect("cells");
            // Every line is straight: one row, one column, or one cell per row and column.
            assert!(
                rows.len() == 1 || cols.len() == 1 || (rows.len() == 3 && cols.len() == 3),
                "bent line {:?}",
                cells
            );
            assert!(row_span <= 2 && col_span <= 2);
        }
    }

    #[test]
    fn test_cell_state() {
        let mut board = Board::default();
        play(&mut board, &[(0, 0)], Player::X);
        play(&mut board, &[(2, 1)], Player::O);
        assert_eq!(board.cell_state(0, 0), Some(Player::X));
        assert_eq!(board.cell_state(2, 1), Some(Player::O));
        assert_eq!(board.cell_state(1, 1), None);
    }

    #[test]
    #[should_panic(expected = "outside")]
    fn test_cell_state_out_of_range() {
        Board::default().cell_state(3, 0);
    }

    #[test]
    fn test_make_move_rejections() {
        let mut board = Board::default();
        let mv = board.move_at(1, 1);
        assert!(board.make_move(&mv, Player::X));
        assert!(!board.make_move(&mv, Player::O));
        assert_eq!(board.try_make_move(&mv, Player::X), Err(MoveError::Occupied));
        assert_eq!(board.cell_state(1, 1), Some(Player::X));

        let pair = board.move_at(0, 0) | board.move_at(0, 1);
        assert_eq!(
            board.try_make_move(&pair, Player::O),
            Err(MoveError::NotSingleCell { count: 2 })
        );
        assert_eq!(
            board.try_make_move(&Bignum::zero(1), Player::O),
            Err(MoveError::NotSingleCell { count: 0 })
        );
        assert_eq!(
            board.try_make_move(&Bignum::single(1, 9), Player::O),
            Err(MoveError::OffBoard)
        );
        assert_eq!(board.stones(Player::O), Bignum::zero(1));
    }

    #[test]
    fn test_undo_restores_exactly() {
        let mut board = Board::new(9, 9, 5);
        play(&mut board, &[(4, 4), (0, 8)], Player::X);
        let before = board.clone();
        let mv = board.move_at(8, 8);
        assert!(board.make_move(&mv, Player::O));
        assert_ne!(board, before);
        board.undo_move(&mv, Player::O);
        assert_eq!(board, before);
    }

    #[test]
    fn test_x_wins_top_row() {
        let mut board = Board::default();
        play(&mut board, &[(0, 0), (0, 1), (0, 2)], Player::X);
        let expected = board.move_at(0, 0) | board.move_at(0, 1) | board.move_at(0, 2);
        assert_eq!(
            board.terminal_state(),
            GameState::Won {
                player: Player::X,
                line: expected
            }
        );
    }

    #[test]
    fn test_o_wins_anti_diagonal() {
        let mut board = Board::default();
        play(&mut board, &[(0, 0), (0, 1), (1, 0)], Player::X);
        play(&mut board, &[(0, 2), (1, 1), (2, 0)], Player::O);
        let state = board.terminal_state();
        assert_eq!(state.outcome(), Some(crate::outcome::GameOutcome::OWin));
        let line = state.winning_line().expect("winning line");
        assert_eq!(
            board.positions(&line),
            vec![Position::new(0, 2), Position::new(1, 1), Position::new(2, 0)]
        );
    }

    #[test]
    fn test_draw() {
        // X O X
        // X O O
        // O X X
        let mut board = Board::default();
        play(&mut board, &[(0, 0), (0, 2), (1, 0), (2, 1), (2, 2)], Player::X);
        play(&mut board, &[(0, 1), (1, 1), (1, 2), (2, 0)], Player::O);
        assert_eq!(board.terminal_state(), GameState::Draw);
        assert!(board.possible_moves().is_empty());
    }

    #[test]
    fn test_unfinished() {
        let mut board = Board::new(4, 4, 3);
        assert_eq!(board.terminal_state(), GameState::Unfinished);
        play(&mut board, &[(0, 0), (1, 1)], Player::X);
        assert_eq!(board.terminal_state(), GameState::Unfinished);
    }

    #[test]
    fn test_possible_moves() {
        let mut board = Board::default();
        assert_eq!(board.possible_moves().len(), 9);
        play(&mut board, &[(0, 0)], Player::X);
        play(&mut board, &[(2, 2)], Player::O);
        let moves = board.possible_moves();
        assert_eq!(moves.len(), 7);
        assert!(moves.iter().all(|m| m.count() == 1));
        assert_eq!(moves[0], board.move_at(0, 1));
        assert!(!moves.contains(&board.move_at(2, 2)));
    }

    #[test]
    fn test_random_playouts_keep_invariants() {
        let mut rng = StdRng::seed_from_u64(99);
        for &(w, h, l) in &[(3, 3, 3), (7, 6, 4), (15, 15, 5)] {
            for _ in 0..10 {
                let mut board = Board::new(w, h, l);
                let mut player = Player::X;
                let mut history = Vec::new();
                while !board.terminal_state().is_over() {
                    let moves = board.possible_moves();
                    let mv = *moves.choose(&mut rng).expect("unfinished board has moves");
                    let before = board.clone();
                    assert!(board.make_move(&mv, player));
                    assert!((board.stones(Player::X) & board.stones(Player::O)).is_zero());

                    board.undo_move(&mv, player);
                    assert_eq!(board, before);
                    assert!(board.make_move(&mv, player));

                    history.push((mv, player));
                    player = player.opposite();
                }
                while let Some((mv, player)) = history.pop() {
                    board.undo_move(&mv, player);
                }
                assert!(board.occupied().is_zero());
            }
        }
    }

    #[test]
    fn test_clones_are_independent() {
        let board = Board::default();
        let mut copy = board.clone();
        play(&mut copy, &[(1, 1)], Player::X);
        assert_eq!(board.cell_state(1, 1), None);
        assert_eq!(copy.cell_state(1, 1), Some(Player::X));
    }

    #[test]
    fn test_display() {
        let mut board = Board::default();
        play(&mut board, &[(0, 0)], Player::X);
        play(&mut board, &[(1, 2)], Player::O);
        assert_eq!(board.to_string(), "|X|_|_|\n|_|_|O|\n|_|_|_|\n");

        let cells = board.move_at(2, 0) | board.move_at(2, 2);
        assert_eq!(
            board.highlight(&cells).to_string(),
            "|X|_|_|\n|_|_|O|\n|*|_|*|\n"
        );
    }
}
