pub mod bignum;
pub mod board;
pub mod config;
pub mod error;
pub mod outcome;
pub mod player;
pub mod position;
pub mod serde_support;
pub mod tactics;

#[cfg(feature = "python")]
extern crate pyo3;

#[cfg(feature = "python")]
use pyo3::prelude::*;

#[cfg(feature = "python")]
#[pymodule(gil_used = false)]
fn spooky_tictactoe(m: &Bound<'_, PyModule>) -> PyResult<()> {
    use player::Player;
    use python_bindings::*;
    m.add_class::<PyBoard>()?;
    m.add_class::<PySortedMoves>()?;
    m.add("X", Player::X as i8)?;
    m.add("O", Player::O as i8)?;
    m.add("MAX_SIDE", board::MAX_SIDE)?;
    Ok(())
}

#[cfg(feature = "python")]
mod python_bindings {
    use super::*;
    use crate::bignum::Bignum;
    use crate::board::Board;
    use crate::outcome::GameState;
    use crate::player::Player;
    use crate::tactics::SortedMoves;

    type Cell = (usize, usize);

    fn to_player(value: i8) -> PyResult<Player> {
        Player::from_int(value).ok_or_else(|| {
            PyErr::new::<pyo3::exceptions::PyValueError, _>("player must be X (1) or O (-1)")
        })
    }

    fn to_cells(board: &Board, set: Option<Bignum>) -> Vec<Cell> {
        set.map(|set| {
            board
                .positions(&set)
                .into_iter()
                .map(|p| (p.row, p.col))
                .collect()
        })
        .unwrap_or_default()
    }

    #[pyclass(name = "Board")]
    #[derive(Clone)]
    pub struct PyBoard {
        board: Board,
    }

    impl PyBoard {
        fn checked_move(&self, row: usize, col: usize) -> PyResult<Bignum> {
            if row >= self.board.height() || col >= self.board.width() {
                return Err(PyErr::new::<pyo3::exceptions::PyIndexError, _>(format!(
                    "cell ({}, {}) is outside the board",
                    row, col
                )));
            }
            Ok(self.board.move_at(row, col))
        }
    }

    #[pymethods]
    impl PyBoard {
        #[new]
        #[pyo3(signature = (width=3, height=3, line=0))]
        pub fn new(width: i32, height: i32, line: i32) -> Self {
            PyBoard {
                board: Board::new(width, height, line),
            }
        }

        pub fn width(&self) -> usize {
            self.board.width()
        }

        pub fn height(&self) -> usize {
            self.board.height()
        }

        pub fn line(&self) -> usize {
            self.board.line()
        }

        pub fn cell_state(&self, row: usize, col: usize) -> PyResult<Option<i8>> {
            self.checked_move(row, col)?;
            Ok(self.board.cell_state(row, col).map(|p| p as i8))
        }

        pub fn make_move(&mut self, row: usize, col: usize, player: i8) -> PyResult<bool> {
            let mv = self.checked_move(row, col)?;
            Ok(self.board.make_move(&mv, to_player(player)?))
        }

        pub fn undo_move(&mut self, row: usize, col: usize, player: i8) -> PyResult<()> {
            let mv = self.checked_move(row, col)?;
            self.board.undo_move(&mv, to_player(player)?);
            Ok(())
        }

        /// Returns `(winner, line)`: winner is 1, -1, 0 for a draw, or None while
        /// unfinished.
        pub fn terminal_state(&self) -> (Option<i8>, Vec<Cell>) {
            match self.board.terminal_state() {
                GameState::Unfinished => (None, Vec::new()),
                GameState::Draw => (Some(0), Vec::new()),
                GameState::Won { player, line } => {
                    (Some(player as i8), to_cells(&self.board, Some(line)))
                }
            }
        }

        pub fn possible_moves(&self) -> Vec<Cell> {
            to_cells(&self.board, Some(self.board.empty_cells()))
        }

        pub fn sort_possible_moves(&self, player: i8) -> PyResult<PySortedMoves> {
            let sorted = self.board.sort_possible_moves(to_player(player)?);
            Ok(PySortedMoves::from_sorted(&self.board, &sorted))
        }

        pub fn clear(&mut self) {
            self.board.clear()
        }

        pub fn __str__(&self) -> String {
            self.board.to_string()
        }

        pub fn __repr__(&self) -> String {
            format!(
                "Board(width={}, height={}, line={})",
                self.board.width(),
                self.board.height(),
                self.board.line()
            )
        }
    }

    #[pyclass(name = "SortedMoves", get_all)]
    #[derive(Clone, Debug)]
    pub struct PySortedMoves {
        winning: Vec<Cell>,
        fork: Vec<Cell>,
        potential_forks: Vec<Cell>,
        checks: Vec<Cell>,
        good_moves: Vec<Cell>,
        best_move: Option<Cell>,
    }

    impl PySortedMoves {
        fn from_sorted(board: &Board, sorted: &SortedMoves) -> Self {
            PySortedMoves {
                winning: to_cells(board, sorted.winning),
                fork: to_cells(board, sorted.fork),
                potential_forks: to_cells(board, sorted.potential_forks),
                checks: to_cells(board, sorted.checks),
                good_moves: to_cells(board, sorted.good_moves),
                best_move: to_cells(board, sorted.best_move()).first().copied(),
            }
        }
    }

    #[pymethods]
    impl PySortedMoves {
        pub fn __repr__(&self) -> String {
            format!("{:?}", self)
        }
    }
}
