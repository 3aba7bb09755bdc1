use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::bignum::{Bignum, MAX_WORDS};
use crate::board::Board;
use crate::player::Player;
use crate::position::Position;

impl Serialize for Bignum {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.words().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Bignum {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let words = Vec::<u64>::deserialize(deserializer)?;
        if words.is_empty() || words.len() > MAX_WORDS {
            return Err(D::Error::custom(format!(
                "Bignum needs between 1 and {} words, got {}",
                MAX_WORDS,
                words.len()
            )));
        }
        Ok(Bignum::from_words(&words))
    }
}

impl Serialize for Player {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_char(self.to_char())
    }
}

impl<'de> Deserialize<'de> for Player {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let c = char::deserialize(deserializer)?;
        Player::from_char(c).ok_or_else(|| D::Error::custom(format!("Invalid player: {}", c)))
    }
}

fn cells_to_string(board: &Board, set: &Bignum) -> String {
    board
        .positions(set)
        .iter()
        .map(|p| p.to_string())
        .collect::<Vec<_>>()
        .join(";")
}

fn parse_cells<E: serde::de::Error>(s: &str) -> Result<Vec<Position>, E> {
    if s.trim().is_empty() {
        return Ok(Vec::new());
    }
    s.split(';')
        .map(|cell| {
            let (row, col) = cell
                .trim()
                .split_once(',')
                .ok_or_else(|| E::custom(format!("Invalid cell format: {}", cell)))?;
            let row: usize = row
                .trim()
                .parse()
                .map_err(|e| E::custom(format!("Invalid row: {}", e)))?;
            let col: usize = col
                .trim()
                .parse()
                .map_err(|e| E::custom(format!("Invalid column: {}", e)))?;
            Ok(Position::new(row, col))
        })
        .collect()
}

/// Boards serialize as `"WxH/L:<x cells>|<o cells>"`, cells written `row,col` and
/// separated by `;`.
impl Serialize for Board {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let full = format!(
            "{}x{}/{}:{}|{}",
            self.width(),
            self.height(),
            self.line(),
            cells_to_string(self, &self.stones(Player::X)),
            cells_to_string(self, &self.stones(Player::O)),
        );
        serializer.serialize_str(&full)
    }
}

impl<'de> Deserialize<'de> for Board {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;

        let (dims, stones) = s
            .split_once(':')
            .ok_or_else(|| D::Error::custom("Missing ':' after board dimensions"))?;
        let (size, line) = dims
            .split_once('/')
            .ok_or_else(|| D::Error::custom("Missing '/' before line length"))?;
        let (w, h) = size
            .split_once('x')
            .ok_or_else(|| D::Error::custom("Invalid dimensions format"))?;
        let width: i32 = w
            .parse()
            .map_err(|e| D::Error::custom(format!("Invalid width: {}", e)))?;
        let height: i32 = h
            .parse()
            .map_err(|e| D::Error::custom(format!("Invalid height: {}", e)))?;
        let line: i32 = line
            .parse()
            .map_err(|e| D::Error::custom(format!("Invalid line: {}", e)))?;

        let mut board = Board::new(width, height, line);
        let normalized = (board.width(), board.height(), board.line());
        if normalized != (width as usize, height as usize, line as usize) {
            return Err(D::Error::custom(format!(
                "Board {}x{}/{} is not a normalized geometry",
                width, height, line
            )));
        }

        let (xs, os) = stones
            .split_once('|')
            .ok_or_else(|| D::Error::custom("Missing '|' between X and O cells"))?;

        for (cells, player) in [(xs, Player::X), (os, Player::O)] {
            for pos in parse_cells::<D::Error>(cells)? {
                if !pos.is_valid(board.width(), board.height()) {
                    return Err(D::Error::custom(format!("Cell {} is off the board", pos)));
                }
                let mv = board.move_at(pos.row, pos.col);
                board
                    .try_make_move(&mv, player)
                    .map_err(|e| D::Error::custom(format!("Invalid cell {}: {}", pos, e)))?;
            }
        }

        Ok(board)
    }
}
