use crate::bignum::Bignum;
use crate::player::Player;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameOutcome {
    XWin,
    OWin,
    Draw,
}

impl GameOutcome {
    pub fn winner(&self) -> Option<Player> {
        match self {
            GameOutcome::XWin => Some(Player::X),
            GameOutcome::OWin => Some(Player::O),
            GameOutcome::Draw => None,
        }
    }

    pub fn encode_winner_absolute(&self) -> f32 {
        match self {
            GameOutcome::XWin => 1.0,
            GameOutcome::OWin => -1.0,
            GameOutcome::Draw => 0.0,
        }
    }

    pub fn encode_winner_from_perspective(&self, perspective: Player) -> f32 {
        match perspective {
            Player::X => self.encode_winner_absolute(),
            Player::O => -self.encode_winner_absolute(),
        }
    }

    pub fn is_draw(&self) -> bool {
        matches!(self, GameOutcome::Draw)
    }
}

impl std::fmt::Display for GameOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameOutcome::XWin => write!(f, "X wins"),
            GameOutcome::OWin => write!(f, "O wins"),
            GameOutcome::Draw => write!(f, "Draw"),
        }
    }
}

/// Terminal evaluation of a position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameState {
    Unfinished,
    /// `line` is the first fully-owned win-line in enumeration order.
    Won { player: Player, line: Bignum },
    Draw,
}

impl GameState {
    pub fn is_over(&self) -> bool {
        !matches!(self, GameState::Unfinished)
    }

    pub fn outcome(&self) -> Option<GameOutcome> {
        match self {
            GameState::Unfinished => None,
            GameState::Won {
                player: Player::X, ..
            } => Some(GameOutcome::XWin),
            GameState::Won {
                player: Player::O, ..
            } => Some(GameOutcome::OWin),
            GameState::Draw => Some(GameOutcome::Draw),
        }
    }

    pub fn winning_line(&self) -> Option<Bignum> {
        match self {
            GameState::Won { line, .. } => Some(*line),
            _ => None,
        }
    }
}
