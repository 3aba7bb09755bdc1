use tracing::trace;

use crate::bignum::Bignum;
use crate::board::Board;
use crate::player::Player;

/// Tactical category of a candidate move, strongest first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MoveClass {
    /// Completes a line now.
    Winning,
    /// Creates two one-move-away threats at once.
    Fork,
    /// Shared by two or more two-away threats.
    PotentialFork,
    /// One of the two cells a line still needs.
    Check,
    /// Keeps a longer open line alive.
    Good,
}

/// Candidate moves for one player, bucketed by [`MoveClass`]. Empty buckets are `None`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SortedMoves {
    pub winning: Option<Bignum>,
    pub fork: Option<Bignum>,
    pub potential_forks: Option<Bignum>,
    pub checks: Option<Bignum>,
    pub good_moves: Option<Bignum>,
}

impl SortedMoves {
    pub fn get(&self, class: MoveClass) -> Option<Bignum> {
        match class {
            MoveClass::Winning => self.winning,
            MoveClass::Fork => self.fork,
            MoveClass::PotentialFork => self.potential_forks,
            MoveClass::Check => self.checks,
            MoveClass::Good => self.good_moves,
        }
    }

    /// Non-empty buckets in priority order.
    pub fn iter(&self) -> impl Iterator<Item = (MoveClass, Bignum)> + '_ {
        [
            MoveClass::Winning,
            MoveClass::Fork,
            MoveClass::PotentialFork,
            MoveClass::Check,
            MoveClass::Good,
        ]
        .into_iter()
        .filter_map(|class| self.get(class).map(|cells| (class, cells)))
    }

    /// The strongest non-empty category.
    pub fn best_class(&self) -> Option<MoveClass> {
        self.iter().next().map(|(class, _)| class)
    }

    /// The lowest cell of the strongest non-empty category.
    pub fn best_move(&self) -> Option<Bignum> {
        self.iter().next().map(|(_, cells)| cells.lowest_bit())
    }

    pub fn is_empty(&self) -> bool {
        self.best_class().is_none()
    }
}

impl Board {
    /// Classify the moves available to `player` by scanning every win-line.
    ///
    /// Lines holding none of `player`'s stones, or any of the opponent's, are skipped.
    /// For the rest, the cells still needed decide the bucket: one cell is an immediate
    /// win and ends the scan; two cells are a check, and a check sharing exactly one
    /// cell with an earlier check makes that cell a fork; more go to good moves.
    #[cfg_attr(feature = "hotpath", hotpath::measure)]
    pub fn sort_possible_moves(&self, player: Player) -> SortedMoves {
        let mine = self.stones(player);
        let theirs = self.stones(player.opposite());
        let zero = Bignum::zero(self.word_count());

        let mut fork: Option<Bignum> = None;
        let mut potential_forks = zero;
        let mut checks = zero;
        let mut good_moves = zero;

        for &line in self.wins() {
            let own = line & mine;
            if own.is_zero() {
                continue;
            }
            let need = own ^ line;
            if !(need & theirs).is_zero() {
                continue;
            }

            match need.count() {
                // A full line already belongs to `player`.
                0 => {}
                1 => {
                    trace!(%player, "winning move found");
                    return SortedMoves {
                        winning: Some(need),
                        ..SortedMoves::default()
                    };
                }
                2 => {
                    let shared = need & checks;
                    if shared.is_zero() {
                        checks |= need;
                    } else {
                        if fork.is_none() && shared.count() == 1 {
                            fork = Some(shared);
                        }
                        potential_forks |= shared;
                    }
                }
                _ => good_moves |= need,
            }
        }

        let sorted = SortedMoves {
            winning: None,
            fork,
            potential_forks: potential_forks.non_zero(),
            checks: checks.non_zero(),
            good_moves: good_moves.non_zero(),
        };
        trace!(%player, best = ?sorted.best_class(), "classified moves");
        sorted
    }
}
