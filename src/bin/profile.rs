use std::path::PathBuf;

use clap::Parser;
use rand::prelude::IndexedRandom;
use rand::rngs::StdRng;
use rand::SeedableRng;
use spooky_tictactoe::bignum::Bignum;
use spooky_tictactoe::board::Board;
use spooky_tictactoe::config::BoardConfig;
use spooky_tictactoe::error::ConfigError;
use spooky_tictactoe::outcome::GameOutcome;
use spooky_tictactoe::player::Player;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Self-play driven by the move classifier, for profiling.
#[derive(Parser, Debug)]
#[command(name = "profile")]
struct Args {
    #[arg(long, default_value_t = 15)]
    width: i32,
    #[arg(long, default_value_t = 15)]
    height: i32,
    #[arg(long, default_value_t = 5)]
    line: i32,
    /// TOML board config; overrides the size flags.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, default_value_t = 100)]
    games: usize,
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

/// Win now, else block the opponent's win, else play a random cell from the
/// strongest category, else any empty cell.
fn choose_move(board: &Board, player: Player, rng: &mut StdRng) -> Option<Bignum> {
    let own = board.sort_possible_moves(player);
    if let Some(winning) = own.winning {
        return Some(winning);
    }
    if let Some(block) = board.sort_possible_moves(player.opposite()).winning {
        return Some(block);
    }
    let candidates = match own.iter().next() {
        Some((_, cells)) => cells.extract_set_bits(),
        None => board.possible_moves(),
    };
    candidates.choose(rng).copied()
}

#[cfg_attr(feature = "hotpath", hotpath::main)]
fn main() -> Result<(), ConfigError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let template = match &args.config {
        Some(path) => BoardConfig::load(path)?.build()?,
        None => Board::new(args.width, args.height, args.line),
    };
    info!(
        width = template.width(),
        height = template.height(),
        line = template.line(),
        games = args.games,
        "starting self-play"
    );

    let mut rng = StdRng::seed_from_u64(args.seed);
    let (mut x_wins, mut o_wins, mut draws) = (0usize, 0usize, 0usize);
    let mut total_plies = 0usize;

    for game in 0..args.games {
        let mut board = template.clone();
        let mut player = Player::X;
        let outcome = loop {
            if let Some(outcome) = board.terminal_state().outcome() {
                break outcome;
            }
            let Some(mv) = choose_move(&board, player, &mut rng) else {
                break GameOutcome::Draw;
            };
            if !board.make_move(&mv, player) {
                break GameOutcome::Draw;
            }
            total_plies += 1;
            player = player.opposite();
        };
        debug!(game, %outcome, "game finished");
        match outcome {
            GameOutcome::XWin => x_wins += 1,
            GameOutcome::OWin => o_wins += 1,
            GameOutcome::Draw => draws += 1,
        }
    }

    info!(x_wins, o_wins, draws, total_plies, "self-play complete");
    Ok(())
}
