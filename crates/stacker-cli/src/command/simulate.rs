use std::{path::PathBuf, time::Duration};

use clap::Args;
use rand::Rng;
use serde::Serialize;
use stacker_engine::{
    Block, Board, EngineConfig, PieceKind, PieceSeed, PieceState, RotationDirection, ScoreState,
};

use crate::{
    session::{Session, SessionState},
    util::{self, Output},
};

/// Simulated time between two inputs.
const FRAME: Duration = Duration::from_millis(16);

#[derive(Debug, Clone, Args)]
pub struct SimulateArg {
    /// Seed as 32 hex digits (random when omitted)
    #[arg(long)]
    seed: Option<PieceSeed>,
    /// Stop after this many pieces have locked
    #[arg(long, default_value_t = 100)]
    pieces: u32,
    /// Engine config JSON file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Output file path (stdout when omitted)
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize)]
struct SimulationReport {
    seed: PieceSeed,
    config: EngineConfig,
    frames: u64,
    pieces_locked: u32,
    state: SessionState,
    score: ScoreState,
    falling: PieceState,
    held: Option<PieceKind>,
    next: String,
    lock_moves: u8,
    board: Vec<String>,
}

/// Number of upcoming pieces shown in the report.
const PREVIEW_LEN: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Left,
    Right,
    RotateRight,
    RotateLeft,
    SoftDrop,
    HardDrop,
    Hold,
    Idle,
}

impl Action {
    fn sample<R>(rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        match rng.random_range(0..100) {
            0..15 => Action::Left,
            15..30 => Action::Right,
            30..40 => Action::RotateRight,
            40..50 => Action::RotateLeft,
            50..60 => Action::SoftDrop,
            60..63 => Action::HardDrop,
            63..65 => Action::Hold,
            _ => Action::Idle,
        }
    }
}

pub fn run(arg: &SimulateArg) -> anyhow::Result<()> {
    let config = util::load_config(arg.config.as_deref())?;
    let seed = arg.seed.unwrap_or_else(|| rand::rng().random());
    tracing::info!(%seed, pieces = arg.pieces, "starting simulation");

    let report = simulate(config, seed, arg.pieces);
    tracing::info!(
        pieces_locked = report.pieces_locked,
        score = report.score.score,
        level = report.score.level,
        game_over = report.state.is_game_over(),
        "simulation finished"
    );
    Output::save_json(&report, arg.output.clone())
}

fn simulate(config: EngineConfig, seed: PieceSeed, pieces: u32) -> SimulationReport {
    let mut session = Session::new(config, seed);
    // Inputs use their own stream so they never shift the piece sequence.
    let mut input_rng = PieceSeed::from_u128(!seed.as_u128()).rng();
    let mut frames = 0;

    while session.session_state().is_playing() && session.pieces_locked() < pieces {
        let action = Action::sample(&mut input_rng);
        // Rejected inputs are part of normal play.
        let _ = match action {
            Action::Left => session.try_move_left(),
            Action::Right => session.try_move_right(),
            Action::RotateRight => session.try_rotate(RotationDirection::Clockwise),
            Action::RotateLeft => session.try_rotate(RotationDirection::CounterClockwise),
            Action::SoftDrop => session.try_soft_drop(),
            Action::HardDrop => session.hard_drop().map(|_| ()),
            Action::Hold => session.try_hold(),
            Action::Idle => Ok(()),
        };
        session.advance(FRAME);
        frames += 1;
    }

    SimulationReport {
        seed,
        config,
        frames,
        pieces_locked: session.pieces_locked(),
        state: session.session_state(),
        score: *session.score(),
        falling: *session.falling_piece(),
        held: session.held_piece(),
        next: session
            .next_pieces()
            .take(PREVIEW_LEN)
            .map(PieceKind::as_char)
            .collect(),
        lock_moves: session.lock_delay().moves(),
        board: render_rows(session.board()),
    }
}

/// Visible rows as text: `.` empty, `#` solid, piece letter for locked pieces.
fn render_rows(board: &Board) -> Vec<String> {
    board
        .visible_rows()
        .iter()
        .map(|row| {
            row.iter()
                .map(|block| match block {
                    Block::Empty => '.',
                    Block::Solid => '#',
                    Block::Piece(kind) => kind.as_char(),
                })
                .collect()
        })
        .collect()
}
