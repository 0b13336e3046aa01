use std::path::PathBuf;

use clap::Args;
use rand::Rng as _;
use serde::Serialize;
use stacker_engine::{PieceBag, PieceKind, PieceSeed};

use crate::util::Output;

#[derive(Debug, Clone, Args)]
pub struct BagArg {
    /// Seed as 32 hex digits (random when omitted)
    #[arg(long)]
    seed: Option<PieceSeed>,
    /// Number of pieces to draw
    #[arg(long, default_value_t = 14)]
    count: usize,
    /// Output file path (stdout when omitted)
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct BagReport {
    seed: PieceSeed,
    pieces: String,
}

pub fn run(arg: &BagArg) -> anyhow::Result<()> {
    let seed = arg.seed.unwrap_or_else(|| rand::rng().random());
    let pieces = draw_sequence(seed, arg.count);
    tracing::info!(%seed, count = pieces.len(), "drew piece sequence");
    let report = BagReport {
        seed,
        pieces: pieces.iter().map(|kind| kind.as_char()).collect(),
    };
    Output::save_json(&report, arg.output.clone())
}

fn draw_sequence(seed: PieceSeed, count: usize) -> Vec<PieceKind> {
    let mut rng = seed.rng();
    let mut bag = PieceBag::new();
    let mut pieces = Vec::with_capacity(count);
    for _ in 0..count {
        let (kind, rest) = bag.draw_next(&mut rng);
        pieces.push(kind);
        bag = rest;
    }
    pieces
}
