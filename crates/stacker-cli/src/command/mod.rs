use clap::{Parser, Subcommand};

use self::{bag::BagArg, simulate::SimulateArg};

mod bag;
mod simulate;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What to run
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Print a seeded piece sequence from the 7-bag randomizer
    Bag(#[clap(flatten)] BagArg),
    /// Play a seeded headless game with random inputs and report the result
    Simulate(#[clap(flatten)] SimulateArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::Bag(arg) => bag::run(&arg)?,
        Mode::Simulate(arg) => simulate::run(&arg)?,
    }
    Ok(())
}
