use clap::{Parser, Subcommand};

use crate::cmds::archive::ArchiveCommand;
use crate::cmds::deploy::DeployCommand;
use crate::output::{parse_output, Output};

pub mod archive;
pub mod deploy;

#[derive(Debug, Parser)]
#[command(
    name = "Skiff",
    about = "Deploy static sites through content-addressed digest uploads"
)]
pub struct Opt {
    #[arg(
        long,
        help = "Prints a verbose output during the program execution",
        global = true
    )]
    pub debug: bool,

    #[arg(
        long,
        short,
        value_parser = parse_output,
        help = "How a command output should be rendered",
        global = true
    )]
    pub output: Option<Output>,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    Archive(ArchiveCommand),
    Deploy(DeployCommand),
}
