use std::env;
use std::time::Duration;

use clap::Parser;
use skiff_cli::cmd::deploy::DeployOptions;
use skiff_cli::cmd::{archive, deploy};
use skiff_cli::poll;
use skiff_cli::settings::Settings;
use tracing::error;

use crate::cmds::{Command, Opt};
use crate::output::{print_output, Output};

mod cmds;
mod output;

fn main() {
    let opt = Opt::parse();

    let tracing_level = if opt.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt::fmt()
        .with_max_level(tracing_level)
        .init();

    let output = opt.output.unwrap_or_default();

    if let Err(e) = run(opt.cmd, output) {
        error!("{e}");
        std::process::exit(1);
    }
}

fn run(cmd: Command, output: Output) -> anyhow::Result<()> {
    let settings = Settings::load()?;

    match cmd {
        Command::Archive(cmd) => {
            let dir = match cmd.cwd {
                Some(cwd) => cwd,
                None => env::current_dir()?,
            };
            let report = archive::invoke(&settings, cmd.site, &dir)?;
            print_output(output, report)
        }
        Command::Deploy(cmd) => {
            let dir = match cmd.cwd {
                Some(cwd) => cwd,
                None => env::current_dir()?,
            };
            let opts = DeployOptions {
                dry_run: cmd.dry_run,
                timeout: Duration::from_secs(cmd.timeout),
                interval: poll::DEFAULT_POLL_INTERVAL,
            };
            let outcome = deploy::invoke(&settings, cmd.site, &dir, &opts)?;
            print_output(output, outcome)
        }
    }
}
