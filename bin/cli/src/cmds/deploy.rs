use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(about = "Create a new deploy from the contents of a folder")]
pub(crate) struct DeployCommand {
    #[arg(
        long,
        short,
        help = "The directory to deploy. Defaults to current directory."
    )]
    pub cwd: Option<PathBuf>,

    #[arg(
        long,
        short,
        help = "A site ID to deploy to. Overrides the configured site."
    )]
    pub site: Option<String>,

    #[arg(
        long,
        help = "Compute and print the file digest without contacting the provider"
    )]
    pub dry_run: bool,

    #[arg(
        long,
        help = "Seconds to wait for the deploy to reach a terminal state",
        default_value_t = 300
    )]
    pub timeout: u64,
}
