use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(about = "Zip a folder and upload it wholesale as a build artifact")]
pub(crate) struct ArchiveCommand {
    #[arg(
        long,
        short,
        help = "The directory to archive. Defaults to current directory."
    )]
    pub cwd: Option<PathBuf>,

    #[arg(
        long,
        short,
        help = "A site ID to deploy to. Overrides the configured site."
    )]
    pub site: Option<String>,
}
