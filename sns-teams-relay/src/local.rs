use clap::Parser;
use sns_teams_relay::{cli, Settings};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[clap(name = "local", about = "Run the SNS to Teams relay outside Lambda")]
struct Cli {
    /// Optional settings file; environment variables take precedence
    #[clap(short, long, env = "RELAY_CONFIG")]
    config: Option<PathBuf>,

    #[clap(subcommand)]
    cmd: Cmd,
}

#[derive(Debug, clap::Subcommand)]
enum Cmd {
    Replay(cli::replay::Cmd),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = Settings::new(cli.config.as_ref())?;

    match cli.cmd {
        Cmd::Replay(cmd) => cmd.run(&settings).await,
    }
}
