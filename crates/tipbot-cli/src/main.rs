use anyhow::Result;
use clap::Parser;
use tipbot_cli::{execute_tool_command, init_tracing, BotSettings, Cli};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_filter.as_deref());
    let settings = BotSettings::from_cli(&cli);
    let output = execute_tool_command(&settings, &cli.command)?;
    println!("{output}");
    Ok(())
}
