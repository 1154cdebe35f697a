use clap::Parser;

/// taskboard — kanban board for a remote task service
#[derive(Parser, Debug, Clone)]
#[command(name = "taskboard", version, about)]
pub struct Cli {
    /// Base address of the task service (default: http://localhost:8082)
    #[arg(long)]
    pub base_url: Option<String>,

    /// UI tick in milliseconds; how often completed requests are picked up
    #[arg(long)]
    pub tick_rate_ms: Option<u64>,

    /// File that receives the log output (default: taskboard.log)
    #[arg(long)]
    pub log_file: Option<String>,

    /// Path to config file (default: taskboard.toml, optional)
    #[arg(long)]
    pub config: Option<String>,
}
