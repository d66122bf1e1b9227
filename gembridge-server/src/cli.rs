use clap::Parser;
use std::path::PathBuf;

use gembridge_core::modules::config::CONFIG_FILE;

#[derive(Parser, Debug)]
#[command(
    name = "gembridge",
    about = "gembridge - OpenAI-compatible gateway for Gemini",
    version = env!("CARGO_PKG_VERSION"),
    author
)]
pub struct Cli {
    #[arg(short, long, env = "GEMBRIDGE_CONFIG", default_value = CONFIG_FILE)]
    pub config: PathBuf,

    #[arg(short, long, env = "GEMBRIDGE_PORT", help = "Overrides server.port from the config file")]
    pub port: Option<u16>,

    #[arg(short, long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,
}
