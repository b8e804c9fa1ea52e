use clap::Parser;

#[derive(Parser)]
#[command(name = "pagefetch")]
#[command(about = "Fetch a web page and print it decoded with the right charset.")]
#[command(version)]
pub struct Cli {
    /// Fetch the URL this many times
    #[arg(short = 'r', long, default_value_t = 1)]
    pub repeat: usize,

    /// Delay between repeated fetches, in milliseconds
    #[arg(short = 'd', long, default_value_t = 4000)]
    pub delay_ms: u64,

    /// Output page metadata as JSON instead of the body
    #[arg(long)]
    pub json: bool,

    /// Accept self-signed certificates for this run
    #[arg(short = 'k', long)]
    pub insecure: bool,

    /// Generate config sample
    #[arg(long)]
    pub generate_config: bool,

    /// Show status
    #[arg(long)]
    pub status: bool,

    /// URL to fetch
    pub url: Option<String>,
}
