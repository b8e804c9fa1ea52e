// Main entry point
use clap::Parser;
use colored::Colorize;
use pagefetch::application::fetch::fetch_repeatedly;
use pagefetch::infrastructure::config::{self, load_config, Logging};
use pagefetch::interfaces::cli::Cli;
use pagefetch::state::AppState;
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Setup graceful shutdown handler
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            eprintln!("Failed to listen for shutdown signal: {}", e);
        } else {
            eprintln!("\nInterrupted, shutting down...");
            let _ = shutdown_tx.send(());
        }
    });

    let cli = Cli::parse();
    let mut config = load_config();

    if config.logging.enable {
        init_logging(&config.logging)?;
    }

    if cli.generate_config {
        let path = config::get_config_path()
            .ok_or_else(|| anyhow::anyhow!("Cannot determine config directory"))?;
        if config::write_config_sample(&path)? {
            println!("Generated config file at: {}", path.display());
        } else {
            eprintln!("Config file already exists at: {}", path.display());
        }
        return Ok(());
    }

    if cli.insecure {
        config.client.accept_self_signed = true;
    }

    let state = AppState::new(config)?;

    if cli.status {
        print_status(&state);
        return Ok(());
    }

    let Some(url) = cli.url.as_deref() else {
        eprintln!("{}", "Please provide a URL".red());
        std::process::exit(1);
    };

    let json = cli.json;
    let run = fetch_repeatedly(
        &state.fetcher,
        url,
        cli.repeat,
        Duration::from_millis(cli.delay_ms),
        |attempt, result| match result {
            Ok(page) if json => match serde_json::to_string_pretty(&PageMeta::from(page)) {
                Ok(out) => println!("{}", out),
                Err(e) => eprintln!("{}", format!("Failed to encode JSON: {}", e).red()),
            },
            Ok(page) => print!("{}", page.body),
            // everything else was already logged by fetch_repeatedly
            Err(e) if e.is_invalid_input() => {
                eprintln!("{} {}", format!("[{}]", attempt).yellow(), e.to_string().red())
            }
            Err(_) => {}
        },
    );

    let summary = tokio::select! {
        summary = run => summary,
        _ = shutdown_rx => {
            eprintln!("Fetch loop interrupted");
            return Ok(());
        }
    };

    if cli.repeat > 1 {
        eprintln!(
            "{} {} attempts, {} ok, {} failed",
            "Done:".green().bold(),
            summary.attempts,
            summary.succeeded,
            summary.failed
        );
    }

    if summary.succeeded == 0 && summary.attempts > 0 {
        std::process::exit(1);
    }

    Ok(())
}

/// JSON view of a fetched page, body length instead of the body itself
#[derive(serde::Serialize)]
struct PageMeta<'a> {
    url: &'a str,
    status: u16,
    charset: &'a str,
    charset_source: pagefetch::CharsetSource,
    content_length: usize,
    chars: usize,
}

impl<'a> From<&'a pagefetch::FetchedPage> for PageMeta<'a> {
    fn from(page: &'a pagefetch::FetchedPage) -> Self {
        Self {
            url: &page.url,
            status: page.status,
            charset: &page.charset,
            charset_source: page.charset_source,
            content_length: page.content_length,
            chars: page.body.chars().count(),
        }
    }
}

/// Initialize logging with path and level configuration
fn init_logging(logging: &Logging) -> anyhow::Result<()> {
    use tracing_subscriber::EnvFilter;

    let level = logging.level_directive();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if let Some(path) = &logging.path {
        if !path.is_empty() {
            // Log to file
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(file)
                .init();
            return Ok(());
        }
    }

    // Log to stderr (default)
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

fn print_status(state: &AppState) {
    println!("{}", "pagefetch Status".green().bold());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    println!(
        "Config: {}",
        config::get_config_path()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "Not found".to_string())
    );

    let client = state.fetcher.config();
    println!(
        "Pool: {} total / {} per route",
        client.max_total_connections, client.max_connections_per_route
    );
    println!(
        "Timeouts: socket {}s, connect {}s, acquire {}s",
        client.socket_timeout_secs,
        client.connect_timeout_secs,
        client.connection_request_timeout_secs
    );
    println!("TLS SNI: {}", if client.tls_sni { "on" } else { "off" });
    if client.accept_self_signed {
        println!("Certificates: {}", "not verified (self-signed accepted)".yellow());
    } else {
        println!("Certificates: verified");
    }
    match client.http_proxy.as_deref() {
        Some(proxy) if !proxy.is_empty() => println!("Proxy: {}", proxy),
        _ => println!("Proxy: none"),
    }
    let logging = &state.config.logging;
    println!(
        "Logging: {} ({})",
        logging.level,
        if logging.enable { "on" } else { "off" }
    );
}
