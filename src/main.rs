//! site-chat main entry point
//!
//! This is the command-line interface: an interactive chat about one website,
//! plus one-shot commands for asking, refreshing and inspecting the content.

use clap::{Parser, Subcommand};
use site_chat::config::{load_config_with_hash, Config};
use site_chat::output::{print_status, write_markdown_export};
use site_chat::{ChatReply, Session, SiteChatError};
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::EnvFilter;

/// site-chat: ask questions about a website
///
/// site-chat crawls a single site, keeps its paragraph text as context, and
/// answers questions about it through a hosted language model. The content
/// is cached, stored in SQLite and refreshed periodically.
#[derive(Parser, Debug)]
#[command(name = "site-chat")]
#[command(version)]
#[command(about = "Chat with a language model about a website", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, value_name = "PATH", default_value = "site-chat.toml")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    /// Validate config and show what would be crawled without doing it
    #[arg(long)]
    dry_run: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive chat (default)
    Chat,

    /// Ask a single question and exit
    Ask {
        /// The question
        #[arg(value_name = "MESSAGE", required = true, num_args = 1..)]
        message: Vec<String>,
    },

    /// Re-crawl the site now
    Refresh,

    /// List the indexed URLs
    Pages,

    /// Show what is indexed and the latest refresh runs
    Status,

    /// Write the indexed content as markdown
    Export {
        /// Output file
        #[arg(value_name = "PATH")]
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", &hash[..12]);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if cli.dry_run {
        return handle_dry_run(&config);
    }

    let session = match Session::from_config(&config, config_hash) {
        Ok(session) => session,
        Err(e) => {
            tracing::error!("Failed to start session: {}", e);
            return Err(e.into());
        }
    };

    let cancel = session.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted; cancelling");
            cancel.cancel();
        }
    });

    let result = match cli.command.unwrap_or(Command::Chat) {
        Command::Chat => handle_chat(&session).await,
        Command::Ask { message } => handle_ask(&session, &message.join(" ")).await,
        Command::Refresh => handle_refresh(&session).await,
        Command::Pages => handle_pages(&session).await,
        Command::Status => handle_status(&session),
        Command::Export { path } => handle_export(&session, &path).await,
    };

    session.cancel_token().cancel();

    match result {
        Err(SiteChatError::Cancelled) => {
            eprintln!("Cancelled");
            Ok(())
        }
        Err(e) => {
            tracing::error!("{}", e);
            Err(e.into())
        }
        Ok(()) => Ok(()),
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("site_chat=info,warn"),
            1 => EnvFilter::new("site_chat=debug,info"),
            2 => EnvFilter::new("site_chat=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles --dry-run: validates config and shows what would be crawled
fn handle_dry_run(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    println!("=== site-chat Dry Run ===\n");

    println!("Site:");
    println!("  Seed URL: {}", config.site.seed_url);
    println!("  Max pages: {}", config.site.max_pages);
    println!("  Max duration: {}s", config.site.max_duration_secs);
    println!("  Request delay: {}ms", config.site.request_delay_ms);

    println!("\nHTTP:");
    println!("  User agent: {}", config.http.user_agent);
    println!("  Timeout: {}s", config.http.timeout_secs);
    println!("  Retries: {}", config.http.max_retries);

    println!("\nModel:");
    println!("  Provider: {:?}", config.model.provider);
    println!("  Name: {}", config.model.name);
    println!("  Max chunk size: {} chars", config.model.max_chunk_size);
    match config.api_key() {
        Ok(_) => println!("  Credential: {} is set", config.model.api_key_env),
        Err(e) => println!("  Credential: {}", e),
    }

    println!("\nCache & storage:");
    match config.cache_ttl() {
        Some(ttl) => println!("  Cache TTL: {} hours", ttl.num_hours()),
        None => println!("  Cache TTL: never expires"),
    }
    println!("  Database: {}", config.storage.database_path);
    if config.refresh.enabled {
        println!("  Refresh every {} hours", config.refresh.interval_hours);
    } else {
        println!("  Periodic refresh disabled");
    }

    println!("\n✓ Configuration is valid");
    println!("✓ Would crawl {} and chat about it", config.site.seed_url);

    Ok(())
}

/// Handles `chat`: the interactive loop
async fn handle_chat(session: &Session) -> Result<(), SiteChatError> {
    let _refresh_task = session.spawn_refresh_task();

    println!("Chatting about {}", session.seed());
    println!("Commands: :refresh, :pages, :status, :quit\n");

    let cancel = session.cancel_token();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;

        let line = tokio::select! {
            _ = cancel.cancelled() => return Err(SiteChatError::Cancelled),
            line = lines.next_line() => line?,
        };
        let Some(line) = line else {
            break;
        };

        let input = line.trim();
        let outcome = match input {
            "" => continue,
            ":quit" | ":q" | ":exit" => break,
            ":refresh" => handle_refresh(session).await,
            ":pages" => handle_pages(session).await,
            ":status" => handle_status(session),
            message => handle_ask(session, message).await,
        };

        match outcome {
            Err(SiteChatError::Cancelled) => return Err(SiteChatError::Cancelled),
            // Nothing a single message does ends the session
            Err(e) => eprintln!("Error: {}", e),
            Ok(()) => {}
        }
    }

    Ok(())
}

/// Handles `ask`: one message, one reply
async fn handle_ask(session: &Session, message: &str) -> Result<(), SiteChatError> {
    let reply = session.ask(message).await?;
    print_reply(&reply);
    Ok(())
}

fn print_reply(reply: &ChatReply) {
    println!("{}", reply.response);
    if let Some(warning) = &reply.warning {
        println!("\n[warning] {}", warning);
    }
    println!("\n({} pages indexed)", reply.pages_indexed);
}

/// Handles `refresh`
async fn handle_refresh(session: &Session) -> Result<(), SiteChatError> {
    println!("Refreshing {} ...", session.seed());
    let result = session.refresh().await?;
    println!(
        "✓ Indexed {} pages ({} skipped) in {}s, stopped: {}",
        result.pages_visited(),
        result.failures.len(),
        result.elapsed().num_seconds(),
        result.stop.to_db_string()
    );
    Ok(())
}

/// Handles `pages`
async fn handle_pages(session: &Session) -> Result<(), SiteChatError> {
    let urls = session.visited_urls().await?;
    for url in &urls {
        println!("{}", url);
    }
    println!("\n{} URLs indexed", urls.len());
    Ok(())
}

/// Handles `status`
fn handle_status(session: &Session) -> Result<(), SiteChatError> {
    let report = session.status()?;
    print_status(&report);
    Ok(())
}

/// Handles `export`
async fn handle_export(session: &Session, path: &Path) -> Result<(), SiteChatError> {
    let content = session.context().await?;
    write_markdown_export(&content, path)?;
    println!(
        "✓ Exported {} pages to: {}",
        content.pages_visited(),
        path.display()
    );
    Ok(())
}
