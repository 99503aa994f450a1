use std::sync::Arc;

use clap::Parser;

use feedrelay::app::App;
use feedrelay::config::AppConfig;
use feedrelay::{report, scheduler};

/// Feed-to-social posting bot with spam filtering.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
struct Opts {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Parser)]
enum Command {
    /// Run both cycles on their cron schedules (default).
    Run,
    /// Fetch and classify the feed once.
    Fetch,
    /// Publish the next pending article once.
    Publish,
    /// Print queue statistics.
    Stats,
    /// Show spam detected in the last N days.
    SpamReport {
        /// Number of days to check.
        #[arg(long, default_value = "7")]
        days: i64,
    },
    /// Re-run the current rules over stored unposted articles.
    Rescan,
    /// List the Buffer profiles connected to the configured token.
    BufferProfiles,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let opts = Opts::parse();
    let config = AppConfig::from_env()?;

    match opts.command.unwrap_or(Command::Run) {
        Command::Run => run_daemon(config).await,
        Command::Fetch => {
            let app = App::new(&config).await?;
            let report = app.run_fetch_cycle().await?;
            println!(
                "Fetched: {}, Added: {}, Skipped: {}, Invalid: {}",
                report.fetched, report.added, report.skipped, report.invalid
            );
            Ok(())
        }
        Command::Publish => {
            let app = App::new(&config).await?;
            match app.run_publish_cycle().await? {
                Some(post) => {
                    println!("Posted ({}): {}", post.delivery.label(), post.title);
                    println!("Post ID: {}", post.post_id);
                }
                None => println!("Queue is empty, nothing posted"),
            }
            Ok(())
        }
        Command::Stats => {
            let app = App::new(&config).await?;
            let stats = app.stats().await?;
            println!("Pending: {}", stats.pending);
            println!("Posted: {}", stats.posted);
            println!("Spam blocked: {}", stats.spam);
            Ok(())
        }
        Command::SpamReport { days } => {
            if days < 1 {
                eprintln!("Error: --days must be at least 1");
                std::process::exit(1);
            }
            let app = App::new(&config).await?;
            report::spam_report(app.store(), days).await?;
            Ok(())
        }
        Command::Rescan => {
            let app = App::new(&config).await?;
            report::rescan(app.store(), app.classifier()).await?;
            Ok(())
        }
        Command::BufferProfiles => buffer_profiles(&config).await,
    }
}

async fn run_daemon(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📡 feedrelay v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Feed: {}", config.feed_url);
    eprintln!("   Database: {}", config.db_path.display());
    eprintln!("   Rules: {}", config.rules_dir.display());
    eprintln!("   Fetch cron: {}", config.fetch_cron);
    eprintln!("   Publish cron: {}", config.publish_cron);

    let app = Arc::new(App::new(&config).await?);

    let fetch_app = app.clone();
    let fetch_handle = scheduler::spawn_cron_loop("fetch", config.fetch_cron.clone(), move || {
        let app = fetch_app.clone();
        async move { app.run_fetch_cycle().await.map(|_| ()) }
    });

    let publish_app = app.clone();
    let publish_handle =
        scheduler::spawn_cron_loop("publish", config.publish_cron.clone(), move || {
            let app = publish_app.clone();
            async move { app.run_publish_cycle().await.map(|_| ()) }
        });

    eprintln!("   Running. Press Ctrl+C to stop.\n");
    tokio::signal::ctrl_c().await?;
    eprintln!("Shutting down");

    fetch_handle.abort();
    publish_handle.abort();
    Ok(())
}

async fn buffer_profiles(config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let Some(token) = std::env::var("BUFFER_ACCESS_TOKEN")
        .ok()
        .filter(|t| !t.trim().is_empty())
    else {
        eprintln!("❌ BUFFER_ACCESS_TOKEN not set");
        eprintln!("\n1. Go to https://buffer.com/developers/apps");
        eprintln!("2. Create a new app");
        eprintln!("3. Copy the Access Token");
        eprintln!("4. Set BUFFER_ACCESS_TOKEN=your_token");
        std::process::exit(1);
    };

    let api_base = std::env::var("BUFFER_API_BASE")
        .unwrap_or_else(|_| "https://api.bufferapp.com/1".to_string());

    println!("📋 Fetching Buffer profiles...");
    let profiles =
        feedrelay::sinks::buffer::list_profiles(&token, &api_base, config.http_timeout).await?;

    println!("\n✅ Found {} connected account(s):\n", profiles.len());
    for profile in profiles {
        println!(
            "  {}: @{}",
            profile.service.to_uppercase(),
            profile.formatted_username
        );
        println!("  Profile ID: {}", profile.id);
        println!("  Set BUFFER_PROFILE_ID={}", profile.id);
        println!();
    }
    Ok(())
}
