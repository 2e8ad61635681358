//! Command-line interface for shelfwatch.
//!
//! Provides commands for polling the library, forcing a render, and
//! inspecting or resetting the stored change state.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;

use crate::adapters::{CatalogSource, JellyfinSource};
use crate::config::{self, Overrides, ResolvedConfig};
use crate::core::{
    ChangeStore, CycleOutcome, FileArtifactSink, FileChangeStore, LoopSettings, PollLoop, Renderer,
};
use crate::output::{self, OutputFormat};

/// shelfwatch - snapshot page of recently added Jellyfin media
#[derive(Parser, Debug)]
#[command(name = "shelfwatch")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every command
#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Jellyfin base URL, e.g. https://media.example:8920
    #[arg(long, env = "SHELFWATCH_SERVER_URL", global = true)]
    pub server_url: Option<String>,

    /// Jellyfin user id whose library is listed
    #[arg(long, env = "SHELFWATCH_USER_ID", global = true)]
    pub user_id: Option<String>,

    /// Jellyfin API key
    #[arg(long, env = "SHELFWATCH_API_KEY", global = true, hide_env_values = true)]
    pub api_key: Option<String>,

    /// Accept self-signed TLS certificates
    #[arg(long, global = true)]
    pub insecure: bool,

    /// Artifact path
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    /// Artifact format
    #[arg(long, value_enum, global = true)]
    pub format: Option<OutputFormat>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Poll the library and re-render the page whenever it changes
    Watch {
        /// Run a single cycle and exit
        #[arg(long)]
        once: bool,

        /// Minutes between polls
        #[arg(short, long)]
        interval: Option<u64>,

        /// Number of recent items to fetch
        #[arg(short, long)]
        limit: Option<u32>,

        /// Skip the startup reachability check
        #[arg(long)]
        skip_check: bool,
    },

    /// Fetch once and render unconditionally
    Render {
        /// Print the document instead of writing the artifact
        #[arg(long)]
        stdout: bool,

        /// Number of recent items to fetch
        #[arg(short, long)]
        limit: Option<u32>,
    },

    /// Show the stored change state
    Status,

    /// Forget the stored fingerprint so the next poll re-renders
    Reset,

    /// Show resolved configuration (debug)
    Config,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        let mut overrides = Overrides {
            server_url: self.global.server_url,
            user_id: self.global.user_id,
            api_key: self.global.api_key,
            insecure: self.global.insecure,
            output: self.global.output,
            format: self.global.format,
            ..Default::default()
        };

        match self.command {
            Commands::Watch {
                once,
                interval,
                limit,
                skip_check,
            } => {
                overrides.interval_minutes = interval;
                overrides.limit = limit;
                let config = config::load(&overrides)?;
                watch(&config, once, skip_check).await
            }
            Commands::Render { stdout, limit } => {
                overrides.limit = limit;
                let config = config::load(&overrides)?;
                render(&config, stdout).await
            }
            Commands::Status => {
                let config = config::load(&overrides)?;
                show_status(&config).await
            }
            Commands::Reset => {
                let config = config::load(&overrides)?;
                reset(&config).await
            }
            Commands::Config => {
                let config = config::load(&overrides)?;
                show_config(&config);
                Ok(())
            }
        }
    }
}

fn build_source(config: &ResolvedConfig) -> Result<JellyfinSource> {
    config.validate_for_polling()?;
    JellyfinSource::new(&config.server).context("Failed to create Jellyfin client")
}

/// Wire the poll loop from configuration
pub fn build_poll_loop(config: &ResolvedConfig, source: Box<dyn CatalogSource>) -> PollLoop {
    PollLoop::new(
        source,
        Box::new(FileChangeStore::new(&config.state_path)),
        Box::new(FileArtifactSink::new(&config.output.path)),
        Renderer::from_config(config),
        LoopSettings::from_config(config),
    )
}

async fn watch(config: &ResolvedConfig, once: bool, skip_check: bool) -> Result<()> {
    let source = build_source(config)?;

    // The first contact is the one failure we surface instead of retrying
    if !skip_check {
        source
            .health_check()
            .await
            .with_context(|| format!("Cannot reach Jellyfin at {}", config.server.url))?;
    }

    let poller = build_poll_loop(config, Box::new(source));

    if once {
        let outcome = poller.run_cycle().await;
        report(&outcome, config);
        if outcome.is_failure() {
            anyhow::bail!("Cycle failed");
        }
        return Ok(());
    }

    println!("👁️  Watching {} every {} minute(s)", config.server.url, config.poll.interval_minutes);
    println!("    Writing {}", config.output.path.display());
    println!("    Press Ctrl+C to stop");
    println!();

    // Set up Ctrl+C handler
    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        let _ = stop_tx.send(());
    });

    let cycles = poller
        .run_until(async {
            let _ = stop_rx.await;
        })
        .await;

    info!(cycles, "Stopped");
    println!();
    println!("🛑 Stopped after {} cycle(s)", cycles);
    Ok(())
}

async fn render(config: &ResolvedConfig, stdout: bool) -> Result<()> {
    let source = build_source(config)?;

    if stdout {
        let snapshot = source
            .fetch(config.poll.limit)
            .await
            .context("Failed to fetch latest items")?;
        let document = Renderer::from_config(config).render(&snapshot);
        let contents = output::serialize(&document, config.output.format)?;
        println!("{}", contents);
        return Ok(());
    }

    let poller = build_poll_loop(config, Box::new(source));
    let outcome = poller.force_cycle().await;
    report(&outcome, config);
    if outcome.is_failure() {
        anyhow::bail!("Render failed");
    }
    Ok(())
}

fn report(outcome: &CycleOutcome, config: &ResolvedConfig) {
    match outcome {
        CycleOutcome::Rendered { fingerprint, items } => {
            println!(
                "✅ Updated {} ({} items, {})",
                config.output.path.display(),
                items,
                fingerprint.short()
            );
        }
        CycleOutcome::Unchanged { fingerprint } => {
            println!("ℹ️  No changes ({})", fingerprint.short());
        }
        CycleOutcome::FetchFailed { error } => {
            eprintln!("❌ Fetch failed: {}", error);
        }
        CycleOutcome::RenderFailed { error } => {
            eprintln!("❌ Render failed: {}", error);
        }
        CycleOutcome::StorageFailed { error } => {
            eprintln!("❌ Write failed: {}", error);
        }
    }
}

async fn show_status(config: &ResolvedConfig) -> Result<()> {
    let store = FileChangeStore::new(&config.state_path);

    println!();
    println!("shelfwatch status");
    println!("══════════════════════════════════════════════════════════════");
    println!();
    println!("State file:   {}", store.path().display());
    println!("Artifact:     {}", config.output.path.display());
    println!();

    match store.load().await? {
        Some(state) => {
            println!("Fingerprint:  {}", state.fingerprint);
            println!("Rendered at:  {}", state.saved_at.format("%Y-%m-%d %H:%M:%S UTC"));
            println!("Items:        {}", state.item_count);
        }
        None => {
            println!("No render yet; the next poll will render.");
        }
    }

    Ok(())
}

async fn reset(config: &ResolvedConfig) -> Result<()> {
    let store = FileChangeStore::new(&config.state_path);
    if store.clear().await? {
        println!("🗑️  Cleared {}", store.path().display());
    } else {
        println!("ℹ️  Nothing to clear");
    }
    Ok(())
}

fn show_config(config: &ResolvedConfig) {
    println!();
    println!("shelfwatch configuration");
    println!("══════════════════════════════════════════════════════════════");
    println!();
    match &config.config_file {
        Some(path) => println!("Config file:   {}", path.display()),
        None => println!("Config file:   (none found)"),
    }
    println!("Home:          {}", config.home.display());
    println!("State file:    {}", config.state_path.display());
    println!();
    println!("Server:        {}", config.server.url);
    println!("User id:       {}", config.server.user_id);
    println!("API key:       {}", config.masked_api_key());
    println!("Insecure TLS:  {}", config.server.accept_invalid_certs);
    println!("Timeout:       {}s", config.server.timeout_seconds);
    println!();
    println!("Interval:      {} minute(s)", config.poll.interval_minutes);
    println!("Limit:         {}", config.poll.limit);
    println!();
    println!("Output:        {}", config.output.path.display());
    println!("Format:        {:?}", config.output.format);
    println!("Refresh hint:  {}s", config.output.refresh_seconds);
    println!("Title:         {}", config.output.title);
}
