use clap::Parser;
use color_eyre::eyre::{eyre, Result};
use feelings_journal::config::{self, Config};
use feelings_journal::controller::Controller;
use feelings_journal::journal_state::JournalState;
use feelings_journal::kv_store::FileStore;
use feelings_journal::logging;
use feelings_journal::render::ViewState;
use feelings_journal::ui::UI;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "feelings-journal", version, about = "Record how you feel, one line at a time")]
struct Args {
    /// Store file holding the journal (overrides `store_path`)
    #[arg(long)]
    store: Option<PathBuf>,

    /// Config file to read instead of the default location
    #[arg(long)]
    config: Option<PathBuf>,

    /// Start in dark mode
    #[arg(long)]
    dark: bool,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();

    let config_path = args.config.clone().unwrap_or_else(config::default_config_path);
    let (mut config, config_problem) = Config::load(&config_path);
    if let Some(store) = args.store {
        config.store_path = store;
    }

    let log_dir = config::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("logs");
    let _guard = logging::init_tracing(&log_dir, &config.log_level)
        .map_err(|e| eyre!("Failed to set up logging in {}: {}", log_dir.display(), e))?;
    tracing::debug!(log_dir = %log_dir.display(), "logging initialised");
    if let Some(problem) = config_problem {
        tracing::warn!("{problem}, using defaults");
    }

    let journal = JournalState::with_key(FileStore::new(&config.store_path), &config.storage_key);
    tracing::info!(
        store = %journal.store().path().display(),
        key = %config.storage_key,
        "starting feelings journal"
    );
    let view = ViewState {
        mood: config.default_mood,
        dark_mode: config.dark_mode || args.dark,
        char_limit: config.char_limit,
        ..ViewState::default()
    };
    let mut controller = Controller::new(journal, view);

    let mut ui = UI::new()?;
    ui.run(&mut controller)?;
    drop(ui);

    tracing::info!("shutting down");
    Ok(())
}
