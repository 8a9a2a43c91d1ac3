use std::fs::File;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use log::{LevelFilter, info, warn};
use simplelog::{Config, WriteLogger};

use pagewindow::panic_handler;
use pagewindow::script::parse_script;
use pagewindow::settings;
use pagewindow::synthetic::{SyntheticDocument, SyntheticPage, SyntheticRasterizer};
use pagewindow::window::{ViewerConfig, ViewerEvent, WindowManager};

/// Replay a scroll/zoom/jump script against a synthetic document and print
/// every event the page window publishes
#[derive(Parser, Debug)]
#[command(name = "pagewindow", version, about)]
struct Cli {
    /// Number of pages in the synthetic document
    #[arg(long, default_value_t = 20)]
    pages: usize,

    /// Comma separated steps: scroll:N, jump:P, next, prev, zoom-in,
    /// zoom-out, scale:S, pinch:D, end-pinch, width:W, reload, wait:MS
    #[arg(long, default_value = "")]
    script: String,

    /// Simulated render time per page
    #[arg(long, default_value_t = 0)]
    latency_ms: u64,

    /// Pages whose render always fails (repeatable)
    #[arg(long = "fail-page")]
    fail_pages: Vec<usize>,

    /// Settings file (defaults to $PAGEWINDOW_CONFIG, then the user config dir)
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, default_value = "pagewindow.log")]
    log_file: PathBuf,

    /// Overrides log_level from the settings file
    #[arg(long)]
    log_level: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    settings::load_settings(cli.config.as_deref());
    let settings = settings::get_settings();

    let level = match &cli.log_level {
        Some(level) => level
            .parse::<LevelFilter>()
            .map_err(|_| anyhow!("unknown log level {level:?}"))?,
        None => settings.level_filter(),
    };
    WriteLogger::init(
        level,
        Config::default(),
        File::create(&cli.log_file)
            .with_context(|| format!("creating log file {}", cli.log_file.display()))?,
    )?;
    panic_handler::initialize_panic_handler();

    info!("Starting pagewindow with {settings:?}");

    let steps = parse_script(&cli.script)?;
    let rasterizer = SyntheticRasterizer::new()
        .with_latency(Duration::from_millis(cli.latency_ms))
        .failing_on(cli.fail_pages.iter().copied());

    let config = ViewerConfig::from(&settings);
    let mut manager = WindowManager::with_config(rasterizer, &config)?;
    manager.load_document(SyntheticDocument::new("synthetic"), cli.pages);
    print_events(&manager);

    for step in &steps {
        info!("step {step:?}");
        step.apply(&mut manager);
        print_events(&manager);
    }

    // Wait out whatever the queue still has in flight
    let quiet = Duration::from_millis(cli.latency_ms.max(1) * config.window_size as u64 + 200);
    while let Ok(event) = manager.event_receiver().recv_timeout(quiet) {
        println!("{}", describe(&event));
    }
    if manager.pending_operations() > 0 {
        warn!(
            "exiting with {} operations still queued",
            manager.pending_operations()
        );
    }

    info!("Shutting down pagewindow");
    Ok(())
}

fn print_events(manager: &WindowManager<SyntheticRasterizer>) {
    for event in manager.poll_events() {
        println!("{}", describe(&event));
    }
}

fn describe(event: &ViewerEvent<SyntheticPage>) -> String {
    match event {
        ViewerEvent::DocumentLoaded {
            generation,
            total_pages,
        } => format!("loaded {generation}: {total_pages} pages"),
        ViewerEvent::WindowChanged { generation, window } => {
            format!("window {generation}: {:?}", window.pages())
        }
        ViewerEvent::CurrentPageChanged(page) => format!("current page {page}"),
        ViewerEvent::ScrollTo(offset) => format!("scroll to {offset:.1}"),
        ViewerEvent::RenderFailed {
            generation,
            page,
            error,
        } => format!("render failed {generation}: page {page}: {error}"),
    }
}
