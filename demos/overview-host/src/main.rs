//! Host events overview - overview-dispatch demo
//!
//! Mounts the widget against a mock transport, so the pending and loaded
//! renders can be watched in a real terminal:
//! 1. `OverviewHostFetch` binds the range and returns a query effect
//! 2. The effect spawns a query task on the mock transport
//! 3. `OverviewHostDidLoad` fills in the subtitle and the stats
//!
//! # Usage
//!
//! ```sh
//! # Built-in fixture for 2020-01-20T20:49:57.080Z..2020-01-21T20:49:57.080Z
//! cargo run -p overview-host
//!
//! # Fixture file, with logs
//! cargo run -p overview-host -- --fixtures demos/overview-host/fixtures/overview_host.json \
//!     --log-file /tmp/overview-host.log
//! ```

use std::cell::RefCell;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use overview_dispatch::{
    create_store, EffectRuntime, LoggingMiddleware, MockTransport, MockedResponse, StoreDeps,
    TimeRange,
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing_subscriber::EnvFilter;

use overview_host::action::Action;
use overview_host::app::OverviewUi;
use overview_host::effect::handle_effect;
use overview_host::mock::{
    create_storage_mock, mock_global_state, mock_ui_settings, overview_host_mocks, END_DATE,
    START_DATE,
};
use overview_host::query::OVERVIEW_HOST_QUERY;
use overview_host::reducer::reducer;

/// Host events overview backed by mocked query responses
#[derive(Parser, Debug)]
#[command(name = "overview-host")]
#[command(about = "Host events overview demonstrating overview-dispatch patterns")]
struct Args {
    /// Start of the time range (RFC 3339)
    #[arg(long, default_value = START_DATE)]
    from: String,

    /// End of the time range (RFC 3339)
    #[arg(long, default_value = END_DATE)]
    to: String,

    /// JSON mock table; defaults to the built-in fixture for --from/--to
    #[arg(long)]
    fixtures: Option<PathBuf>,

    /// Delay for mocks that do not set their own, in milliseconds
    #[arg(long, default_value = "500")]
    delay_ms: u64,

    /// Write logs here (RUST_LOG controls the filter)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> io::Result<()> {
    let args = Args::parse();

    if let Some(path) = &args.log_file {
        init_logging(path)?;
    }

    let range = match TimeRange::parse(&args.from, &args.to) {
        Ok(range) => range,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    let mocks = match load_mocks(&args, &range) {
        Ok(mocks) => mocks,
        Err(e) => {
            eprintln!("Error: could not load fixtures: {e}");
            std::process::exit(1);
        }
    };

    // ===== Terminal setup =====
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, range, mocks).await;

    // ===== Cleanup =====
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn init_logging(path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init();
    Ok(())
}

fn load_mocks(
    args: &Args,
    range: &TimeRange,
) -> Result<Vec<MockedResponse>, Box<dyn std::error::Error>> {
    let mocks = match &args.fixtures {
        Some(path) => {
            let json = std::fs::read_to_string(path)?;
            MockTransport::from_fixture_json(&json, &[OVERVIEW_HOST_QUERY])?.remaining()
        }
        None => overview_host_mocks(range)?,
    };

    let delay = Duration::from_millis(args.delay_ms);
    Ok(mocks
        .into_iter()
        .map(|mock| match mock.delay {
            Some(_) => mock,
            None => mock.with_delay(delay),
        })
        .collect())
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    range: TimeRange,
    mocks: Vec<MockedResponse>,
) -> io::Result<()> {
    let transport = MockTransport::new(mocks.clone());
    let deps = StoreDeps::new(create_storage_mock())
        .with_settings(mock_ui_settings())
        .with_client(Arc::new(transport.clone()));

    let instance = create_store(&mock_global_state(), reducer, LoggingMiddleware::new(), deps);
    let mut runtime = EffectRuntime::from_instance(instance, handle_effect);

    runtime.enqueue(Action::OverviewHostFetch { range });

    let ui = RefCell::new(OverviewUi::new());

    runtime
        .run(
            terminal,
            |frame, area, state| ui.borrow_mut().render(frame, area, state),
            |event, state| {
                let outcome = ui.borrow_mut().map_event(event, state);
                // Mocks are single-shot: a refetch needs fresh registrations
                if outcome.actions.contains(&Action::OverviewHostRefetch) {
                    transport.register_all(mocks.clone());
                }
                outcome
            },
            |action| matches!(action, Action::Quit),
        )
        .await
}
