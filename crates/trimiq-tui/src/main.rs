//! trimIQ - a terminal client for the trimIQ video editor.
//!
//! This application provides a keyboard-driven version of the trimIQ web
//! pages: login, registration, and the editor with its account balance.

mod app;
mod ui;

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use trimiq_core::auth::open_store;
use trimiq_core::view::{format_balance, format_earnings};
use trimiq_core::{ApiClient, Config, PageController, TokenStore};

use app::{start_path, App, AppState};
use ui::input::handle_input;
use ui::render::render;

// ============================================================================
// Constants
// ============================================================================

/// Timeout for polling terminal events (in milliseconds)
const EVENT_POLL_TIMEOUT_MS: u64 = 100;

const LOG_FILE_PREFIX: &str = "trimiq.log";

/// What the binary was asked to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    /// Print the balance lines and exit
    Balance,
    Login,
    Logout,
    /// Run the terminal UI
    Tui,
}

impl Command {
    /// Pick the command from the first argument. Unknown flags start the UI.
    fn from_args(args: &[String]) -> Self {
        match args.get(1).map(String::as_str) {
            Some("--balance") => Command::Balance,
            Some("--login") => Command::Login,
            Some("--logout") => Command::Logout,
            _ => Command::Tui,
        }
    }
}

/// Initialize the tracing subscriber for logging.
///
/// The terminal belongs to the UI, so logs go to a daily file in `log_dir`.
/// The returned guard flushes the writer when dropped.
fn init_tracing(log_dir: &Path) -> WorkerGuard {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let file_appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(filter)
        .init();

    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let config = Config::load()?;
    let cache_dir = config
        .cache_dir()
        .unwrap_or_else(|_| PathBuf::from("./cache"));

    // Initialize logging
    let _log_guard = init_tracing(&cache_dir);

    let store = open_store(config.token_backend, cache_dir)?;

    // Check for CLI commands
    let args: Vec<String> = std::env::args().collect();
    let command = Command::from_args(&args);
    info!(?command, "trimIQ starting");

    match command {
        Command::Balance => print_balance(&config, store).await,
        Command::Logout => logout(&config, store),
        Command::Login => login_prompt(config, store).await,
        Command::Tui => run_tui(config, store).await,
    }
}

async fn run_tui(config: Config, store: Arc<dyn TokenStore>) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create app and load the first page through the gate
    let result = match App::new(config, store) {
        Ok(mut app) => {
            app.navigate(start_path());
            run_app(&mut terminal, &mut app).await
        }
        Err(e) => Err(e),
    };

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
    }

    info!("trimIQ shutting down");
    Ok(())
}

fn controller_for(config: &Config, store: Arc<dyn TokenStore>) -> Result<PageController> {
    let api = ApiClient::new(
        &config.api_base_url,
        Duration::from_secs(config.request_timeout_secs),
    )?;
    Ok(PageController::new(store, api))
}

/// Print the formatted balance lines to stdout
async fn print_balance(config: &Config, store: Arc<dyn TokenStore>) -> Result<()> {
    let controller = controller_for(config, store)?;
    if !controller.is_authenticated() {
        anyhow::bail!("Not logged in. Run `trimiq --login` first.");
    }

    let balance = controller
        .fetch_balance()
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message()))
        .context("Error fetching balance")?;

    println!("{}", format_balance(balance.balance));
    println!("{}", format_earnings(balance.ad_revenue));
    Ok(())
}

fn logout(config: &Config, store: Arc<dyn TokenStore>) -> Result<()> {
    let controller = controller_for(config, store)?;
    controller.logout();
    if controller.is_authenticated() {
        anyhow::bail!("Failed to remove the stored token");
    }
    eprintln!("Logged out.");
    Ok(())
}

/// Prompt for credentials on the terminal and store the token
async fn login_prompt(mut config: Config, store: Arc<dyn TokenStore>) -> Result<()> {
    let controller = controller_for(&config, store)?;

    let default_email = std::env::var("TRIMIQ_EMAIL")
        .ok()
        .or_else(|| config.last_email.clone())
        .unwrap_or_default();
    if default_email.is_empty() {
        eprint!("Email: ");
    } else {
        eprint!("Email [{}]: ", default_email);
    }
    io::stderr().flush()?;

    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read email")?;
    let email = match line.trim() {
        "" => default_email,
        typed => typed.to_string(),
    };
    if email.is_empty() {
        anyhow::bail!("Email required");
    }

    let password = match std::env::var("TRIMIQ_PASSWORD") {
        Ok(p) if !p.is_empty() => p,
        _ => rpassword::prompt_password("Password: ").context("Failed to read password")?,
    };

    controller
        .login(&email, &password)
        .await
        .map_err(|e| anyhow::anyhow!(app::login_error_message(&e)))?;

    config.last_email = Some(email);
    config.save()?;
    eprintln!("Logged in.");
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        // Draw UI
        terminal.draw(|f| render(f, app))?;

        // Poll for events with timeout to allow background updates
        if event::poll(Duration::from_millis(EVENT_POLL_TIMEOUT_MS))? {
            if let Event::Key(key) = event::read()? {
                // Ctrl+C to quit
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    return Ok(());
                }

                // Handle input
                if handle_input(app, key).await? {
                    return Ok(());
                }
            }
        }

        // Check for completed background tasks
        app.check_background_tasks();

        // Check if we should quit
        if matches!(app.state, AppState::Quitting) {
            return Ok(());
        }
    }
}
