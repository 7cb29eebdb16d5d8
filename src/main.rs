use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{info, warn};

use perfwatch::data::export::write_export;
use perfwatch::logging::{self, LogTarget};
use perfwatch::{
    events, spawn_monitor, ui, App, Monitor, Overrides, Settings, SystemControl, SystemProvider,
};

/// How long to wait for the sampling loop to finish its current tick.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Parser, Debug)]
#[command(name = "perfwatch")]
#[command(about = "Terminal dashboard for live system performance metrics")]
#[command(version)]
struct Args {
    /// Config file (TOML, YAML or JSON). Defaults to ./perfwatch.toml if present
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Time between samples (e.g., "1s", "500ms")
    #[arg(short, long)]
    interval: Option<String>,

    /// Window over which CPU utilization is measured each tick
    #[arg(long)]
    cpu_window: Option<String>,

    /// Number of processes to show
    #[arg(short = 'n', long)]
    top: Option<usize>,

    /// Process ranking: "cpu" or "cpu+memory"
    #[arg(short, long)]
    rank: Option<String>,

    /// CPU/memory percentage that raises an alert
    #[arg(short, long)]
    threshold: Option<f32>,

    /// Percentage at which readings turn yellow. Defaults to 75, or the
    /// threshold when that is lower
    #[arg(short, long)]
    warning: Option<f32>,

    /// Minimum time between alerts (e.g., "60s")
    #[arg(long)]
    cooldown: Option<String>,

    /// Mount point whose usage is reported as disk usage
    #[arg(short, long)]
    disk: Option<PathBuf>,

    /// Append logs to this file while the dashboard runs
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Sample, export the dashboard to a JSON file and exit
    #[arg(short, long)]
    export: Option<PathBuf>,
}

impl Args {
    fn overrides(&self) -> Overrides {
        Overrides {
            interval: self.interval.clone(),
            cpu_window: self.cpu_window.clone(),
            top: self.top,
            rank: self.rank.clone(),
            threshold: self.threshold,
            warning: self.warning,
            cooldown: self.cooldown.clone(),
            disk: self.disk.clone(),
            log_file: self.log_file.clone(),
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let settings = Settings::load(args.config.as_deref(), &args.overrides())?;

    // The dashboard owns the terminal, so it only logs to a file
    let target = match (&args.export, &settings.log_file) {
        (_, Some(path)) => LogTarget::File(path),
        (Some(_), None) => LogTarget::Stderr,
        (None, None) => LogTarget::Off,
    };
    logging::init(target)?;

    if let Some(ref export_path) = args.export {
        return export_to_file(&settings, export_path);
    }

    run_with_system(&settings)
}

fn build_monitor(settings: &Settings) -> Monitor<SystemProvider> {
    let provider = SystemProvider::new(settings.cpu_window, &settings.disk_mount);
    Monitor::new(provider, settings.monitor_config())
}

/// Sample the local host on a background task and run the TUI
fn run_with_system(settings: &Settings) -> Result<()> {
    let rt = tokio::runtime::Runtime::new()?;

    let monitor = build_monitor(settings);
    info!(source = monitor.description(), interval = ?settings.interval, "starting");
    let (source, handle) = {
        let _guard = rt.enter();
        spawn_monitor(monitor, settings.interval)
    };

    let app = App::new(Box::new(source), settings.thresholds(), settings.rank_key)
        .with_control(Box::new(SystemControl));
    let result = run_tui(app);

    // The app (and its receiver) is gone, so the loop sees a closed channel.
    handle.abort();
    rt.shutdown_timeout(SHUTDOWN_TIMEOUT);

    result
}

/// Run the TUI until the user quits
fn run_tui(mut app: App) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Restore the terminal before the panic message is printed
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic);
    }));

    let result = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    result
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    while app.running {
        if let Err(e) = app.reload_data() {
            warn!(error = %e, "failed to read dashboard");
        }

        terminal.draw(|frame| ui::draw(frame, app))?;

        if let Some(event) = events::poll_event(Duration::from_millis(100))? {
            match event {
                Event::Key(key) => events::handle_key_event(app, key),
                Event::Mouse(mouse) => {
                    events::handle_mouse_event(app, mouse, ui::CONTENT_START_ROW)
                }
                // Redrawn on the next iteration
                Event::Resize(_, _) => {}
                _ => {}
            }
        }
    }

    Ok(())
}

/// Sample twice so rates and CPU usage are meaningful, then write the report
fn export_to_file(settings: &Settings, export_path: &Path) -> Result<()> {
    let mut monitor = build_monitor(settings);
    info!(source = monitor.description(), "sampling for export");

    monitor.tick();
    std::thread::sleep(settings.interval);
    let dashboard = monitor.tick();

    write_export(&dashboard, export_path)
        .with_context(|| format!("failed to export to {}", export_path.display()))?;

    println!("Exported dashboard to: {}", export_path.display());
    Ok(())
}
