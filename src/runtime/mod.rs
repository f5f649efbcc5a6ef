use std::env;
use std::path::PathBuf;

use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::info;

use crate::app::App;
use crate::audio::EngineService;
use crate::error::Result;
use crate::vault::VaultIndex;

mod event_loop;
mod logging;
mod settings;
mod startup;


pub fn run() -> Result<()> {
    let settings = settings::load_settings();
    logging::init(&settings.log)?;

    let root = env::args()
        .nth(1)
        .map(PathBuf::from)
        .or_else(|| env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."));
    info!(
        vault = %root.display(),
        config = ?crate::config::resolve_config_path(),
        "starting"
    );

    // The first rescan hands the engine the real file index.
    let service = EngineService::spawn(
        settings::engine_options(&settings),
        settings.audio.end_poll(),
        VaultIndex::default(),
    )?;
    let mut rescanner = startup::Rescanner::new(root.clone(), settings.vault.clone());
    let count = rescanner.rescan(&service)?;

    let mut app = App::new();
    app.set_board(service.board_handle());
    app.set_vault_root(root.display().to_string());
    app.set_status(format!("{count} tracks"));

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result = event_loop::run(&mut terminal, &settings, &mut app, &service, &mut rescanner);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if run_result.is_err() {
        service.quit_softly(std::time::Duration::ZERO);
    }
    run_result
}
