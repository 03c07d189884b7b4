mod cards;
mod details;
mod dialog;
mod home;
pub mod input;
mod installed;
mod layout;
mod recommended;
mod search;
mod settings;
pub mod state;
mod theme;
mod updates;

use crate::nav::{Location, Page};
use crate::status::load_status;
use anyhow::Result;
use cards::CardCommand;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Frame, Terminal};
use state::{App, AppEvent, LoadState, Services};
use std::io;
use tokio::sync::mpsc;

/// Follow-up a page asks the loop to perform
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Navigate(Location),
    /// Reload the current location (after its params changed)
    Reload,
    Card(CardCommand),
}

pub async fn run(mut app: App, services: Services) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let (tx, mut rx) = mpsc::channel(32);

    // banner follows the detector as soon as it answers
    let mut ready = services.environment.clone();
    let tx_clone = tx.clone();
    tokio::spawn(async move {
        if let Some(environment) = ready.wait().await {
            let _ = tx_clone.send(AppEvent::EnvironmentReady(environment)).await;
        }
    });

    open_current_page(&mut app, &services, &tx);

    loop {
        if app.page() == Page::Details {
            let term_size = terminal.size()?;
            let visible = layout::visible_content_height(term_size.height);
            let max_scroll = details::detail_lines(&app).len().saturating_sub(visible);
            app.details.scroll = app.details.scroll.min(max_scroll);
        }

        terminal.draw(|f| ui(f, &app))?;

        if event::poll(std::time::Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                let term_size = terminal.size()?;
                handle_key(key, &mut app, &services, &tx, term_size.height);
            }
        }

        while let Ok(event) = rx.try_recv() {
            handle_event(event, &mut app);
        }

        if app.should_quit {
            break;
        }
    }

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    Ok(())
}

/// Starts every load the current location needs. Results from earlier
/// loads are dropped by sequence number.
fn open_current_page(app: &mut App, services: &Services, tx: &mpsc::Sender<AppEvent>) {
    let seq = app.next_seq();
    app.flash = None;
    log::debug!("open {} (seq {})", app.history.current(), seq);

    // every page derives card states from a fresh snapshot
    let status_services = services.clone();
    let status_tx = tx.clone();
    tokio::spawn(async move {
        let environment = status_services.wait_environment().await;
        let snapshot = load_status(status_services.daemon.as_ref(), &environment).await;
        let _ = status_tx
            .send(AppEvent::StatusLoaded {
                seq,
                environment,
                snapshot,
            })
            .await;
    });

    match app.page() {
        Page::Home => home::open(app),
        Page::Search => search::open(app, services, tx, seq),
        Page::Details => details::open(app, services, tx, seq),
        Page::Installed => installed::open(app, services, tx, seq),
        Page::Updates => updates::open(app),
        Page::Recommended => recommended::open(app, services, tx, seq),
        Page::Settings => settings::open(app),
    }
}

fn navigate(app: &mut App, services: &Services, tx: &mpsc::Sender<AppEvent>, to: Location) {
    app.history.navigate(to);
    open_current_page(app, services, tx);
}

fn go_back(app: &mut App, services: &Services, tx: &mpsc::Sender<AppEvent>) {
    if app.history.back() {
        open_current_page(app, services, tx);
    } else if app.page() != Page::Home {
        navigate(app, services, tx, Location::new(Page::Home));
    }
}

fn execute_command(command: Command, app: &mut App, services: &Services, tx: &mpsc::Sender<AppEvent>) {
    match command {
        Command::Navigate(to) => navigate(app, services, tx, to),
        Command::Reload => open_current_page(app, services, tx),
        Command::Card(CardCommand::OpenDetails(pkg)) => {
            navigate(app, services, tx, Location::details(&pkg))
        }
        Command::Card(CardCommand::Action(action, pkg)) => {
            if app.request_action(action, &pkg) {
                cards::spawn_action(services.daemon.clone(), action, pkg, tx);
            }
        }
    }
}

/// Page reached by a Shift+letter shortcut
fn shortcut_page(c: char) -> Option<Location> {
    let page = match c {
        'H' => Page::Home,
        'S' => return Some(Location::search("")),
        'I' => Page::Installed,
        'U' => Page::Updates,
        'R' => Page::Recommended,
        'C' => Page::Settings,
        _ => return None,
    };
    Some(Location::new(page))
}

fn handle_key(
    key: KeyEvent,
    app: &mut App,
    services: &Services,
    tx: &mpsc::Sender<AppEvent>,
    term_height: u16,
) {
    app.flash = None;

    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    // an open dialog takes every key
    if app.modal.is_some() {
        if let Some((action, pkg)) = dialog::handle_dialog_key(key, app) {
            cards::spawn_action(services.daemon.clone(), action, pkg, tx);
        }
        return;
    }

    // while a text field is focused, letters go to the field
    let editing = app.is_editing();
    match key.code {
        KeyCode::Char('q') if app.page() == Page::Home && !editing => {
            app.should_quit = true;
        }
        KeyCode::Esc if !editing => go_back(app, services, tx),
        KeyCode::Char(c) if !editing && c.is_ascii_uppercase() => {
            if let Some(to) = shortcut_page(c) {
                if to.page != app.page() {
                    navigate(app, services, tx, to);
                }
            }
        }
        KeyCode::Char('/')
            if matches!(app.page(), Page::Details | Page::Installed | Page::Updates | Page::Recommended) =>
        {
            navigate(app, services, tx, Location::search(""));
        }
        _ => {
            let command = match app.page() {
                Page::Home => home::handle_home_key(key, app),
                Page::Search => search::handle_search_key(key, app, term_height),
                Page::Details => details::handle_details_key(key, app),
                Page::Installed | Page::Updates | Page::Recommended => {
                    cards::handle_list_key(key, &mut app.list, term_height).map(Command::Card)
                }
                Page::Settings => {
                    settings::handle_settings_key(key, app);
                    None
                }
            };
            if let Some(command) = command {
                execute_command(command, app, services, tx);
            }
        }
    }
}

fn handle_event(event: AppEvent, app: &mut App) {
    match event {
        AppEvent::EnvironmentReady(environment) => {
            app.environment = Some(environment);
        }
        AppEvent::StatusLoaded {
            seq,
            environment,
            snapshot,
        } => {
            if !app.is_current(seq) {
                return;
            }
            if app.page() == Page::Updates {
                updates::apply_snapshot(app, &environment, &snapshot);
            }
            app.environment = Some(environment);
            app.apply_status(snapshot.status);
        }
        AppEvent::SearchResults { seq, results, remote } => {
            if app.is_current(seq) {
                search::apply_results(app, results, remote);
            }
        }
        AppEvent::InstalledLoaded { seq, result } => {
            if app.is_current(seq) {
                installed::apply_installed(app, result);
            }
        }
        AppEvent::RequiresAndistro { seq } => {
            if app.is_current(seq) {
                app.list.load = LoadState::Unavailable;
            }
        }
        AppEvent::DescriptionResolved { seq, pkg, text } => {
            if !app.is_current(seq) {
                return;
            }
            if app.page() == Page::Details {
                app.details.description = Some(text);
            } else {
                app.list.descriptions.insert(pkg, text);
            }
        }
        AppEvent::ScreenshotsLoaded { seq, result } => {
            if app.is_current(seq) {
                app.details.screenshots = Some(result);
            }
        }
        AppEvent::IconResolved { seq, path } => {
            if app.is_current(seq) {
                app.details.icon = path;
            }
        }
        // not tied to a page load: the card may be on any page
        AppEvent::ActionFinished { pkg, action, result } => {
            app.finish_action(&pkg, action, result);
        }
    }
}

fn ui(f: &mut Frame, app: &App) {
    match app.page() {
        Page::Home => home::render_home(f, app),
        Page::Search => search::render_search(f, app),
        Page::Details => details::render_details(f, app),
        Page::Installed => installed::render_installed(f, app),
        Page::Updates => updates::render_updates(f, app),
        Page::Recommended => recommended::render_recommended(f, app),
        Page::Settings => settings::render_settings(f, app),
    }
    dialog::render_dialog(f, app);
}
