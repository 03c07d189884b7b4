use super::cards::{self, ListMessages};
use super::input::render_input_box;
use super::layout;
use super::state::{App, AppEvent, CardList, LoadState, SearchState, Services};
use super::Command;
use crate::daemon::PackageRecord;
use crate::scrape::debian_arch;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use tokio::sync::mpsc;

const MESSAGES: ListMessages = ListMessages {
    loading: "resultados.loading_results",
    empty: "resultados.no_packages_found",
    error: "resultados.error_searching",
    unavailable: "resultados.error_searching",
};

const EMPTY_QUERY: ListMessages = ListMessages {
    empty: "resultados.empty_query",
    ..MESSAGES
};

/// Reads `q` from the location and starts the search
pub fn open(app: &mut App, services: &Services, tx: &mpsc::Sender<AppEvent>, seq: u64) {
    let query = app
        .history
        .current()
        .param("q")
        .unwrap_or("")
        .trim()
        .to_string();
    app.search = SearchState::new(&query);
    app.list = CardList::new();
    if query.is_empty() {
        app.list.set_records(Vec::new());
        return;
    }

    let services = services.clone();
    let lang = app.i18n.language().code();
    let tx = tx.clone();
    tokio::spawn(async move {
        let environment = services.wait_environment().await;
        let (results, remote) = search(&services, &query, lang, environment.available).await;
        let _ = tx.send(AppEvent::SearchResults { seq, results, remote }).await;
    });
}

/// Daemon search inside AnDistro, remote package index otherwise
async fn search(
    services: &Services,
    query: &str,
    lang: &str,
    available: bool,
) -> (Result<Vec<PackageRecord>, String>, bool) {
    if available {
        let results = services.daemon.search(query, Some(lang)).await.map_err(|e| {
            log::error!("{}: {}", e.endpoint(), e);
            e.to_string()
        });
        (results, false)
    } else {
        let results = services.site.search(query, debian_arch()).await.map_err(|e| {
            log::warn!("remote search for {:?} failed: {}", query, e);
            e.to_string()
        });
        (results, true)
    }
}

pub fn apply_results(app: &mut App, results: Result<Vec<PackageRecord>, String>, remote: bool) {
    app.search.remote = remote;
    match results {
        Ok(records) => {
            log::debug!("{} search results", records.len());
            app.list.set_records(records);
            if !app.list.is_empty() {
                app.search.editing = false;
            }
        }
        Err(e) => app.list.load = LoadState::Failed(e),
    }
}

pub fn handle_search_key(key: KeyEvent, app: &mut App, term_height: u16) -> Option<Command> {
    if app.search.editing {
        match key.code {
            KeyCode::Enter => {
                let query = app.search.input.content().trim().to_string();
                // same page, new query: no history entry
                app.history.replace_param("q", &query);
                return Some(Command::Reload);
            }
            KeyCode::Esc | KeyCode::Down | KeyCode::Tab => app.search.editing = false,
            _ => {
                app.search.input.handle_key(key);
            }
        }
        return None;
    }

    if key.code == KeyCode::Char('/') {
        app.search.editing = true;
        return None;
    }
    cards::handle_list_key(key, &mut app.list, term_height).map(Command::Card)
}

pub fn render_search(f: &mut Frame, app: &App) {
    let chunks = layout::main_layout(f.area());

    layout::render_header(f, &app.page_title(), chunks.header);
    layout::render_banner(f, app, chunks.banner);

    let body = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Length(1), Constraint::Min(0)])
        .split(chunks.content);

    render_input_box(f, &app.search.input, app.label("index.search_label"), app.search.editing, body[0]);

    let mut info = Vec::new();
    if app.search.remote {
        info.push(Span::styled(
            app.t_with("resultados.detected_arch", &[("arch", app.search.arch)]),
            Style::default().fg(Color::Cyan),
        ));
        info.push(Span::styled(
            format!("  ·  {}", app.t_with("resultados.remote_source", &[("site", app.config.package_site.as_str())])),
            Style::default().fg(Color::DarkGray),
        ));
    }
    f.render_widget(Paragraph::new(Line::from(info)), body[1]);

    let query = app.search.input.content().trim();
    let messages = if query.is_empty() && app.list.load == LoadState::Loaded {
        &EMPTY_QUERY
    } else {
        &MESSAGES
    };
    let title = if query.is_empty() {
        app.t("common.search")
    } else {
        format!("{} \"{}\"", app.t("common.search"), query)
    };
    cards::render_card_list(f, app, &title, messages, body[2]);

    let hint = if app.search.editing {
        "footer.search_editing"
    } else {
        "footer.list"
    };
    layout::render_footer(f, app, hint, chunks.footer);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nav::{History, Location, Page};
    use crate::status::PackageAction;
    use crate::tui::cards::tests::app_on;
    use crate::tui::cards::CardCommand;
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn submitting_replaces_query_without_new_entry() {
        let mut app = app_on(Page::Search, true);
        app.history = History::new(Location::search("vim"));
        app.search = SearchState::new("vim");
        app.search.editing = true;

        app.search.input = crate::tui::input::InputBox::with_content("gimp");
        assert_eq!(handle_search_key(key(KeyCode::Enter), &mut app, 40), Some(Command::Reload));
        assert_eq!(app.history.depth(), 1);
        assert_eq!(app.history.current().param("q"), Some("gimp"));
    }

    #[test]
    fn results_move_focus_to_the_list() {
        let mut app = app_on(Page::Search, true);
        app.search = SearchState::new("");
        assert!(app.search.editing);
        apply_results(&mut app, Ok(vec![PackageRecord::new("gimp")]), false);
        assert!(!app.search.editing);

        assert_eq!(
            handle_search_key(key(KeyCode::Char('i')), &mut app, 40),
            Some(Command::Card(CardCommand::Action(PackageAction::Install, "gimp".to_string())))
        );
        handle_search_key(key(KeyCode::Char('/')), &mut app, 40);
        assert!(app.search.editing);
    }

    #[test]
    fn failed_search_keeps_error_state() {
        let mut app = app_on(Page::Search, false);
        apply_results(&mut app, Err("503".to_string()), true);
        assert_eq!(app.list.load, LoadState::Failed("503".to_string()));
        assert!(app.search.remote);
    }
}
