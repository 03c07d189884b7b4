use super::cards::{self, ListMessages};
use super::layout;
use super::state::{App, CardList, LoadState};
use crate::environment::Environment;
use crate::status::StatusSnapshot;
use ratatui::Frame;

const MESSAGES: ListMessages = ListMessages {
    loading: "atualizacoes.loading",
    empty: "atualizacoes.empty",
    error: "atualizacoes.error",
    unavailable: "atualizacoes.andistro_only",
};

/// Cards come with the status snapshot every page load fetches
pub fn open(app: &mut App) {
    app.list = CardList::new();
}

pub fn apply_snapshot(app: &mut App, environment: &Environment, snapshot: &StatusSnapshot) {
    if !environment.available {
        app.list.load = LoadState::Unavailable;
    } else if let Some(e) = &snapshot.updates_error {
        app.list.load = LoadState::Failed(e.clone());
    } else {
        app.list.set_records(snapshot.updates.clone());
    }
}

pub fn render_updates(f: &mut Frame, app: &App) {
    let chunks = layout::main_layout(f.area());
    let title = app.page_title();

    layout::render_header(f, &title, chunks.header);
    layout::render_banner(f, app, chunks.banner);
    cards::render_card_list(f, app, &title, &MESSAGES, chunks.content);
    layout::render_footer(f, app, "footer.list", chunks.footer);
}
