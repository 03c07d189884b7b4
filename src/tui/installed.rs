use super::cards::{self, ListMessages};
use super::layout;
use super::state::{App, AppEvent, CardList, CardSection, LoadState, Services};
use crate::daemon::InstalledResponse;
use ratatui::Frame;
use tokio::sync::mpsc;

const MESSAGES: ListMessages = ListMessages {
    loading: "instalados.loading",
    empty: "instalados.empty",
    error: "instalados.error",
    unavailable: "instalados.andistro_only",
};

pub fn open(app: &mut App, services: &Services, tx: &mpsc::Sender<AppEvent>, seq: u64) {
    app.list = CardList::new();

    let services = services.clone();
    let tx = tx.clone();
    tokio::spawn(async move {
        let environment = services.wait_environment().await;
        if !environment.available {
            let _ = tx.send(AppEvent::RequiresAndistro { seq }).await;
            return;
        }
        let result = services.daemon.installed().await.map_err(|e| {
            log::error!("{}: {}", e.endpoint(), e);
            e.to_string()
        });
        let _ = tx.send(AppEvent::InstalledLoaded { seq, result }).await;
    });
}

/// Apps and add-ons under their own headings
pub fn apply_installed(app: &mut App, result: Result<InstalledResponse, String>) {
    match result {
        Ok(installed) => {
            log::debug!(
                "{} apps, {} addons installed",
                installed.apps.len(),
                installed.addons.len()
            );
            app.list.set_sections(vec![
                CardSection {
                    title_key: Some("instalados.apps"),
                    records: installed.apps,
                },
                CardSection {
                    title_key: Some("instalados.addons"),
                    records: installed.addons,
                },
            ]);
        }
        Err(e) => app.list.load = LoadState::Failed(e),
    }
}

pub fn render_installed(f: &mut Frame, app: &App) {
    let chunks = layout::main_layout(f.area());
    let title = app.page_title();

    layout::render_header(f, &title, chunks.header);
    layout::render_banner(f, app, chunks.banner);
    cards::render_card_list(f, app, &title, &MESSAGES, chunks.content);
    layout::render_footer(f, app, "footer.list", chunks.footer);
}
