use super::cards::{self, ListMessages};
use super::layout;
use super::state::{App, AppEvent, CardList, Services};
use crate::describe::{DescriptionChain, DescriptionSource, SiteDescriptions};
use crate::environment::Environment;
use ratatui::Frame;
use std::sync::Arc;
use tokio::sync::mpsc;

const MESSAGES: ListMessages = ListMessages {
    loading: "recomendados.loading",
    empty: "recomendados.empty",
    error: "recomendados.error",
    unavailable: "recomendados.error",
};

/// Daemon, remote site and placeholder inside AnDistro; the daemon stage
/// is skipped outside it
pub fn description_chain(services: &Services, environment: &Environment, lang: &str) -> DescriptionChain {
    if environment.available {
        DescriptionChain::standard(services.daemon.clone(), services.site.clone(), Some(lang.to_string()))
    } else {
        let site: Arc<dyn DescriptionSource> = Arc::new(SiteDescriptions::new(services.site.clone()));
        DescriptionChain::new(vec![site])
    }
}

/// Lists the catalog right away; descriptions arrive one by one
pub fn open(app: &mut App, services: &Services, tx: &mpsc::Sender<AppEvent>, seq: u64) {
    app.list = CardList::new();
    app.list.set_records(services.catalog.entries().to_vec());

    let names: Vec<String> = app
        .list
        .sections
        .iter()
        .flat_map(|section| section.records.iter().map(|r| r.name.clone()))
        .collect();
    let placeholder = app.t("common.description_unavailable");
    let limit = app.config.list_description_limit;
    let lang = app.i18n.language().code();
    let services = services.clone();
    let tx = tx.clone();

    tokio::spawn(async move {
        let environment = services.wait_environment().await;
        let chain = Arc::new(description_chain(&services, &environment, lang));
        for pkg in names {
            let chain = chain.clone();
            let placeholder = placeholder.clone();
            let tx = tx.clone();
            tokio::spawn(async move {
                let description = chain.resolve(&pkg, &placeholder, limit).await;
                let _ = tx
                    .send(AppEvent::DescriptionResolved {
                        seq,
                        pkg,
                        text: description.text,
                    })
                    .await;
            });
        }
    });
}

pub fn render_recommended(f: &mut Frame, app: &App) {
    let chunks = layout::main_layout(f.area());
    let title = app.page_title();

    layout::render_header(f, &title, chunks.header);
    layout::render_banner(f, app, chunks.banner);
    cards::render_card_list(f, app, &title, &MESSAGES, chunks.content);
    layout::render_footer(f, app, "footer.list", chunks.footer);
}
