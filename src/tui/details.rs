use super::cards::{action_spans, CardCommand};
use super::layout;
use super::recommended::description_chain;
use super::state::{App, AppEvent, DetailsState, Services};
use super::theme::{BLUE, DIM, PINK, WARN};
use super::Command;
use crate::status::{CardState, PackageAction};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
    Frame,
};
use tokio::sync::mpsc;

/// Loads the package named by `pkg`: description, screenshots and icon
pub fn open(app: &mut App, services: &Services, tx: &mpsc::Sender<AppEvent>, seq: u64) {
    app.details = DetailsState::new();
    let Some(pkg) = app.history.current().param("pkg").map(|p| p.trim().to_string()) else {
        return;
    };
    if pkg.is_empty() {
        return;
    }
    app.details.record = Some(services.catalog.record_for(&pkg));

    let placeholder = app.t("common.description_unavailable");
    let limit = app.config.detail_description_limit;
    let lang = app.i18n.language().code();

    let description_services = services.clone();
    let description_tx = tx.clone();
    let description_pkg = pkg.clone();
    tokio::spawn(async move {
        let environment = description_services.wait_environment().await;
        let chain = description_chain(&description_services, &environment, lang);
        let description = chain.resolve(&description_pkg, &placeholder, limit).await;
        let _ = description_tx
            .send(AppEvent::DescriptionResolved {
                seq,
                pkg: description_pkg,
                text: description.text,
            })
            .await;
    });

    let site = services.site.clone();
    let screenshots_tx = tx.clone();
    let screenshots_pkg = pkg.clone();
    tokio::spawn(async move {
        let result = site.screenshots(&screenshots_pkg).await.map_err(|e| {
            log::warn!("screenshots of {} failed: {}", screenshots_pkg, e);
            e.to_string()
        });
        let _ = screenshots_tx.send(AppEvent::ScreenshotsLoaded { seq, result }).await;
    });

    let icon_services = services.clone();
    let icon_tx = tx.clone();
    tokio::spawn(async move {
        if !icon_services.wait_environment().await.available {
            return;
        }
        let path = icon_services.daemon.icon(&pkg).await.unwrap_or_else(|e| {
            log::error!("{}: {}", e.endpoint(), e);
            None
        });
        let _ = icon_tx.send(AppEvent::IconResolved { seq, path }).await;
    });
}

pub fn handle_details_key(key: KeyEvent, app: &mut App) -> Option<Command> {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => app.details.scroll = app.details.scroll.saturating_sub(1),
        KeyCode::Down | KeyCode::Char('j') => app.details.scroll += 1,
        KeyCode::PageUp => app.details.scroll = app.details.scroll.saturating_sub(10),
        KeyCode::PageDown => app.details.scroll += 10,
        KeyCode::Home => app.details.scroll = 0,
        KeyCode::Char(c) => {
            let action = PackageAction::from_hotkey(c)?;
            let pkg = app.details.record.as_ref()?.name.clone();
            return Some(Command::Card(CardCommand::Action(action, pkg)));
        }
        _ => {}
    }
    None
}

fn heading(text: String) -> Line<'static> {
    Line::from(Span::styled(
        text,
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
    ))
}

pub fn detail_lines(app: &App) -> Vec<Line<'static>> {
    let Some(record) = &app.details.record else {
        return vec![Line::from(Span::styled(
            app.t("detalhes.missing_pkg"),
            Style::default().fg(WARN),
        ))];
    };

    let mut lines = vec![
        Line::from(Span::styled(
            record.title().to_string(),
            Style::default().fg(PINK).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            app.t_with("common.package", &[("pkg", record.name.as_str())]),
            Style::default().fg(BLUE),
        )),
    ];
    if let Some(version) = &record.current_version {
        lines.push(Line::from(Span::styled(
            app.t_with("detalhes.installed_version", &[("version", version.as_str())]),
            Style::default().fg(DIM),
        )));
    }
    if !app.status_pending() && app.card_state(&record.name) == CardState::InstalledWithUpdate {
        lines.push(Line::from(Span::styled(
            format!("● {}", app.t("detalhes.update_available")),
            Style::default().fg(WARN),
        )));
    }
    if let Some(icon) = &app.details.icon {
        lines.push(Line::from(Span::styled(
            app.t_with("detalhes.icon", &[("path", icon.as_str())]),
            Style::default().fg(DIM),
        )));
    }
    lines.push(Line::from(""));

    match &app.details.description {
        Some(text) => {
            for paragraph in text.lines() {
                lines.push(Line::from(paragraph.to_string()));
            }
        }
        None => lines.push(Line::from(Span::styled(
            app.t("detalhes.loading_description"),
            Style::default().fg(DIM),
        ))),
    }
    lines.push(Line::from(""));

    let (actions, tooltip) = action_spans(app, record, true);
    lines.push(Line::from(actions));
    if let Some(text) = tooltip {
        lines.push(Line::from(Span::styled(format!("    {}", text), Style::default().fg(WARN))));
    }
    lines.push(Line::from(""));

    lines.push(heading(app.t("detalhes.screenshots")));
    match &app.details.screenshots {
        None => lines.push(Line::from(Span::styled(
            app.t("detalhes.loading_screenshots"),
            Style::default().fg(DIM),
        ))),
        Some(Ok(urls)) if urls.is_empty() => lines.push(Line::from(Span::styled(
            app.t("detalhes.no_screenshots"),
            Style::default().fg(DIM),
        ))),
        Some(Ok(urls)) => {
            for url in urls {
                lines.push(Line::from(Span::styled(format!("  {}", url), Style::default().fg(BLUE))));
            }
        }
        Some(Err(_)) => lines.push(Line::from(Span::styled(
            app.t("detalhes.screenshots_error"),
            Style::default().fg(WARN),
        ))),
    }
    lines
}

pub fn render_details(f: &mut Frame, app: &App) {
    let chunks = layout::main_layout(f.area());
    let title = app.page_title();

    layout::render_header(f, &title, chunks.header);
    layout::render_banner(f, app, chunks.banner);

    let name = app
        .details
        .record
        .as_ref()
        .map(|record| record.title().to_string())
        .unwrap_or(title);
    layout::render_scrollable_content(f, &name, detail_lines(app), app.details.scroll, chunks.content);
    layout::render_footer(f, app, "footer.details", chunks.footer);
}
