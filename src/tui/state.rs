use super::input::InputBox;
use crate::catalog::Catalog;
use crate::config::Config;
use crate::daemon::{normalize_package_name, Daemon, InstalledResponse, PackageRecord};
use crate::environment::{Environment, Ready};
use crate::i18n::{I18n, Language, TaggedText};
use crate::nav::{History, Location, Page};
use crate::scrape::PackageSite;
use crate::status::{CardState, PackageAction, PackageStatus, StatusSnapshot};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Chrome text re-translated whenever the language changes
const CHROME_KEYS: &[&str] = &[
    "banner.checking",
    "banner.not_andistro",
    "footer.home",
    "footer.list",
    "footer.search_editing",
    "footer.details",
    "footer.settings",
    "footer.settings_editing",
    "index.search_label",
    "index.overview",
    "index.shortcuts",
    "nav.search",
    "nav.installed",
    "nav.updates",
    "nav.recommended",
    "nav.settings",
    "nav.quit",
    "notice.dismiss",
    "notice.confirm_hint",
];

// ========== Services ==========

/// Handles shared by every page loader
#[derive(Clone)]
pub struct Services {
    pub daemon: Arc<dyn Daemon>,
    pub site: Arc<PackageSite>,
    pub catalog: Arc<Catalog>,
    pub environment: Ready<Environment>,
    /// Upper bound on waiting for the environment detector
    pub ready_timeout: Duration,
}

impl Services {
    pub async fn wait_environment(&self) -> Environment {
        let mut ready = self.environment.clone();
        ready
            .wait_timeout(self.ready_timeout)
            .await
            .unwrap_or_else(Environment::unavailable)
    }
}

// ========== Enums ==========

#[derive(Debug, Clone, PartialEq)]
pub enum LoadState {
    Loading,
    Loaded,
    Failed(String),
    /// The page only works with the daemon present
    Unavailable,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NoticeKind {
    Success,
    Failure,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Modal {
    Notice {
        kind: NoticeKind,
        message: String,
    },
    Confirm {
        action: PackageAction,
        pkg: String,
        message: String,
    },
}

/// Settings page entry
#[derive(Debug, Clone)]
pub enum SettingsItem {
    /// Group title (not selectable)
    Section(&'static str),
    /// Cycles through the supported languages
    Language(Language),
    TextEdit {
        label_key: &'static str,
        key: &'static str,
        value: String,
    },
}

// ========== Events ==========

#[derive(Debug)]
pub enum AppEvent {
    EnvironmentReady(Environment),
    StatusLoaded {
        seq: u64,
        environment: Environment,
        snapshot: StatusSnapshot,
    },
    SearchResults {
        seq: u64,
        results: Result<Vec<PackageRecord>, String>,
        remote: bool,
    },
    InstalledLoaded {
        seq: u64,
        result: Result<InstalledResponse, String>,
    },
    /// The page needs the daemon and it is not there
    RequiresAndistro { seq: u64 },
    DescriptionResolved {
        seq: u64,
        pkg: String,
        text: String,
    },
    ScreenshotsLoaded {
        seq: u64,
        result: Result<Vec<String>, String>,
    },
    IconResolved { seq: u64, path: Option<String> },
    ActionFinished {
        pkg: String,
        action: PackageAction,
        result: Result<(), String>,
    },
}

// ========== Page states ==========

pub struct CardSection {
    pub title_key: Option<&'static str>,
    pub records: Vec<PackageRecord>,
}

/// Cards of the list pages (search, installed, updates, recommended)
pub struct CardList {
    pub load: LoadState,
    pub sections: Vec<CardSection>,
    pub selected: usize,
    /// Descriptions resolved after the list was built, by package name
    pub descriptions: HashMap<String, String>,
}

impl CardList {
    pub fn new() -> Self {
        Self {
            load: LoadState::Loading,
            sections: Vec::new(),
            selected: 0,
            descriptions: HashMap::new(),
        }
    }

    pub fn set_records(&mut self, records: Vec<PackageRecord>) {
        self.set_sections(vec![CardSection {
            title_key: None,
            records,
        }]);
    }

    /// Empty sections are dropped
    pub fn set_sections(&mut self, sections: Vec<CardSection>) {
        self.sections = sections
            .into_iter()
            .filter(|section| !section.records.is_empty())
            .collect();
        self.selected = 0;
        self.load = LoadState::Loaded;
    }

    pub fn len(&self) -> usize {
        self.sections.iter().map(|s| s.records.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: usize) -> Option<&PackageRecord> {
        self.sections
            .iter()
            .flat_map(|section| section.records.iter())
            .nth(index)
    }

    pub fn selected_record(&self) -> Option<&PackageRecord> {
        self.get(self.selected)
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.len() {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn select_by(&mut self, delta: isize) {
        let last = self.len().saturating_sub(1) as isize;
        self.selected = (self.selected as isize + delta).clamp(0, last.max(0)) as usize;
    }
}

pub struct HomeState {
    pub input: InputBox,
    pub editing: bool,
}

pub struct SearchState {
    pub input: InputBox,
    pub editing: bool,
    pub remote: bool,
    pub arch: &'static str,
}

pub struct DetailsState {
    pub record: Option<PackageRecord>,
    pub description: Option<String>,
    pub screenshots: Option<Result<Vec<String>, String>>,
    pub icon: Option<String>,
    pub scroll: usize,
}

pub struct SettingsModeState {
    pub items: Vec<SettingsItem>,
    pub selected: usize,
    pub editing: bool,
    pub edit_buffer: String,
    pub edit_cursor: usize,
    pub message: Option<String>,
}

impl HomeState {
    pub fn new() -> Self {
        Self {
            input: InputBox::new(),
            editing: false,
        }
    }
}

impl SearchState {
    pub fn new(query: &str) -> Self {
        Self {
            input: InputBox::with_content(query),
            editing: query.trim().is_empty(),
            remote: false,
            arch: crate::scrape::debian_arch(),
        }
    }
}

impl DetailsState {
    pub fn new() -> Self {
        Self {
            record: None,
            description: None,
            screenshots: None,
            icon: None,
            scroll: 0,
        }
    }
}

impl SettingsModeState {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            selected: 0,
            editing: false,
            edit_buffer: String::new(),
            edit_cursor: 0,
            message: None,
        }
    }
}

// ========== App ==========

pub struct App {
    pub history: History,
    /// Stored settings only; session overrides from the command line stay out
    pub config: Config,
    pub config_path: PathBuf,
    pub i18n: I18n,
    pub labels: Vec<TaggedText>,
    /// `None` until the detector has answered
    pub environment: Option<Environment>,
    pub status: PackageStatus,
    /// False from a page load until its snapshot arrives
    pub status_loaded: bool,
    /// Successful actions since the current page load started, replayed
    /// over its snapshot in case the daemon answered it before they ran
    pub applied: Vec<(PackageAction, String)>,
    /// Bumped on every page load; events from older loads are dropped
    pub seq: u64,
    /// Packages with an action in flight
    pub busy: HashMap<String, PackageAction>,
    pub modal: Option<Modal>,
    /// One-line hint shown in the footer until the next key
    pub flash: Option<String>,
    pub should_quit: bool,
    // page states
    pub home: HomeState,
    pub search: SearchState,
    pub list: CardList,
    pub details: DetailsState,
    pub settings: SettingsModeState,
}

impl App {
    pub fn new(config: Config, i18n: I18n, start: Location) -> Self {
        let mut labels: Vec<TaggedText> = CHROME_KEYS.iter().copied().map(TaggedText::new).collect();
        i18n.translate_labels(&mut labels);
        Self {
            history: History::new(start),
            config,
            config_path: Config::path(),
            i18n,
            labels,
            environment: None,
            status: PackageStatus::default(),
            status_loaded: false,
            applied: Vec::new(),
            seq: 0,
            busy: HashMap::new(),
            modal: None,
            flash: None,
            should_quit: false,
            home: HomeState::new(),
            search: SearchState::new(""),
            list: CardList::new(),
            details: DetailsState::new(),
            settings: SettingsModeState::new(),
        }
    }

    pub fn with_config_path(mut self, path: PathBuf) -> Self {
        self.config_path = path;
        self
    }

    pub fn page(&self) -> Page {
        self.history.current().page
    }

    pub fn page_title(&self) -> String {
        self.i18n.t(self.page().title_key())
    }

    pub fn t(&self, key: &str) -> String {
        self.i18n.t(key)
    }

    pub fn t_with(&self, key: &str, params: &[(&str, &str)]) -> String {
        self.i18n.t_with(key, params)
    }

    /// Chrome label, already translated
    pub fn label<'a>(&'a self, key: &'a str) -> &'a str {
        self.labels
            .iter()
            .find(|label| label.key == key)
            .map(|label| label.text.as_str())
            .unwrap_or(key)
    }

    /// A text field on the current page has focus
    pub fn is_editing(&self) -> bool {
        match self.page() {
            Page::Home => self.home.editing,
            Page::Search => self.search.editing,
            Page::Settings => self.settings.editing,
            _ => false,
        }
    }

    pub fn environment_available(&self) -> bool {
        self.environment.as_ref().map(|env| env.available).unwrap_or(false)
    }

    /// The daemon is there but the page's snapshot has not arrived yet
    pub fn status_pending(&self) -> bool {
        self.environment_available() && !self.status_loaded
    }

    pub fn card_state(&self, pkg: &str) -> CardState {
        self.status.state_of(pkg, self.environment_available())
    }

    pub fn busy_action(&self, pkg: &str) -> Option<PackageAction> {
        self.busy.get(normalize_package_name(pkg)).copied()
    }

    /// Starts a new page load and returns its sequence number
    pub fn next_seq(&mut self) -> u64 {
        self.seq += 1;
        self.status_loaded = false;
        self.applied.clear();
        self.seq
    }

    pub fn is_current(&self, seq: u64) -> bool {
        seq == self.seq
    }

    /// Switches language, persists the choice and re-translates the chrome
    pub fn set_language(&mut self, lang: Language) {
        self.i18n.set_language(lang);
        self.i18n.translate_labels(&mut self.labels);
        self.config.language = Some(lang.code().to_string());
        if let Err(e) = self.config.save_to(&self.config_path) {
            log::error!("could not persist language: {}", e);
        }
        log::info!("language switched to {}", lang);
    }

    // ----- actions -----

    /// Validates an action request on a card. Returns true when the caller
    /// should send it to the daemon right away; removals open a
    /// confirmation first.
    pub fn request_action(&mut self, action: PackageAction, pkg: &str) -> bool {
        let pkg = normalize_package_name(pkg).to_string();
        if self.status_pending() {
            self.flash = Some(self.t("common.checking_status"));
            return false;
        }
        let state = self.card_state(&pkg);
        if !state.allows(action) {
            if state == CardState::EnvironmentUnavailable {
                self.flash = Some(self.t("common.andistro_only"));
            }
            return false;
        }
        if let Some(running) = self.busy.get(&pkg) {
            log::debug!("ignoring {:?} on {}: {:?} still running", action, pkg, running);
            return false;
        }
        if action.needs_confirmation() {
            self.modal = Some(Modal::Confirm {
                action,
                message: self.t_with("notice.confirm_remove", &[("pkg", pkg.as_str())]),
                pkg,
            });
            return false;
        }
        self.busy.insert(pkg, action);
        true
    }

    /// Accepts the open confirmation; returns the action to dispatch
    pub fn confirm_modal(&mut self) -> Option<(PackageAction, String)> {
        match self.modal.take() {
            Some(Modal::Confirm { action, pkg, .. }) => {
                if self.busy.contains_key(&pkg) || !self.card_state(&pkg).allows(action) {
                    log::debug!("dropping confirmed {:?} on {}: card changed", action, pkg);
                    return None;
                }
                self.busy.insert(pkg.clone(), action);
                Some((action, pkg))
            }
            other => {
                self.modal = other;
                None
            }
        }
    }

    pub fn dismiss_modal(&mut self) {
        self.modal = None;
    }

    /// Takes the page's snapshot and re-applies the actions that succeeded
    /// while it was in flight
    pub fn apply_status(&mut self, mut status: PackageStatus) {
        for (action, pkg) in &self.applied {
            status.apply_success(*action, pkg);
        }
        self.status = status;
        self.status_loaded = true;
    }

    /// Applies a daemon answer. Only success changes the sets.
    pub fn finish_action(&mut self, pkg: &str, action: PackageAction, result: Result<(), String>) {
        let pkg = normalize_package_name(pkg).to_string();
        self.busy.remove(&pkg);
        match result {
            Ok(()) => {
                self.status.apply_success(action, &pkg);
                self.applied.push((action, pkg.clone()));
                if let Some(key) = action.success_key() {
                    self.modal = Some(Modal::Notice {
                        kind: NoticeKind::Success,
                        message: self.t_with(key, &[("pkg", pkg.as_str())]),
                    });
                }
            }
            Err(e) => {
                log::error!("{:?} {} failed: {}", action, pkg, e);
                self.modal = Some(Modal::Notice {
                    kind: NoticeKind::Failure,
                    message: self.t_with(action.failure_key(), &[("pkg", pkg.as_str())]),
                });
            }
        }
    }

    // ----- settings -----

    pub fn build_settings_items(&mut self) {
        self.settings.items = vec![
            SettingsItem::Section("settings.section_interface"),
            SettingsItem::Language(self.i18n.language()),
            SettingsItem::Section("settings.section_sources"),
            SettingsItem::TextEdit {
                label_key: "settings.daemon_url",
                key: "daemon_url",
                value: self.config.daemon_url.clone(),
            },
            SettingsItem::TextEdit {
                label_key: "settings.relay_url",
                key: "relay_url",
                value: self.config.relay_url.clone().unwrap_or_default(),
            },
            SettingsItem::TextEdit {
                label_key: "settings.package_site",
                key: "package_site",
                value: self.config.package_site.clone(),
            },
            SettingsItem::TextEdit {
                label_key: "settings.screenshot_site",
                key: "screenshot_site",
                value: self.config.screenshot_site.clone(),
            },
            SettingsItem::TextEdit {
                label_key: "settings.suite",
                key: "suite",
                value: self.config.suite.clone(),
            },
        ];
        self.settings.selected = 0;
        self.settings.editing = false;
        self.settings.message = None;
    }

    fn focused_settings_index(&self) -> Option<usize> {
        self.settings
            .items
            .iter()
            .enumerate()
            .filter(|(_, item)| !matches!(item, SettingsItem::Section(_)))
            .map(|(i, _)| i)
            .nth(self.settings.selected)
    }

    pub fn settings_focusable_count(&self) -> usize {
        self.settings
            .items
            .iter()
            .filter(|item| !matches!(item, SettingsItem::Section(_)))
            .count()
    }

    /// Enter on the focused item: cycles the language or starts editing
    pub fn activate_settings_item(&mut self) {
        let Some(idx) = self.focused_settings_index() else {
            return;
        };
        match &self.settings.items[idx] {
            SettingsItem::Language(current) => {
                let next = current.other();
                self.settings.items[idx] = SettingsItem::Language(next);
                self.set_language(next);
            }
            SettingsItem::TextEdit { value, .. } => {
                self.settings.edit_buffer = value.clone();
                self.settings.edit_cursor = self.settings.edit_buffer.chars().count();
                self.settings.editing = true;
            }
            SettingsItem::Section(_) => {}
        }
    }

    /// Writes the edit buffer back into the item and the config
    pub fn confirm_settings_edit(&mut self) {
        if let Some(idx) = self.focused_settings_index() {
            let buf = self.settings.edit_buffer.trim().to_string();
            if let SettingsItem::TextEdit { key, value, .. } = &mut self.settings.items[idx] {
                *value = buf.clone();
                match *key {
                    "daemon_url" if !buf.is_empty() => self.config.daemon_url = buf,
                    "relay_url" => {
                        self.config.relay_url = if buf.is_empty() { None } else { Some(buf) };
                    }
                    "package_site" if !buf.is_empty() => self.config.package_site = buf,
                    "screenshot_site" if !buf.is_empty() => self.config.screenshot_site = buf,
                    "suite" if !buf.is_empty() => self.config.suite = buf,
                    _ => {}
                }
                self.settings.message = Some(self.t("settings.restart_needed"));
            }
        }
        self.settings.editing = false;
    }

    pub fn save_settings(&mut self) {
        self.settings.message = Some(match self.config.save_to(&self.config_path) {
            Ok(()) => {
                let path = self.config_path.display().to_string();
                self.t_with("settings.saved", &[("path", path.as_str())])
            }
            Err(e) => self.t_with("settings.save_failed", &[("error", e.to_string().as_str())]),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> App {
        App::new(
            Config::default(),
            I18n::load(Language::EnUs, None),
            Location::new(Page::Home),
        )
    }

    fn with_environment(mut app: App, available: bool) -> App {
        app.environment = Some(if available {
            Environment::available()
        } else {
            Environment::unavailable()
        });
        app.status_loaded = true;
        app
    }

    #[test]
    fn failed_install_keeps_card_state_and_shows_failure() {
        let mut app = with_environment(app(), true);
        assert!(app.request_action(PackageAction::Install, "gimp"));
        app.finish_action("gimp", PackageAction::Install, Err("code 1".to_string()));

        assert_eq!(app.card_state("gimp"), CardState::NotInstalled);
        assert!(app.busy.is_empty());
        match &app.modal {
            Some(Modal::Notice { kind, message }) => {
                assert_eq!(*kind, NoticeKind::Failure);
                assert!(message.contains("gimp"));
            }
            other => panic!("expected failure notice, got {:?}", other),
        }
    }

    #[test]
    fn second_request_on_busy_card_is_ignored() {
        let mut app = with_environment(app(), true);
        assert!(app.request_action(PackageAction::Install, "gimp"));
        assert!(!app.request_action(PackageAction::Install, "gimp"));
        app.finish_action("gimp", PackageAction::Install, Ok(()));
        assert_eq!(app.card_state("gimp"), CardState::InstalledNoUpdate);
    }

    #[test]
    fn removal_waits_for_confirmation() {
        let mut app = with_environment(app(), true);
        app.status = PackageStatus::from_daemon(["vim"], &[]);

        assert!(!app.request_action(PackageAction::Remove, "vim"));
        assert!(matches!(app.modal, Some(Modal::Confirm { .. })));
        assert!(app.busy.is_empty());

        assert_eq!(app.confirm_modal(), Some((PackageAction::Remove, "vim".to_string())));
        assert_eq!(app.busy_action("vim"), Some(PackageAction::Remove));
        app.finish_action("vim", PackageAction::Remove, Ok(()));
        assert_eq!(app.card_state("vim"), CardState::NotInstalled);
    }

    #[test]
    fn confirmation_is_dropped_when_the_card_changed() {
        let mut app = with_environment(app(), true);
        app.status = PackageStatus::from_daemon(["vim"], &[]);
        assert!(!app.request_action(PackageAction::Remove, "vim"));

        // a fresh snapshot says vim is gone before the user answers
        app.apply_status(PackageStatus::default());
        assert_eq!(app.confirm_modal(), None);
        assert!(app.busy.is_empty());
        assert!(app.modal.is_none());
    }

    #[test]
    fn language_choice_survives_a_restart() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut app = app().with_config_path(path.clone());
        app.build_settings_items();
        app.settings.selected = 0;
        app.activate_settings_item();
        assert_eq!(app.i18n.language(), Language::PtBr);
        assert_eq!(app.label("nav.updates"), "Atualizações");

        let stored = Config::load_from(&path).unwrap();
        assert_eq!(stored.language.as_deref(), Some("pt-BR"));
        let lang = crate::i18n::resolve_language(None, stored.language.as_deref(), Some("en_US.UTF-8"));
        assert_eq!(lang, Language::PtBr);
        // an explicit --lang still wins over the stored choice
        let lang = crate::i18n::resolve_language(Some("en-US"), stored.language.as_deref(), None);
        assert_eq!(lang, Language::EnUs);
    }

    #[test]
    fn saving_settings_writes_only_stored_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut app = app().with_config_path(path.clone());
        app.build_settings_items();
        app.settings.selected = 5;
        app.activate_settings_item();
        app.settings.edit_buffer = "sid".to_string();
        app.confirm_settings_edit();
        app.save_settings();

        let stored = Config::load_from(&path).unwrap();
        assert_eq!(stored.suite, "sid");
        assert_eq!(stored.daemon_url, crate::daemon::DEFAULT_DAEMON_URL);
        assert!(app.settings.message.unwrap_or_default().contains("config.toml"));
    }

    #[test]
    fn actions_are_refused_without_environment() {
        let mut app = with_environment(app(), false);
        assert!(!app.request_action(PackageAction::Install, "gimp"));
        assert_eq!(app.flash.as_deref(), Some("Available only on AnDistro."));
        // still detecting counts as unavailable
        let mut detecting = self::app();
        assert!(!detecting.request_action(PackageAction::Install, "gimp"));
    }

    #[test]
    fn action_not_offered_by_state_is_refused() {
        let mut app = with_environment(app(), true);
        assert!(!app.request_action(PackageAction::Update, "gimp"));
        assert!(app.flash.is_none());
    }

    #[test]
    fn card_list_flattens_sections() {
        let mut list = CardList::new();
        list.set_sections(vec![
            CardSection {
                title_key: Some("instalados.apps"),
                records: vec![PackageRecord::new("gimp"), PackageRecord::new("vlc")],
            },
            CardSection {
                title_key: Some("instalados.addons"),
                records: vec![],
            },
            CardSection {
                title_key: Some("instalados.addons"),
                records: vec![PackageRecord::new("gimp-help-en")],
            },
        ]);
        assert_eq!(list.sections.len(), 2);
        assert_eq!(list.len(), 3);
        list.select_by(10);
        assert_eq!(list.selected_record().map(|r| r.name.as_str()), Some("gimp-help-en"));
        list.select_by(-10);
        assert_eq!(list.selected, 0);
    }

    #[test]
    fn settings_edit_writes_config() {
        let mut app = app();
        app.build_settings_items();
        // 0 = language, 1 = daemon url, 2 = relay
        app.settings.selected = 2;
        app.activate_settings_item();
        assert!(app.settings.editing);
        app.settings.edit_buffer = "https://corsproxy.io/?".to_string();
        app.confirm_settings_edit();
        assert_eq!(app.config.relay_url.as_deref(), Some("https://corsproxy.io/?"));

        app.activate_settings_item();
        app.settings.edit_buffer.clear();
        app.confirm_settings_edit();
        assert_eq!(app.config.relay_url, None);
    }

    #[test]
    fn chrome_labels_follow_language() {
        let mut app = app();
        assert_eq!(app.label("nav.updates"), "Updates");
        app.i18n.set_language(Language::PtBr);
        app.i18n.translate_labels(&mut app.labels);
        assert_eq!(app.label("nav.updates"), "Atualizações");
    }
}
