//! Installed / update membership and the per-card action state machine

use crate::daemon::{normalize_package_name, Daemon, PackageRecord};
use crate::environment::Environment;
use std::collections::HashSet;

/// What a package card can currently offer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardState {
    NotInstalled,
    InstalledNoUpdate,
    InstalledWithUpdate,
    EnvironmentUnavailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PackageAction {
    Install,
    Update,
    Open,
    Remove,
}

impl PackageAction {
    pub fn label_key(&self) -> &'static str {
        match self {
            PackageAction::Install => "common.install",
            PackageAction::Update => "common.update",
            PackageAction::Open => "common.open",
            PackageAction::Remove => "common.remove",
        }
    }

    /// Key that triggers the action on a selected card
    pub fn hotkey(&self) -> char {
        match self {
            PackageAction::Install => 'i',
            PackageAction::Update => 'u',
            PackageAction::Open => 'o',
            PackageAction::Remove => 'r',
        }
    }

    pub fn from_hotkey(c: char) -> Option<PackageAction> {
        match c {
            'i' => Some(PackageAction::Install),
            'u' => Some(PackageAction::Update),
            'o' => Some(PackageAction::Open),
            'r' => Some(PackageAction::Remove),
            _ => None,
        }
    }

    /// Label shown while the daemon works on it
    pub fn progress_key(&self) -> &'static str {
        match self {
            PackageAction::Install => "common.installing",
            PackageAction::Update => "common.updating",
            PackageAction::Open => "common.opening",
            PackageAction::Remove => "common.removing",
        }
    }

    /// Notice shown on success, if any
    pub fn success_key(&self) -> Option<&'static str> {
        match self {
            PackageAction::Install => Some("notice.install_success"),
            PackageAction::Update => Some("notice.update_success"),
            PackageAction::Remove => Some("notice.remove_success"),
            PackageAction::Open => None,
        }
    }

    pub fn failure_key(&self) -> &'static str {
        match self {
            PackageAction::Install => "notice.install_failed",
            PackageAction::Update => "notice.update_failed",
            PackageAction::Open => "notice.open_failed",
            PackageAction::Remove => "notice.remove_failed",
        }
    }

    pub fn needs_confirmation(&self) -> bool {
        matches!(self, PackageAction::Remove)
    }
}

/// One entry of a card's action area
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionButton {
    pub action: PackageAction,
    pub enabled: bool,
    pub tooltip_key: Option<&'static str>,
}

impl ActionButton {
    fn enabled(action: PackageAction) -> Self {
        Self {
            action,
            enabled: true,
            tooltip_key: None,
        }
    }

    fn disabled(action: PackageAction) -> Self {
        Self {
            action,
            enabled: false,
            tooltip_key: Some("common.andistro_only"),
        }
    }
}

impl CardState {
    pub fn buttons(&self) -> Vec<ActionButton> {
        use PackageAction::*;
        match self {
            CardState::NotInstalled => vec![ActionButton::enabled(Install)],
            CardState::InstalledNoUpdate => {
                vec![ActionButton::enabled(Open), ActionButton::enabled(Remove)]
            }
            CardState::InstalledWithUpdate => vec![
                ActionButton::enabled(Update),
                ActionButton::enabled(Open),
                ActionButton::enabled(Remove),
            ],
            CardState::EnvironmentUnavailable => vec![
                ActionButton::disabled(Install),
                ActionButton::disabled(Open),
                ActionButton::disabled(Remove),
            ],
        }
    }

    pub fn allows(&self, action: PackageAction) -> bool {
        self.buttons()
            .iter()
            .any(|button| button.action == action && button.enabled)
    }

    /// First enabled action, used as the card's primary action
    pub fn primary(&self) -> Option<PackageAction> {
        self.buttons()
            .into_iter()
            .find(|button| button.enabled)
            .map(|button| button.action)
    }
}

/// Installed-set and update-set as last reported by the daemon, plus local
/// changes from successful actions
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageStatus {
    installed: HashSet<String>,
    updates: HashSet<String>,
}

impl PackageStatus {
    /// Builds both sets. Names with an update that the daemon did not list
    /// as installed are added to the installed-set.
    pub fn from_daemon<I, S>(installed: I, updates: &[PackageRecord]) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let installed: HashSet<String> = installed
            .into_iter()
            .map(|name| normalize_package_name(name.as_ref()).to_string())
            .filter(|name| !name.is_empty())
            .collect();
        let updates: HashSet<String> = updates
            .iter()
            .map(|record| record.base_name().to_string())
            .filter(|name| !name.is_empty())
            .collect();

        let mut status = Self { installed, updates };
        status.reconcile();
        status
    }

    fn reconcile(&mut self) {
        let mut orphans: Vec<&String> = self.updates.difference(&self.installed).collect();
        if orphans.is_empty() {
            return;
        }
        orphans.sort();
        log::warn!(
            "{} package(s) have updates but are not listed as installed: {:?}",
            orphans.len(),
            orphans
        );
        let orphans: Vec<String> = orphans.into_iter().cloned().collect();
        self.installed.extend(orphans);
    }

    pub fn is_installed(&self, name: &str) -> bool {
        self.installed.contains(normalize_package_name(name))
    }

    pub fn has_update(&self, name: &str) -> bool {
        self.updates.contains(normalize_package_name(name))
    }

    pub fn installed_count(&self) -> usize {
        self.installed.len()
    }

    pub fn update_count(&self) -> usize {
        self.updates.len()
    }

    pub fn state_of(&self, name: &str, environment_available: bool) -> CardState {
        if !environment_available {
            return CardState::EnvironmentUnavailable;
        }
        match (self.is_installed(name), self.has_update(name)) {
            (true, true) => CardState::InstalledWithUpdate,
            (true, false) => CardState::InstalledNoUpdate,
            // an update for something not installed cannot be built by
            // `from_daemon`, but local edits could in theory produce it
            (false, true) => CardState::InstalledWithUpdate,
            (false, false) => CardState::NotInstalled,
        }
    }

    /// Records a successful action in place. Failed actions must not be
    /// passed here.
    pub fn apply_success(&mut self, action: PackageAction, name: &str) {
        let name = normalize_package_name(name).to_string();
        match action {
            PackageAction::Install | PackageAction::Update => {
                self.updates.remove(&name);
                self.installed.insert(name);
            }
            PackageAction::Remove => {
                self.installed.remove(&name);
                self.updates.remove(&name);
            }
            PackageAction::Open => {}
        }
    }
}

/// Everything a page needs to derive card states
#[derive(Debug, Clone, Default)]
pub struct StatusSnapshot {
    pub status: PackageStatus,
    pub updates: Vec<PackageRecord>,
    /// Set when `/updates` itself failed, so the updates page can say so
    pub updates_error: Option<String>,
}

/// Fetches installed names and updates. Either call failing leaves its set
/// empty; with no environment nothing is fetched.
pub async fn load_status(daemon: &dyn Daemon, environment: &Environment) -> StatusSnapshot {
    if !environment.available {
        return StatusSnapshot::default();
    }

    let (names, updates) = tokio::join!(daemon.installed_names(), daemon.updates());

    let names = names.unwrap_or_else(|e| {
        log::error!("{}: {}", e.endpoint(), e);
        Vec::new()
    });
    let (updates, updates_error) = match updates {
        Ok(updates) => (updates, None),
        Err(e) => {
            log::error!("{}: {}", e.endpoint(), e);
            (Vec::new(), Some(e.to_string()))
        }
    };

    StatusSnapshot {
        status: PackageStatus::from_daemon(names, &updates),
        updates,
        updates_error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeDaemon;

    fn vim_update() -> PackageRecord {
        let mut vim = PackageRecord::new("vim");
        vim.current_version = Some("1.0".to_string());
        vim.new_version = Some("1.1".to_string());
        vim
    }

    #[test]
    fn states_follow_set_membership() {
        let status = PackageStatus::from_daemon(["vim", "gimp"], &[vim_update()]);
        assert_eq!(status.state_of("vim", true), CardState::InstalledWithUpdate);
        assert_eq!(status.state_of("gimp", true), CardState::InstalledNoUpdate);
        assert_eq!(status.state_of("emacs", true), CardState::NotInstalled);
        assert_eq!(status.state_of("gimp", false), CardState::EnvironmentUnavailable);
    }

    #[test]
    fn architecture_suffix_is_ignored() {
        let status = PackageStatus::from_daemon(["libc6:amd64"], &[]);
        assert!(status.is_installed("libc6"));
        assert!(status.is_installed("libc6:arm64"));
    }

    #[test]
    fn update_without_install_is_reconciled() {
        let status = PackageStatus::from_daemon(Vec::<String>::new(), &[vim_update()]);
        assert!(status.is_installed("vim"));
        assert_eq!(status.state_of("vim", true), CardState::InstalledWithUpdate);
    }

    #[test]
    fn successful_update_clears_update_and_keeps_installed() {
        let mut status = PackageStatus::from_daemon(["vim"], &[vim_update()]);
        status.apply_success(PackageAction::Update, "vim");
        assert!(!status.has_update("vim"));
        assert!(status.is_installed("vim"));
        assert_eq!(status.state_of("vim", true), CardState::InstalledNoUpdate);
    }

    #[test]
    fn successful_remove_clears_both_sets() {
        let mut status = PackageStatus::from_daemon(["vim"], &[vim_update()]);
        status.apply_success(PackageAction::Remove, "vim");
        assert!(!status.is_installed("vim"));
        assert!(!status.has_update("vim"));
        assert_eq!(status.state_of("vim", true), CardState::NotInstalled);
    }

    #[test]
    fn successful_install_assumes_no_update() {
        let mut status = PackageStatus::default();
        status.apply_success(PackageAction::Install, "gimp");
        assert_eq!(status.state_of("gimp", true), CardState::InstalledNoUpdate);
    }

    #[test]
    fn open_changes_nothing() {
        let mut status = PackageStatus::from_daemon(["vim"], &[]);
        let before = status.clone();
        status.apply_success(PackageAction::Open, "vim");
        assert_eq!(status, before);
    }

    #[test]
    fn unavailable_environment_disables_every_button() {
        let buttons = CardState::EnvironmentUnavailable.buttons();
        assert!(!buttons.is_empty());
        for button in &buttons {
            assert!(!button.enabled);
            assert_eq!(button.tooltip_key, Some("common.andistro_only"));
        }
        assert_eq!(CardState::EnvironmentUnavailable.primary(), None);
    }

    #[test]
    fn action_areas_per_state() {
        assert_eq!(CardState::NotInstalled.primary(), Some(PackageAction::Install));
        assert!(!CardState::NotInstalled.allows(PackageAction::Remove));
        assert_eq!(CardState::InstalledNoUpdate.primary(), Some(PackageAction::Open));
        assert!(!CardState::InstalledNoUpdate.allows(PackageAction::Update));
        assert_eq!(CardState::InstalledWithUpdate.primary(), Some(PackageAction::Update));
        assert!(CardState::InstalledWithUpdate.allows(PackageAction::Remove));
    }

    #[test]
    fn hotkeys_round_trip() {
        for action in [
            PackageAction::Install,
            PackageAction::Update,
            PackageAction::Open,
            PackageAction::Remove,
        ] {
            assert_eq!(PackageAction::from_hotkey(action.hotkey()), Some(action));
        }
        assert_eq!(PackageAction::from_hotkey('x'), None);
    }

    #[tokio::test]
    async fn snapshot_from_daemon() {
        let daemon = FakeDaemon::new()
            .with_installed(&["vim", "git"])
            .with_updates(vec![vim_update()]);
        let snapshot = load_status(&daemon, &Environment::available()).await;
        assert_eq!(snapshot.status.installed_count(), 2);
        assert_eq!(snapshot.status.update_count(), 1);
        assert_eq!(snapshot.updates.len(), 1);
        assert!(snapshot.updates_error.is_none());
    }

    #[tokio::test]
    async fn snapshot_skips_daemon_without_environment() {
        let daemon = FakeDaemon::new().with_installed(&["vim"]);
        let snapshot = load_status(&daemon, &Environment::unavailable()).await;
        assert_eq!(snapshot.status.installed_count(), 0);
        assert!(daemon.calls().is_empty());
    }

    #[tokio::test]
    async fn failing_daemon_gives_empty_sets_and_an_updates_error() {
        let daemon = FakeDaemon::offline();
        let snapshot = load_status(&daemon, &Environment::available()).await;
        assert_eq!(snapshot.status, PackageStatus::default());
        assert!(snapshot.updates_error.is_some());
    }
}
