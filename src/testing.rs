//! In-memory daemon used by unit tests

use crate::daemon::{
    CommandResponse, Daemon, InstalledResponse, OpenResponse, PackageRecord, PingResponse,
};
use crate::error::{DaemonError, DaemonResult};
use async_trait::async_trait;
use std::sync::Mutex;

pub struct FakeDaemon {
    online: bool,
    installed: Mutex<InstalledResponse>,
    installed_names: Mutex<Vec<String>>,
    updates: Mutex<Vec<PackageRecord>>,
    search_results: Mutex<Vec<PackageRecord>>,
    command_code: Mutex<i64>,
    open_ok: Mutex<bool>,
    calls: Mutex<Vec<String>>,
}

impl FakeDaemon {
    pub fn new() -> Self {
        Self {
            online: true,
            installed: Mutex::new(InstalledResponse::default()),
            installed_names: Mutex::new(Vec::new()),
            updates: Mutex::new(Vec::new()),
            search_results: Mutex::new(Vec::new()),
            command_code: Mutex::new(0),
            open_ok: Mutex::new(true),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Every call fails as if the daemon were not running
    pub fn offline() -> Self {
        Self {
            online: false,
            ..Self::new()
        }
    }

    pub fn with_installed(self, names: &[&str]) -> Self {
        *self.installed_names.lock().unwrap() = names.iter().map(|n| n.to_string()).collect();
        self.installed.lock().unwrap().apps = names.iter().map(|n| PackageRecord::new(*n)).collect();
        self
    }

    pub fn with_addons(self, names: &[&str]) -> Self {
        self.installed.lock().unwrap().addons =
            names.iter().map(|n| PackageRecord::new(*n)).collect();
        self
    }

    pub fn with_updates(self, updates: Vec<PackageRecord>) -> Self {
        *self.updates.lock().unwrap() = updates;
        self
    }

    pub fn with_search(self, results: Vec<PackageRecord>) -> Self {
        *self.search_results.lock().unwrap() = results;
        self
    }

    pub fn with_command_code(self, code: i64) -> Self {
        *self.command_code.lock().unwrap() = code;
        self
    }

    pub fn with_open_ok(self, ok: bool) -> Self {
        *self.open_ok.lock().unwrap() = ok;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, endpoint: &'static str, arg: &str) -> DaemonResult<()> {
        let entry = if arg.is_empty() {
            endpoint.to_string()
        } else {
            format!("{} {}", endpoint, arg)
        };
        self.calls.lock().unwrap().push(entry);
        if self.online {
            Ok(())
        } else {
            Err(DaemonError::Status {
                endpoint,
                status: 503,
            })
        }
    }

    fn command(&self, endpoint: &'static str, pkg: &str) -> DaemonResult<CommandResponse> {
        self.record(endpoint, pkg)?;
        let code = *self.command_code.lock().unwrap();
        if code == 0 {
            Ok(CommandResponse {
                pkg: pkg.to_string(),
                code: Some(0),
                ..CommandResponse::default()
            })
        } else {
            Err(DaemonError::Rejected { endpoint, code })
        }
    }
}

#[async_trait]
impl Daemon for FakeDaemon {
    async fn ping(&self) -> DaemonResult<PingResponse> {
        self.record("/ping", "")?;
        Ok(PingResponse {
            status: "ok".to_string(),
            distro: "AnDistro".to_string(),
            arch: "aarch64".to_string(),
        })
    }

    async fn search(&self, query: &str, _lang: Option<&str>) -> DaemonResult<Vec<PackageRecord>> {
        self.record("/search", query)?;
        Ok(self.search_results.lock().unwrap().clone())
    }

    async fn installed(&self) -> DaemonResult<InstalledResponse> {
        self.record("/installed", "")?;
        Ok(self.installed.lock().unwrap().clone())
    }

    async fn installed_names(&self) -> DaemonResult<Vec<String>> {
        self.record("/installed-names", "")?;
        Ok(self.installed_names.lock().unwrap().clone())
    }

    async fn updates(&self) -> DaemonResult<Vec<PackageRecord>> {
        self.record("/updates", "")?;
        Ok(self.updates.lock().unwrap().clone())
    }

    async fn install(&self, pkg: &str) -> DaemonResult<CommandResponse> {
        self.command("/install", pkg)
    }

    async fn remove(&self, pkg: &str) -> DaemonResult<CommandResponse> {
        self.command("/remove", pkg)
    }

    async fn open(&self, pkg: &str) -> DaemonResult<OpenResponse> {
        self.record("/open", pkg)?;
        if *self.open_ok.lock().unwrap() {
            Ok(OpenResponse {
                ok: true,
                cmd: Some(pkg.to_string()),
                error: None,
            })
        } else {
            Err(DaemonError::OpenFailed {
                pkg: pkg.to_string(),
            })
        }
    }

    async fn icon(&self, pkg: &str) -> DaemonResult<Option<String>> {
        self.record("/icon", pkg)?;
        Ok(None)
    }
}
