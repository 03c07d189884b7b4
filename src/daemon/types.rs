//! Wire types exchanged with the package daemon

use serde::{Deserialize, Serialize};

/// One package as the daemon (or the local catalog) describes it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageRecord {
    #[serde(rename = "nome_pacote")]
    pub name: String,
    #[serde(rename = "nome_programa", default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(rename = "descricao", default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "versao_atual", default, skip_serializing_if = "Option::is_none")]
    pub current_version: Option<String>,
    #[serde(rename = "versao_nova", default, skip_serializing_if = "Option::is_none")]
    pub new_version: Option<String>,
    #[serde(rename = "tipo", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl PackageRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Name shown as the card title
    pub fn title(&self) -> &str {
        match self.display_name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => &self.name,
        }
    }

    /// Package name without an architecture suffix (`foo:amd64` -> `foo`)
    pub fn base_name(&self) -> &str {
        normalize_package_name(&self.name)
    }

    pub fn description_text(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }
}

pub fn normalize_package_name(name: &str) -> &str {
    name.split(':').next().unwrap_or(name).trim()
}

/// `GET /ping`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PingResponse {
    pub status: String,
    pub distro: String,
    pub arch: String,
}

/// `GET /search`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SearchResponse {
    pub results: Vec<PackageRecord>,
}

/// `GET /installed`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct InstalledResponse {
    pub apps: Vec<PackageRecord>,
    pub addons: Vec<PackageRecord>,
}

/// `GET /installed-names`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct InstalledNamesResponse {
    pub packages: Vec<String>,
}

/// `GET /updates`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UpdatesResponse {
    pub updates: Vec<PackageRecord>,
}

/// Body of `POST /install`, `/remove` and `/open`
#[derive(Debug, Clone, Serialize)]
pub struct PackageRequest<'a> {
    pub pkg: &'a str,
}

/// `POST /install` and `POST /remove`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CommandResponse {
    pub pkg: String,
    pub code: Option<i64>,
    pub stdout: String,
    pub stderr: String,
}

/// `POST /open`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OpenResponse {
    pub ok: bool,
    pub cmd: Option<String>,
    pub error: Option<String>,
}

/// `GET /icon`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct IconResponse {
    pub found: bool,
    pub path: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_entry_parses_from_daemon_json() {
        let body = r#"{"updates":[{"nome_pacote":"vim","versao_atual":"1.0","versao_nova":"1.1"}]}"#;
        let parsed: UpdatesResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.updates.len(), 1);
        let vim = &parsed.updates[0];
        assert_eq!(vim.name, "vim");
        assert_eq!(vim.title(), "vim");
        assert_eq!(vim.current_version.as_deref(), Some("1.0"));
        assert_eq!(vim.new_version.as_deref(), Some("1.1"));
    }

    #[test]
    fn missing_lists_default_to_empty() {
        let parsed: InstalledResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.apps.is_empty());
        assert!(parsed.addons.is_empty());

        let parsed: CommandResponse = serde_json::from_str(r#"{"error":"missing pkg"}"#).unwrap();
        assert_eq!(parsed.code, None);
    }

    #[test]
    fn title_prefers_display_name() {
        let mut record = PackageRecord::new("firefox-esr");
        assert_eq!(record.title(), "firefox-esr");
        record.display_name = Some("Firefox".to_string());
        assert_eq!(record.title(), "Firefox");
        record.display_name = Some("  ".to_string());
        assert_eq!(record.title(), "firefox-esr");
    }

    #[test]
    fn base_name_strips_architecture_suffix() {
        assert_eq!(PackageRecord::new("libc6:amd64").base_name(), "libc6");
        assert_eq!(normalize_package_name("vim"), "vim");
    }
}
