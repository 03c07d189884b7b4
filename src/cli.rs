use crate::config::Config;
use crate::nav::{Location, Page};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "andistro-center", version, about = "Terminal software center for AnDistro")]
pub struct Cli {
    /// Interface language for this session (pt-BR or en-US)
    #[arg(long)]
    pub lang: Option<String>,

    /// Daemon origin for this session; the config file is left alone
    #[arg(long)]
    pub daemon_url: Option<String>,

    /// Write logs to this file instead of stderr
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub page: Option<StartPage>,
}

/// Page opened on start
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum StartPage {
    Home,
    /// Search packages
    Search { query: Vec<String> },
    /// Show one package
    Details { pkg: String },
    /// Installed applications and add-ons
    Installed,
    /// Available updates
    Updates,
    /// Recommended applications
    Recommended,
}

impl Cli {
    /// Daemon origin to talk to: the flag if given, the stored one otherwise
    pub fn daemon_url<'a>(&'a self, config: &'a Config) -> &'a str {
        self.daemon_url.as_deref().unwrap_or(&config.daemon_url)
    }

    pub fn start_location(&self) -> Location {
        match &self.page {
            None | Some(StartPage::Home) => Location::new(Page::Home),
            Some(StartPage::Search { query }) => Location::search(&query.join(" ")),
            Some(StartPage::Details { pkg }) => Location::details(pkg),
            Some(StartPage::Installed) => Location::new(Page::Installed),
            Some(StartPage::Updates) => Location::new(Page::Updates),
            Some(StartPage::Recommended) => Location::new(Page::Recommended),
        }
    }
}
