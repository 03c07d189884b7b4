//! Description lookup: daemon search, then the remote package page, then a
//! localized placeholder

use crate::daemon::{normalize_package_name, Daemon};
use crate::scrape::{normalize_text, PackageSite};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::sync::Arc;

/// One stage of the chain. An error or an empty string moves on to the
/// next stage.
#[async_trait]
pub trait DescriptionSource: Send + Sync {
    fn name(&self) -> &'static str;

    async fn describe(&self, pkg: &str) -> Result<String>;
}

/// Daemon `/search`, keeping only the record whose name matches exactly
pub struct DaemonDescriptions {
    daemon: Arc<dyn Daemon>,
    lang: Option<String>,
}

impl DaemonDescriptions {
    pub fn new(daemon: Arc<dyn Daemon>, lang: Option<String>) -> Self {
        Self { daemon, lang }
    }
}

#[async_trait]
impl DescriptionSource for DaemonDescriptions {
    fn name(&self) -> &'static str {
        "daemon"
    }

    async fn describe(&self, pkg: &str) -> Result<String> {
        let wanted = normalize_package_name(pkg);
        let results = self.daemon.search(wanted, self.lang.as_deref()).await?;
        results
            .into_iter()
            .find(|record| record.base_name() == wanted)
            .and_then(|record| record.description)
            .ok_or_else(|| anyhow!("no exact match for {}", wanted))
    }
}

/// Remote package index page
pub struct SiteDescriptions {
    site: Arc<PackageSite>,
}

impl SiteDescriptions {
    pub fn new(site: Arc<PackageSite>) -> Self {
        Self { site }
    }
}

#[async_trait]
impl DescriptionSource for SiteDescriptions {
    fn name(&self) -> &'static str {
        "site"
    }

    async fn describe(&self, pkg: &str) -> Result<String> {
        Ok(self.site.describe(normalize_package_name(pkg)).await?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Description {
    pub text: String,
    /// Stage that produced the text; `None` means the placeholder
    pub source: Option<&'static str>,
}

pub struct DescriptionChain {
    stages: Vec<Arc<dyn DescriptionSource>>,
}

impl DescriptionChain {
    pub fn new(stages: Vec<Arc<dyn DescriptionSource>>) -> Self {
        Self { stages }
    }

    /// The usual order: daemon first, remote site second
    pub fn standard(daemon: Arc<dyn Daemon>, site: Arc<PackageSite>, lang: Option<String>) -> Self {
        Self::new(vec![
            Arc::new(DaemonDescriptions::new(daemon, lang)),
            Arc::new(SiteDescriptions::new(site)),
        ])
    }

    /// Stops at the first stage with non-blank text; later stages are not
    /// called. The result is truncated to `max` characters.
    pub async fn resolve(&self, pkg: &str, placeholder: &str, max: usize) -> Description {
        for stage in &self.stages {
            match stage.describe(pkg).await {
                Ok(text) => {
                    let text = normalize_text(&text);
                    if !text.is_empty() {
                        log::debug!("description of {} from {}", pkg, stage.name());
                        return Description {
                            text: truncate_description(&text, max),
                            source: Some(stage.name()),
                        };
                    }
                    log::debug!("{} gave an empty description for {}", stage.name(), pkg);
                }
                Err(e) => log::warn!("{} description for {} failed: {}", stage.name(), pkg, e),
            }
        }
        Description {
            text: placeholder.to_string(),
            source: None,
        }
    }
}

/// Keeps `max - 3` characters and appends `...` when `text` is longer than
/// `max` characters
pub fn truncate_description(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max.saturating_sub(3)).collect();
    out.push_str("...");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::daemon::PackageRecord;
    use crate::testing::FakeDaemon;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Fixed {
        answer: Option<&'static str>,
        calls: AtomicUsize,
    }

    impl Fixed {
        fn new(answer: Option<&'static str>) -> Arc<Self> {
            Arc::new(Self {
                answer,
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl DescriptionSource for Fixed {
        fn name(&self) -> &'static str {
            "fixed"
        }

        async fn describe(&self, _pkg: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.answer
                .map(str::to_string)
                .ok_or_else(|| anyhow!("stage failed"))
        }
    }

    #[tokio::test]
    async fn first_stage_hit_skips_the_rest() {
        let first = Fixed::new(Some("from daemon"));
        let second = Fixed::new(Some("from site"));
        let chain = DescriptionChain::new(vec![first.clone(), second.clone()]);

        let found = chain.resolve("vim", "placeholder", 400).await;
        assert_eq!(found.text, "from daemon");
        assert_eq!(first.calls(), 1);
        assert_eq!(second.calls(), 0);
    }

    #[tokio::test]
    async fn blank_and_failed_stages_fall_through_to_placeholder() {
        let blank = Fixed::new(Some("  \n\t "));
        let failing = Fixed::new(None);
        let chain = DescriptionChain::new(vec![blank.clone(), failing.clone()]);

        let found = chain.resolve("vim", "Not available yet.", 400).await;
        assert_eq!(found.text, "Not available yet.");
        assert_eq!(found.source, None);
        assert_eq!(failing.calls(), 1);
    }

    #[tokio::test]
    async fn daemon_stage_uses_exact_name_match() {
        let daemon = FakeDaemon::new().with_search(vec![
            PackageRecord::new("vim-tiny").with_description("small vim"),
            PackageRecord::new("vim").with_description("Vi   IMproved"),
        ]);
        let daemon: Arc<dyn Daemon> = Arc::new(daemon);
        let chain = DescriptionChain::new(vec![Arc::new(DaemonDescriptions::new(daemon, None))]);

        let found = chain.resolve("vim:amd64", "-", 400).await;
        assert_eq!(found.text, "Vi IMproved");
        assert_eq!(found.source, Some("daemon"));
    }

    #[tokio::test]
    async fn daemon_without_exact_match_falls_through() {
        let daemon: Arc<dyn Daemon> = Arc::new(
            FakeDaemon::new().with_search(vec![PackageRecord::new("vim-tiny").with_description("x")]),
        );
        let fallback = Fixed::new(Some("from site"));
        let chain = DescriptionChain::new(vec![
            Arc::new(DaemonDescriptions::new(daemon, None)),
            fallback.clone(),
        ]);
        assert_eq!(chain.resolve("vim", "-", 400).await.text, "from site");
    }

    #[tokio::test]
    async fn long_descriptions_are_truncated() {
        let chain = DescriptionChain::new(vec![Fixed::new(Some(
            "Vim is an almost compatible version of the UNIX editor Vi.",
        ))]);
        let found = chain.resolve("vim", "-", 20).await;
        assert_eq!(found.text, "Vim is an almost ...");
    }

    #[test]
    fn truncation_bounds() {
        let long = "x".repeat(500);
        let cut = truncate_description(&long, 400);
        assert!(cut.ends_with("..."));
        assert!(cut.chars().count() <= 403);
        assert_eq!(cut.chars().count(), 400);

        assert_eq!(truncate_description("short", 160), "short");
        let exact = "y".repeat(160);
        assert_eq!(truncate_description(&exact, 160), exact);
        // counts characters, not bytes
        assert_eq!(truncate_description("ãããããã", 5), "ãã...");
    }
}
