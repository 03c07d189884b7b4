//! Scraping of the remote package index and screenshot site
//!
//! These pages are not a contract: every parser returns what it could find
//! and callers treat an empty result as a failed stage.

use crate::config::Config;
use crate::daemon::PackageRecord;
use crate::error::ScrapeError;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;

/// Suite whose package pages carry the long descriptions
const DESCRIPTION_SUITE: &str = "stable";
pub const MAX_SCREENSHOTS: usize = 8;

pub struct PackageSite {
    client: Client,
    package_site: String,
    screenshot_site: String,
    suite: String,
    relay: Option<String>,
}

impl PackageSite {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .user_agent(concat!("andistro-center/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            package_site: config.package_site.trim_end_matches('/').to_string(),
            screenshot_site: config.screenshot_site.trim_end_matches('/').to_string(),
            suite: config.suite.clone(),
            relay: config.relay_url.clone().filter(|r| !r.trim().is_empty()),
        })
    }

    pub fn description_url(&self, pkg: &str) -> String {
        format!(
            "{}/{}/{}",
            self.package_site,
            DESCRIPTION_SUITE,
            urlencoding::encode(pkg)
        )
    }

    pub fn search_url(&self, query: &str, arch: &str) -> String {
        format!(
            "{}/search?searchon=names&suite={}&section=all&arch={}&keywords={}",
            self.package_site,
            urlencoding::encode(&self.suite),
            urlencoding::encode(arch),
            urlencoding::encode(query)
        )
    }

    pub fn screenshot_url(&self, pkg: &str) -> String {
        format!("{}/package/{}", self.screenshot_site, urlencoding::encode(pkg))
    }

    async fn fetch_html(&self, target: &str) -> Result<String, ScrapeError> {
        let url = match &self.relay {
            Some(relay) => relay_url(relay, target),
            None => target.to_string(),
        };
        log::debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| ScrapeError::Http {
                url: target.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::Status {
                url: target.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|source| ScrapeError::Http {
            url: target.to_string(),
            source,
        })
    }

    /// First paragraph after the first heading of the package page
    pub async fn describe(&self, pkg: &str) -> Result<String, ScrapeError> {
        let url = self.description_url(pkg);
        let body = self.fetch_html(&url).await?;
        parse_description(&body).ok_or(ScrapeError::Empty { url })
    }

    pub async fn search(&self, query: &str, arch: &str) -> Result<Vec<PackageRecord>, ScrapeError> {
        let body = self.fetch_html(&self.search_url(query, arch)).await?;
        Ok(parse_search_results(&body, &self.suite))
    }

    pub async fn screenshots(&self, pkg: &str) -> Result<Vec<String>, ScrapeError> {
        let body = self.fetch_html(&self.screenshot_url(pkg)).await?;
        Ok(parse_screenshots(&body, pkg, &self.screenshot_site))
    }
}

/// `https://relay/?` + percent-encoded target
pub fn relay_url(relay: &str, target: &str) -> String {
    format!("{}{}", relay, urlencoding::encode(target))
}

/// Debian architecture name for the machine we run on
pub fn debian_arch() -> &'static str {
    map_arch(std::env::consts::ARCH)
}

pub fn map_arch(arch: &str) -> &'static str {
    match arch {
        "x86_64" => "amd64",
        "aarch64" => "arm64",
        "arm" => "armhf",
        "x86" => "i386",
        _ => "amd64",
    }
}

pub fn normalize_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn element_text(element: ElementRef<'_>) -> String {
    normalize_text(&element.text().collect::<String>())
}

fn first_text(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    document
        .select(&selector)
        .next()
        .map(element_text)
}

pub fn parse_description(body: &str) -> Option<String> {
    let document = Html::parse_document(body);
    // only the first matching selector counts, even if its text is empty
    ["h2 + p, h3 + p", "h1 + p", "p"]
        .iter()
        .find_map(|selector| first_text(&document, selector))
        .filter(|text| !text.is_empty())
}

/// Extracts `{name, description}` pairs from a search result page.
/// Names are the last path segment of `/{suite}/...` links; the first
/// occurrence of a name wins.
pub fn parse_search_results(body: &str, suite: &str) -> Vec<PackageRecord> {
    let document = Html::parse_document(body);
    let Ok(selector) = Selector::parse(&format!("a[href^=\"/{}/\"]", suite)) else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let mut results = Vec::new();
    for link in document.select(&selector) {
        let href = link.value().attr("href").unwrap_or("");
        let name = href.trim_end_matches('/').rsplit('/').next().unwrap_or("");
        if name.is_empty() || !seen.insert(name.to_string()) {
            continue;
        }

        let parent_text = link
            .parent()
            .and_then(ElementRef::wrap)
            .map(element_text)
            .unwrap_or_default();
        let description = strip_name_prefix(&parent_text, name);

        results.push(PackageRecord::new(name).with_description(description));
    }
    results
}

fn strip_name_prefix(text: &str, name: &str) -> String {
    match text.get(..name.len()) {
        Some(head) if head.eq_ignore_ascii_case(name) => text[name.len()..].trim().to_string(),
        _ => text.to_string(),
    }
}

/// Absolute screenshot links whose href mentions the package, at most
/// [`MAX_SCREENSHOTS`]
pub fn parse_screenshots(body: &str, pkg: &str, site: &str) -> Vec<String> {
    let document = Html::parse_document(body);
    let Ok(selector) = Selector::parse("a[href^=\"/screenshot/\"]") else {
        return Vec::new();
    };

    let mut links: Vec<String> = Vec::new();
    for link in document.select(&selector) {
        let Some(href) = link.value().attr("href") else {
            continue;
        };
        if !href.contains(pkg) {
            continue;
        }
        let absolute = format!("{}{}", site.trim_end_matches('/'), href);
        if !links.contains(&absolute) {
            links.push(absolute);
        }
        if links.len() >= MAX_SCREENSHOTS {
            break;
        }
    }
    links
}

#[cfg(test)]
mod tests {
    use super::*;

    const PACKAGE_PAGE: &str = r#"
        <html><body>
          <p>Navigation text</p>
          <h1>Package: vim (2:9.1)</h1>
          <p>Vi IMproved - enhanced vi editor</p>
          <h2>Vi IMproved - enhanced vi editor</h2>
          <p>Vim is an almost compatible version
             of the UNIX editor Vi.</p>
        </body></html>"#;

    const SEARCH_PAGE: &str = r#"
        <html><body><div id="psearchres">
          <h3>Package vim</h3>
          <ul>
            <li class="trixie"><a class="resultlink" href="/trixie/vim">trixie (stable)</a>
              (editors): Vi IMproved - enhanced vi editor</li>
          </ul>
          <ul>
            <li><a href="/trixie/vim-gtk3">vim-gtk3</a> Vi IMproved, GTK3 GUI</li>
            <li><a href="/trixie/vim-gtk3">vim-gtk3</a> duplicate entry</li>
            <li><a href="/bookworm/vim-tiny">vim-tiny</a> other suite</li>
          </ul>
        </div></body></html>"#;

    #[test]
    fn description_prefers_paragraph_after_h2() {
        assert_eq!(
            parse_description(PACKAGE_PAGE).as_deref(),
            Some("Vim is an almost compatible version of the UNIX editor Vi.")
        );
    }

    #[test]
    fn description_falls_back_to_h1_then_any_paragraph() {
        let h1_only = "<h1>Title</h1><p>  after   h1 </p>";
        assert_eq!(parse_description(h1_only).as_deref(), Some("after h1"));

        let plain = "<div><p>just a paragraph</p></div>";
        assert_eq!(parse_description(plain).as_deref(), Some("just a paragraph"));

        assert_eq!(parse_description("<div>no paragraphs</div>"), None);
    }

    #[test]
    fn search_results_are_deduplicated_and_suite_filtered() {
        let results = parse_search_results(SEARCH_PAGE, "trixie");
        let names: Vec<&str> = results.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["vim", "vim-gtk3"]);
        assert_eq!(results[1].description_text(), "Vi IMproved, GTK3 GUI");
    }

    #[test]
    fn search_description_keeps_text_when_name_is_not_a_prefix() {
        let results = parse_search_results(SEARCH_PAGE, "trixie");
        assert!(results[0].description_text().starts_with("trixie (stable)"));
    }

    #[test]
    fn screenshots_are_filtered_absolutised_and_capped() {
        let mut body = String::from(r#"<a href="/screenshot/other/1">x</a>"#);
        for i in 0..12 {
            body.push_str(&format!(r#"<a href="/screenshot/gimp/{}">shot</a>"#, i));
        }
        body.push_str(r#"<a href="/screenshot/gimp/0">dup</a>"#);

        let links = parse_screenshots(&body, "gimp", "https://screenshots.debian.net/");
        assert_eq!(links.len(), MAX_SCREENSHOTS);
        assert_eq!(links[0], "https://screenshots.debian.net/screenshot/gimp/0");
        assert!(links.iter().all(|l| l.contains("/gimp/")));
    }

    #[test]
    fn host_architectures_map_to_debian_names() {
        assert_eq!(map_arch("x86_64"), "amd64");
        assert_eq!(map_arch("aarch64"), "arm64");
        assert_eq!(map_arch("arm"), "armhf");
        assert_eq!(map_arch("x86"), "i386");
        assert_eq!(map_arch("riscv64"), "amd64");
    }

    #[test]
    fn urls_are_built_from_config() {
        let config = Config {
            relay_url: Some("https://corsproxy.io/?".to_string()),
            ..Config::default()
        };
        let site = PackageSite::new(&config).unwrap();
        assert_eq!(
            site.search_url("vim gtk", "arm64"),
            "https://packages.debian.org/search?searchon=names&suite=trixie&section=all&arch=arm64&keywords=vim%20gtk"
        );
        assert_eq!(site.description_url("vim"), "https://packages.debian.org/stable/vim");
        assert_eq!(site.screenshot_url("gimp"), "https://screenshots.debian.net/package/gimp");
        assert_eq!(
            relay_url("https://corsproxy.io/?", "https://a.b/c?d=1"),
            "https://corsproxy.io/?https%3A%2F%2Fa.b%2Fc%3Fd%3D1"
        );
    }
}
