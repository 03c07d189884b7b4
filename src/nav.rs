//! Page locations and navigation history

use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Page {
    Home,
    Search,
    Details,
    Installed,
    Updates,
    Recommended,
    Settings,
}

impl Page {
    pub fn slug(&self) -> &'static str {
        match self {
            Page::Home => "home",
            Page::Search => "search",
            Page::Details => "details",
            Page::Installed => "installed",
            Page::Updates => "updates",
            Page::Recommended => "recommended",
            Page::Settings => "settings",
        }
    }

    pub fn title_key(&self) -> &'static str {
        match self {
            Page::Home => "index.title",
            Page::Search => "resultados.title",
            Page::Details => "detalhes.title",
            Page::Installed => "instalados.title",
            Page::Updates => "atualizacoes.title",
            Page::Recommended => "recomendados.title",
            Page::Settings => "settings.title",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub page: Page,
    params: BTreeMap<String, String>,
}

impl Location {
    pub fn new(page: Page) -> Self {
        Self {
            page,
            params: BTreeMap::new(),
        }
    }

    pub fn search(query: &str) -> Self {
        Self::new(Page::Search).with_param("q", query)
    }

    pub fn details(pkg: &str) -> Self {
        Self::new(Page::Details).with_param("pkg", pkg)
    }

    pub fn with_param(mut self, key: &str, value: &str) -> Self {
        self.set_param(key, value);
        self
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    pub fn set_param(&mut self, key: &str, value: &str) {
        self.params.insert(key.to_string(), value.to_string());
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.page.slug())?;
        for (i, (key, value)) in self.params.iter().enumerate() {
            let sep = if i == 0 { '?' } else { '&' };
            write!(f, "{}{}={}", sep, key, urlencoding::encode(value))?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<Location>,
}

impl History {
    pub fn new(start: Location) -> Self {
        Self {
            entries: vec![start],
        }
    }

    pub fn current(&self) -> &Location {
        // never empty: `back` keeps the first entry
        &self.entries[self.entries.len() - 1]
    }

    #[cfg(test)]
    pub fn depth(&self) -> usize {
        self.entries.len()
    }

    pub fn navigate(&mut self, to: Location) {
        log::debug!("navigate {} -> {}", self.current(), to);
        self.entries.push(to);
    }

    /// Changes a parameter of the current entry without adding history
    pub fn replace_param(&mut self, key: &str, value: &str) {
        if let Some(current) = self.entries.last_mut() {
            current.set_param(key, value);
        }
    }

    /// Pops the current entry; the first entry is never popped
    pub fn back(&mut self) -> bool {
        if self.entries.len() > 1 {
            self.entries.pop();
            true
        } else {
            false
        }
    }
}
