//! Message template store.
//!
//! Help menus, error categories and status notices come from a YAML
//! catalog compiled into the binary, optionally overlaid by a file named in
//! the config. Rendering never fails: unknown error keys fall back to
//! `general_error`, unknown help categories produce a one-line notice.

use std::path::Path;

use indexmap::IndexMap;
use sb_protocol::Domain;
use serde::Deserialize;

use crate::error::MessagesError;

const EMBEDDED: &str = include_str!("../resources/messages.he.yaml");

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageCatalog {
    #[serde(default)]
    pub help_messages: HelpMessages,
    #[serde(default)]
    pub error_messages: IndexMap<String, String>,
    #[serde(default)]
    pub status_messages: IndexMap<String, String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HelpMessages {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub categories: IndexMap<String, HelpCategory>,
}

/// One section of the help menu.
#[derive(Debug, Clone, Deserialize)]
pub struct HelpCategory {
    pub title: String,
    /// Domain whose menu this section belongs to.
    #[serde(default)]
    pub domain: Option<Domain>,
    #[serde(default)]
    pub commands: Vec<HelpCommand>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HelpCommand {
    pub command: String,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl HelpCategory {
    fn render(&self, out: &mut Vec<String>) {
        out.push(format!("{}:", self.title));
        for cmd in &self.commands {
            out.push(format!("   • {}", cmd.command));
            if let Some(format) = &cmd.format {
                out.push(format!("     {format}"));
            }
            if let Some(description) = &cmd.description {
                out.push(format!("     {description}"));
            }
        }
    }
}

/// Replace each `{name}` in `template` with its value.
pub fn substitute(template: &str, args: &[(&str, &str)]) -> String {
    args.iter().fold(template.to_string(), |acc, (name, value)| {
        acc.replace(&format!("{{{name}}}"), value)
    })
}

impl MessageCatalog {
    /// The catalog compiled into the binary.
    pub fn embedded() -> Result<Self, MessagesError> {
        Ok(serde_yaml::from_str(EMBEDDED)?)
    }

    /// Embedded catalog, overlaid with `path` when given.
    pub fn load(path: Option<&Path>) -> Result<Self, MessagesError> {
        let mut catalog = Self::embedded()?;
        if let Some(path) = path {
            let text = std::fs::read_to_string(path).map_err(|source| MessagesError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            let overlay: Self = serde_yaml::from_str(&text)?;
            catalog.merge(overlay);
            tracing::info!(path = %path.display(), "message overrides loaded");
        }
        Ok(catalog)
    }

    /// Entries in `other` replace entries with the same key.
    pub fn merge(&mut self, other: MessageCatalog) {
        if !other.help_messages.title.is_empty() {
            self.help_messages.title = other.help_messages.title;
        }
        self.help_messages.categories.extend(other.help_messages.categories);
        self.error_messages.extend(other.error_messages);
        self.status_messages.extend(other.status_messages);
    }

    /// Full help menu, or a single category by key.
    pub fn help(&self, category: Option<&str>) -> String {
        let help = &self.help_messages;
        let Some(key) = category else {
            let mut out = vec![help.title.clone()];
            for cat in help.categories.values() {
                out.push(String::new());
                cat.render(&mut out);
            }
            return out.join("\n");
        };

        match help.categories.get(key) {
            Some(cat) => {
                let mut out = Vec::new();
                cat.render(&mut out);
                out.join("\n")
            }
            None => format!("קטגוריה '{key}' לא נמצאה"),
        }
    }

    /// Menu for one domain (all sections tagged with it), or the full menu.
    pub fn domain_menu(&self, domain: Option<Domain>) -> String {
        let Some(domain) = domain else {
            return self.help(None);
        };
        let mut out = vec![self.help_messages.title.clone()];
        for cat in self
            .help_messages
            .categories
            .values()
            .filter(|c| c.domain == Some(domain))
        {
            out.push(String::new());
            cat.render(&mut out);
        }
        out.join("\n")
    }

    /// Help category keys in menu order.
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.help_messages.categories.keys().map(String::as_str)
    }

    /// Error template `key` with placeholders filled in.
    pub fn error(&self, key: &str, args: &[(&str, &str)]) -> String {
        let template = self
            .error_messages
            .get(key)
            .or_else(|| self.error_messages.get("general_error"))
            .map(String::as_str)
            .unwrap_or_default();
        substitute(template, args)
    }

    pub fn status(&self, key: &str) -> String {
        self.status_messages.get(key).cloned().unwrap_or_default()
    }
}
