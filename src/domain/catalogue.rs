use crate::domain::responder::compile_prompt;
use crate::error::{CatalogueError, ExecError};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{info, warn};

pub const PLACEHOLDER: &str = "{extra_input}";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandTemplate {
    pub command: String,
    /// prompt regex -> literal response, answered with a trailing newline
    #[serde(default)]
    pub responses: IndexMap<String, String>,
    #[serde(default)]
    pub disconnect: bool,
    #[serde(default)]
    pub requires_extra_input: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
}

impl CommandTemplate {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            responses: IndexMap::new(),
            disconnect: false,
            requires_extra_input: false,
            prompt: None,
        }
    }

    pub fn with_response(mut self, prompt: impl Into<String>, response: impl Into<String>) -> Self {
        self.responses.insert(prompt.into(), response.into());
        self
    }

    pub fn expect_disconnect(mut self) -> Self {
        self.disconnect = true;
        self
    }

    pub fn with_extra_input(mut self, prompt: impl Into<String>) -> Self {
        self.requires_extra_input = true;
        self.prompt = Some(prompt.into());
        self
    }

    /// The literal part of the pattern, up to the first placeholder brace.
    pub fn prefix(&self) -> &str {
        match self.command.find('{') {
            Some(i) => &self.command[..i],
            None => &self.command,
        }
    }

    pub fn render(&self, extra_input: &str) -> String {
        self.command.replace(PLACEHOLDER, extra_input)
    }
}

/// An immutable, ordered set of permitted command templates keyed by display name.
#[derive(Debug, Clone, Default)]
pub struct Catalogue {
    templates: IndexMap<String, CommandTemplate>,
}

impl Catalogue {
    pub fn new(templates: IndexMap<String, CommandTemplate>) -> Result<Self, CatalogueError> {
        for (name, template) in &templates {
            for prompt in template.responses.keys() {
                compile_prompt(prompt).map_err(|source| CatalogueError::InvalidPrompt {
                    name: name.clone(),
                    source,
                })?;
            }
        }
        let catalogue = Self { templates };
        for (first, second) in catalogue.ambiguous_prefixes() {
            warn!(
                "catalogue commands '{}' and '{}' share a prefix, '{}' wins resolution",
                first, second, first
            );
        }
        Ok(catalogue)
    }

    /// The commands offered by the Fabric Studio workshop console.
    pub fn builtin() -> Self {
        let mut templates = IndexMap::new();
        templates.insert(
            "Start FAZ workshop POC".to_string(),
            CommandTemplate::new("runtime fabric install --power-on-vms FAZ-Workshop2025"),
        );
        templates.insert(
            "Stop FAZ workshop POC".to_string(),
            CommandTemplate::new("runtime fabric uninstall"),
        );
        templates.insert(
            "Shutdown Fabric Studio and VM".to_string(),
            CommandTemplate::new("system execute shutdown --no-interactive"),
        );
        templates.insert(
            "Fabric Studio Upgrade".to_string(),
            CommandTemplate::new("system execute upgrade --no-interactive").expect_disconnect(),
        );
        templates.insert(
            "Change guest user password".to_string(),
            CommandTemplate::new("execute password guest {extra_input}")
                .with_extra_input("New password for guest user:"),
        );
        Self { templates }
    }

    pub fn from_json_str(json: &str) -> Result<Self, CatalogueError> {
        let templates: IndexMap<String, CommandTemplate> = serde_json::from_str(json)?;
        Self::new(templates)
    }

    pub fn load(path: &Path) -> Result<Self, CatalogueError> {
        let json = std::fs::read_to_string(path).map_err(|source| CatalogueError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CommandTemplate)> {
        self.templates.iter().map(|(name, t)| (name.as_str(), t))
    }

    /// First template, in catalogue order, whose prefix starts `command`.
    pub fn resolve(&self, command: &str) -> Result<(&str, &CommandTemplate), ExecError> {
        self.iter()
            .find(|(_, template)| command.starts_with(template.prefix()))
            .ok_or_else(|| ExecError::CommandNotFound(command.to_string()))
    }

    pub fn by_pattern(&self, pattern: &str) -> Option<(&str, &CommandTemplate)> {
        self.iter().find(|(_, template)| template.command == pattern)
    }

    /// Substitutes the extra input into a template picked by its exact pattern.
    /// Anything that is not a known pattern is passed through for the executor
    /// to resolve or reject.
    pub fn prepare_command(
        &self,
        pattern: &str,
        extra_input: Option<&str>,
    ) -> Result<String, CatalogueError> {
        match self.by_pattern(pattern) {
            Some((name, template)) if template.requires_extra_input => {
                match extra_input.map(str::trim).filter(|s| !s.is_empty()) {
                    Some(extra) => Ok(template.render(extra)),
                    None => Err(CatalogueError::MissingExtraInput(name.to_string())),
                }
            }
            _ => Ok(pattern.to_string()),
        }
    }

    /// Pairs of templates where one prefix starts with the other. Resolution
    /// picks whichever comes first, so the later one may be unreachable.
    pub fn ambiguous_prefixes(&self) -> Vec<(String, String)> {
        let entries: Vec<_> = self.iter().collect();
        let mut pairs = Vec::new();
        for (i, (first, a)) in entries.iter().enumerate() {
            for (second, b) in entries.iter().skip(i + 1) {
                if a.prefix().starts_with(b.prefix()) || b.prefix().starts_with(a.prefix()) {
                    pairs.push((first.to_string(), second.to_string()));
                }
            }
        }
        pairs
    }
}

/// Holds the current catalogue snapshot. Readers clone the `Arc` and keep a
/// consistent view; `reload` swaps the reference under the write lock.
#[derive(Debug)]
pub struct CatalogueStore {
    current: RwLock<Arc<Catalogue>>,
    source: Option<PathBuf>,
}

impl CatalogueStore {
    pub fn new(catalogue: Catalogue, source: Option<PathBuf>) -> Self {
        Self {
            current: RwLock::new(Arc::new(catalogue)),
            source,
        }
    }

    /// Loads from `source` when given, otherwise uses the built-in commands.
    pub fn open(source: Option<PathBuf>) -> Result<Self, CatalogueError> {
        let catalogue = match &source {
            Some(path) => {
                info!("loading command catalogue from {}", path.display());
                Catalogue::load(path)?
            }
            None => Catalogue::builtin(),
        };
        Ok(Self::new(catalogue, source))
    }

    pub fn snapshot(&self) -> Arc<Catalogue> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn reload(&self) -> Result<usize, CatalogueError> {
        let path = self.source.as_ref().ok_or(CatalogueError::NoSource)?;
        let catalogue = Catalogue::load(path)?;
        let count = catalogue.len();
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(catalogue);
        info!("reloaded {} commands from {}", count, path.display());
        Ok(count)
    }
}
