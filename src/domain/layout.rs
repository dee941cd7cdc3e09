use indexmap::{IndexMap, IndexSet};
use serde_json::json;

use super::{ConfigurationError, FieldDescriptor, TabDescriptor};

/// Coordinates of a field inside the tab/section tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldLocation {
    pub tab: usize,
    pub section: usize,
    pub field: usize,
}

/// Validated tab/section/field tree.
///
/// Construction rejects duplicate names, malformed patterns and broken
/// dependency chains, so every consumer can rely on lookups by name.
#[derive(Debug, Clone)]
pub struct FormLayout {
    tabs: Vec<TabDescriptor>,
    index: IndexMap<String, FieldLocation>,
    order: Vec<String>,
}

impl FormLayout {
    pub fn new(tabs: Vec<TabDescriptor>) -> Result<Self, ConfigurationError> {
        let mut tab_ids = IndexSet::new();
        let mut index = IndexMap::new();

        for (tab_idx, tab) in tabs.iter().enumerate() {
            if !tab_ids.insert(tab.id.clone()) {
                return Err(ConfigurationError::DuplicateTab(tab.id.clone()));
            }
            for (section_idx, section) in tab.sections.iter().enumerate() {
                for (field_idx, field) in section.fields.iter().enumerate() {
                    let location = FieldLocation {
                        tab: tab_idx,
                        section: section_idx,
                        field: field_idx,
                    };
                    if index.insert(field.name.clone(), location).is_some() {
                        return Err(ConfigurationError::DuplicateField(field.name.clone()));
                    }
                    if let Some(pattern) = field.validation.pattern.as_deref() {
                        check_pattern(field, pattern)?;
                    }
                }
            }
        }

        let mut layout = Self {
            tabs,
            index,
            order: Vec::new(),
        };
        layout.order = layout.resolve_dependencies()?;
        Ok(layout)
    }

    pub fn tabs(&self) -> &[TabDescriptor] {
        &self.tabs
    }

    pub fn tab(&self, index: usize) -> Option<&TabDescriptor> {
        self.tabs.get(index)
    }

    pub fn tab_index(&self, id: &str) -> Option<usize> {
        self.tabs.iter().position(|tab| tab.id == id)
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        let location = self.index.get(name)?;
        Some(&self.tabs[location.tab].sections[location.section].fields[location.field])
    }

    pub fn location(&self, name: &str) -> Option<FieldLocation> {
        self.index.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.tabs.iter().flat_map(|tab| tab.fields())
    }

    /// Field names ordered so that every controlling field precedes its dependents.
    pub fn resolution_order(&self) -> &[String] {
        &self.order
    }

    fn resolve_dependencies(&self) -> Result<Vec<String>, ConfigurationError> {
        for field in self.fields() {
            let Some(dep) = field.depends_on.as_ref() else {
                continue;
            };
            if dep.field == field.name {
                return Err(ConfigurationError::SelfDependency(field.name.clone()));
            }
            if !self.contains(&dep.field) {
                return Err(ConfigurationError::UnknownDependency {
                    field: field.name.clone(),
                    target: dep.field.clone(),
                });
            }
        }

        // Each field has at most one parent, so walking up the chain either
        // reaches a resolved root or revisits a field of the current walk.
        let mut resolved: IndexSet<String> = IndexSet::new();
        for field in self.fields() {
            let mut chain: Vec<&str> = Vec::new();
            let mut cursor = Some(field.name.as_str());
            while let Some(name) = cursor {
                if resolved.contains(name) {
                    break;
                }
                if let Some(pos) = chain.iter().position(|seen| *seen == name) {
                    let mut cycle: Vec<String> =
                        chain[pos..].iter().map(|name| name.to_string()).collect();
                    cycle.push(name.to_string());
                    return Err(ConfigurationError::DependencyCycle { chain: cycle });
                }
                chain.push(name);
                cursor = self
                    .field(name)
                    .and_then(|descriptor| descriptor.depends_on.as_ref())
                    .map(|dep| dep.field.as_str());
            }
            for name in chain.into_iter().rev() {
                resolved.insert(name.to_string());
            }
        }
        Ok(resolved.into_iter().collect())
    }
}

/// Compiles the pattern with the engine that later enforces it, so
/// ECMA-262 features such as lookaround are accepted.
fn check_pattern(field: &FieldDescriptor, pattern: &str) -> Result<(), ConfigurationError> {
    jsonschema::validator_for(&json!({ "type": "string", "pattern": pattern }))
        .map(drop)
        .map_err(|err| ConfigurationError::InvalidPattern {
            field: field.name.clone(),
            message: err.to_string(),
        })
}
