use indexmap::IndexSet;

use crate::domain::{ErrorMap, FieldDescriptor, FormLayout, ValuesMap};

/// Single-hop predicate: no `dependsOn` means always active, otherwise the
/// controlling value must equal the expected one exactly.
pub fn is_active(field: &FieldDescriptor, values: &ValuesMap) -> bool {
    match field.depends_on.as_ref() {
        None => true,
        Some(dep) => values.get(&dep.field) == Some(&dep.value),
    }
}

/// Activity of every declared field for one snapshot of values.
///
/// Resolution walks fields in dependency order, so a field whose controlling
/// field is itself inactive is inactive too.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActiveSet {
    active: IndexSet<String>,
    inactive: IndexSet<String>,
}

impl ActiveSet {
    pub fn resolve(layout: &FormLayout, values: &ValuesMap) -> Self {
        let mut set = Self::default();
        for name in layout.resolution_order() {
            let Some(field) = layout.field(name) else {
                continue;
            };
            let upstream_active = field
                .depends_on
                .as_ref()
                .is_none_or(|dep| set.active.contains(&dep.field));
            if upstream_active && is_active(field, values) {
                set.active.insert(name.clone());
            } else {
                set.inactive.insert(name.clone());
            }
        }
        set
    }

    pub fn is_active(&self, name: &str) -> bool {
        self.active.contains(name)
    }

    pub fn is_inactive(&self, name: &str) -> bool {
        self.inactive.contains(name)
    }

    pub fn active(&self) -> impl Iterator<Item = &str> {
        self.active.iter().map(String::as_str)
    }

    pub fn inactive(&self) -> impl Iterator<Item = &str> {
        self.inactive.iter().map(String::as_str)
    }

    /// Fields that were active in `previous` and are not any more.
    pub fn newly_inactive<'a>(&'a self, previous: &'a ActiveSet) -> impl Iterator<Item = &'a str> {
        self.inactive
            .iter()
            .filter(|name| previous.active.contains(*name))
            .map(String::as_str)
    }

    /// Drops inactive fields; undeclared keys pass through untouched.
    pub fn filter_values(&self, values: &ValuesMap) -> ValuesMap {
        values
            .iter()
            .filter(|(name, _)| !self.inactive.contains(*name))
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect()
    }

    pub fn filter_errors(&self, errors: ErrorMap) -> ErrorMap {
        errors
            .into_iter()
            .filter(|(name, _)| !self.inactive.contains(name))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FieldType, SectionDescriptor, TabDescriptor};
    use serde_json::{Value, json};

    fn layout(fields: Vec<FieldDescriptor>) -> FormLayout {
        FormLayout::new(vec![
            TabDescriptor::new("main", "Main")
                .with_section(SectionDescriptor::new("Section").with_fields(fields)),
        ])
        .unwrap()
    }

    fn values(pairs: Value) -> ValuesMap {
        serde_json::from_value(pairs).unwrap()
    }

    #[test]
    fn uses_strict_equality() {
        let field = FieldDescriptor::new("qty", "Qty", FieldType::Number).depends_on("mode", 1);
        assert!(is_active(&field, &values(json!({ "mode": 1 }))));
        assert!(!is_active(&field, &values(json!({ "mode": "1" }))));
        assert!(!is_active(&field, &values(json!({ "mode": true }))));
        assert!(!is_active(&field, &values(json!({}))));
    }

    #[test]
    fn missing_predicate_is_always_active() {
        let field = FieldDescriptor::new("name", "Name", FieldType::Text);
        assert!(is_active(&field, &ValuesMap::new()));
    }

    #[test]
    fn inactive_parent_deactivates_chain() {
        let layout = layout(vec![
            FieldDescriptor::new("a", "A", FieldType::Checkbox),
            FieldDescriptor::new("b", "B", FieldType::Text).depends_on("a", true),
            FieldDescriptor::new("c", "C", FieldType::Text).depends_on("b", ""),
        ]);

        let on = ActiveSet::resolve(&layout, &values(json!({ "a": true, "b": "", "c": "" })));
        assert!(on.is_active("c"));

        let off = ActiveSet::resolve(&layout, &values(json!({ "a": false, "b": "", "c": "" })));
        assert!(off.is_inactive("b"));
        assert!(off.is_inactive("c"));
        assert_eq!(off.newly_inactive(&on).collect::<Vec<_>>(), vec!["b", "c"]);
    }

    #[test]
    fn filters_inactive_values_but_keeps_extra_keys() {
        let layout = layout(vec![
            FieldDescriptor::new("kind", "Kind", FieldType::Select),
            FieldDescriptor::new("roles", "Roles", FieldType::RoleMultiSelect)
                .depends_on("kind", "roles"),
        ]);
        let current = values(json!({ "kind": "manual", "roles": ["admin"], "isActive": true }));
        let set = ActiveSet::resolve(&layout, &current);
        let filtered = set.filter_values(&current);

        assert!(!filtered.contains_key("roles"));
        assert_eq!(filtered["isActive"], json!(true));

        let mut errors = ErrorMap::new();
        errors.insert("roles".into(), "required".into());
        errors.insert("kind".into(), "bad".into());
        let errors = set.filter_errors(errors);
        assert_eq!(errors.keys().collect::<Vec<_>>(), vec!["kind"]);
    }
}
