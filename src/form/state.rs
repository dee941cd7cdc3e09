use indexmap::IndexSet;
use serde_json::Value;

use crate::domain::{ErrorMap, FormLayout, ValuesMap};

use super::dependency::ActiveSet;

/// Owns field values, errors and dirty bookkeeping for one form.
#[derive(Debug, Clone)]
pub struct FormStateController {
    values: ValuesMap,
    seed: ValuesMap,
    errors: ErrorMap,
    dirty: IndexSet<String>,
}

impl FormStateController {
    /// Seeds every declared field, falling back to its type's empty value.
    /// Keys the layout does not declare are kept as-is.
    pub fn new(layout: &FormLayout, initial: &ValuesMap) -> Self {
        let values = seed_values(layout, initial);
        Self {
            seed: values.clone(),
            values,
            errors: ErrorMap::new(),
            dirty: IndexSet::new(),
        }
    }

    pub fn get_values(&self) -> ValuesMap {
        self.values.clone()
    }

    pub fn values(&self) -> &ValuesMap {
        &self.values
    }

    pub fn value(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Direct write used by the imperative handle. Marks nothing.
    pub fn set_value(&mut self, name: &str, value: Value) {
        self.values.insert(name.to_string(), value);
    }

    /// User edit: tracks dirtiness against the seed and clears the field's error.
    pub fn change(&mut self, name: &str, value: Value) {
        if self.seed.get(name) == Some(&value) {
            self.dirty.shift_remove(name);
        } else {
            self.dirty.insert(name.to_string());
        }
        self.values.insert(name.to_string(), value);
        self.errors.shift_remove(name);
    }

    pub fn is_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    pub fn is_field_dirty(&self, name: &str) -> bool {
        self.dirty.contains(name)
    }

    pub fn errors(&self) -> &ErrorMap {
        &self.errors
    }

    pub fn error(&self, name: &str) -> Option<&str> {
        self.errors.get(name).map(String::as_str)
    }

    /// Values the validator and the submission handler get to see.
    pub fn scoped_values(&self, active: &ActiveSet) -> ValuesMap {
        active.filter_values(&self.values)
    }

    /// Replaces the error map with a verdict, minus inactive fields.
    pub fn accept_errors(&mut self, errors: ErrorMap, active: &ActiveSet) -> ErrorMap {
        self.errors = active.filter_errors(errors);
        self.errors.clone()
    }

    /// Takes `name`'s entry from a full verdict and leaves the other fields alone.
    pub fn accept_field_error(
        &mut self,
        name: &str,
        errors: &ErrorMap,
        active: &ActiveSet,
    ) -> Option<String> {
        let message = errors
            .get(name)
            .filter(|_| !active.is_inactive(name))
            .cloned();
        match &message {
            Some(message) => {
                self.errors.insert(name.to_string(), message.clone());
            }
            None => {
                self.errors.shift_remove(name);
            }
        }
        message
    }

    /// Drops errors for fields that are no longer active.
    pub fn prune_errors(&mut self, active: &ActiveSet) {
        self.errors.retain(|name, _| !active.is_inactive(name));
    }

    /// Explicit re-seed: values, errors and dirty state start over.
    pub fn reset(&mut self, layout: &FormLayout, initial: &ValuesMap) {
        *self = Self::new(layout, initial);
    }

    /// Takes submitted values as the new baseline. Edits made after the
    /// payload was captured stay dirty.
    pub fn rebase(&mut self, submitted: &ValuesMap) {
        for (name, value) in submitted {
            self.seed.insert(name.clone(), value.clone());
        }
        let values = &self.values;
        let seed = &self.seed;
        self.dirty.retain(|name| values.get(name) != seed.get(name));
    }
}

fn seed_values(layout: &FormLayout, initial: &ValuesMap) -> ValuesMap {
    let mut values = ValuesMap::new();
    for field in layout.fields() {
        let value = initial
            .get(&field.name)
            .cloned()
            .unwrap_or_else(|| field.field_type.empty_value());
        values.insert(field.name.clone(), value);
    }
    for (name, value) in initial {
        if !values.contains_key(name) {
            values.insert(name.clone(), value.clone());
        }
    }
    values
}
