use std::{cell::RefCell, rc::Rc};

use crate::domain::SelectOption;

/// One reading of an option source.
///
/// `options` stays `None` until the source has produced a list at all.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptionSnapshot {
    pub options: Option<Vec<SelectOption>>,
    pub is_loading: bool,
}

impl OptionSnapshot {
    pub fn loading() -> Self {
        Self {
            options: None,
            is_loading: true,
        }
    }

    pub fn ready(options: Vec<SelectOption>) -> Self {
        Self {
            options: Some(options),
            is_loading: false,
        }
    }

    /// Never fails on a missing list.
    pub fn options(&self) -> &[SelectOption] {
        self.options.as_deref().unwrap_or_default()
    }
}

/// Read-only view of externally refreshed options for a select-like field.
pub trait OptionSource {
    fn snapshot(&self) -> OptionSnapshot;
}

impl OptionSource for Vec<SelectOption> {
    fn snapshot(&self) -> OptionSnapshot {
        OptionSnapshot::ready(self.clone())
    }
}

impl<T: OptionSource + ?Sized> OptionSource for Box<T> {
    fn snapshot(&self) -> OptionSnapshot {
        (**self).snapshot()
    }
}

impl OptionSource for OptionSnapshot {
    fn snapshot(&self) -> OptionSnapshot {
        self.clone()
    }
}

/// Option list shared between the host (writer) and the form (reader).
#[derive(Debug, Clone, Default)]
pub struct SharedOptions {
    inner: Rc<RefCell<OptionSnapshot>>,
}

impl SharedOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn loading() -> Self {
        let shared = Self::new();
        shared.set_loading();
        shared
    }

    pub fn set_loading(&self) {
        self.inner.borrow_mut().is_loading = true;
    }

    pub fn set_options(&self, options: Vec<SelectOption>) {
        *self.inner.borrow_mut() = OptionSnapshot::ready(options);
    }
}

impl OptionSource for SharedOptions {
    fn snapshot(&self) -> OptionSnapshot {
        self.inner.borrow().clone()
    }
}
