use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormMode {
    #[default]
    Create,
    Edit,
}

/// When per-field validation runs outside of submission.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationMode {
    #[default]
    OnBlur,
    OnChange,
    OnSubmit,
}

/// Which submit control started a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmitAction {
    Save,
    SaveAndStay,
}

impl SubmitAction {
    pub const ALL: [SubmitAction; 2] = [SubmitAction::Save, SubmitAction::SaveAndStay];

    pub fn as_str(self) -> &'static str {
        match self {
            SubmitAction::Save => "save",
            SubmitAction::SaveAndStay => "save_and_stay",
        }
    }

    pub(crate) fn slot(self) -> usize {
        match self {
            SubmitAction::Save => 0,
            SubmitAction::SaveAndStay => 1,
        }
    }
}

impl fmt::Display for SubmitAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Flags selecting which submit controls a form offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SubmitActions {
    pub save: bool,
    pub save_and_stay: bool,
}

impl Default for SubmitActions {
    fn default() -> Self {
        Self {
            save: true,
            save_and_stay: true,
        }
    }
}

impl SubmitActions {
    pub fn only(action: SubmitAction) -> Self {
        Self {
            save: action == SubmitAction::Save,
            save_and_stay: action == SubmitAction::SaveAndStay,
        }
    }

    pub fn offers(self, action: SubmitAction) -> bool {
        match action {
            SubmitAction::Save => self.save,
            SubmitAction::SaveAndStay => self.save_and_stay,
        }
    }

    pub fn offered(self) -> impl Iterator<Item = SubmitAction> {
        SubmitAction::ALL
            .into_iter()
            .filter(move |action| self.offers(*action))
    }

    pub fn is_empty(self) -> bool {
        !self.save && !self.save_and_stay
    }
}
