use crate::domain::SubmitAction;

#[derive(Debug, Clone)]
pub struct StatusLine {
    message: String,
}

pub const READY_STATUS: &str = "Ready. Ctrl+S saves and stays, Ctrl+W saves and exits.";

impl Default for StatusLine {
    fn default() -> Self {
        Self {
            message: READY_STATUS.to_string(),
        }
    }
}

impl StatusLine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_raw(&mut self, msg: impl Into<String>) {
        self.message = msg.into();
    }

    pub fn ready(&mut self) {
        self.message = READY_STATUS.to_string();
    }

    pub fn editing(&mut self, label: &str) {
        self.message = format!("Editing {label}");
    }

    pub fn value_updated(&mut self) {
        self.message = "Value updated".to_string();
    }

    pub fn issues_remaining(&mut self, count: usize) {
        self.message = format!("{count} issue(s) remaining");
    }

    pub fn submitting(&mut self, label: &str) {
        self.message = format!("{label}…");
    }

    pub fn validating(&mut self) {
        self.message = "Checking values…".to_string();
    }

    pub fn cancelled(&mut self, action: SubmitAction) {
        self.message = format!("{action} cancelled");
    }

    pub fn saved(&mut self, action: SubmitAction) {
        self.message = match action {
            SubmitAction::Save => "Saved".to_string(),
            SubmitAction::SaveAndStay => "Saved. Keep editing or press Ctrl+Q to leave.".to_string(),
        };
    }

    pub fn submission_failed(&mut self, reason: &str) {
        self.message = format!("Save failed: {reason}");
    }

    pub fn busy(&mut self, in_flight: SubmitAction) {
        self.message = format!("Still processing {in_flight}; try again shortly");
    }

    pub fn read_only(&mut self, label: &str) {
        self.message = format!("{label} is read-only right now");
    }

    pub fn pending_exit(&mut self) {
        self.message = "Unsaved changes. Press Ctrl+Q again to quit without saving.".to_string();
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
