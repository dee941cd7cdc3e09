use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use futures::executor::block_on;

use crate::{
    domain::{FieldType, SubmitAction, ValuesMap},
    form::{Control, EntityForm, FieldInput, SubmitAttempt, SubmitOutcome},
    presentation::{self, ButtonView, UiContext},
};

use super::{
    input::{KeyCommand, classify, field_input},
    options::UiOptions,
    popup::PopupState,
    status::StatusLine,
    terminal::TerminalGuard,
};

const HELP_TEXT: &str = "Tab/Shift+Tab move • Ctrl+←/→ switch tab • Enter pick • Ctrl+R reveal • Ctrl+Q quit";

pub(crate) struct App {
    form: EntityForm,
    options: UiOptions,
    status: StatusLine,
    focus: Option<String>,
    popup: Option<PopupState>,
    exit_armed: bool,
    should_quit: bool,
    saved: Option<ValuesMap>,
}

impl App {
    pub fn new(form: EntityForm, options: UiOptions) -> Self {
        let mut app = Self {
            form,
            options,
            status: StatusLine::new(),
            focus: None,
            popup: None,
            exit_armed: false,
            should_quit: false,
            saved: None,
        };
        app.ensure_focus();
        app
    }

    /// Runs until the user leaves. Returns the last payload that was saved.
    pub fn run(&mut self) -> Result<Option<ValuesMap>> {
        let mut terminal = TerminalGuard::new()?;
        while !self.should_quit {
            terminal.draw(|frame| self.draw(frame))?;
            if !event::poll(self.options.tick_rate)? {
                continue;
            }
            match event::read()? {
                Event::Key(key) => self.handle_key(&mut terminal, key)?,
                Event::Resize(_, _) => {}
                Event::Mouse(_) => {}
                Event::FocusGained | Event::FocusLost | Event::Paste(_) => {}
            }
        }
        Ok(self.saved.take())
    }

    pub(crate) fn draw(&self, frame: &mut ratatui::Frame<'_>) {
        let help = self.options.show_help.then_some(HELP_TEXT);
        let tabs = self.form.tab_summaries();
        let tab = self.form.render_active_tab();
        let errors = self.form.errors();
        let title = self.form.title();
        let buttons: Vec<ButtonView> = SubmitAction::ALL
            .into_iter()
            .filter(|action| self.form.offered_actions().offers(*action))
            .map(|action| ButtonView {
                label: self.form.submit_label(action),
                shortcut: shortcut(action),
                state: self.form.button(action),
            })
            .collect();
        let cancel = self.form.cancel_label();

        presentation::draw(
            frame,
            UiContext {
                title: title.as_deref(),
                tabs: &tabs,
                active_tab: self.form.active_tab(),
                tab: tab.as_ref(),
                focus: self.focus.as_deref(),
                buttons: &buttons,
                cancel_label: &cancel,
                status_message: self.status.message(),
                dirty: self.form.is_dirty(),
                error_count: errors.len(),
                form_error: errors.get("").map(String::as_str),
                help,
                popup: self.popup.as_ref().map(|popup| popup.as_render()),
            },
        );
    }

    fn handle_key(&mut self, terminal: &mut TerminalGuard, key: KeyEvent) -> Result<()> {
        if key.kind != KeyEventKind::Press {
            return Ok(());
        }
        if self.handle_popup_key(key) {
            return Ok(());
        }

        let command = classify(&key);
        if !matches!(command, KeyCommand::Quit) {
            self.exit_armed = false;
        }
        match command {
            KeyCommand::Save => self.on_submit(terminal, SubmitAction::Save)?,
            KeyCommand::SaveAndStay => self.on_submit(terminal, SubmitAction::SaveAndStay)?,
            KeyCommand::Quit => self.on_exit(),
            KeyCommand::SwitchTab(delta) => self.switch_tab(delta),
            KeyCommand::NextField => self.move_focus(1),
            KeyCommand::PrevField => self.move_focus(-1),
            KeyCommand::ResetStatus => self.status.ready(),
            KeyCommand::Activate => self.activate(),
            KeyCommand::Reveal => {
                if let Some(name) = self.focus.clone() {
                    self.form.toggle_reveal(&name);
                }
            }
            KeyCommand::Edit(key) => {
                if let Some(input) = field_input(&key, self.options.fast_step) {
                    self.apply(input);
                }
            }
            KeyCommand::None => {}
        }
        Ok(())
    }

    fn handle_popup_key(&mut self, key: KeyEvent) -> bool {
        let Some(popup) = &mut self.popup else {
            return false;
        };
        match key.code {
            KeyCode::Esc => {
                self.popup = None;
                self.status.ready();
            }
            KeyCode::Up => popup.select_previous(),
            KeyCode::Down => popup.select_next(),
            KeyCode::Enter | KeyCode::Char(' ') => {
                let field = popup.field().to_string();
                let input = popup.input();
                let multi = popup.is_multi();
                if self.form.input(&field, input) {
                    self.status.value_updated();
                }
                if multi {
                    if let (Some(popup), Some(control)) =
                        (self.popup.as_mut(), self.form.render_control(&field))
                    {
                        popup.sync_marks(&control);
                    }
                    if key.code == KeyCode::Enter {
                        self.popup = None;
                    }
                } else {
                    self.popup = None;
                }
            }
            _ => {}
        }
        true
    }

    fn visible_fields(&self) -> Vec<String> {
        self.form
            .render_active_tab()
            .map(|tab| tab.controls().map(|control| control.name.clone()).collect())
            .unwrap_or_default()
    }

    fn focused_control(&self) -> Option<Control> {
        self.focus
            .as_deref()
            .and_then(|name| self.form.render_control(name))
    }

    /// Keeps focus on a visible field after tabs or dependencies change.
    fn ensure_focus(&mut self) {
        let visible = self.visible_fields();
        let keep = self
            .focus
            .as_ref()
            .is_some_and(|name| visible.contains(name));
        if !keep {
            self.focus = visible.into_iter().next();
        }
    }

    fn move_focus(&mut self, delta: i32) {
        let visible = self.visible_fields();
        if visible.is_empty() {
            self.focus = None;
            return;
        }
        let current = self
            .focus
            .as_ref()
            .and_then(|name| visible.iter().position(|candidate| candidate == name));
        let next = match current {
            Some(index) => (index as i64 + delta as i64).rem_euclid(visible.len() as i64) as usize,
            None => 0,
        };
        if let Some(previous) = self.focus.take() {
            self.form.blur(&previous);
        }
        self.focus = visible.get(next).cloned();
        self.ensure_focus();
    }

    fn switch_tab(&mut self, delta: i32) {
        if let Some(previous) = self.focus.take() {
            self.form.blur(&previous);
        }
        if let Some(change) = self.form.step_tab(delta) {
            if self.form.active_tab() != change.to {
                // The terminal front end owns a controlled index.
                self.form.sync_tab(change.to);
            }
            tracing::debug!(tab = %change.id, "tab switched");
        }
        self.ensure_focus();
    }

    fn activate(&mut self) {
        let Some(control) = self.focused_control() else {
            return;
        };
        if control.has_popup() {
            match PopupState::from_control(&control) {
                Some(popup) => {
                    self.popup = Some(popup);
                    self.status.set_raw("Use ↑/↓ and Enter to choose");
                }
                None => self.status.read_only(&control.label),
            }
            return;
        }
        match control.field_type {
            FieldType::Checkbox | FieldType::Switch => self.apply(FieldInput::Toggle),
            field_type if field_type.is_multiline() => self.apply(FieldInput::Newline),
            _ => self.move_focus(1),
        }
    }

    fn apply(&mut self, input: FieldInput) {
        let Some(control) = self.focused_control() else {
            return;
        };
        if self.form.input(&control.name, input) {
            self.status.editing(&control.label);
        } else if control.disabled {
            self.status.read_only(&control.label);
        }
        self.ensure_focus();
    }

    fn on_submit(&mut self, terminal: &mut TerminalGuard, action: SubmitAction) -> Result<()> {
        let mut attempt = self.form.submit(action);
        if let SubmitAttempt::Validating(validation) = attempt {
            self.status.validating();
            terminal.draw(|frame| self.draw(frame))?;
            attempt = block_on(validation.resolve());
        }
        match attempt {
            SubmitAttempt::Pending(pending) => {
                self.status.submitting(&self.form.submit_label(action));
                terminal.draw(|frame| self.draw(frame))?;
                let payload = pending.payload().clone();
                let outcome = block_on(pending.settle());
                self.finish(outcome, payload);
            }
            SubmitAttempt::Invalid(errors) => {
                self.status.issues_remaining(errors.len());
                let visible = self.visible_fields();
                if let Some(name) = visible.iter().find(|name| errors.contains_key(*name)) {
                    self.focus = Some(name.clone());
                }
            }
            SubmitAttempt::Ignored { in_flight, .. } => self.status.busy(in_flight),
            SubmitAttempt::Unavailable(action) => {
                self.status
                    .set_raw(format!("{action} is not offered by this form"));
            }
            SubmitAttempt::Validating(validation) => {
                self.status.cancelled(validation.action());
            }
            SubmitAttempt::Cancelled(action) => self.status.cancelled(action),
        }
        Ok(())
    }

    fn finish(&mut self, outcome: SubmitOutcome, payload: ValuesMap) {
        match outcome.result {
            Ok(()) => {
                self.status.saved(outcome.action);
                self.saved = Some(payload);
                if outcome.action == SubmitAction::Save {
                    self.should_quit = true;
                }
            }
            Err(err) => self.status.submission_failed(err.message()),
        }
    }

    fn on_exit(&mut self) {
        if self.options.confirm_exit && self.form.is_dirty() && !self.exit_armed {
            self.exit_armed = true;
            self.status.pending_exit();
            return;
        }
        self.should_quit = true;
    }
}

fn shortcut(action: SubmitAction) -> &'static str {
    match action {
        SubmitAction::Save => "Ctrl+W",
        SubmitAction::SaveAndStay => "Ctrl+S",
    }
}
