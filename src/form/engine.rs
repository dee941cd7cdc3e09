use std::{
    cell::{Ref, RefCell},
    collections::HashMap,
    fmt,
    rc::{Rc, Weak},
};

use futures::future::{FutureExt, LocalBoxFuture};
use serde_json::Value;

use crate::domain::{
    ConfigurationError, ErrorMap, FieldType, FormDefinition, FormLayout, FormMode, SelectOption,
    SubmitAction, SubmitActions, TabDescriptor, ValidationMode, ValuesMap,
};

use super::{
    dependency::ActiveSet,
    error::SubmissionError,
    field::{Control, FieldInput, FieldRenderer, apply_input},
    options::{OptionSnapshot, OptionSource},
    state::FormStateController,
    submit::{
        ButtonState, SubmitContext, SubmitFuture, SubmitHandler, SubmitRequest, SubmitRouter,
        SubmitTicket,
    },
    tabs::{TabChange, TabControl, TabNavigator},
    validation::{AsyncValidator, SchemaValidator, choice_error},
};

const DEFAULT_SAVE_TEXT: &str = "Save";
const DEFAULT_SAVE_AND_STAY_TEXT: &str = "Save & stay";
const DEFAULT_CANCEL_TEXT: &str = "Cancel";

/// Lifecycle of the form as a whole. No phase is terminal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FormPhase {
    #[default]
    Idle,
    Dirty,
    Validating,
    Submitting,
}

/// Everything a host supplies when mounting a form.
#[derive(Debug, Clone, PartialEq)]
pub struct FormConfig {
    pub title: Option<String>,
    pub tabs: Vec<TabDescriptor>,
    pub initial_values: ValuesMap,
    pub mode: FormMode,
    pub actions: SubmitActions,
    pub validation_mode: ValidationMode,
    pub submit_button_text: Option<String>,
    pub cancel_button_text: Option<String>,
    pub tab_control: TabControl,
    pub schema: Option<Value>,
    pub mask: char,
}

impl FormConfig {
    pub fn new(tabs: Vec<TabDescriptor>) -> Self {
        Self {
            title: None,
            tabs,
            initial_values: ValuesMap::new(),
            mode: FormMode::default(),
            actions: SubmitActions::default(),
            validation_mode: ValidationMode::default(),
            submit_button_text: None,
            cancel_button_text: None,
            tab_control: TabControl::default(),
            schema: None,
            mask: '•',
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_initial_values(mut self, values: ValuesMap) -> Self {
        self.initial_values = values;
        self
    }

    pub fn with_mode(mut self, mode: FormMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_actions(mut self, actions: SubmitActions) -> Self {
        self.actions = actions;
        self
    }

    pub fn with_validation_mode(mut self, mode: ValidationMode) -> Self {
        self.validation_mode = mode;
        self
    }

    pub fn with_submit_text(mut self, text: impl Into<String>) -> Self {
        self.submit_button_text = Some(text.into());
        self
    }

    pub fn with_cancel_text(mut self, text: impl Into<String>) -> Self {
        self.cancel_button_text = Some(text.into());
        self
    }

    pub fn with_tab_control(mut self, control: TabControl) -> Self {
        self.tab_control = control;
        self
    }

    pub fn with_schema(mut self, schema: Value) -> Self {
        self.schema = Some(schema);
        self
    }

    pub fn with_mask(mut self, mask: char) -> Self {
        self.mask = mask;
        self
    }
}

impl From<FormDefinition> for FormConfig {
    fn from(definition: FormDefinition) -> Self {
        Self {
            title: definition.title,
            tabs: definition.tabs,
            initial_values: definition.initial_values,
            mode: definition.mode,
            actions: definition.actions,
            validation_mode: definition.validation_mode,
            submit_button_text: definition.submit_button_text,
            cancel_button_text: definition.cancel_button_text,
            tab_control: TabControl::default(),
            schema: definition.schema,
            mask: '•',
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedSection {
    pub title: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub controls: Vec<Control>,
}

/// Active controls of one tab, grouped by section.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedTab {
    pub index: usize,
    pub id: String,
    pub label: String,
    pub icon: Option<String>,
    pub sections: Vec<RenderedSection>,
}

impl RenderedTab {
    pub fn controls(&self) -> impl Iterator<Item = &Control> {
        self.sections.iter().flat_map(|section| section.controls.iter())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabSummary {
    pub id: String,
    pub label: String,
    pub icon: Option<String>,
    pub error_count: usize,
}

struct FormCore {
    title: Option<String>,
    layout: FormLayout,
    state: FormStateController,
    renderer: FieldRenderer,
    tabs: TabNavigator,
    router: SubmitRouter,
    active: ActiveSet,
    phase: FormPhase,
    mode: FormMode,
    validation_mode: ValidationMode,
    submit_text: Option<String>,
    cancel_text: Option<String>,
    sources: HashMap<String, Box<dyn OptionSource>>,
}

impl FormCore {
    fn set_value(&mut self, name: &str, value: Value) {
        self.state.set_value(name, value);
        self.refresh_activity();
    }

    fn change(&mut self, name: &str, value: Value) {
        tracing::trace!(field = name, "value changed");
        self.state.change(name, value);
        self.refresh_activity();
        if matches!(self.phase, FormPhase::Idle | FormPhase::Dirty) {
            self.phase = if self.state.is_dirty() {
                FormPhase::Dirty
            } else {
                FormPhase::Idle
            };
        }
    }

    /// Recomputes the active set after any value write and forgets transient
    /// state of fields that just became inactive.
    fn refresh_activity(&mut self) {
        let next = ActiveSet::resolve(&self.layout, self.state.values());
        for name in next.newly_inactive(&self.active) {
            self.renderer.forget(name);
        }
        self.state.prune_errors(&next);
        self.active = next;
    }

    fn snapshot(&self, name: &str) -> Option<OptionSnapshot> {
        self.sources.get(name).map(|source| source.snapshot())
    }

    fn options(&self, name: &str) -> Vec<SelectOption> {
        match self.snapshot(name) {
            Some(snapshot) => snapshot.options().to_vec(),
            None => self
                .layout
                .field(name)
                .map(|field| field.options.clone())
                .unwrap_or_default(),
        }
    }

    fn is_editable(&self, name: &str) -> bool {
        let Some(field) = self.layout.field(name) else {
            return false;
        };
        let loading = self.snapshot(name).is_some_and(|snapshot| snapshot.is_loading);
        self.active.is_active(name) && !field.disabled && !loading
    }

    fn render_control(&self, name: &str) -> Option<Control> {
        if !self.active.is_active(name) {
            return None;
        }
        let field = self.layout.field(name)?;
        let snapshot = self.snapshot(name);
        Some(self.renderer.render(
            field,
            self.state.value(name),
            self.state.error(name),
            snapshot.as_ref(),
        ))
    }

    fn render_tab(&self, index: usize) -> Option<RenderedTab> {
        let tab = self.layout.tab(index)?;
        let sections = tab
            .sections
            .iter()
            .filter_map(|section| {
                let controls: Vec<Control> = section
                    .fields
                    .iter()
                    .filter_map(|field| self.render_control(&field.name))
                    .collect();
                if controls.is_empty() && !section.fields.is_empty() {
                    return None;
                }
                Some(RenderedSection {
                    title: section.title.clone(),
                    description: section.description.clone(),
                    icon: section.icon.clone(),
                    controls,
                })
            })
            .collect();
        Some(RenderedTab {
            index,
            id: tab.id.clone(),
            label: tab.label.clone(),
            icon: tab.icon.clone(),
            sections,
        })
    }

    fn tab_summaries(&self) -> Vec<TabSummary> {
        self.layout
            .tabs()
            .iter()
            .map(|tab| TabSummary {
                id: tab.id.clone(),
                label: tab.label.clone(),
                icon: tab.icon.clone(),
                error_count: tab
                    .fields()
                    .filter(|field| self.state.error(&field.name).is_some())
                    .count(),
            })
            .collect()
    }

    fn scoped_values(&self) -> ValuesMap {
        self.state.scoped_values(&self.active)
    }

    /// Adds option membership errors the verdict does not already report.
    /// Loading lists are skipped; their values are checked once they arrive.
    fn with_choice_errors(&self, mut verdict: ErrorMap, values: &ValuesMap) -> ErrorMap {
        let choices = self
            .layout
            .fields()
            .filter(|field| field.field_type.is_option_backed());
        for field in choices {
            if verdict.contains_key(&field.name) {
                continue;
            }
            let Some(value) = values.get(&field.name) else {
                continue;
            };
            if self.snapshot(&field.name).is_some_and(|snapshot| snapshot.is_loading) {
                continue;
            }
            if let Some(message) = choice_error(field, value, &self.options(&field.name)) {
                verdict.insert(field.name.clone(), message);
            }
        }
        verdict
    }

    /// Records a verdict over `values` as the form's error map.
    fn judge(&mut self, verdict: ErrorMap, values: &ValuesMap) -> ErrorMap {
        let errors = self.with_choice_errors(verdict, values);
        let errors = self.state.accept_errors(errors, &self.active);
        tracing::trace!(errors = errors.len(), "validated form");
        errors
    }
}

/// Mounted entity form: the orchestrator tying layout, state, validation,
/// tabs and submission together.
///
/// Collaborators (validator, submission handler) are always called with no
/// internal borrow held, so they may use a [`FormHandle`] freely.
pub struct EntityForm {
    core: Rc<RefCell<FormCore>>,
    validator: Box<dyn AsyncValidator>,
    submitter: Rc<RefCell<Box<dyn SubmitHandler>>>,
}

impl fmt::Debug for EntityForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let core = self.core.borrow();
        f.debug_struct("EntityForm")
            .field("fields", &core.layout.fields().count())
            .field("phase", &core.phase)
            .field("active_tab", &core.tabs.active_index())
            .finish_non_exhaustive()
    }
}

impl EntityForm {
    /// Mounts with the validator implied by the config: its `schema` when
    /// present, otherwise one derived from the descriptors.
    pub fn mount<S>(config: FormConfig, submitter: S) -> Result<Self, ConfigurationError>
    where
        S: SubmitHandler + 'static,
    {
        let layout = FormLayout::new(config.tabs.clone())?;
        let validator = match config.schema.as_ref() {
            Some(schema) => SchemaValidator::with_layout(schema, &layout)?,
            None => SchemaValidator::derive(&layout)?,
        };
        Self::assemble(config, layout, Box::new(validator), Box::new(submitter))
    }

    /// Mounts with a host validator, plain or asynchronous.
    pub fn mount_with<V, S>(
        config: FormConfig,
        validator: V,
        submitter: S,
    ) -> Result<Self, ConfigurationError>
    where
        V: AsyncValidator + 'static,
        S: SubmitHandler + 'static,
    {
        Self::mount_boxed(config, Box::new(validator), submitter)
    }

    pub(crate) fn mount_boxed<S>(
        config: FormConfig,
        validator: Box<dyn AsyncValidator>,
        submitter: S,
    ) -> Result<Self, ConfigurationError>
    where
        S: SubmitHandler + 'static,
    {
        let layout = FormLayout::new(config.tabs.clone())?;
        Self::assemble(config, layout, validator, Box::new(submitter))
    }

    fn assemble(
        config: FormConfig,
        layout: FormLayout,
        validator: Box<dyn AsyncValidator>,
        submitter: Box<dyn SubmitHandler>,
    ) -> Result<Self, ConfigurationError> {
        if config.actions.is_empty() {
            return Err(ConfigurationError::NoSubmitActions);
        }
        let state = FormStateController::new(&layout, &config.initial_values);
        let active = ActiveSet::resolve(&layout, state.values());
        let tab_ids = layout.tabs().iter().map(|tab| tab.id.clone()).collect();
        tracing::debug!(
            fields = layout.fields().count(),
            tabs = layout.tabs().len(),
            mode = ?config.mode,
            "form mounted"
        );

        let core = FormCore {
            title: config.title,
            tabs: TabNavigator::new(tab_ids, config.tab_control),
            router: SubmitRouter::new(config.actions),
            renderer: FieldRenderer::new(config.mask),
            state,
            active,
            layout,
            phase: FormPhase::Idle,
            mode: config.mode,
            validation_mode: config.validation_mode,
            submit_text: config.submit_button_text,
            cancel_text: config.cancel_button_text,
            sources: HashMap::new(),
        };
        Ok(Self {
            core: Rc::new(RefCell::new(core)),
            validator,
            submitter: Rc::new(RefCell::new(submitter)),
        })
    }

    /// Imperative handle for the host. Calls become no-ops once the form is dropped.
    pub fn handle(&self) -> FormHandle {
        FormHandle {
            core: Rc::downgrade(&self.core),
        }
    }

    pub fn layout(&self) -> Ref<'_, FormLayout> {
        Ref::map(self.core.borrow(), |core| &core.layout)
    }

    pub fn title(&self) -> Option<String> {
        self.core.borrow().title.clone()
    }

    pub fn mode(&self) -> FormMode {
        self.core.borrow().mode
    }

    pub fn validation_mode(&self) -> ValidationMode {
        self.core.borrow().validation_mode
    }

    pub fn phase(&self) -> FormPhase {
        self.core.borrow().phase
    }

    pub fn is_dirty(&self) -> bool {
        self.core.borrow().state.is_dirty()
    }

    pub fn get_values(&self) -> ValuesMap {
        self.core.borrow().state.get_values()
    }

    pub fn value(&self, name: &str) -> Option<Value> {
        self.core.borrow().state.value(name).cloned()
    }

    /// Direct write; re-evaluates dependencies but marks nothing dirty.
    pub fn set_value(&self, name: &str, value: Value) {
        self.core.borrow_mut().set_value(name, value);
    }

    pub fn is_active(&self, name: &str) -> bool {
        self.core.borrow().active.is_active(name)
    }

    pub fn active_fields(&self) -> Vec<String> {
        self.core
            .borrow()
            .active
            .active()
            .map(str::to_string)
            .collect()
    }

    pub fn errors(&self) -> ErrorMap {
        self.core.borrow().state.errors().clone()
    }

    pub fn error(&self, name: &str) -> Option<String> {
        self.core.borrow().state.error(name).map(str::to_string)
    }

    /// User edit of an active, enabled field. Returns whether it applied.
    pub fn change(&self, name: &str, value: Value) -> bool {
        if !self.core.borrow().is_editable(name) {
            return false;
        }
        self.core.borrow_mut().change(name, value);
        if self.validation_mode() == ValidationMode::OnChange {
            self.validate_field(name);
        }
        true
    }

    /// Applies an abstract edit (keystroke, step, option toggle) to a field.
    pub fn input(&self, name: &str, input: FieldInput) -> bool {
        let next = {
            let core = self.core.borrow();
            if !core.is_editable(name) {
                return false;
            }
            let Some(field) = core.layout.field(name) else {
                return false;
            };
            let current = core
                .state
                .value(name)
                .cloned()
                .unwrap_or_else(|| field.field_type.empty_value());
            apply_input(field, &current, input, &core.options(name))
        };
        match next {
            Some(value) => self.change(name, value),
            None => false,
        }
    }

    /// Focus left the field.
    pub fn blur(&self, name: &str) {
        if self.validation_mode() == ValidationMode::OnBlur {
            self.validate_field(name);
        }
    }

    /// Validates the active fields and replaces the error map.
    ///
    /// A verdict that is not ready at once leaves the errors as they are;
    /// hosts with an asynchronous validator use [`EntityForm::validate_async`].
    pub fn validate(&self) -> ErrorMap {
        let (values, verdict) = self.request_verdict();
        match verdict.now_or_never() {
            Some(verdict) => self.core.borrow_mut().judge(verdict, &values),
            None => {
                tracing::debug!("validator verdict pending, errors left unchanged");
                self.errors()
            }
        }
    }

    /// Awaits the validator's verdict over the active fields.
    pub async fn validate_async(&self) -> ErrorMap {
        let (values, verdict) = self.request_verdict();
        let verdict = verdict.await;
        self.core.borrow_mut().judge(verdict, &values)
    }

    /// Field-level checks only use verdicts that are ready at once.
    fn validate_field(&self, name: &str) -> Option<String> {
        if !self.is_active(name) {
            return None;
        }
        let (values, verdict) = self.request_verdict();
        let verdict = verdict.now_or_never()?;
        let mut core = self.core.borrow_mut();
        let core = &mut *core;
        let errors = core.with_choice_errors(verdict, &values);
        core.state.accept_field_error(name, &errors, &core.active)
    }

    /// The validator is called with no borrow held.
    fn request_verdict(&self) -> (ValuesMap, LocalBoxFuture<'static, ErrorMap>) {
        let values = self.core.borrow().scoped_values();
        let verdict = self.validator.verdict(values.clone());
        (values, verdict)
    }

    /// Flips password visibility. Only active password fields have any.
    pub fn toggle_reveal(&self, name: &str) -> bool {
        let mut core = self.core.borrow_mut();
        let is_password = core
            .layout
            .field(name)
            .is_some_and(|field| field.field_type == FieldType::Password);
        if !is_password || !core.active.is_active(name) {
            return false;
        }
        core.renderer.toggle_reveal(name)
    }

    pub fn is_revealed(&self, name: &str) -> bool {
        self.core.borrow().renderer.is_revealed(name)
    }

    /// Binds an external option source to a select-like field.
    pub fn bind_options<O>(&self, name: &str, source: O) -> Result<(), ConfigurationError>
    where
        O: OptionSource + 'static,
    {
        let mut core = self.core.borrow_mut();
        let field = core
            .layout
            .field(name)
            .ok_or_else(|| ConfigurationError::UnknownField(name.to_string()))?;
        if !field.field_type.is_option_backed() {
            return Err(ConfigurationError::NotOptionBacked(name.to_string()));
        }
        core.sources.insert(name.to_string(), Box::new(source));
        Ok(())
    }

    pub fn options(&self, name: &str) -> Vec<SelectOption> {
        self.core.borrow().options(name)
    }

    /// `None` for unknown or inactive fields.
    pub fn render_control(&self, name: &str) -> Option<Control> {
        self.core.borrow().render_control(name)
    }

    pub fn render_tab(&self, index: usize) -> Option<RenderedTab> {
        self.core.borrow().render_tab(index)
    }

    pub fn render_active_tab(&self) -> Option<RenderedTab> {
        let core = self.core.borrow();
        core.render_tab(core.tabs.active_index())
    }

    pub fn tab_summaries(&self) -> Vec<TabSummary> {
        self.core.borrow().tab_summaries()
    }

    pub fn active_tab(&self) -> usize {
        self.core.borrow().tabs.active_index()
    }

    pub fn active_tab_id(&self) -> Option<String> {
        self.core.borrow().tabs.active_id().map(str::to_string)
    }

    pub fn select_tab(&self, index: usize) -> Option<TabChange> {
        self.core.borrow_mut().tabs.select(index)
    }

    pub fn select_tab_id(&self, id: &str) -> Option<TabChange> {
        self.core.borrow_mut().tabs.select_id(id)
    }

    pub fn step_tab(&self, delta: i32) -> Option<TabChange> {
        self.core.borrow_mut().tabs.step(delta)
    }

    /// Applies a host-owned tab index (controlled mode).
    pub fn sync_tab(&self, index: usize) {
        self.core.borrow_mut().tabs.sync(index);
    }

    /// Runs the submit pipeline for one control.
    ///
    /// A ready verdict is applied at once and a passing one invokes the
    /// submission handler, whose future comes back inside
    /// [`SubmitAttempt::Pending`]. A verdict still on its way comes back as
    /// [`SubmitAttempt::Validating`]; the form stays in
    /// [`FormPhase::Validating`] and ignores other activations until it
    /// resolves.
    pub fn submit(&mut self, action: SubmitAction) -> SubmitAttempt {
        let (ticket, values) = {
            let mut core = self.core.borrow_mut();
            match core.router.request(action) {
                SubmitRequest::Accepted(_) => {}
                SubmitRequest::Ignored { in_flight } => {
                    tracing::warn!(%action, %in_flight, "submit ignored while another is pending");
                    return SubmitAttempt::Ignored {
                        requested: action,
                        in_flight,
                    };
                }
                SubmitRequest::Unavailable(action) => return SubmitAttempt::Unavailable(action),
            }
            let Some(ticket) = core.router.begin() else {
                return SubmitAttempt::Unavailable(action);
            };
            core.phase = FormPhase::Validating;
            (ticket, core.scoped_values())
        };

        let claim = Claim::new(ticket, Rc::downgrade(&self.core));
        let mut verdict = self.validator.verdict(values.clone());
        match (&mut verdict).now_or_never() {
            Some(verdict) => conclude(claim, values, verdict, &self.submitter),
            None => {
                tracing::debug!(action = %ticket.action, "awaiting validator verdict");
                SubmitAttempt::Validating(PendingValidation {
                    claim,
                    values,
                    verdict,
                    submitter: Rc::clone(&self.submitter),
                })
            }
        }
    }

    /// Re-runs the pipeline for the tag left over by a failed validation.
    pub fn retry(&mut self) -> Option<SubmitAttempt> {
        let action = self.core.borrow().router.requested()?;
        Some(self.submit(action))
    }

    pub fn button(&self, action: SubmitAction) -> ButtonState {
        self.core.borrow().router.button(action)
    }

    pub fn offered_actions(&self) -> SubmitActions {
        self.core.borrow().router.offered()
    }

    pub fn submit_label(&self, action: SubmitAction) -> String {
        let core = self.core.borrow();
        match action {
            SubmitAction::Save => core
                .submit_text
                .clone()
                .unwrap_or_else(|| DEFAULT_SAVE_TEXT.to_string()),
            SubmitAction::SaveAndStay => DEFAULT_SAVE_AND_STAY_TEXT.to_string(),
        }
    }

    pub fn cancel_label(&self) -> String {
        self.core
            .borrow()
            .cancel_text
            .clone()
            .unwrap_or_else(|| DEFAULT_CANCEL_TEXT.to_string())
    }

    /// Explicit re-seed once late data has arrived. Drops transient field
    /// state and forgets any pending submission, whose settlement then
    /// leaves the form untouched.
    pub fn reset(&self, values: ValuesMap) {
        let mut core = self.core.borrow_mut();
        let core = &mut *core;
        core.state.reset(&core.layout, &values);
        core.renderer.clear();
        core.router.reset();
        core.active = ActiveSet::resolve(&core.layout, core.state.values());
        core.phase = FormPhase::Idle;
        tracing::debug!(fields = values.len(), "form re-seeded");
    }
}

/// Outcome of activating a submit control.
#[derive(Debug)]
pub enum SubmitAttempt {
    /// Validation passed and the handler was invoked.
    Pending(PendingSubmission),
    /// The validator's verdict has not arrived yet.
    Validating(PendingValidation),
    /// Validation failed; the tag stays recorded for [`EntityForm::retry`].
    Invalid(ErrorMap),
    /// Another submission is still in flight.
    Ignored {
        requested: SubmitAction,
        in_flight: SubmitAction,
    },
    /// The control is not offered by this form.
    Unavailable(SubmitAction),
    /// The form was dropped or re-seeded while the verdict was on its way.
    Cancelled(SubmitAction),
}

/// Holds the router's in-flight slot for one submission. Dropping it
/// unreleased hands the slot back, as for a cancelled submission.
struct Claim {
    ticket: SubmitTicket,
    core: Weak<RefCell<FormCore>>,
    armed: bool,
}

impl Claim {
    fn new(ticket: SubmitTicket, core: Weak<RefCell<FormCore>>) -> Self {
        Self {
            ticket,
            core,
            armed: true,
        }
    }

    fn release(mut self) -> Option<Rc<RefCell<FormCore>>> {
        self.armed = false;
        self.core.upgrade()
    }
}

impl Drop for Claim {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let Some(shared) = self.core.upgrade() else {
            return;
        };
        let Ok(mut core) = shared.try_borrow_mut() else {
            return;
        };
        if core.router.settle(self.ticket) {
            core.phase = FormPhase::Idle;
            tracing::warn!(action = %self.ticket.action, "submission dropped before settling");
        }
    }
}

/// Applies a verdict to the form and, when it passes, hands the validated
/// values to the submission handler.
fn conclude(
    claim: Claim,
    values: ValuesMap,
    verdict: ErrorMap,
    submitter: &RefCell<Box<dyn SubmitHandler>>,
) -> SubmitAttempt {
    let ticket = claim.ticket;
    let Some(shared) = claim.core.upgrade() else {
        return SubmitAttempt::Cancelled(ticket.action);
    };
    let context = {
        let mut core = shared.borrow_mut();
        if core.router.in_flight() != Some(ticket) {
            return SubmitAttempt::Cancelled(ticket.action);
        }
        let errors = core.judge(verdict, &values);
        if !errors.is_empty() {
            core.router.settle(ticket);
            core.phase = FormPhase::Idle;
            drop(core);
            claim.release();
            tracing::debug!(action = %ticket.action, errors = errors.len(), "submission blocked by validation");
            return SubmitAttempt::Invalid(errors);
        }
        core.router.dispatch(ticket);
        core.phase = FormPhase::Submitting;
        SubmitContext {
            submit_action: ticket.action,
            mode: core.mode,
        }
    };

    tracing::debug!(action = %ticket.action, fields = values.len(), "submitting");
    let future = submitter.borrow_mut().submit(values.clone(), context);
    SubmitAttempt::Pending(PendingSubmission {
        claim,
        payload: values,
        future,
    })
}

/// A submission whose validator verdict has not arrived yet.
pub struct PendingValidation {
    claim: Claim,
    values: ValuesMap,
    verdict: LocalBoxFuture<'static, ErrorMap>,
    submitter: Rc<RefCell<Box<dyn SubmitHandler>>>,
}

impl fmt::Debug for PendingValidation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingValidation")
            .field("ticket", &self.claim.ticket)
            .field("values", &self.values)
            .finish_non_exhaustive()
    }
}

impl PendingValidation {
    pub fn action(&self) -> SubmitAction {
        self.claim.ticket.action
    }

    /// Awaits the verdict and continues the pipeline: the outcome is
    /// [`SubmitAttempt::Invalid`], [`SubmitAttempt::Pending`] or
    /// [`SubmitAttempt::Cancelled`].
    pub async fn resolve(self) -> SubmitAttempt {
        let Self {
            claim,
            values,
            verdict,
            submitter,
        } = self;
        let verdict = verdict.await;
        conclude(claim, values, verdict, &submitter)
    }
}

/// A dispatched submission whose handler has not resolved yet.
///
/// Dropping it without [`PendingSubmission::settle`] cancels it: the
/// loading flag clears and the form accepts submissions again.
pub struct PendingSubmission {
    claim: Claim,
    payload: ValuesMap,
    future: SubmitFuture,
}

impl fmt::Debug for PendingSubmission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingSubmission")
            .field("ticket", &self.claim.ticket)
            .field("payload", &self.payload)
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
pub struct SubmitOutcome {
    pub action: SubmitAction,
    pub result: Result<(), SubmissionError>,
    /// False when the form was dropped or re-seeded before settlement.
    pub applied: bool,
}

impl PendingSubmission {
    pub fn action(&self) -> SubmitAction {
        self.claim.ticket.action
    }

    pub fn payload(&self) -> &ValuesMap {
        &self.payload
    }

    /// Awaits the handler, then clears the loading flag of this tag.
    pub async fn settle(self) -> SubmitOutcome {
        let Self {
            claim,
            payload,
            future,
        } = self;
        let result = future.await;
        let ticket = claim.ticket;

        let applied = match claim.release() {
            Some(core) => {
                let mut core = core.borrow_mut();
                if core.router.settle(ticket) {
                    if result.is_ok() {
                        core.state.rebase(&payload);
                    }
                    core.phase = FormPhase::Idle;
                    true
                } else {
                    false
                }
            }
            None => false,
        };

        match &result {
            Ok(()) => tracing::info!(action = %ticket.action, applied, "submission settled"),
            Err(err) => tracing::warn!(action = %ticket.action, applied, error = %err, "submission rejected"),
        }
        SubmitOutcome {
            action: ticket.action,
            result,
            applied,
        }
    }
}

/// Weak imperative handle handed to the host.
#[derive(Debug, Clone)]
pub struct FormHandle {
    core: Weak<RefCell<FormCore>>,
}

impl FormHandle {
    pub fn is_mounted(&self) -> bool {
        self.core.strong_count() > 0
    }

    /// `None` once the form is gone.
    pub fn get_values(&self) -> Option<ValuesMap> {
        let core = self.core.upgrade()?;
        let values = core.borrow().state.get_values();
        Some(values)
    }

    /// Returns false once the form is gone.
    pub fn set_value(&self, name: &str, value: Value) -> bool {
        match self.core.upgrade() {
            Some(core) => {
                core.borrow_mut().set_value(name, value);
                true
            }
            None => false,
        }
    }
}
