use std::{cell::RefCell, rc::Rc};

use futures::{channel::oneshot, executor::block_on, future};
use serde_json::json;

use entityform::{form::Deferred, prelude::*};

type Gate = Rc<RefCell<Option<oneshot::Receiver<ErrorMap>>>>;

fn ok_handler(_: ValuesMap, _: SubmitContext) -> future::Ready<Result<(), SubmissionError>> {
    future::ready(Ok(()))
}

fn failing_handler(_: ValuesMap, _: SubmitContext) -> future::Ready<Result<(), SubmissionError>> {
    future::ready(Err(SubmissionError::new("backend unavailable")))
}

fn tabs() -> Vec<TabDescriptor> {
    vec![TabDescriptor::new("account", "Account").with_section(
        SectionDescriptor::new("Access")
            .with_field(FieldDescriptor::new("email", "Email", FieldType::Email).required())
            .with_field(FieldDescriptor::new("sso", "Single sign-on", FieldType::Switch))
            .with_field(
                FieldDescriptor::new("provider", "Provider", FieldType::Text)
                    .required()
                    .depends_on("sso", true),
            )
            .with_field(
                FieldDescriptor::new("tenant", "Tenant", FieldType::Text)
                    .required()
                    .with_validation(ValidationRules::default().with_length(Some(3), None))
                    .depends_on("provider", "azure"),
            ),
    )]
}

fn valid_form<S>(submitter: S) -> EntityForm
where
    S: entityform::form::SubmitHandler + 'static,
{
    let form = EntityForm::mount(FormConfig::new(tabs()), submitter).unwrap();
    form.change("email", json!("ops@example.com"));
    form
}

#[test]
fn activation_tracks_controlling_value_both_ways() {
    let form = valid_form(ok_handler);
    assert!(!form.is_active("provider"));
    form.change("sso", json!(true));
    assert!(form.is_active("provider"));
    form.change("sso", json!(false));
    assert!(!form.is_active("provider"));
    form.change("sso", json!(true));
    assert!(form.is_active("provider"));
}

#[test]
fn strict_equality_decides_activation() {
    let form = valid_form(ok_handler);
    form.set_value("sso", json!("true"));
    assert!(!form.is_active("provider"));
    form.set_value("sso", json!(1));
    assert!(!form.is_active("provider"));
}

#[test]
fn chains_resolve_transitively() {
    let form = valid_form(ok_handler);
    form.change("sso", json!(true));
    form.change("provider", json!("azure"));
    assert!(form.is_active("tenant"));

    // The middle link goes inactive; its stored value still says "azure".
    form.change("sso", json!(false));
    assert_eq!(form.value("provider"), Some(json!("azure")));
    assert!(!form.is_active("tenant"));
}

#[test]
fn values_survive_toggling() {
    let form = valid_form(ok_handler);
    form.change("sso", json!(true));
    form.change("provider", json!("okta"));
    form.change("sso", json!(false));
    form.change("sso", json!(true));
    assert_eq!(form.value("provider"), Some(json!("okta")));
}

#[test]
fn inactive_fields_never_report_errors() {
    let form = valid_form(ok_handler);
    form.set_value("provider", json!(""));
    form.set_value("tenant", json!("x"));
    let errors = form.validate();
    assert!(!errors.contains_key("provider"));
    assert!(!errors.contains_key("tenant"));

    form.change("sso", json!(true));
    let errors = form.validate();
    assert_eq!(errors.get("provider").map(String::as_str), Some("Provider is required"));
}

#[test]
fn errors_of_deactivated_fields_are_dropped() {
    let form = valid_form(ok_handler);
    form.change("sso", json!(true));
    assert!(form.validate().contains_key("provider"));
    form.change("sso", json!(false));
    assert!(form.error("provider").is_none());
}

#[test]
fn revalidation_is_idempotent() {
    let form = valid_form(ok_handler);
    form.change("email", json!("not an email"));
    form.change("sso", json!(true));
    let first = form.validate();
    let second = form.validate();
    assert_eq!(first, second);
    assert!(first.contains_key("email"));
}

#[test]
fn set_value_round_trips_for_any_declared_field() {
    let form = valid_form(ok_handler);
    let handle = form.handle();
    for (name, value) in [
        ("email", json!("a@b.c")),
        ("sso", json!(false)),
        ("provider", json!("okta")),
        ("tenant", json!("acme")),
    ] {
        assert!(handle.set_value(name, value.clone()));
        assert_eq!(handle.get_values().unwrap()[name], value);
    }
}

#[test]
fn payload_omits_inactive_fields() {
    let mut form = valid_form(ok_handler);
    form.set_value("provider", json!("kept but hidden"));
    let SubmitAttempt::Pending(pending) = form.submit(SubmitAction::Save) else {
        panic!("expected the submission to pass validation");
    };
    assert!(pending.payload().contains_key("email"));
    assert!(pending.payload().contains_key("sso"));
    assert!(!pending.payload().contains_key("provider"));
    assert!(!pending.payload().contains_key("tenant"));
    block_on(pending.settle());
    assert_eq!(form.value("provider"), Some(json!("kept but hidden")));
}

#[test]
fn loading_flag_is_scoped_to_its_tag() {
    let mut form = valid_form(ok_handler);
    let SubmitAttempt::Pending(pending) = form.submit(SubmitAction::SaveAndStay) else {
        panic!("expected a pending submission");
    };
    assert_eq!(form.phase(), FormPhase::Submitting);
    assert!(form.button(SubmitAction::SaveAndStay).loading);
    let save = form.button(SubmitAction::Save);
    assert!(!save.loading && !save.disabled);

    let outcome = block_on(pending.settle());
    assert_eq!(outcome.action, SubmitAction::SaveAndStay);
    assert!(!form.button(SubmitAction::SaveAndStay).loading);
    assert_eq!(form.phase(), FormPhase::Idle);
}

#[test]
fn save_in_flight_leaves_save_and_stay_live() {
    let mut form = valid_form(ok_handler);
    let SubmitAttempt::Pending(pending) = form.submit(SubmitAction::Save) else {
        panic!("expected a pending submission");
    };
    assert!(form.button(SubmitAction::Save).loading);
    let stay = form.button(SubmitAction::SaveAndStay);
    assert!(!stay.loading && !stay.disabled);
    block_on(pending.settle());
}

#[test]
fn second_activation_is_ignored_while_in_flight() {
    let mut form = valid_form(ok_handler);
    let SubmitAttempt::Pending(pending) = form.submit(SubmitAction::SaveAndStay) else {
        panic!("expected a pending submission");
    };
    match form.submit(SubmitAction::Save) {
        SubmitAttempt::Ignored {
            requested,
            in_flight,
        } => {
            assert_eq!(requested, SubmitAction::Save);
            assert_eq!(in_flight, SubmitAction::SaveAndStay);
        }
        other => panic!("expected the second activation to be ignored, got {other:?}"),
    }
    assert!(!form.button(SubmitAction::Save).loading);
    block_on(pending.settle());

    assert!(matches!(
        form.submit(SubmitAction::Save),
        SubmitAttempt::Pending(_)
    ));
}

#[test]
fn successful_save_clears_dirty_state() {
    let mut form = valid_form(ok_handler);
    assert!(form.is_dirty());
    let SubmitAttempt::Pending(pending) = form.submit(SubmitAction::Save) else {
        panic!("expected a pending submission");
    };
    let outcome = block_on(pending.settle());
    assert!(outcome.result.is_ok());
    assert!(!form.is_dirty());
}

#[test]
fn rejection_keeps_values_for_retry() {
    let mut form = valid_form(failing_handler);
    let SubmitAttempt::Pending(pending) = form.submit(SubmitAction::Save) else {
        panic!("expected a pending submission");
    };
    let outcome = block_on(pending.settle());
    let err = outcome.result.unwrap_err();
    assert_eq!(err.message(), "backend unavailable");
    assert!(outcome.applied);
    assert!(form.is_dirty());
    assert_eq!(form.value("email"), Some(json!("ops@example.com")));
    assert!(!form.button(SubmitAction::Save).loading);
    assert_eq!(form.phase(), FormPhase::Idle);
}

#[test]
fn failed_validation_keeps_tag_for_retry() {
    let mut form = EntityForm::mount(FormConfig::new(tabs()), ok_handler).unwrap();
    assert!(matches!(
        form.submit(SubmitAction::SaveAndStay),
        SubmitAttempt::Invalid(_)
    ));
    form.change("email", json!("ops@example.com"));
    let Some(SubmitAttempt::Pending(pending)) = form.retry() else {
        panic!("expected the retry to dispatch");
    };
    assert_eq!(pending.action(), SubmitAction::SaveAndStay);
}

#[test]
fn settling_after_drop_touches_nothing() {
    let mut form = valid_form(ok_handler);
    let handle = form.handle();
    let SubmitAttempt::Pending(pending) = form.submit(SubmitAction::Save) else {
        panic!("expected a pending submission");
    };
    drop(form);
    assert!(!handle.is_mounted());
    assert!(handle.get_values().is_none());
    assert!(!handle.set_value("email", json!("late@example.com")));

    let outcome = block_on(pending.settle());
    assert!(outcome.result.is_ok());
    assert!(!outcome.applied);
}

#[test]
fn reset_forgets_pending_submission() {
    let mut form = valid_form(ok_handler);
    let SubmitAttempt::Pending(pending) = form.submit(SubmitAction::Save) else {
        panic!("expected a pending submission");
    };

    let mut fresh = ValuesMap::new();
    fresh.insert("email".to_string(), json!("new@example.com"));
    form.reset(fresh);
    assert_eq!(form.phase(), FormPhase::Idle);
    assert!(!form.is_dirty());
    assert!(!form.button(SubmitAction::Save).loading);

    form.change("email", json!("edited@example.com"));
    let outcome = block_on(pending.settle());
    assert!(!outcome.applied);
    assert!(form.is_dirty());
    assert_eq!(form.phase(), FormPhase::Dirty);
}

#[test]
fn configuration_errors_fail_fast() {
    let dangling = vec![TabDescriptor::new("a", "A").with_section(
        SectionDescriptor::new("S").with_field(
            FieldDescriptor::new("x", "X", FieldType::Text).depends_on("missing", true),
        ),
    )];
    assert!(matches!(
        EntityForm::mount(FormConfig::new(dangling), ok_handler),
        Err(ConfigurationError::UnknownDependency { .. })
    ));

    let duplicated = vec![
        TabDescriptor::new("a", "A").with_section(
            SectionDescriptor::new("S").with_field(FieldDescriptor::new("x", "X", FieldType::Text)),
        ),
        TabDescriptor::new("b", "B").with_section(
            SectionDescriptor::new("S").with_field(FieldDescriptor::new("x", "X", FieldType::Number)),
        ),
    ];
    assert!(matches!(
        EntityForm::mount(FormConfig::new(duplicated), ok_handler),
        Err(ConfigurationError::DuplicateField(name)) if name == "x"
    ));
}

#[test]
fn tabs_share_one_form_state() {
    let extra = TabDescriptor::new("profile", "Profile").with_section(
        SectionDescriptor::new("About")
            .with_field(FieldDescriptor::new("bio", "Bio", FieldType::Textarea)),
    );
    let mut all = tabs();
    all.push(extra);
    let form = EntityForm::mount(FormConfig::new(all), ok_handler).unwrap();
    form.change("email", json!("x"));
    form.blur("email");
    assert!(form.error("email").is_some());

    form.select_tab_id("profile");
    form.change("bio", json!("hello"));
    form.select_tab(0);
    assert_eq!(form.value("email"), Some(json!("x")));
    assert!(form.error("email").is_some());
    assert_eq!(form.tab_summaries()[0].error_count, 1);
}

/// Mounts a form whose validator waits for whatever receiver sits in the
/// gate; with the gate empty the verdict is a ready pass.
fn gated_form(gate: &Gate) -> EntityForm {
    let waiting = Rc::clone(gate);
    let validator = Deferred(move |_: ValuesMap| {
        let receiver = waiting.borrow_mut().take();
        async move {
            match receiver {
                Some(receiver) => receiver.await.unwrap_or_default(),
                None => ErrorMap::new(),
            }
        }
    });
    let form = EntityForm::mount_with(FormConfig::new(tabs()), validator, ok_handler).unwrap();
    form.change("email", json!("ops@example.com"));
    form
}

fn hold(gate: &Gate) -> oneshot::Sender<ErrorMap> {
    let (sender, receiver) = oneshot::channel();
    *gate.borrow_mut() = Some(receiver);
    sender
}

#[test]
fn async_verdict_holds_the_validating_phase() {
    let gate = Gate::default();
    let mut form = gated_form(&gate);
    let release = hold(&gate);

    let SubmitAttempt::Validating(validation) = form.submit(SubmitAction::Save) else {
        panic!("expected the verdict to be pending");
    };
    assert_eq!(validation.action(), SubmitAction::Save);
    assert_eq!(form.phase(), FormPhase::Validating);
    assert!(form.button(SubmitAction::Save).loading);
    assert!(matches!(
        form.submit(SubmitAction::SaveAndStay),
        SubmitAttempt::Ignored {
            in_flight: SubmitAction::Save,
            ..
        }
    ));

    let mut rejected = ErrorMap::new();
    rejected.insert("email".to_string(), "Email is already registered".to_string());
    release.send(rejected).unwrap();
    let SubmitAttempt::Invalid(errors) = block_on(validation.resolve()) else {
        panic!("expected the rejected verdict to block the submission");
    };
    assert_eq!(
        errors.get("email").map(String::as_str),
        Some("Email is already registered")
    );
    assert_eq!(form.errors(), errors);
    assert_eq!(form.phase(), FormPhase::Idle);
    assert!(!form.button(SubmitAction::Save).loading);

    let Some(SubmitAttempt::Pending(pending)) = form.retry() else {
        panic!("expected the retry to dispatch");
    };
    assert_eq!(pending.action(), SubmitAction::Save);
    assert!(block_on(pending.settle()).applied);
}

#[test]
fn passing_async_verdict_dispatches() {
    let gate = Gate::default();
    let mut form = gated_form(&gate);
    let release = hold(&gate);

    let SubmitAttempt::Validating(validation) = form.submit(SubmitAction::SaveAndStay) else {
        panic!("expected the verdict to be pending");
    };
    release.send(ErrorMap::new()).unwrap();
    let SubmitAttempt::Pending(pending) = block_on(validation.resolve()) else {
        panic!("expected a pending submission");
    };
    assert_eq!(form.phase(), FormPhase::Submitting);
    assert!(form.button(SubmitAction::SaveAndStay).loading);
    block_on(pending.settle());
    assert!(!form.is_dirty());
}

#[test]
fn async_validate_applies_the_awaited_verdict() {
    let gate = Gate::default();
    let form = gated_form(&gate);
    let release = hold(&gate);
    let mut rejected = ErrorMap::new();
    rejected.insert("email".to_string(), "Email is already registered".to_string());
    release.send(rejected).unwrap();

    let errors = block_on(form.validate_async());
    assert!(errors.contains_key("email"));
    assert!(form.errors().contains_key("email"));
}

#[test]
fn dropped_validation_frees_the_slot() {
    let gate = Gate::default();
    let mut form = gated_form(&gate);
    let _release = hold(&gate);

    let SubmitAttempt::Validating(validation) = form.submit(SubmitAction::Save) else {
        panic!("expected the verdict to be pending");
    };
    drop(validation);
    assert_eq!(form.phase(), FormPhase::Idle);
    assert!(!form.button(SubmitAction::Save).loading);
    assert!(matches!(
        form.submit(SubmitAction::Save),
        SubmitAttempt::Pending(_)
    ));
}

#[test]
fn verdict_arriving_after_reset_is_cancelled() {
    let gate = Gate::default();
    let mut form = gated_form(&gate);
    let release = hold(&gate);

    let SubmitAttempt::Validating(validation) = form.submit(SubmitAction::Save) else {
        panic!("expected the verdict to be pending");
    };
    form.reset(ValuesMap::new());
    release.send(ErrorMap::new()).unwrap();
    assert!(matches!(
        block_on(validation.resolve()),
        SubmitAttempt::Cancelled(SubmitAction::Save)
    ));
    assert_eq!(form.phase(), FormPhase::Idle);
}

#[test]
fn dropped_submission_frees_the_slot() {
    let mut form = valid_form(ok_handler);
    let SubmitAttempt::Pending(pending) = form.submit(SubmitAction::SaveAndStay) else {
        panic!("expected a pending submission");
    };
    drop(pending);
    assert_eq!(form.phase(), FormPhase::Idle);
    assert!(!form.button(SubmitAction::SaveAndStay).loading);
    assert!(form.is_dirty());

    let SubmitAttempt::Pending(pending) = form.submit(SubmitAction::Save) else {
        panic!("expected the slot to be free again");
    };
    assert!(block_on(pending.settle()).applied);
}
