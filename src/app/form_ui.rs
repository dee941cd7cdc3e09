use std::fmt;

use anyhow::{Context, Result};
use futures::future;

use crate::{
    domain::ValuesMap,
    form::{AsyncValidator, EntityForm, FormConfig, OptionSource, SubmissionError, SubmitContext},
    io::{OutputOptions, emit},
};

use super::{options::UiOptions, runtime::App};

/// Interactive terminal session over one [`EntityForm`].
///
/// Each successful submission is written to the file destinations of the
/// configured [`OutputOptions`]; [`FormUI::run`] returns the last saved
/// payload so the caller can print it once the terminal is restored.
pub struct FormUI {
    config: FormConfig,
    options: UiOptions,
    validator: Option<Box<dyn AsyncValidator>>,
    output: Option<OutputOptions>,
    bindings: Vec<(String, Box<dyn OptionSource>)>,
}

impl fmt::Debug for FormUI {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormUI")
            .field("config", &self.config)
            .field("options", &self.options)
            .field("output", &self.output)
            .finish_non_exhaustive()
    }
}

impl FormUI {
    pub fn new(config: FormConfig) -> Self {
        Self {
            config,
            options: UiOptions::default(),
            validator: None,
            output: None,
            bindings: Vec::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.config.title = Some(title.into());
        self
    }

    pub fn with_options(mut self, options: UiOptions) -> Self {
        self.options = options;
        self
    }

    /// Replaces the schema-backed validator. Plain validators work too.
    pub fn with_validator<V>(mut self, validator: V) -> Self
    where
        V: AsyncValidator + 'static,
    {
        self.validator = Some(Box::new(validator));
        self
    }

    pub fn with_output(mut self, output: OutputOptions) -> Self {
        self.output = Some(output);
        self
    }

    pub fn bind_options<O>(mut self, field: impl Into<String>, source: O) -> Self
    where
        O: OptionSource + 'static,
    {
        self.bindings.push((field.into(), Box::new(source)));
        self
    }

    /// Mounts the form without attaching a terminal.
    pub fn mount(self) -> Result<(EntityForm, UiOptions)> {
        let FormUI {
            config,
            options,
            validator,
            output,
            bindings,
        } = self;

        let files = output.map(|output| output.files_only()).unwrap_or_else(|| {
            OutputOptions::default().with_destinations(Vec::new())
        });
        let submitter = move |values: ValuesMap, context: SubmitContext| {
            let written = emit(&values, &files).map_err(SubmissionError::from);
            if written.is_ok() && !files.is_empty() {
                tracing::info!(action = %context.submit_action, "payload written");
            }
            future::ready(written)
        };

        let form = match validator {
            Some(validator) => EntityForm::mount_boxed(config, validator, submitter),
            None => EntityForm::mount(config, submitter),
        }
        .context("invalid form configuration")?;
        for (field, source) in bindings {
            form.bind_options(&field, source)
                .with_context(|| format!("cannot bind options to `{field}`"))?;
        }
        Ok((form, options))
    }

    /// Runs the session. `None` means the user left without saving.
    pub fn run(self) -> Result<Option<ValuesMap>> {
        let (form, options) = self.mount()?;
        App::new(form, options).run()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{
            ErrorMap, FieldDescriptor, FieldType, SectionDescriptor, SelectOption, SubmitAction,
            TabDescriptor,
        },
        form::SubmitAttempt,
    };
    use serde_json::json;

    fn config() -> FormConfig {
        FormConfig::new(vec![TabDescriptor::new("main", "Main").with_section(
            SectionDescriptor::new("Basics")
                .with_field(FieldDescriptor::new("name", "Name", FieldType::Text))
                .with_field(FieldDescriptor::new("region", "Region", FieldType::Select)),
        )])
    }

    #[test]
    fn mount_binds_option_sources() {
        let (form, _) = FormUI::new(config())
            .bind_options("region", vec![SelectOption::new("eu", "Europe")])
            .mount()
            .unwrap();
        assert_eq!(form.options("region")[0].label, "Europe");
    }

    #[test]
    fn binding_unknown_field_fails() {
        let err = FormUI::new(config())
            .bind_options("missing", Vec::<SelectOption>::new())
            .mount()
            .unwrap_err();
        assert!(format!("{err:#}").contains("missing"));
    }

    #[test]
    fn custom_validator_blocks_submission() {
        let (mut form, _) = FormUI::new(config())
            .with_validator(|values: &ValuesMap| {
                let mut errors = ErrorMap::new();
                if values.get("name") != Some(&json!("ok")) {
                    errors.insert("name".to_string(), "Name must be ok".to_string());
                }
                errors
            })
            .mount()
            .unwrap();
        match form.submit(SubmitAction::Save) {
            SubmitAttempt::Invalid(errors) => assert_eq!(errors["name"], "Name must be ok"),
            other => panic!("expected invalid, got {other:?}"),
        }
    }
}
