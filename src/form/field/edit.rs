use serde_json::Value;

use crate::domain::{FieldDescriptor, FieldType, SelectOption};

use super::convert::{number_as_f64, number_value, step_number, value_to_string};

/// Abstract edit applied to a field's value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldInput {
    Insert(char),
    Backspace,
    Clear,
    Newline,
    /// Moves a number by `n` steps of its configured step (default 1).
    Step(i32),
    Toggle,
    /// Picks the option at this index of the current option list.
    Choose(usize),
    /// Flips membership of the option at this index in a multi-select value.
    ToggleOption(usize),
}

/// Returns the new value, or `None` when the input does not apply to the field.
pub fn apply_input(
    field: &FieldDescriptor,
    current: &Value,
    input: FieldInput,
    options: &[SelectOption],
) -> Option<Value> {
    match field.field_type {
        FieldType::Text
        | FieldType::Email
        | FieldType::Password
        | FieldType::Url
        | FieldType::Textarea
        | FieldType::RichText
        | FieldType::Date => edit_text(field, current, input),
        FieldType::Number => edit_number(field, current, input),
        FieldType::Checkbox | FieldType::Switch => match input {
            FieldInput::Toggle | FieldInput::Insert(' ') => {
                Some(Value::Bool(!current.as_bool().unwrap_or(false)))
            }
            _ => None,
        },
        FieldType::Select => match input {
            FieldInput::Choose(index) => options.get(index).map(|option| option.value.clone()),
            FieldInput::Clear => Some(Value::Null),
            _ => None,
        },
        FieldType::MultiSelect | FieldType::RoleMultiSelect => match input {
            FieldInput::ToggleOption(index) | FieldInput::Choose(index) => {
                let option = options.get(index)?;
                let mut chosen = current.as_array().cloned().unwrap_or_default();
                match chosen.iter().position(|value| value == &option.value) {
                    Some(pos) => {
                        chosen.remove(pos);
                    }
                    None => chosen.push(option.value.clone()),
                }
                Some(Value::Array(chosen))
            }
            FieldInput::Clear => Some(Value::Array(Vec::new())),
            _ => None,
        },
    }
}

fn edit_text(field: &FieldDescriptor, current: &Value, input: FieldInput) -> Option<Value> {
    let mut text = value_to_string(current);
    match input {
        FieldInput::Insert(ch) => {
            if !accepts_char(field.field_type, ch) || at_limit(field, &text) {
                return None;
            }
            text.push(ch);
        }
        FieldInput::Newline => {
            if !field.field_type.is_multiline() || at_limit(field, &text) {
                return None;
            }
            text.push('\n');
        }
        FieldInput::Backspace => {
            text.pop()?;
        }
        FieldInput::Clear => text.clear(),
        _ => return None,
    }
    if field.field_type == FieldType::Date && text.is_empty() {
        return Some(Value::Null);
    }
    Some(Value::String(text))
}

fn edit_number(field: &FieldDescriptor, current: &Value, input: FieldInput) -> Option<Value> {
    let rules = &field.validation;
    match input {
        FieldInput::Step(steps) => {
            let delta = rules.step.unwrap_or(1.0) * steps as f64;
            Some(step_number(number_as_f64(current), delta, rules.min, rules.max))
        }
        FieldInput::Insert(ch) if ch.is_ascii_digit() || matches!(ch, '-' | '.') => {
            let mut text = value_to_string(current);
            text.push(ch);
            Some(number_value(&text))
        }
        FieldInput::Backspace => {
            let mut text = value_to_string(current);
            text.pop()?;
            Some(number_value(&text))
        }
        FieldInput::Clear => Some(Value::Null),
        _ => None,
    }
}

fn accepts_char(field_type: FieldType, ch: char) -> bool {
    match field_type {
        FieldType::Date => ch.is_ascii_digit() || ch == '-',
        FieldType::Email | FieldType::Url => !ch.is_whitespace(),
        _ => !ch.is_control(),
    }
}

fn at_limit(field: &FieldDescriptor, text: &str) -> bool {
    let limit = match field.field_type {
        FieldType::Date => Some(10),
        _ => field.validation.max_length,
    };
    limit.is_some_and(|limit| text.chars().count() >= limit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ValidationRules;
    use serde_json::json;

    #[test]
    fn text_respects_max_length() {
        let field = FieldDescriptor::new("code", "Code", FieldType::Text)
            .with_validation(ValidationRules::default().with_length(None, Some(3)));
        let value = apply_input(&field, &json!("ab"), FieldInput::Insert('c'), &[]).unwrap();
        assert_eq!(value, json!("abc"));
        assert!(apply_input(&field, &value, FieldInput::Insert('d'), &[]).is_none());
    }

    #[test]
    fn newline_only_for_multiline_types() {
        let text = FieldDescriptor::new("a", "A", FieldType::Text);
        let area = FieldDescriptor::new("b", "B", FieldType::Textarea);
        assert!(apply_input(&text, &json!("x"), FieldInput::Newline, &[]).is_none());
        assert_eq!(
            apply_input(&area, &json!("x"), FieldInput::Newline, &[]),
            Some(json!("x\n"))
        );
    }

    #[test]
    fn date_accepts_digits_and_dashes() {
        let field = FieldDescriptor::new("day", "Day", FieldType::Date);
        assert!(apply_input(&field, &Value::Null, FieldInput::Insert('x'), &[]).is_none());
        assert_eq!(
            apply_input(&field, &Value::Null, FieldInput::Insert('2'), &[]),
            Some(json!("2"))
        );
        assert_eq!(
            apply_input(&field, &json!("2"), FieldInput::Backspace, &[]),
            Some(Value::Null)
        );
    }

    #[test]
    fn number_typing_and_stepping() {
        let field = FieldDescriptor::new("qty", "Qty", FieldType::Number)
            .with_validation(ValidationRules::default().with_range(Some(0.0), Some(10.0)).with_step(2.0));
        let typed = apply_input(&field, &json!(1), FieldInput::Insert('.'), &[]).unwrap();
        assert_eq!(typed, json!("1."));
        let typed = apply_input(&field, &typed, FieldInput::Insert('5'), &[]).unwrap();
        assert_eq!(typed, json!(1.5));

        let stepped = apply_input(&field, &json!(9), FieldInput::Step(1), &[]).unwrap();
        assert_eq!(stepped, json!(10));
        let stepped = apply_input(&field, &Value::Null, FieldInput::Step(-1), &[]).unwrap();
        assert_eq!(stepped, json!(0));
    }

    #[test]
    fn multi_select_toggles_membership() {
        let field = FieldDescriptor::new("roles", "Roles", FieldType::RoleMultiSelect);
        let options = vec![SelectOption::new("admin", "Admin"), SelectOption::new("editor", "Editor")];
        let value = apply_input(&field, &json!([]), FieldInput::ToggleOption(1), &options).unwrap();
        assert_eq!(value, json!(["editor"]));
        let value = apply_input(&field, &value, FieldInput::ToggleOption(1), &options).unwrap();
        assert_eq!(value, json!([]));
        assert!(apply_input(&field, &value, FieldInput::ToggleOption(5), &options).is_none());
    }

    #[test]
    fn select_and_toggle() {
        let select = FieldDescriptor::new("kind", "Kind", FieldType::Select);
        let options = vec![SelectOption::new("manual", "Manual")];
        assert_eq!(
            apply_input(&select, &Value::Null, FieldInput::Choose(0), &options),
            Some(json!("manual"))
        );
        let switch = FieldDescriptor::new("on", "On", FieldType::Switch);
        assert_eq!(
            apply_input(&switch, &json!(false), FieldInput::Toggle, &[]),
            Some(json!(true))
        );
    }
}
