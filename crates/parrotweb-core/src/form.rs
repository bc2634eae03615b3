//! Form state controller
//!
//! One controller serves every dialog. A form is described by a list of
//! [`FieldSpec`]s; the controller keeps each field's value, verdict and
//! touched flag and derives `form_is_valid` from them after every change.

use crate::error::{CoreError, CoreResult};
use crate::validation::{validate, Rules, ValidationContext};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Name of the field that `password_repeat` rules compare against
pub const PASSWORD_FIELD: &str = "password";

/// HTML input type of a plain text field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputType {
    Text,
    Email,
    Number,
}

impl InputType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InputType::Text => "text",
            InputType::Email => "email",
            InputType::Number => "number",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub value: String,
    pub display_name: String,
}

/// Widget used to edit a field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldKind {
    Text(InputType),
    Password,
    Select(Vec<SelectOption>),
    /// Free text with server-provided suggestions
    Autocomplete,
}

/// Static description of a form field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    pub label: String,
    pub placeholder: Option<String>,
    pub kind: FieldKind,
    pub rules: Rules,
    pub autofocus: bool,
}

impl FieldSpec {
    pub fn new(name: &str, label: &str, kind: FieldKind) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            placeholder: None,
            kind,
            rules: Rules::default(),
            autofocus: false,
        }
    }

    pub fn text(name: &str, label: &str) -> Self {
        Self::new(name, label, FieldKind::Text(InputType::Text))
    }

    pub fn email(name: &str, label: &str) -> Self {
        Self::new(name, label, FieldKind::Text(InputType::Email))
    }

    pub fn number(name: &str, label: &str) -> Self {
        Self::new(name, label, FieldKind::Text(InputType::Number))
    }

    pub fn password(name: &str, label: &str) -> Self {
        Self::new(name, label, FieldKind::Password)
    }

    pub fn select(name: &str, label: &str, options: Vec<SelectOption>) -> Self {
        Self::new(name, label, FieldKind::Select(options))
    }

    pub fn autocomplete(name: &str, label: &str) -> Self {
        Self::new(name, label, FieldKind::Autocomplete)
    }

    pub fn placeholder(mut self, placeholder: &str) -> Self {
        self.placeholder = Some(placeholder.to_string());
        self
    }

    pub fn rules(mut self, rules: Rules) -> Self {
        self.rules = rules;
        self
    }

    pub fn autofocus(mut self) -> Self {
        self.autofocus = true;
        self
    }
}

/// Live state of one field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Field {
    pub spec: FieldSpec,
    pub value: String,
    pub valid: bool,
    pub errors: Vec<String>,
    pub touched: bool,
}

impl Field {
    fn new(spec: FieldSpec) -> Self {
        Self {
            spec,
            value: String::new(),
            valid: false,
            errors: Vec::new(),
            touched: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.spec.name
    }

    /// Errors are only shown once the user has interacted with the field
    pub fn show_errors(&self) -> bool {
        self.touched && !self.valid
    }
}

/// Values of a valid form, handed out by [`Form::submit`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormValues(BTreeMap<String, String>);

impl FormValues {
    /// Value of a field, empty when the form has no such field
    pub fn get(&self, name: &str) -> &str {
        self.0.get(name).map(String::as_str).unwrap_or("")
    }
}

#[derive(Debug, Default)]
pub struct FormBuilder {
    specs: Vec<FieldSpec>,
}

impl FormBuilder {
    pub fn field(mut self, spec: FieldSpec) -> Self {
        self.specs.push(spec);
        self
    }

    pub fn build(self) -> Form {
        Form::new(self.specs)
    }
}

/// A set of fields plus the derived overall validity
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Form {
    fields: Vec<Field>,
    form_is_valid: bool,
}

impl Form {
    pub fn builder() -> FormBuilder {
        FormBuilder::default()
    }

    pub fn new(specs: Vec<FieldSpec>) -> Self {
        let mut form = Self {
            fields: specs.into_iter().map(Field::new).collect(),
            form_is_valid: false,
        };
        form.revalidate_all();
        form
    }

    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter()
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name() == name)
    }

    pub fn value(&self, name: &str) -> Option<&str> {
        self.field(name).map(|f| f.value.as_str())
    }

    pub fn is_valid(&self) -> bool {
        self.form_is_valid
    }

    /// Apply a user edit: store the value, re-validate, mark touched.
    pub fn set_value(&mut self, name: &str, value: &str) -> CoreResult<()> {
        let index = self.index_of(name)?;
        self.fields[index].value = value.to_string();
        self.fields[index].touched = true;
        self.validate_field(index);

        if name == PASSWORD_FIELD {
            // keep repeat fields in step with the password they mirror
            for i in 0..self.fields.len() {
                if self.fields[i].spec.rules.password_repeat {
                    self.validate_field(i);
                }
            }
        }

        self.recompute_form_validity();
        Ok(())
    }

    /// Set a value programmatically (repeat prefill); counts as touched.
    pub fn prefill(&mut self, name: &str, value: &str) -> CoreResult<()> {
        self.set_value(name, value)
    }

    /// Re-run validation on every field without touching them
    pub fn revalidate_all(&mut self) {
        for i in 0..self.fields.len() {
            self.validate_field(i);
        }
        self.recompute_form_validity();
    }

    /// Back to the initial field set: values and touched flags cleared
    pub fn reset(&mut self) {
        for field in &mut self.fields {
            field.value.clear();
            field.touched = false;
        }
        self.revalidate_all();
    }

    /// Field values when the form is valid; `None` means the submit is ignored.
    pub fn submit(&self) -> Option<FormValues> {
        if !self.form_is_valid {
            log::debug!("Ignoring submit of an invalid form");
            return None;
        }
        Some(FormValues(
            self.fields
                .iter()
                .map(|f| (f.name().to_string(), f.value.clone()))
                .collect(),
        ))
    }

    fn index_of(&self, name: &str) -> CoreResult<usize> {
        self.fields
            .iter()
            .position(|f| f.name() == name)
            .ok_or_else(|| CoreError::UnknownField {
                name: name.to_string(),
            })
    }

    fn validate_field(&mut self, index: usize) {
        let password = self.value(PASSWORD_FIELD).map(str::to_string);
        let ctx = ValidationContext {
            password: password.as_deref(),
        };
        let field = &mut self.fields[index];
        let verdict = validate(&field.value, &field.spec.rules, &ctx);
        field.valid = verdict.valid;
        field.errors = verdict.errors;
    }

    fn recompute_form_validity(&mut self) {
        self.form_is_valid = self.fields.iter().all(|f| f.valid);
    }
}

// ==================== Presets ====================

/// Sign-in dialog: email and password
pub fn login_form() -> Form {
    Form::builder()
        .field(
            FieldSpec::email("email", "E-mail")
                .placeholder("Email address")
                .rules(Rules::new().required().email())
                .autofocus(),
        )
        .field(
            FieldSpec::password(PASSWORD_FIELD, "Password")
                .placeholder("Password")
                .rules(Rules::new().required().min_length(6)),
        )
        .build()
}

/// Registration dialog: email, name, password and its repetition
pub fn register_form() -> Form {
    Form::builder()
        .field(
            FieldSpec::email("email", "E-mail")
                .placeholder("Email address")
                .rules(Rules::new().required().email())
                .autofocus(),
        )
        .field(
            FieldSpec::text("name", "Name")
                .placeholder("Name")
                .rules(Rules::new().required()),
        )
        .field(
            FieldSpec::password(PASSWORD_FIELD, "Password")
                .placeholder("Password")
                .rules(Rules::new().required().min_length(6)),
        )
        .field(
            FieldSpec::password("repeat_password", "Repeat password")
                .placeholder("Repeat password")
                .rules(Rules::new().required().min_length(6).password_repeat()),
        )
        .build()
}

/// New transaction dialog: counterparty and a positive amount
pub fn create_transaction_form() -> Form {
    Form::builder()
        .field(
            FieldSpec::autocomplete("name", "User name")
                .rules(Rules::new().required())
                .autofocus(),
        )
        .field(
            FieldSpec::number("amount", "Amount")
                .rules(Rules::new().required().numeric().positive()),
        )
        .build()
}
