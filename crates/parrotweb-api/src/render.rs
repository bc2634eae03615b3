//! HTML building blocks shared by the route modules
//!
//! Every form field goes through [`render_field`]; the widget is picked from
//! its [`FieldKind`].

use axum::http::HeaderMap;
use chrono::DateTime;
use parrotweb_config::Config;
use parrotweb_core::{Field, FieldKind, Form};
use parrotweb_utils::{escape_html, format_amount};

// ==================== Page shell ====================

/// Base HTML template
pub fn base_html(title: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{} - Parrot Wings</title>
    <script src="https://unpkg.com/htmx.org@1.9.10"></script>
    <link rel="stylesheet" href="/static/app.css">
    <style>
        .htmx-indicator {{ opacity: 0; transition: opacity 0.3s; }}
        .htmx-request .htmx-indicator {{ opacity: 1; }}
        .htmx-request.htmx-indicator {{ opacity: 1; }}
    </style>
</head>
<body>
    {}
    <div id='dialog'></div>
</body>
</html>"#,
        escape_html(title),
        content
    )
}

/// Check if request is from HTMX (partial page update)
pub fn is_htmx_request(headers: &HeaderMap) -> bool {
    headers.get("hx-request").is_some()
}

/// Wrap content for a full page, or return it bare for HTMX
pub fn page_response(headers: &HeaderMap, title: &str, content: &str) -> String {
    if is_htmx_request(headers) {
        content.to_string()
    } else {
        base_html(title, content)
    }
}

/// Standalone error text for failed requests
pub fn error_notice(message: &str) -> String {
    format!("<div class='error-notice' role='alert'>{}</div>", escape_html(message))
}

/// Dismissible error banner; empty when there is nothing to show
pub fn banner(message: Option<&str>, clear_action: &str) -> String {
    match message {
        Some(message) => format!(
            r#"<div class='banner' role='alert'>
    <span>{}</span>
    <button type='button' hx-post='{}' hx-target='closest .banner' hx-swap='outerHTML'>&times;</button>
</div>"#,
            escape_html(message),
            clear_action
        ),
        None => String::new(),
    }
}

/// Modal wrapper; closing posts to `close_action`, which empties `#dialog`
pub fn render_dialog(title: &str, body: &str, close_action: &str) -> String {
    format!(
        r#"<div class='dialog-backdrop'>
    <div class='dialog' role='dialog' aria-label='{title}'>
        <div class='dialog-header'>
            <h2>{title}</h2>
            <button type='button' hx-post='{close}' hx-target='#dialog' hx-swap='innerHTML'>Close</button>
        </div>
        {body}
    </div>
</div>"#,
        title = escape_html(title),
        close = close_action,
        body = body
    )
}

// ==================== Forms ====================

fn field_id(form_id: &str, field: &Field) -> String {
    format!("{}-{}", form_id, field.name())
}

/// One labelled input; the widget depends on the field kind
pub fn render_field(form_id: &str, field: &Field) -> String {
    let id = field_id(form_id, field);
    let spec = &field.spec;
    let value = escape_html(&field.value);
    let placeholder = spec
        .placeholder
        .as_deref()
        .map(|p| format!(" placeholder='{}'", escape_html(p)))
        .unwrap_or_default();
    let autofocus = if spec.autofocus { " autofocus" } else { "" };

    let input = match &spec.kind {
        FieldKind::Text(input_type) => format!(
            "<input type='{}' id='{}' name='{}' value='{}'{}{}>",
            input_type.as_str(),
            id,
            spec.name,
            value,
            placeholder,
            autofocus
        ),
        FieldKind::Password => format!(
            "<input type='password' id='{}' name='{}' value='{}'{}{}>",
            id, spec.name, value, placeholder, autofocus
        ),
        FieldKind::Select(options) => {
            let options: String = options
                .iter()
                .map(|o| {
                    let selected = if o.value == field.value { " selected" } else { "" };
                    format!(
                        "<option value='{}'{}>{}</option>",
                        escape_html(&o.value),
                        selected,
                        escape_html(&o.display_name)
                    )
                })
                .collect();
            format!(
                "<select id='{}' name='{}'{}><option value=''></option>{}</select>",
                id, spec.name, autofocus, options
            )
        }
        FieldKind::Autocomplete => format!(
            r#"<input type='text' id='{id}' name='{name}' value='{value}' list='{id}-options' autocomplete='off'{placeholder}{autofocus}
        hx-get='/users/suggest' hx-trigger='input changed delay:300ms' hx-target='#{id}-options'
        hx-vals='js:{{q: event.target.value}}'>
    <datalist id='{id}-options'></datalist>"#,
            id = id,
            name = spec.name,
            value = value,
            placeholder = placeholder,
            autofocus = autofocus
        ),
    };

    format!(
        r#"<div class='field'>
    <label for='{}'>{}</label>
    {}
    {}
</div>"#,
        id,
        escape_html(&spec.label),
        input,
        render_field_errors(form_id, field, false)
    )
}

/// Error list under a field; shown once the field has been touched
pub fn render_field_errors(form_id: &str, field: &Field, oob: bool) -> String {
    let oob = if oob { " hx-swap-oob='true'" } else { "" };
    let errors: String = if field.show_errors() {
        field
            .errors
            .iter()
            .map(|e| format!("<p>{}</p>", escape_html(e)))
            .collect()
    } else {
        String::new()
    };
    format!(
        "<div id='{}-errors' class='field-errors'{}>{}</div>",
        field_id(form_id, field),
        oob,
        errors
    )
}

/// Submit button of a dialog form
pub struct SubmitButton<'a> {
    pub form_id: &'a str,
    pub label: &'a str,
    pub action: &'a str,
    pub loading: bool,
}

impl SubmitButton<'_> {
    pub fn render(&self, form: &Form, oob: bool) -> String {
        let disabled = if form.is_valid() && !self.loading { "" } else { " disabled" };
        let oob = if oob { " hx-swap-oob='true'" } else { "" };
        let label = if self.loading { "Please wait..." } else { self.label };
        format!(
            "<button type='button' id='{}-submit' hx-post='{}' hx-target='#dialog' hx-swap='innerHTML'{}{}>{}</button>",
            self.form_id, self.action, disabled, oob, label
        )
    }
}

/// Whole form. Edits are posted to `field_action` as the user types; the
/// answer only carries out-of-band swaps so the inputs keep focus.
pub fn render_form(form_id: &str, form: &Form, field_action: &str, submit: &SubmitButton<'_>) -> String {
    let fields: String = form.fields().map(|f| render_field(form_id, f)).collect();
    format!(
        r#"<form id='{}-form' hx-post='{}' hx-trigger='input delay:300ms' hx-swap='none'>
    {}
    {}
</form>"#,
        form_id,
        field_action,
        fields,
        submit.render(form, false)
    )
}

/// Out-of-band refresh of every error list and the submit button
pub fn render_form_refresh(form_id: &str, form: &Form, submit: &SubmitButton<'_>) -> String {
    let mut html: String = form
        .fields()
        .map(|f| render_field_errors(form_id, f, true))
        .collect();
    html.push_str(&submit.render(form, true));
    html
}

// ==================== Values ====================

/// Amount with the configured currency suffix
pub fn money(config: &Config, amount: i64) -> String {
    format_amount(amount, &config.currency.suffix, &config.currency.thousands_separator)
}

/// Timestamp as shown in the table; unparsable dates are shown verbatim
pub fn display_date(date: &str) -> String {
    match DateTime::parse_from_rfc3339(date) {
        Ok(dt) => dt.format("%Y-%m-%d %H:%M").to_string(),
        Err(_) => escape_html(date),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parrotweb_core::{login_form, register_form, FieldSpec, SelectOption};

    #[test]
    fn test_render_field_dispatch() {
        let form = Form::builder()
            .field(FieldSpec::email("email", "E-mail").autofocus())
            .field(FieldSpec::password("password", "Password"))
            .field(FieldSpec::autocomplete("name", "User name"))
            .field(FieldSpec::select(
                "currency",
                "Currency",
                vec![SelectOption {
                    value: "pw".to_string(),
                    display_name: "Parrot Wings".to_string(),
                }],
            ))
            .build();
        let html: Vec<String> = form.fields().map(|f| render_field("t", f)).collect();

        assert!(html[0].contains("type='email'"));
        assert!(html[0].contains("autofocus"));
        assert!(html[1].contains("type='password'"));
        assert!(html[2].contains("hx-get='/users/suggest'"));
        assert!(html[2].contains("<datalist id='t-name-options'>"));
        assert!(html[3].contains("<select id='t-currency'"));
        assert!(html[3].contains("Parrot Wings"));
    }

    #[test]
    fn test_errors_hidden_until_touched() {
        let mut form = login_form();
        let email = form.field("email").unwrap();
        assert_eq!(
            render_field_errors("login", email, false),
            "<div id='login-email-errors' class='field-errors'></div>"
        );

        form.set_value("email", "nope").unwrap();
        let html = render_field_errors("login", form.field("email").unwrap(), true);
        assert!(html.contains("Email is not valid"));
        assert!(html.contains("hx-swap-oob='true'"));
    }

    #[test]
    fn test_submit_disabled_until_valid() {
        let mut form = register_form();
        let submit = SubmitButton {
            form_id: "register",
            label: "Register",
            action: "/auth/register",
            loading: false,
        };
        assert!(submit.render(&form, false).contains(" disabled"));

        form.set_value("email", "a@b.com").unwrap();
        form.set_value("name", "alice").unwrap();
        form.set_value("password", "secret1").unwrap();
        form.set_value("repeat_password", "secret1").unwrap();
        assert!(!submit.render(&form, false).contains(" disabled"));
    }

    #[test]
    fn test_values_are_escaped() {
        let mut form = login_form();
        form.set_value("email", "<script>").unwrap();
        let html = render_field("login", form.field("email").unwrap());
        assert!(html.contains("value='&lt;script&gt;'"));
    }

    #[test]
    fn test_display_date() {
        assert_eq!(display_date("2020-05-01T10:00:00.000Z"), "2020-05-01 10:00");
        assert_eq!(display_date("yesterday"), "yesterday");
    }

    #[test]
    fn test_banner() {
        assert_eq!(banner(None, "/x"), "");
        assert!(banner(Some("boom"), "/x").contains("hx-post='/x'"));
    }
}
