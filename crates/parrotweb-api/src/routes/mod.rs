//! Route modules for the front-end server
//!
//! - auth: Entry screen, login and register dialogs, logout
//! - dashboard: Dashboard page and the shared refresh flow
//! - transactions: Table, filter, pagination and the create dialog
//! - users: Counterparty suggestions
//!
//! HTMX posts arrive as `application/x-www-form-urlencoded` bodies and are
//! decoded with [`parse_form_body`].

pub mod auth;
pub mod dashboard;
pub mod transactions;
pub mod users;

use parrotweb_core::Form;
use std::collections::HashMap;

/// Decode a urlencoded request body into a key-value map
pub fn parse_form_body(body: &str) -> HashMap<String, String> {
    let mut params = HashMap::new();
    for pair in body.split('&').filter(|p| !p.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        let key = urlencoding::decode(&key.replace('+', " "))
            .map(|k| k.into_owned())
            .unwrap_or_default();
        let value = urlencoding::decode(&value.replace('+', " "))
            .map(|v| v.into_owned())
            .unwrap_or_default();
        if !key.is_empty() {
            params.insert(key, value);
        }
    }
    params
}

/// Feed submitted values into a form. Only values that differ from the
/// current ones count as edits, so untouched fields stay untouched.
pub fn apply_edits(form: &mut Form, params: &HashMap<String, String>) -> Vec<String> {
    let names: Vec<String> = form.fields().map(|f| f.name().to_string()).collect();
    let mut changed = Vec::new();
    for name in names {
        let Some(value) = params.get(&name) else {
            continue;
        };
        if form.value(&name) == Some(value.as_str()) {
            continue;
        }
        match form.set_value(&name, value) {
            Ok(()) => changed.push(name),
            Err(e) => log::warn!("Ignoring edit: {}", e),
        }
    }
    changed
}
