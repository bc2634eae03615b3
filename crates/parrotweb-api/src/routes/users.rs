//! Counterparty suggestions for the create dialog

use crate::routes::auth::end_session;
use crate::AppState;
use axum::extract::{Query, State};
use axum::response::Html;
use parrotweb_utils::escape_html;
use std::collections::HashMap;

/// HTMX: `<option>` list for the autocomplete datalist
///
/// Results that arrive after the dialog was closed or reopened are dropped.
pub async fn htmx_users_suggest(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Html<String> {
    let query = params.get("q").map(|q| q.trim()).unwrap_or("");
    if query.is_empty() {
        return Html(String::new());
    }
    let Some(token) = state.session.token() else {
        return Html(String::new());
    };

    let ticket = state.dialog.ticket();
    let result = state.gateway.list_users(&token, query).await;
    if !state.dialog.is_current(ticket) {
        log::debug!("Dropping suggestions for a closed dialog");
        return Html(String::new());
    }

    match result {
        Ok(users) => Html(
            users
                .iter()
                .map(|u| format!("<option value='{}'></option>", escape_html(&u.name)))
                .collect(),
        ),
        Err(e) => {
            log::warn!("Failed to load user suggestions: {}", e);
            if e.is_unauthorized() {
                end_session(&state).await;
            }
            Html(String::new())
        }
    }
}
