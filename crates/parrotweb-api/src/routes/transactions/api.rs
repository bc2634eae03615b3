//! Transaction table endpoints - HTMX partial responses
//!
//! Endpoints:
//! - htmx_transactions_list: Table fragment (sort, page, page size, layout)
//! - htmx_filter: Apply the filter form
//! - htmx_filter_reset: Restore the default filter
//! - htmx_error_clear: Dismiss the transactions error banner

use super::page::{render_panel, render_table, Layout};
use crate::routes::parse_form_body;
use crate::{AppState, UiState};
use axum::extract::{Query, State};
use axum::response::Html;
use chrono::NaiveDate;
use parrotweb_core::{Filter, Sort, SortKey};
use std::collections::HashMap;

fn parse_date(value: Option<&String>) -> Option<NaiveDate> {
    let value = value.map(|v| v.trim()).filter(|v| !v.is_empty())?;
    match NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(_) => {
            log::debug!("Ignoring unparsable filter date: {}", value);
            None
        }
    }
}

fn non_empty(value: Option<&String>) -> Option<String> {
    value.filter(|v| !v.is_empty()).cloned()
}

/// Filter from the submitted filter form. Unchecked boxes are absent.
pub fn filter_from_params(params: &HashMap<String, String>) -> Filter {
    Filter {
        credit: params.contains_key("credit"),
        debit: params.contains_key("debit"),
        name: non_empty(params.get("name")),
        amount: non_empty(params.get("amount")),
        date: parse_date(params.get("date")),
        date_from: parse_date(params.get("date_from")),
        date_to: parse_date(params.get("date_to")),
    }
}

/// Apply table navigation from query parameters
pub fn apply_navigation(ui: &mut UiState, params: &HashMap<String, String>) {
    let UiState {
        view,
        transactions,
        layout,
        ..
    } = ui;

    if let Some(next) = Layout::from_param(params.get("view").map(String::as_str)) {
        *layout = next;
    }
    if let Some(key) = params.get("sort").and_then(|s| s.parse::<SortKey>().ok()) {
        view.request_sort(key);
    }
    if let Some(value) = params.get("order_by") {
        match value.parse::<Sort>() {
            Ok(sort) => view.set_sort(sort),
            Err(e) => log::debug!("{}", e),
        }
    }
    if let Some(size) = params.get("page_size").and_then(|s| s.parse::<usize>().ok()) {
        if !view.set_page_size(size) {
            log::debug!("Ignoring unsupported page size {}", size);
        }
    }
    if let Some(page) = params.get("page").and_then(|s| s.parse::<usize>().ok()) {
        view.set_page(page, &transactions.transactions);
    }
}

/// HTMX: Table fragment
pub async fn htmx_transactions_list(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Html<String> {
    let mut ui = state.ui.write().await;
    apply_navigation(&mut ui, &params);
    Html(render_table(&ui, &state.config))
}

/// HTMX: Apply the filter form
pub async fn htmx_filter(State(state): State<AppState>, body: String) -> Html<String> {
    let filter = filter_from_params(&parse_form_body(&body));
    let mut ui = state.ui.write().await;
    let UiState { view, transactions, .. } = &mut *ui;
    view.set_filter(filter, &transactions.transactions);
    Html(render_table(&ui, &state.config))
}

/// HTMX: Back to the default filter; re-renders the whole panel
pub async fn htmx_filter_reset(State(state): State<AppState>) -> Html<String> {
    let mut ui = state.ui.write().await;
    let UiState { view, transactions, .. } = &mut *ui;
    view.reset_filter(&transactions.transactions);
    Html(render_panel(&ui, &state.config, false))
}

pub async fn htmx_error_clear(State(state): State<AppState>) -> String {
    state.ui.write().await.transactions.clear_error();
    String::new()
}
