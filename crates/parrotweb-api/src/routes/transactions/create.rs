//! New transaction dialog
//!
//! Endpoints:
//! - htmx_create_dialog: Open the dialog, optionally prefilled from a debit
//! - htmx_create_field: Field edit
//! - htmx_create_close: Close the dialog
//! - htmx_transaction_store: Submit; refreshes balance and table afterwards

use super::page::render_panel;
use crate::error::ApiError;
use crate::render::{banner, render_dialog, render_form, render_form_refresh, SubmitButton};
use crate::routes::auth::end_session;
use crate::routes::dashboard::{refresh, render_balance, Refresh};
use crate::routes::{apply_edits, parse_form_body};
use crate::{AppState, UiState};
use axum::extract::{Query, State};
use axum::response::{Html, IntoResponse, Response};
use parrotweb_config::Config;
use parrotweb_core::view::repeat_prefill;
use parrotweb_core::{CoreError, TransactionData};
use parrotweb_gateway::GatewayError;
use std::collections::HashMap;

const FORM_ID: &str = "create";
const CLOSE_ACTION: &str = "/transactions/create/close";

fn submit_button(loading: bool) -> SubmitButton<'static> {
    SubmitButton {
        form_id: FORM_ID,
        label: "Send",
        action: "/transactions",
        loading,
    }
}

pub fn render_create_dialog(ui: &UiState) -> String {
    let body = if ui.transactions.create_success {
        "<p class='success'>Transaction created</p>\
         <button type='button' hx-get='/transactions/create' hx-target='#dialog'>New transaction</button>"
            .to_string()
    } else {
        format!(
            "{}{}",
            banner(ui.transactions.error.as_deref(), "/transactions/error/clear"),
            render_form(
                FORM_ID,
                &ui.create_form,
                "/transactions/create/field",
                &submit_button(ui.transactions.create_loading)
            )
        )
    };
    render_dialog("New transaction", &body, CLOSE_ACTION)
}

/// Dialog plus out-of-band balance and table updates
fn render_after_create(ui: &UiState, config: &Config) -> String {
    format!(
        "{}{}{}",
        render_create_dialog(ui),
        render_balance(ui, config, true),
        render_panel(ui, config, true)
    )
}

/// Open the dialog. `?repeat=<id>` prefills counterparty and amount from a debit.
pub async fn htmx_create_dialog(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Html<String>, ApiError> {
    let repeat = match params.get("repeat").filter(|r| !r.is_empty()) {
        Some(id) => Some(id.parse::<u64>().map_err(|_| ApiError::BadRequest {
            message: format!("Invalid transaction id: {}", id),
        })?),
        None => None,
    };

    state.dialog.advance();
    let mut ui = state.ui.write().await;
    ui.create_form.reset();
    ui.transactions.create_init();

    if let Some(id) = repeat {
        let tx = ui
            .transactions
            .find(id)
            .ok_or(CoreError::TransactionNotFound { id })?;
        match repeat_prefill(tx) {
            Some(data) => {
                ui.create_form.prefill("name", &data.name)?;
                ui.create_form.prefill("amount", &data.amount.to_string())?;
            }
            None => log::debug!("Transaction {} is not a debit, opening an empty dialog", id),
        }
    }

    Ok(Html(render_create_dialog(&ui)))
}

/// Field edit while typing
pub async fn htmx_create_field(State(state): State<AppState>, body: String) -> Html<String> {
    let params = parse_form_body(&body);
    let mut ui = state.ui.write().await;
    apply_edits(&mut ui.create_form, &params);
    let submit = submit_button(ui.transactions.create_loading);
    Html(render_form_refresh(FORM_ID, &ui.create_form, &submit))
}

pub async fn htmx_create_close(State(state): State<AppState>) -> String {
    state.dialog.advance();
    let mut ui = state.ui.write().await;
    ui.transactions.create_exited();
    ui.create_form.reset();
    String::new()
}

/// Submit the dialog
pub async fn htmx_transaction_store(State(state): State<AppState>, body: String) -> Result<Response, ApiError> {
    let params = parse_form_body(&body);

    let (data, ticket) = {
        let mut ui = state.ui.write().await;
        apply_edits(&mut ui.create_form, &params);
        let values = match ui.create_form.submit() {
            Some(values) => values,
            None => return Ok(Html(render_create_dialog(&ui)).into_response()),
        };
        let data = TransactionData::from_form(&values).ok_or_else(|| ApiError::BadRequest {
            message: "Amount is not a whole number".to_string(),
        })?;
        ui.transactions.create_start();
        (data, state.dialog.ticket())
    };

    let Some(token) = state.session.token() else {
        state.ui.write().await.transactions.create_fail("Not authorized");
        end_session(&state).await;
        return Err(ApiError::Unauthorized);
    };

    let result = state.gateway.create_transaction(&token, &data).await;

    // the server answered either way, so balance and list may have moved
    let answered = matches!(
        result,
        Ok(()) | Err(GatewayError::Api { .. }) | Err(GatewayError::Unauthorized { .. })
    );
    if answered && refresh(&state).await == Refresh::LoggedOut {
        return Ok(([("HX-Redirect", "/")], Html(String::new())).into_response());
    }

    let mut ui = state.ui.write().await;
    if !state.dialog.is_current(ticket) {
        log::debug!("Create dialog closed before the response arrived");
        return Ok(Html(render_panel(&ui, &state.config, true)).into_response());
    }

    match result {
        Ok(()) => {
            ui.transactions.create_succeed();
            ui.create_form.reset();
        }
        Err(e) => {
            log::warn!("Failed to create transaction: {}", e);
            ui.transactions.create_fail(e.display_message());
        }
    }
    Ok(Html(render_after_create(&ui, &state.config)).into_response())
}
