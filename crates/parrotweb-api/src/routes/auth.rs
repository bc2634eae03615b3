//! Authentication routes - entry screen, login/register dialogs, logout
//!
//! Endpoints:
//! - page_index: Entry screen (redirects to the dashboard when signed in)
//! - htmx_auth_dialog: Open a dialog (HTML fragment)
//! - htmx_auth_field: Field edit, answers with out-of-band error updates
//! - htmx_auth_submit: Submit credentials
//! - htmx_auth_close: Close and reset a dialog
//! - htmx_auth_error_clear: Dismiss the error banner
//! - logout: Drop the session

use crate::error::ApiError;
use crate::render::{banner, page_response, render_dialog, render_form, render_form_refresh, SubmitButton};
use crate::routes::{apply_edits, parse_form_body};
use crate::{AppState, UiState};
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::{Html, IntoResponse, Redirect, Response};
use parrotweb_core::{AuthData, AuthMode};

fn parse_mode(mode: &str) -> Result<AuthMode, ApiError> {
    mode.parse().map_err(|_| ApiError::NotFound {
        resource: format!("/auth/{}", mode),
    })
}

fn submit_button(mode: AuthMode, loading: bool) -> SubmitButton<'static> {
    match mode {
        AuthMode::Login => SubmitButton {
            form_id: "login",
            label: "Login",
            action: "/auth/login",
            loading,
        },
        AuthMode::Register => SubmitButton {
            form_id: "register",
            label: "Register",
            action: "/auth/register",
            loading,
        },
    }
}

/// Login or register dialog
pub fn render_auth_dialog(mode: AuthMode, ui: &UiState) -> String {
    let form_id = mode.to_string();
    let form = render_form(
        &form_id,
        ui.auth_form(mode),
        &format!("/auth/{}/field", mode),
        &submit_button(mode, ui.auth.loading),
    );
    let switch = match mode {
        AuthMode::Login => "<p>No account yet? <a href='#' hx-get='/auth/register' hx-target='#dialog'>Register</a></p>",
        AuthMode::Register => "<p>Already registered? <a href='#' hx-get='/auth/login' hx-target='#dialog'>Login</a></p>",
    };
    let body = format!(
        "{}{}{}",
        banner(ui.auth.error.as_deref(), &format!("/auth/{}/error/clear", mode)),
        form,
        switch
    );
    render_dialog(mode.title(), &body, &format!("/auth/{}/close", mode))
}

/// Entry screen
pub async fn page_index(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if state.session.is_authenticated() {
        return Redirect::to("/dashboard").into_response();
    }

    let content = r#"<main class='entry'>
    <h1>Parrot Wings</h1>
    <p>Send PW to anyone, instantly.</p>
    <div class='actions'>
        <button type='button' hx-get='/auth/login' hx-target='#dialog'>Login</button>
        <button type='button' hx-get='/auth/register' hx-target='#dialog'>Register</button>
    </div>
</main>"#;
    Html(page_response(&headers, "Welcome", content)).into_response()
}

/// Open a dialog with a fresh form
pub async fn htmx_auth_dialog(
    State(state): State<AppState>,
    Path(mode): Path<String>,
) -> Result<Html<String>, ApiError> {
    let mode = parse_mode(&mode)?;
    state.dialog.advance();

    let mut ui = state.ui.write().await;
    ui.auth_form_mut(mode).reset();
    ui.auth.clear_error();
    ui.auth.loading = false;
    Ok(Html(render_auth_dialog(mode, &ui)))
}

/// Field edit while typing
pub async fn htmx_auth_field(
    State(state): State<AppState>,
    Path(mode): Path<String>,
    body: String,
) -> Result<Html<String>, ApiError> {
    let mode = parse_mode(&mode)?;
    let params = parse_form_body(&body);

    let mut ui = state.ui.write().await;
    let loading = ui.auth.loading;
    let form = ui.auth_form_mut(mode);
    apply_edits(form, &params);
    Ok(Html(render_form_refresh(&mode.to_string(), form, &submit_button(mode, loading))))
}

/// Submit credentials; on success the browser is sent to the dashboard
pub async fn htmx_auth_submit(
    State(state): State<AppState>,
    Path(mode): Path<String>,
    body: String,
) -> Result<Response, ApiError> {
    let mode = parse_mode(&mode)?;
    let params = parse_form_body(&body);

    let (data, ticket) = {
        let mut ui = state.ui.write().await;
        let form = ui.auth_form_mut(mode);
        apply_edits(form, &params);
        let values = match form.submit() {
            Some(values) => values,
            None => return Ok(Html(render_auth_dialog(mode, &ui)).into_response()),
        };
        ui.auth.start();
        (AuthData::from_form(&values, mode), state.dialog.ticket())
    };

    let result = state.gateway.authenticate(&data, mode).await;

    if !state.dialog.is_current(ticket) {
        log::debug!("{} dialog closed before the response arrived", mode.title());
        return Ok(Html(String::new()).into_response());
    }

    match result {
        Ok(token) => {
            state.session.set_token(&token)?;
            let mut ui = state.ui.write().await;
            ui.auth_form_mut(mode).reset();
            ui.auth.loading = false;
            Ok(([("HX-Redirect", "/dashboard")], Html(String::new())).into_response())
        }
        Err(e) => {
            log::warn!("Authentication failed: {}", e);
            let mut ui = state.ui.write().await;
            ui.auth.fail(e.display_message());
            Ok(Html(render_auth_dialog(mode, &ui)).into_response())
        }
    }
}

/// Close a dialog; late responses for it are dropped
pub async fn htmx_auth_close(State(state): State<AppState>, Path(mode): Path<String>) -> Result<String, ApiError> {
    let mode = parse_mode(&mode)?;
    state.dialog.advance();

    let mut ui = state.ui.write().await;
    ui.auth_form_mut(mode).reset();
    ui.auth.clear_error();
    ui.auth.loading = false;
    Ok(String::new())
}

pub async fn htmx_auth_error_clear(State(state): State<AppState>, Path(mode): Path<String>) -> Result<String, ApiError> {
    parse_mode(&mode)?;
    state.ui.write().await.auth.clear_error();
    Ok(String::new())
}

/// Drop the token and every piece of per-user state
pub async fn end_session(state: &AppState) {
    if let Err(e) = state.session.logout() {
        log::error!("Failed to clear session token: {}", e);
    }
    state.dialog.advance();
    let mut ui = state.ui.write().await;
    *ui = UiState::new(&state.config);
}

pub async fn logout(State(state): State<AppState>) -> Redirect {
    end_session(&state).await;
    Redirect::to("/")
}
