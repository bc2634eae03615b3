//! Dashboard page and the refresh flow shared by several routes

use crate::render::{money, page_response};
use crate::routes::auth::end_session;
use crate::routes::transactions::render_panel;
use crate::{AppState, UiState};
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{Html, IntoResponse, Redirect, Response};
use parrotweb_config::Config;
use parrotweb_utils::escape_html;

/// Outcome of [`refresh`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refresh {
    Done,
    /// No token, or the API rejected it; the session has been cleared
    LoggedOut,
}

/// Re-fetch user info and transactions concurrently and store the results.
///
/// Results are dropped when the session changed while the calls were in
/// flight. A rejected token ends the session.
pub async fn refresh(state: &AppState) -> Refresh {
    let Some(token) = state.session.token() else {
        end_session(state).await;
        return Refresh::LoggedOut;
    };

    {
        let mut ui = state.ui.write().await;
        ui.auth.start();
        ui.transactions.fetch_start();
    }
    let ticket = state.session.ticket();

    let (user, transactions) = tokio::join!(
        state.gateway.fetch_user_info(&token),
        state.gateway.fetch_transactions(&token)
    );

    if !state.session.is_current(ticket) {
        log::debug!("Session changed during refresh, dropping results");
        let mut ui = state.ui.write().await;
        ui.auth.cancel();
        ui.transactions.fetch_cancel();
        drop(ui);
        return if state.session.is_authenticated() {
            Refresh::Done
        } else {
            Refresh::LoggedOut
        };
    }

    let mut unauthorized = false;
    {
        let mut ui = state.ui.write().await;
        match user {
            Ok(user) => ui.auth.succeed(user),
            Err(e) => {
                log::warn!("Failed to fetch user info: {}", e);
                unauthorized |= e.is_unauthorized();
                ui.auth.fail(e.display_message());
            }
        }
        match transactions {
            Ok(transactions) => ui.set_transactions(transactions),
            Err(e) => {
                log::warn!("Failed to fetch transactions: {}", e);
                unauthorized |= e.is_unauthorized();
                ui.transactions.fetch_fail(e.display_message());
            }
        }
    }

    if unauthorized {
        end_session(state).await;
        return Refresh::LoggedOut;
    }
    Refresh::Done
}

/// Name and balance of the signed-in user
pub fn render_balance(ui: &UiState, config: &Config, oob: bool) -> String {
    let oob = if oob { " hx-swap-oob='true'" } else { "" };
    match &ui.auth.user {
        Some(user) => format!(
            "<div id='balance'{}><span class='user'>{}</span> <span class='amount'>{}</span></div>",
            oob,
            escape_html(&user.name),
            money(config, user.balance)
        ),
        None if ui.auth.loading => format!("<div id='balance'{}>Loading...</div>", oob),
        None => format!("<div id='balance'{}></div>", oob),
    }
}

/// Dashboard page
pub async fn page_dashboard(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if !state.session.is_authenticated() {
        return Redirect::to("/").into_response();
    }
    if refresh(&state).await == Refresh::LoggedOut {
        return Redirect::to("/").into_response();
    }

    let ui = state.ui.read().await;
    let content = format!(
        r#"<header class='top-bar'>
    <h1>Parrot Wings</h1>
    {}
    <nav>
        <button type='button' hx-get='/transactions/create' hx-target='#dialog'>New transaction</button>
        <button type='button' hx-post='/transactions/refresh' hx-target='#transactions-panel' hx-swap='outerHTML'>Refresh</button>
        <a href='/logout'>Logout</a>
    </nav>
</header>
<main>
    {}
</main>"#,
        render_balance(&ui, &state.config, false),
        render_panel(&ui, &state.config, false)
    );
    Html(page_response(&headers, "Dashboard", &content)).into_response()
}

/// Refresh button
pub async fn htmx_refresh(State(state): State<AppState>) -> Response {
    if refresh(&state).await == Refresh::LoggedOut {
        return ([("HX-Redirect", "/")], Html(String::new())).into_response();
    }
    let ui = state.ui.read().await;
    let html = format!(
        "{}{}",
        render_panel(&ui, &state.config, false),
        render_balance(&ui, &state.config, true)
    );
    Html(html).into_response()
}
