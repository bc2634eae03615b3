//! HTMX front-end server for Parrot Wings
//!
//! Routes are organized into modules:
//! - routes::auth: Entry screen, login/register dialogs, logout
//! - routes::dashboard: Balance header and data refresh
//! - routes::transactions: Table, filter, pagination, create dialog
//! - routes::users: Counterparty autocomplete
//!
//! UI state for the single browser session lives in [`UiState`] behind one
//! lock. Handlers never hold the lock across a gateway call.

pub mod error;
pub mod render;
pub mod routes;

use axum::{
    routing::{get, post},
    Router,
};
use parrotweb_config::Config;
use parrotweb_core::{
    create_transaction_form, login_form, register_form, AuthMode, AuthState, Epoch, Form, Session,
    TransactionsState, TransactionsView,
};
use parrotweb_gateway::GatewayRef;
use routes::transactions::Layout;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

pub use error::ApiError;

/// Everything the pages render from
#[derive(Debug, Clone)]
pub struct UiState {
    pub auth: AuthState,
    pub transactions: TransactionsState,
    pub view: TransactionsView,
    pub login_form: Form,
    pub register_form: Form,
    pub create_form: Form,
    pub layout: Layout,
}

impl UiState {
    pub fn new(config: &Config) -> Self {
        Self {
            auth: AuthState::default(),
            transactions: TransactionsState::default(),
            view: TransactionsView::new(
                config.pagination.rows_per_page,
                config.pagination.rows_per_page_options.clone(),
            ),
            login_form: login_form(),
            register_form: register_form(),
            create_form: create_transaction_form(),
            layout: Layout::default(),
        }
    }

    pub fn auth_form(&self, mode: AuthMode) -> &Form {
        match mode {
            AuthMode::Login => &self.login_form,
            AuthMode::Register => &self.register_form,
        }
    }

    pub fn auth_form_mut(&mut self, mode: AuthMode) -> &mut Form {
        match mode {
            AuthMode::Login => &mut self.login_form,
            AuthMode::Register => &mut self.register_form,
        }
    }

    /// Apply a transaction fetch and keep the page index in range
    pub fn set_transactions(&mut self, transactions: Vec<parrotweb_core::Transaction>) {
        self.transactions.fetch_succeed(transactions);
        self.view.transactions_changed(&self.transactions.transactions);
    }
}

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub gateway: GatewayRef,
    pub session: Arc<Session>,
    pub ui: Arc<RwLock<UiState>>,
    /// Advanced whenever a dialog opens or closes
    pub dialog: Arc<Epoch>,
}

impl AppState {
    pub fn new(config: Config, gateway: GatewayRef, session: Arc<Session>) -> Self {
        let ui = UiState::new(&config);
        Self {
            config,
            gateway,
            session,
            ui: Arc::new(RwLock::new(ui)),
            dialog: Arc::new(Epoch::new()),
        }
    }
}

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    use routes::auth::{
        htmx_auth_close, htmx_auth_dialog, htmx_auth_error_clear, htmx_auth_field, htmx_auth_submit, logout,
        page_index,
    };
    use routes::dashboard::{htmx_refresh, page_dashboard};
    use routes::transactions::{
        htmx_create_close, htmx_create_dialog, htmx_create_field, htmx_error_clear, htmx_filter,
        htmx_filter_reset, htmx_transactions_list, htmx_transaction_store,
    };
    use routes::users::htmx_users_suggest;

    let static_dir = ServeDir::new(&state.config.server.static_dir);

    Router::new()
        // API endpoints
        .route("/api/health", get(health_check))
        // HTMX page routes
        .route("/", get(page_index))
        .route("/dashboard", get(page_dashboard))
        .route("/logout", get(logout))
        // Auth dialogs
        .route("/auth/:mode", get(htmx_auth_dialog).post(htmx_auth_submit))
        .route("/auth/:mode/field", post(htmx_auth_field))
        .route("/auth/:mode/close", post(htmx_auth_close))
        .route("/auth/:mode/error/clear", post(htmx_auth_error_clear))
        // Transactions
        .route("/transactions", post(htmx_transaction_store))
        .route("/transactions/list", get(htmx_transactions_list))
        .route("/transactions/filter", post(htmx_filter))
        .route("/transactions/filter/reset", post(htmx_filter_reset))
        .route("/transactions/refresh", post(htmx_refresh))
        .route("/transactions/error/clear", post(htmx_error_clear))
        .route("/transactions/create", get(htmx_create_dialog))
        .route("/transactions/create/field", post(htmx_create_field))
        .route("/transactions/create/close", post(htmx_create_close))
        .route("/users/suggest", get(htmx_users_suggest))
        .nest_service("/static", static_dir)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

/// Start the HTTP server
///
/// Binds the configured address and serves until the process is stopped.
pub async fn start_server(state: AppState) -> anyhow::Result<()> {
    let addr = state.config.listen_addr();
    let router = create_router(state);

    let listener = TcpListener::bind(&addr).await?;
    log::info!("Starting parrotweb server on http://{}", addr);
    log::info!("Available routes:");
    log::info!("  - / (Login and registration)");
    log::info!("  - /dashboard (Balance and transactions)");
    log::info!("  - /static/* (Static files)");

    axum::serve(listener, router).await?;
    log::info!("Server stopped gracefully");
    Ok(())
}
