//! Transaction routes - table, filter, pagination and the create dialog
//!
//! Structure:
//! - api.rs: Table navigation and filter endpoints
//! - page.rs: Panel, table and list rendering
//! - create.rs: New transaction dialog

pub mod api;
pub mod create;
pub mod page;

pub use api::{htmx_error_clear, htmx_filter, htmx_filter_reset, htmx_transactions_list};
pub use create::{htmx_create_close, htmx_create_dialog, htmx_create_field, htmx_transaction_store};
pub use page::{render_panel, Layout};
