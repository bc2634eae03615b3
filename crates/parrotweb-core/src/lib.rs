//! Core front-end logic for Parrot Wings
//!
//! Field validation, the form controller, the transaction view model, the
//! session token store and the UI state machines. Nothing here performs
//! network IO; the gateway crate feeds results in.

pub mod error;
pub mod form;
pub mod liveness;
pub mod models;
pub mod session;
pub mod state;
pub mod validation;
pub mod view;

pub use error::{CoreError, CoreResult, ErrorCode, ErrorSeverity};
pub use form::{
    create_transaction_form, login_form, register_form, Field, FieldKind, FieldSpec, Form, FormValues,
    InputType, SelectOption,
};
pub use liveness::{Epoch, Ticket};
pub use models::{AuthData, AuthMode, Transaction, TransactionData, User, UserOption};
pub use session::{FileTokenStore, MemoryTokenStore, Session, TokenStore, TokenStoreRef, TOKEN_KEY};
pub use state::{banner, AuthState, TransactionsState};
pub use validation::{validate, Rules, ValidationContext, Verdict};
pub use view::{Filter, Sort, SortKey, SortOrder, TransactionView, TransactionsView};
