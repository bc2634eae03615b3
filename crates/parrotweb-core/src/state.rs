//! UI state machines for authentication and transactions
//!
//! Each transition is a method; handlers apply the `*_start` transition
//! before issuing the remote call and the outcome transition afterwards.

use crate::models::{Transaction, User};

/// Message the server sends when a stale token is rejected on refresh
const SESSION_EXPIRED: &str = "session expired";

/// Banner text for an error, or `None` when nothing should be shown
pub fn banner(message: Option<&str>) -> Option<String> {
    let message = message?.trim();
    if message.is_empty() || message.to_lowercase().contains(SESSION_EXPIRED) {
        return None;
    }
    Some(message.to_string())
}

// ==================== Auth ====================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthState {
    pub user: Option<User>,
    pub loading: bool,
    pub error: Option<String>,
}

impl AuthState {
    pub fn start(&mut self) {
        self.loading = true;
        self.error = None;
    }

    pub fn succeed(&mut self, user: User) {
        self.user = Some(user);
        self.loading = false;
        self.error = None;
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.loading = false;
        self.error = Some(message.into());
    }

    /// The request was abandoned; keep whatever was shown before
    pub fn cancel(&mut self) {
        self.loading = false;
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub fn logout(&mut self) {
        *self = Self::default();
    }
}

// ==================== Transactions ====================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionsState {
    pub transactions: Vec<Transaction>,
    pub loading: bool,
    pub error: Option<String>,
    pub create_loading: bool,
    pub create_success: bool,
}

impl TransactionsState {
    pub fn fetch_start(&mut self) {
        self.loading = true;
    }

    /// Replace the collection wholesale
    pub fn fetch_succeed(&mut self, transactions: Vec<Transaction>) {
        self.transactions = transactions;
        self.loading = false;
    }

    pub fn fetch_fail(&mut self, message: impl Into<String>) {
        self.loading = false;
        self.error = Some(message.into());
    }

    pub fn fetch_cancel(&mut self) {
        self.loading = false;
    }

    /// Dialog opened
    pub fn create_init(&mut self) {
        self.create_success = false;
        self.create_loading = false;
        self.error = None;
    }

    pub fn create_start(&mut self) {
        self.create_loading = true;
        self.error = None;
    }

    pub fn create_succeed(&mut self) {
        self.create_loading = false;
        self.create_success = true;
    }

    pub fn create_fail(&mut self, message: impl Into<String>) {
        self.create_loading = false;
        self.create_success = false;
        self.error = Some(message.into());
    }

    /// Dialog closed
    pub fn create_exited(&mut self) {
        self.create_success = false;
        self.create_loading = false;
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub fn find(&self, id: u64) -> Option<&Transaction> {
        self.transactions.iter().find(|t| t.id == id)
    }

    pub fn logout(&mut self) {
        *self = Self::default();
    }
}
