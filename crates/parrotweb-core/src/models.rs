//! Data models exchanged with the Parrot Wings API

use crate::form::FormValues;
use serde::{Deserialize, Deserializer, Serialize};

/// One ledger entry as returned by the transaction list endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: u64,
    /// Timestamp as sent by the server (ISO 8601)
    pub date: String,
    /// Counterparty name
    pub username: String,
    /// Positive for credit, negative for debit
    pub amount: i64,
    /// Account balance right after this transaction
    pub balance: i64,
}

impl Transaction {
    pub fn is_credit(&self) -> bool {
        self.amount > 0
    }

    pub fn is_debit(&self) -> bool {
        self.amount < 0
    }
}

/// The signed-in user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub balance: i64,
}

/// Autocomplete entry from the user search endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserOption {
    pub id: u64,
    pub name: String,
}

/// Payload of the create transaction call, also used for repeat prefill
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionData {
    pub name: String,
    pub amount: i64,
}

impl TransactionData {
    /// Build from a submitted create-transaction form
    pub fn from_form(values: &FormValues) -> Option<Self> {
        let amount = values.get("amount").trim().parse().ok()?;
        Some(Self {
            name: values.get("name").to_string(),
            amount,
        })
    }
}

/// Which authentication dialog is in use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    Login,
    Register,
}

impl AuthMode {
    pub fn is_sign_up(&self) -> bool {
        matches!(self, AuthMode::Register)
    }

    pub fn title(&self) -> &'static str {
        match self {
            AuthMode::Login => "LOGIN",
            AuthMode::Register => "REGISTER",
        }
    }
}

impl std::str::FromStr for AuthMode {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "login" => Ok(AuthMode::Login),
            "register" => Ok(AuthMode::Register),
            _ => Err(format!("Invalid auth mode: {}", s)),
        }
    }
}

impl std::fmt::Display for AuthMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthMode::Login => write!(f, "login"),
            AuthMode::Register => write!(f, "register"),
        }
    }
}

/// Credentials sent to the login or registration endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthData {
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

impl AuthData {
    /// Build from a submitted login or register form
    pub fn from_form(values: &FormValues, mode: AuthMode) -> Self {
        Self {
            email: values.get("email").to_string(),
            password: values.get("password").to_string(),
            username: match mode {
                AuthMode::Register => Some(values.get("name").to_string()),
                AuthMode::Login => None,
            },
        }
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(i64),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(s) => s,
        Id::Number(n) => n.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::{login_form, register_form};

    #[test]
    fn test_transaction_wire_format() {
        let json = r#"{"id":7,"date":"2020-05-01T10:00:00.000Z","username":"bob","amount":-50,"balance":450}"#;
        let tx: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(tx.id, 7);
        assert!(tx.is_debit());
        assert!(!tx.is_credit());
        assert_eq!(tx.balance, 450);
    }

    #[test]
    fn test_user_id_accepts_number_or_string() {
        let user: User = serde_json::from_str(r#"{"id":3,"name":"alice","email":"a@b.com","balance":500}"#).unwrap();
        assert_eq!(user.id, "3");
        let user: User = serde_json::from_str(r#"{"id":"u-3","balance":0}"#).unwrap();
        assert_eq!(user.id, "u-3");
        assert_eq!(user.name, "");
    }

    #[test]
    fn test_login_payload_omits_username() {
        let mut form = login_form();
        form.set_value("email", "a@b.com").unwrap();
        form.set_value("password", "secret1").unwrap();
        let data = AuthData::from_form(&form.submit().unwrap(), AuthMode::Login);
        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(json, serde_json::json!({"email": "a@b.com", "password": "secret1"}));
    }

    #[test]
    fn test_register_payload_carries_username() {
        let mut form = register_form();
        form.set_value("email", "a@b.com").unwrap();
        form.set_value("name", "alice").unwrap();
        form.set_value("password", "secret1").unwrap();
        form.set_value("repeat_password", "secret1").unwrap();
        let data = AuthData::from_form(&form.submit().unwrap(), AuthMode::Register);
        assert_eq!(data.username.as_deref(), Some("alice"));
    }

    #[test]
    fn test_auth_mode_parse() {
        assert_eq!("Register".parse::<AuthMode>().unwrap(), AuthMode::Register);
        assert!("signup".parse::<AuthMode>().is_err());
        assert!(AuthMode::Register.is_sign_up());
    }
}
