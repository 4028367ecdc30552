//! Transaction lookup types.

use serde::Deserialize;
use utoipa::IntoParams;

/// Kind of transaction to look up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransactionType {
    #[default]
    Payment,
    Transaction,
}

impl TransactionType {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "payment" => Some(Self::Payment),
            "transaction" => Some(Self::Transaction),
            _ => None,
        }
    }

    /// Path segment of the payments backend serving this type.
    pub fn backend_path(&self) -> &'static str {
        match self {
            Self::Payment => "miniapp",
            Self::Transaction => "miniapp-actions",
        }
    }
}

/// Query parameters of `GET /api/v2/minikit/transaction/{transaction_id}`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TransactionQuery {
    /// App the transaction belongs to
    pub app_id: Option<String>,
    /// `payment` (default) or `transaction`
    #[serde(rename = "type")]
    pub kind: Option<String>,
}
