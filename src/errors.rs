use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use uuid::Uuid;

/// Failures while re-deriving an on-chain fact from a transaction hash.
/// `ReceiptNotFound` and `RpcUnavailable` are retryable; the rest mean the
/// transaction did not do what the caller claims.
#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    #[error("receipt not found for transaction {0}")]
    ReceiptNotFound(String),

    #[error("transaction {0} reverted on-chain")]
    Reverted(String),

    #[error("transaction targeted {actual}, expected contract {expected}")]
    WrongTarget { expected: String, actual: String },

    #[error("no {0} event found in transaction logs")]
    EventNotFound(&'static str),

    #[error("RPC unavailable: {0}")]
    RpcUnavailable(String),
}

impl VerifyError {
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            VerifyError::ReceiptNotFound(_) | VerifyError::RpcUnavailable(_)
        )
    }
}

/// Failures while projecting a verified fact into the relational mirror.
/// Duplicate transactions are deliberately NOT here — the mirror writer
/// converts them into idempotent successes.
#[derive(Debug, thiserror::Error)]
pub enum MirrorError {
    #[error("unknown user: no account for wallet {0}")]
    UnknownUser(String),

    #[error("unknown market: {0}")]
    UnknownMarket(String),

    #[error("outcome index {index} out of range for market {market_id}")]
    OutcomeOutOfRange { market_id: i64, index: i32 },

    #[error("market {0} is not resolved")]
    NotResolved(i64),

    #[error("no winning bet on market {market_id} for user {user_id}")]
    NoWinningBet { market_id: i64, user_id: Uuid },

    #[error("payout already claimed for market {market_id} by user {user_id}")]
    AlreadyClaimed { market_id: i64, user_id: Uuid },

    #[error(transparent)]
    Db(#[from] anyhow::Error),
}

impl From<sqlx::Error> for MirrorError {
    fn from(e: sqlx::Error) -> Self {
        MirrorError::Db(e.into())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error(transparent)]
    Verify(#[from] VerifyError),

    #[error(transparent)]
    Mirror(#[from] MirrorError),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
    retryable: bool,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, retryable) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone(), false),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone(), false),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".into(), false),

            AppError::Verify(e) if e.is_retryable() => {
                (StatusCode::SERVICE_UNAVAILABLE, format!("{e} — try again shortly"), true)
            }
            AppError::Verify(e) => (StatusCode::UNPROCESSABLE_ENTITY, e.to_string(), false),

            AppError::Mirror(e) => match e {
                MirrorError::UnknownUser(_) | MirrorError::UnknownMarket(_) => {
                    (StatusCode::NOT_FOUND, e.to_string(), false)
                }
                MirrorError::OutcomeOutOfRange { .. } => {
                    (StatusCode::UNPROCESSABLE_ENTITY, e.to_string(), false)
                }
                MirrorError::NotResolved(_)
                | MirrorError::NoWinningBet { .. }
                | MirrorError::AlreadyClaimed { .. } => {
                    (StatusCode::CONFLICT, e.to_string(), false)
                }
                MirrorError::Db(e) => {
                    tracing::error!("Mirror storage error: {e:?}");
                    (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".into(), false)
                }
            },

            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".into(), false)
            }
        };

        (
            status,
            Json(ErrorBody {
                success: false,
                error: message,
                retryable,
            }),
        )
            .into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        AppError::Internal(e.into())
    }
}
