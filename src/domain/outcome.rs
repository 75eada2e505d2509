//! Allocation outcomes and error codes.
//!
//! Services return `Result<ShareReceipt, AllocationError>`; the HTTP
//! boundary renders either side as an `Outcome` body.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Stable error codes exposed to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ClaimedAlready,
    MarketClose,
    NoAssets,
    NoAffordableAsset,
    FailsBuyPrice,
    FailsToBuyShare,
    FailsToMoveShare,
    FailsToSaveClaim,
    FailsToSaveShare,
    DuplicateClaim,
    DatabaseError,
    AccountNotFound,
    AssetNotFound,
    ClaimNotFound,
    ValidationError,
}

impl ErrorCode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ClaimedAlready => "CLAIMED_ALREADY",
            Self::MarketClose => "MARKET_CLOSE",
            Self::NoAssets => "NO_ASSETS",
            Self::NoAffordableAsset => "NO_AFFORDABLE_ASSET",
            Self::FailsBuyPrice => "FAILS_BUY_PRICE",
            Self::FailsToBuyShare => "FAILS_TO_BUY_SHARE",
            Self::FailsToMoveShare => "FAILS_TO_MOVE_SHARE",
            Self::FailsToSaveClaim => "FAILS_TO_SAVE_CLAIM",
            Self::FailsToSaveShare => "FAILS_TO_SAVE_SHARE",
            Self::DuplicateClaim => "DUPLICATE_CLAIM",
            Self::DatabaseError => "DATABASE_ERROR",
            Self::AccountNotFound => "ACCOUNT_NOT_FOUND",
            Self::AssetNotFound => "ASSET_NOT_FOUND",
            Self::ClaimNotFound => "CLAIM_NOT_FOUND",
            Self::ValidationError => "VALIDATION_ERROR",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal failure of a claim or purchase.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AllocationError {
    #[error("The user already claimed the free prize")]
    ClaimedAlready,

    #[error("Market will reopen at {}", next_opening_time.to_rfc3339())]
    MarketClosed { next_opening_time: DateTime<Utc> },

    #[error("No available assets")]
    NoAssets,

    #[error("No asset is affordable for a reward of {target_value}")]
    NoAffordableAsset { target_value: u32 },

    #[error("Cannot buy shares for the reward")]
    RewardPurchaseFailed,

    #[error("Cannot buy shares")]
    PurchaseFailed,

    #[error("Cannot move shares")]
    MoveFailed,

    #[error("Cannot save claim")]
    ClaimNotSaved,

    #[error("Cannot save share transaction")]
    ShareNotSaved,

    #[error("A claim for this user was recorded concurrently")]
    DuplicateClaim,

    #[error("Storage failure: {0}")]
    Database(String),
}

impl AllocationError {
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::ClaimedAlready => ErrorCode::ClaimedAlready,
            Self::MarketClosed { .. } => ErrorCode::MarketClose,
            Self::NoAssets => ErrorCode::NoAssets,
            Self::NoAffordableAsset { .. } => ErrorCode::NoAffordableAsset,
            Self::RewardPurchaseFailed => ErrorCode::FailsBuyPrice,
            Self::PurchaseFailed => ErrorCode::FailsToBuyShare,
            Self::MoveFailed => ErrorCode::FailsToMoveShare,
            Self::ClaimNotSaved => ErrorCode::FailsToSaveClaim,
            Self::ShareNotSaved => ErrorCode::FailsToSaveShare,
            Self::DuplicateClaim => ErrorCode::DuplicateClaim,
            Self::Database(_) => ErrorCode::DatabaseError,
        }
    }
}

/// Successful grant or purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareReceipt {
    pub success: bool,
    pub quantity: u32,
    /// Total paid for the lot (price × quantity).
    pub share_price_paid: Decimal,
    pub ticker_symbol: String,
}

/// Response body: `{outcome: "SUCCESS", data}` or
/// `{outcome: "FAILURE", errorCode, reason}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Outcome<T> {
    Success {
        data: T,
    },
    Failure {
        #[serde(rename = "errorCode")]
        error_code: ErrorCode,
        reason: String,
    },
}

impl<T> Outcome<T> {
    pub fn failure(error_code: ErrorCode, reason: impl Into<String>) -> Self {
        Self::Failure {
            error_code,
            reason: reason.into(),
        }
    }

    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

impl<T> From<Result<T, AllocationError>> for Outcome<T> {
    fn from(result: Result<T, AllocationError>) -> Self {
        match result {
            Ok(data) => Self::Success { data },
            Err(e) => Self::failure(e.code(), e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_success_body_shape() {
        let outcome: Outcome<ShareReceipt> = Ok(ShareReceipt {
            success: true,
            quantity: 5,
            share_price_paid: dec!(5),
            ticker_symbol: "AAPL".to_string(),
        })
        .into();

        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["outcome"], "SUCCESS");
        assert_eq!(json["data"]["quantity"], 5);
        assert_eq!(json["data"]["sharePricePaid"], 5.0);
        assert_eq!(json["data"]["tickerSymbol"], "AAPL");
    }

    #[test]
    fn test_failure_body_shape() {
        let outcome: Outcome<ShareReceipt> = Err(AllocationError::ClaimedAlready).into();
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["outcome"], "FAILURE");
        assert_eq!(json["errorCode"], "CLAIMED_ALREADY");
        assert_eq!(json["reason"], "The user already claimed the free prize");
    }

    #[test]
    fn test_codes_match_serde_names() {
        for code in [ErrorCode::MarketClose, ErrorCode::FailsBuyPrice, ErrorCode::NoAffordableAsset] {
            let json = serde_json::to_value(code).unwrap();
            assert_eq!(json, code.as_str());
        }
    }
}
