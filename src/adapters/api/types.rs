//! HTTP Request/Response Types
//!
//! Request bodies for the reward endpoints and the response wrapper
//! mapping an `Outcome` to its status code (201 on success, 400 on
//! failure).

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use crate::domain::{ErrorCode, Outcome};

/// Minimum length of user names and ticker symbols.
pub const MIN_NAME_LEN: usize = 3;

/// `POST /api/v1/claim-free-share` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimRequest {
  pub user: String,
}

impl ClaimRequest {
  /// Validated user name.
  pub fn validate(&self) -> Result<&str, String> {
    validate_name("user", &self.user)
  }
}

/// `POST /api/v1/share` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareRequest {
  pub user: String,
  /// Signed so that zero and negative values reach validation.
  pub quantity: i64,
  pub ticker_symbol: String,
}

/// A share request that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidShareRequest<'a> {
  pub user: &'a str,
  pub quantity: u32,
  pub ticker_symbol: &'a str,
}

impl ShareRequest {
  pub fn validate(&self) -> Result<ValidShareRequest<'_>, String> {
    let user = validate_name("user", &self.user)?;
    let ticker_symbol = validate_name("tickerSymbol", &self.ticker_symbol)?;
    let quantity = u32::try_from(self.quantity)
      .ok()
      .filter(|q| *q >= 1)
      .ok_or_else(|| format!("quantity must be a positive integer, got {}", self.quantity))?;
    Ok(ValidShareRequest {
      user,
      quantity,
      ticker_symbol,
    })
  }
}

fn validate_name<'a>(field: &str, value: &'a str) -> Result<&'a str, String> {
  let trimmed = value.trim();
  if trimmed.chars().count() < MIN_NAME_LEN {
    return Err(format!("{field} must be at least {MIN_NAME_LEN} characters"));
  }
  Ok(trimmed)
}

/// Outcome body with its HTTP status.
#[derive(Debug)]
pub struct ApiOutcome<T>(pub Outcome<T>);

impl<T> ApiOutcome<T> {
  pub fn validation_error(reason: impl Into<String>) -> Self {
    Self(Outcome::failure(ErrorCode::ValidationError, reason))
  }
}

impl<T: Serialize> IntoResponse for ApiOutcome<T> {
  fn into_response(self) -> Response {
    let status = if self.0.is_success() {
      StatusCode::CREATED
    } else {
      StatusCode::BAD_REQUEST
    };
    (status, Json(self.0)).into_response()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_short_user_is_rejected() {
    let request = ClaimRequest {
      user: " ab ".to_string(),
    };
    assert!(request.validate().is_err());
  }

  #[test]
  fn test_share_request_validation() {
    let mut request = ShareRequest {
      user: "alice".to_string(),
      quantity: 2,
      ticker_symbol: "AAPL".to_string(),
    };
    assert_eq!(
      request.validate().unwrap(),
      ValidShareRequest {
        user: "alice",
        quantity: 2,
        ticker_symbol: "AAPL",
      }
    );

    request.quantity = 0;
    assert!(request.validate().is_err());
    request.quantity = -4;
    assert!(request.validate().is_err());
    request.quantity = 1;
    request.ticker_symbol = "AA".to_string();
    assert!(request.validate().is_err());
  }

  #[test]
  fn test_share_request_reads_camel_case() {
    let request: ShareRequest =
      serde_json::from_str(r#"{"user":"alice","quantity":3,"tickerSymbol":"MSFT"}"#).unwrap();
    assert_eq!(request.ticker_symbol, "MSFT");
    assert_eq!(request.quantity, 3);
  }
}
