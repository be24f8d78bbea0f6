//! Caller-facing error kinds
//!
//! Every [`ErrorCode`] belongs to exactly one kind. The kind is what a client
//! branches on; the numeric code is what it logs.

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Referenced entity does not exist
    NotFound,
    /// Authenticated, but the role does not allow the operation
    Forbidden,
    /// No valid credential presented
    Unauthorized,
    /// Input rejected (bad quantity, empty order, illegal transition)
    Validation,
    /// Concurrent modification, uniqueness clash or settled order
    Conflict,
    /// Store failure; details are not exposed
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::Forbidden => "forbidden",
            Self::Unauthorized => "unauthorized",
            Self::Validation => "validation",
            Self::Conflict => "conflict",
            Self::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ErrorCode {
    /// Get the caller-facing kind for this error code
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound
            | Self::OrderNotFound
            | Self::MenuItemNotFound
            | Self::InventoryItemNotFound
            | Self::IngredientNotFound
            | Self::TableNotFound
            | Self::UserNotFound => ErrorKind::NotFound,

            Self::AlreadyExists
            | Self::OrderAlreadyPaid
            | Self::OrderVersionConflict
            | Self::MenuItemNameExists
            | Self::MenuItemInUse
            | Self::InventoryNameExists
            | Self::IngredientAlreadyAdded
            | Self::UsernameExists
            | Self::EmailExists => ErrorKind::Conflict,

            Self::NotAuthenticated
            | Self::InvalidCredentials
            | Self::TokenExpired
            | Self::TokenInvalid => ErrorKind::Unauthorized,

            Self::PermissionDenied
            | Self::RoleRequired
            | Self::AdminRequired
            | Self::CannotDeleteSelf
            | Self::OrderStatusForbidden
            | Self::RoleNotAssignable => ErrorKind::Forbidden,

            Self::Unknown | Self::InternalError | Self::DatabaseError | Self::ConfigError => {
                ErrorKind::Internal
            }

            _ => ErrorKind::Validation,
        }
    }
}
