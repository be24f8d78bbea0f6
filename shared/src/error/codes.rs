//! Unified error codes
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 4xxx: Order errors
//! - 6xxx: Menu and inventory errors
//! - 7xxx: Table and feedback errors
//! - 8xxx: Staff errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility (Rust, TypeScript, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Invalid credentials (email/password)
    InvalidCredentials = 1002,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Specific role required
    RoleRequired = 2002,
    /// Admin role required
    AdminRequired = 2003,
    /// Cannot delete own account
    CannotDeleteSelf = 2004,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Order has already been settled
    OrderAlreadyPaid = 4002,
    /// Order has no line items
    OrderEmpty = 4007,
    /// Requested status is not adjacent to the current one
    OrderInvalidTransition = 4008,
    /// Order was modified concurrently
    OrderVersionConflict = 4009,
    /// Line quantity below one
    OrderInvalidQuantity = 4010,
    /// Actor role may not move an order to the requested status
    OrderStatusForbidden = 4011,

    // ==================== 6xxx: Menu & Inventory ====================
    /// Menu item not found
    MenuItemNotFound = 6001,
    /// Menu item has invalid price
    MenuItemInvalidPrice = 6002,
    /// Menu item name already exists
    MenuItemNameExists = 6003,
    /// Menu item is referenced by order lines
    MenuItemInUse = 6004,
    /// Inventory item not found
    InventoryItemNotFound = 6101,
    /// Inventory item name already exists
    InventoryNameExists = 6102,
    /// Inventory quantity is negative or non-finite
    InventoryInvalidQuantity = 6103,
    /// Ingredient requirement not found
    IngredientNotFound = 6201,
    /// Ingredient already required by the menu item
    IngredientAlreadyAdded = 6202,

    // ==================== 7xxx: Table ====================
    /// Table not found
    TableNotFound = 7001,
    /// Feedback rating outside 1..=5
    FeedbackInvalidRating = 7101,

    // ==================== 8xxx: Staff ====================
    /// User not found
    UserNotFound = 8001,
    /// Username already exists
    UsernameExists = 8002,
    /// Email already exists
    EmailExists = 8003,
    /// Role cannot be assigned through this operation
    RoleNotAssignable = 8004,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Configuration error
    ConfigError = 9005,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            // Auth
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::InvalidCredentials => "Invalid email or password",
            ErrorCode::TokenExpired => "Authentication token has expired",
            ErrorCode::TokenInvalid => "Authentication token is invalid",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::RoleRequired => "Specific role is required",
            ErrorCode::AdminRequired => "Administrator role is required",
            ErrorCode::CannotDeleteSelf => "Cannot delete your own account",

            // Order
            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::OrderAlreadyPaid => "Order has already been paid",
            ErrorCode::OrderEmpty => "Order must contain at least one item",
            ErrorCode::OrderInvalidTransition => "Order status transition is not allowed",
            ErrorCode::OrderVersionConflict => "Order was modified by another request",
            ErrorCode::OrderInvalidQuantity => "Item quantity must be at least 1",
            ErrorCode::OrderStatusForbidden => "Role may not set this order status",

            // Menu & Inventory
            ErrorCode::MenuItemNotFound => "Menu item not found",
            ErrorCode::MenuItemInvalidPrice => "Menu item price must be zero or positive",
            ErrorCode::MenuItemNameExists => "Menu item name already exists",
            ErrorCode::MenuItemInUse => "Menu item is used by existing orders",
            ErrorCode::InventoryItemNotFound => "Inventory item not found",
            ErrorCode::InventoryNameExists => "Inventory item name already exists",
            ErrorCode::InventoryInvalidQuantity => "Inventory quantity must be zero or positive",
            ErrorCode::IngredientNotFound => "Ingredient not found for menu item",
            ErrorCode::IngredientAlreadyAdded => "Ingredient already added to menu item",

            // Table
            ErrorCode::TableNotFound => "Table not found",
            ErrorCode::FeedbackInvalidRating => "Rating must be between 1 and 5",

            // Staff
            ErrorCode::UserNotFound => "User not found",
            ErrorCode::UsernameExists => "Username already exists",
            ErrorCode::EmailExists => "Email already exists",
            ErrorCode::RoleNotAssignable => "Role cannot be assigned",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::ConfigError => "Configuration error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error returned when converting an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            7 => Ok(ErrorCode::RequiredField),
            8 => Ok(ErrorCode::ValueOutOfRange),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1002 => Ok(ErrorCode::InvalidCredentials),
            1003 => Ok(ErrorCode::TokenExpired),
            1004 => Ok(ErrorCode::TokenInvalid),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),
            2002 => Ok(ErrorCode::RoleRequired),
            2003 => Ok(ErrorCode::AdminRequired),
            2004 => Ok(ErrorCode::CannotDeleteSelf),

            // Order
            4001 => Ok(ErrorCode::OrderNotFound),
            4002 => Ok(ErrorCode::OrderAlreadyPaid),
            4007 => Ok(ErrorCode::OrderEmpty),
            4008 => Ok(ErrorCode::OrderInvalidTransition),
            4009 => Ok(ErrorCode::OrderVersionConflict),
            4010 => Ok(ErrorCode::OrderInvalidQuantity),
            4011 => Ok(ErrorCode::OrderStatusForbidden),

            // Menu & Inventory
            6001 => Ok(ErrorCode::MenuItemNotFound),
            6002 => Ok(ErrorCode::MenuItemInvalidPrice),
            6003 => Ok(ErrorCode::MenuItemNameExists),
            6004 => Ok(ErrorCode::MenuItemInUse),
            6101 => Ok(ErrorCode::InventoryItemNotFound),
            6102 => Ok(ErrorCode::InventoryNameExists),
            6103 => Ok(ErrorCode::InventoryInvalidQuantity),
            6201 => Ok(ErrorCode::IngredientNotFound),
            6202 => Ok(ErrorCode::IngredientAlreadyAdded),

            // Table
            7001 => Ok(ErrorCode::TableNotFound),
            7101 => Ok(ErrorCode::FeedbackInvalidRating),

            // Staff
            8001 => Ok(ErrorCode::UserNotFound),
            8002 => Ok(ErrorCode::UsernameExists),
            8003 => Ok(ErrorCode::EmailExists),
            8004 => Ok(ErrorCode::RoleNotAssignable),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9005 => Ok(ErrorCode::ConfigError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}", self.code())
    }
}
