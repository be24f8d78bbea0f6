//! Order status state machine
//!
//! ```text
//! pending ──▶ preparing ──▶ ready ──▶ served ──▶ paid
//!            └──── kitchen_staff ────┘  └─ waiter ─┘
//! ```
//!
//! Only single forward steps are legal. `admin` may perform any step. A request
//! for the status an order already has is accepted without a write. `paid` is
//! terminal; settling a table skips this table entirely.

use shared::error::{AppError, ErrorCode};
use shared::models::{OrderStatus, Role};

pub const KITCHEN_ROLES: &[Role] = &[Role::KitchenStaff, Role::Admin];
pub const FLOOR_ROLES: &[Role] = &[Role::Waiter, Role::Admin];
pub const ALL_ROLES: &[Role] = &[Role::Admin, Role::Waiter, Role::KitchenStaff];

/// Roles allowed to move an order into `target`
pub fn allowed_roles(target: OrderStatus) -> &'static [Role] {
    match target {
        OrderStatus::Preparing | OrderStatus::Ready => KITCHEN_ROLES,
        OrderStatus::Served | OrderStatus::Paid => FLOOR_ROLES,
        // 无人能回到 pending，交给相邻性检查拒绝
        OrderStatus::Pending => ALL_ROLES,
    }
}

/// Outcome of a permitted request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Persist `target` and notify viewers
    Apply,
    /// Order is already in `target`
    Unchanged,
}

/// Decide whether `role` may move an order from `current` to `target`
///
/// Checks run in order: role guard (`OrderStatusForbidden`), terminal state
/// (`OrderAlreadyPaid`), then adjacency (`OrderInvalidTransition`).
pub fn check_transition(
    current: OrderStatus,
    target: OrderStatus,
    role: Role,
) -> Result<Transition, AppError> {
    let allowed = allowed_roles(target);
    if !allowed.contains(&role) {
        let allowed: Vec<&str> = allowed.iter().map(Role::as_str).collect();
        return Err(AppError::with_message(
            ErrorCode::OrderStatusForbidden,
            format!("Role {role} cannot move an order to {target}"),
        )
        .with_detail("role", role.as_str())
        .with_detail("to", target.as_str())
        .with_detail("allowed_roles", allowed));
    }

    if current.is_settled() {
        return Err(AppError::new(ErrorCode::OrderAlreadyPaid).with_detail("status", current.as_str()));
    }

    if current == target {
        return Ok(Transition::Unchanged);
    }

    if current.next() != Some(target) {
        return Err(AppError::with_message(
            ErrorCode::OrderInvalidTransition,
            format!("Cannot move an order from {current} to {target}"),
        )
        .with_detail("from", current.as_str())
        .with_detail("to", target.as_str()));
    }

    Ok(Transition::Apply)
}
