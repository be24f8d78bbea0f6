//! 订单引擎
//!
//! - [`state_machine`] - 状态流转规则与角色守卫
//! - [`OrderEngine`] - 下单、查询、状态流转、结账

pub mod engine;
pub mod state_machine;

pub use engine::OrderEngine;
pub use state_machine::{
    ALL_ROLES, FLOOR_ROLES, KITCHEN_ROLES, Transition, allowed_roles, check_transition,
};
