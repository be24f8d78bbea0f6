//! Inventory Model

use serde::{Deserialize, Serialize};

/// Inventory item entity (库存)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct InventoryItem {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub quantity: f64,
    pub unit: String,
    pub minimum_quantity: f64,
    /// `quantity < minimum_quantity`, computed by the query
    pub low_stock: bool,
    pub updated_at: i64,
}

/// Create inventory item payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryItemCreate {
    pub name: String,
    pub description: Option<String>,
    pub quantity: f64,
    pub unit: String,
    #[serde(default)]
    pub minimum_quantity: f64,
}

/// Update inventory item payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InventoryItemUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub quantity: Option<f64>,
    pub unit: Option<String>,
    pub minimum_quantity: Option<f64>,
}

/// Ingredient that is short for one portion
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct MissingIngredient {
    pub inventory_item_id: i64,
    pub name: String,
    pub required: f64,
    pub available: f64,
    pub unit: String,
}

/// Advisory availability of a menu item (不参与下单校验)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityCheck {
    pub menu_item_id: i64,
    pub can_order: bool,
    pub missing_ingredients: Vec<MissingIngredient>,
}
