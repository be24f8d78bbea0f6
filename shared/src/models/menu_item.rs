//! Menu Item Model

use serde::{Deserialize, Serialize};

/// Menu item entity (菜品)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct MenuItem {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    /// Current unit price; order lines keep their own snapshot
    pub price: f64,
    pub category: String,
    pub image_url: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create menu item payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuItemCreate {
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub category: String,
    pub image_url: Option<String>,
}

/// Update menu item payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MenuItemUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub category: Option<String>,
    pub image_url: Option<String>,
}

/// Ingredient requirement of a menu item, joined with the inventory item
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Ingredient {
    pub menu_item_id: i64,
    pub inventory_item_id: i64,
    pub inventory_name: String,
    pub quantity_required: f64,
    pub unit: String,
}

/// Add ingredient payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngredientCreate {
    pub inventory_item_id: i64,
    pub quantity_required: f64,
    /// Defaults to the inventory item's unit
    pub unit: Option<String>,
}

/// Update ingredient payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngredientUpdate {
    pub quantity_required: Option<f64>,
    pub unit: Option<String>,
}
