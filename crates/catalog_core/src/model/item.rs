//! Item domain model and its category-resolved read model.
//!
//! # Responsibility
//! - Define the persisted item row and the caller-supplied draft.
//! - Define `ItemRecord`, the shape returned by every item read.
//! - Convert prices between `Decimal` and stored integer cents.
//!
//! # Invariants
//! - `sku` is non-blank, at most 64 characters and unique across items.
//! - `price` is non-negative with at most 8 integer and 2 fraction digits.
//! - `stock` is non-negative.
//! - `category_id` references an existing category.
//! - `ItemRecord::category_code`/`category_name` are always resolved.

use super::category::{Category, CategoryId};
use super::validation::{check_price, check_stock, check_text, ValidationError};
use super::EpochMillis;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Store-assigned item identifier.
pub type ItemId = i64;

pub const ITEM_SKU_MAX_CHARS: usize = 64;
pub const ITEM_NAME_MAX_CHARS: usize = 128;

/// Persisted item row, without category fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: ItemId,
    pub sku: String,
    pub name: String,
    pub price: Decimal,
    pub stock: i32,
    pub category_id: CategoryId,
    pub updated_at: EpochMillis,
}

/// Caller-supplied fields for item create and full replace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemDraft {
    pub sku: String,
    pub name: String,
    pub price: Decimal,
    pub stock: i32,
    pub category_id: CategoryId,
}

impl ItemDraft {
    pub fn new(
        sku: impl Into<String>,
        name: impl Into<String>,
        price: Decimal,
        stock: i32,
        category_id: CategoryId,
    ) -> Self {
        Self {
            sku: sku.into(),
            name: name.into(),
            price,
            stock,
            category_id,
        }
    }

    /// Validates field constraints before any storage access.
    ///
    /// Category existence is a storage concern and is not checked here.
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_text("sku", &self.sku, ITEM_SKU_MAX_CHARS)?;
        check_text("name", &self.name, ITEM_NAME_MAX_CHARS)?;
        check_price(self.price)?;
        check_stock(self.stock)?;
        Ok(())
    }
}

/// Item read model with its owning category denormalized.
///
/// Both fetch strategies must produce identical values of this type for the
/// same stored rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRecord {
    pub id: ItemId,
    pub sku: String,
    pub name: String,
    pub price: Decimal,
    pub stock: i32,
    pub category_id: CategoryId,
    pub category_code: String,
    pub category_name: String,
    pub updated_at: EpochMillis,
}

impl ItemRecord {
    /// Joins an item row with its owning category.
    pub fn from_parts(item: Item, category: &Category) -> Self {
        Self {
            id: item.id,
            sku: item.sku,
            name: item.name,
            price: item.price,
            stock: item.stock,
            category_id: item.category_id,
            category_code: category.code.clone(),
            category_name: category.name.clone(),
            updated_at: item.updated_at,
        }
    }

    /// Returns the caller-editable fields of this item.
    pub fn to_draft(&self) -> ItemDraft {
        ItemDraft {
            sku: self.sku.clone(),
            name: self.name.clone(),
            price: self.price,
            stock: self.stock,
            category_id: self.category_id,
        }
    }
}

/// Converts a validated price to integer cents.
///
/// Returns `None` when the value has more than two significant fraction
/// digits or does not fit `i64`.
pub fn price_to_cents(price: Decimal) -> Option<i64> {
    let cents = price.checked_mul(Decimal::ONE_HUNDRED)?;
    if cents.fract() != Decimal::ZERO {
        return None;
    }
    cents.to_i64()
}

/// Converts stored integer cents to a price with scale 2.
pub fn price_from_cents(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}
