//! Category domain model.
//!
//! # Invariants
//! - `code` is non-blank, at most 32 characters and unique across categories.
//! - `name` is non-blank and at most 128 characters.
//! - `updated_at` is stamped by the store on every create and update.

use super::validation::{check_text, ValidationError};
use super::EpochMillis;
use serde::{Deserialize, Serialize};

/// Store-assigned category identifier.
pub type CategoryId = i64;

pub const CATEGORY_CODE_MAX_CHARS: usize = 32;
pub const CATEGORY_NAME_MAX_CHARS: usize = 128;

/// Persisted category row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub code: String,
    pub name: String,
    pub updated_at: EpochMillis,
}

impl Category {
    /// Returns the caller-editable fields of this category.
    pub fn to_draft(&self) -> CategoryDraft {
        CategoryDraft {
            code: self.code.clone(),
            name: self.name.clone(),
        }
    }
}

/// Caller-supplied fields for category create and full replace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDraft {
    pub code: String,
    pub name: String,
}

impl CategoryDraft {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
        }
    }

    /// Validates field constraints before any storage access.
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_text("code", &self.code, CATEGORY_CODE_MAX_CHARS)?;
        check_text("name", &self.name, CATEGORY_NAME_MAX_CHARS)?;
        Ok(())
    }
}
