//! Product entity and its mutation input

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

/// A catalog product as stored by the record store
///
/// The `id` is assigned by the store on insert and never changes afterwards.
/// Caches and queue messages only ever hold copies of this value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Store-assigned identifier
    pub id: i64,
    /// Display name, never empty
    pub name: String,
    /// Unit price, always positive
    pub price: f64,
}

impl Product {
    /// Build a product from a store row and the draft it was written from
    pub fn from_draft(id: i64, draft: &ProductDraft) -> Self {
        Self {
            id,
            name: draft.name.clone(),
            price: draft.price,
        }
    }
}

/// Validated `{name, price}` payload for create and update requests
///
/// Construct through [`ProductDraft::new`]; a draft that exists has already
/// passed business validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ProductDraft {
    /// Product name (trimmed)
    #[validate(length(min = 1, message = "product name is required"))]
    pub name: String,
    /// Product price
    #[validate(range(exclusive_min = 0.0, message = "price must be a positive number"))]
    pub price: f64,
}

impl ProductDraft {
    /// Validate a raw `{name, price}` request
    ///
    /// Rejects empty or whitespace-only names and prices that are not
    /// strictly positive finite numbers.
    pub fn new<S: Into<String>>(name: S, price: f64) -> Result<Self> {
        let draft = Self {
            name: name.into().trim().to_string(),
            price,
        };

        if !draft.price.is_finite() {
            return Err(Error::validation("price must be a positive number"));
        }

        draft.validate().map_err(validation_error)?;
        Ok(draft)
    }
}

/// Flatten validator output into a single domain error
fn validation_error(errors: ValidationErrors) -> Error {
    let mut messages: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| match &e.message {
                Some(message) => message.to_string(),
                None => format!("{field} is invalid"),
            })
        })
        .collect();
    messages.sort();
    Error::validation(messages.join("; "))
}
