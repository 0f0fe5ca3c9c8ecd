//! Cart Storage
//!
//! Carts persist per owner as JSON documents in a string key/value store, keyed by
//! the signed-in user's id or by a shared guest key.

use std::fmt;

use rustc_hash::FxHashMap;
use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::cart::{Cart, CartError, CartLine};

/// Errors raised by cart storage.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The cart could not be encoded for storage.
    #[error("failed to encode cart for {key}: {source}")]
    Encode {
        /// Storage key
        key: String,
        /// Underlying JSON error
        source: serde_json::Error,
    },

    /// A stored line could not be turned back into a cart line.
    #[error(transparent)]
    Cart(#[from] CartError),
}

/// Who a stored cart belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CartOwner {
    /// A signed-in customer.
    User(String),

    /// Anyone not signed in.
    Guest,
}

impl CartOwner {
    /// Resolve the owner from an optional user id.
    pub fn from_user_id(user_id: Option<&str>) -> Self {
        match user_id {
            Some(id) if !id.trim().is_empty() => CartOwner::User(id.to_string()),
            _ => CartOwner::Guest,
        }
    }

    /// Storage key for this owner's cart.
    pub fn storage_key(&self) -> String {
        match self {
            CartOwner::User(id) => format!("cart_{id}"),
            CartOwner::Guest => "cart_guest".to_string(),
        }
    }
}

impl fmt::Display for CartOwner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CartOwner::User(id) => write!(f, "user {id}"),
            CartOwner::Guest => write!(f, "guest"),
        }
    }
}

/// A cart line as persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCartLine {
    /// Product identifier
    pub product_id: String,

    /// Display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Unit price in minor units
    pub unit_price_minor: i64,

    /// Quantity
    pub quantity: u32,
}

impl From<&CartLine<'_>> for StoredCartLine {
    fn from(line: &CartLine<'_>) -> Self {
        Self {
            product_id: line.product_id().to_string(),
            name: line.name.clone(),
            unit_price_minor: line.unit_price().to_minor_units(),
            quantity: line.quantity(),
        }
    }
}

impl Cart<'_> {
    /// Lines in their persisted form.
    pub fn to_stored(&self) -> Vec<StoredCartLine> {
        self.iter().map(StoredCartLine::from).collect()
    }
}

/// Rebuild a cart from persisted lines.
///
/// # Errors
///
/// Returns a [`CartError`] if a stored line breaks a cart invariant.
pub fn cart_from_stored(
    lines: &[StoredCartLine],
    currency: &'static Currency,
) -> Result<Cart<'static>, CartError> {
    let lines = lines
        .iter()
        .map(|stored| {
            let line = CartLine::new(
                stored.product_id.clone(),
                Money::from_minor(stored.unit_price_minor, currency),
                stored.quantity,
            )?;

            Ok(match &stored.name {
                Some(name) => line.with_name(name.clone()),
                None => line,
            })
        })
        .collect::<Result<Vec<_>, CartError>>()?;

    Cart::with_lines(lines, currency)
}

/// Persistent cart storage keyed by owner.
pub trait CartStore {
    /// Load the owner's cart lines. A missing cart loads as empty.
    ///
    /// # Errors
    ///
    /// Implementations may fail when the backing storage is unavailable.
    fn load(&self, owner: &CartOwner) -> Result<Vec<StoredCartLine>, StoreError>;

    /// Replace the owner's cart lines.
    ///
    /// # Errors
    ///
    /// Returns an error if the lines cannot be encoded or written.
    fn save(&mut self, owner: &CartOwner, lines: &[StoredCartLine]) -> Result<(), StoreError>;

    /// Forget the owner's cart.
    fn clear(&mut self, owner: &CartOwner);
}

/// In-memory string key/value cart storage.
#[derive(Debug, Default)]
pub struct MemoryCartStore {
    documents: FxHashMap<String, String>,
}

impl MemoryCartStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw document stored under `key`, if any.
    pub fn raw(&self, key: &str) -> Option<&str> {
        self.documents.get(key).map(String::as_str)
    }

    /// Store a raw document under `key`, bypassing encoding.
    pub fn put_raw(&mut self, key: impl Into<String>, document: impl Into<String>) {
        self.documents.insert(key.into(), document.into());
    }
}

impl CartStore for MemoryCartStore {
    fn load(&self, owner: &CartOwner) -> Result<Vec<StoredCartLine>, StoreError> {
        let key = owner.storage_key();

        let Some(document) = self.documents.get(&key) else {
            return Ok(Vec::new());
        };

        match serde_json::from_str(document) {
            Ok(lines) => Ok(lines),
            Err(err) => {
                warn!(%owner, %key, error = %err, "discarding unreadable stored cart");

                Ok(Vec::new())
            }
        }
    }

    fn save(&mut self, owner: &CartOwner, lines: &[StoredCartLine]) -> Result<(), StoreError> {
        let key = owner.storage_key();

        let document = serde_json::to_string(lines).map_err(|source| StoreError::Encode {
            key: key.clone(),
            source,
        })?;

        self.documents.insert(key, document);

        Ok(())
    }

    fn clear(&mut self, owner: &CartOwner) {
        self.documents.remove(&owner.storage_key());
    }
}
