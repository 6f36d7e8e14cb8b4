// Catalog
// Copyright 2023 Julio Merino
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not
// use this file except in compliance with the License.  You may obtain a copy
// of the License at:
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.  See the
// License for the specific language governing permissions and limitations
// under the License.

//! High-level data types.

use catalog_core::model::{ModelError, ModelResult};
use derive_getters::Getters;
use derive_more::Constructor;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Number of products returned by a listing when the caller does not specify a limit.
pub(crate) const DEFAULT_PAGE_LIMIT: i64 = 10;

/// Identifier of a product.  Identifiers are assigned by the database on creation and are never
/// reused, even after the product they identified is deleted.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub(crate) struct ProductId(i64);

impl ProductId {
    /// Creates a product identifier from its raw database representation.
    pub(crate) fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the identifier as an `i64`.
    pub(crate) fn as_i64(self) -> i64 {
        self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The price of a product, which is always a finite and non-negative number.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub(crate) struct Price(f64);

impl Price {
    /// Creates a new price from an untrusted `value`, making sure it is valid.
    pub(crate) fn new(value: f64) -> ModelResult<Self> {
        if !value.is_finite() {
            return Err(ModelError(format!("Price must be a finite number but got {}", value)));
        }
        if value < 0.0 {
            return Err(ModelError(format!("Price cannot be negative but got {}", value)));
        }
        Ok(Self(value))
    }

    /// Returns the price as an `f64`.
    pub(crate) fn as_f64(self) -> f64 {
        self.0
    }
}

/// A deserialization visitor for a `Price`.
///
/// Accepts JSON numbers as well as strings that contain a number.
struct PriceVisitor;

impl Visitor<'_> for PriceVisitor {
    type Value = Price;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a number or a numeric string")
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        Price::new(v).map_err(|e| E::custom(e.to_string()))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        self.visit_f64(v as f64)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        self.visit_f64(v as f64)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        match v.trim().parse::<f64>() {
            Ok(v) => self.visit_f64(v),
            Err(_) => Err(E::custom(format!("Price must be a number but got '{}'", v))),
        }
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(PriceVisitor)
    }
}

/// The number of units of a product in stock, which is never negative.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub(crate) struct Quantity(i64);

impl Quantity {
    /// Creates a new quantity from an untrusted `value`, making sure it is valid.
    pub(crate) fn new(value: i64) -> ModelResult<Self> {
        if value < 0 {
            return Err(ModelError(format!("Quantity cannot be negative but got {}", value)));
        }
        Ok(Self(value))
    }

    /// Returns the quantity as an `i64`.
    pub(crate) fn as_i64(self) -> i64 {
        self.0
    }
}

/// A deserialization visitor for a `Quantity`.
///
/// Accepts JSON integers, numbers without a fractional part, and strings that contain an integer.
struct QuantityVisitor;

impl Visitor<'_> for QuantityVisitor {
    type Value = Quantity;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("an integer or an integer string")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Quantity::new(v).map_err(|e| E::custom(e.to_string()))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        match i64::try_from(v) {
            Ok(v) => self.visit_i64(v),
            Err(_) => Err(E::custom(format!("Quantity is too large: {}", v))),
        }
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        // The bounds are exclusive because i64::MAX is not representable as an f64.
        if v.fract() != 0.0 || v <= i64::MIN as f64 || v >= i64::MAX as f64 {
            return Err(E::custom(format!("Quantity must be an integer but got {}", v)));
        }
        self.visit_i64(v as i64)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        match v.trim().parse::<i64>() {
            Ok(v) => self.visit_i64(v),
            Err(_) => Err(E::custom(format!("Quantity must be an integer but got '{}'", v))),
        }
    }
}

impl<'de> Deserialize<'de> for Quantity {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(QuantityVisitor)
    }
}

/// The user-editable contents of a product.
///
/// This is what clients send to create or replace a product.  Updates always carry all fields.
#[derive(Clone, Constructor, Debug, Deserialize, Getters, PartialEq, Serialize)]
pub(crate) struct ProductFields {
    /// Human-readable name of the product.  Need not be unique.
    name: String,

    /// Free-form description of the product.
    description: String,

    /// Unit price of the product.
    price: Price,

    /// Units in stock.
    quantity: Quantity,
}

/// A product as stored in the database.
#[derive(Clone, Debug, Getters, PartialEq, Serialize)]
#[cfg_attr(test, derive(Deserialize))]
pub(crate) struct Product {
    /// Identifier assigned by the database.
    id: ProductId,

    /// Human-readable name of the product.
    name: String,

    /// Free-form description of the product.
    description: String,

    /// Unit price of the product.
    price: Price,

    /// Units in stock.
    quantity: Quantity,
}

impl Product {
    /// Assembles a product from its identifier and its contents.
    pub(crate) fn new(id: ProductId, fields: ProductFields) -> Self {
        let ProductFields { name, description, price, quantity } = fields;
        Self { id, name, description, price, quantity }
    }

    /// Returns the contents of the product, without the identifier.
    #[cfg(test)]
    pub(crate) fn fields(&self) -> ProductFields {
        ProductFields::new(self.name.clone(), self.description.clone(), self.price, self.quantity)
    }
}

/// A range of products to return from a listing, expressed as the number of products to skip
/// and the maximum number of products to return after those.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct PageWindow {
    /// Number of products to skip, in insertion order.
    skip: i64,

    /// Maximum number of products to return.
    limit: i64,
}

impl Default for PageWindow {
    fn default() -> Self {
        Self { skip: 0, limit: DEFAULT_PAGE_LIMIT }
    }
}

impl PageWindow {
    /// Creates a new window from untrusted `skip` and `limit` values, making sure they are valid.
    pub(crate) fn new(skip: i64, limit: i64) -> ModelResult<Self> {
        if skip < 0 {
            return Err(ModelError(format!("skip cannot be negative but got {}", skip)));
        }
        if limit < 0 {
            return Err(ModelError(format!("limit cannot be negative but got {}", limit)));
        }
        Ok(Self { skip, limit })
    }

    /// Returns the number of products to skip.
    pub(crate) fn skip(&self) -> i64 {
        self.skip
    }

    /// Returns the maximum number of products to return.
    pub(crate) fn limit(&self) -> i64 {
        self.limit
    }
}
