use serde::{Deserialize, Serialize};
use serde_json::Value;

use stockcurve_core::{DomainError, DomainResult, ProductId, parse_money, parse_stock};

/// ABC curve label.
///
/// Ordered from most to least important: `A < B < C`, so a "worse" bucket
/// compares greater.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Curve {
    A,
    B,
    C,
}

impl Curve {
    /// Every label, in report order.
    pub const ALL: [Curve; 3] = [Curve::A, Curve::B, Curve::C];

    pub fn as_str(&self) -> &'static str {
        match self {
            Curve::A => "A",
            Curve::B => "B",
            Curve::C => "C",
        }
    }
}

impl core::fmt::Display for Curve {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for Curve {
    type Err = DomainError;

    /// Case-insensitive; surrounding whitespace is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "A" => Ok(Curve::A),
            "B" => Ok(Curve::B),
            "C" => Ok(Curve::C),
            other => Err(DomainError::validation(format!(
                "unknown curve '{other}': use A, B or C"
            ))),
        }
    }
}

/// A catalog product as seen by the analytics.
///
/// Numeric fields are already sanitized: prices are finite and non-negative,
/// stock is non-negative. `curve` is `None` until the first classification
/// pass labels the product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub sku: String,
    pub name: String,
    pub cost_price: f64,
    pub sale_price: f64,
    pub stock: i64,
    pub curve: Option<Curve>,
}

impl Product {
    /// Materialize an ingested row under a store-assigned identifier.
    pub fn from_new(id: ProductId, new: NewProduct) -> Self {
        Self {
            id,
            sku: new.sku,
            name: new.name,
            cost_price: new.cost_price,
            sale_price: new.sale_price,
            stock: new.stock,
            curve: None,
        }
    }

    /// Ranking metric for ABC classification.
    ///
    /// `sale_price × stock`, or `sale_price` alone when nothing is in stock so
    /// priced-but-empty items still rank.
    pub fn importance(&self) -> f64 {
        if self.stock > 0 {
            self.sale_price * self.stock as f64
        } else {
            self.sale_price
        }
    }

    /// `(sale − cost) / sale × 100`, or `0` when the sale price is zero.
    pub fn margin_percent(&self) -> f64 {
        if self.sale_price == 0.0 {
            return 0.0;
        }
        (self.sale_price - self.cost_price) / self.sale_price * 100.0
    }

    /// Profit on the units currently in stock.
    pub fn profit(&self) -> f64 {
        (self.sale_price - self.cost_price) * self.stock as f64
    }

    /// Zero sale or cost price means "no pricing data", not "zero profit".
    pub fn has_valid_pricing(&self) -> bool {
        self.sale_price != 0.0 && self.cost_price != 0.0
    }
}

/// Result of a classification pass for one product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurveUpdate {
    pub product_id: ProductId,
    pub curve: Curve,
}

/// Catalog row as delivered by ingestion: numeric fields may be anything.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawProductRow {
    pub sku: String,
    pub name: String,
    #[serde(default)]
    pub cost_price: Value,
    #[serde(default)]
    pub sale_price: Value,
    #[serde(default)]
    pub stock: Value,
}

/// A validated, sanitized product that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProduct {
    pub sku: String,
    pub name: String,
    pub cost_price: f64,
    pub sale_price: f64,
    pub stock: i64,
}

impl NewProduct {
    /// Sanitize a raw row. Numeric fields never fail (garbage becomes zero);
    /// a blank sku or name is a validation error.
    pub fn from_raw(row: RawProductRow) -> DomainResult<Self> {
        let sku = row.sku.trim().to_string();
        let name = row.name.trim().to_string();

        if sku.is_empty() {
            return Err(DomainError::validation("sku cannot be empty"));
        }
        if name.is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }

        Ok(Self {
            sku,
            name,
            cost_price: parse_money(&row.cost_price),
            sale_price: parse_money(&row.sale_price),
            stock: parse_stock(&row.stock),
        })
    }
}
