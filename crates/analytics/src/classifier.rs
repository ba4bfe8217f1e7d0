use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use stockcurve_catalog::{Curve, CurveUpdate, Product};
use stockcurve_core::{DomainError, DomainResult, ProductId};

/// What to do when the catalog's total importance is zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ZeroTotalPolicy {
    /// Every product gets a cumulative share of 0 (and therefore lands in A).
    #[default]
    UniformZeroShare,
    /// Rank and accumulate by stock quantity instead. Falls back to
    /// `UniformZeroShare` when total stock is zero as well.
    StockRank,
}

impl core::str::FromStr for ZeroTotalPolicy {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "uniform" | "uniform-zero-share" => Ok(Self::UniformZeroShare),
            "stock-rank" | "stock" => Ok(Self::StockRank),
            other => Err(DomainError::validation(format!(
                "unknown zero-total policy '{other}': use uniform or stock-rank"
            ))),
        }
    }
}

/// Thresholds and degenerate-case policy for a classification pass.
///
/// Thresholds are inclusive upper bounds on the cumulative share (percent):
/// `share <= a_threshold` is A, `share <= b_threshold` is B, anything above is C.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassifierConfig {
    a_threshold: f64,
    b_threshold: f64,
    zero_total_policy: ZeroTotalPolicy,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            a_threshold: 80.0,
            b_threshold: 95.0,
            zero_total_policy: ZeroTotalPolicy::UniformZeroShare,
        }
    }
}

impl ClassifierConfig {
    pub fn new(a_threshold: f64, b_threshold: f64) -> DomainResult<Self> {
        let in_range = |t: f64| t.is_finite() && t > 0.0 && t <= 100.0;
        if !in_range(a_threshold) || !in_range(b_threshold) {
            return Err(DomainError::validation(
                "curve thresholds must be finite percentages in (0, 100]",
            ));
        }
        if a_threshold > b_threshold {
            return Err(DomainError::validation(format!(
                "A threshold ({a_threshold}) must not exceed B threshold ({b_threshold})"
            )));
        }
        Ok(Self {
            a_threshold,
            b_threshold,
            ..Self::default()
        })
    }

    pub fn with_zero_total_policy(mut self, policy: ZeroTotalPolicy) -> Self {
        self.zero_total_policy = policy;
        self
    }

    pub fn a_threshold(&self) -> f64 {
        self.a_threshold
    }

    pub fn b_threshold(&self) -> f64 {
        self.b_threshold
    }

    pub fn zero_total_policy(&self) -> ZeroTotalPolicy {
        self.zero_total_policy
    }

    /// Bucket for a cumulative share.
    pub fn curve_for_share(&self, cumulative_share: f64) -> Curve {
        if cumulative_share <= self.a_threshold {
            Curve::A
        } else if cumulative_share <= self.b_threshold {
            Curve::B
        } else {
            Curve::C
        }
    }
}

/// One row of the ABC ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedProduct {
    pub id: ProductId,
    pub sku: String,
    pub name: String,
    pub stock: i64,
    pub sale_price: f64,
    pub importance: f64,
    /// Percent of total importance covered up to and including this row.
    pub cumulative_share: f64,
    pub curve: Curve,
}

/// Outcome of a classification pass.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Classification {
    /// Every input product, importance-descending.
    pub ranked: Vec<RankedProduct>,
    /// Labels that differ from what the snapshot currently stores.
    pub updates: Vec<CurveUpdate>,
}

impl Classification {
    pub fn len(&self) -> usize {
        self.ranked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranked.is_empty()
    }

    /// Label assigned to `id` by this pass.
    pub fn curve_of(&self, id: &ProductId) -> Option<Curve> {
        self.ranked.iter().find(|r| r.id == *id).map(|r| r.curve)
    }

    /// Write the pass's labels onto `products` in place.
    ///
    /// Returns the number of products whose label changed. Products the pass
    /// did not see are left untouched.
    pub fn apply(&self, products: &mut [Product]) -> usize {
        let labels: HashMap<ProductId, Curve> =
            self.ranked.iter().map(|r| (r.id, r.curve)).collect();

        let mut changed = 0;
        for product in products.iter_mut() {
            if let Some(curve) = labels.get(&product.id) {
                if product.curve != Some(*curve) {
                    product.curve = Some(*curve);
                    changed += 1;
                }
            }
        }
        changed
    }
}

/// Rank the snapshot by importance and assign ABC labels.
///
/// Pure: the snapshot is not modified. Persisting `updates` is the caller's
/// job and must be all-or-nothing.
///
/// Model:
/// - importance = `sale_price × stock` (or `sale_price` when out of stock);
/// - stable sort by importance descending (ties keep input order);
/// - walk the ranking accumulating importance; each row's bucket comes from
///   the cumulative share including itself.
pub fn classify(products: &[Product], config: &ClassifierConfig) -> Classification {
    if products.is_empty() {
        return Classification::default();
    }

    let importance: Vec<f64> = products.iter().map(Product::importance).collect();
    let (mut weights, mut total) = finite_weights(importance.clone());

    if total <= 0.0 && config.zero_total_policy == ZeroTotalPolicy::StockRank {
        (weights, total) = finite_weights(products.iter().map(|p| p.stock.max(0) as f64).collect());
    }

    let mut order: Vec<usize> = (0..products.len()).collect();
    // `sort_by` is stable: equal weights keep input order.
    order.sort_by(|&a, &b| weights[b].total_cmp(&weights[a]));

    let mut ranked = Vec::with_capacity(products.len());
    let mut updates = Vec::new();
    let mut accumulated = 0.0;

    for idx in order {
        let product = &products[idx];
        accumulated += weights[idx];

        let cumulative_share = if total > 0.0 {
            accumulated * 100.0 / total
        } else {
            0.0
        };
        let curve = config.curve_for_share(cumulative_share);

        if product.curve != Some(curve) {
            updates.push(CurveUpdate {
                product_id: product.id,
                curve,
            });
        }

        ranked.push(RankedProduct {
            id: product.id,
            sku: product.sku.clone(),
            name: product.name.clone(),
            stock: product.stock,
            sale_price: product.sale_price,
            importance: importance[idx],
            cumulative_share,
            curve,
        });
    }

    Classification { ranked, updates }
}

/// Weights and their sum, rescaled by the largest weight when the plain sum
/// overflows. Shares only depend on ratios, so the ranking is unchanged.
fn finite_weights(weights: Vec<f64>) -> (Vec<f64>, f64) {
    let total: f64 = weights.iter().sum();
    if total.is_finite() {
        return (weights, total);
    }

    let peak = weights.iter().copied().fold(0.0, f64::max).min(f64::MAX);
    let scaled: Vec<f64> = weights.iter().map(|w| w.min(f64::MAX) / peak).collect();
    let total = scaled.iter().sum();
    (scaled, total)
}
