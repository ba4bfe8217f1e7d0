//! Dashboard summary: headline totals, curve distribution and top sellers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockcurve_catalog::{Curve, Product};

/// Number of products listed in `top_products` unless the caller says otherwise.
pub const DEFAULT_TOP_N: usize = 10;

/// Narrowing applied before any dashboard figure is computed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DashboardFilter {
    /// Only products carrying this label.
    pub curve: Option<Curve>,
    /// Case-insensitive substring of sku or name.
    pub search: Option<String>,
}

impl DashboardFilter {
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(curve) = self.curve {
            if product.curve != Some(curve) {
                return false;
            }
        }

        match self.search.as_deref().map(str::trim) {
            Some(needle) if !needle.is_empty() => {
                let needle = needle.to_lowercase();
                product.sku.to_lowercase().contains(&needle)
                    || product.name.to_lowercase().contains(&needle)
            }
            _ => true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurveCounts {
    pub a: usize,
    pub b: usize,
    pub c: usize,
    pub unclassified: usize,
}

impl CurveCounts {
    pub fn tally<'a>(products: impl IntoIterator<Item = &'a Product>) -> Self {
        let mut counts = Self::default();
        for p in products {
            match p.curve {
                Some(Curve::A) => counts.a += 1,
                Some(Curve::B) => counts.b += 1,
                Some(Curve::C) => counts.c += 1,
                None => counts.unclassified += 1,
            }
        }
        counts
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopProduct {
    pub sku: String,
    pub name: String,
    pub profit: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub generated_at: DateTime<Utc>,
    pub total_products: usize,
    /// `Σ (sale − cost) × stock` over the filtered products, no pricing filter.
    pub total_profit: f64,
    pub curve_counts: CurveCounts,
    /// Most profitable products first; ties keep snapshot order.
    pub top_products: Vec<TopProduct>,
}

pub fn dashboard_summary(
    products: &[Product],
    filter: &DashboardFilter,
    top_n: usize,
    generated_at: DateTime<Utc>,
) -> DashboardSummary {
    let selected: Vec<&Product> = products.iter().filter(|p| filter.matches(p)).collect();

    let total_profit: f64 = selected.iter().map(|p| p.profit()).sum();
    let curve_counts = CurveCounts::tally(selected.iter().copied());

    let mut by_profit = selected.clone();
    by_profit.sort_by(|a, b| b.profit().total_cmp(&a.profit()));

    let top_products = by_profit
        .into_iter()
        .take(top_n)
        .map(|p| TopProduct {
            sku: p.sku.clone(),
            name: p.name.clone(),
            profit: p.profit(),
        })
        .collect();

    DashboardSummary {
        generated_at,
        total_products: selected.len(),
        total_profit,
        curve_counts,
        top_products,
    }
}
