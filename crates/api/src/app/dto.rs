use serde::Deserialize;
use serde_json::{Value, json};

use stockcurve_analytics::{
    CurveCounts, CurveMember, CurveStats, DashboardSummary, ProfitShare, RankedProduct,
};
use stockcurve_catalog::Product;

// -------------------------
// Request DTOs
// -------------------------

/// `GET /dashboard/summary` query string.
#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    /// `A`, `B`, `C` or `all`.
    pub curve: Option<String>,
    /// Case-insensitive sku/name search.
    pub q: Option<String>,
    /// Length of the top-products list.
    pub top: Option<usize>,
}

// -------------------------
// Response mapping
// -------------------------

/// Money and percentages leave the API with two decimals.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn ranked_to_json(r: &RankedProduct) -> Value {
    json!({
        "id": r.id.to_string(),
        "sku": r.sku,
        "name": r.name,
        "stock": r.stock,
        "sale_price": round2(r.sale_price),
        "importance": round2(r.importance),
        "cumulative_share": round2(r.cumulative_share),
        "curve": r.curve.as_str(),
    })
}

pub fn curve_member_to_json(m: &CurveMember) -> Value {
    json!({
        "id": m.id.to_string(),
        "sku": m.sku,
        "name": m.name,
        "cost_price": round2(m.cost_price),
        "sale_price": round2(m.sale_price),
        "stock": m.stock,
        "margin_percent": round2(m.margin_percent),
        "curve": m.curve.as_str(),
    })
}

pub fn curve_stats_to_json(s: &CurveStats) -> Value {
    json!({
        "curve": s.curve.as_str(),
        "average_margin_percent": round2(s.average_margin_percent),
        "total_profit": round2(s.total_profit),
    })
}

pub fn profit_share_to_json(s: &ProfitShare) -> Value {
    json!({
        "curve": s.curve.as_str(),
        "total_profit": round2(s.total_profit),
        "profit_share_percent": round2(s.profit_share_percent),
    })
}

pub fn product_to_json(p: &Product) -> Value {
    json!({
        "id": p.id.to_string(),
        "sku": p.sku,
        "name": p.name,
        "cost_price": round2(p.cost_price),
        "sale_price": round2(p.sale_price),
        "stock": p.stock,
        "curve": p.curve.map(|c| c.as_str()),
    })
}

fn curve_counts_to_json(c: &CurveCounts) -> Value {
    json!({
        "A": c.a,
        "B": c.b,
        "C": c.c,
        "unclassified": c.unclassified,
    })
}

pub fn summary_to_json(s: &DashboardSummary) -> Value {
    json!({
        "generated_at": s.generated_at.to_rfc3339(),
        "total_products": s.total_products,
        "total_profit": round2(s.total_profit),
        "curve_counts": curve_counts_to_json(&s.curve_counts),
        "top_products": s.top_products.iter().map(|t| json!({
            "sku": t.sku,
            "name": t.name,
            "profit": round2(t.profit),
        })).collect::<Vec<_>>(),
    })
}
