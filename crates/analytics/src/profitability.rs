//! Per-curve profitability reports.
//!
//! These read the `curve` labels written by the last classification pass;
//! unlabeled products never contribute.

use serde::{Deserialize, Serialize};

use stockcurve_catalog::{Curve, Product};
use stockcurve_core::ProductId;

/// Margin and profit statistics for one curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurveStats {
    pub curve: Curve,
    pub average_margin_percent: f64,
    pub total_profit: f64,
}

/// A curve's slice of the total profit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProfitShare {
    pub curve: Curve,
    pub total_profit: f64,
    pub profit_share_percent: f64,
}

/// A product listed under its curve, with its margin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveMember {
    pub id: ProductId,
    pub sku: String,
    pub name: String,
    pub cost_price: f64,
    pub sale_price: f64,
    pub stock: i64,
    pub margin_percent: f64,
    pub curve: Curve,
}

/// Margin/profit statistics per curve, in A, B, C order.
///
/// Curves with no labeled products are omitted. Within a curve, products
/// with a zero sale or cost price are left out of both the margin average and
/// the profit sum.
pub fn aggregate_by_curve(products: &[Product]) -> Vec<CurveStats> {
    let mut out = Vec::with_capacity(Curve::ALL.len());

    for curve in Curve::ALL {
        let mut members = products.iter().filter(|p| p.curve == Some(curve)).peekable();
        if members.peek().is_none() {
            continue;
        }

        let mut margin_sum = 0.0;
        let mut total_profit = 0.0;
        let mut valid = 0usize;

        for p in members.filter(|p| p.has_valid_pricing()) {
            margin_sum += p.margin_percent();
            total_profit += p.profit();
            valid += 1;
        }

        let average_margin_percent = if valid > 0 {
            margin_sum / valid as f64
        } else {
            0.0
        };

        out.push(CurveStats {
            curve,
            average_margin_percent,
            total_profit,
        });
    }

    out
}

/// Each reported curve's percentage of the summed profit. All shares are 0
/// when the summed profit is 0.
pub fn profit_share(stats: &[CurveStats]) -> Vec<ProfitShare> {
    let grand_total: f64 = stats.iter().map(|s| s.total_profit).sum();

    stats
        .iter()
        .map(|s| ProfitShare {
            curve: s.curve,
            total_profit: s.total_profit,
            profit_share_percent: if grand_total != 0.0 {
                s.total_profit / grand_total * 100.0
            } else {
                0.0
            },
        })
        .collect()
}

/// Products currently labeled `curve`, in snapshot order.
pub fn products_in_curve(products: &[Product], curve: Curve) -> Vec<CurveMember> {
    products
        .iter()
        .filter(|p| p.curve == Some(curve))
        .map(|p| CurveMember {
            id: p.id,
            sku: p.sku.clone(),
            name: p.name.clone(),
            cost_price: p.cost_price,
            sale_price: p.sale_price,
            stock: p.stock,
            margin_percent: p.margin_percent(),
            curve,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labeled(curve: Option<Curve>, sale: f64, cost: f64, stock: i64) -> Product {
        Product {
            id: ProductId::new(),
            sku: format!("SKU-{sale}-{cost}-{stock}"),
            name: "Item".to_string(),
            cost_price: cost,
            sale_price: sale,
            stock,
            curve,
        }
    }

    #[test]
    fn empty_catalog_reports_nothing() {
        assert!(aggregate_by_curve(&[]).is_empty());
        assert!(profit_share(&[]).is_empty());
    }

    #[test]
    fn zero_cost_products_are_excluded() {
        let products = vec![
            labeled(Some(Curve::A), 100.0, 0.0, 50),
            labeled(Some(Curve::A), 100.0, 60.0, 10),
        ];
        let stats = aggregate_by_curve(&products);

        assert_eq!(
            stats,
            vec![CurveStats {
                curve: Curve::A,
                average_margin_percent: 40.0,
                total_profit: 400.0,
            }]
        );
    }

    #[test]
    fn curve_with_only_invalid_pricing_reports_zeros() {
        let products = vec![labeled(Some(Curve::B), 0.0, 10.0, 3)];
        let stats = aggregate_by_curve(&products);
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].curve, Curve::B);
        assert_eq!(stats[0].average_margin_percent, 0.0);
        assert_eq!(stats[0].total_profit, 0.0);
    }

    #[test]
    fn empty_curves_are_omitted_and_order_is_fixed() {
        let products = vec![
            labeled(Some(Curve::C), 10.0, 5.0, 1),
            labeled(None, 10.0, 5.0, 1),
            labeled(Some(Curve::A), 10.0, 5.0, 1),
        ];
        let curves: Vec<Curve> = aggregate_by_curve(&products).iter().map(|s| s.curve).collect();
        assert_eq!(curves, vec![Curve::A, Curve::C]);
    }

    #[test]
    fn average_margin_is_per_product() {
        let products = vec![
            labeled(Some(Curve::A), 100.0, 50.0, 1),
            labeled(Some(Curve::A), 10.0, 9.0, 1000),
        ];
        let stats = aggregate_by_curve(&products);
        assert!((stats[0].average_margin_percent - 30.0).abs() < 1e-9);
        assert!((stats[0].total_profit - 1050.0).abs() < 1e-9);
    }

    #[test]
    fn shares_split_the_total() {
        let stats = vec![
            CurveStats { curve: Curve::A, average_margin_percent: 0.0, total_profit: 750.0 },
            CurveStats { curve: Curve::B, average_margin_percent: 0.0, total_profit: 250.0 },
        ];
        let shares = profit_share(&stats);
        assert_eq!(shares[0].profit_share_percent, 75.0);
        assert_eq!(shares[1].profit_share_percent, 25.0);
        assert_eq!(shares[1].total_profit, 250.0);
    }

    #[test]
    fn shares_are_zero_without_profit() {
        let stats = vec![
            CurveStats { curve: Curve::A, average_margin_percent: 10.0, total_profit: 0.0 },
            CurveStats { curve: Curve::C, average_margin_percent: 0.0, total_profit: 0.0 },
        ];
        assert!(profit_share(&stats).iter().all(|s| s.profit_share_percent == 0.0));
    }

    #[test]
    fn curve_listing_carries_margins() {
        let products = vec![
            labeled(Some(Curve::B), 50.0, 40.0, 2),
            labeled(Some(Curve::A), 80.0, 20.0, 2),
            labeled(Some(Curve::B), 0.0, 40.0, 2),
        ];
        let members = products_in_curve(&products, Curve::B);
        assert_eq!(members.len(), 2);
        assert_eq!(members[0].margin_percent, 20.0);
        assert_eq!(members[1].margin_percent, 0.0);
        assert!(members.iter().all(|m| m.curve == Curve::B));
    }

    #[cfg(test)]
    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        fn labeled_catalog() -> impl Strategy<Value = Vec<Product>> {
            prop::collection::vec(
                (0usize..4, 0u32..500, 0u32..500, 0i64..40),
                0..40,
            )
            .prop_map(|rows| {
                rows.into_iter()
                    .map(|(c, sale, cost, stock)| {
                        let curve = Curve::ALL.get(c).copied();
                        labeled(curve, sale as f64, cost as f64, stock)
                    })
                    .collect()
            })
        }

        proptest! {
            /// Property: shares add up to 100 whenever there is profit to share.
            #[test]
            fn shares_are_conserved(products in labeled_catalog()) {
                let stats = aggregate_by_curve(&products);
                let shares = profit_share(&stats);
                let total_profit: f64 = stats.iter().map(|s| s.total_profit).sum();
                let total_share: f64 = shares.iter().map(|s| s.profit_share_percent).sum();

                if total_profit != 0.0 {
                    prop_assert!((total_share - 100.0).abs() < 1e-6);
                } else {
                    prop_assert!(shares.iter().all(|s| s.profit_share_percent == 0.0));
                }
            }

            /// Property: a curve is reported iff some product carries its label.
            #[test]
            fn reported_curves_are_exactly_the_used_ones(products in labeled_catalog()) {
                let reported: Vec<Curve> = aggregate_by_curve(&products).iter().map(|s| s.curve).collect();
                let used: Vec<Curve> = Curve::ALL
                    .into_iter()
                    .filter(|c| products.iter().any(|p| p.curve == Some(*c)))
                    .collect();
                prop_assert_eq!(reported, used);
            }
        }
    }
}
