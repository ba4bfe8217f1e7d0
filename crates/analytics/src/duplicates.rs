//! Exact-match duplicate detection by sku and by name.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use stockcurve_catalog::Product;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateGroup {
    pub key: String,
    pub count: usize,
}

/// Duplicate groups found in a snapshot.
///
/// A grouping is `Some` only when it has at least one group; groups are
/// sorted by key.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DuplicateReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<Vec<DuplicateGroup>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<Vec<DuplicateGroup>>,
}

impl DuplicateReport {
    pub fn is_clean(&self) -> bool {
        self.sku.is_none() && self.name.is_none()
    }
}

pub fn find_duplicates(products: &[Product]) -> DuplicateReport {
    DuplicateReport {
        sku: groups_with_repeats(products.iter().map(|p| p.sku.as_str())),
        name: groups_with_repeats(products.iter().map(|p| p.name.as_str())),
    }
}

fn groups_with_repeats<'a>(keys: impl Iterator<Item = &'a str>) -> Option<Vec<DuplicateGroup>> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for key in keys {
        *counts.entry(key).or_default() += 1;
    }

    let groups: Vec<DuplicateGroup> = counts
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(key, count)| DuplicateGroup {
            key: key.to_string(),
            count,
        })
        .collect();

    (!groups.is_empty()).then_some(groups)
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockcurve_core::ProductId;

    fn product(sku: &str, name: &str) -> Product {
        Product {
            id: ProductId::new(),
            sku: sku.to_string(),
            name: name.to_string(),
            cost_price: 0.0,
            sale_price: 0.0,
            stock: 0,
            curve: None,
        }
    }

    #[test]
    fn clean_catalog_reports_nothing() {
        let report = find_duplicates(&[product("A1", "Mouse"), product("A2", "Keyboard")]);
        assert!(report.is_clean());
        assert_eq!(serde_json::to_value(&report).unwrap(), serde_json::json!({}));
    }

    #[test]
    fn repeated_names_are_grouped_with_counts() {
        let report = find_duplicates(&[
            product("A1", "Mouse"),
            product("A2", "Mouse"),
            product("A3", "Cable"),
            product("A4", "Mouse"),
            product("A5", "Cable"),
        ]);

        assert_eq!(report.sku, None);
        assert_eq!(
            report.name,
            Some(vec![
                DuplicateGroup { key: "Cable".to_string(), count: 2 },
                DuplicateGroup { key: "Mouse".to_string(), count: 3 },
            ])
        );
    }

    #[test]
    fn sku_and_name_are_grouped_independently() {
        let report = find_duplicates(&[product("X", "One"), product("X", "Two")]);
        assert_eq!(report.sku, Some(vec![DuplicateGroup { key: "X".to_string(), count: 2 }]));
        assert_eq!(report.name, None);
    }

    #[test]
    fn matching_is_exact() {
        let report = find_duplicates(&[product("a", "Mouse"), product("A", "mouse")]);
        assert!(report.is_clean());
    }
}
