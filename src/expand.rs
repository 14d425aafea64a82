//! Category-combination expansion.
//!
//! A feature set expands into the Cartesian product of each feature's
//! candidate parent categories: every way to pick exactly one parent per
//! feature. The product is exponential in the number of multi-parent
//! features (`∏ |parents(f)|`), bounded in practice by short parent lists
//! but guarded here by a caller-supplied limit checked before any leaf is
//! produced.
//!
//! The traversal is an explicit depth-first walk over a choice odometer with
//! a running fingerprint per depth, so only the current path is ever
//! materialized. Leaves come out in depth-first order: the last feature's
//! parent choice varies fastest. Feature order is the caller's (sorted, for
//! the engine), which makes one build's leaf order — and therefore the
//! counter-merge outcome — reproducible.

use crate::catalog::Catalog;
use crate::error::{Result, RiskError};
use crate::fingerprint::{combine, Fingerprint, EMPTY_FINGERPRINT};

/// One leaf of an expansion: a specific choice of one parent category per
/// feature, with its category-set fingerprint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryChoice {
    pub fingerprint: Fingerprint,
    /// Chosen categories in feature-traversal order.
    pub categories: Vec<String>,
}

/// Depth-first Cartesian-product expander over a catalog's parent map.
#[derive(Debug)]
pub struct Expander<'a> {
    catalog: &'a Catalog,
    limit: u64,
}

impl<'a> Expander<'a> {
    pub fn new(catalog: &'a Catalog, limit: u64) -> Self {
        Self { catalog, limit }
    }

    /// Number of leaves `features` would expand into.
    pub fn product_size(&self, features: &[String]) -> Result<u128> {
        let mut size: u128 = 1;
        for feature in features {
            size *= self.catalog.parents(feature)?.len() as u128;
        }
        Ok(size)
    }

    /// Enumerate every category combination for `features`.
    ///
    /// Fails with `CombinationLimitExceeded` before producing any leaf if
    /// the product size is over the configured limit.
    pub fn expand(&self, features: &[String]) -> Result<Vec<CategoryChoice>> {
        let parent_lists: Vec<&[String]> = features
            .iter()
            .map(|feature| self.catalog.parents(feature))
            .collect::<Result<_>>()?;

        let size = self.product_size(features)?;
        if size > u128::from(self.limit) {
            return Err(RiskError::CombinationLimitExceeded { size, limit: self.limit });
        }

        let depth_count = parent_lists.len();
        let mut leaves = Vec::with_capacity(size as usize);
        if depth_count == 0 || parent_lists.iter().any(|parents| parents.is_empty()) {
            return Ok(leaves);
        }

        // choice[i] selects a parent for feature i; prefix[i] is the
        // fingerprint of the choices above depth i.
        let mut choice = vec![0usize; depth_count];
        let mut prefix = vec![EMPTY_FINGERPRINT; depth_count + 1];
        for depth in 0..depth_count {
            prefix[depth + 1] =
                combine(prefix[depth], self.catalog.category_weight(&parent_lists[depth][0])?);
        }

        loop {
            let categories: Vec<String> = (0..depth_count)
                .map(|depth| parent_lists[depth][choice[depth]].clone())
                .collect();
            leaves.push(CategoryChoice { fingerprint: prefix[depth_count], categories });

            // Backtrack to the deepest position with an unvisited sibling,
            // advance it, and rebuild the fingerprints below it.
            let mut depth = depth_count;
            loop {
                if depth == 0 {
                    return Ok(leaves);
                }
                let position = depth - 1;
                if choice[position] + 1 < parent_lists[position].len() {
                    choice[position] += 1;
                    prefix[position + 1] = combine(
                        prefix[position],
                        self.catalog.category_weight(&parent_lists[position][choice[position]])?,
                    );
                    for below in depth..depth_count {
                        choice[below] = 0;
                        prefix[below + 1] = combine(
                            prefix[below],
                            self.catalog.category_weight(&parent_lists[below][0])?,
                        );
                    }
                    break;
                }
                depth -= 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_product_size() {
        let catalog = Catalog::builtin();
        let expander = Expander::new(&catalog, 1 << 16);

        // KeyVault has 1 parent, SQLDatabase 3, AppService 2.
        assert_eq!(expander.product_size(&strings(&["KeyVault"])).unwrap(), 1);
        assert_eq!(
            expander
                .product_size(&strings(&["AppService", "SQLDatabase"]))
                .unwrap(),
            6
        );
    }

    #[test]
    fn test_single_feature_expansion() {
        let catalog = Catalog::builtin();
        let expander = Expander::new(&catalog, 1 << 16);

        let leaves = expander.expand(&strings(&["KeyVault"])).unwrap();
        assert_eq!(leaves.len(), 1);
        assert_eq!(leaves[0].categories, ["Security Infra"]);
        assert_eq!(leaves[0].fingerprint, 1_000_099);
    }

    #[test]
    fn test_expansion_covers_full_product_in_dfs_order() {
        let catalog = Catalog::builtin();
        let expander = Expander::new(&catalog, 1 << 16);

        // AppService: [Web Front End, APIs]; VirtualNetwork: [Network
        // Isolation, Hybrid]. Last feature's choice varies fastest.
        let leaves = expander
            .expand(&strings(&["AppService", "VirtualNetwork"]))
            .unwrap();
        let paths: Vec<Vec<String>> = leaves.iter().map(|l| l.categories.clone()).collect();
        assert_eq!(
            paths,
            vec![
                strings(&["Web Front End", "Network Isolation"]),
                strings(&["Web Front End", "Hybrid"]),
                strings(&["APIs", "Network Isolation"]),
                strings(&["APIs", "Hybrid"]),
            ]
        );
    }

    #[test]
    fn test_incremental_fingerprint_matches_direct_hash() {
        let catalog = Catalog::builtin();
        let expander = Expander::new(&catalog, 1 << 16);

        let leaves = expander
            .expand(&strings(&["AppService", "SQLDatabase", "VirtualNetwork"]))
            .unwrap();
        assert_eq!(leaves.len(), 12);
        for leaf in leaves {
            let direct = catalog
                .category_fingerprint(leaf.categories.iter().map(String::as_str))
                .unwrap();
            assert_eq!(leaf.fingerprint, direct);
        }
    }

    #[test]
    fn test_repeat_fingerprints_within_one_expansion() {
        let catalog = Catalog::builtin();
        let expander = Expander::new(&catalog, 1 << 16);

        // SQLDatabase and Storage share parents {Storage, DataProcessing,
        // Reporting}; unordered choices repeat across leaves, so distinct
        // leaves share fingerprints.
        let leaves = expander
            .expand(&strings(&["SQLDatabase", "Storage"]))
            .unwrap();
        assert_eq!(leaves.len(), 9);
        let distinct: std::collections::BTreeSet<u64> =
            leaves.iter().map(|l| l.fingerprint).collect();
        assert_eq!(distinct.len(), 6);
    }

    #[test]
    fn test_limit_exceeded_before_any_leaf() {
        let catalog = Catalog::builtin();
        let expander = Expander::new(&catalog, 5);

        let err = expander
            .expand(&strings(&["AppService", "SQLDatabase"]))
            .unwrap_err();
        assert!(
            matches!(err, RiskError::CombinationLimitExceeded { size: 6, limit: 5 })
        );
    }

    #[test]
    fn test_unknown_feature_fails_expansion() {
        let catalog = Catalog::builtin();
        let expander = Expander::new(&catalog, 1 << 16);

        let err = expander.expand(&strings(&["GhostService"])).unwrap_err();
        assert!(matches!(err, RiskError::UnknownFeature { .. }));
    }
}
