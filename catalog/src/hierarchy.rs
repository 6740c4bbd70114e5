//! # Category Hierarchy
//!
//! Categories form a forest through `parent_category_id`. A product is tagged with the
//! *ancestor closure* of the categories chosen for it, so browsing a high-level category
//! finds products tagged anywhere beneath it without a recursive query.
//!
//! [`CategoryTree`] is an in-memory snapshot of the forest: a flat `id -> parent` map
//! plus a child index. Every walk over it keeps a visited guard, so rows that somehow
//! form a cycle end the walk instead of hanging it.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use sea_orm::{ConnectionTrait, DbErr, EntityTrait, QueryOrder, QuerySelect};

use crate::entities::{Category, category};
use crate::errors::CatalogError;

pub type CategoryId = i32;

/// Snapshot of the category forest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryTree {
    parents: BTreeMap<CategoryId, Option<CategoryId>>,
    children: BTreeMap<CategoryId, Vec<CategoryId>>,
}

impl CategoryTree {
    pub fn from_pairs(pairs: impl IntoIterator<Item = (CategoryId, Option<CategoryId>)>) -> Self {
        let mut tree = Self::default();
        for (id, parent) in pairs {
            tree.parents.insert(id, parent);
            if let Some(parent) = parent {
                tree.children.entry(parent).or_default().push(id);
            }
        }
        for children in tree.children.values_mut() {
            children.sort_unstable();
        }
        tree
    }

    /// Load every category as `(id, parent_category_id)` in one query.
    ///
    /// # Errors
    ///
    /// Propagates database errors.
    pub async fn load<C: ConnectionTrait>(db: &C) -> Result<Self, DbErr> {
        let pairs: Vec<(CategoryId, Option<CategoryId>)> = Category::find()
            .select_only()
            .column(category::Column::Id)
            .column(category::Column::ParentCategoryId)
            .order_by_asc(category::Column::Id)
            .into_tuple()
            .all(db)
            .await?;
        Ok(Self::from_pairs(pairs))
    }

    #[must_use]
    pub fn contains(&self, id: CategoryId) -> bool {
        self.parents.contains_key(&id)
    }

    /// Parent of `id`; `None` for roots and for unknown ids.
    #[must_use]
    pub fn parent_of(&self, id: CategoryId) -> Option<CategoryId> {
        self.parents.get(&id).copied().flatten()
    }

    /// Direct children of `id`, ascending.
    #[must_use]
    pub fn children_of(&self, id: CategoryId) -> &[CategoryId] {
        self.children.get(&id).map_or(&[], Vec::as_slice)
    }

    /// Ids from `ids` that are not in the tree, ascending.
    #[must_use]
    pub fn missing<'a>(&self, ids: impl IntoIterator<Item = &'a CategoryId>) -> Vec<CategoryId> {
        let missing: BTreeSet<CategoryId> = ids
            .into_iter()
            .copied()
            .filter(|id| !self.contains(*id))
            .collect();
        missing.into_iter().collect()
    }

    /// Ancestors of `id` from its parent up to the root. Stops early on a revisit.
    #[must_use]
    pub fn ancestors(&self, id: CategoryId) -> Vec<CategoryId> {
        let mut seen = HashSet::from([id]);
        let mut ancestors = Vec::new();
        let mut cursor = self.parent_of(id);
        while let Some(parent) = cursor {
            if !seen.insert(parent) {
                break;
            }
            ancestors.push(parent);
            cursor = self.parent_of(parent);
        }
        ancestors
    }

    /// True when `candidate` is `id` itself or lies underneath it.
    #[must_use]
    pub fn is_self_or_descendant(&self, id: CategoryId, candidate: CategoryId) -> bool {
        candidate == id || self.ancestors(candidate).contains(&id)
    }

    /// Ancestor closure of `requested`.
    ///
    /// Every requested id is walked upward; a walk stops at a root or at the first
    /// ancestor already in the result, which covers both shared ancestors and cycles.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidReference`] listing the requested ids that do not
    /// exist, or a dangling parent id met during a walk.
    pub fn expand(
        &self,
        requested: &BTreeSet<CategoryId>,
    ) -> Result<BTreeSet<CategoryId>, CatalogError> {
        let missing = self.missing(requested);
        if !missing.is_empty() {
            return Err(CatalogError::invalid_reference("categories", missing));
        }

        let mut closure = requested.clone();
        for &id in requested {
            let mut cursor = self.parent_of(id);
            while let Some(parent) = cursor {
                if !self.contains(parent) {
                    return Err(CatalogError::invalid_reference("categories", vec![parent]));
                }
                if !closure.insert(parent) {
                    break;
                }
                cursor = self.parent_of(parent);
            }
        }

        tracing::debug!(
            requested = requested.len(),
            expanded = closure.len(),
            "Expanded category selection to ancestor closure"
        );
        Ok(closure)
    }
}

/// Load the tree through `db` and expand `requested` against it.
///
/// `db` may be an open transaction, so the expansion sees the same snapshot the
/// caller writes against.
///
/// # Errors
///
/// Database errors, or [`CatalogError::InvalidReference`] for unknown ids.
pub async fn expand_categories<C: ConnectionTrait>(
    db: &C,
    requested: impl IntoIterator<Item = CategoryId>,
) -> Result<BTreeSet<CategoryId>, CatalogError> {
    let requested: BTreeSet<CategoryId> = requested.into_iter().collect();
    if requested.is_empty() {
        return Ok(requested);
    }
    let tree = CategoryTree::load(db).await?;
    tree.expand(&requested)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(values: &[CategoryId]) -> BTreeSet<CategoryId> {
        values.iter().copied().collect()
    }

    /// Category(1) > Medicine(2) > Pain Relief(3) > Ibuprofen(4), plus
    /// Medicine(2) > Allergy(5) and a second root Cosmetics(6) > Skin(7).
    fn pharmacy_tree() -> CategoryTree {
        CategoryTree::from_pairs([
            (1, None),
            (2, Some(1)),
            (3, Some(2)),
            (4, Some(3)),
            (5, Some(2)),
            (6, None),
            (7, Some(6)),
        ])
    }

    #[test]
    fn test_expand_leaf_adds_every_ancestor() {
        let tree = CategoryTree::from_pairs([(1, None), (2, Some(1)), (3, Some(2))]);
        assert_eq!(tree.expand(&ids(&[3])).unwrap(), ids(&[1, 2, 3]));
    }

    #[test]
    fn test_expand_root_is_itself() {
        let tree = pharmacy_tree();
        assert_eq!(tree.expand(&ids(&[6])).unwrap(), ids(&[6]));
    }

    #[test]
    fn test_expand_empty_selection() {
        let tree = pharmacy_tree();
        assert!(tree.expand(&BTreeSet::new()).unwrap().is_empty());
    }

    #[test]
    fn test_expand_shared_ancestors_across_branches() {
        let tree = pharmacy_tree();
        let closure = tree.expand(&ids(&[4, 5, 7])).unwrap();
        assert_eq!(closure, ids(&[1, 2, 3, 4, 5, 6, 7]));
    }

    #[test]
    fn test_expand_when_ancestor_is_also_requested() {
        let tree = pharmacy_tree();
        assert_eq!(tree.expand(&ids(&[2, 4])).unwrap(), ids(&[1, 2, 3, 4]));
    }

    #[test]
    fn test_expand_is_superset_and_closed_under_parent() {
        let tree = pharmacy_tree();
        for selection in [ids(&[4]), ids(&[5, 7]), ids(&[3, 6]), ids(&[1, 2, 3, 4, 5, 6, 7])] {
            let closure = tree.expand(&selection).unwrap();
            assert!(closure.is_superset(&selection));
            for id in &closure {
                if let Some(parent) = tree.parent_of(*id) {
                    assert!(closure.contains(&parent), "parent {parent} of {id} missing");
                }
            }
        }
    }

    #[test]
    fn test_expand_is_idempotent() {
        let tree = pharmacy_tree();
        let once = tree.expand(&ids(&[4, 7])).unwrap();
        let twice = tree.expand(&once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_expand_unknown_id_is_invalid_reference() {
        let tree = pharmacy_tree();
        match tree.expand(&ids(&[4, 99, 98])) {
            Err(CatalogError::InvalidReference { resource, ids }) => {
                assert_eq!(resource, "categories");
                assert_eq!(ids, vec![98, 99]);
            }
            other => panic!("expected InvalidReference, got {other:?}"),
        }
    }

    #[test]
    fn test_expand_dangling_parent_is_invalid_reference() {
        let tree = CategoryTree::from_pairs([(1, Some(50))]);
        match tree.expand(&ids(&[1])) {
            Err(CatalogError::InvalidReference { ids, .. }) => assert_eq!(ids, vec![50]),
            other => panic!("expected InvalidReference, got {other:?}"),
        }
    }

    #[test]
    fn test_expand_terminates_on_cycle() {
        // 1 -> 2 -> 3 -> 1 cannot be created through the API, but must not hang.
        let tree = CategoryTree::from_pairs([(1, Some(3)), (2, Some(1)), (3, Some(2))]);
        assert_eq!(tree.expand(&ids(&[2])).unwrap(), ids(&[1, 2, 3]));
    }

    #[test]
    fn test_expand_terminates_on_self_parent() {
        let tree = CategoryTree::from_pairs([(1, Some(1))]);
        assert_eq!(tree.expand(&ids(&[1])).unwrap(), ids(&[1]));
    }

    #[test]
    fn test_children_are_direct_only() {
        let tree = pharmacy_tree();
        assert_eq!(tree.children_of(2), &[3, 5]);
        assert_eq!(tree.children_of(1), &[2]);
        assert!(tree.children_of(4).is_empty());
        assert!(tree.children_of(404).is_empty());
    }

    #[test]
    fn test_ancestors_order_and_cycle_guard() {
        let tree = pharmacy_tree();
        assert_eq!(tree.ancestors(4), vec![3, 2, 1]);
        assert!(tree.ancestors(1).is_empty());

        let cyclic = CategoryTree::from_pairs([(1, Some(2)), (2, Some(1))]);
        assert_eq!(cyclic.ancestors(1), vec![2]);
    }

    #[test]
    fn test_is_self_or_descendant() {
        let tree = pharmacy_tree();
        assert!(tree.is_self_or_descendant(2, 2));
        assert!(tree.is_self_or_descendant(2, 4));
        assert!(!tree.is_self_or_descendant(4, 2));
        assert!(!tree.is_self_or_descendant(2, 7));
    }

    #[test]
    fn test_missing_is_sorted_and_deduplicated() {
        let tree = pharmacy_tree();
        assert_eq!(tree.missing(&[12, 1, 10, 12]), vec![10, 12]);
        assert!(tree.missing(&[1, 2]).is_empty());
    }
}
