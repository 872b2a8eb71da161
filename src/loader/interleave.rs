//! Native ad interleaving for catalog grids

use crate::models::CatalogItem;

/// One rendered cell of a catalog grid
#[derive(Debug, Clone, PartialEq)]
pub enum GridCell<'a> {
    Item(&'a CatalogItem),
    /// Sponsor slot inserted after the item at `after` (0-based)
    AdSlot { after: usize },
}

impl GridCell<'_> {
    /// Stable key of the cell within its grid
    pub fn key(&self) -> String {
        match self {
            GridCell::Item(item) => item.render_key(),
            GridCell::AdSlot { after } => format!("ad-slot-{}", after),
        }
    }
}

/// Lay out items with an ad slot after every `cadence`-th one.
///
/// With `enabled == false` (no native script) or a zero cadence the items are
/// returned unchanged.
pub fn interleave(items: &[CatalogItem], cadence: usize, enabled: bool) -> Vec<GridCell<'_>> {
    let mut cells = Vec::with_capacity(items.len() + items.len() / cadence.max(1));
    for (index, item) in items.iter().enumerate() {
        cells.push(GridCell::Item(item));
        if enabled && cadence > 0 && (index + 1) % cadence == 0 {
            cells.push(GridCell::AdSlot { after: index });
        }
    }
    cells
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    fn numbered(n: usize) -> Vec<CatalogItem> {
        (0..n)
            .map(|i| CatalogItem {
                id: i as u64,
                title: format!("Anime {}", i),
                slug: format!("anime-{}", i),
                cover_image: None,
                media_type: None,
            })
            .collect()
    }

    proptest! {
        /// Exactly floor(n / cadence) slots are inserted
        #[test]
        fn property_slot_count_is_floor_of_cadence(n in 0usize..200, cadence in 1usize..30) {
            let list = numbered(n);
            let cells = interleave(&list, cadence, true);
            let slots = cells.iter().filter(|c| matches!(c, GridCell::AdSlot { .. })).count();
            prop_assert_eq!(slots, n / cadence);
            prop_assert_eq!(cells.len(), n + n / cadence);
        }

        #[test]
        fn property_item_order_is_preserved(n in 0usize..100) {
            let list = numbered(n);
            let order: Vec<u64> = interleave(&list, 12, true)
                .into_iter()
                .filter_map(|c| match c {
                    GridCell::Item(item) => Some(item.id),
                    GridCell::AdSlot { .. } => None,
                })
                .collect();
            prop_assert_eq!(order, (0..n as u64).collect::<Vec<_>>());
        }
    }
}
