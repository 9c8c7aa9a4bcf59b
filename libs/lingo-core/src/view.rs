//! Filtered and sorted display order over a deck.

use crate::familiarity::FamiliarityStore;
use crate::types::{Deck, FamiliarityRange, SortColumn, SortDirection, SortSpec};
use std::cmp::Ordering;

/// Deck indices whose familiarity lies within `range`, ordered by `sort`.
///
/// Familiarity ties are broken by original deck index in both directions.
/// The view is recomputed from scratch on every call.
pub fn compute_view(
    deck: &Deck,
    familiarity: &FamiliarityStore,
    range: FamiliarityRange,
    sort: SortSpec,
) -> Vec<usize> {
    let mut rows: Vec<(usize, f64)> = deck
        .items
        .iter()
        .enumerate()
        .map(|(i, item)| (i, familiarity.get(&deck.key, item.id, item.familiarity_default)))
        .filter(|&(_, value)| range.contains(value))
        .collect();

    rows.sort_by(|a, b| compare(a, b, sort));
    rows.into_iter().map(|(i, _)| i).collect()
}

fn compare(a: &(usize, f64), b: &(usize, f64), sort: SortSpec) -> Ordering {
    let by_column = match sort.column {
        SortColumn::Ordinal => a.0.cmp(&b.0),
        SortColumn::Familiarity => a.1.total_cmp(&b.1),
    };
    let by_column = match sort.direction {
        SortDirection::Asc => by_column,
        SortDirection::Desc => by_column.reverse(),
    };
    by_column.then_with(|| a.0.cmp(&b.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::types::DeckItem;
    use std::sync::Arc;

    fn deck(defaults: &[f64]) -> Deck {
        let items = defaults
            .iter()
            .enumerate()
            .map(|(i, &f)| DeckItem {
                id: (i + 1) as u32,
                word: format!("w{}", i),
                example: String::new(),
                translation: String::new(),
                example_translation: String::new(),
                familiarity_default: f,
            })
            .collect();
        Deck::new("view", items)
    }

    fn store() -> FamiliarityStore {
        FamiliarityStore::new(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn filter_accepts_reversed_bounds() {
        let deck = deck(&[0.0, 1.0, 2.0, 3.0, 5.0]);
        let fam = store();
        let asc = compute_view(&deck, &fam, FamiliarityRange::new(1.0, 3.0), SortSpec::default());
        let rev = compute_view(&deck, &fam, FamiliarityRange::new(3.0, 1.0), SortSpec::default());
        assert_eq!(asc, vec![1, 2, 3]);
        assert_eq!(asc, rev);
    }

    #[test]
    fn filter_uses_stored_value_over_default() {
        let deck = deck(&[0.0, 0.0]);
        let fam = store();
        fam.set("view", 2, 4.5).unwrap();
        let view = compute_view(&deck, &fam, FamiliarityRange::new(4.0, 5.0), SortSpec::default());
        assert_eq!(view, vec![1]);
    }

    #[test]
    fn ordinal_descending_reverses_deck_order() {
        let deck = deck(&[1.0, 1.0, 1.0]);
        let sort = SortSpec::new(SortColumn::Ordinal, SortDirection::Desc);
        let view = compute_view(&deck, &store(), FamiliarityRange::default(), sort);
        assert_eq!(view, vec![2, 1, 0]);
    }

    #[test]
    fn familiarity_sort_breaks_ties_by_index() {
        let deck = deck(&[2.0, 1.0, 2.0, 0.5]);
        let fam = store();

        let asc = SortSpec::new(SortColumn::Familiarity, SortDirection::Asc);
        assert_eq!(compute_view(&deck, &fam, FamiliarityRange::default(), asc), vec![3, 1, 0, 2]);

        let desc = SortSpec::new(SortColumn::Familiarity, SortDirection::Desc);
        assert_eq!(compute_view(&deck, &fam, FamiliarityRange::default(), desc), vec![0, 2, 1, 3]);
    }

    #[test]
    fn fractional_values_compare_without_rounding() {
        let deck = deck(&[2.95, 3.0]);
        let view = compute_view(&deck, &store(), FamiliarityRange::new(3.0, 5.0), SortSpec::default());
        assert_eq!(view, vec![1]);
    }
}
