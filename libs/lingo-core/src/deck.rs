//! In-memory deck ownership and deck construction from CSV rows.

use crate::error::{DeckError, Result};
use crate::familiarity::parse_number;
use crate::types::{Deck, DeckItem, DEFAULT_DECK_KEY};
use std::path::Path;
use std::sync::Arc;

/// Column positions resolved from a header row.
#[derive(Debug, Clone, Copy)]
struct Columns {
    word: usize,
    example: usize,
    translation: Option<usize>,
    example_translation: Option<usize>,
    familiarity: Option<usize>,
}

impl Columns {
    fn from_header(header: &[String]) -> Result<Self> {
        let names: Vec<String> = header.iter().map(|h| h.trim().to_lowercase()).collect();
        let find = |name: &str| names.iter().position(|n| n == name);

        let word = find("word")
            .or_else(|| find("words"))
            .ok_or(DeckError::MissingColumn { column: "word" })?;
        let example = find("example").ok_or(DeckError::MissingColumn { column: "example" })?;

        Ok(Self {
            word,
            example,
            translation: find("translation"),
            example_translation: find("example_translation"),
            familiarity: find("familiarity"),
        })
    }
}

fn cell(row: &[String], index: usize) -> String {
    row.get(index).cloned().unwrap_or_default()
}

fn optional_cell(row: &[String], index: Option<usize>) -> String {
    index.map(|i| cell(row, i)).unwrap_or_default()
}

fn is_blank(row: &[String]) -> bool {
    row.iter().all(|c| c.trim().is_empty())
}

/// Derive a deck key from a source file name: the file stem, or `default`.
pub fn deck_key_from_file_name(file_name: &str) -> String {
    Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_DECK_KEY)
        .to_string()
}

/// Holds the active deck and the cached display order over it.
#[derive(Debug, Default)]
pub struct DeckRepository {
    deck: Arc<Deck>,
    filtered: Vec<usize>,
}

impl DeckRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a deck from parsed rows; the first row is the header.
    ///
    /// Rows whose cells are all blank are dropped before ids are assigned,
    /// so ids are `1..=N` over the surviving rows in source order.
    pub fn build_deck(rows: &[Vec<String>], deck_key: &str) -> Result<Deck> {
        let (header, body) = rows.split_first().ok_or(DeckError::EmptyCsv)?;
        let columns = Columns::from_header(header)?;

        let items = body
            .iter()
            .filter(|row| !is_blank(row))
            .enumerate()
            .map(|(i, row)| DeckItem {
                id: (i + 1) as u32,
                word: cell(row, columns.word),
                example: cell(row, columns.example),
                translation: optional_cell(row, columns.translation),
                example_translation: optional_cell(row, columns.example_translation),
                familiarity_default: columns
                    .familiarity
                    .and_then(|i| parse_number(&cell(row, i)))
                    .unwrap_or(0.0),
            })
            .collect();

        Ok(Deck::new(deck_key, items))
    }

    /// Replace the deck wholesale and drop the cached display order.
    pub fn set_deck(&mut self, deck: Deck) {
        self.deck = Arc::new(deck);
        self.filtered.clear();
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    /// Shared handle to the current deck, for work that outlives a borrow.
    pub fn shared_deck(&self) -> Arc<Deck> {
        Arc::clone(&self.deck)
    }

    pub fn deck_key(&self) -> &str {
        &self.deck.key
    }

    pub fn row(&self, index: usize) -> Option<&DeckItem> {
        self.deck.get(index)
    }

    /// Cached display order, empty until a view has been computed.
    pub fn filtered_indices(&self) -> &[usize] {
        &self.filtered
    }

    /// Replace the cached display order. Out-of-range indices are dropped.
    pub fn set_filtered_order(&mut self, order: Vec<usize>) {
        let len = self.deck.len();
        self.filtered = order.into_iter().filter(|&i| i < len).collect();
    }
}
