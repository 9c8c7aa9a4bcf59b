//! Deck CSV codec.
//!
//! # Input format
//! ```text
//! word|example|translation|example_translation|familiarity
//! sein|Ich bin müde.|to be|I am tired.|2
//! ```
//!
//! Input is pipe-separated so example sentences can carry commas freely.
//! Export is comma-separated for spreadsheets. The asymmetry is intentional.

use crate::types::{Deck, DeckItem};

/// Header row written by [`serialize`].
pub const EXPORT_HEADER: [&str; 5] = [
    "word",
    "example",
    "translation",
    "example_translation",
    "familiarity",
];

/// Suffix appended to the deck key to name an exported file.
pub const EXPORT_FILE_SUFFIX: &str = "-with-familiarity.csv";

const FIELD_SEPARATOR: char = '|';
const BOM: char = '\u{FEFF}';

/// Parse pipe-separated text into rows of raw cells.
pub fn parse(text: &str) -> Vec<Vec<String>> {
    let mut tokenizer = Tokenizer::new();
    for c in text.chars() {
        tokenizer.push(c);
    }
    tokenizer.finish()
}

struct Tokenizer {
    rows: Vec<Vec<String>>,
    row: Vec<String>,
    cell: String,
    in_quotes: bool,
    // A doubled quote inside quoted mode is only known on the next char.
    pending_quote: bool,
}

impl Tokenizer {
    fn new() -> Self {
        Self {
            rows: Vec::new(),
            row: Vec::new(),
            cell: String::new(),
            in_quotes: false,
            pending_quote: false,
        }
    }

    fn push(&mut self, c: char) {
        if self.pending_quote {
            self.pending_quote = false;
            if c == '"' {
                self.cell.push('"');
                return;
            }
            self.in_quotes = false;
        }

        if self.in_quotes {
            match c {
                '"' => self.pending_quote = true,
                _ => self.cell.push(c),
            }
            return;
        }

        match c {
            '"' => self.in_quotes = true,
            FIELD_SEPARATOR => self.end_cell(),
            '\n' => {
                self.end_cell();
                self.end_row();
            }
            '\r' => {}
            _ => self.cell.push(c),
        }
    }

    fn end_cell(&mut self) {
        self.row.push(std::mem::take(&mut self.cell));
    }

    fn end_row(&mut self) {
        self.rows.push(std::mem::take(&mut self.row));
    }

    fn finish(mut self) -> Vec<Vec<String>> {
        if !self.cell.is_empty() || !self.row.is_empty() {
            self.end_cell();
            self.end_row();
        }

        if let Some(first) = self.rows.first_mut().and_then(|row| row.first_mut()) {
            if let Some(stripped) = first.strip_prefix(BOM) {
                *first = stripped.to_string();
            }
        }

        self.rows
    }
}

/// Serialize a deck to comma-separated text with current familiarity values.
///
/// `familiarity` is called once per item and its result is rounded to the
/// nearest integer (halves round up). Rows are joined with `\n` and there is
/// no trailing newline.
pub fn serialize<F>(deck: &Deck, mut familiarity: F) -> String
where
    F: FnMut(&DeckItem) -> f64,
{
    let mut lines = Vec::with_capacity(deck.len() + 1);
    lines.push(EXPORT_HEADER.join(","));

    for item in &deck.items {
        let rating = round_half_up(familiarity(item)).to_string();
        let cells = [
            item.word.as_str(),
            item.example.as_str(),
            item.translation.as_str(),
            item.example_translation.as_str(),
            rating.as_str(),
        ];
        let line = cells
            .iter()
            .map(|cell| quote_cell(cell))
            .collect::<Vec<_>>()
            .join(",");
        lines.push(line);
    }

    lines.join("\n")
}

/// File name offered for an exported deck.
pub fn export_file_name(deck_key: &str) -> String {
    format!("{}{}", deck_key, EXPORT_FILE_SUFFIX)
}

fn quote_cell(cell: &str) -> String {
    if cell.contains([',', '"', '\n']) {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}

fn round_half_up(value: f64) -> i64 {
    if value.is_finite() {
        (value + 0.5).floor() as i64
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    fn item(id: u32, word: &str, translation: &str) -> DeckItem {
        DeckItem {
            id,
            word: word.to_string(),
            example: format!("{} example", word),
            translation: translation.to_string(),
            example_translation: String::new(),
            familiarity_default: 0.0,
        }
    }

    #[test]
    fn parse_pipe_rows() {
        let rows = parse("word|example\nsein|Ich bin müde.\n");
        assert_eq!(rows, vec![row(&["word", "example"]), row(&["sein", "Ich bin müde."])]);
    }

    #[test]
    fn parse_flushes_trailing_partial_row() {
        let rows = parse("word|example\nhaben|Wir haben Zeit.");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1], row(&["haben", "Wir haben Zeit."]));
    }

    #[test]
    fn parse_ignores_carriage_returns() {
        let rows = parse("a|b\r\nc|d\r\n");
        assert_eq!(rows, vec![row(&["a", "b"]), row(&["c", "d"])]);
    }

    #[test]
    fn parse_quoted_cell_with_separator_newline_and_escaped_quote() {
        let rows = parse("w|e\n\"a|b\"|\"line 1\nline 2 \"\"quoted\"\"\"\n");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1], row(&["a|b", "line 1\nline 2 \"quoted\""]));
    }

    #[test]
    fn parse_treats_commas_as_text() {
        let rows = parse("w|e\nja, nein|Ja, bitte.");
        assert_eq!(rows[1], row(&["ja, nein", "Ja, bitte."]));
    }

    #[test]
    fn parse_strips_leading_bom() {
        let rows = parse("\u{FEFF}word|example\n");
        assert_eq!(rows[0][0], "word");
    }

    #[test]
    fn parse_keeps_trailing_empty_cell() {
        let rows = parse("a|");
        assert_eq!(rows, vec![row(&["a", ""])]);
    }

    #[test]
    fn parse_empty_text() {
        assert!(parse("").is_empty());
    }

    #[test]
    fn serialize_quotes_commas_and_quotes() {
        let deck = Deck::new("d", vec![item(1, "Sie \"formal\"", "you, formal")]);
        let text = serialize(&deck, |_| 2.0);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "word,example,translation,example_translation,familiarity");
        assert_eq!(
            lines[1],
            "\"Sie \"\"formal\"\"\",\"Sie \"\"formal\"\" example\",\"you, formal\",,2"
        );
    }

    #[test]
    fn serialize_rounds_familiarity() {
        let deck = Deck::new("d", vec![item(1, "a", ""), item(2, "b", ""), item(3, "c", "")]);
        let values = [2.5, 3.4, 4.99];
        let text = serialize(&deck, |item| values[(item.id - 1) as usize]);
        let ratings: Vec<&str> = text
            .lines()
            .skip(1)
            .map(|line| line.rsplit(',').next().unwrap_or_default())
            .collect();
        assert_eq!(ratings, vec!["3", "3", "5"]);
    }

    #[test]
    fn serialize_empty_deck_is_header_only() {
        let text = serialize(&Deck::empty(), |_| 0.0);
        assert_eq!(text, "word,example,translation,example_translation,familiarity");
    }

    #[test]
    fn export_file_name_uses_deck_key() {
        assert_eq!(export_file_name("verbs"), "verbs-with-familiarity.csv");
    }
}
