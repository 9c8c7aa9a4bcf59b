//! Deck loading, view and export commands.

use super::{lock_session, CommandError};
use crate::state::AppState;
use lingo_core::{DeckSession, FamiliarityRange, LoadSummary, SortSpec};
use std::fs;
use std::path::{Path, PathBuf};

/// One displayed row.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ViewRow {
    pub index: usize,
    pub id: u32,
    pub word: String,
    pub example: String,
    pub translation: String,
    pub example_translation: String,
    pub familiarity: f64,
}

/// The filtered, sorted deck as the rendering layer shows it.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct DeckView {
    pub deck_key: String,
    pub total: usize,
    pub filter: FamiliarityRange,
    pub sort: SortSpec,
    pub rows: Vec<ViewRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ExportResult {
    pub file_name: String,
    pub path: PathBuf,
}

fn build_view(session: &mut DeckSession) -> DeckView {
    let order = session.view().to_vec();
    let rows = order
        .into_iter()
        .filter_map(|index| {
            let item = session.row(index)?;
            Some(ViewRow {
                index,
                id: item.id,
                word: item.word.clone(),
                example: item.example.clone(),
                translation: item.translation.clone(),
                example_translation: item.example_translation.clone(),
                familiarity: session.familiarity_of(index)?,
            })
        })
        .collect();

    DeckView {
        deck_key: session.deck_key().to_string(),
        total: session.deck().len(),
        filter: session.filter(),
        sort: session.sort(),
        rows,
    }
}

/// Load a pipe-separated CSV file as the active deck.
pub async fn import_file(file_path: &str, state: &AppState) -> Result<LoadSummary, CommandError> {
    let path = Path::new(file_path);
    let content = fs::read_to_string(path)?;
    let file_name = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or_default();

    load_deck_text(&content, file_name, state).await
}

/// Load deck text received from a drop or picker.
pub async fn load_deck_text(
    text: &str,
    file_name: &str,
    state: &AppState,
) -> Result<LoadSummary, CommandError> {
    let mut session = lock_session(state)?;
    Ok(session.load_csv(text, file_name)?)
}

/// Get the current view.
pub async fn get_view(state: &AppState) -> Result<DeckView, CommandError> {
    let mut session = lock_session(state)?;
    Ok(build_view(&mut session))
}

/// Set the familiarity filter. Bounds may be given in either order.
pub async fn set_filter(min: f64, max: f64, state: &AppState) -> Result<DeckView, CommandError> {
    let mut session = lock_session(state)?;
    session.set_filter(FamiliarityRange::new(min, max));
    Ok(build_view(&mut session))
}

pub async fn set_sort(sort: SortSpec, state: &AppState) -> Result<DeckView, CommandError> {
    let mut session = lock_session(state)?;
    session.set_sort(sort);
    Ok(build_view(&mut session))
}

/// Replace the display order, e.g. after a manual re-sort in the table.
pub async fn set_view_order(order: Vec<usize>, state: &AppState) -> Result<DeckView, CommandError> {
    let mut session = lock_session(state)?;
    session.set_view_order(order);
    Ok(build_view(&mut session))
}

/// Write the deck with current familiarity to the export directory.
///
/// Returns `None` when no deck is loaded.
pub async fn export_deck(state: &AppState) -> Result<Option<ExportResult>, CommandError> {
    let exported = lock_session(state)?.export();
    let Some(exported) = exported else {
        return Ok(None);
    };

    fs::create_dir_all(&state.config.export_dir)?;
    let path = state.config.export_dir.join(&exported.file_name);
    fs::write(&path, exported.contents)?;
    tracing::info!(path = %path.display(), "deck exported");

    Ok(Some(ExportResult {
        file_name: exported.file_name,
        path,
    }))
}
