//! Familiarity rating commands.

use super::{lock_session, CommandError};
use crate::db::StoredEntry;
use crate::state::AppState;

/// Rate a row from the star widget. Returns the stored, clamped value.
pub async fn set_familiarity(index: usize, value: f64, state: &AppState) -> Result<f64, CommandError> {
    let mut session = lock_session(state)?;
    Ok(session.rate_item(index, value)?)
}

/// Stored ratings of the active deck, ordered by key.
pub async fn get_rated_items(state: &AppState) -> Result<Vec<StoredEntry>, CommandError> {
    let prefix = {
        let session = lock_session(state)?;
        session.familiarity().deck_prefix(session.deck_key())
    };
    Ok(state.store.entries_with_prefix(&prefix)?)
}
