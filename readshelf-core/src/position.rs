//! Reading position tracking
//!
//! Updates are partial: each field present in a [`PositionUpdate`] replaces
//! the stored one, absent fields are kept. An out-of-range percentage rejects
//! the whole update. Concurrent updates are last-write-wins; callers that need
//! more must serialize updates per book.

use crate::error::PositionError;
use crate::types::{PositionUpdate, ReadingPosition};
use chrono::{DateTime, Utc};

/// Check that a percentage lies in `0.0..=1.0` (NaN is rejected)
pub fn validate_percentage(percentage: f64) -> Result<(), PositionError> {
    if (0.0..=1.0).contains(&percentage) {
        Ok(())
    } else {
        Err(PositionError::PercentageOutOfRange(percentage))
    }
}

/// Merge an update into a position, stamping it with the current time
pub fn apply_update(
    current: &ReadingPosition,
    update: PositionUpdate,
) -> Result<ReadingPosition, PositionError> {
    apply_update_at(current, update, Utc::now())
}

/// Merge an update into a position, stamping it with `now`
pub fn apply_update_at(
    current: &ReadingPosition,
    update: PositionUpdate,
    now: DateTime<Utc>,
) -> Result<ReadingPosition, PositionError> {
    if let Some(percentage) = update.percentage {
        validate_percentage(percentage)?;
    }

    let mut next = current.clone();

    if let Some(token) = update.exact_location_token {
        next.exact_location_token = Some(token);
    }
    if let Some(chapter) = update.chapter_index {
        next.chapter_index = Some(chapter);
    }
    if let Some(percentage) = update.percentage {
        next.percentage = percentage;
    }
    if let Some(backup) = update.numeric_location_backup {
        next.numeric_location_backup = Some(backup);
    }
    if let Some(cache) = update.locations_cache {
        next.locations_cache = Some(cache);
    }

    next.last_read_timestamp = Some(now);
    Ok(next)
}
