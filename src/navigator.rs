//! Directory traversal intents.
//!
//! The navigator only computes target paths and publishes requests. The
//! listing is swapped when the matching `DirectoryRead` response arrives.

use tracing::debug;

use crate::error::{AppError, Result};
use crate::events::{EventChannel, RequestId, Topic};
use crate::filesystem::{Entry, path};

/// Request to read the directory `selected` points at.
pub fn plan_enter(selected: &Entry) -> Result<Topic> {
    if !selected.is_dir {
        return Err(AppError::InvalidSelection(format!(
            "{} is not a directory",
            selected.name
        )));
    }
    Ok(Topic::EnterDirectory {
        target: path::normalize(&selected.full_path)?,
    })
}

/// Request to read the parent of `current_path`; the root maps to itself.
pub fn plan_leave(current_path: &str) -> Result<Topic> {
    Ok(Topic::LeaveDirectory {
        from: current_path.to_string(),
        target: path::normalize(&format!("{current_path}/.."))?,
    })
}

pub fn enter(channel: &mut EventChannel, current_path: &str, selected: &Entry) -> Result<RequestId> {
    let topic = plan_enter(selected)?;
    debug!("Entering from {}: {:?}", current_path, topic);
    channel.publish(topic)
}

pub fn leave(channel: &mut EventChannel, current_path: &str) -> Result<RequestId> {
    let topic = plan_leave(current_path)?;
    debug!("Leaving {}: {:?}", current_path, topic);
    channel.publish(topic)
}

/// Rows to display for a freshly read directory: everything except the root
/// gets a leading `..` entry.
pub fn listing_rows(dir: &str, entries: Vec<Entry>) -> Vec<Entry> {
    if dir == "/" {
        return entries;
    }
    let mut rows = Vec::with_capacity(entries.len() + 1);
    rows.push(Entry::parent_of(dir));
    rows.extend(entries);
    rows
}
