//! Flat JSON persistence for ticket collections and run outputs.
//!
//! Files are pretty-printed JSON arrays. Writes go to a sibling temp file
//! that is renamed over the target, so a reader never observes a
//! half-written document.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tracing::{debug, warn};

use crate::ticket::Ticket;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("ticket {index} in {path} is invalid: {message}")]
    InvalidTicket {
        path: PathBuf,
        index: usize,
        message: String,
    },
}

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> StoreError + '_ {
    move |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn json_err(path: &Path) -> impl FnOnce(serde_json::Error) -> StoreError + '_ {
    move |source| StoreError::Json {
        path: path.to_path_buf(),
        source,
    }
}

/// Read and deserialize a JSON document.
pub async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, StoreError> {
    let bytes = fs::read(path).await.map_err(io_err(path))?;
    serde_json::from_slice(&bytes).map_err(json_err(path))
}

/// Read a JSON document if it exists.
pub async fn read_json_if_exists<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StoreError> {
    match fs::try_exists(path).await.map_err(io_err(path))? {
        true => read_json(path).await.map(Some),
        false => Ok(None),
    }
}

/// Serialize `value` and atomically replace `path`.
///
/// Missing parent directories are created.
pub async fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), StoreError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await.map_err(io_err(parent))?;
    }

    let mut bytes = serde_json::to_vec_pretty(value).map_err(json_err(path))?;
    bytes.push(b'\n');

    let tmp = temp_path(path);
    fs::write(&tmp, &bytes).await.map_err(io_err(&tmp))?;
    if let Err(e) = fs::rename(&tmp, path).await {
        let _ = fs::remove_file(&tmp).await;
        return Err(io_err(path)(e));
    }

    debug!(path = %path.display(), bytes = bytes.len(), "Wrote JSON document");
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// A stored record that does not type as a ticket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectedTicket {
    /// Position in the stored array.
    pub index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticket_id: Option<String>,
    pub message: String,
}

/// A ticket collection as loaded from disk.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TicketCollection {
    /// Records that typed, in stored order.
    pub tickets: Vec<Ticket>,
    pub rejected: Vec<RejectedTicket>,
}

/// Load a ticket collection, setting aside records that fail to type.
///
/// Each rejected record is logged at `warn`.
pub async fn load_ticket_collection(path: &Path) -> Result<TicketCollection, StoreError> {
    let records: Vec<Value> = read_json(path).await?;
    let mut collection = TicketCollection::default();

    for (index, record) in records.into_iter().enumerate() {
        let ticket_id = record
            .get("ticket_id")
            .and_then(Value::as_str)
            .map(str::to_string);
        match serde_json::from_value::<Ticket>(record) {
            Ok(ticket) => collection.tickets.push(ticket),
            Err(e) => {
                warn!(
                    path = %path.display(),
                    index,
                    ticket_id = ticket_id.as_deref().unwrap_or("<none>"),
                    error = %e,
                    "Skipping invalid ticket record"
                );
                collection.rejected.push(RejectedTicket {
                    index,
                    ticket_id,
                    message: e.to_string(),
                });
            }
        }
    }

    Ok(collection)
}

/// Load a ticket collection, typing every record.
///
/// The first record that fails to type is reported with its position.
pub async fn load_tickets(path: &Path) -> Result<Vec<Ticket>, StoreError> {
    let collection = load_ticket_collection(path).await?;
    match collection.rejected.into_iter().next() {
        Some(rejected) => Err(StoreError::InvalidTicket {
            path: path.to_path_buf(),
            index: rejected.index,
            message: rejected.message,
        }),
        None => Ok(collection.tickets),
    }
}
