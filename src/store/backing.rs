use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::Local;

use super::StoreError;
use crate::models::Note;

/// The whole persisted state: user id string -> notes in creation order.
pub type Snapshot = BTreeMap<String, Vec<Note>>;

/// Where the serialized snapshot lives.
#[derive(Debug)]
pub(crate) enum Backing {
    File(PathBuf),
    /// Serialized text kept in memory. Goes through the same parse path as
    /// the file backing so corrupt-state handling behaves identically.
    Memory(Option<String>),
}

impl Backing {
    /// Load the snapshot. Absent storage is an empty store; so is unreadable
    /// storage, after it has been moved out of the way.
    pub(crate) fn read(&mut self) -> Result<Snapshot, StoreError> {
        let text = match self {
            Self::File(path) => match fs::read_to_string(&*path) {
                Ok(text) => text,
                Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Snapshot::new()),
                Err(source) => {
                    return Err(StoreError::Io {
                        path: path.clone(),
                        source,
                    })
                }
            },
            Self::Memory(Some(text)) => text.clone(),
            Self::Memory(None) => return Ok(Snapshot::new()),
        };

        if text.trim().is_empty() {
            return Ok(Snapshot::new());
        }

        match serde_json::from_str(&text) {
            Ok(snapshot) => Ok(snapshot),
            Err(e) => {
                tracing::warn!("Note store is unreadable, starting from an empty store: {}", e);
                self.quarantine();
                Ok(Snapshot::new())
            }
        }
    }

    pub(crate) fn write(&mut self, snapshot: &Snapshot) -> Result<(), StoreError> {
        let text = serde_json::to_string_pretty(snapshot)?;
        match self {
            Self::File(path) => write_atomic(path, text.as_bytes()).map_err(|source| {
                StoreError::Io {
                    path: path.clone(),
                    source,
                }
            }),
            Self::Memory(slot) => {
                *slot = Some(text);
                Ok(())
            }
        }
    }

    /// Keep an unreadable snapshot around for manual recovery instead of
    /// letting the next write overwrite it.
    fn quarantine(&mut self) {
        match self {
            Self::File(path) => {
                let backup = backup_path(path);
                match fs::rename(&*path, &backup) {
                    Ok(()) => tracing::warn!("Moved unreadable note store to {}", backup.display()),
                    Err(e) => tracing::error!(
                        "Failed to move unreadable note store to {}: {}",
                        backup.display(),
                        e
                    ),
                }
            }
            Self::Memory(slot) => *slot = None,
        }
    }
}

fn backup_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "notes.json".to_string());
    let stamp = Local::now().format("%Y%m%d%H%M%S");
    path.with_file_name(format!("{}.corrupt-{}", name, stamp))
}

/// Write via a sibling temp file and rename, so a crash mid-write never
/// leaves a truncated snapshot behind.
fn write_atomic(dest: &Path, bytes: &[u8]) -> io::Result<()> {
    let parent = dest
        .parent()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "path has no parent"))?;
    let file_name = dest
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "path has no filename"))?;

    let tmp = parent.join(format!(
        ".{}.tmp.{}",
        file_name.to_string_lossy(),
        std::process::id()
    ));

    let written = File::create(&tmp).and_then(|mut f| {
        f.write_all(bytes)?;
        f.sync_all()
    });
    if let Err(e) = written.and_then(|()| fs::rename(&tmp, dest)) {
        let _ = fs::remove_file(&tmp);
        return Err(e);
    }
    Ok(())
}
