use std::path::{Path, PathBuf};

use anyhow::Result;
use common::{read_json, write_json_atomic};
use log::{info, warn};
use model::TrainingTriplet;
use parking_lot::Mutex;
use replay_buffer::ReplayBuffer;

/// The aggregate of every reported triplet, trimmed to the newest `max_triplets` and
/// mirrored to disk after each append.
pub struct TripletStore {
    path: PathBuf,
    buffer: Mutex<ReplayBuffer<TrainingTriplet>>,
}

impl TripletStore {
    /// Opens the store at `path`. A missing or unreadable file starts the store empty.
    pub fn open(path: PathBuf, max_triplets: usize) -> Self {
        let entries = if path.is_file() {
            match read_triplets(&path) {
                Ok(entries) => {
                    info!("Loaded {} triplets from {:?}", entries.len(), path);
                    entries
                }
                Err(err) => {
                    warn!(
                        "Triplets at {:?} could not be read, starting empty: {:#}",
                        path, err
                    );
                    Vec::new()
                }
            }
        } else {
            Vec::new()
        };

        Self {
            path,
            buffer: Mutex::new(ReplayBuffer::from_entries(max_triplets, entries)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends a report and persists the trimmed aggregate, returning the number of stored
    /// triplets. The in-memory aggregate only changes once the file has been replaced.
    pub fn append(&self, triplets: &[TrainingTriplet]) -> Result<usize> {
        let mut buffer = self.buffer.lock();

        let mut next = buffer.clone();
        next.extend(triplets.iter().cloned());

        let entries = next.iter().collect::<Vec<_>>();
        write_json_atomic(&self.path, &entries)?;

        *buffer = next;

        Ok(buffer.len())
    }

    pub fn len(&self) -> usize {
        self.buffer.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn snapshot(&self) -> Vec<TrainingTriplet> {
        self.buffer.lock().iter().cloned().collect()
    }
}

/// Reads an aggregate triplets file as written by the store.
pub fn read_triplets(path: &Path) -> Result<Vec<TrainingTriplet>> {
    read_json(path)
}
