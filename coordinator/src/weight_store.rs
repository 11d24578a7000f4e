use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arc_swap::ArcSwapOption;
use axum::body::Bytes;
use log::{info, warn};
use model::WeightBundle;
use parking_lot::Mutex;
use trainer::WeightSink;

/// A bundle together with its serialized form, so every read can be served without
/// re-encoding.
#[derive(Debug)]
pub struct PublishedWeights {
    pub bundle: WeightBundle,
    pub body: Bytes,
}

impl PublishedWeights {
    fn new(bundle: WeightBundle) -> Result<Self> {
        let body = Bytes::from(bundle.to_vec()?);

        Ok(Self { bundle, body })
    }
}

/// The latest persisted weights. Publishing is serialized by a mutex while readers
/// load the current snapshot without locking.
pub struct WeightStore {
    path: PathBuf,
    write_lock: Mutex<()>,
    current: ArcSwapOption<PublishedWeights>,
}

impl WeightStore {
    /// Opens the store at `path`. A missing or unreadable file leaves the store empty.
    pub fn open(path: PathBuf) -> Self {
        let current = if path.is_file() {
            match WeightBundle::read(&path).and_then(PublishedWeights::new) {
                Ok(published) => {
                    info!(
                        "Loaded weights version {} from {:?}",
                        published.bundle.version, path
                    );
                    Some(Arc::new(published))
                }
                Err(err) => {
                    warn!(
                        "Weights at {:?} could not be read, treating as no weights persisted: {:#}",
                        path, err
                    );
                    None
                }
            }
        } else {
            None
        };

        Self {
            path,
            write_lock: Mutex::new(()),
            current: ArcSwapOption::new(current),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn current(&self) -> Option<Arc<PublishedWeights>> {
        self.current.load_full()
    }

    pub fn current_bundle(&self) -> Option<WeightBundle> {
        self.current().map(|published| published.bundle.clone())
    }
}

impl WeightSink for WeightStore {
    fn publish(&self, bundle: WeightBundle) -> Result<()> {
        bundle.validate()?;
        let version = bundle.version;
        let published = PublishedWeights::new(bundle)?;

        let _guard = self.write_lock.lock();

        published
            .bundle
            .write(&self.path)
            .with_context(|| format!("Failed to persist weights version {}", version))?;

        self.current.store(Some(Arc::new(published)));

        info!("Published weights version {} to {:?}", version, self.path);

        Ok(())
    }
}
