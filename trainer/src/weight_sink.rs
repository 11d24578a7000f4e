use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use model::WeightBundle;

/// A destination for checkpoints.
pub trait WeightSink {
    fn publish(&self, bundle: WeightBundle) -> Result<()>;
}

impl<W: WeightSink + ?Sized> WeightSink for &W {
    fn publish(&self, bundle: WeightBundle) -> Result<()> {
        (**self).publish(bundle)
    }
}

impl<W: WeightSink + ?Sized> WeightSink for Arc<W> {
    fn publish(&self, bundle: WeightBundle) -> Result<()> {
        (**self).publish(bundle)
    }
}

/// Atomically replaces a weights file with every checkpoint.
#[derive(Clone, Debug)]
pub struct FileWeightSink {
    path: PathBuf,
}

impl FileWeightSink {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl WeightSink for FileWeightSink {
    fn publish(&self, bundle: WeightBundle) -> Result<()> {
        bundle.write(&self.path)
    }
}
