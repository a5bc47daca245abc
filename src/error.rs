//! Error taxonomy for markfarm
//!
//! Configuration and directory errors are fatal for a run. Decode, encode
//! and mark errors are scoped to a single job: the lane that hits one drops
//! the job and keeps going.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MarkError {
    /// Bad command line or settings, detected before any thread starts
    #[error("{0}")]
    Configuration(String),

    /// The layered configuration could not be extracted
    #[error("invalid configuration: {0}")]
    Config(#[from] Box<figment::Error>),

    /// The input directory could not be listed
    #[error("cannot open image directory {}: {source}", path.display())]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An input could not be read or is not a supported image
    #[error("cannot load {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// A marked image could not be written
    #[error("cannot store {}: {source}", path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// The mark could not be applied to an image
    #[error("cannot mark {}: {reason}", path.display())]
    Mark { path: PathBuf, reason: String },

    /// A thread of the run panicked
    #[error("worker failure: {0}")]
    Worker(String),
}

impl MarkError {
    pub fn configuration(message: impl Into<String>) -> Self {
        MarkError::Configuration(message.into())
    }

    /// Errors a lane recovers from by dropping the job
    pub fn is_per_job(&self) -> bool {
        matches!(
            self,
            MarkError::Decode { .. } | MarkError::Encode { .. } | MarkError::Mark { .. }
        )
    }
}

impl From<figment::Error> for MarkError {
    fn from(err: figment::Error) -> Self {
        MarkError::Config(Box::new(err))
    }
}
