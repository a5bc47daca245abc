//! In-memory codec for exercising the engine without touching image files

use crate::codec::Codec;
use crate::error::MarkError;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Decodes a path to its own string and records every encode target.
///
/// Paths containing `corrupt` fail to decode, targets containing
/// `readonly` fail to encode.
#[derive(Debug, Default)]
pub struct FakeCodec {
    stored: Mutex<Vec<PathBuf>>,
}

impl FakeCodec {
    pub fn stored(&self) -> Vec<PathBuf> {
        self.stored.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

fn io_failure(kind: &str) -> image::ImageError {
    image::ImageError::IoError(std::io::Error::other(kind.to_string()))
}

impl Codec for FakeCodec {
    type Image = String;

    fn decode(&self, path: &Path) -> Result<String, MarkError> {
        let name = path.display().to_string();
        if name.contains("corrupt") {
            return Err(MarkError::Decode {
                path: path.to_path_buf(),
                source: io_failure("corrupt input"),
            });
        }
        Ok(name)
    }

    fn apply_mark(&self, image: &mut String, _source: &Path) -> Result<(), MarkError> {
        image.push_str("+mark");
        Ok(())
    }

    fn encode(&self, _image: &String, path: &Path) -> Result<(), MarkError> {
        if path.display().to_string().contains("readonly") {
            return Err(MarkError::Encode {
                path: path.to_path_buf(),
                source: io_failure("read-only target"),
            });
        }
        if let Ok(mut stored) = self.stored.lock() {
            stored.push(path.to_path_buf());
        }
        Ok(())
    }
}
