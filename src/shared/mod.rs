pub mod paths;

pub use paths::{DEFAULT_OUTPUT_PREFIX, DirectoryInput, InputSource, list_entries, output_path};
