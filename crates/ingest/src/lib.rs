mod batch;
mod extract;
mod normalize;
mod pipeline;
mod types;

pub use batch::{batch_date_from_filename, collect_extract_paths, validate_batch};
pub use extract::{ParsedExtract, read_extract, records_from_reader};
pub use normalize::{Normalized, Normalizer};
pub use pipeline::ingest_files;
pub use types::{IngestError, IngestIssue, IngestStats, Result};
