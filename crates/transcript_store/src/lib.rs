mod error;
mod paths;
mod store;

pub use error::TranscriptStoreError;
pub use paths::{transcript_path, TRANSCRIPT_EXTENSION};
pub use store::{render_transcript, save_transcript};
