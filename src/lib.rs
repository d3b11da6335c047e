//! # `binveldb-core`
//!
//! Disk-resident, binary-quantized vector search engine.
//!
//! Every document is embedded at three precisions — float, int8, and a
//! packed 1-bit-per-dimension binary form. Indexing keeps only the binary
//! form resident for fast approximate shortlisting; the float and int8
//! vectors live in an append-only document store and are pulled back only
//! for the handful of candidates that survive each rescoring phase.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use binveldb_core::{Database, OpenOptions};
//!
//! let db = Database::open("./data", Box::new(my_oracle), OpenOptions::default())?;
//! db.add_documents(&[1, 2], &docs, |d| Ok(String::from_utf8(d.to_vec())?), 256, true, None, None)?;
//! let hits = db.search("query text", 10, 8, 4, None)?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cancel;
pub mod config;
pub mod database;
pub mod docstore;
pub mod error;
pub mod oracle;
pub mod packed;
pub mod progress;
pub mod record;

pub use cancel::CancellationToken;
pub use config::Config;
pub use database::{Database, OpenOptions, SearchHit, CREDENTIAL_ENV_VAR, DEFAULT_BATCH_SIZE};
pub use error::{Error, Result};
pub use oracle::{Embedding, EmbeddingOracle, Precisions, Role};
pub use packed::BinaryIndex;
pub use progress::{NoopProgress, ProgressSink};
pub use record::DocRecord;
