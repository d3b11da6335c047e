//! The database facade: coordinates the embedding oracle, the binary index,
//! and the document store behind the add/search/remove contract.

use crate::cancel::CancellationToken;
use crate::config::{Config, DEFAULT_DIM};
use crate::docstore::DocStore;
use crate::error::{Error, Result};
use crate::oracle::{EmbeddingOracle, Precisions, Role};
use crate::packed::BinaryIndex;
use crate::progress::ProgressSink;
use crate::record::DocRecord;
use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// The environment variable the oracle credential is expected in.
pub const CREDENTIAL_ENV_VAR: &str = "EMBEDDING_API_KEY";

/// Default batch size for `add_documents`, matching the embedding
/// provider's typical per-call text limit.
pub const DEFAULT_BATCH_SIZE: usize = 960;

/// Options accepted when opening or creating a database.
#[derive(Debug, Clone)]
pub struct OpenOptions {
    /// Embedding model name, recorded in `config.json` on first creation.
    pub model: String,
    /// Vector dimension, recorded in `config.json` on first creation.
    pub dim: usize,
}

impl Default for OpenOptions {
    fn default() -> Self {
        Self {
            model: "default".to_string(),
            dim: DEFAULT_DIM,
        }
    }
}

/// One ranked search result.
#[derive(Debug, Clone)]
pub struct SearchHit {
    /// The matching document's id.
    pub doc_id: i64,
    /// Phase I Hamming distance (lower is closer).
    pub score_hamming: u32,
    /// Phase II float-query / unpacked-binary dot product.
    pub score_binary: f32,
    /// Phase III float-query / int8-doc cosine-like score, normalized only
    /// by the document's norm. Not a true cosine similarity unless the
    /// oracle already normalizes query vectors.
    pub score_cossim: f32,
    /// The document's opaque payload bytes.
    pub doc: Vec<u8>,
}

/// Coordinates the embedding oracle, binary index, and document store.
pub struct Database {
    path: PathBuf,
    config: Config,
    oracle: Box<dyn EmbeddingOracle>,
    index: RwLock<BinaryIndex>,
    docs: DocStore,
}

impl Database {
    /// Opens the database at `path`, creating it if the directory is empty.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingCredential`] if [`CREDENTIAL_ENV_VAR`] is
    /// unset, [`Error::CorruptOrForeignDirectory`] if `path` has files but
    /// no valid `config.json`, or [`Error::StorageFailure`] on I/O failure.
    pub fn open(
        path: impl AsRef<Path>,
        oracle: Box<dyn EmbeddingOracle>,
        options: OpenOptions,
    ) -> Result<Self> {
        if std::env::var(CREDENTIAL_ENV_VAR).is_err() {
            return Err(Error::MissingCredential(CREDENTIAL_ENV_VAR.to_string()));
        }

        let path = path.as_ref().to_path_buf();
        let config = Config::load_or_create(&path, &options.model, options.dim)?;

        let index_path = path.join("index.bin");
        let mut index = if index_path.exists() {
            BinaryIndex::load(&index_path)?
        } else {
            BinaryIndex::new(config.dim)
        };

        let docs = DocStore::open(path.join("docs"), config.dim)?;

        reconcile(&mut index, &docs);

        tracing::info!(path = %path.display(), docs = docs.len(), "database opened");

        Ok(Self {
            path,
            config,
            oracle,
            index: RwLock::new(index),
            docs,
        })
    }

    /// The database's configuration, as recorded at creation time.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Adds or updates documents.
    ///
    /// `docs2text` projects each opaque payload to the text the oracle will
    /// embed; `docs` itself is stored verbatim as the payload. Ids already
    /// present are removed from both stores before the new versions are
    /// added (upsert semantics — there is no separate update operation).
    ///
    /// `cancel`, if given, is checked before each chunk's oracle call; a
    /// cancellation request leaves the chunks already committed in place and
    /// returns [`Error::Cancelled`] rather than rolling them back.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LengthMismatch`] if `doc_ids.len() != docs.len()`,
    /// [`Error::Cancelled`] if `cancel` was requested before a chunk's oracle
    /// call, and propagates `docs2text` failures, oracle failures, and
    /// storage failures.
    #[allow(clippy::too_many_arguments)]
    pub fn add_documents(
        &self,
        doc_ids: &[i64],
        docs: &[Vec<u8>],
        docs2text: impl Fn(&[u8]) -> Result<String>,
        batch_size: usize,
        save: bool,
        progress: Option<&dyn ProgressSink>,
        cancel: Option<&CancellationToken>,
    ) -> Result<()> {
        if doc_ids.len() != docs.len() {
            return Err(Error::LengthMismatch {
                ids: doc_ids.len(),
                docs: docs.len(),
            });
        }
        if doc_ids.is_empty() {
            return Ok(());
        }

        let texts: Vec<String> = docs.iter().map(|doc| docs2text(doc)).collect::<Result<_>>()?;

        // Upsert: remove any existing version of each id before re-adding,
        // without persisting between the removals.
        {
            let mut index = self.index.write();
            for &id in doc_ids {
                if self.docs.contains(id) {
                    let _ = index.remove(id);
                    let _ = self.docs.delete(id);
                }
            }
        }

        let total = texts.len();
        let batch_size = batch_size.max(1);
        let mut completed = 0usize;

        for chunk_start in (0..total).step_by(batch_size) {
            if cancel.is_some_and(CancellationToken::is_cancelled) {
                tracing::info!(completed, total, "add_documents cancelled between batches");
                return Err(Error::Cancelled);
            }

            let chunk_end = (chunk_start + batch_size).min(total);
            let chunk_ids = &doc_ids[chunk_start..chunk_end];
            let chunk_docs = &docs[chunk_start..chunk_end];
            let chunk_texts = &texts[chunk_start..chunk_end];

            let embeddings = self.oracle.embed(
                chunk_texts,
                Role::Document,
                Precisions::only(false, true, true),
            )?;

            let ubinary_rows: Vec<Vec<u8>> = embeddings
                .iter()
                .map(|e| {
                    e.ubinary.clone().ok_or_else(|| {
                        Error::OracleFailure("oracle did not return ubinary for document role".to_string())
                    })
                })
                .collect::<Result<_>>()?;

            {
                let mut index = self.index.write();
                index.add(chunk_ids, &ubinary_rows)?;
            }

            for (i, &id) in chunk_ids.iter().enumerate() {
                let emb_int8 = embeddings[i].int8.clone().ok_or_else(|| {
                    Error::OracleFailure("oracle did not return int8 for document role".to_string())
                })?;
                let record = DocRecord {
                    payload: chunk_docs[i].clone(),
                    emb_int8,
                };
                self.docs.put(id, &record)?;
            }

            completed = chunk_end;
            if let Some(sink) = progress {
                sink.on_batch(completed, total);
            }
            tracing::debug!(completed, total, "add_documents batch committed");

            if self.docs.should_create_snapshot() {
                self.docs.create_snapshot()?;
            }
        }

        if save {
            self.save()?;
        }
        Ok(())
    }

    /// Removes a single document from both stores.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if `doc_id` isn't present.
    pub fn remove_doc(&self, doc_id: i64, save: bool) -> Result<()> {
        if !self.docs.contains(doc_id) {
            return Err(Error::NotFound(doc_id));
        }

        {
            let mut index = self.index.write();
            let _ = index.remove(doc_id);
        }
        self.docs.delete(doc_id)?;

        if save {
            self.save()?;
        }
        Ok(())
    }

    /// Runs the three-phase coarse-to-fine search.
    ///
    /// `cancel`, if given, is checked at the single oracle-call boundary
    /// before any ranking work begins.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyIndex`] if no documents have been added yet, or
    /// [`Error::Cancelled`] if `cancel` was requested before the oracle call.
    pub fn search(
        &self,
        query_text: &str,
        k: usize,
        binary_oversample: usize,
        int8_oversample: usize,
        cancel: Option<&CancellationToken>,
    ) -> Result<Vec<SearchHit>> {
        let index = self.index.read();
        let ntotal = index.len();
        if ntotal == 0 {
            return Err(Error::EmptyIndex);
        }
        if cancel.is_some_and(CancellationToken::is_cancelled) {
            return Err(Error::Cancelled);
        }

        let query_embeddings = self.oracle.embed(
            &[query_text.to_string()],
            Role::Query,
            Precisions::only(true, false, true),
        )?;
        let query = query_embeddings.into_iter().next().expect("one text in, one embedding out");
        let query_float = query
            .float
            .ok_or_else(|| Error::OracleFailure("oracle did not return float for query role".to_string()))?;
        let query_ubinary = query
            .ubinary
            .ok_or_else(|| Error::OracleFailure("oracle did not return ubinary for query role".to_string()))?;

        // Phase I: Hamming shortlist.
        let k1 = (k.saturating_mul(binary_oversample)).min(ntotal);
        let phase1 = index.search(&query_ubinary, k1)?;
        tracing::debug!(candidates = phase1.len(), "phase I hamming shortlist");

        // Phase II: rescore by float-query / unpacked-binary dot product.
        let mut phase2: Vec<(i64, u32, f32)> = Vec::with_capacity(phase1.len());
        for (id, hamming) in &phase1 {
            let packed = index.reconstruct(*id)?;
            let score_binary = dot_unpacked(&query_float, &packed);
            phase2.push((*id, *hamming, score_binary));
        }
        drop(index);

        phase2.sort_by(|a, b| b.2.total_cmp(&a.2).then(a.0.cmp(&b.0)));
        let k2 = k.saturating_mul(int8_oversample);
        phase2.truncate(k2);
        tracing::debug!(kept = phase2.len(), "phase II binary rescore");

        // Phase III: cosine-like rescore against the int8 doc embedding.
        let mut phase3: Vec<SearchHit> = Vec::with_capacity(phase2.len());
        for (id, hamming, score_binary) in phase2 {
            let Some(record) = self.docs.get(id)? else {
                tracing::warn!(doc_id = id, "dropping candidate with no document record");
                continue;
            };
            let score_cossim = cosine_doc_normalized(&query_float, &record.emb_int8);
            phase3.push(SearchHit {
                doc_id: id,
                score_hamming: hamming,
                score_binary,
                score_cossim,
                doc: record.payload,
            });
        }

        phase3.sort_by(|a, b| b.score_cossim.total_cmp(&a.score_cossim).then(a.doc_id.cmp(&b.doc_id)));
        phase3.truncate(k);

        Ok(phase3)
    }

    /// Number of live documents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.read().len()
    }

    /// Returns true if the database has no documents.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Persists the binary index to `index.bin`, atomically.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StorageFailure`] on I/O failure.
    pub fn save(&self) -> Result<()> {
        let index = self.index.read();
        index.persist(&self.path.join("index.bin"))?;
        tracing::info!(path = %self.path.display(), "binary index persisted");
        Ok(())
    }

    /// Flushes the document store and releases both handles.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StorageFailure`] on I/O failure.
    pub fn close(self) -> Result<()> {
        self.docs.flush()
    }
}

/// Detects and repairs cross-store drift left by a crash between the index
/// add and the document-store put in `add_documents`.
fn reconcile(index: &mut BinaryIndex, docs: &DocStore) {
    for id in index.ids() {
        if !docs.contains(id) {
            tracing::warn!(doc_id = id, "removing orphaned index row with no document record");
            let _ = index.remove(id);
        }
    }
    for id in docs.ids() {
        if !index.contains(id) {
            tracing::warn!(doc_id = id, "removing soft-deleted document record with no index row");
            let _ = docs.delete(id);
        }
    }
}

/// 256-entry lookup table: packed byte -> eight +-1 values, one per bit,
/// least-significant bit first.
static UNPACK_TABLE: LazyLock<[[i8; 8]; 256]> = LazyLock::new(|| {
    let mut table = [[0i8; 8]; 256];
    for (byte, row) in table.iter_mut().enumerate() {
        for (bit, value) in row.iter_mut().enumerate() {
            *value = if (byte >> bit) & 1 == 1 { 1 } else { -1 };
        }
    }
    table
});

/// Dot product of a float query against a packed-binary row unpacked to
/// +-1 per dimension.
fn dot_unpacked(query_float: &[f32], packed: &[u8]) -> f32 {
    let mut acc = 0f32;
    for (byte_idx, &byte) in packed.iter().enumerate() {
        let bits = &UNPACK_TABLE[byte as usize];
        for (bit, &sign) in bits.iter().enumerate() {
            let dim = byte_idx * 8 + bit;
            if dim >= query_float.len() {
                break;
            }
            acc += query_float[dim] * f32::from(sign);
        }
    }
    acc
}

/// `(query . doc) / ||doc||`, i.e. normalized only on the document side —
/// a true cosine similarity only if the oracle already normalizes queries.
fn cosine_doc_normalized(query_float: &[f32], doc_int8: &[i8]) -> f32 {
    let mut dot = 0f32;
    let mut norm_sq = 0f32;
    for (&q, &d) in query_float.iter().zip(doc_int8) {
        let d = f32::from(d);
        dot += q * d;
        norm_sq += d * d;
    }
    if norm_sq == 0.0 {
        0.0
    } else {
        dot / norm_sq.sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::Embedding;
    use serial_test::serial;
    use std::collections::HashMap;
    use tempfile::tempdir;

    /// Deterministic in-memory oracle for tests: maps known texts to fixed
    /// vectors, as spec.md's design notes call for.
    struct StubOracle {
        dim: usize,
        vectors: HashMap<String, (Vec<f32>, Vec<i8>, Vec<u8>)>,
    }

    impl StubOracle {
        fn new(dim: usize) -> Self {
            Self {
                dim,
                vectors: HashMap::new(),
            }
        }

        fn with_text(mut self, text: &str, float: Vec<f32>, int8: Vec<i8>, ubinary: Vec<u8>) -> Self {
            self.vectors.insert(text.to_string(), (float, int8, ubinary));
            self
        }
    }

    impl EmbeddingOracle for StubOracle {
        fn dimension(&self) -> usize {
            self.dim
        }

        fn embed(&self, texts: &[String], _role: Role, precisions: Precisions) -> Result<Vec<Embedding>> {
            texts
                .iter()
                .map(|text| {
                    let (float, int8, ubinary) = self
                        .vectors
                        .get(text)
                        .cloned()
                        .ok_or_else(|| Error::OracleFailure(format!("no stub vector for '{text}'")))?;
                    Ok(Embedding {
                        float: precisions.float.then_some(float),
                        int8: precisions.int8.then_some(int8),
                        ubinary: precisions.ubinary.then_some(ubinary),
                    })
                })
                .collect()
        }
    }

    fn with_credential<T>(f: impl FnOnce() -> T) -> T {
        std::env::set_var(CREDENTIAL_ENV_VAR, "test-key");
        f()
    }

    /// Float vectors here are unit-normalized, matching the oracle contract
    /// (spec.md §4.4.4 / §9: the query float is assumed already normalized
    /// by the oracle) that `score_cossim` relies on to equal a true cosine.
    fn alpha_vectors() -> (Vec<f32>, Vec<i8>, Vec<u8>) {
        let unit = 1.0 / 8.0_f32.sqrt();
        (
            vec![unit, unit, unit, unit, -unit, -unit, -unit, -unit],
            vec![100, 100, 100, 100, -100, -100, -100, -100],
            vec![0xF0],
        )
    }

    fn beta_vectors() -> (Vec<f32>, Vec<i8>, Vec<u8>) {
        let unit = 1.0 / 8.0_f32.sqrt();
        (
            vec![-unit, -unit, -unit, -unit, unit, unit, unit, unit],
            vec![-100, -100, -100, -100, 100, 100, 100, 100],
            vec![0x0F],
        )
    }

    fn identity_projection(doc: &[u8]) -> Result<String> {
        Ok(String::from_utf8_lossy(doc).to_string())
    }

    #[test]
    #[serial]
    fn s1_insert_search_round_trip() {
        with_credential(|| {
            let dir = tempdir().unwrap();
            let (alpha_float, alpha_int8, alpha_ubin) = alpha_vectors();
            let (beta_float, beta_int8, beta_ubin) = beta_vectors();
            let oracle = StubOracle::new(8)
                .with_text("alpha", alpha_float.clone(), alpha_int8, alpha_ubin)
                .with_text("beta", beta_float, beta_int8, beta_ubin);

            let db = Database::open(
                dir.path(),
                Box::new(oracle),
                OpenOptions {
                    model: "stub".to_string(),
                    dim: 8,
                },
            )
            .unwrap();

            db.add_documents(
                &[1, 2],
                &[b"alpha".to_vec(), b"beta".to_vec()],
                identity_projection,
                960,
                true,
                None,
                None,
            )
            .unwrap();

            let hits = db.search("alpha", 1, 10, 3, None).unwrap();
            assert_eq!(hits.len(), 1);
            assert_eq!(hits[0].doc_id, 1);
            assert_eq!(hits[0].score_hamming, 0);
            assert!((hits[0].score_cossim - 1.0).abs() < 1e-3);
        });
    }

    #[test]
    #[serial]
    fn s2_update_replaces_payload() {
        with_credential(|| {
            let dir = tempdir().unwrap();
            let (alpha_float, alpha_int8, alpha_ubin) = alpha_vectors();
            let (beta_float, beta_int8, _beta_ubin) = beta_vectors();
            let oracle = StubOracle::new(8)
                .with_text("alpha", alpha_float, alpha_int8, alpha_ubin.clone())
                .with_text("beta", beta_float, beta_int8, alpha_ubin)
                .with_text("alpha2", vec![1.0; 8], vec![50; 8], vec![0xF0]);

            let db = Database::open(
                dir.path(),
                Box::new(oracle),
                OpenOptions {
                    model: "stub".to_string(),
                    dim: 8,
                },
            )
            .unwrap();

            db.add_documents(&[1, 2], &[b"alpha".to_vec(), b"beta".to_vec()], identity_projection, 960, true, None, None)
                .unwrap();
            db.add_documents(&[2], &[b"alpha2".to_vec()], identity_projection, 960, true, None, None)
                .unwrap();

            let hits = db.search("alpha", 2, 10, 3, None).unwrap();
            assert_eq!(hits.len(), 2);
            let updated = hits.iter().find(|h| h.doc_id == 2).unwrap();
            assert_eq!(updated.doc, b"alpha2");
        });
    }

    #[test]
    #[serial]
    fn s3_delete_shrinks_index() {
        with_credential(|| {
            let dir = tempdir().unwrap();
            let (alpha_float, alpha_int8, alpha_ubin) = alpha_vectors();
            let (beta_float, beta_int8, beta_ubin) = beta_vectors();
            let oracle = StubOracle::new(8)
                .with_text("alpha", alpha_float, alpha_int8, alpha_ubin)
                .with_text("beta", beta_float, beta_int8, beta_ubin);

            let db = Database::open(
                dir.path(),
                Box::new(oracle),
                OpenOptions {
                    model: "stub".to_string(),
                    dim: 8,
                },
            )
            .unwrap();
            db.add_documents(&[1, 2], &[b"alpha".to_vec(), b"beta".to_vec()], identity_projection, 960, true, None, None)
                .unwrap();

            db.remove_doc(1, true).unwrap();
            assert_eq!(db.len(), 1);

            let hits = db.search("beta", 3, 10, 3, None).unwrap();
            assert_eq!(hits.len(), 1);
            assert_eq!(hits[0].doc_id, 2);
        });
    }

    #[test]
    #[serial]
    fn s4_persists_across_reopen() {
        with_credential(|| {
            let dir = tempdir().unwrap();
            let (beta_float, beta_int8, beta_ubin) = beta_vectors();
            let open_opts = || OpenOptions {
                model: "stub".to_string(),
                dim: 8,
            };

            {
                let oracle = StubOracle::new(8).with_text("beta", beta_float.clone(), beta_int8.clone(), beta_ubin.clone());
                let db = Database::open(dir.path(), Box::new(oracle), open_opts()).unwrap();
                db.add_documents(&[2], &[b"beta".to_vec()], identity_projection, 960, true, None, None)
                    .unwrap();
            }

            let oracle = StubOracle::new(8).with_text("beta", beta_float, beta_int8, beta_ubin);
            let db = Database::open(dir.path(), Box::new(oracle), open_opts()).unwrap();
            assert_eq!(db.len(), 1);
            let hits = db.search("beta", 1, 10, 3, None).unwrap();
            assert_eq!(hits[0].doc_id, 2);
        });
    }

    #[test]
    #[serial]
    fn s5_oversample_clamps_without_crashing() {
        with_credential(|| {
            let dir = tempdir().unwrap();
            let oracle = StubOracle::new(8)
                .with_text("a", vec![1.0; 8], vec![10; 8], vec![0b1111_0000])
                .with_text("b", vec![1.0; 8], vec![10; 8], vec![0b1110_0000])
                .with_text("c", vec![1.0; 8], vec![10; 8], vec![0b1100_0000]);

            let db = Database::open(
                dir.path(),
                Box::new(oracle),
                OpenOptions {
                    model: "stub".to_string(),
                    dim: 8,
                },
            )
            .unwrap();
            db.add_documents(
                &[1, 2, 3],
                &[b"a".to_vec(), b"b".to_vec(), b"c".to_vec()],
                identity_projection,
                960,
                true,
                None,
                None,
            )
            .unwrap();

            let hits = db.search("a", 2, 10, 3, None).unwrap();
            assert_eq!(hits.len(), 2);
        });
    }

    #[test]
    #[serial]
    fn s6_foreign_directory_rejected() {
        with_credential(|| {
            let dir = tempdir().unwrap();
            std::fs::write(dir.path().join("unrelated.bin"), b"junk").unwrap();
            let oracle = StubOracle::new(8);
            let result = Database::open(
                dir.path(),
                Box::new(oracle),
                OpenOptions {
                    model: "stub".to_string(),
                    dim: 8,
                },
            );
            assert!(matches!(result, Err(Error::CorruptOrForeignDirectory(_))));
        });
    }

    #[test]
    #[serial]
    fn search_on_empty_database_is_rejected() {
        with_credential(|| {
            let dir = tempdir().unwrap();
            let oracle = StubOracle::new(8);
            let db = Database::open(
                dir.path(),
                Box::new(oracle),
                OpenOptions {
                    model: "stub".to_string(),
                    dim: 8,
                },
            )
            .unwrap();
            assert!(matches!(db.search("anything", 1, 10, 3, None), Err(Error::EmptyIndex)));
        });
    }

    #[test]
    #[serial]
    fn missing_credential_fails_fast() {
        std::env::remove_var(CREDENTIAL_ENV_VAR);
        let dir = tempdir().unwrap();
        let oracle = StubOracle::new(8);
        let result = Database::open(dir.path(), Box::new(oracle), OpenOptions::default());
        assert!(matches!(result, Err(Error::MissingCredential(_))));
    }

    #[test]
    #[serial]
    fn cancelled_add_documents_leaves_prior_chunks_committed() {
        with_credential(|| {
            let dir = tempdir().unwrap();
            let (alpha_float, alpha_int8, alpha_ubin) = alpha_vectors();
            let (beta_float, beta_int8, beta_ubin) = beta_vectors();
            let oracle = StubOracle::new(8)
                .with_text("alpha", alpha_float, alpha_int8, alpha_ubin)
                .with_text("beta", beta_float, beta_int8, beta_ubin);

            let db = Database::open(
                dir.path(),
                Box::new(oracle),
                OpenOptions {
                    model: "stub".to_string(),
                    dim: 8,
                },
            )
            .unwrap();

            // Cancelled before the call begins, so no chunk is ever committed.
            let cancel = CancellationToken::new();
            cancel.cancel();
            let result = db.add_documents(
                &[1, 2],
                &[b"alpha".to_vec(), b"beta".to_vec()],
                identity_projection,
                1,
                true,
                None,
                Some(&cancel),
            );
            assert!(matches!(result, Err(Error::Cancelled)));
            assert_eq!(db.len(), 0);
        });
    }

    #[test]
    #[serial]
    fn cancelled_search_is_rejected_before_oracle_call() {
        with_credential(|| {
            let dir = tempdir().unwrap();
            let (alpha_float, alpha_int8, alpha_ubin) = alpha_vectors();
            let oracle = StubOracle::new(8).with_text("alpha", alpha_float, alpha_int8, alpha_ubin);

            let db = Database::open(
                dir.path(),
                Box::new(oracle),
                OpenOptions {
                    model: "stub".to_string(),
                    dim: 8,
                },
            )
            .unwrap();
            db.add_documents(&[1], &[b"alpha".to_vec()], identity_projection, 960, true, None, None)
                .unwrap();

            let cancel = CancellationToken::new();
            cancel.cancel();
            let result = db.search("alpha", 1, 10, 3, Some(&cancel));
            assert!(matches!(result, Err(Error::Cancelled)));
        });
    }
}
