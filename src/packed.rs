//! The binary index: an id-addressable, exact-Hamming nearest-neighbor
//! structure over packed-binary vectors.
//!
//! Rows are stored contiguously in a single byte buffer; a bidirectional
//! `id <-> row` mapping (grounded in the same pattern the HNSW id-mapping
//! layer uses) lets `remove` stay O(1) amortized by swapping the last row
//! into the hole instead of shifting the tail.
//!
//! Bit order within a packed byte is little-endian (bit `i` of dimension
//! `8*byte + i` is `(byte >> i) & 1`); the Hamming distance itself doesn't
//! care about bit order since it XORs whole bytes, but Phase II's unpacking
//! in [`crate::database`] must agree with whatever oracle produced the
//! vectors, and this crate's own stub oracle follows this convention.

use crate::error::{Error, Result};
use rustc_hash::FxHashMap;
use std::collections::BinaryHeap;
use std::fs;
use std::path::Path;

const MAGIC: &[u8; 4] = b"BVDB";
const FORMAT_VERSION: u32 = 1;
const HEADER_LEN: usize = 32;

/// In-memory, file-backed binary index.
pub struct BinaryIndex {
    dim: usize,
    row_bytes: usize,
    id_to_row: FxHashMap<i64, usize>,
    row_to_id: Vec<i64>,
    rows: Vec<u8>,
}

impl BinaryIndex {
    /// Creates an empty index for vectors of dimension `dim`.
    ///
    /// # Panics
    ///
    /// Panics if `dim` is not a multiple of 8.
    #[must_use]
    pub fn new(dim: usize) -> Self {
        assert!(dim % 8 == 0, "dim must be a multiple of 8, got {dim}");
        Self {
            dim,
            row_bytes: dim / 8,
            id_to_row: FxHashMap::default(),
            row_to_id: Vec::new(),
            rows: Vec::new(),
        }
    }

    /// Number of live rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.row_to_id.len()
    }

    /// Returns true if the index has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.row_to_id.is_empty()
    }

    /// Returns true if `id` currently has a row.
    #[must_use]
    pub fn contains(&self, id: i64) -> bool {
        self.id_to_row.contains_key(&id)
    }

    /// All ids currently present, in no particular order.
    #[must_use]
    pub fn ids(&self) -> Vec<i64> {
        self.row_to_id.clone()
    }

    /// Appends rows for `ids`, each paired with its packed-binary vector.
    ///
    /// Callers (the Facade) are responsible for ensuring none of `ids` are
    /// already present; this layer does not itself raise a duplicate-id
    /// error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DimensionMismatch`] if any vector isn't exactly
    /// `dim / 8` bytes.
    pub fn add(&mut self, ids: &[i64], vectors: &[Vec<u8>]) -> Result<()> {
        for vector in vectors {
            if vector.len() != self.row_bytes {
                return Err(Error::DimensionMismatch {
                    expected: self.row_bytes,
                    actual: vector.len(),
                });
            }
        }
        for (&id, vector) in ids.iter().zip(vectors) {
            let row = self.row_to_id.len();
            self.row_to_id.push(id);
            self.id_to_row.insert(id, row);
            self.rows.extend_from_slice(vector);
        }
        Ok(())
    }

    /// Removes the row for `id`, swapping the last row into its place.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if `id` has no row.
    pub fn remove(&mut self, id: i64) -> Result<()> {
        let row = self.id_to_row.remove(&id).ok_or(Error::NotFound(id))?;
        let last_row = self.row_to_id.len() - 1;

        if row != last_row {
            let moved_id = self.row_to_id[last_row];
            self.row_to_id[row] = moved_id;
            self.id_to_row.insert(moved_id, row);

            let (dst_start, src_start) = (row * self.row_bytes, last_row * self.row_bytes);
            let (head, tail) = self.rows.split_at_mut(src_start);
            head[dst_start..dst_start + self.row_bytes].copy_from_slice(&tail[..self.row_bytes]);
        }

        self.row_to_id.pop();
        self.rows.truncate(self.rows.len() - self.row_bytes);
        Ok(())
    }

    /// Returns a copy of the packed-binary row stored for `id`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if `id` has no row.
    pub fn reconstruct(&self, id: i64) -> Result<Vec<u8>> {
        let row = *self.id_to_row.get(&id).ok_or(Error::NotFound(id))?;
        let start = row * self.row_bytes;
        Ok(self.rows[start..start + self.row_bytes].to_vec())
    }

    /// Returns the `k` ids with smallest Hamming distance to `query`,
    /// sorted by distance ascending then id ascending. `k` is clamped to
    /// the current row count.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DimensionMismatch`] if `query` isn't `dim / 8` bytes.
    pub fn search(&self, query: &[u8], k: usize) -> Result<Vec<(i64, u32)>> {
        if query.len() != self.row_bytes {
            return Err(Error::DimensionMismatch {
                expected: self.row_bytes,
                actual: query.len(),
            });
        }
        let k = k.min(self.row_to_id.len());
        if k == 0 {
            return Ok(Vec::new());
        }

        // Bounded max-heap: evict the farthest (and, on ties, highest-id)
        // candidate once the heap grows past k.
        let mut heap: BinaryHeap<(u32, i64)> = BinaryHeap::with_capacity(k + 1);
        for (row, &id) in self.row_to_id.iter().enumerate() {
            let start = row * self.row_bytes;
            let dist = hamming_distance(query, &self.rows[start..start + self.row_bytes]);
            heap.push((dist, id));
            if heap.len() > k {
                heap.pop();
            }
        }

        let mut results: Vec<(i64, u32)> = heap.into_iter().map(|(dist, id)| (id, dist)).collect();
        results.sort_by(|a, b| a.1.cmp(&b.1).then(a.0.cmp(&b.0)));
        Ok(results)
    }

    /// Writes the index to `path` atomically (temp file + rename).
    ///
    /// # Errors
    ///
    /// Returns [`Error::StorageFailure`] on I/O failure.
    pub fn persist(&self, path: &Path) -> Result<()> {
        let ntotal = self.row_to_id.len();
        let mut buf = Vec::with_capacity(HEADER_LEN + ntotal * 8 + self.rows.len());

        buf.extend_from_slice(MAGIC);
        buf.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
        #[allow(clippy::cast_possible_truncation)]
        buf.extend_from_slice(&(self.dim as u32).to_le_bytes());
        buf.extend_from_slice(&(ntotal as u64).to_le_bytes());
        buf.extend_from_slice(&[0u8; HEADER_LEN - 20]);

        for &id in &self.row_to_id {
            buf.extend_from_slice(&id.to_le_bytes());
        }
        buf.extend_from_slice(&self.rows);

        let tmp_path = path.with_extension("bin.tmp");
        fs::write(&tmp_path, &buf)?;
        fs::rename(&tmp_path, path)?;
        Ok(())
    }

    /// Loads an index previously written by [`BinaryIndex::persist`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::StorageFailure`] if the file is missing, truncated,
    /// or has an unrecognized magic/version.
    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read(path)?;
        if data.len() < HEADER_LEN || &data[0..4] != MAGIC {
            return Err(invalid_data("not a binary index file"));
        }
        let version = u32::from_le_bytes(data[4..8].try_into().unwrap());
        if version != FORMAT_VERSION {
            return Err(invalid_data("unsupported binary index format version"));
        }
        let dim = u32::from_le_bytes(data[8..12].try_into().unwrap()) as usize;
        let ntotal = u64::from_le_bytes(data[12..20].try_into().unwrap()) as usize;
        let row_bytes = dim / 8;

        let id_table_start = HEADER_LEN;
        let id_table_end = id_table_start + ntotal * 8;
        let rows_end = id_table_end + ntotal * row_bytes;
        if data.len() != rows_end {
            return Err(invalid_data("binary index file size does not match header"));
        }

        let mut row_to_id = Vec::with_capacity(ntotal);
        let mut id_to_row = FxHashMap::default();
        id_to_row.reserve(ntotal);
        for i in 0..ntotal {
            let offset = id_table_start + i * 8;
            let id = i64::from_le_bytes(data[offset..offset + 8].try_into().unwrap());
            id_to_row.insert(id, i);
            row_to_id.push(id);
        }
        let rows = data[id_table_end..rows_end].to_vec();

        Ok(Self {
            dim,
            row_bytes,
            id_to_row,
            row_to_id,
            rows,
        })
    }
}

fn invalid_data(msg: &str) -> Error {
    Error::StorageFailure(std::io::Error::new(std::io::ErrorKind::InvalidData, msg.to_string()))
}

/// Popcount over XOR, in 64-bit blocks with four accumulators to break the
/// dependency chain, falling back to a per-byte tail for any remainder.
fn hamming_distance(a: &[u8], b: &[u8]) -> u32 {
    debug_assert_eq!(a.len(), b.len());
    let blocks = a.len() / 8;
    let mut acc = [0u32; 4];
    for i in 0..blocks {
        let start = i * 8;
        let av = u64::from_le_bytes(a[start..start + 8].try_into().unwrap());
        let bv = u64::from_le_bytes(b[start..start + 8].try_into().unwrap());
        acc[i % 4] += (av ^ bv).count_ones();
    }
    let mut dist = acc[0] + acc[1] + acc[2] + acc[3];
    for i in blocks * 8..a.len() {
        dist += (a[i] ^ b[i]).count_ones();
    }
    dist
}
