//! Durable `DocId -> DocRecord` key-value store.
//!
//! An append-only write-ahead log plus an in-memory offset index, the same
//! shape as the teacher crate's log-structured payload storage: writes are
//! durable the moment they return, and a periodic binary snapshot of the
//! index avoids replaying the whole log from scratch on every cold start.

use crate::error::Result;
use crate::record::DocRecord;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

const SNAPSHOT_MAGIC: &[u8; 4] = b"DSNP";
const SNAPSHOT_VERSION: u8 = 1;
const DEFAULT_SNAPSHOT_THRESHOLD: u64 = 10 * 1024 * 1024;

const MARKER_PUT: u8 = 1;
const MARKER_DELETE: u8 = 2;

/// Log-structured, snapshot-accelerated document store.
pub struct DocStore {
    path: PathBuf,
    dim: usize,
    index: RwLock<FxHashMap<i64, u64>>,
    wal: RwLock<BufWriter<File>>,
    reader: RwLock<File>,
    last_snapshot_wal_pos: RwLock<u64>,
}

impl DocStore {
    /// Opens (or creates) the store rooted at `path`, storing records whose
    /// int8 embedding has length `dim`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::Error::StorageFailure`] on I/O failure.
    pub fn open(path: impl AsRef<Path>, dim: usize) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        fs::create_dir_all(&path)?;

        let log_path = path.join("payloads.log");
        let snapshot_path = path.join("payloads.snapshot");

        let writer_file = OpenOptions::new().create(true).append(true).open(&log_path)?;
        let wal = BufWriter::new(writer_file);

        let reader = File::open(&log_path)?;
        let wal_len = reader.metadata()?.len();

        let (index, last_snapshot_wal_pos) = match Self::load_snapshot(&snapshot_path) {
            Ok((snapshot_index, snapshot_pos)) => {
                let index = Self::replay_wal_from(&log_path, snapshot_index, snapshot_pos, wal_len)?;
                (index, snapshot_pos)
            }
            Err(_) => {
                let index = Self::replay_wal_from(&log_path, FxHashMap::default(), 0, wal_len)?;
                (index, 0)
            }
        };

        tracing::info!(path = %path.display(), entries = index.len(), "document store opened");

        Ok(Self {
            path,
            dim,
            index: RwLock::new(index),
            wal: RwLock::new(wal),
            reader: RwLock::new(reader),
            last_snapshot_wal_pos: RwLock::new(last_snapshot_wal_pos),
        })
    }

    fn replay_wal_from(
        log_path: &Path,
        mut index: FxHashMap<i64, u64>,
        start_pos: u64,
        end_pos: u64,
    ) -> io::Result<FxHashMap<i64, u64>> {
        if start_pos >= end_pos {
            return Ok(index);
        }

        let file = File::open(log_path)?;
        let mut reader = BufReader::new(file);
        reader.seek(SeekFrom::Start(start_pos))?;

        let mut pos = start_pos;
        while pos < end_pos {
            let mut marker = [0u8; 1];
            if reader.read_exact(&mut marker).is_err() {
                break;
            }
            pos += 1;

            let mut id_bytes = [0u8; 8];
            reader.read_exact(&mut id_bytes)?;
            let id = i64::from_le_bytes(id_bytes);
            pos += 8;

            match marker[0] {
                MARKER_PUT => {
                    let offset = pos;
                    let mut len_bytes = [0u8; 4];
                    reader.read_exact(&mut len_bytes)?;
                    let record_len = u64::from(u32::from_le_bytes(len_bytes));
                    pos += 4;

                    index.insert(id, offset);

                    let skip = i64::try_from(record_len)
                        .map_err(|_| io::Error::new(io::ErrorKind::InvalidData, "record too large"))?;
                    reader.seek(SeekFrom::Current(skip))?;
                    pos += record_len;
                }
                MARKER_DELETE => {
                    index.remove(&id);
                }
                _ => return Err(io::Error::new(io::ErrorKind::InvalidData, "unknown WAL marker")),
            }
        }

        Ok(index)
    }

    fn load_snapshot(snapshot_path: &Path) -> io::Result<(FxHashMap<i64, u64>, u64)> {
        if !snapshot_path.exists() {
            return Err(io::Error::new(io::ErrorKind::NotFound, "no snapshot"));
        }
        let data = fs::read(snapshot_path)?;
        if data.len() < 25 || &data[0..4] != SNAPSHOT_MAGIC {
            return Err(io::Error::new(io::ErrorKind::InvalidData, "invalid snapshot header"));
        }
        if data[4] != SNAPSHOT_VERSION {
            return Err(io::Error::new(io::ErrorKind::InvalidData, "unsupported snapshot version"));
        }

        let wal_pos = u64::from_le_bytes(data[5..13].try_into().unwrap());
        let entry_count_u64 = u64::from_le_bytes(data[13..21].try_into().unwrap());
        let max_possible_entries = data.len().saturating_sub(25) / 16;
        if entry_count_u64 > max_possible_entries as u64 {
            return Err(io::Error::new(io::ErrorKind::InvalidData, "entry count exceeds data size"));
        }
        #[allow(clippy::cast_possible_truncation)]
        let entry_count = entry_count_u64 as usize;

        let expected_size = 21 + entry_count * 16 + 4;
        if data.len() != expected_size {
            return Err(io::Error::new(io::ErrorKind::InvalidData, "snapshot size mismatch"));
        }

        let stored_crc = u32::from_le_bytes(data[data.len() - 4..].try_into().unwrap());
        let computed_crc = crc32(&data[..data.len() - 4]);
        if stored_crc != computed_crc {
            return Err(io::Error::new(io::ErrorKind::InvalidData, "snapshot CRC mismatch"));
        }

        let mut index = FxHashMap::default();
        index.reserve(entry_count);
        for i in 0..entry_count {
            let offset = 21 + i * 16;
            let id = i64::from_le_bytes(data[offset..offset + 8].try_into().unwrap());
            let wal_offset = u64::from_le_bytes(data[offset + 8..offset + 16].try_into().unwrap());
            index.insert(id, wal_offset);
        }

        Ok((index, wal_pos))
    }

    /// Writes a snapshot of the current index to disk, atomically.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::Error::StorageFailure`] on I/O failure.
    pub fn create_snapshot(&self) -> Result<()> {
        self.wal.write().flush()?;

        let snapshot_path = self.path.join("payloads.snapshot");
        let index = self.index.read();
        let wal_pos = self.wal.write().get_ref().metadata()?.len();

        let entry_count = index.len();
        let mut buf = Vec::with_capacity(21 + entry_count * 16 + 4);
        buf.extend_from_slice(SNAPSHOT_MAGIC);
        buf.push(SNAPSHOT_VERSION);
        buf.extend_from_slice(&wal_pos.to_le_bytes());
        buf.extend_from_slice(&(entry_count as u64).to_le_bytes());
        for (&id, &offset) in index.iter() {
            buf.extend_from_slice(&id.to_le_bytes());
            buf.extend_from_slice(&offset.to_le_bytes());
        }
        drop(index);

        let crc = crc32(&buf);
        buf.extend_from_slice(&crc.to_le_bytes());

        let tmp_path = self.path.join("payloads.snapshot.tmp");
        fs::write(&tmp_path, &buf)?;
        fs::rename(&tmp_path, &snapshot_path)?;

        *self.last_snapshot_wal_pos.write() = wal_pos;
        Ok(())
    }

    /// Returns true if the WAL has grown enough since the last snapshot
    /// that a new one is worth taking.
    #[must_use]
    pub fn should_create_snapshot(&self) -> bool {
        let last_pos = *self.last_snapshot_wal_pos.read();
        let current_pos = match self.wal.write().get_ref().metadata() {
            Ok(meta) => meta.len(),
            Err(_) => return false,
        };
        current_pos.saturating_sub(last_pos) >= DEFAULT_SNAPSHOT_THRESHOLD
    }

    /// Stores (or overwrites) the record for `id`. Durable on return.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::Error::StorageFailure`] on I/O failure.
    pub fn put(&self, id: i64, record: &DocRecord) -> Result<()> {
        let bytes = record.encode();

        let mut wal = self.wal.write();
        let mut index = self.index.write();

        wal.flush()?;
        let pos = wal.get_ref().metadata()?.len();

        wal.write_all(&[MARKER_PUT])?;
        wal.write_all(&id.to_le_bytes())?;
        let len = u32::try_from(bytes.len())
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "document record too large"))?;
        wal.write_all(&len.to_le_bytes())?;
        wal.write_all(&bytes)?;
        wal.flush()?;

        index.insert(id, pos + 9);
        Ok(())
    }

    /// Fetches the record for `id`, if present.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::Error::StorageFailure`] on I/O or decode failure.
    pub fn get(&self, id: i64) -> Result<Option<DocRecord>> {
        let offset = { self.index.read().get(&id).copied() };
        let Some(offset) = offset else {
            return Ok(None);
        };

        let mut reader = self.reader.write();
        reader.seek(SeekFrom::Start(offset))?;

        let mut len_bytes = [0u8; 4];
        reader.read_exact(&mut len_bytes)?;
        let len = u32::from_le_bytes(len_bytes) as usize;

        let mut bytes = vec![0u8; len];
        reader.read_exact(&mut bytes)?;

        Ok(Some(DocRecord::decode(&bytes, self.dim)?))
    }

    /// Returns true if `id` has a live record.
    #[must_use]
    pub fn contains(&self, id: i64) -> bool {
        self.index.read().contains_key(&id)
    }

    /// Deletes the record for `id`, if present. Not an error if absent.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::Error::StorageFailure`] on I/O failure.
    pub fn delete(&self, id: i64) -> Result<()> {
        let mut wal = self.wal.write();
        let mut index = self.index.write();

        wal.write_all(&[MARKER_DELETE])?;
        wal.write_all(&id.to_le_bytes())?;
        wal.flush()?;

        index.remove(&id);
        Ok(())
    }

    /// Flushes any buffered writes to disk.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::Error::StorageFailure`] on I/O failure.
    pub fn flush(&self) -> Result<()> {
        self.wal.write().flush()?;
        Ok(())
    }

    /// All ids currently live, in no particular order.
    #[must_use]
    pub fn ids(&self) -> Vec<i64> {
        self.index.read().keys().copied().collect()
    }

    /// Number of live records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.read().len()
    }

    /// Returns true if the store holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// IEEE 802.3 CRC32, computed with a const-evaluated lookup table.
#[allow(clippy::cast_possible_truncation)]
fn crc32(data: &[u8]) -> u32 {
    const TABLE: [u32; 256] = {
        let mut table = [0u32; 256];
        let mut i = 0;
        while i < 256 {
            let mut crc = i as u32;
            let mut j = 0;
            while j < 8 {
                crc = if crc & 1 != 0 { (crc >> 1) ^ 0xEDB8_8320 } else { crc >> 1 };
                j += 1;
            }
            table[i] = crc;
            i += 1;
        }
        table
    };

    let mut crc = 0xFFFF_FFFF_u32;
    for &byte in data {
        let idx = ((crc ^ u32::from(byte)) & 0xFF) as usize;
        crc = (crc >> 8) ^ TABLE[idx];
    }
    !crc
}
