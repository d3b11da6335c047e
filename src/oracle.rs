//! The embedding oracle interface consumed by the [`crate::database::Database`] facade.
//!
//! The oracle is the one external collaborator this crate depends on: given
//! text, it returns co-registered vectors in up to three precisions. It is
//! modeled as a trait rather than a concrete HTTP client so tests can inject
//! a deterministic stub, the same way the teacher crate abstracts its
//! storage backend behind `VectorStorage`/`PayloadStorage` in `storage.rs`
//! rather than hard-wiring one implementation.

use crate::error::Result;

/// Whether a batch of texts represents documents being indexed, or a query
/// being searched for. Oracles may embed these differently (e.g. Cohere's
/// `input_type=search_document` vs. `search_query`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Text being added to the index.
    Document,
    /// Text used as a search query.
    Query,
}

/// Which precisions to request from the oracle for a given call.
///
/// Requesting only what's needed avoids wasted bandwidth/compute: document
/// inserts only need `int8` + `ubinary`, queries only need `float` + `ubinary`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Precisions {
    /// Request 32-bit float vectors.
    pub float: bool,
    /// Request int8-quantized vectors.
    pub int8: bool,
    /// Request packed-binary (1 bit per dimension) vectors.
    pub ubinary: bool,
}

impl Precisions {
    /// Builds a precision set from individual flags.
    #[must_use]
    pub const fn only(float: bool, int8: bool, ubinary: bool) -> Self {
        Self {
            float,
            int8,
            ubinary,
        }
    }
}

/// The co-registered vectors the oracle returns for one input string.
///
/// Fields are `None` when the corresponding precision wasn't requested.
#[derive(Debug, Clone, Default)]
pub struct Embedding {
    /// 32-bit float vector, dimension D.
    pub float: Option<Vec<f32>>,
    /// int8-quantized vector, dimension D.
    pub int8: Option<Vec<i8>>,
    /// Packed-binary vector, D/8 bytes.
    pub ubinary: Option<Vec<u8>>,
}

/// External embedding provider.
///
/// Implementations must keep the three precisions sign- and
/// magnitude-consistent for the same input text: bit `i` of `ubinary` is 1
/// iff `float[i] >= 0`, and `int8` is a linear quantization of `float`. This
/// crate does not validate that contract; ranking quality depends on it.
pub trait EmbeddingOracle: Send + Sync {
    /// The fixed vector dimension D this oracle produces.
    fn dimension(&self) -> usize;

    /// Embeds a non-empty batch of texts, requesting only the given
    /// precisions.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::Error::OracleFailure`] if the call fails or
    /// the response is malformed.
    fn embed(&self, texts: &[String], role: Role, precisions: Precisions) -> Result<Vec<Embedding>>;
}
