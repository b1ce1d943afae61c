//! Locality-preserving index generation
//!
//! Neighbouring items in the data (adjacent pixels, consecutive vertices,
//! the x/y/z slots of a vertex) must land on basis states that differ in a
//! single bit, so that a per-qubit rotation mixes neighbours rather than
//! unrelated samples. The reflected binary code gives exactly that:
//!
//! ```text
//! k = 2:  index 0 1 2 3
//!         code  0 1 3 2     (00 01 11 10)
//! ```
//!
//! Tables depend only on the qubit count, so they are built once per `k` and
//! shared through [`LocalityCache`].

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use qblur_tracing::{perf_event, perf_span};

use crate::error::{Error, Result};

/// Largest qubit count a locality table may be built for.
pub const MAX_TABLE_QUBITS: u32 = 30;

/// Reflected binary code of `index`.
#[inline]
pub fn gray(index: usize) -> usize {
    index ^ (index >> 1)
}

/// Build the locality table for `qubits` qubits: `2^qubits` codes where
/// entry `i` and entry `i + 1` differ in exactly one bit.
///
/// `qubits == 0` yields the single-entry table `[0]`. Qubit counts are
/// unsigned, so a negative request cannot be expressed; oversized requests
/// fail with [`Error::QubitLimitExceeded`].
///
/// # Example
///
/// ```
/// use qblur_core::locality::locality_table;
///
/// assert_eq!(locality_table(0).unwrap(), vec![0]);
/// assert_eq!(locality_table(2).unwrap(), vec![0, 1, 3, 2]);
/// assert_eq!(locality_table(3).unwrap(), vec![0, 1, 3, 2, 6, 7, 5, 4]);
/// ```
pub fn locality_table(qubits: u32) -> Result<Vec<usize>> {
    if qubits > MAX_TABLE_QUBITS {
        return Err(Error::QubitLimitExceeded {
            requested: qubits,
            max: MAX_TABLE_QUBITS,
        });
    }
    let _span = perf_span!("locality_table", qubits = qubits);
    Ok((0..1usize << qubits).map(gray).collect())
}

/// Number of qubits needed to address `count` entries: `ceil(log2(count))`.
///
/// A single entry needs zero qubits. An empty collection is rejected.
///
/// ```
/// use qblur_core::locality::qubits_for;
///
/// assert_eq!(qubits_for(1).unwrap(), 0);
/// assert_eq!(qubits_for(3).unwrap(), 2);
/// assert_eq!(qubits_for(4).unwrap(), 2);
/// assert_eq!(qubits_for(5).unwrap(), 3);
/// assert!(qubits_for(0).is_err());
/// ```
pub fn qubits_for(count: usize) -> Result<u32> {
    if count == 0 {
        return Err(Error::EmptyInput);
    }
    Ok(count.next_power_of_two().trailing_zeros())
}

/// Shared, lazily populated store of locality tables keyed by qubit count.
///
/// Reads take a shared lock; a table is built at most once per distinct
/// size under normal operation and then handed out as a cheap `Arc` clone.
///
/// ```
/// use qblur_core::locality::LocalityCache;
///
/// static TABLES: LocalityCache = LocalityCache::new();
///
/// let first = TABLES.get_or_build(4).unwrap();
/// let again = TABLES.get_or_build(4).unwrap();
/// assert!(std::sync::Arc::ptr_eq(&first, &again));
/// ```
pub struct LocalityCache {
    tables: OnceLock<parking_lot::RwLock<HashMap<u32, Arc<[usize]>>>>,
}

impl LocalityCache {
    /// Create an empty cache
    pub const fn new() -> Self {
        Self { tables: OnceLock::new() }
    }

    /// Return the table for `qubits`, building it on first use.
    pub fn get_or_build(&self, qubits: u32) -> Result<Arc<[usize]>> {
        let tables = self.tables.get_or_init(|| parking_lot::RwLock::new(HashMap::new()));

        if let Some(table) = tables.read().get(&qubits) {
            return Ok(Arc::clone(table));
        }

        let built: Arc<[usize]> = locality_table(qubits)?.into();
        perf_event!("locality_table_built", qubits = qubits, entries = built.len());

        let mut write_guard = tables.write();
        // Another caller may have inserted while we were building.
        let table = write_guard.entry(qubits).or_insert_with(|| Arc::clone(&built));
        Ok(Arc::clone(table))
    }

    /// Number of cached tables
    pub fn len(&self) -> usize {
        self.tables.get().map(|t| t.read().len()).unwrap_or(0)
    }

    /// Check if no table has been built yet
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[cfg(test)]
    pub fn clear(&self) {
        if let Some(tables) = self.tables.get() {
            tables.write().clear();
        }
    }
}

impl Default for LocalityCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Process-wide table cache used by the codec.
pub(crate) static LOCALITY_TABLES: LocalityCache = LocalityCache::new();
