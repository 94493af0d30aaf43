// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use std::fmt;
use std::hash::Hash;
use std::marker::PhantomData;
use std::sync::atomic::AtomicU32;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering::Relaxed;

use crate::error::Error;
use crate::error::ErrorKind;
use crate::hash::row_hash;

/// A Count-Min sketch over keys of type `K`.
///
/// Maintains a `depth x width` matrix of atomic counters and one hash
/// function per row. Inserting a key increments one counter per row;
/// querying returns the minimum of those counters, which is the tightest
/// available upper bound on the key's true frequency. The sketch never
/// recovers the keys it has seen; ranking queries take caller-supplied
/// candidates.
///
/// Row hash functions are seeded by row index, so any two sketches with
/// the same `depth` hash keys identically row for row. That determinism is
/// what makes [`merge`](Self::merge) exactly equivalent to having inserted
/// both key streams into a single sketch.
///
/// # Concurrency
///
/// All operations take `&self` and are lock-free. Every counter access is
/// a relaxed atomic operation: increments to a single counter are never
/// lost, but composite operations (`count`, `merge`, `clear`, `clone`)
/// are not snapshots of the whole matrix. A query racing with inserts may
/// observe the rows at different logical times, which can only raise the
/// returned estimate, never lower it below the true count.
///
/// # Examples
///
/// ```
/// use freqsketches::countmin::CountMinSketch;
///
/// let sketch = CountMinSketch::new(1000, 4)?;
/// for _ in 0..3 {
///     sketch.insert(&"a");
/// }
/// sketch.insert(&"b");
///
/// assert!(sketch.count(&"a") >= 3);
/// assert!(sketch.count(&"b") >= 1);
/// # Ok::<(), freqsketches::error::Error>(())
/// ```
pub struct CountMinSketch<K> {
    /// Counters per row.
    width: u32,
    /// Number of rows, one hash function each.
    depth: u32,
    /// Row-major `depth x width` matrix in a single allocation.
    counters: Box<[AtomicU32]>,
    /// Per-row hash seeds, fixed to the row index.
    row_seeds: Box<[u32]>,
    /// Sum of all inserted weight since the last clear.
    total_weight: AtomicU64,
    _keys: PhantomData<fn(&K)>,
}

impl<K: Hash> CountMinSketch<K> {
    /// Creates a sketch with `width` counters in each of `depth` rows,
    /// every counter starting at zero.
    ///
    /// Larger `width` shrinks the magnitude of over-estimation; larger
    /// `depth` shrinks the probability of a large error. See
    /// [`suggest_width`](Self::suggest_width) and
    /// [`suggest_depth`](Self::suggest_depth) to derive dimensions from
    /// accuracy targets.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidArgument`] if either dimension is zero,
    /// or if the matrix would not fit in addressable memory. No sketch is
    /// allocated on failure.
    pub fn new(width: u32, depth: u32) -> Result<Self, Error> {
        if width == 0 || depth == 0 {
            return Err(
                Error::new(ErrorKind::InvalidArgument, "width and depth must be non-zero")
                    .with_context("width", width)
                    .with_context("depth", depth),
            );
        }
        let cells = (width as usize)
            .checked_mul(depth as usize)
            .ok_or_else(|| {
                Error::new(
                    ErrorKind::InvalidArgument,
                    "counter matrix exceeds addressable memory",
                )
                .with_context("width", width)
                .with_context("depth", depth)
            })?;

        Ok(Self {
            width,
            depth,
            counters: (0..cells).map(|_| AtomicU32::new(0)).collect(),
            row_seeds: (0..depth).collect(),
            total_weight: AtomicU64::new(0),
            _keys: PhantomData,
        })
    }

    /// Suggests a width that keeps over-estimation within `relative_error`
    /// of the total inserted weight.
    ///
    /// # Panics
    ///
    /// Panics unless `relative_error` is in (0, 1).
    pub fn suggest_width(relative_error: f64) -> u32 {
        assert!(
            relative_error > 0.0 && relative_error < 1.0,
            "relative_error must be in (0, 1)"
        );
        (std::f64::consts::E / relative_error).ceil() as u32
    }

    /// Suggests a depth such that estimates stay within the width's error
    /// bound with probability at least `confidence`.
    ///
    /// # Panics
    ///
    /// Panics unless `confidence` is in (0, 1).
    pub fn suggest_depth(confidence: f64) -> u32 {
        assert!(
            confidence > 0.0 && confidence < 1.0,
            "confidence must be in (0, 1)"
        );
        (1.0 / (1.0 - confidence)).ln().ceil() as u32
    }

    /// Records one occurrence of `key`.
    ///
    /// Increments one counter per row. The `depth` increments are each
    /// atomic but are not applied as a single transaction.
    pub fn insert(&self, key: &K) {
        self.insert_with_weight(key, 1);
    }

    /// Records `weight` occurrences of `key` in one pass over the rows.
    pub fn insert_with_weight(&self, key: &K, weight: u32) {
        for row in 0..self.depth {
            self.counters[self.cell_index(row, key)].fetch_add(weight, Relaxed);
        }
        self.total_weight.fetch_add(u64::from(weight), Relaxed);
    }

    /// Returns an estimate of how many times `key` has been inserted since
    /// the last [`clear`](Self::clear).
    ///
    /// The estimate is the minimum counter across the key's row cells. It
    /// is never below the true insertion count; hash collisions can push
    /// it above.
    pub fn count(&self, key: &K) -> u32 {
        let mut min = u32::MAX;
        for row in 0..self.depth {
            min = min.min(self.counters[self.cell_index(row, key)].load(Relaxed));
        }
        min
    }

    /// Adds every counter of `other` into this sketch.
    ///
    /// Because row hashing is determined by row index alone, merging two
    /// sketches of equal dimensions leaves this sketch cell-for-cell
    /// identical to one that received both key streams directly.
    ///
    /// Inserts racing into `other` while the merge reads it may or may not
    /// be captured; the result always lands between `other`'s pre-merge and
    /// post-merge contents and is never corrupted.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::DimensionMismatch`] unless both sketches share
    /// the same width and depth. Neither sketch is modified on failure.
    ///
    /// # Examples
    ///
    /// ```
    /// use freqsketches::countmin::CountMinSketch;
    /// use freqsketches::error::ErrorKind;
    ///
    /// let left = CountMinSketch::new(500, 3)?;
    /// let right = CountMinSketch::new(500, 3)?;
    /// right.insert(&"only-right");
    /// left.merge(&right)?;
    /// assert!(left.count(&"only-right") >= 1);
    ///
    /// let narrow = CountMinSketch::new(100, 3)?;
    /// let err = left.merge(&narrow).unwrap_err();
    /// assert_eq!(err.kind(), ErrorKind::DimensionMismatch);
    /// # Ok::<(), freqsketches::error::Error>(())
    /// ```
    pub fn merge(&self, other: &Self) -> Result<(), Error> {
        if self.width != other.width || self.depth != other.depth {
            return Err(Error::new(
                ErrorKind::DimensionMismatch,
                "sketches must share width and depth to merge",
            )
            .with_context("width", self.width)
            .with_context("depth", self.depth)
            .with_context("other_width", other.width)
            .with_context("other_depth", other.depth));
        }

        for (cell, other_cell) in self.counters.iter().zip(other.counters.iter()) {
            let value = other_cell.load(Relaxed);
            if value > 0 {
                cell.fetch_add(value, Relaxed);
            }
        }
        self.total_weight
            .fetch_add(other.total_weight.load(Relaxed), Relaxed);
        Ok(())
    }

    /// Resets every counter to zero.
    ///
    /// The stores are per-cell atomic, not one transaction; inserts racing
    /// with a clear may survive in some rows and not others. After a clear
    /// with no concurrent writers, every count is zero.
    pub fn clear(&self) {
        for cell in self.counters.iter() {
            cell.store(0, Relaxed);
        }
        self.total_weight.store(0, Relaxed);
    }

    /// Ranks `candidates` by estimated frequency and returns the top
    /// `min(k, candidates.len())` pairs, highest estimate first.
    ///
    /// The sketch cannot enumerate inserted keys, so candidates must be
    /// supplied by the caller. Candidates with equal estimates keep their
    /// input order (the sort is stable).
    ///
    /// # Examples
    ///
    /// ```
    /// use freqsketches::countmin::CountMinSketch;
    ///
    /// let sketch = CountMinSketch::new(1000, 4)?;
    /// sketch.insert_with_weight(&"a", 3);
    /// sketch.insert(&"b");
    ///
    /// assert_eq!(sketch.top_k(1, &["a", "b"]), vec![("a", 3)]);
    /// assert!(sketch.top_k(5, &["a", "b"]).len() == 2);
    /// assert!(sketch.top_k(0, &["a", "b"]).is_empty());
    /// # Ok::<(), freqsketches::error::Error>(())
    /// ```
    pub fn top_k(&self, k: usize, candidates: &[K]) -> Vec<(K, u32)>
    where
        K: Clone,
    {
        let mut ranked: Vec<(K, u32)> = candidates
            .iter()
            .map(|key| (key.clone(), self.count(key)))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.truncate(k);
        ranked
    }

    /// Returns the number of counters per row.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the number of rows.
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Returns the sum of all inserted weight since the last clear,
    /// including weight brought in by merges.
    pub fn total_weight(&self) -> u64 {
        self.total_weight.load(Relaxed)
    }

    /// Returns true if nothing has been inserted since the last clear.
    pub fn is_empty(&self) -> bool {
        self.total_weight() == 0
    }

    /// Returns the over-estimation bound as a fraction of total weight:
    /// with probability tied to `depth`, an estimate exceeds the true
    /// count by at most `relative_error() * total_weight()`.
    pub fn relative_error(&self) -> f64 {
        std::f64::consts::E / self.width as f64
    }

    #[inline]
    fn cell_index(&self, row: u32, key: &K) -> usize {
        let hash = row_hash(key, self.row_seeds[row as usize]);
        (row as usize) * (self.width as usize) + (hash % u64::from(self.width)) as usize
    }
}

/// Deep copy of the counter matrix.
///
/// Counters are read cell by cell with relaxed loads; cloning concurrently
/// with writers yields a valid sketch that is not a point-in-time snapshot.
impl<K> Clone for CountMinSketch<K> {
    fn clone(&self) -> Self {
        Self {
            width: self.width,
            depth: self.depth,
            counters: self
                .counters
                .iter()
                .map(|cell| AtomicU32::new(cell.load(Relaxed)))
                .collect(),
            row_seeds: self.row_seeds.clone(),
            total_weight: AtomicU64::new(self.total_weight.load(Relaxed)),
            _keys: PhantomData,
        }
    }
}

impl<K> fmt::Debug for CountMinSketch<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CountMinSketch")
            .field("width", &self.width)
            .field("depth", &self.depth)
            .field("total_weight", &self.total_weight.load(Relaxed))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix<K>(sketch: &CountMinSketch<K>) -> Vec<u32> {
        sketch
            .counters
            .iter()
            .map(|cell| cell.load(Relaxed))
            .collect()
    }

    #[test]
    fn test_new_starts_zeroed() {
        let sketch = CountMinSketch::<u64>::new(32, 3).unwrap();
        assert_eq!(sketch.width(), 32);
        assert_eq!(sketch.depth(), 3);
        assert_eq!(sketch.counters.len(), 96);
        assert!(matrix(&sketch).iter().all(|&cell| cell == 0));
        assert!(sketch.is_empty());
        assert_eq!(sketch.total_weight(), 0);
        assert_eq!(sketch.count(&7), 0);
    }

    #[test]
    fn test_new_rejects_zero_dimensions() {
        let err = CountMinSketch::<u64>::new(0, 3).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);

        let err = CountMinSketch::<u64>::new(32, 0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);

        let err = CountMinSketch::<u64>::new(0, 0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_row_seeds_follow_row_index() {
        let sketch = CountMinSketch::<u64>::new(8, 5).unwrap();
        assert_eq!(sketch.row_seeds.as_ref(), &[0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_equal_depth_sketches_hash_identically() {
        let left = CountMinSketch::<&str>::new(64, 4).unwrap();
        let right = CountMinSketch::<&str>::new(64, 4).unwrap();
        for key in ["a", "b", "c", "a"] {
            left.insert(&key);
            right.insert(&key);
        }
        assert_eq!(matrix(&left), matrix(&right));
    }

    #[test]
    fn test_merge_matches_concatenated_stream_cell_for_cell() {
        let stream_a = ["a", "b", "a", "d"];
        let stream_b = ["b", "c", "c", "c", "e"];

        let left = CountMinSketch::<&str>::new(16, 3).unwrap();
        let right = CountMinSketch::<&str>::new(16, 3).unwrap();
        let combined = CountMinSketch::<&str>::new(16, 3).unwrap();

        for key in stream_a {
            left.insert(&key);
            combined.insert(&key);
        }
        for key in stream_b {
            right.insert(&key);
            combined.insert(&key);
        }

        left.merge(&right).unwrap();
        assert_eq!(matrix(&left), matrix(&combined));
        assert_eq!(left.total_weight(), combined.total_weight());
    }

    #[test]
    fn test_merge_mismatch_modifies_neither_operand() {
        let left = CountMinSketch::<&str>::new(16, 3).unwrap();
        let right = CountMinSketch::<&str>::new(16, 4).unwrap();
        left.insert(&"a");
        right.insert(&"b");
        let left_before = matrix(&left);
        let right_before = matrix(&right);

        let err = left.merge(&right).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DimensionMismatch);
        assert_eq!(matrix(&left), left_before);
        assert_eq!(matrix(&right), right_before);

        let narrow = CountMinSketch::<&str>::new(8, 3).unwrap();
        let err = left.merge(&narrow).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DimensionMismatch);
        assert_eq!(matrix(&left), left_before);
    }

    #[test]
    fn test_merge_with_self_doubles_cells() {
        let sketch = CountMinSketch::<&str>::new(16, 3).unwrap();
        sketch.insert(&"a");
        sketch.insert_with_weight(&"b", 4);
        let before = matrix(&sketch);

        sketch.merge(&sketch).unwrap();
        let doubled: Vec<u32> = before.iter().map(|cell| cell * 2).collect();
        assert_eq!(matrix(&sketch), doubled);
        assert_eq!(sketch.total_weight(), 10);
    }

    #[test]
    fn test_top_k_ties_keep_candidate_order() {
        let sketch = CountMinSketch::<&str>::new(1024, 4).unwrap();
        for key in ["x", "y", "z"] {
            sketch.insert(&key);
        }
        let ranked = sketch.top_k(3, &["z", "x", "y"]);
        assert_eq!(ranked, vec![("z", 1), ("x", 1), ("y", 1)]);
    }

    #[test]
    fn test_clone_is_a_deep_copy() {
        let sketch = CountMinSketch::<&str>::new(64, 4).unwrap();
        sketch.insert_with_weight(&"a", 5);

        let snapshot = sketch.clone();
        sketch.insert_with_weight(&"a", 5);

        assert_eq!(snapshot.count(&"a"), 5);
        assert_eq!(sketch.count(&"a"), 10);
        assert_eq!(snapshot.total_weight(), 5);
    }

    #[test]
    fn test_suggest_width_reference_points() {
        assert_eq!(CountMinSketch::<u64>::suggest_width(0.2), 14);
        assert_eq!(CountMinSketch::<u64>::suggest_width(0.1), 28);
        assert_eq!(CountMinSketch::<u64>::suggest_width(0.05), 55);
        assert_eq!(CountMinSketch::<u64>::suggest_width(0.01), 272);
    }

    #[test]
    fn test_suggest_depth_reference_points() {
        assert_eq!(CountMinSketch::<u64>::suggest_depth(0.682689492), 2);
        assert_eq!(CountMinSketch::<u64>::suggest_depth(0.954499736), 4);
        assert_eq!(CountMinSketch::<u64>::suggest_depth(0.997300204), 6);
    }

    #[test]
    fn test_relative_error_tracks_width() {
        let width = CountMinSketch::<u64>::suggest_width(0.1);
        let sketch = CountMinSketch::<u64>::new(width, 3).unwrap();
        assert!(sketch.relative_error() <= 0.1);
    }

    #[test]
    #[should_panic(expected = "relative_error must be in (0, 1)")]
    fn test_suggest_width_rejects_zero() {
        CountMinSketch::<u64>::suggest_width(0.0);
    }

    #[test]
    #[should_panic(expected = "confidence must be in (0, 1)")]
    fn test_suggest_depth_rejects_one() {
        CountMinSketch::<u64>::suggest_depth(1.0);
    }
}
