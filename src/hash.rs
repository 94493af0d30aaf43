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

//! Seeded hashing shared by the sketch families.
//!
//! Hash values are a pure function of `(key, seed)`: the same pair produces
//! the same value in any process on any platform. Sketches derive one seed
//! per row, so two sketches configured identically agree on bucket
//! placement for every key.

use std::hash::Hash;
use std::hash::Hasher;

/// Hashes `key` under the row hash function identified by `seed`.
pub(crate) fn row_hash<K: Hash + ?Sized>(key: &K, seed: u32) -> u64 {
    let mut hasher = mur3::Hasher128::with_seed(seed);
    key.hash(&mut hasher);
    let (h1, _) = hasher.finish128();
    h1
}
