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

//! Streaming frequency-estimation sketches.
//!
//! Sketches answer frequency questions about unbounded key streams in
//! fixed memory by trading exactness for a bounded, one-sided error. The
//! [`countmin`] family estimates "how many times has this key been seen?"
//! with over-estimation as the only failure mode, using a matrix of
//! atomic counters that is safe to share across threads without locking.
//!
//! ```rust
//! use freqsketches::countmin::CountMinSketch;
//!
//! let sketch = CountMinSketch::new(1024, 4)?;
//! for request in ["/index", "/index", "/health"] {
//!     sketch.insert(&request);
//! }
//!
//! assert!(sketch.count(&"/index") >= 2);
//! let busiest = sketch.top_k(1, &["/index", "/health"]);
//! assert_eq!(busiest[0].0, "/index");
//! # Ok::<(), freqsketches::error::Error>(())
//! ```
//!
//! Fallible operations return [`error::Error`]; see [`error::ErrorKind`]
//! for the failure taxonomy.

pub mod countmin;
pub mod error;

mod hash;
