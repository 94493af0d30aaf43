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

//! Count-Min sketch implementation for frequency estimation.
//!
//! The Count-Min sketch provides approximate frequency counts for streaming
//! data in fixed memory. Estimates never under-count: hash collisions can
//! only inflate them. Counters are individually atomic, so a single sketch
//! can be updated and queried from any number of threads without locking.
//!
//! # Usage
//!
//! ```rust
//! use freqsketches::countmin::CountMinSketch;
//!
//! let sketch = CountMinSketch::new(256, 5)?;
//!
//! sketch.insert(&"apple");
//! sketch.insert_with_weight(&"banana", 3);
//!
//! assert!(sketch.count(&"banana") >= 3);
//! # Ok::<(), freqsketches::error::Error>(())
//! ```
//!
//! # Configuration Helpers
//!
//! ```rust
//! use freqsketches::countmin::CountMinSketch;
//!
//! let width = CountMinSketch::<u64>::suggest_width(0.01);
//! let depth = CountMinSketch::<u64>::suggest_depth(0.99);
//!
//! let _sketch = CountMinSketch::<u64>::new(width, depth)?;
//! # Ok::<(), freqsketches::error::Error>(())
//! ```

mod sketch;
pub use self::sketch::CountMinSketch;
