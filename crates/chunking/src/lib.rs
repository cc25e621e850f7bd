// Copyright 2025 Stratum Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Stratum Hierarchical Chunking
//!
//! Splits a document into four aligned granularities — sentence, paragraph,
//! section, summary — with parent/child links built during construction.
//! Pure and stateless: no I/O, no async, safe to share across threads.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod config;
mod error;
mod hierarchical;
mod paragraphs;
mod sections;
mod sentences;
mod summary;

pub use config::{ChunkingConfig, LevelConfig};
pub use error::{ChunkingError, ChunkingResult};
pub use hierarchical::{ChunkedDocument, HierarchicalChunker};
pub use paragraphs::split_into_paragraphs;
pub use sections::{split_into_sections, RawSection};
pub use sentences::split_into_sentences;
pub use summary::{create_summary_chunks, RawSummaryChunk};

/// Re-exports commonly used types.
pub mod prelude {
    pub use crate::{ChunkedDocument, ChunkingConfig, HierarchicalChunker};
}
