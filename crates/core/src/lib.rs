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

//! Stratum Core Data Types
//!
//! Fundamental data structures shared by every layer of the Sheet RAG
//! pipeline: the chunk arena (`ChunkNode`), the granularity ladder
//! (`Level`), and the error type collaborators convert into at their
//! boundaries.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod chunk;
mod error;
mod level;

pub use chunk::{generate_chunk_id, ChunkNode};
pub use error::{CoreError, CoreResult};
pub use level::Level;

/// Re-exports commonly used types.
pub mod prelude {
    pub use crate::{ChunkNode, CoreError, Level};
}
