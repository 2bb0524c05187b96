//! Checkpointing and time travel.
//!
//! Every engine iteration appends a [`Checkpoint`] through a [`Checkpointer`]:
//! [`MemorySaver`] in-process, `SqliteSaver` on disk (feature `sqlite`).
//! [`TimeTravel`] reads the log back and resumes runs from any index.

mod checkpoint;
mod checkpointer;
mod config;
mod memory_saver;
mod serializer;
#[cfg(feature = "sqlite")]
mod sqlite_saver;
mod time_travel;

pub use checkpoint::{Checkpoint, CheckpointMetadata, CheckpointSource};
pub use checkpointer::{CheckpointError, Checkpointer};
pub use config::RunnableConfig;
pub use memory_saver::MemorySaver;
pub use serializer::{JsonSerializer, Serializer};
#[cfg(feature = "sqlite")]
pub use sqlite_saver::SqliteSaver;
pub use time_travel::{ExecutionTrace, TimeTravel, TraceRow};
