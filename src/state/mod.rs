// State module - snapshot/restore and the versioned patch document

pub mod snapshot;
pub mod store;

pub use snapshot::{DrumSteps, EngineSnapshot, PatchDocument, DOCUMENT_VERSION};
pub use store::{StateError, StateStore};
