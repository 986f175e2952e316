pub mod chain;
pub mod filename;
pub mod metadata;

pub use chain::{DirectoryHandleTarget, DownloadTarget, PersistenceChain, PickerTarget};
