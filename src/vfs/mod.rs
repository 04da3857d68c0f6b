mod dir_store;
mod entry;
mod mem_file;
mod mem_store;

pub use dir_store::DirStore;
pub use entry::{Entry, EntryType};
pub use mem_file::MemFile;
pub use mem_store::MemStore;
