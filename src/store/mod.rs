pub mod factory;
pub mod interface;
pub mod memory;
pub mod supabase;

pub use factory::StoreFactory;
pub use interface::{StoreError, Table, TranslationStore};
pub use memory::MemoryStore;
