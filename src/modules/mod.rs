pub mod authors;
pub mod books;

use std::sync::Arc;

use bookstore_db::DocumentStore;
use bookstore_kernel::ModuleRegistry;

/// Register every catalog module. Authors come first so their seed data
/// exists before books reference it.
pub fn register_all(registry: &mut ModuleRegistry, store: Arc<dyn DocumentStore>) {
    registry.register(authors::create_module(store.clone()));
    registry.register(books::create_module(store));
}
