pub mod api_handlers;
pub mod page_handlers;

pub use api_handlers::*;
pub use page_handlers::*;
