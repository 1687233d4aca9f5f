pub mod doc_create;
pub mod doc_get;
pub mod health;

pub use doc_create::*;
pub use doc_get::*;
pub use health::*;
