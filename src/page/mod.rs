pub mod document;

pub use document::{ids, Document, PageError};
