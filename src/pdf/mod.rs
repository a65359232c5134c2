pub mod copy;
pub mod document;

#[cfg(test)]
pub mod testing;

pub use copy::{copy_pages, PageCopy};
pub use document::PdfDocument;
