pub mod document;
pub mod extract;
pub mod outline;
pub mod ranges;
pub mod report;

#[cfg(test)]
pub mod test_support;

pub use document::PdfDocument;
