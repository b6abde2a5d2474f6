//! Receipt field extraction module.

mod extractor;
mod lines;
mod normalize;
pub mod rules;

pub use extractor::{extract, ReceiptExtractor};
pub use lines::{lines, ReceiptText};
pub use normalize::{DateNormalizer, DateResolution};
