pub mod etl;
pub mod extractor;
pub mod ledger;
pub mod parser;
pub mod patterns;
pub mod pipeline;
pub mod segmenter;

pub use crate::domain::model::{Ledger, PayeeRecord};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage, TextExtractor};
pub use crate::utils::error::Result;
