//! Dataset model: typed cells, rectangular tables, CSV ingestion.

mod reader;
mod table;
mod value;

pub use reader::{CsvReader, ReaderConfig};
pub use table::Dataset;
pub use value::{format_number, is_null_text, month_key, parse_date, parse_number, CellValue};
