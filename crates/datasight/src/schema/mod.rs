//! Schema inference and column typing.

mod column;
mod infer;
mod types;

pub use column::{ColumnSchema, TableSchema};
pub use infer::{has_date_name_hint, InferenceConfig, SchemaInferencer, DATE_NAME_TOKENS};
pub use types::{ColumnRole, ColumnType};
