pub mod error;
pub mod export;
pub mod output;
pub mod tables;

pub use error::ExportError;
pub use export::{export_documents, ExportSummary};
pub use output::{check_output_conflicts, existing_outputs, OutputMode};
pub use tables::{BatchRows, DocumentTables, Table};
