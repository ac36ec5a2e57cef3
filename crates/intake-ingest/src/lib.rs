//! File-backed collaborators: CSV workbooks as row sources and a JSON file
//! as the lead store.

pub mod json_store;
pub mod workbook;

pub use json_store::JsonLeadStore;
pub use workbook::CsvWorkbook;
