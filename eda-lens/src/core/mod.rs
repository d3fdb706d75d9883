//! Loaded data: the typed [`Table`] and the [`Dataset`] that pairs it with its
//! column classification and a DataFusion context.
//!
//! ```text
//! CSV bytes ──parse──▶ raw text batch ──classify──▶ ColumnClassification
//!                             │                            │
//!                             └──────── Table::from_raw ◀──┘
//!                                            │
//!                                   Dataset (table + classification + SessionContext)
//! ```

pub mod dataset;
pub mod table;

pub use dataset::{Dataset, DATA_TABLE};
pub use table::{Table, TableInfo};
