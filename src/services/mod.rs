//! Services for quoting, comparison and export

pub mod aggregator;
pub mod catalog;
pub mod dispatcher;
pub mod exporter;
pub mod lotes;
pub mod normalizer;
pub mod sorter;
pub mod store;
pub mod validation;

pub use aggregator::{format_mxn, Aggregator};
pub use catalog::CatalogClient;
pub use dispatcher::{QuoteDispatcher, QuoteEvent};
pub use exporter::{export_comparison, write_layout_template};
pub use lotes::LoteClient;
pub use normalizer::{normalize_result, normalize_results};
pub use sorter::{sort_insurers, table_view};
pub use store::{QuoteStore, StoredQuote};
pub use validation::{build_request, validate_quote_input};
