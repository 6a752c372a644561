//! Search terms, query contexts, results and client-side filtering

pub mod context;
pub mod filter;
pub mod result;
pub mod term;

pub use context::SearchContext;
pub use filter::apply_post_filters;
pub use result::{PackageStream, SearchResult};
pub use term::{SearchTerm, SearchTermKind};
