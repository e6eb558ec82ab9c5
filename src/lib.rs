//! ref-footnotes: Footnote post-processing for converted Markdown
//!
//! Commands:
//! - process: Separate adjacent footnote markers and turn bare-URL footnotes
//!   into titled links stamped with a retrieval date
//! - title: Resolve URLs to page/PDF titles

pub mod browser;
pub mod context;
pub mod edit;
pub mod error;
pub mod error_log;
pub mod fetch;
pub mod footnotes;
pub mod logging;
pub mod pdf;
pub mod pipeline;
pub mod resolver;
pub mod separator;
pub mod stats;
pub mod title;

pub use context::RunContext;
pub use error::{FetchError, ResolveError};
pub use fetch::{build_fetcher, FetchConfig, FetchResponse, Fetcher, HttpFetcher, TransportKind};
pub use pipeline::{process_document, process_file, ProcessConfig};
pub use resolver::{Resolution, TitleResolver};
pub use separator::separate_markers;
pub use stats::{Progress, RunCounters, RunSummary};
