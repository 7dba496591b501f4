// Metadata extraction
//
// `MetadataFetcher` is the seam between the request pipeline and the
// out-of-process extractor. `YtDlpFetcher` is the production implementation;
// tests plug in stubs.

mod cli;
mod diagnostics;
mod traits;

pub use cli::YtDlpFetcher;
pub use diagnostics::{classify_failure, diagnose_error, BlockingReason};
pub use traits::{FetcherConfig, MetadataFetcher, DEFAULT_REFERER, DEFAULT_USER_AGENT};
