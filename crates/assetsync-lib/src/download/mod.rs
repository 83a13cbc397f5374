mod counters;
#[allow(clippy::module_inception)]
mod download;
mod progress;
mod source;
mod types;

pub use counters::{CounterSnapshot, EngineCounters};
pub use download::Downloader;
pub use progress::{format_elapsed, formatted_percent, human_readable_megabytes};
pub use source::{AssetSource, DEFAULT_USER_AGENT, HttpAssetSource};
pub use types::{DownloadOptions, FetchOutcome, PassSettings, PassSummary, SyncSummary};
