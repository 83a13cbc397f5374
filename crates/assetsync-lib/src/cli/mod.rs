mod args;
mod params;
mod resolved_command;
mod sync;
mod verify;

pub use args::{Args, Command, DownloadOverrides, SourceArgs, parse_args};
pub use params::{SyncParams, SyncPlan, VerifyParams};
pub use resolved_command::{ResolvedCommand, resolve_command};
pub use sync::{PlatformSyncReport, run_sync};
pub use verify::{PlatformVerifyReport, run_verify};
