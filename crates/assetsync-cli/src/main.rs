use assetsync_lib::cli::{ResolvedCommand, parse_args, resolve_command, run_sync, run_verify};
use assetsync_lib::error::AssetSyncError;

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<(), AssetSyncError> {
    color_eyre::install()?;

    let args = parse_args();
    let command = resolve_command(args.command)?;

    match command {
        ResolvedCommand::Sync(params) => {
            run_sync(params).await?;
        }
        ResolvedCommand::Verify(params) => {
            run_verify(params).await?;
        }
    }

    Ok(())
}
