//! Mask OAuth consumer secret placeholders in a resource file

use clap::Args;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

use idsync_core::masking;
use idsync_core::{SyncError, SyncResult};

#[derive(Args, Debug)]
pub struct MaskArgs {
    /// Resource file to mask
    pub file: PathBuf,

    /// Rewrite the file instead of printing to stdout
    #[arg(short = 'i', long)]
    pub in_place: bool,
}

pub fn execute(args: MaskArgs) -> SyncResult<()> {
    let raw = fs::read(&args.file).map_err(|e| SyncError::Read {
        path: args.file.clone(),
        message: e.to_string(),
    })?;
    let masked = masking::mask(&raw);

    if args.in_place {
        if masked != raw {
            fs::write(&args.file, &masked).map_err(|e| {
                SyncError::Io(format!(
                    "Failed to write to file {}: {}",
                    args.file.display(),
                    e
                ))
            })?;
            tracing::info!(file = %args.file.display(), "masked consumer secret");
        }
        return Ok(());
    }

    std::io::stdout().write_all(&masked)?;
    Ok(())
}
