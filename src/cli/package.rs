//! Package command: build the archive without deploying it.

use tracing::debug;

use crate::cli::output;
use crate::cli::PackageArgs;
use crate::core::archive::ArchiveSpec;
use crate::core::constants::INLINE_CONTENT_LIMIT;
use crate::error::Result;

/// Execute the package command.
pub fn execute(args: PackageArgs) -> Result<()> {
    let config = args.source.to_config()?;
    let spec = ArchiveSpec::new(
        &args.source.workspace,
        &config.source_root,
        &config.include,
        &config.exclude,
    );

    let list = args.list;
    let buffer = spec.build(&mut |entry| {
        debug!(name = %entry.name, source = %entry.source.display(), "adding file");
        if list {
            output::dimmed(&format!("  {}", entry.name));
        }
    })?;

    std::fs::write(&args.output, buffer.as_bytes())?;

    output::success(&format!("wrote {}", output::name(&args.output.display().to_string())));
    output::kv("files ", buffer.entries());
    output::kv("size  ", format!("{} bytes", buffer.len()));
    output::kv("sha256", buffer.sha256_hex());
    if buffer.exceeds_inline_limit() {
        output::warn(&format!(
            "archive is larger than {} bytes and cannot be sent inline",
            INLINE_CONTENT_LIMIT
        ));
        output::hint("set a bucket to deploy through Object Storage");
    }
    Ok(())
}
