use std::path::Path;

use depfix_fs::Absolute;

use crate::{Config, Io, read_depfile, rewrite_source_paths};

/// What happened to a depfile passed to [`make_paths_relative_in_output_dep`].
///
/// None of these are errors: a depfile that could not be normalized only
/// makes the cached result less portable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// No base directory is configured.
    Disabled,
    /// The depfile could not be read.
    ReadFailed,
    /// No paths needed to be made relative. The file was not touched.
    Unchanged,
    /// Paths were made relative and the file was written back.
    Rewritten,
    /// Paths were made relative, but the file could not be written back.
    WriteFailed,
}

/// Replace absolute paths with relative paths in a compiler-generated depfile,
/// in place.
pub fn make_paths_relative_in_output_dep(
    io: &dyn Io,
    config: &Config,
    cwd: &Absolute<str>,
    output_dep: &Absolute<Path>,
) -> Outcome {
    if config.base_dir.is_empty() {
        tracing::debug!("Base dir not set, skip using relative paths");
        return Outcome::Disabled;
    }

    let file_content = match read_depfile(io, output_dep) {
        Ok(file_content) => file_content,
        Err(err) => {
            tracing::warn!(
                "Cannot open dependency file {}: {err}",
                output_dep.display()
            );
            return Outcome::ReadFailed;
        }
    };

    let ctx = config.relative_path_context(cwd);
    let Some(new_content) = rewrite_source_paths(&ctx, &file_content) else {
        tracing::debug!(
            "No paths in dependency file {} made relative",
            output_dep.display()
        );
        return Outcome::Unchanged;
    };

    match io.write_file(output_dep, new_content.as_bytes()) {
        Ok(()) => {
            tracing::debug!("Made paths relative in {}", output_dep.display());
            Outcome::Rewritten
        }
        Err(err) => {
            tracing::warn!(
                "Cannot write dependency file {}: {err}",
                output_dep.display()
            );
            Outcome::WriteFailed
        }
    }
}
