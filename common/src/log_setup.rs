use std::path::Path;

use flexi_logger::{
    Cleanup, Criterion, Duplicate, FileSpec, FlexiLoggerError, Logger, LoggerHandle, Naming,
};

/// Start the global logger.
///
/// With `log_dir` set, records go to size-rotated files named after
/// `basename` in that directory and warnings are duplicated to stderr.
/// Without it everything goes to stderr.
/// The returned handle must be kept alive for the lifetime of the program.
pub fn setup_logging(
    base_level: &str,
    log_dir: Option<&Path>,
    basename: &str,
) -> Result<LoggerHandle, FlexiLoggerError> {
    let logger = Logger::try_with_env_or_str(base_level)?;

    let logger = match log_dir {
        Some(dir) => logger
            .log_to_file(FileSpec::default().directory(dir).basename(basename))
            .duplicate_to_stderr(Duplicate::Warn)
            .rotate(
                Criterion::Size(1024 * 1024), //1MB
                Naming::Timestamps,
                Cleanup::KeepLogFiles(5),
            ),
        None => logger.log_to_stderr(),
    };

    logger.start()
}
