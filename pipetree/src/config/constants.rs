//! Stage type and option key literals.

/// Stage type served by the local directory provider.
pub const LOCAL_DIRECTORY_STAGE: &str = "LocalDirectoryPipelineStage";

/// Stage type served by the local file provider.
pub const LOCAL_FILE_STAGE: &str = "LocalFilePipelineStage";

/// Option naming the stage type.
pub const OPTION_TYPE: &str = "type";

/// Option holding the source path.
pub const OPTION_FILEPATH: &str = "filepath";
