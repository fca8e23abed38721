pub mod environment;
pub mod logging;
pub mod paths;

pub use environment::{Settings, get_claude_dir};
pub use logging::init_logging;
pub use paths::{active_session_path, encode_project_dir, short_sha, validate_path_not_symlink};
