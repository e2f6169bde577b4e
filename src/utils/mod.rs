pub mod environment;
pub mod logging;
pub mod paths;
pub mod terminal;
pub mod timestamps;

pub use environment::Settings;
pub use logging::init_logging;
pub use paths::{
    EXPORT_FILE_NAME, asset_root_for, expand_tilde, format_path_with_tilde, resolve_export_file,
    validate_file_size,
};
pub use terminal::{preview, strip_ansi_codes};
pub use timestamps::{format_timestamp, time_group};
