mod file_scanner;
mod path_validator;
mod progress;

pub use file_scanner::scan_input_files;
pub use path_validator::{ensure_directory_exists, validate_directory_exists};
pub use progress::Progress;
