pub mod file_list;
pub mod file_scanner;

pub use file_list::{FileListProvider, StaticFileList};
pub use file_scanner::{FileScanner, ScanConfig};
