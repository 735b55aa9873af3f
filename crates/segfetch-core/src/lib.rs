pub mod config;
pub mod logging;

pub mod downloader;
pub mod error;
pub mod filename;
pub mod headers;
pub mod http;
pub mod probe;
pub mod progress;
pub mod retry;
pub mod segmenter;
pub mod storage;

pub use downloader::{DownloadMode, DownloadOptions, DownloadReport, Downloader};
pub use error::DownloadError;
pub use headers::HeaderList;
pub use progress::{ProgressEvent, ProgressObserver};
