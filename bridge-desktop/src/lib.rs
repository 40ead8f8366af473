//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for desktop and embedded Linux
//! hosts.
//!
//! ## Overview
//!
//! - `HttpClient` using `reqwest`
//! - `FileSystemAccess` using `tokio::fs`
//! - `FileStoreClient` over FTP using `suppaftp`
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{FtpConnector, ReqwestHttpClient, TokioFileSystem};
//!
//! let http_client = ReqwestHttpClient::new();
//! let fs = TokioFileSystem::new();
//! let file_store = FtpConnector::new(settings);
//! ```

mod filesystem;
mod ftp;
mod http;

pub use filesystem::TokioFileSystem;
pub use ftp::{FtpConnector, FtpFileStore};
pub use http::ReqwestHttpClient;
