//! On-demand media retrieval for the local proxy.

use bridge_traits::file_store::FileStoreClient;
use std::io;
use std::path::Path;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::io::{AsyncRead, ReadBuf};
use tracing::debug;

/// MIME type served for `name`, chosen by extension.
pub fn content_type_for(name: &str) -> &'static str {
    let extension = Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    match extension.as_deref() {
        Some("mp4") => "video/mp4",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        _ => "application/octet-stream",
    }
}

/// A remote asset being read through its own file store session.
///
/// The session stays open for as long as the stream lives. Call
/// [`AssetStream::finish`] once done to release it politely; dropping the
/// stream drops the connection without a goodbye.
pub struct AssetStream {
    remote_path: String,
    content_type: &'static str,
    reader: Box<dyn AsyncRead + Send + Unpin>,
    session: Box<dyn FileStoreClient>,
}

impl AssetStream {
    pub(crate) fn new(
        remote_path: String,
        reader: Box<dyn AsyncRead + Send + Unpin>,
        session: Box<dyn FileStoreClient>,
    ) -> Self {
        let content_type = content_type_for(&remote_path);
        Self {
            remote_path,
            content_type,
            reader,
            session,
        }
    }

    /// Path on the remote store after resolution.
    pub fn remote_path(&self) -> &str {
        &self.remote_path
    }

    pub fn content_type(&self) -> &'static str {
        self.content_type
    }

    /// Close the underlying session.
    pub async fn finish(self) {
        if let Err(e) = self.session.close().await {
            debug!(path = %self.remote_path, error = %e, "File store close failed");
        }
    }
}

impl AsyncRead for AssetStream {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Pin::new(&mut self.reader).poll_read(cx, buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_types() {
        assert_eq!(content_type_for("clip.mp4"), "video/mp4");
        assert_eq!(content_type_for("upload/photo.jpg"), "image/jpeg");
        assert_eq!(content_type_for("photo.JPEG"), "image/jpeg");
        assert_eq!(content_type_for("logo.png"), "image/png");
        assert_eq!(content_type_for("anim.gif"), "image/gif");
        assert_eq!(content_type_for("jingle.mp3"), "application/octet-stream");
        assert_eq!(content_type_for("README"), "application/octet-stream");
    }
}
