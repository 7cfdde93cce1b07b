//! Streaming file copy

use std::io;
use std::path::Path;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::debug;
use treecp_types::{BufferSize, Error, FileInfo, Result, Transformer};

/// Open a source file for reading
pub async fn open_source(path: &Path) -> io::Result<File> {
    File::open(path).await
}

/// Create (or truncate) a destination file, requesting `mode` on creation
pub async fn create_destination(path: &Path, mode: u32) -> io::Result<File> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    options.mode(mode);
    #[cfg(not(unix))]
    let _ = mode;
    options.open(path).await
}

/// Move every byte from `reader` to `writer` in `buffer_size` chunks.
///
/// Returns the number of bytes written. The writer is not flushed.
pub async fn stream_copy<R, W>(reader: &mut R, writer: &mut W, buffer_size: usize) -> io::Result<u64>
where
    R: AsyncRead + Unpin + ?Sized,
    W: AsyncWrite + Unpin + ?Sized,
{
    let mut buffer = vec![0u8; buffer_size.max(1)];
    let mut bytes_copied = 0u64;

    loop {
        let bytes_read = match reader.read(&mut buffer).await {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        writer.write_all(&buffer[..bytes_read]).await?;
        bytes_copied += bytes_read as u64;
    }

    Ok(bytes_copied)
}

/// Writer adapter counting the bytes that pass through it
#[derive(Debug)]
pub struct CountingWriter<W> {
    inner: W,
    written: u64,
}

impl<W> CountingWriter<W> {
    /// Wrap a writer
    pub fn new(inner: W) -> Self {
        Self { inner, written: 0 }
    }

    /// Bytes accepted by the inner writer so far
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Unwrap the inner writer
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: AsyncWrite + Unpin> AsyncWrite for CountingWriter<W> {
    fn poll_write(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        let this = &mut *self;
        match Pin::new(&mut this.inner).poll_write(cx, buf) {
            Poll::Ready(Ok(n)) => {
                this.written += n as u64;
                Poll::Ready(Ok(n))
            }
            other => other,
        }
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.inner).poll_flush(cx)
    }

    fn poll_shutdown(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.inner).poll_shutdown(cx)
    }
}

/// Buffered file copier used when no transform is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct BufferedCopier {
    buffer_size: BufferSize,
}

impl BufferedCopier {
    /// Create a copier with the given buffer size
    pub fn new(buffer_size: BufferSize) -> Self {
        Self { buffer_size }
    }

    /// Copy `from` to `to` byte for byte, creating `to` with `mode`.
    ///
    /// Any failure, including opening either side, is reported as
    /// [`Error::Copy`].
    pub async fn copy_file(&self, from: &Path, to: &Path, mode: u32) -> Result<u64> {
        let mut reader = open_source(from)
            .await
            .map_err(|e| Error::copy(from, to, e))?;
        let mut writer = create_destination(to, mode)
            .await
            .map_err(|e| Error::copy(from, to, e))?;

        let bytes_copied = stream_copy(&mut reader, &mut writer, self.buffer_size.get())
            .await
            .map_err(|e| Error::copy(from, to, e))?;
        writer
            .shutdown()
            .await
            .map_err(|e| Error::copy(from, to, e))?;

        debug!(
            "Copied {} -> {} ({} bytes)",
            from.display(),
            to.display(),
            bytes_copied
        );
        Ok(bytes_copied)
    }

    /// Hand the byte copy of `info` over to `transformer`.
    ///
    /// Opens both sides the same way [`copy_file`](Self::copy_file) does, waits
    /// for the transformer, then closes the destination. Returns the number of
    /// bytes the transformer wrote.
    pub async fn transform_file(
        &self,
        info: &FileInfo,
        to: &Path,
        transformer: &dyn Transformer,
    ) -> Result<u64> {
        let from = info.path.as_path();
        let mut reader = open_source(from)
            .await
            .map_err(|e| Error::copy(from, to, e))?;
        let writer = create_destination(to, info.mode)
            .await
            .map_err(|e| Error::copy(from, to, e))?;
        let mut writer = CountingWriter::new(writer);

        transformer
            .transform(&mut reader, &mut writer, info)
            .await
            .map_err(|e| Error::copy(from, to, e))?;
        writer
            .shutdown()
            .await
            .map_err(|e| Error::copy(from, to, e))?;

        debug!(
            "Transformed {} -> {} ({} bytes written)",
            from.display(),
            to.display(),
            writer.written()
        );
        Ok(writer.written())
    }
}
