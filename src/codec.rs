use futures_util::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};

use crate::Result;

/// Reads newline-terminated UTF-8 lines from an async byte stream.
pub struct LineReader<R> {
    inner: BufReader<R>,
}

impl<R: AsyncRead + Unpin> LineReader<R> {
    /// Creates a new LineReader.
    pub fn new(stream: R) -> Self {
        Self {
            inner: BufReader::new(stream),
        }
    }

    /// Reads the next line from the stream, without its trailing newline.
    ///
    /// Returns `None` when the stream ends cleanly at a line boundary. A
    /// stream that ends in the middle of a line is treated as an error and
    /// the partial text is discarded.
    pub async fn next_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        let n = self.inner.read_line(&mut line).await?;

        if n == 0 {
            return Ok(None);
        }

        // The stream ended before the line terminator.
        if !line.ends_with('\n') {
            return Err(std::io::Error::from(std::io::ErrorKind::UnexpectedEof).into());
        }

        line.pop();
        Ok(Some(line))
    }
}

/// Writes a line to the stream, appending the newline terminator, and
/// flushes it.
pub async fn write_line<W: AsyncWrite + Unpin>(stream: &mut W, line: &str) -> Result<()> {
    let mut buf = Vec::with_capacity(line.len() + 1);
    buf.extend_from_slice(line.as_bytes());
    buf.push(b'\n');

    stream.write_all(&buf).await?;
    stream.flush().await?;

    Ok(())
}
