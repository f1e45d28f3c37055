use std::time::Duration;

use async_channel::{Receiver, Sender};
use futures_util::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use libp2p::{PeerId, StreamProtocol};
use libp2p_stream as stream;
use log::{debug, error, info, trace};

use crate::{
    codec::{self, LineReader},
    Error, Result,
};

/// Protocol identifier for chat streams.
pub const CHAT_PROTOCOL: StreamProtocol = StreamProtocol::new("/simple-chat/1.0.0");

/// Handles a single inbound chat stream.
///
/// Prints the remote peer identity once, then reads newline-terminated
/// messages and prints each one until the stream closes or fails. Exactly
/// one closed notice is printed on termination.
pub async fn handle_stream<R>(peer: PeerId, chat_stream: R)
where
    R: AsyncRead + Unpin,
{
    println!("Connected to: {peer}");

    let mut lines = LineReader::new(chat_stream);
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => println!("Received: {line}"),
            Ok(None) => break,
            Err(err) => {
                trace!("Chat stream from {peer}: {err}");
                break;
            }
        }
    }

    println!("Connection closed.");
}

/// Opens a chat stream to the given peer and greets it periodically.
///
/// A failure to open the stream is fatal and is reported on `err_chan`; a
/// write failure only stops this task.
pub(crate) async fn run_greeter(
    mut control: stream::Control,
    peer: PeerId,
    local_id: PeerId,
    interval: Duration,
    err_chan: Sender<Error>,
    shutdown: Receiver<()>,
) {
    let chat_stream = match control.open_stream(peer, CHAT_PROTOCOL).await {
        Ok(s) => s,
        Err(err) => {
            let _ = err_chan.send(Error::StreamOpen(err)).await;
            return;
        }
    };

    info!("Opened a chat stream to {peer}");

    if let Err(err) = greeting_loop(chat_stream, local_id, interval, shutdown).await {
        error!("Error sending message: {err}");
    }
}

/// Periodically writes a newline-terminated greeting carrying the local
/// peer identity to the stream.
///
/// The first greeting is written immediately. Runs until a write fails or
/// the shutdown channel closes; on shutdown the stream is closed before
/// returning.
pub async fn greeting_loop<W>(
    mut chat_stream: W,
    local_id: PeerId,
    interval: Duration,
    shutdown: Receiver<()>,
) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let greeting = format!("Hello from {local_id}");

    loop {
        codec::write_line(&mut chat_stream, &greeting).await?;
        trace!("Send greeting message");

        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = shutdown.recv() => {
                debug!("Greeting loop stopped");
                let _ = chat_stream.close().await;
                return Ok(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        pin::Pin,
        sync::{
            atomic::{AtomicUsize, Ordering},
            Arc,
        },
        task::{Context, Poll},
    };

    use futures_util::io::Cursor;

    use super::*;

    /// An AsyncWrite mock that fails with a scripted error on the given
    /// write attempt.
    struct ScriptedStream {
        writes: Arc<AtomicUsize>,
        fail_on: usize,
    }

    impl AsyncWrite for ScriptedStream {
        fn poll_write(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &[u8],
        ) -> Poll<std::io::Result<usize>> {
            if self.writes.load(Ordering::SeqCst) + 1 == self.fail_on {
                return Poll::Ready(Err(std::io::ErrorKind::BrokenPipe.into()));
            }

            self.writes.fetch_add(1, Ordering::SeqCst);
            Poll::Ready(Ok(buf.len()))
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
            Poll::Ready(Ok(()))
        }

        fn poll_close(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
            Poll::Ready(Ok(()))
        }
    }

    #[tokio::test]
    async fn test_greeting_loop_stops_after_write_failure() {
        let writes = Arc::new(AtomicUsize::new(0));
        let chat_stream = ScriptedStream {
            writes: writes.clone(),
            fail_on: 3,
        };
        let (_s, shutdown) = async_channel::bounded::<()>(1);

        let result = greeting_loop(
            chat_stream,
            PeerId::random(),
            Duration::from_millis(1),
            shutdown,
        )
        .await;

        assert!(matches!(result, Err(Error::IO(_))));
        assert_eq!(writes.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_greeting_loop_stops_on_shutdown() {
        let mut written = Cursor::new(Vec::new());
        let (s, shutdown) = async_channel::bounded::<()>(1);
        s.close();

        let local_id = PeerId::random();
        let result = greeting_loop(&mut written, local_id, Duration::from_secs(5), shutdown).await;

        assert!(result.is_ok());
        assert_eq!(
            written.get_ref().as_slice(),
            format!("Hello from {local_id}\n").as_bytes()
        );
    }

    #[tokio::test]
    async fn test_handle_stream_returns_on_stream_end() {
        let fut = handle_stream(PeerId::random(), Cursor::new(b"hello\nworld\n".to_vec()));
        tokio::time::timeout(Duration::from_secs(1), fut)
            .await
            .unwrap();

        let fut = handle_stream(PeerId::random(), Cursor::new(b"partial".to_vec()));
        tokio::time::timeout(Duration::from_secs(1), fut)
            .await
            .unwrap();
    }
}
