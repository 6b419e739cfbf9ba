/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! Per-connection driver.
//!
//! A [`Connection`] owns one session and runs three tasks over a byte stream:
//! the inbound read loop (on the caller's task), a writer draining the
//! session's outbound channel, and the heartbeat scheduler. The read loop
//! ending for any reason tears the other two down.

use bytes::{Bytes, BytesMut};
use fixgate_core::error::FixError;
use fixgate_session::{HeartbeatScheduler, Session, SessionConfig};
use fixgate_transport::FixFrameCodec;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio_util::codec::Decoder;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

const READ_BUFFER_SIZE: usize = 4096;

/// One FIX connection and its session.
#[derive(Debug)]
pub struct Connection {
    session: Session,
    outbound: UnboundedReceiver<Bytes>,
    codec: FixFrameCodec,
}

impl Connection {
    /// Creates a connection with a fresh session.
    #[must_use]
    pub fn new(config: Arc<SessionConfig>) -> Self {
        let codec = FixFrameCodec::new().with_max_message_size(config.max_message_size);
        let (tx, outbound) = mpsc::unbounded_channel();
        Self {
            session: Session::new(config, tx),
            outbound,
            codec,
        }
    }

    /// Returns a handle to the connection's session.
    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Drives the connection until the peer closes it, a read fails, or
    /// `cancel` fires.
    ///
    /// Messages already queued when the read side ends are still written
    /// before the write half is shut down.
    ///
    /// # Errors
    /// Returns an error if reading from the stream fails or an inbound frame
    /// exceeds the configured maximum size.
    pub async fn run<S>(self, stream: S, cancel: CancellationToken) -> Result<(), FixError>
    where
        S: AsyncRead + AsyncWrite + Send + 'static,
    {
        let Self {
            session,
            outbound,
            mut codec,
        } = self;
        let (reader, writer) = tokio::io::split(stream);

        let writer_done = CancellationToken::new();
        let writer_task = tokio::spawn(write_loop(writer, outbound, writer_done.clone()));

        let heartbeat_cancel = cancel.child_token();
        let heartbeat_task =
            tokio::spawn(HeartbeatScheduler::new(session.clone()).run(heartbeat_cancel.clone()));

        let result = read_loop(reader, &session, &mut codec, &cancel).await;
        if let Err(err) = &result {
            warn!(error = %err, "read failed, closing connection");
        }

        heartbeat_cancel.cancel();
        session.close();
        if let Err(err) = heartbeat_task.await {
            warn!(error = %err, "heartbeat task failed");
        }

        writer_done.cancel();
        if let Err(err) = writer_task.await {
            warn!(error = %err, "writer task failed");
        }

        info!(
            session = %session.session_id(),
            next_incoming = session.next_incoming_seq().value(),
            next_outgoing = session.next_outgoing_seq().value(),
            "connection closed"
        );
        result
    }
}

async fn read_loop<R>(
    mut reader: R,
    session: &Session,
    codec: &mut FixFrameCodec,
    cancel: &CancellationToken,
) -> Result<(), FixError>
where
    R: AsyncRead + Unpin,
{
    let mut buf = BytesMut::with_capacity(READ_BUFFER_SIZE);

    loop {
        while let Some(frame) = codec.decode(&mut buf)? {
            process(session, &frame);
        }

        let read = tokio::select! {
            _ = cancel.cancelled() => {
                info!("connection cancelled");
                return Ok(());
            }
            read = reader.read_buf(&mut buf) => read?,
        };

        if read == 0 {
            while let Some(frame) = codec.decode_eof(&mut buf)? {
                process(session, &frame);
            }
            info!("peer closed connection");
            return Ok(());
        }
    }
}

fn process(session: &Session, frame: &[u8]) {
    match session.on_message(frame) {
        Ok(processed) => debug!(
            msg_type = %processed.msg_type,
            seq_num = processed.seq_num,
            reply = ?processed.reply,
            "processed message"
        ),
        Err(err) => warn!(error = %err, "message rejected"),
    }
}

async fn write_loop<W>(mut writer: W, mut outbound: UnboundedReceiver<Bytes>, done: CancellationToken)
where
    W: AsyncWrite + Unpin,
{
    loop {
        tokio::select! {
            biased;
            message = outbound.recv() => match message {
                Some(message) => write_message(&mut writer, &message).await,
                None => break,
            },
            _ = done.cancelled() => {
                outbound.close();
                while let Some(message) = outbound.recv().await {
                    write_message(&mut writer, &message).await;
                }
                break;
            }
        }
    }

    if let Err(err) = writer.shutdown().await {
        debug!(error = %err, "failed to shut down write half");
    }
}

async fn write_message<W>(writer: &mut W, message: &[u8])
where
    W: AsyncWrite + Unpin,
{
    // A failed write loses the message; the session keeps its sequence number.
    if let Err(err) = writer.write_all(message).await {
        warn!(error = %err, len = message.len(), "failed to write message");
    }
}
