//! Demultiplexing of combined container log streams.
//!
//! Runtimes deliver stdout and stderr over one byte stream, split into frames:
//!
//! ```text
//! [stream: u8][0u8; 3][size: u32 big-endian][payload; size]
//! ```
//!
//! Stream ids: `0` stdin (written to stdout), `1` stdout, `2` stderr, `3` a runtime-side error
//! message.

use std::{
    io,
    pin::Pin,
    task::{Context, Poll},
};

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{info, warn};

use crate::error::LogError;

pub const FRAME_HEADER_LEN: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Stdin,
    Stdout,
    Stderr,
    System,
}

impl StreamKind {
    pub fn id(&self) -> u8 {
        match self {
            StreamKind::Stdin => 0,
            StreamKind::Stdout => 1,
            StreamKind::Stderr => 2,
            StreamKind::System => 3,
        }
    }

    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            0 => Some(StreamKind::Stdin),
            1 => Some(StreamKind::Stdout),
            2 => Some(StreamKind::Stderr),
            3 => Some(StreamKind::System),
            _ => None,
        }
    }
}

/// Bytes copied per destination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DemuxStats {
    pub stdout_bytes: u64,
    pub stderr_bytes: u64,
    pub frames: u64,
}

/// Append one frame in the multiplexed format to `out`.
pub fn encode_frame(kind: StreamKind, payload: &[u8], out: &mut Vec<u8>) {
    let mut push = |chunk: &[u8]| {
        out.push(kind.id());
        out.extend_from_slice(&[0, 0, 0]);
        out.extend_from_slice(&(chunk.len() as u32).to_be_bytes());
        out.extend_from_slice(chunk);
    };
    if payload.is_empty() {
        push(payload);
    }
    for chunk in payload.chunks(u32::MAX as usize) {
        push(chunk);
    }
}

/// Copy a multiplexed stream into `stdout` and `stderr` until end of input.
///
/// A clean end of input is only allowed on a frame boundary. A system-error frame ends the copy
/// with [`LogError::SystemError`].
pub async fn demux<R, O, E>(
    src: &mut R,
    stdout: &mut O,
    stderr: &mut E,
) -> Result<DemuxStats, LogError>
where
    R: AsyncRead + Unpin + ?Sized,
    O: AsyncWrite + Unpin + ?Sized,
    E: AsyncWrite + Unpin + ?Sized,
{
    let mut stats = DemuxStats::default();
    let mut header = [0u8; FRAME_HEADER_LEN];

    loop {
        let n = read_full(src, &mut header).await?;
        if n == 0 {
            break;
        }
        if n < FRAME_HEADER_LEN {
            return Err(LogError::Truncated("frame header"));
        }

        let size = u32::from_be_bytes([header[4], header[5], header[6], header[7]]) as u64;
        let kind = StreamKind::from_id(header[0]).ok_or(LogError::UnknownStream(header[0]))?;
        stats.frames += 1;

        match kind {
            StreamKind::Stdin | StreamKind::Stdout => {
                stats.stdout_bytes += copy_payload(src, stdout, size).await?;
            }
            StreamKind::Stderr => {
                stats.stderr_bytes += copy_payload(src, stderr, size).await?;
            }
            StreamKind::System => {
                let mut msg = Vec::new();
                let got = (&mut *src).take(size).read_to_end(&mut msg).await? as u64;
                if got < size {
                    return Err(LogError::Truncated("frame payload"));
                }
                return Err(LogError::SystemError(String::from_utf8_lossy(&msg).into_owned()));
            }
        }
    }

    stdout.flush().await?;
    stderr.flush().await?;
    Ok(stats)
}

async fn read_full<R>(src: &mut R, buf: &mut [u8]) -> io::Result<usize>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let mut filled = 0;
    while filled < buf.len() {
        let n = src.read(&mut buf[filled..]).await?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}

async fn copy_payload<R, W>(src: &mut R, dst: &mut W, size: u64) -> Result<u64, LogError>
where
    R: AsyncRead + Unpin + ?Sized,
    W: AsyncWrite + Unpin + ?Sized,
{
    let copied = tokio::io::copy(&mut (&mut *src).take(size), dst).await?;
    if copied < size {
        return Err(LogError::Truncated("frame payload"));
    }
    Ok(copied)
}

/// Writer that turns container output into `tracing` events, one per line.
///
/// Partial lines are buffered until a newline arrives or the writer is flushed.
pub struct TracingLines {
    stream: StreamKind,
    buf: Vec<u8>,
}

impl TracingLines {
    pub fn new(stream: StreamKind) -> Self {
        Self {
            stream,
            buf: Vec::new(),
        }
    }

    fn emit(&self, line: &[u8]) {
        let line = String::from_utf8_lossy(line);
        let line = line.trim_end_matches('\r');
        match self.stream {
            StreamKind::Stderr => warn!(target: "orch.container.stderr", "{line}"),
            _ => info!(target: "orch.container.stdout", "{line}"),
        }
    }

    fn drain_lines(&mut self) {
        while let Some(pos) = self.buf.iter().position(|b| *b == b'\n') {
            let rest = self.buf.split_off(pos + 1);
            let line = std::mem::replace(&mut self.buf, rest);
            self.emit(&line[..pos]);
        }
    }

    fn drain_all(&mut self) {
        self.drain_lines();
        if !self.buf.is_empty() {
            let line = std::mem::take(&mut self.buf);
            self.emit(&line);
        }
    }
}

impl AsyncWrite for TracingLines {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        data: &[u8],
    ) -> Poll<io::Result<usize>> {
        let this = self.get_mut();
        this.buf.extend_from_slice(data);
        this.drain_lines();
        Poll::Ready(Ok(data.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        self.get_mut().drain_all();
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        self.poll_flush(cx)
    }
}
