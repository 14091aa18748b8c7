/*
 * mod.rs
 * Copyright (C) 2026 smtp-submit contributors
 *
 * This file is part of smtp-submit, an async SMTP submission client library.
 *
 * smtp-submit is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * smtp-submit is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with smtp-submit.  If not, see <http://www.gnu.org/licenses/>.
 */

//! Connection: a unified reader/writer facade over plain TCP or TLS (§4.6).
//!
//! Modeled as a tagged enum rather than the parent-struct-with-pointer-
//! arithmetic pattern the corpus uses elsewhere for this kind of thing: each
//! arm owns its transport state, and upgrading from plain to TLS consumes the
//! plain arm and produces a fresh TLS arm over the same socket, so the active
//! reader/writer never goes stale mid-upgrade.

pub mod dot_stuffer;
pub mod response;

use std::sync::Arc;
use std::sync::OnceLock;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio_rustls::client::TlsStream;
use tokio_rustls::rustls::pki_types::ServerName;
use tokio_rustls::rustls::{ClientConfig, RootCertStore};
use tokio_rustls::TlsConnector;

use crate::error::{SmtpError, SmtpResult};
use response::{parse_response_line, Response};

/// Maximum number of bytes accumulated for one server line before giving up
/// with [`SmtpError::HandshakeOversize`] (§4.7 step 2). A conformant EHLO
/// capability line is at most a few hundred bytes; this is generous headroom
/// against a misbehaving or malicious peer that never sends a line
/// terminator.
const MAX_LINE_BYTES: usize = 8192;

/// Which layer is currently active on a [`Connection`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    /// Plain TCP, possibly upgraded to TLS in-place via STARTTLS.
    Smtp,
    /// Implicit TLS from the first byte (SMTPS).
    Smtps,
}

fn build_root_store() -> RootCertStore {
    let mut store = RootCertStore::empty();
    if let Ok(native) = rustls_native_certs::load_native_certs() {
        for cert in native {
            let _ = store.add(cert);
        }
    }
    if store.is_empty() {
        store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
    }
    store
}

fn default_client_config() -> Arc<ClientConfig> {
    static CONFIG: OnceLock<Arc<ClientConfig>> = OnceLock::new();
    CONFIG
        .get_or_init(|| {
            Arc::new(
                ClientConfig::builder()
                    .with_root_certificates(build_root_store())
                    .with_no_client_auth(),
            )
        })
        .clone()
}

fn default_connector() -> TlsConnector {
    TlsConnector::from(default_client_config())
}

enum ConnectionIo {
    Plain(TcpStream),
    Tls(Box<TlsStream<TcpStream>>),
    /// Transient: only observable between taking the old value out of
    /// `self.io` and putting the upgraded one back in `upgrade_to_tls`.
    Transitioning,
}

/// A live SMTP connection: one socket, one active read/write layer, and the
/// accumulation buffer for the line currently being read.
pub struct Connection {
    host: String,
    port: u16,
    protocol: Protocol,
    io: ConnectionIo,
    read_buf: Vec<u8>,
}

impl Connection {
    /// Connect without TLS (used for STARTTLS-capable submission, typically port 587/25).
    pub async fn connect_plain(host: &str, port: u16) -> SmtpResult<Self> {
        let tcp = TcpStream::connect((host, port)).await?;
        Ok(Self {
            host: host.to_string(),
            port,
            protocol: Protocol::Smtp,
            io: ConnectionIo::Plain(tcp),
            read_buf: Vec::with_capacity(4096),
        })
    }

    /// Connect with implicit TLS from the first byte (SMTPS, typically port 465).
    pub async fn connect_implicit_tls(host: &str, port: u16) -> SmtpResult<Self> {
        let tcp = TcpStream::connect((host, port)).await?;
        let tls = tls_handshake(tcp, host).await?;
        Ok(Self {
            host: host.to_string(),
            port,
            protocol: Protocol::Smtps,
            io: ConnectionIo::Tls(Box::new(tls)),
            read_buf: Vec::with_capacity(4096),
        })
    }

    pub fn hostname(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    pub fn is_tls(&self) -> bool {
        matches!(self.io, ConnectionIo::Tls(_))
    }

    /// Upgrade an active plain connection to TLS in place (after STARTTLS was
    /// accepted by the server). Consumes and replaces `self.io`; the socket
    /// itself is preserved, only the active read/write layer changes.
    pub async fn upgrade_to_tls(&mut self) -> SmtpResult<()> {
        let plain = match std::mem::replace(&mut self.io, ConnectionIo::Transitioning) {
            ConnectionIo::Plain(tcp) => tcp,
            other @ ConnectionIo::Tls(_) => {
                self.io = other;
                return Ok(());
            }
            ConnectionIo::Transitioning => unreachable!("not reentrant"),
        };
        let tls = tls_handshake(plain, &self.host).await?;
        self.io = ConnectionIo::Tls(Box::new(tls));
        self.read_buf.clear();
        Ok(())
    }

    /// Write one command line (no CRLF) then CRLF, and flush immediately.
    pub async fn write_line(&mut self, line: &[u8]) -> SmtpResult<()> {
        match &mut self.io {
            ConnectionIo::Plain(s) => write_line_on(s, line).await,
            ConnectionIo::Tls(s) => write_line_on(s.as_mut(), line).await,
            ConnectionIo::Transitioning => unreachable!("not reentrant"),
        }
    }

    /// Write raw bytes (the dot-stuffed message body) with no implicit framing.
    pub async fn write_raw(&mut self, bytes: &[u8]) -> SmtpResult<()> {
        match &mut self.io {
            ConnectionIo::Plain(s) => s.write_all(bytes).await.map_err(SmtpError::from),
            ConnectionIo::Tls(s) => s.write_all(bytes).await.map_err(SmtpError::from),
            ConnectionIo::Transitioning => unreachable!("not reentrant"),
        }
    }

    pub async fn flush(&mut self) -> SmtpResult<()> {
        match &mut self.io {
            ConnectionIo::Plain(s) => s.flush().await.map_err(SmtpError::from),
            ConnectionIo::Tls(s) => s.flush().await.map_err(SmtpError::from),
            ConnectionIo::Transitioning => unreachable!("not reentrant"),
        }
    }

    /// Read one full server response (possibly multi-line) per the §4.1/§4.8
    /// read discipline: prime with at least one byte, then keep reading until
    /// a CRLF-terminated line is seen, repeating across `250-` continuations.
    pub async fn read_response(&mut self) -> SmtpResult<Response> {
        match &mut self.io {
            ConnectionIo::Plain(s) => read_response_on(s, &mut self.read_buf).await,
            ConnectionIo::Tls(s) => read_response_on(s.as_mut(), &mut self.read_buf).await,
            ConnectionIo::Transitioning => unreachable!("not reentrant"),
        }
    }

    /// `QUIT`, best-effort flush, and TLS close-notify when applicable.
    pub async fn end(&mut self) -> SmtpResult<()> {
        let _ = self.write_line(b"QUIT").await;
        let _ = self.read_response().await;
        if let ConnectionIo::Tls(s) = &mut self.io {
            let _ = s.shutdown().await;
        }
        Ok(())
    }

    /// `end()` plus closing the socket (best-effort; never fails).
    pub async fn close(mut self) {
        let _ = self.end().await;
    }
}

async fn tls_handshake(tcp: TcpStream, host: &str) -> SmtpResult<TlsStream<TcpStream>> {
    let server_name = ServerName::try_from(host.to_string())
        .map_err(|_| SmtpError::Tls(format!("invalid host name: {host}")))?;
    default_connector()
        .connect(server_name, tcp)
        .await
        .map_err(|e| SmtpError::Tls(e.to_string()))
}

async fn write_line_on<S>(stream: &mut S, line: &[u8]) -> SmtpResult<()>
where
    S: AsyncWrite + Unpin,
{
    stream.write_all(line).await?;
    stream.write_all(b"\r\n").await?;
    stream.flush().await?;
    Ok(())
}

/// Read one full response: accumulate bytes until a CRLF-terminated line is
/// seen, parse it, and keep going while the line is a `-` continuation.
async fn read_response_on<S>(stream: &mut S, buf: &mut Vec<u8>) -> SmtpResult<Response>
where
    S: AsyncRead + Unpin,
{
    let mut lines = Vec::new();
    let mut terminal_code = 0u16;
    loop {
        let line = read_line(stream, buf).await?;
        let parsed = parse_response_line(line.trim_end_matches(['\r', '\n']))?;
        lines.push(parsed.payload);
        if !parsed.continuation {
            terminal_code = parsed.code;
            break;
        }
    }
    Ok(Response {
        code: terminal_code,
        lines,
    })
}

/// Prime with at least one byte, then keep reading until `buf` ends in CRLF
/// (or bare LF, tolerated for robustness). Returns the consumed line and
/// clears `buf` for the next call. Fails with [`SmtpError::HandshakeOversize`]
/// rather than growing `buf` without bound if no terminator ever arrives.
async fn read_line<S>(stream: &mut S, buf: &mut Vec<u8>) -> SmtpResult<String>
where
    S: AsyncRead + Unpin,
{
    buf.clear();
    loop {
        if buf.len() >= MAX_LINE_BYTES {
            return Err(SmtpError::HandshakeOversize);
        }
        let mut byte = [0u8; 1];
        let n = stream.read(&mut byte).await?;
        if n == 0 {
            return Err(SmtpError::Io(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "connection closed by peer",
            )));
        }
        buf.push(byte[0]);
        if buf.ends_with(b"\n") {
            break;
        }
    }
    let line = String::from_utf8_lossy(buf).into_owned();
    buf.clear();
    Ok(line)
}