//! In-process scripted fake SMTP server, for end-to-end exercise of
//! `SmtpClient` without a real mail relay (§8a).
//!
//! Each test spawns one server that serves exactly one connection according
//! to a handler closure the test supplies; the handler reads/writes raw
//! command and response lines the same way the real `Connection` does.

use std::io;
use std::sync::Arc;
use std::sync::Once;

use rcgen::generate_simple_self_signed;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_rustls::rustls::pki_types::{CertificateDer, PrivateKeyDer, PrivatePkcs8KeyDer};
use tokio_rustls::rustls::ServerConfig;
use tokio_rustls::TlsAcceptor;

static CRYPTO_PROVIDER: Once = Once::new();

fn ensure_crypto_provider_installed() {
    CRYPTO_PROVIDER.call_once(|| {
        let _ = tokio_rustls::rustls::crypto::ring::default_provider().install_default();
    });
}

/// Read one line (without its trailing CRLF/LF) from a raw byte stream.
pub async fn read_line(stream: &mut (impl AsyncRead + Unpin)) -> io::Result<String> {
    let mut buf = Vec::new();
    loop {
        let mut byte = [0u8; 1];
        let n = stream.read(&mut byte).await?;
        if n == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "client closed connection"));
        }
        buf.push(byte[0]);
        if buf.ends_with(b"\n") {
            break;
        }
    }
    Ok(String::from_utf8_lossy(&buf).trim_end_matches(['\r', '\n']).to_string())
}

/// Write one server reply line, appending CRLF.
pub async fn write_line(stream: &mut (impl AsyncWrite + Unpin), line: &str) -> io::Result<()> {
    stream.write_all(line.as_bytes()).await?;
    stream.write_all(b"\r\n").await?;
    stream.flush().await
}

/// Read a `DATA` payload terminated by a bare `.` line, returning every line
/// observed on the wire (still dot-stuffed), including the terminator.
pub async fn read_dot_terminated_lines(stream: &mut (impl AsyncRead + Unpin)) -> io::Result<Vec<String>> {
    let mut lines = Vec::new();
    loop {
        let line = read_line(stream).await?;
        let done = line == ".";
        lines.push(line);
        if done {
            break;
        }
    }
    Ok(lines)
}

/// Bind a one-shot plain-TCP server on an ephemeral port and run `handler`
/// against the single connection it accepts.
pub async fn start_plain<F, Fut>(handler: F) -> std::net::SocketAddr
where
    F: FnOnce(TcpStream) -> Fut + Send + 'static,
    Fut: std::future::Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind fake server");
    let addr = listener.local_addr().expect("local_addr");
    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.expect("accept fake client");
        handler(stream).await;
    });
    addr
}

/// A self-signed `TlsAcceptor` for `127.0.0.1`, for upgrading a fake server's
/// connection after it has replied `220` to `STARTTLS`.
pub fn self_signed_acceptor() -> TlsAcceptor {
    ensure_crypto_provider_installed();
    let certified_key =
        generate_simple_self_signed(vec!["127.0.0.1".to_string()]).expect("generate self-signed cert");
    let cert_der: CertificateDer<'static> = certified_key.cert.der().clone();
    let key_der = PrivatePkcs8KeyDer::from(certified_key.signing_key.serialize_der());
    let config = ServerConfig::builder()
        .with_no_client_auth()
        .with_single_cert(vec![cert_der], PrivateKeyDer::Pkcs8(key_der))
        .expect("build server tls config");
    TlsAcceptor::from(Arc::new(config))
}
