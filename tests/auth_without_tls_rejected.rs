//! S2: a server that never offers `STARTTLS` leaves the session un-upgraded;
//! `authenticate` must refuse locally with `TlsRequiredForAuth` rather than
//! ever putting credentials on the wire.

mod support;

use smtp_submit::auth::Credentials;
use smtp_submit::{ConnectOptions, SmtpClient, SmtpError};

use support::{read_line, start_plain, write_line};

#[tokio::test]
async fn authenticate_without_tls_is_rejected_locally() {
    let addr = start_plain(|mut stream| async move {
        write_line(&mut stream, "220 fake.example.org ESMTP ready").await.unwrap();

        assert_eq!(read_line(&mut stream).await.unwrap(), "EHLO localhost");
        write_line(&mut stream, "250-fake.example.org at your service").await.unwrap();
        write_line(&mut stream, "250 AUTH PLAIN").await.unwrap();

        // No further command should ever arrive: the client must refuse to
        // authenticate before sending anything else.
        let mut probe = [0u8; 1];
        let n = tokio::io::AsyncReadExt::read(&mut stream, &mut probe).await.unwrap_or(0);
        assert_eq!(n, 0, "client sent bytes after a TLS-less EHLO reply");
    })
    .await;

    let url = format!("smtp://{}:{}", addr.ip(), addr.port());
    let mut client = SmtpClient::connect(&url, ConnectOptions::default())
        .await
        .expect("connect and negotiate");

    assert!(!client.extensions().starttls);

    let err = client
        .authenticate(&Credentials::Password {
            username: "ada",
            password: "hunter2",
        })
        .await
        .expect_err("authenticate must fail without TLS");

    assert!(matches!(err, SmtpError::TlsRequiredForAuth));
    // Dropped without calling `close()`: a clean `QUIT` here would put bytes
    // on the wire, which is exactly what the server-side probe above checks
    // never happens.
    drop(client);
}
