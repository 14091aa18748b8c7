//! S5: a `535` response to `AUTH PLAIN` surfaces as `InvalidCredentials`.

mod support;

use smtp_submit::auth::Credentials;
use smtp_submit::{ConnectOptions, SmtpClient, SmtpError};

use support::{read_line, self_signed_acceptor, start_plain, write_line};

#[tokio::test]
async fn rejected_auth_plain_maps_to_invalid_credentials() {
    let addr = start_plain(|mut stream| async move {
        write_line(&mut stream, "220 fake.example.org ESMTP ready").await.unwrap();

        assert_eq!(read_line(&mut stream).await.unwrap(), "EHLO localhost");
        write_line(&mut stream, "250-fake.example.org at your service").await.unwrap();
        write_line(&mut stream, "250 STARTTLS").await.unwrap();

        assert_eq!(read_line(&mut stream).await.unwrap(), "STARTTLS");
        write_line(&mut stream, "220 go ahead").await.unwrap();

        let acceptor = self_signed_acceptor();
        let mut tls = acceptor.accept(stream).await.expect("tls handshake");

        assert_eq!(read_line(&mut tls).await.unwrap(), "EHLO localhost");
        write_line(&mut tls, "250 AUTH PLAIN").await.unwrap();

        let auth_line = read_line(&mut tls).await.unwrap();
        assert!(auth_line.starts_with("AUTH PLAIN "));
        write_line(&mut tls, "535 5.7.8 authentication failed").await.unwrap();
    })
    .await;

    let url = format!("smtp://{}:{}", addr.ip(), addr.port());
    let mut client = SmtpClient::connect(&url, ConnectOptions::default())
        .await
        .expect("connect and negotiate");

    let err = client
        .authenticate(&Credentials::Password {
            username: "ada",
            password: "wrong",
        })
        .await
        .expect_err("server rejected credentials");

    assert!(matches!(err, SmtpError::InvalidCredentials));
    drop(client);
}
