//! S1: STARTTLS upgrade, `AUTH LOGIN` chosen over `PLAIN` once both are
//! offered, and a `SMTPUTF8`-offering server gets the suffix on `MAIL FROM`.

mod support;

use std::sync::Arc;
use std::sync::Mutex;

use smtp_submit::auth::{Credentials, Mechanism};
use smtp_submit::{Address, Body, ConnectOptions, Message, SinglePart, SmtpClient};
use tokio::io::AsyncWriteExt;

use support::{read_line, self_signed_acceptor, start_plain, write_line};

#[tokio::test]
async fn starttls_then_login_precedence_then_smtputf8_suffix() {
    let observed_mail_from = Arc::new(Mutex::new(String::new()));
    let observed_recorder = observed_mail_from.clone();

    let addr = start_plain(move |mut stream| async move {
        write_line(&mut stream, "220 fake.example.org ESMTP ready").await.unwrap();

        assert_eq!(read_line(&mut stream).await.unwrap(), "EHLO localhost");
        write_line(&mut stream, "250-fake.example.org at your service").await.unwrap();
        write_line(&mut stream, "250 STARTTLS").await.unwrap();

        assert_eq!(read_line(&mut stream).await.unwrap(), "STARTTLS");
        write_line(&mut stream, "220 go ahead").await.unwrap();

        let acceptor = self_signed_acceptor();
        let mut tls = acceptor.accept(stream).await.expect("tls handshake");

        assert_eq!(read_line(&mut tls).await.unwrap(), "EHLO localhost");
        write_line(&mut tls, "250-fake.example.org at your service").await.unwrap();
        write_line(&mut tls, "250-AUTH PLAIN LOGIN").await.unwrap();
        write_line(&mut tls, "250 SMTPUTF8").await.unwrap();

        assert_eq!(read_line(&mut tls).await.unwrap(), "AUTH LOGIN");
        write_line(&mut tls, "334 VXNlcm5hbWU6").await.unwrap();
        let username_b64 = read_line(&mut tls).await.unwrap();
        assert!(!username_b64.is_empty());
        write_line(&mut tls, "334 UGFzc3dvcmQ6").await.unwrap();
        let password_b64 = read_line(&mut tls).await.unwrap();
        assert!(!password_b64.is_empty());
        write_line(&mut tls, "235 2.7.0 authenticated").await.unwrap();

        let mail_from = read_line(&mut tls).await.unwrap();
        *observed_recorder.lock().unwrap() = mail_from.clone();
        write_line(&mut tls, "250 ok").await.unwrap();

        assert_eq!(read_line(&mut tls).await.unwrap(), "RCPT TO:<bob@example.org>");
        write_line(&mut tls, "250 ok").await.unwrap();

        assert_eq!(read_line(&mut tls).await.unwrap(), "DATA");
        write_line(&mut tls, "354 go ahead").await.unwrap();
        let lines = support::read_dot_terminated_lines(&mut tls).await.unwrap();
        assert_eq!(lines.last().unwrap(), ".");
        write_line(&mut tls, "250 queued").await.unwrap();

        assert_eq!(read_line(&mut tls).await.unwrap(), "QUIT");
        write_line(&mut tls, "221 bye").await.unwrap();
        let _ = tls.shutdown().await;
    })
    .await;

    let url = format!("smtp://{}:{}", addr.ip(), addr.port());
    let mut client = SmtpClient::connect(&url, ConnectOptions::default())
        .await
        .expect("connect and negotiate");

    client
        .authenticate(&Credentials::Password {
            username: "ada",
            password: "hunter2",
        })
        .await
        .expect("authenticate");

    let mechanism = Mechanism::choose(&client.extensions().auth_mechanisms);
    assert_eq!(mechanism, Some(Mechanism::Login));

    let message = Message {
        from: Address::new("ada@example.org"),
        to: vec![Address::new("bob@example.org")],
        cc: vec![],
        bcc: vec![],
        subject: Some("hi".to_string()),
        timestamp: Some(0),
        body: Body::Single(SinglePart::Text("hello there".to_string())),
    };
    client.send(&message).await.expect("send message");
    client.close().await;

    let mail_from = observed_mail_from.lock().unwrap().clone();
    assert_eq!(mail_from, "MAIL FROM:<ada@example.org> SMTPUTF8");
}
