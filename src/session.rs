/*
 * session.rs
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

//! The SMTP session state machine (§4.7): drives the dialog end-to-end from
//! the initial greeting through `QUIT`.

use std::sync::Arc;

use tracing::{debug, instrument, warn};

use crate::auth::{self, Credentials, Mechanism};
use crate::capability::{Clock, EntropySource, OsEntropy, SystemClock};
use crate::error::{SmtpError, SmtpResult};
use crate::extension::{parse_ehlo, ClientExtensions};
use crate::message::mime::compose;
use crate::message::Message;
use crate::transport::dot_stuffer::DotStuffer;
use crate::transport::response::{classify, Response};
use crate::transport::Connection;
use crate::uri::parse_smtp_url;

const DEFAULT_EHLO_DOMAIN: &str = "localhost";

/// Builder-style connection options.
pub struct ConnectOptions {
    pub ehlo_domain: String,
    pub entropy: Arc<dyn EntropySource>,
    pub clock: Arc<dyn Clock>,
}

impl Default for ConnectOptions {
    fn default() -> Self {
        Self {
            ehlo_domain: DEFAULT_EHLO_DOMAIN.to_string(),
            entropy: Arc::new(OsEntropy),
            clock: Arc::new(SystemClock),
        }
    }
}

/// A live, negotiated SMTP session.
pub struct SmtpClient {
    connection: Connection,
    extensions: ClientExtensions,
    options: ConnectOptions,
}

fn expect_code(response: &Response, expected: &[u16]) -> SmtpResult<()> {
    if expected.contains(&response.code) {
        Ok(())
    } else {
        Err(classify(response.code, response.last_line().to_string()))
    }
}

impl SmtpClient {
    /// Connect to `url` (`smtp://` or `smtps://`), read the greeting, and
    /// negotiate capabilities (with an opportunistic STARTTLS upgrade when
    /// plain and offered). Does not authenticate.
    #[instrument(skip(options), fields(host, port))]
    pub async fn connect(url: &str, options: ConnectOptions) -> SmtpResult<Self> {
        let target = parse_smtp_url(url)?;
        tracing::Span::current().record("host", target.host.as_str());
        tracing::Span::current().record("port", target.port as u64);

        let mut connection = if target.implicit_tls {
            Connection::connect_implicit_tls(&target.host, target.port).await?
        } else {
            Connection::connect_plain(&target.host, target.port).await?
        };

        let greeting = connection.read_response().await?;
        if greeting.code != 220 {
            return Err(SmtpError::InvalidServerGreetings);
        }
        debug!(code = greeting.code, "received server greeting");

        let mut extensions = Self::ehlo(&mut connection, &options.ehlo_domain).await?;

        if !target.implicit_tls && extensions.starttls {
            Self::upgrade_tls(&mut connection, &options.ehlo_domain).await?;
            extensions = Self::ehlo(&mut connection, &options.ehlo_domain).await?;
        }

        Ok(Self {
            connection,
            extensions,
            options,
        })
    }

    /// Connect using defaults (EHLO domain `localhost`, OS entropy and system
    /// clock).
    pub async fn connect_with_defaults(url: &str) -> SmtpResult<Self> {
        Self::connect(url, ConnectOptions::default()).await
    }

    async fn ehlo(connection: &mut Connection, domain: &str) -> SmtpResult<ClientExtensions> {
        debug!(domain, "sending EHLO");
        connection.write_line(format!("EHLO {domain}").as_bytes()).await?;
        let response = connection.read_response().await?;
        if !response.is_success() {
            return Err(classify(response.code, response.last_line().to_string()));
        }
        Ok(parse_ehlo(&response))
    }

    async fn upgrade_tls(connection: &mut Connection, _domain: &str) -> SmtpResult<()> {
        debug!("upgrading to TLS via STARTTLS");
        connection.write_line(b"STARTTLS").await?;
        let response = connection.read_response().await?;
        if response.code != 220 {
            return Err(SmtpError::InvalidTlsHandshakeResponse);
        }
        connection.upgrade_to_tls().await
    }

    pub fn extensions(&self) -> &ClientExtensions {
        &self.extensions
    }

    /// Authenticate using the highest-precedence mechanism the server
    /// offered among those this crate supports. Requires an active TLS
    /// session.
    #[instrument(skip(self, credentials))]
    pub async fn authenticate(&mut self, credentials: &Credentials<'_>) -> SmtpResult<()> {
        if !self.connection.is_tls() {
            return Err(SmtpError::TlsRequiredForAuth);
        }
        let mechanism = Mechanism::choose(&self.extensions.auth_mechanisms)
            .ok_or(SmtpError::UnsupportedAuthHandshake)?;
        debug!(mechanism = mechanism.name(), "authenticating");

        match mechanism {
            Mechanism::Plain | Mechanism::XOAuth2 => {
                let initial = auth::initial_response(mechanism, credentials)?;
                self.connection
                    .write_line(format!("AUTH {} {initial}", mechanism.name()).as_bytes())
                    .await?;
                let response = self.connection.read_response().await?;
                expect_code(&response, &[235]).map_err(|e| {
                    warn!(code = response.code, "authentication rejected");
                    e
                })
            }
            Mechanism::Login => self.authenticate_login(credentials).await,
        }
    }

    async fn authenticate_login(&mut self, credentials: &Credentials<'_>) -> SmtpResult<()> {
        let Credentials::Password { username, password } = credentials else {
            return Err(SmtpError::UnsupportedAuthHandshake);
        };

        self.connection.write_line(b"AUTH LOGIN").await?;
        let username_prompt = self.connection.read_response().await?;
        expect_code(&username_prompt, &[334]).map_err(|e| {
            warn!(code = username_prompt.code, "AUTH LOGIN username prompt rejected");
            e
        })?;

        self.connection
            .write_line(auth::encode_response(username.as_bytes()).as_bytes())
            .await?;
        let password_prompt = self.connection.read_response().await?;
        expect_code(&password_prompt, &[334]).map_err(|e| {
            warn!(code = password_prompt.code, "AUTH LOGIN password prompt rejected");
            e
        })?;

        self.connection
            .write_line(auth::encode_response(password.as_bytes()).as_bytes())
            .await?;
        let final_response = self.connection.read_response().await?;
        expect_code(&final_response, &[235]).map_err(|e| {
            warn!(code = final_response.code, "AUTH LOGIN credentials rejected");
            e
        })
    }

    /// Send `message`: envelope (`MAIL FROM`/`RCPT TO`) then the composed
    /// body via dot-stuffed `DATA`.
    #[instrument(skip(self, message))]
    pub async fn send(&mut self, message: &Message) -> SmtpResult<()> {
        if message.to.is_empty() {
            return Err(SmtpError::ExpectToAddress);
        }

        self.mail_from(message).await?;
        for recipient in message.to.iter().chain(&message.cc).chain(&message.bcc) {
            self.rcpt_to(recipient).await?;
        }

        let body = compose(message, self.options.clock.as_ref(), self.options.entropy.as_ref())?;
        self.send_data(&body).await
    }

    async fn mail_from(&mut self, message: &Message) -> SmtpResult<()> {
        let mut line = format!("MAIL FROM:<{}>", message.from.address);
        if self.extensions.eight_bit_mime {
            line.push_str(" BODY=8BITMIME");
        }
        if self.extensions.smtp_utf8 {
            line.push_str(" SMTPUTF8");
        }
        debug!("sending MAIL FROM");
        self.connection.write_line(line.as_bytes()).await?;
        let response = self.connection.read_response().await?;
        expect_code(&response, &[250])
    }

    async fn rcpt_to(&mut self, recipient: &crate::message::Address) -> SmtpResult<()> {
        debug!(address = recipient.address.as_str(), "sending RCPT TO");
        self.connection
            .write_line(format!("RCPT TO:<{}>", recipient.address).as_bytes())
            .await?;
        let response = self.connection.read_response().await?;
        expect_code(&response, &[250, 251, 252])
    }

    async fn send_data(&mut self, body: &[u8]) -> SmtpResult<()> {
        debug!("sending DATA");
        self.connection.write_line(b"DATA").await?;
        let response = self.connection.read_response().await?;
        expect_code(&response, &[354])?;

        let mut stuffer = DotStuffer::new();
        let stuffed_body = stuffer.process_chunk(body);
        let terminator = stuffer.end_message();
        self.connection.write_raw(&stuffed_body).await?;
        self.connection.write_raw(&terminator).await?;
        self.connection.flush().await?;

        let response = self.connection.read_response().await?;
        expect_code(&response, &[250])
    }

    /// `QUIT` and close the connection.
    pub async fn close(mut self) {
        self.connection.close().await;
    }
}