/*
 * error.rs
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

//! Closed error taxonomy surfaced unchanged to callers (§7 of the design doc).
//!
//! Nothing here is recoverable: once a `SmtpError` is returned the connection
//! is left in an undefined protocol state and the only correct move is to
//! drop it.

use thiserror::Error;

/// All failure modes this crate can produce.
#[derive(Error, Debug)]
pub enum SmtpError {
    #[error("network I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TLS error: {0}")]
    Tls(String),

    #[error("invalid server greeting (expected 220)")]
    InvalidServerGreetings,

    #[error("invalid response to STARTTLS (expected 220)")]
    InvalidTlsHandshakeResponse,

    #[error("server capability reply exceeded the read buffer")]
    HandshakeOversize,

    #[error("no recipient addresses provided")]
    ExpectToAddress,

    #[error("authentication requires an active TLS session")]
    TlsRequiredForAuth,

    #[error("server did not offer a supported AUTH mechanism")]
    UnsupportedAuthHandshake,

    #[error("unexpected server response: {0} {1}")]
    UnexpectedServerResponse(u16, String),

    #[error("unrecognized server response: {0} {1}")]
    UnknownServerResponse(u16, String),

    #[error("from address has no domain part (missing '@')")]
    ExpectedEmailDomain,

    #[error("message URL missing host")]
    UriMissingHost,

    #[error("unsupported scheme for an SMTP transport URL")]
    InvalidSmtpScheme,

    // --- §4.2 named response-code mappings ---
    #[error("403 invalid TLS handshake")]
    InvalidTlsHandshake,
    #[error("421 service not available")]
    ServiceNotAvailable,
    #[error("450 mailbox temporarily unavailable")]
    TemporaryMailboxNotAvailable,
    #[error("451 local error in processing")]
    ErrorInProcessing,
    #[error("452 insufficient system storage")]
    InsufficientStorage,
    #[error("454 temporary authentication failure")]
    TemporaryAuthFailure,
    #[error("455 server unable to accommodate parameters")]
    UnableToAccommodateParameter,
    #[error("500 syntax error or command not recognized")]
    SyntaxErrorOrCommandNotFound,
    #[error("501 invalid parameter")]
    InvalidParameter,
    #[error("502 command not implemented")]
    CommandNotImplemented,
    #[error("503 bad sequence of commands")]
    InvalidCommandSequence,
    #[error("504 parameter not implemented")]
    ParameterNotImplemented,
    #[error("530 authentication required")]
    AuthenticationRequired,
    #[error("534 authentication mechanism too weak")]
    AuthMethodTooWeak,
    #[error("535 invalid credentials")]
    InvalidCredentials,
    #[error("538 encryption required for requested auth mechanism")]
    EncryptionRequiredForAuthMethod,
    #[error("550 mailbox not available")]
    MailboxNotAvailable,
    #[error("551 user not local")]
    UserNotLocal,
    #[error("552 exceeded storage allocation")]
    ExceededStorageAllocation,
    #[error("553 mailbox name not allowed")]
    MailboxNotAllowed,
    #[error("554 transaction failed")]
    TransactionFailed,
    #[error("553 invalid from/recipient parameter syntax")]
    InvalidFromOrRecptParameter,
}

pub type SmtpResult<T> = std::result::Result<T, SmtpError>;