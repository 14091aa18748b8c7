/*
 * response.rs
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

//! Server reply parsing (§4.1) and response-code classification (§4.2).

use crate::error::SmtpError;

/// One parsed server reply line: `250-some text` or `250 some text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseLine {
    pub code: u16,
    pub continuation: bool,
    pub payload: String,
}

/// A full (possibly multi-line) server response: one terminal code and the
/// payload text of every line that made it up, in order.
#[derive(Debug, Clone)]
pub struct Response {
    pub code: u16,
    pub lines: Vec<String>,
}

impl Response {
    pub fn last_line(&self) -> &str {
        self.lines.last().map(String::as_str).unwrap_or("")
    }

    pub fn is_success(&self) -> bool {
        (200..400).contains(&self.code)
    }
}

/// Parse one server reply line (without its trailing `\r\n`/`\n`).
///
/// The first three bytes must be decimal digits; byte 4, if present,
/// distinguishes `-` (continuation) from ` ` (terminal). Any other byte 4 is
/// folded into the payload. Lines shorter than 4 bytes are a protocol
/// violation.
pub fn parse_response_line(line: &str) -> Result<ResponseLine, SmtpError> {
    let bytes = line.as_bytes();
    if bytes.len() < 4 || !bytes[..3].iter().all(u8::is_ascii_digit) {
        return Err(SmtpError::UnexpectedServerResponse(0, line.to_string()));
    }
    let code: u16 = line[..3].parse().unwrap();
    let (continuation, payload_start) = match bytes[3] {
        b'-' => (true, 4),
        b' ' => (false, 4),
        _ => (false, 3),
    };
    Ok(ResponseLine {
        code,
        continuation,
        payload: line[payload_start..].to_string(),
    })
}

/// Map a response code outside the expected set for the current step to the
/// closed error taxonomy (§4.2). 2xx/3xx "success" codes are not passed here
/// by the session driver unless they genuinely mismatch what was expected.
pub fn classify(code: u16, message: impl Into<String>) -> SmtpError {
    let message = message.into();
    match code {
        403 => SmtpError::InvalidTlsHandshake,
        421 => SmtpError::ServiceNotAvailable,
        450 => SmtpError::TemporaryMailboxNotAvailable,
        451 => SmtpError::ErrorInProcessing,
        452 => SmtpError::InsufficientStorage,
        454 => SmtpError::TemporaryAuthFailure,
        455 => SmtpError::UnableToAccommodateParameter,
        500 => SmtpError::SyntaxErrorOrCommandNotFound,
        501 => SmtpError::InvalidParameter,
        502 => SmtpError::CommandNotImplemented,
        503 => SmtpError::InvalidCommandSequence,
        504 => SmtpError::ParameterNotImplemented,
        530 => SmtpError::AuthenticationRequired,
        534 => SmtpError::AuthMethodTooWeak,
        535 => SmtpError::InvalidCredentials,
        538 => SmtpError::EncryptionRequiredForAuthMethod,
        550 => SmtpError::MailboxNotAvailable,
        551 => SmtpError::UserNotLocal,
        552 => SmtpError::ExceededStorageAllocation,
        553 => SmtpError::MailboxNotAllowed,
        554 => SmtpError::TransactionFailed,
        555 => SmtpError::InvalidFromOrRecptParameter,
        c if c < 400 => SmtpError::UnexpectedServerResponse(c, message),
        c => SmtpError::UnknownServerResponse(c, message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_terminal_line() {
        let r = parse_response_line("250 ok").unwrap();
        assert_eq!(r.code, 250);
        assert!(!r.continuation);
        assert_eq!(r.payload, "ok");
    }

    #[test]
    fn parses_continuation_line() {
        let r = parse_response_line("250-STARTTLS").unwrap();
        assert_eq!(r.code, 250);
        assert!(r.continuation);
        assert_eq!(r.payload, "STARTTLS");
    }

    #[test]
    fn short_line_is_a_violation() {
        assert!(parse_response_line("25").is_err());
    }

    #[test]
    fn odd_byte_four_is_folded_into_payload() {
        let r = parse_response_line("250xtail").unwrap();
        assert!(!r.continuation);
        assert_eq!(r.payload, "xtail");
    }

    #[test]
    fn classifies_named_codes() {
        assert!(matches!(
            classify(535, "bad creds"),
            SmtpError::InvalidCredentials
        ));
        assert!(matches!(classify(421, ""), SmtpError::ServiceNotAvailable));
        assert!(matches!(
            classify(599, "huh"),
            SmtpError::UnknownServerResponse(599, _)
        ));
        assert!(matches!(
            classify(150, "huh"),
            SmtpError::UnexpectedServerResponse(150, _)
        ));
    }
}