/*
 * auth.rs
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

//! SASL authentication mechanisms offered over SMTP `AUTH` (§4.5): `PLAIN`,
//! `LOGIN`, and `XOAUTH2`. Unlike the decoder this module is adapted from,
//! every response here is built with the real `base64` crate rather than a
//! hand-rolled table.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use crate::error::SmtpError;

/// A mechanism the server advertised in its EHLO `AUTH` line, in the
/// preference order this crate picks among them: `XOAUTH2` first (it is the
/// only one usable without ever sending a bare password), then `LOGIN`, then
/// `PLAIN`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mechanism {
    XOAuth2,
    Login,
    Plain,
}

impl Mechanism {
    pub fn name(self) -> &'static str {
        match self {
            Mechanism::XOAuth2 => "XOAUTH2",
            Mechanism::Login => "LOGIN",
            Mechanism::Plain => "PLAIN",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().as_str() {
            "XOAUTH2" => Some(Mechanism::XOAuth2),
            "LOGIN" => Some(Mechanism::Login),
            "PLAIN" => Some(Mechanism::Plain),
            _ => None,
        }
    }

    /// Pick the strongest mechanism this crate supports out of those the
    /// server offered, in `XOAUTH2 > LOGIN > PLAIN` order.
    pub fn choose(offered: &[String]) -> Option<Self> {
        [Mechanism::XOAuth2, Mechanism::Login, Mechanism::Plain]
            .into_iter()
            .find(|m| offered.iter().any(|o| Mechanism::from_name(o) == Some(*m)))
    }
}

/// Credential material for the mechanisms above. `XOAUTH2` uses `token` in
/// place of a password; `PLAIN`/`LOGIN` use `password`.
pub enum Credentials<'a> {
    Password { username: &'a str, password: &'a str },
    OAuthBearer { username: &'a str, token: &'a str },
}

/// Base64 the initial response for `AUTH PLAIN`: `\0authcid\0password`.
pub fn plain_initial_response(username: &str, password: &str) -> String {
    let mut raw = Vec::with_capacity(username.len() + password.len() + 2);
    raw.push(0u8);
    raw.extend_from_slice(username.as_bytes());
    raw.push(0u8);
    raw.extend_from_slice(password.as_bytes());
    BASE64.encode(raw)
}

/// Base64 the `XOAUTH2` initial response:
/// `user=<username>\x01auth=Bearer <token>\x01\x01`.
pub fn xoauth2_initial_response(username: &str, token: &str) -> String {
    let raw = format!("user={username}\x01auth=Bearer {token}\x01\x01");
    BASE64.encode(raw)
}

/// Decode a server `334`-continuation challenge. Returns an empty string for
/// a bare `334 ` prompt such as `AUTH LOGIN`'s `Username:`/`Password:` lines.
pub fn decode_challenge(payload: &str) -> Result<Vec<u8>, SmtpError> {
    if payload.is_empty() {
        return Ok(Vec::new());
    }
    BASE64
        .decode(payload)
        .map_err(|_| SmtpError::UnsupportedAuthHandshake)
}

pub fn encode_response(raw: &[u8]) -> String {
    BASE64.encode(raw)
}

/// Drive one full `AUTH` exchange's worth of client responses for a given
/// mechanism and credentials. `LOGIN` is challenge/response (username, then
/// password); `PLAIN` and `XOAUTH2` send everything in the initial response.
pub fn initial_response(mechanism: Mechanism, credentials: &Credentials<'_>) -> Result<String, SmtpError> {
    match (mechanism, credentials) {
        (Mechanism::Plain, Credentials::Password { username, password }) => {
            Ok(plain_initial_response(username, password))
        }
        (Mechanism::XOAuth2, Credentials::OAuthBearer { username, token }) => {
            Ok(xoauth2_initial_response(username, token))
        }
        (Mechanism::Login, Credentials::Password { .. }) => Ok(String::new()),
        _ => Err(SmtpError::UnsupportedAuthHandshake),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_response_is_nul_separated() {
        let encoded = plain_initial_response("user@example.org", "hunter2");
        let decoded = BASE64.decode(encoded).unwrap();
        assert_eq!(decoded, b"\0user@example.org\0hunter2");
    }

    #[test]
    fn xoauth2_response_has_expected_shape() {
        let encoded = xoauth2_initial_response("user@example.org", "tok123");
        let decoded = BASE64.decode(encoded).unwrap();
        assert_eq!(decoded, b"user=user@example.org\x01auth=Bearer tok123\x01\x01");
    }

    #[test]
    fn choose_prefers_xoauth2_over_login_and_plain() {
        let offered = vec!["PLAIN".to_string(), "LOGIN".to_string(), "XOAUTH2".to_string()];
        assert_eq!(Mechanism::choose(&offered), Some(Mechanism::XOAuth2));
    }

    #[test]
    fn choose_falls_back_to_plain() {
        let offered = vec!["PLAIN".to_string()];
        assert_eq!(Mechanism::choose(&offered), Some(Mechanism::Plain));
    }

    #[test]
    fn choose_is_none_for_unsupported_mechanisms_only() {
        let offered = vec!["CRAM-MD5".to_string(), "SCRAM-SHA-256".to_string()];
        assert_eq!(Mechanism::choose(&offered), None);
    }

    #[test]
    fn decode_challenge_handles_empty_prompt() {
        assert_eq!(decode_challenge("").unwrap(), Vec::<u8>::new());
    }
}