/*
 * extension.rs
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

//! EHLO capability parsing (§3/§4.7 transition 1): turns the multi-line EHLO
//! reply into a structured capability set the session driver can branch on.

use crate::transport::response::Response;

/// Capabilities the server advertised in its EHLO reply.
#[derive(Debug, Clone, Default)]
pub struct ClientExtensions {
    pub starttls: bool,
    pub auth_mechanisms: Vec<String>,
    pub eight_bit_mime: bool,
    pub smtp_utf8: bool,
    pub max_message_size: Option<u64>,
}

impl ClientExtensions {
    pub fn supports(&self, mechanism: &str) -> bool {
        self.auth_mechanisms
            .iter()
            .any(|m| m.eq_ignore_ascii_case(mechanism))
    }
}

/// Parse the continuation lines of an EHLO reply (greeting line excluded) into
/// [`ClientExtensions`]. Unrecognized keywords are ignored, per §3.
pub fn parse_ehlo(response: &Response) -> ClientExtensions {
    let mut ext = ClientExtensions::default();
    for line in response.lines.iter().skip(1) {
        let mut parts = line.split_whitespace();
        let Some(keyword) = parts.next() else {
            continue;
        };
        match keyword.to_ascii_uppercase().as_str() {
            "STARTTLS" => ext.starttls = true,
            "8BITMIME" => ext.eight_bit_mime = true,
            "SMTPUTF8" => ext.smtp_utf8 = true,
            "AUTH" => ext.auth_mechanisms = parts.map(str::to_string).collect(),
            "SIZE" => {
                ext.max_message_size = parts.next().and_then(|n| n.parse().ok());
            }
            _ => {}
        }
    }
    ext
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(lines: &[&str]) -> Response {
        Response {
            code: 250,
            lines: lines.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn parses_starttls_and_auth_and_size() {
        let r = response(&[
            "mail.example.org greets you",
            "STARTTLS",
            "AUTH PLAIN LOGIN XOAUTH2",
            "SIZE 35882577",
        ]);
        let ext = parse_ehlo(&r);
        assert!(ext.starttls);
        assert_eq!(ext.auth_mechanisms, vec!["PLAIN", "LOGIN", "XOAUTH2"]);
        assert_eq!(ext.max_message_size, Some(35_882_577));
    }

    #[test]
    fn unknown_keywords_are_ignored() {
        let r = response(&["greeting", "PIPELINING", "DSN", "CHUNKING"]);
        let ext = parse_ehlo(&r);
        assert!(!ext.starttls);
        assert!(ext.auth_mechanisms.is_empty());
    }

    #[test]
    fn parses_8bitmime_and_smtputf8() {
        let r = response(&["greeting", "8BITMIME", "SMTPUTF8"]);
        let ext = parse_ehlo(&r);
        assert!(ext.eight_bit_mime);
        assert!(ext.smtp_utf8);
    }

    #[test]
    fn supports_is_case_insensitive() {
        let mut ext = ClientExtensions::default();
        ext.auth_mechanisms = vec!["Plain".to_string()];
        assert!(ext.supports("PLAIN"));
    }
}