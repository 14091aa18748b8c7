/*
 * uri.rs
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

//! SMTP transport URL parsing: `smtp://host[:port]` and `smtps://host[:port]`.
//!
//! Mirrors the scheme conventions the rest of this corpus uses for store and
//! transport URLs (`imap://`, `imaps://`, ...): the scheme picks the default
//! port and whether the connection starts in implicit TLS.

use crate::error::{SmtpError, SmtpResult};

/// Default submission port for plain/STARTTLS `smtp://`.
pub const DEFAULT_SMTP_PORT: u16 = 1025;
/// Default port for implicit-TLS `smtps://`.
pub const DEFAULT_SMTPS_PORT: u16 = 465;

/// Parsed SMTP transport target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpUrl {
    pub host: String,
    pub port: u16,
    /// `true` for `smtps://` (implicit TLS from the first byte).
    pub implicit_tls: bool,
}

/// Parse `smtp://host[:port]` or `smtps://host[:port]`.
pub fn parse_smtp_url(url: &str) -> SmtpResult<SmtpUrl> {
    let (scheme, rest) = url.split_once("://").ok_or(SmtpError::InvalidSmtpScheme)?;
    let implicit_tls = match scheme {
        "smtp" => false,
        "smtps" => true,
        _ => return Err(SmtpError::InvalidSmtpScheme),
    };

    let authority = rest.split(['/', '?', '#']).next().unwrap_or("");
    if authority.is_empty() {
        return Err(SmtpError::UriMissingHost);
    }

    let (host, port) = match authority.rsplit_once(':') {
        Some((h, p)) if !h.is_empty() && p.chars().all(|c| c.is_ascii_digit()) && !p.is_empty() => {
            let port: u16 = p.parse().map_err(|_| SmtpError::UriMissingHost)?;
            (h.to_string(), Some(port))
        }
        _ => (authority.to_string(), None),
    };

    if host.is_empty() {
        return Err(SmtpError::UriMissingHost);
    }

    let port = port.unwrap_or(if implicit_tls {
        DEFAULT_SMTPS_PORT
    } else {
        DEFAULT_SMTP_PORT
    });

    Ok(SmtpUrl {
        host,
        port,
        implicit_tls,
    })
}
