/*
 * mod.rs
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

//! The message value: addresses, body tree, attachments, and the identifiers
//! derived from them (§3). [`mime`] turns a [`Message`] into the byte stream
//! that follows `DATA`.

pub mod encoded_word;
pub mod mime;
pub mod quoted_printable;

use std::fmt;

use crate::capability::EntropySource;
use crate::error::{SmtpError, SmtpResult};

/// `(optional display-name, address-string)`, rendered `name <addr>` or `<addr>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    pub display_name: Option<String>,
    pub address: String,
}

impl Address {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            display_name: None,
            address: address.into(),
        }
    }

    pub fn with_name(display_name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            display_name: Some(display_name.into()),
            address: address.into(),
        }
    }

    /// The substring of `address` after the first `@`. Errors if there is none.
    pub fn domain(&self) -> SmtpResult<&str> {
        self.address
            .split_once('@')
            .map(|(_, domain)| domain)
            .ok_or(SmtpError::ExpectedEmailDomain)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.display_name {
            Some(name) => write!(f, "{name} <{}>", self.address),
            None => write!(f, "<{}>", self.address),
        }
    }
}

/// A MIME `Content-Id`: 16 random bytes rendered as lowercase hex, plus a domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentId {
    pub local_hex: String,
    pub domain: String,
}

impl ContentId {
    pub fn generate(entropy: &dyn EntropySource, domain: impl Into<String>) -> Self {
        Self {
            local_hex: hex16(entropy),
            domain: domain.into(),
        }
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.local_hex, self.domain)
    }
}

/// `Message-ID`: 16 random bytes plus the domain derived from `from.address`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageId {
    pub local_hex: String,
    pub domain: String,
}

impl MessageId {
    pub fn generate(entropy: &dyn EntropySource, from: &Address) -> SmtpResult<Self> {
        Ok(Self {
            local_hex: hex16(entropy),
            domain: from.domain()?.to_string(),
        })
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}@{}>", self.local_hex, self.domain)
    }
}

/// Generate a fresh multipart boundary: 16 random bytes as lowercase hex.
pub fn generate_boundary(entropy: &dyn EntropySource) -> String {
    hex16(entropy)
}

fn hex16(entropy: &dyn EntropySource) -> String {
    let bytes = entropy.bytes16();
    let mut out = String::with_capacity(32);
    for b in bytes {
        out.push_str(&format!("{b:02x}"));
    }
    out
}

/// An attachment, tagged by how it is referenced from the body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attachment {
    /// A regular file attachment in a `mixed` part or a `Single` body.
    Attached {
        name: String,
        content_type: String,
        bytes: Vec<u8>,
    },
    /// Referenced from HTML via `cid:` in a `related` part.
    Inlined {
        content_id: ContentId,
        content_type: String,
        bytes: Vec<u8>,
        name: Option<String>,
    },
}

/// The single-part body variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinglePart {
    Text(String),
    Html(String),
    /// Must be an `Attachment::Attached`, never `Inlined` (§4.4 assertions).
    Attachment(Attachment),
}

/// The multipart body variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MultipartBody {
    Alternative {
        text: String,
        html: String,
    },
    /// Attachments must all be `Attached` (§4.4 assertions).
    Mixed {
        text: Option<String>,
        html: Option<String>,
        attachments: Vec<Attachment>,
    },
    /// Attachments must all be `Inlined` (§4.4 assertions).
    Related {
        text: Option<String>,
        html: String,
        attachments: Vec<Attachment>,
    },
}

/// The body tree: either one part, or a tagged multipart container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    Single(SinglePart),
    Multipart(MultipartBody),
}

/// A complete message, ready for composition (§4.4) and sending (§4.7).
#[derive(Debug, Clone)]
pub struct Message {
    pub from: Address,
    pub to: Vec<Address>,
    pub cc: Vec<Address>,
    pub bcc: Vec<Address>,
    pub subject: Option<String>,
    /// Seconds since the Unix epoch; `None` means "now" via the clock capability.
    pub timestamp: Option<i64>,
    pub body: Body,
}
