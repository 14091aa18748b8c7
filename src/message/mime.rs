/*
 * mime.rs
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

//! Message/MIME composer (§4.4): turns a [`Message`] into the byte stream
//! that follows `DATA`. The caller is responsible for dot-stuffing (§4.7a)
//! and the terminating `.\r\n`; this module only produces the raw
//! (unstuffed) bytes.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use crate::capability::{Clock, EntropySource};
use crate::datetime::format_rfc822;
use crate::error::SmtpResult;

use super::encoded_word::render_subject;
use super::quoted_printable;
use super::{generate_boundary, Address, Attachment, Body, Message, MessageId, MultipartBody, SinglePart};

const BASE64_LINE_WIDTH: usize = 76;

/// Render a [`Message`] into the raw (pre-dot-stuffing) DATA payload.
pub fn compose(message: &Message, clock: &dyn Clock, entropy: &dyn EntropySource) -> SmtpResult<Vec<u8>> {
    let mut out = String::new();

    out.push_str(&format!("From: {}\r\n", message.from));
    if !message.to.is_empty() {
        out.push_str(&format!("To: {}\r\n", join_addresses(&message.to)));
    }
    if !message.cc.is_empty() {
        out.push_str(&format!("Cc: {}\r\n", join_addresses(&message.cc)));
    }
    if !message.bcc.is_empty() {
        out.push_str(&format!("Bcc: {}\r\n", join_addresses(&message.bcc)));
    }
    if let Some(subject) = &message.subject {
        out.push_str(&format!("Subject: {}\r\n", render_subject(subject)));
    }
    let timestamp = message.timestamp.unwrap_or_else(|| clock.now());
    out.push_str(&format!("Date: {}\r\n", format_rfc822(timestamp)));
    out.push_str("MIME-Version: 1.0\r\n");

    let message_id = MessageId::generate(entropy, &message.from)?;
    out.push_str(&format!("Message-ID: {message_id}\r\n"));

    let mut bytes = out.into_bytes();
    write_body(&mut bytes, &message.body, entropy);
    Ok(bytes)
}

fn join_addresses(addrs: &[Address]) -> String {
    addrs.iter().map(Address::to_string).collect::<Vec<_>>().join(", ")
}

fn write_body(out: &mut Vec<u8>, body: &Body, entropy: &dyn EntropySource) {
    match body {
        Body::Single(part) => write_single(out, part),
        Body::Multipart(MultipartBody::Alternative { text, html }) => {
            write_alternative(out, text, html, entropy)
        }
        Body::Multipart(MultipartBody::Mixed {
            text,
            html,
            attachments,
        }) => write_mixed(out, text.as_deref(), html.as_deref(), attachments, entropy),
        Body::Multipart(MultipartBody::Related {
            text,
            html,
            attachments,
        }) => write_related(out, text.as_deref(), html, attachments, entropy),
    }
}

fn write_single(out: &mut Vec<u8>, part: &SinglePart) {
    match part {
        SinglePart::Text(text) => write_text_part(out, "text/plain", text),
        SinglePart::Html(html) => write_text_part(out, "text/html", html),
        SinglePart::Attachment(attachment) => {
            debug_assert!(
                matches!(attachment, Attachment::Attached { .. }),
                "a Single body attachment must be Attached, never Inlined"
            );
            write_attached(out, attachment, "attachment");
        }
    }
}

fn write_text_part(out: &mut Vec<u8>, mime_type: &str, body: &str) {
    out.extend_from_slice(format!("Content-Type: {mime_type}; charset=utf-8\r\n").as_bytes());
    out.extend_from_slice(b"Content-Transfer-Encoding: quoted-printable\r\n\r\n");
    out.extend_from_slice(quoted_printable::encode(body.as_bytes()).as_bytes());
    out.extend_from_slice(b"\r\n");
}

fn open_multipart(out: &mut Vec<u8>, kind: &str, boundary: &str) {
    out.extend_from_slice(format!("Content-Type: multipart/{kind}; boundary=\"{boundary}\"\r\n\r\n").as_bytes());
}

fn boundary_marker(out: &mut Vec<u8>, boundary: &str) {
    out.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
}

fn close_multipart(out: &mut Vec<u8>, boundary: &str) {
    out.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());
}

fn write_alternative(out: &mut Vec<u8>, text: &str, html: &str, entropy: &dyn EntropySource) {
    let boundary = generate_boundary(entropy);
    open_multipart(out, "alternative", &boundary);
    boundary_marker(out, &boundary);
    write_text_part(out, "text/plain", text);
    boundary_marker(out, &boundary);
    write_text_part(out, "text/html", html);
    close_multipart(out, &boundary);
}

fn write_mixed(
    out: &mut Vec<u8>,
    text: Option<&str>,
    html: Option<&str>,
    attachments: &[Attachment],
    entropy: &dyn EntropySource,
) {
    for attachment in attachments {
        debug_assert!(
            matches!(attachment, Attachment::Attached { .. }),
            "multipart/mixed attachments must be Attached, never Inlined"
        );
    }

    let boundary = generate_boundary(entropy);
    open_multipart(out, "mixed", &boundary);

    match (text, html) {
        (Some(text), Some(html)) => {
            boundary_marker(out, &boundary);
            write_alternative(out, text, html, entropy);
        }
        (Some(text), None) => {
            boundary_marker(out, &boundary);
            write_text_part(out, "text/plain", text);
        }
        (None, Some(html)) => {
            boundary_marker(out, &boundary);
            write_text_part(out, "text/html", html);
        }
        (None, None) => {}
    }

    for attachment in attachments {
        boundary_marker(out, &boundary);
        write_attached(out, attachment, "attachment");
    }

    close_multipart(out, &boundary);
}

fn write_related_block(out: &mut Vec<u8>, html: &str, attachments: &[Attachment], entropy: &dyn EntropySource) {
    for attachment in attachments {
        debug_assert!(
            matches!(attachment, Attachment::Inlined { .. }),
            "multipart/related attachments must be Inlined, never Attached"
        );
    }

    let boundary = generate_boundary(entropy);
    open_multipart(out, "related", &boundary);
    boundary_marker(out, &boundary);
    write_text_part(out, "text/html", html);
    for attachment in attachments {
        boundary_marker(out, &boundary);
        write_attached(out, attachment, "inline");
    }
    close_multipart(out, &boundary);
}

fn write_related(
    out: &mut Vec<u8>,
    text: Option<&str>,
    html: &str,
    attachments: &[Attachment],
    entropy: &dyn EntropySource,
) {
    match text {
        Some(text) => {
            let outer_boundary = generate_boundary(entropy);
            open_multipart(out, "alternative", &outer_boundary);
            boundary_marker(out, &outer_boundary);
            write_text_part(out, "text/plain", text);
            boundary_marker(out, &outer_boundary);
            write_related_block(out, html, attachments, entropy);
            close_multipart(out, &outer_boundary);
        }
        None => write_related_block(out, html, attachments, entropy),
    }
}

/// Render one attachment's headers and base64 body. `disposition` is
/// `"attachment"` for `mixed` parts or `"inline"` for `related` parts.
fn write_attached(out: &mut Vec<u8>, attachment: &Attachment, disposition: &str) {
    match attachment {
        Attachment::Attached {
            name,
            content_type,
            bytes,
        } => {
            out.extend_from_slice(format!("Content-Type: {content_type}; name=\"{name}\"\r\n").as_bytes());
            out.extend_from_slice(
                format!("Content-Disposition: {disposition}; filename=\"{name}\"\r\n").as_bytes(),
            );
            out.extend_from_slice(b"Content-Transfer-Encoding: base64\r\n\r\n");
            write_base64_wrapped(out, bytes);
        }
        Attachment::Inlined {
            content_id,
            content_type,
            bytes,
            name,
        } => {
            let name_param = name.as_deref().map(|n| format!("; name=\"{n}\"")).unwrap_or_default();
            out.extend_from_slice(format!("Content-Type: {content_type}{name_param}\r\n").as_bytes());
            let filename = name.as_deref().unwrap_or(&content_id.local_hex);
            out.extend_from_slice(
                format!("Content-Disposition: {disposition}; filename=\"{filename}\"\r\n").as_bytes(),
            );
            out.extend_from_slice(format!("Content-Location: {filename}\r\n").as_bytes());
            out.extend_from_slice(format!("Content-Id: <{content_id}>\r\n").as_bytes());
            out.extend_from_slice(b"Content-Transfer-Encoding: base64\r\n\r\n");
            write_base64_wrapped(out, bytes);
        }
    }
}

fn write_base64_wrapped(out: &mut Vec<u8>, bytes: &[u8]) {
    let encoded = BASE64.encode(bytes);
    for chunk in encoded.as_bytes().chunks(BASE64_LINE_WIDTH) {
        out.extend_from_slice(chunk);
        out.extend_from_slice(b"\r\n");
    }
}
