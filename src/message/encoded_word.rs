/*
 * encoded_word.rs
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

//! RFC 2047 `Q` encoded-word wrapping for non-ASCII `Subject:` headers (§4.4
//! step 4). The corpus only ever had a decoder for this; this encoder mirrors
//! its `Q`/`B` terminology but runs the other direction.

const HEX: &[u8; 16] = b"0123456789ABCDEF";

fn needs_escape(byte: u8) -> bool {
    !(byte.is_ascii_alphanumeric()) || byte == b'='
}

/// `true` if `text` contains any byte outside printable ASCII.
pub fn is_ascii_subject(text: &str) -> bool {
    text.bytes().all(|b| (0x20..=0x7e).contains(&b))
}

/// Encode `text` as a single `=?UTF-8?Q?...?=` encoded-word. Space is encoded
/// as `_` per RFC 2047 §4.2; everything outside alphanumerics is `=XX`.
pub fn encode_q(text: &str) -> String {
    let mut body = String::with_capacity(text.len());
    for byte in text.bytes() {
        if byte == b' ' {
            body.push('_');
        } else if needs_escape(byte) {
            body.push('=');
            body.push(HEX[(byte >> 4) as usize] as char);
            body.push(HEX[(byte & 0x0f) as usize] as char);
        } else {
            body.push(byte as char);
        }
    }
    format!("=?UTF-8?Q?{body}?=")
}

/// Render a `Subject:` header value: literal if pure ASCII, encoded-word
/// wrapped if any byte has the high bit set.
pub fn render_subject(subject: &str) -> String {
    if is_ascii_subject(subject) {
        subject.to_string()
    } else {
        encode_q(subject)
    }
}
