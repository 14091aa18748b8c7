/*
 * dot_stuffer.rs
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

//! RFC 5321 §4.5.2 dot-stuffing for the `DATA` command (§4.7a): any line of
//! the message body that begins with `.` gets a second `.` prepended, and the
//! terminating `.\r\n` is emitted once the caller signals end of message.
//!
//! Streaming rather than whole-buffer so a message body can be fed in from
//! disk or network in arbitrary chunk sizes without first materializing the
//! whole thing.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// At the start of a line; a leading `.` here must be doubled.
    LineStart,
    /// Mid-line; bytes pass through untouched.
    Normal,
    /// Just saw a `\r`; a following `\n` completes the CRLF and returns to `LineStart`.
    SawCr,
}

/// Streaming dot-stuffer. Feed body bytes via [`process_chunk`], then call
/// [`end_message`] once to emit the terminating `.\r\n`.
pub struct DotStuffer {
    state: State,
}

impl Default for DotStuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl DotStuffer {
    pub fn new() -> Self {
        Self {
            state: State::LineStart,
        }
    }

    /// Transform one chunk of body bytes, returning the stuffed output.
    pub fn process_chunk(&mut self, chunk: &[u8]) -> Vec<u8> {
        let mut out = Vec::with_capacity(chunk.len());
        for &byte in chunk {
            match self.state {
                State::LineStart => {
                    if byte == b'.' {
                        out.push(b'.');
                    }
                    out.push(byte);
                    self.state = if byte == b'\r' {
                        State::SawCr
                    } else {
                        State::Normal
                    };
                }
                State::Normal => {
                    out.push(byte);
                    self.state = if byte == b'\r' {
                        State::SawCr
                    } else {
                        State::Normal
                    };
                }
                State::SawCr => {
                    out.push(byte);
                    self.state = if byte == b'\n' {
                        State::LineStart
                    } else if byte == b'\r' {
                        State::SawCr
                    } else {
                        State::Normal
                    };
                }
            }
        }
        out
    }

    /// Emit the terminating sequence. Ensures the message ends in CRLF before
    /// the bare `.\r\n` terminator, per RFC 5321 §4.1.1.4.
    pub fn end_message(&mut self) -> Vec<u8> {
        let mut out = Vec::new();
        match self.state {
            State::LineStart => {}
            State::SawCr => out.extend_from_slice(b"\n"),
            State::Normal => out.extend_from_slice(b"\r\n"),
        }
        out.extend_from_slice(b".\r\n");
        self.state = State::LineStart;
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stuff(input: &[u8]) -> Vec<u8> {
        let mut s = DotStuffer::new();
        let mut out = s.process_chunk(input);
        out.extend(s.end_message());
        out
    }

    #[test]
    fn no_stuffing_needed() {
        assert_eq!(stuff(b"hello\r\nworld\r\n"), b"hello\r\nworld\r\n.\r\n");
    }

    #[test]
    fn dot_after_crlf_is_doubled() {
        assert_eq!(stuff(b"hello\r\n.world\r\n"), b"hello\r\n..world\r\n.\r\n");
    }

    #[test]
    fn dot_only_at_line_start() {
        assert_eq!(stuff(b"a.b\r\n"), b"a.b\r\n.\r\n");
    }

    #[test]
    fn multiple_dots_at_line_start() {
        assert_eq!(stuff(b"..double\r\n"), b"...double\r\n.\r\n");
    }

    #[test]
    fn line_with_dot_stuffed_mid_message() {
        assert_eq!(
            stuff(b"first\r\n.second\r\nthird\r\n"),
            b"first\r\n..second\r\nthird\r\n.\r\n"
        );
    }

    #[test]
    fn end_message_emits_terminator_when_already_on_line_start() {
        let mut s = DotStuffer::new();
        let mut out = s.process_chunk(b"complete\r\n");
        out.extend(s.end_message());
        assert_eq!(out, b"complete\r\n.\r\n");
    }

    #[test]
    fn end_message_after_bare_cr() {
        let mut s = DotStuffer::new();
        let mut out = s.process_chunk(b"trailing\r");
        out.extend(s.end_message());
        assert_eq!(out, b"trailing\r\n.\r\n");
    }

    #[test]
    fn end_message_mid_line_adds_crlf_before_terminator() {
        let mut s = DotStuffer::new();
        let mut out = s.process_chunk(b"no newline at all");
        out.extend(s.end_message());
        assert_eq!(out, b"no newline at all\r\n.\r\n");
    }

    #[test]
    fn chunked_input_across_crlf_boundary() {
        let mut s = DotStuffer::new();
        let mut out = s.process_chunk(b"abc\r");
        out.extend(s.process_chunk(b"\n.def\r\n"));
        out.extend(s.end_message());
        assert_eq!(out, b"abc\r\n..def\r\n.\r\n");
    }
}