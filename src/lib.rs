/*
 * lib.rs
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

//! Async SMTP submission client.
//!
//! Connects to a submission endpoint, negotiates capabilities, optionally
//! upgrades to TLS (implicit or `STARTTLS`), authenticates, and sends an
//! RFC 5322 / MIME message. See [`session::SmtpClient`] for the entry point.

pub mod auth;
pub mod capability;
pub mod datetime;
pub mod error;
pub mod extension;
pub mod message;
pub mod session;
pub mod transport;
pub mod uri;

pub use error::{SmtpError, SmtpResult};
pub use message::{Address, Attachment, Body, Message, MultipartBody, SinglePart};
pub use session::{ConnectOptions, SmtpClient};