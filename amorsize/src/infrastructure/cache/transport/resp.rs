// /////////////////////////////////////////////////////////////////////////////
// Amorsize RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # RESP Transport
//!
//! A minimal client for the RESP wire protocol (the Redis serialization
//! protocol), covering exactly the five verbs the shared cache needs:
//! `GET`, `SETEX`, `DEL`, `KEYS`, `PING`.
//!
//! ## Connection Handling
//!
//! One TCP connection per transport, lazily established and guarded by a
//! mutex; every socket operation carries the configured timeout. Any error
//! drops the connection so the next call reconnects from scratch - the
//! shared tier's degradation policy upstream means a failed call is just a
//! cache miss, so aggressive reconnection beats clever retry logic.
//!
//! ## Wire Codec
//!
//! Commands are always encoded as arrays of bulk strings. Replies are
//! parsed over any `BufRead`, which keeps the codec testable against
//! in-memory byte buffers without a live server.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use parking_lot::Mutex;
use tracing::debug;

use super::{KeyValueTransport, TransportError};

/// One parsed RESP reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Simple(String),
    Error(String),
    Integer(i64),
    Bulk(Option<Vec<u8>>),
    Array(Option<Vec<Reply>>),
}

/// Encodes a command as a RESP array of bulk strings.
pub fn encode_command(parts: &[&[u8]]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(format!("*{}\r\n", parts.len()).as_bytes());
    for part in parts {
        out.extend_from_slice(format!("${}\r\n", part.len()).as_bytes());
        out.extend_from_slice(part);
        out.extend_from_slice(b"\r\n");
    }
    out
}

/// Parses one RESP reply from a buffered reader.
pub fn read_reply<R: BufRead>(reader: &mut R) -> Result<Reply, TransportError> {
    let line = read_line(reader)?;
    let marker = line.as_bytes()[0];
    let rest = line.get(1..).ok_or_else(|| {
        TransportError::Protocol("reply marker is not single-byte".into())
    })?;
    match marker {
        b'+' => Ok(Reply::Simple(rest.to_string())),
        b'-' => Ok(Reply::Error(rest.to_string())),
        b':' => rest
            .parse::<i64>()
            .map(Reply::Integer)
            .map_err(|e| TransportError::Protocol(format!("bad integer reply: {}", e))),
        b'$' => {
            let len = rest
                .parse::<i64>()
                .map_err(|e| TransportError::Protocol(format!("bad bulk length: {}", e)))?;
            if len < 0 {
                return Ok(Reply::Bulk(None));
            }
            let mut payload = vec![0u8; len as usize];
            reader.read_exact(&mut payload)?;
            let mut crlf = [0u8; 2];
            reader.read_exact(&mut crlf)?;
            if crlf != *b"\r\n" {
                return Err(TransportError::Protocol(
                    "bulk payload not terminated by CRLF".into(),
                ));
            }
            Ok(Reply::Bulk(Some(payload)))
        }
        b'*' => {
            let len = rest
                .parse::<i64>()
                .map_err(|e| TransportError::Protocol(format!("bad array length: {}", e)))?;
            if len < 0 {
                return Ok(Reply::Array(None));
            }
            let mut items = Vec::with_capacity(len as usize);
            for _ in 0..len {
                items.push(read_reply(reader)?);
            }
            Ok(Reply::Array(Some(items)))
        }
        other => Err(TransportError::Protocol(format!(
            "unknown reply marker: {:?}",
            other
        ))),
    }
}

fn read_line<R: BufRead>(reader: &mut R) -> Result<String, TransportError> {
    let mut line = String::new();
    let read = reader.read_line(&mut line)?;
    if read == 0 {
        return Err(TransportError::Protocol("connection closed mid-reply".into()));
    }
    let trimmed = line.trim_end_matches(['\r', '\n']);
    if trimmed.is_empty() {
        return Err(TransportError::Protocol("empty reply line".into()));
    }
    Ok(trimmed.to_string())
}

/// Parses `redis://host:port` (port optional, default 6379) into a socket
/// address.
pub fn parse_endpoint(url: &str) -> Result<SocketAddr, TransportError> {
    let stripped = url
        .strip_prefix("redis://")
        .unwrap_or(url)
        .trim_end_matches('/');
    if stripped.is_empty() {
        return Err(TransportError::BadEndpoint(format!(
            "no host in endpoint: {url}"
        )));
    }
    let host_port = if stripped.contains(':') {
        stripped.to_string()
    } else {
        format!("{stripped}:6379")
    };
    host_port
        .to_socket_addrs()
        .map_err(|e| TransportError::BadEndpoint(format!("{host_port}: {e}")))?
        .next()
        .ok_or_else(|| TransportError::BadEndpoint(format!("{host_port}: no addresses resolved")))
}

/// RESP TCP client implementing the shared cache's transport port.
pub struct RespTransport {
    addr: SocketAddr,
    timeout: Duration,
    conn: Mutex<Option<TcpStream>>,
}

impl RespTransport {
    /// Connects lazily to the endpoint named by `url`.
    ///
    /// # Arguments
    /// * `url` - `redis://host:port` (port defaults to 6379)
    /// * `timeout` - Applied to connect, read, and write individually
    pub fn new(url: &str, timeout: Duration) -> Result<Self, TransportError> {
        Ok(Self {
            addr: parse_endpoint(url)?,
            timeout,
            conn: Mutex::new(None),
        })
    }

    fn connect(&self) -> Result<TcpStream, TransportError> {
        let stream = TcpStream::connect_timeout(&self.addr, self.timeout)?;
        stream.set_read_timeout(Some(self.timeout))?;
        stream.set_write_timeout(Some(self.timeout))?;
        stream.set_nodelay(true)?;
        debug!(addr = %self.addr, "shared cache transport connected");
        Ok(stream)
    }

    /// Sends one command, reading one reply. Drops the connection on any
    /// failure so the next call starts clean.
    fn roundtrip(&self, parts: &[&[u8]]) -> Result<Reply, TransportError> {
        let mut guard = self.conn.lock();
        if guard.is_none() {
            *guard = Some(self.connect()?);
        }
        let result = (|| {
            let stream = guard.as_mut().ok_or_else(|| {
                TransportError::Protocol("connection vanished under lock".into())
            })?;
            stream.write_all(&encode_command(parts))?;
            stream.flush()?;
            let mut reader = BufReader::new(stream.try_clone()?);
            read_reply(&mut reader)
        })();
        if result.is_err() {
            *guard = None;
        }
        match result {
            Ok(Reply::Error(message)) => Err(TransportError::Server(message)),
            other => other,
        }
    }
}

impl KeyValueTransport for RespTransport {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, TransportError> {
        match self.roundtrip(&[b"GET", key.as_bytes()])? {
            Reply::Bulk(value) => Ok(value),
            other => Err(TransportError::Protocol(format!(
                "unexpected GET reply: {other:?}"
            ))),
        }
    }

    fn setex(&self, key: &str, ttl: Duration, value: &[u8]) -> Result<(), TransportError> {
        let seconds = ttl.as_secs().max(1).to_string();
        match self.roundtrip(&[b"SETEX", key.as_bytes(), seconds.as_bytes(), value])? {
            Reply::Simple(ok) if ok == "OK" => Ok(()),
            other => Err(TransportError::Protocol(format!(
                "unexpected SETEX reply: {other:?}"
            ))),
        }
    }

    fn delete(&self, keys: &[String]) -> Result<u64, TransportError> {
        if keys.is_empty() {
            return Ok(0);
        }
        let mut parts: Vec<&[u8]> = vec![b"DEL"];
        parts.extend(keys.iter().map(|k| k.as_bytes()));
        match self.roundtrip(&parts)? {
            Reply::Integer(n) if n >= 0 => Ok(n as u64),
            other => Err(TransportError::Protocol(format!(
                "unexpected DEL reply: {other:?}"
            ))),
        }
    }

    fn keys(&self, pattern: &str) -> Result<Vec<String>, TransportError> {
        match self.roundtrip(&[b"KEYS", pattern.as_bytes()])? {
            Reply::Array(Some(items)) => items
                .into_iter()
                .map(|item| match item {
                    Reply::Bulk(Some(bytes)) => String::from_utf8(bytes).map_err(|e| {
                        TransportError::Protocol(format!("non-utf8 key: {e}"))
                    }),
                    other => Err(TransportError::Protocol(format!(
                        "unexpected KEYS element: {other:?}"
                    ))),
                })
                .collect(),
            Reply::Array(None) => Ok(Vec::new()),
            other => Err(TransportError::Protocol(format!(
                "unexpected KEYS reply: {other:?}"
            ))),
        }
    }

    fn ping(&self) -> Result<(), TransportError> {
        match self.roundtrip(&[b"PING"])? {
            Reply::Simple(pong) if pong == "PONG" => Ok(()),
            other => Err(TransportError::Protocol(format!(
                "unexpected PING reply: {other:?}"
            ))),
        }
    }
}
