//! ELM327 adapter over TCP.
//!
//! Wi-Fi OBD-II dongles expose the ELM327 command set on a plain TCP socket
//! (usually `192.168.0.10:35000`). Commands are ASCII lines terminated by
//! `\r`; every response ends with the `>` prompt.
//!
//! # Handshake (blocking, bounded by the connect timeout)
//!
//! | Command | Purpose | Expected |
//! |---------|---------|----------|
//! | `ATZ` | Reset, identify | `ELM327 v…` |
//! | `ATE0` | Echo off | `OK` |
//! | `ATL0` | Linefeeds off | `OK` |
//! | `ATS0` | Spaces off | `OK` |
//! | `ATSP0` | Automatic protocol | `OK` |
//! | `0100` | Supported PIDs; wakes the ECU | `41 00 …` |
//!
//! # Polling (non-blocking)
//!
//! After the handshake the socket is switched to non-blocking mode. At most
//! one request is in flight. Each [`query`](VehicleConnection::query) first
//! collects every complete answer that has arrived, then sends the next PID
//! round-robin, then hands out the freshest value for the asked PID exactly
//! once. A request that stays unanswered past the timeout is abandoned.
//!
//! Answers are filed under the PID named in their `41xx` header, not under
//! the request in flight, so a late answer to an abandoned request cannot
//! shift later answers onto the wrong PID. Header-less replies (`NO DATA`)
//! are charged to abandoned requests first.

use std::io::{self, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::{Duration, Instant};

use super::{Pid, VehicleConnection};
use crate::error::{HudError, Result};

/// End-of-response prompt.
const PROMPT: u8 = b'>';

/// Setup commands sent after `ATZ`, in order.
const SETUP_COMMANDS: [&str; 4] = ["ATE0", "ATL0", "ATS0", "ATSP0"];

/// Adapter answers that carry no reading.
const NO_DATA_MARKERS: [&str; 4] = ["NO DATA", "?", "STOPPED", "UNABLE TO CONNECT"];

/// Read chunk size.
const CHUNK: usize = 128;

/// Connection to an ELM327 adapter.
///
/// Generic over the byte stream so tests can script the adapter in memory.
pub struct LiveConnection<S = TcpStream> {
    stream: S,
    description: String,
    connected: bool,
    /// Bytes received but not yet consumed up to a prompt.
    buffer: Vec<u8>,
    /// PID awaiting an answer and when it was sent.
    in_flight: Option<(Pid, Instant)>,
    /// Timed-out requests whose answers may still arrive.
    abandoned: usize,
    /// Index into [`Pid::ALL`] of the next PID to request.
    next_pid: usize,
    /// Answers not yet handed out, indexed like [`Pid::ALL`].
    fresh: [Option<f32>; Pid::ALL.len()],
    timeout: Duration,
}

impl LiveConnection<TcpStream> {
    /// Connect to `address`, run the handshake and switch to non-blocking.
    pub fn open(
        address: &str,
        timeout: Duration,
    ) -> Result<Self> {
        let addr = address
            .to_socket_addrs()
            .map_err(|e| HudError::Connection(format!("cannot resolve adapter address '{address}': {e}")))?
            .next()
            .ok_or_else(|| HudError::Connection(format!("adapter address '{address}' resolved to nothing")))?;

        tracing::info!("Connecting to OBD-II adapter at {addr}");
        let stream = TcpStream::connect_timeout(&addr, timeout)
            .map_err(|e| HudError::Connection(format!("cannot reach adapter at {addr}: {e}")))?;
        stream.set_read_timeout(Some(timeout))?;
        stream.set_nodelay(true)?;

        let connection = Self::handshake(stream, address, timeout)?;
        connection.stream.set_nonblocking(true)?;
        Ok(connection)
    }
}

impl<S: Read + Write> LiveConnection<S> {
    /// Run the ELM327 initialization sequence on an open stream.
    ///
    /// Fails if the adapter does not identify itself as an ELM327 or stops
    /// answering. A vehicle that does not answer `0100` is not an error here:
    /// the connection is returned with `is_connected() == false`.
    pub fn handshake(
        stream: S,
        address: &str,
        timeout: Duration,
    ) -> Result<Self> {
        let mut connection = Self {
            stream,
            description: format!("ELM327 at {address}"),
            connected: false,
            buffer: Vec::with_capacity(CHUNK),
            in_flight: None,
            abandoned: 0,
            next_pid: 0,
            fresh: [None; Pid::ALL.len()],
            timeout,
        };

        let identity = connection.command("ATZ")?;
        let version = identity
            .split(['\r', '\n'])
            .map(str::trim)
            .find(|line| line.contains("ELM"))
            .ok_or_else(|| HudError::Connection(format!("not an ELM327 adapter: '{}'", identity.trim())))?;
        connection.description = format!("{version} at {address}");
        tracing::debug!("Adapter identified as {version}");

        for setup in SETUP_COMMANDS {
            let reply = connection.command(setup)?;
            if !reply.contains("OK") {
                tracing::warn!("Adapter rejected {setup}: '{}'", reply.trim());
            }
        }

        let supported = connection.command("0100")?;
        connection.connected = response_lines(&supported).any(|line| line.starts_with("4100"));
        if connection.connected {
            tracing::info!("Vehicle answered on {}", connection.description);
        } else {
            tracing::warn!("Vehicle did not answer 0100: '{}'", supported.trim());
        }

        connection.buffer.clear();
        Ok(connection)
    }

    /// Underlying stream.
    pub const fn get_ref(&self) -> &S { &self.stream }

    /// Send one command line.
    fn send(
        &mut self,
        command: &str,
    ) -> io::Result<()> {
        tracing::trace!("-> {command}");
        self.stream.write_all(command.as_bytes())?;
        self.stream.write_all(b"\r")?;
        self.stream.flush()
    }

    /// Send a command and wait for its full response.
    fn command(
        &mut self,
        command: &str,
    ) -> Result<String> {
        self.send(command)?;
        self.read_until_prompt()?
            .ok_or_else(|| HudError::Connection(format!("adapter did not answer '{command}'")))
    }

    /// Read until a complete response is buffered.
    ///
    /// Returns `Ok(None)` when the stream has no more bytes for now (read
    /// timeout while blocking, `WouldBlock` once non-blocking). End of stream
    /// is an `UnexpectedEof` error.
    fn read_until_prompt(&mut self) -> io::Result<Option<String>> {
        let mut chunk = [0u8; CHUNK];
        loop {
            if let Some(end) = self.buffer.iter().position(|&b| b == PROMPT) {
                let raw: Vec<u8> = self.buffer.drain(..=end).collect();
                let response = String::from_utf8_lossy(&raw[..end]).into_owned();
                tracing::trace!("<- {}", response.trim());
                return Ok(Some(response));
            }
            match self.stream.read(&mut chunk) {
                Ok(0) => return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "adapter closed the connection")),
                Ok(n) => self.buffer.extend_from_slice(&chunk[..n]),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) => return Ok(None),
                Err(e) => return Err(e),
            }
        }
    }

    /// Collect complete answers until the in-flight request is settled or
    /// the stream runs dry.
    fn poll(&mut self) {
        while let Some((pid, sent_at)) = self.in_flight {
            match self.read_until_prompt() {
                Ok(Some(response)) => self.accept(pid, &response),
                Ok(None) => {
                    if sent_at.elapsed() >= self.timeout {
                        tracing::warn!("Adapter did not answer {} within {:?}", pid.name(), self.timeout);
                        self.in_flight = None;
                        self.abandoned += 1;
                    }
                    return;
                }
                Err(e) => {
                    self.drop_link(&e);
                    return;
                }
            }
        }
    }

    /// File one complete response while `waiting` is in flight.
    fn accept(
        &mut self,
        waiting: Pid,
        response: &str,
    ) {
        match answered_pid(response) {
            Some(pid) if pid == waiting => {
                self.fresh[slot(pid)] = parse_response(pid, response);
                self.in_flight = None;
                // The adapter answers in order, so nothing older is still coming
                self.abandoned = 0;
            }
            Some(pid) => {
                tracing::debug!("Late {} answer while waiting for {}", pid.name(), waiting.name());
                self.fresh[slot(pid)] = parse_response(pid, response);
                self.abandoned = self.abandoned.saturating_sub(1);
            }
            None if self.abandoned > 0 => {
                tracing::debug!("Discarding reply to an abandoned request: '{}'", response.trim());
                self.abandoned -= 1;
            }
            None => {
                tracing::debug!("No {} reading: '{}'", waiting.name(), response.trim());
                self.fresh[slot(waiting)] = None;
                self.in_flight = None;
            }
        }
    }

    /// Send the next PID in round-robin order.
    fn request_next(&mut self) {
        let pid = Pid::ALL[self.next_pid];
        let command = format!("01{:02X}", pid.code());
        match self.send(&command) {
            Ok(()) => {
                self.in_flight = Some((pid, Instant::now()));
                self.next_pid = (self.next_pid + 1) % Pid::ALL.len();
            }
            // Socket buffer full; retry on the next frame
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => {}
            Err(e) => self.drop_link(&e),
        }
    }

    fn drop_link(
        &mut self,
        error: &io::Error,
    ) {
        tracing::warn!("Lost adapter link ({}): {error}", self.description);
        self.connected = false;
        self.in_flight = None;
        self.abandoned = 0;
        self.fresh = [None; Pid::ALL.len()];
    }
}

impl<S: Read + Write> VehicleConnection for LiveConnection<S> {
    fn is_connected(&self) -> bool { self.connected }

    fn query(
        &mut self,
        pid: Pid,
    ) -> Option<f32> {
        if !self.connected {
            return None;
        }
        self.poll();
        if self.connected && self.in_flight.is_none() {
            self.request_next();
        }
        self.fresh[slot(pid)].take()
    }

    fn describe(&self) -> &str { &self.description }
}

// =============================================================================
// Response Parsing
// =============================================================================

#[inline]
const fn slot(pid: Pid) -> usize {
    match pid {
        Pid::EngineRpm => 0,
        Pid::VehicleSpeed => 1,
    }
}

/// Response lines with whitespace removed, uppercased, empty lines skipped.
fn response_lines(response: &str) -> impl Iterator<Item = String> + '_ {
    response
        .split(['\r', '\n'])
        .map(|line| line.chars().filter(|c| !c.is_whitespace()).collect::<String>().to_ascii_uppercase())
        .filter(|line| !line.is_empty())
}

/// PID named by the first `41xx` line of a response.
///
/// Adapter status messages carry no PID.
fn answered_pid(response: &str) -> Option<Pid> {
    let upper = response.to_ascii_uppercase();
    if NO_DATA_MARKERS.iter().any(|marker| upper.contains(marker)) {
        return None;
    }
    response_lines(response).find_map(|line| {
        line.strip_prefix("41")
            .and_then(|rest| rest.get(..2))
            .and_then(|code| u8::from_str_radix(code, 16).ok())
            .and_then(Pid::from_code)
    })
}

/// Extract the reading for `pid` from a raw adapter response.
///
/// Accepts answers with or without spaces. Adapter status messages and
/// malformed hex yield `None`.
fn parse_response(
    pid: Pid,
    response: &str,
) -> Option<f32> {
    let upper = response.to_ascii_uppercase();
    if NO_DATA_MARKERS.iter().any(|marker| upper.contains(marker)) {
        return None;
    }
    let header = format!("41{:02X}", pid.code());
    response_lines(response)
        .find_map(|line| line.strip_prefix(&header).map(str::to_string))
        .and_then(|data| decode_hex(&data))
        .and_then(|bytes| pid.decode(&bytes))
}

/// Decode an even-length hex string.
fn decode_hex(hex: &str) -> Option<Vec<u8>> {
    if hex.len() % 2 != 0 {
        return None;
    }
    (0..hex.len())
        .step_by(2)
        .map(|i| hex.get(i..i + 2).and_then(|byte| u8::from_str_radix(byte, 16).ok()))
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================
