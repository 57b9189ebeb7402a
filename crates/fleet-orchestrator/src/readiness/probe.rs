//! Loopback TCP port probing.

use std::io;
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

const PROBE_TIMEOUT: Duration = Duration::from_secs(5);
const PROBE_HOST: &str = "localhost";

/// Checks whether something accepts connections on `localhost:port`.
///
/// Every resolved address is tried. A refused connection on any of them means
/// "not yet"; errors that say nothing about the listener propagate.
pub(super) fn port_is_reachable(port: u16) -> io::Result<bool> {
    let mut refused = false;
    let mut last_error = None;
    for address in (PROBE_HOST, port).to_socket_addrs()? {
        match TcpStream::connect_timeout(&address, PROBE_TIMEOUT) {
            Ok(_) => return Ok(true),
            Err(error) if is_refusal(&error) => refused = true,
            Err(error) if is_unusable_address(&error) => {}
            Err(error) => last_error = Some(error),
        }
    }
    match last_error {
        Some(error) if !refused => Err(error),
        _ => Ok(false),
    }
}

/// Nothing is listening yet.
fn is_refusal(error: &io::Error) -> bool {
    error.kind() == io::ErrorKind::ConnectionRefused
}

/// The resolved address cannot be used on this host, e.g. `::1` without IPv6.
fn is_unusable_address(error: &io::Error) -> bool {
    matches!(
        error.kind(),
        io::ErrorKind::AddrNotAvailable | io::ErrorKind::NetworkUnreachable
    )
}
