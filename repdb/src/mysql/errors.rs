//! Classifying mysql_async failures into repdb's error taxonomy

use mysql_async::{DriverError, Error as MySqlError, IoError};

use crate::error::Error;

/// Server codes meaning the connection, not the call, is the problem:
/// too many connections, server shutdown, aborted/killed connection,
/// can't connect, server gone away, lost connection.
const TRANSIENT_CODES: &[u16] = &[1040, 1053, 1152, 1927, 2002, 2003, 2006, 2013, 2055];

/// Server codes no amount of retrying fixes: access denied to database,
/// access denied for user, unknown database, host not allowed, auth
/// plugin unsupported.
const FATAL_CODES: &[u16] = &[1044, 1045, 1049, 1130, 1251, 1698];

pub(crate) fn classify_server(code: u16, state: String, message: String) -> Error {
    if TRANSIENT_CODES.contains(&code) {
        Error::Transient {
            code: Some(code),
            message,
            reconnected: false,
        }
    } else if FATAL_CODES.contains(&code) {
        Error::FatalConnection(format!("{} ({}): {}", code, state, message))
    } else {
        Error::Query {
            code,
            state,
            message,
        }
    }
}

impl From<MySqlError> for Error {
    fn from(err: MySqlError) -> Self {
        match err {
            MySqlError::Io(io) => classify_io(io),
            MySqlError::Server(server) => classify_server(server.code, server.state, server.message),
            MySqlError::Driver(DriverError::ConnectionClosed) => {
                Error::transient(None, "connection closed by server")
            }
            MySqlError::Driver(DriverError::PoolDisconnected) => Error::Closed,
            MySqlError::Url(url) => Error::Config(url.to_string()),
            other => Error::Driver(other.to_string()),
        }
    }
}

/// Socket failures are connection-lost class. A failed TLS handshake or
/// rejected certificate will fail the same way on every attempt.
fn classify_io(err: IoError) -> Error {
    match err {
        #[cfg(any(feature = "native-tls", feature = "rustls-tls"))]
        IoError::Tls(tls) => Error::FatalConnection(format!("TLS error: {}", tls)),
        other => Error::transient(None, other.to_string()),
    }
}

/// Errors while opening a pool: anything that is not connection-lost
/// class means the settings themselves are wrong.
pub(crate) fn connect_error(err: MySqlError) -> Error {
    match Error::from(err) {
        err @ (Error::Transient { .. } | Error::FatalConnection(_) | Error::Config(_)) => err,
        other => Error::FatalConnection(other.to_string()),
    }
}
