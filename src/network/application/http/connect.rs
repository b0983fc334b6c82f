//! Resolve, open, TLS-configure and connect a socket for one attempt.

use super::error::Error;
use super::request::RequestTarget;
use crate::network::error::Error as NetworkError;
use crate::network::{Close, PeerVerify, SecTag, Security, Socket, Stack, TlsOption, Write};

/// Open a connected socket for `target`.
///
/// Plain targets get a TCP socket; TLS targets get a TLS socket configured
/// for required peer verification, the target's credential set and SNI
/// hostname. Any failure closes the socket and ends the attempt.
pub fn establish<S: Stack>(stack: &mut S, target: &RequestTarget<'_>) -> Result<S::Socket, Error> {
    let address = stack
        .resolve(&target.hostname, target.port)
        .map_err(|e| {
            let err: NetworkError = e.into();
            error!("Resolving {} failed: {:?}", target.hostname.as_str(), err);
            Error::Transport(err)
        })?;

    let mut socket = stack.open(&address, target.security).map_err(|e| {
        let err: NetworkError = e.into();
        error!("Failed to open socket: {:?}", err);
        Error::Transport(err)
    })?;

    if let Security::Tls(tag) = target.security {
        if let Err(err) = configure_tls(&mut socket, &target.hostname, tag) {
            close(socket);
            return Err(Error::Transport(err));
        }
    }

    debug!(
        "Connecting to {}:{}",
        target.hostname.as_str(),
        target.port
    );
    if let Err(err) = socket.connect(&address) {
        error!("connect() failed: {:?}", err);
        close(socket);
        return Err(Error::Transport(err));
    }
    Ok(socket)
}

fn configure_tls<K: Socket>(
    socket: &mut K,
    hostname: &str,
    tag: SecTag,
) -> Result<(), NetworkError> {
    let tags = [tag];

    socket
        .set_tls_option(TlsOption::PeerVerify(PeerVerify::Required))
        .inspect_err(|e| error!("Failed to setup peer verification: {:?}", e))?;
    socket
        .set_tls_option(TlsOption::SecTagList(&tags))
        .inspect_err(|e| error!("Failed to setup TLS sec tag: {:?}", e))?;
    socket
        .set_tls_option(TlsOption::Hostname(hostname))
        .inspect_err(|e| error!("Failed to setup TLS hostname: {:?}", e))?;
    Ok(())
}

/// Write all of `data`, then flush.
pub fn send_all<W: Write>(conn: &mut W, data: &[u8]) -> Result<(), Error> {
    let mut offset = 0;
    while offset < data.len() {
        match conn.write(&data[offset..]) {
            Ok(0) => {
                error!("send() made no progress after {} bytes", offset);
                return Err(Error::Transport(NetworkError::WriteError));
            }
            Ok(n) => offset += n,
            Err(e) => {
                let err: NetworkError = e.into();
                error!("send() failed: {:?}", err);
                return Err(Error::Transport(err));
            }
        }
    }
    conn.flush().map_err(|e| Error::Transport(e.into()))?;
    info!("Sent {} bytes", offset);
    Ok(())
}

/// Close `conn`, logging rather than propagating a failure.
pub fn close<C: Close>(conn: C) {
    if let Err(e) = conn.close() {
        let err: NetworkError = e.into();
        error!("close() failed: {:?}", err);
    }
}
