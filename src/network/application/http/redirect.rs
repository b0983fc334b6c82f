//! `Location` header extraction and target rewriting.
//!
//! The `Location` value is attacker-influenced text that ends up in the next
//! request line and TLS hostname, so anything that is not a plain
//! absolute-path or an http(s) URL with a printable authority is rejected.

use heapless::String;

use super::error::{Capacity, Error, ProtocolError};
use super::request::RequestTarget;
use crate::network::Security;

const LOCATION: &[u8] = b"location:";

/// Value of the first `Location` header in `head`, without surrounding blanks.
///
/// The header name is matched case-insensitively at the start of a line, so
/// `Content-Location` is never picked up.
pub fn location(head: &[u8]) -> Option<&[u8]> {
    head.split(|&b| b == b'\n')
        .skip(1)
        .map(|line| line.strip_suffix(b"\r").unwrap_or(line))
        .find(|line| {
            line.len() >= LOCATION.len() && line[..LOCATION.len()].eq_ignore_ascii_case(LOCATION)
        })
        .map(|line| trim(&line[LOCATION.len()..]))
}

fn trim(value: &[u8]) -> &[u8] {
    let start = value
        .iter()
        .position(|&b| b != b' ' && b != b'\t')
        .unwrap_or(value.len());
    let end = value
        .iter()
        .rposition(|&b| b != b' ' && b != b'\t')
        .map_or(start, |i| i + 1);
    &value[start..end]
}

/// Rewrite `target` to follow the redirect described by `head`.
///
/// On error `target` is left unchanged.
pub fn follow(target: &mut RequestTarget<'_>, head: &[u8]) -> Result<(), Error> {
    let value = location(head).ok_or_else(|| {
        error!("Location header missing");
        ProtocolError::MissingLocation
    })?;
    if value.is_empty() || value.iter().any(|&b| b <= b' ' || b == 0x7f) {
        error!("Bad redirect location");
        return Err(ProtocolError::BadLocation.into());
    }
    let value = core::str::from_utf8(value).map_err(|_| ProtocolError::BadLocation)?;
    info!("Redirect location: {}", value);

    if value.starts_with('/') {
        // Same host, same security.
        target.path = String::try_from(value).map_err(|_| Capacity::Path)?;
        return Ok(());
    }

    let (security, rest) = if let Some(rest) = strip_scheme(value, "https://") {
        match target.security {
            Security::Tls(_) => (target.security, rest),
            Security::Plain => {
                error!("Redirect requires TLS but no security tag is assigned");
                return Err(ProtocolError::RedirectRequiresTls.into());
            }
        }
    } else if let Some(rest) = strip_scheme(value, "http://") {
        if target.security.is_tls() {
            error!("Refusing redirect from TLS to plain http");
            return Err(ProtocolError::InsecureRedirect.into());
        }
        (Security::Plain, rest)
    } else {
        error!("Bad redirect location");
        return Err(ProtocolError::BadLocation.into());
    };

    let (authority, path) = match rest.find('/') {
        Some(i) => rest.split_at(i),
        None => (rest, "/"),
    };
    let (host, port) = split_authority(authority, security)?;

    let hostname = String::try_from(host).map_err(|_| Capacity::Hostname)?;
    let path = String::try_from(path).map_err(|_| Capacity::Path)?;
    target.hostname = hostname;
    target.path = path;
    target.port = port;
    target.security = security;
    Ok(())
}

fn strip_scheme<'v>(value: &'v str, scheme: &str) -> Option<&'v str> {
    let head = value.get(..scheme.len())?;
    head.eq_ignore_ascii_case(scheme)
        .then(|| &value[scheme.len()..])
}

fn split_authority(authority: &str, security: Security) -> Result<(&str, u16), ProtocolError> {
    if authority.contains('@') {
        return Err(ProtocolError::BadLocation);
    }
    let (host, port) = match authority.rsplit_once(':') {
        Some((host, port)) => (
            host,
            port.parse::<u16>()
                .ok()
                .filter(|&p| p != 0)
                .ok_or(ProtocolError::BadLocation)?,
        ),
        None => (authority, security.default_port()),
    };
    if host.is_empty() {
        return Err(ProtocolError::BadLocation);
    }
    Ok((host, port))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::SecTag;

    const TLS: Security = Security::Tls(SecTag(7));

    fn target(security: Security) -> RequestTarget<'static> {
        RequestTarget::new("api.example.com", "/stops/73", security, "application/json").unwrap()
    }

    #[test]
    fn test_location_lookup() {
        let head = b"HTTP/1.1 302 Found\r\nContent-Location: /wrong\r\nLocation:   /b/c \r\nX: y";
        assert_eq!(location(head), Some(&b"/b/c"[..]));

        let head = b"HTTP/1.1 301 Moved\r\nlocation: https://other.test/x";
        assert_eq!(location(head), Some(&b"https://other.test/x"[..]));

        assert_eq!(location(b"HTTP/1.1 302 Found\r\nServer: x"), None);
    }

    #[test]
    fn test_relative_redirect_keeps_host() {
        let mut t = target(TLS);
        follow(&mut t, b"HTTP/1.1 302 Found\r\nLocation: /b/c").unwrap();
        assert_eq!(t.path.as_str(), "/b/c");
        assert_eq!(t.hostname.as_str(), "api.example.com");
        assert_eq!(t.security, TLS);
        assert_eq!(t.port, 443);
    }

    #[test]
    fn test_absolute_https_redirect() {
        let mut t = target(TLS);
        follow(&mut t, b"HTTP/1.1 302 Found\r\nLocation: https://other.test/x").unwrap();
        assert_eq!(t.hostname.as_str(), "other.test");
        assert_eq!(t.path.as_str(), "/x");
        assert_eq!(t.security, TLS);
    }

    #[test]
    fn test_absolute_redirect_with_port_and_no_path() {
        let mut t = target(Security::Plain);
        follow(&mut t, b"HTTP/1.1 307 Temporary\r\nLocation: http://cdn.test:8080").unwrap();
        assert_eq!(t.hostname.as_str(), "cdn.test");
        assert_eq!(t.port, 8080);
        assert_eq!(t.path.as_str(), "/");
    }

    #[test]
    fn test_tls_to_plain_rejected() {
        let mut t = target(TLS);
        let before = t.clone();
        assert_eq!(
            follow(&mut t, b"HTTP/1.1 302 Found\r\nLocation: http://other.test/x"),
            Err(Error::Protocol(ProtocolError::InsecureRedirect))
        );
        assert_eq!(t, before);
    }

    #[test]
    fn test_plain_to_tls_without_tag_rejected() {
        let mut t = target(Security::Plain);
        assert_eq!(
            follow(&mut t, b"HTTP/1.1 302 Found\r\nLocation: https://other.test/x"),
            Err(Error::Protocol(ProtocolError::RedirectRequiresTls))
        );
    }

    #[test]
    fn test_bad_locations() {
        for head in [
            &b"HTTP/1.1 302 Found\r\nLocation: ftp://x/y"[..],
            b"HTTP/1.1 302 Found\r\nLocation: relative/path",
            b"HTTP/1.1 302 Found\r\nLocation: ",
            b"HTTP/1.1 302 Found\r\nLocation: /a b",
            b"HTTP/1.1 302 Found\r\nLocation: http://user@evil.test/",
            b"HTTP/1.1 302 Found\r\nLocation: http://:80/",
            b"HTTP/1.1 302 Found\r\nLocation: http://host:99999/",
        ] {
            let mut t = target(Security::Plain);
            assert_eq!(
                follow(&mut t, head),
                Err(Error::Protocol(ProtocolError::BadLocation))
            );
        }
        let mut t = target(Security::Plain);
        assert_eq!(
            follow(&mut t, b"HTTP/1.1 302 Found\r\nServer: x"),
            Err(Error::Protocol(ProtocolError::MissingLocation))
        );
    }

    #[test]
    fn test_redirect_path_too_long() {
        let mut head = std::vec::Vec::from(&b"HTTP/1.1 302 Found\r\nLocation: /"[..]);
        head.extend(core::iter::repeat_n(b'p', 300));
        let mut t = target(Security::Plain);
        assert_eq!(follow(&mut t, &head), Err(Error::Capacity(Capacity::Path)));
    }
}
