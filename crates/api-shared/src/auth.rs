//! Authorization header handling shared by every transport.

/// Scheme prefix expected in the `Authorization` header.
pub const BEARER_SCHEME: &str = "Bearer";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthHeaderError {
    #[error("Missing Authorization header")]
    Missing,
    #[error("Authorization header must use the Bearer scheme")]
    WrongScheme,
}

/// Extracts the token from an `Authorization: Bearer <token>` header value.
///
/// The scheme is matched case-insensitively; surrounding whitespace is ignored.
pub fn bearer_token(header_value: Option<&str>) -> Result<&str, AuthHeaderError> {
    let value = header_value.ok_or(AuthHeaderError::Missing)?.trim();
    let (scheme, token) = value
        .split_once(' ')
        .ok_or(AuthHeaderError::WrongScheme)?;

    if !scheme.eq_ignore_ascii_case(BEARER_SCHEME) {
        return Err(AuthHeaderError::WrongScheme);
    }

    Ok(token.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_token() {
        assert_eq!(bearer_token(Some("Bearer abc.def")), Ok("abc.def"));
        assert_eq!(bearer_token(Some("bearer   abc ")), Ok("abc"));
    }

    #[test]
    fn rejects_bad_headers() {
        assert_eq!(bearer_token(None), Err(AuthHeaderError::Missing));
        assert_eq!(
            bearer_token(Some("Basic dXNlcjpwYXNz")),
            Err(AuthHeaderError::WrongScheme)
        );
        assert_eq!(bearer_token(Some("Bearer")), Err(AuthHeaderError::WrongScheme));
        assert_eq!(bearer_token(Some("Bearer   ")), Err(AuthHeaderError::WrongScheme));
    }
}
