use crate::error::ResolverError;
use std::fmt::Display;

/// The redirect statuses the resolver may answer with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RedirectStatus {
    #[default]
    MovedPermanently,
    Found,
    TemporaryRedirect,
}

impl RedirectStatus {
    pub fn code(&self) -> u16 {
        match self {
            RedirectStatus::MovedPermanently => 301,
            RedirectStatus::Found => 302,
            RedirectStatus::TemporaryRedirect => 307,
        }
    }

    /// The reason phrase sent alongside the code.
    pub fn description(&self) -> &'static str {
        match self {
            RedirectStatus::MovedPermanently => "Moved Permanently",
            RedirectStatus::Found => "Found",
            RedirectStatus::TemporaryRedirect => "Temporary Redirect",
        }
    }
}

impl TryFrom<u16> for RedirectStatus {
    type Error = ResolverError;

    fn try_from(code: u16) -> Result<Self, Self::Error> {
        match code {
            301 => Ok(RedirectStatus::MovedPermanently),
            302 => Ok(RedirectStatus::Found),
            307 => Ok(RedirectStatus::TemporaryRedirect),
            other => Err(ResolverError::UnsupportedStatus(other)),
        }
    }
}

impl Display for RedirectStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.code(), self.description())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn supported_codes() {
        for code in [301, 302, 307] {
            assert_eq!(RedirectStatus::try_from(code).unwrap().code(), code);
        }
        assert_eq!(RedirectStatus::default().code(), 301);
        assert_eq!(RedirectStatus::Found.to_string(), "302 Found");
    }

    #[test]
    fn other_codes_are_rejected() {
        for code in [200, 303, 308, 404] {
            assert!(matches!(
                RedirectStatus::try_from(code),
                Err(ResolverError::UnsupportedStatus(c)) if c == code
            ));
        }
    }
}
