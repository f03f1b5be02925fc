// This is free and unencumbered software released into the public domain.

use crate::shared::CameraError;
use core::{fmt, str::FromStr};
use derive_more::Display;
use url::Url;

pub const CGI_BASE_PATH: &str = "cgi-bin";

/// Ranked access tier of the CGI interface.
///
/// The discriminants are the device's own ranks, so the derived ordering is
/// the access ordering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SecurityLevel {
    Anonymous = 0,
    Viewer = 1,
    Operator = 4,
    Admin = 6,
}

impl SecurityLevel {
    pub const ALL: [SecurityLevel; 4] = [
        SecurityLevel::Anonymous,
        SecurityLevel::Viewer,
        SecurityLevel::Operator,
        SecurityLevel::Admin,
    ];

    /// Minimum level for anything that changes device state.
    pub const WRITE: SecurityLevel = SecurityLevel::Operator;

    pub fn rank(self) -> u8 {
        self as u8
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SecurityLevel::Anonymous => "anonymous",
            SecurityLevel::Viewer => "viewer",
            SecurityLevel::Operator => "operator",
            SecurityLevel::Admin => "admin",
        }
    }

    pub fn can_write(self) -> bool {
        self >= Self::WRITE
    }
}

impl fmt::Display for SecurityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SecurityLevel {
    type Err = CameraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|level| level.as_str() == s)
            .ok_or_else(|| CameraError::invalid_config(format!("invalid security level: {s}")))
    }
}

#[derive(Clone, Copy, Debug, Display, PartialEq, Eq)]
pub enum Scheme {
    #[display("http")]
    Http,
    #[display("https")]
    Https,
}

impl Scheme {
    pub fn default_port(self) -> u16 {
        match self {
            Scheme::Http => 80,
            Scheme::Https => 443,
        }
    }
}

#[derive(Clone, Default, PartialEq, Eq)]
pub enum Credential {
    #[default]
    None,
    Basic {
        username: String,
        password: String,
    },
    Digest {
        username: String,
        password: String,
    },
}

static NO_CREDENTIAL: Credential = Credential::None;

impl Credential {
    pub fn username(&self) -> Option<&str> {
        match self {
            Credential::None => None,
            Credential::Basic { username, .. } | Credential::Digest { username, .. } => {
                Some(username)
            },
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credential::None => f.write_str("None"),
            Credential::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
            Credential::Digest { username, .. } => f
                .debug_struct("Digest")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
        }
    }
}

/// Connection parameters for one camera.
///
/// Built once with [`CameraConfig::new`] and the consuming `with_*` methods;
/// nothing mutates it afterwards.
#[derive(Clone, Debug)]
pub struct CameraConfig {
    host: String,
    port: Option<u16>,
    ssl: Option<bool>,
    verify_tls: bool,
    requested_level: SecurityLevel,
    credential: Credential,
}

impl CameraConfig {
    pub fn new(host: impl Into<String>, security_level: &str) -> Result<Self, CameraError> {
        let host = host.into();
        if host.trim().is_empty() {
            return Err(CameraError::invalid_config("host must not be empty"));
        }
        Ok(Self {
            host,
            port: None,
            ssl: None,
            verify_tls: true,
            requested_level: security_level.parse()?,
            credential: Credential::None,
        })
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_ssl(mut self, ssl: bool) -> Self {
        self.ssl = Some(ssl);
        self
    }

    pub fn with_verify_tls(mut self, verify: bool) -> Self {
        self.verify_tls = verify;
        self
    }

    pub fn with_credential(mut self, credential: Credential) -> Self {
        self.credential = credential;
        self
    }

    pub fn with_basic_auth(self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.with_credential(Credential::Basic {
            username: username.into(),
            password: password.into(),
        })
    }

    pub fn with_digest_auth(self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.with_credential(Credential::Digest {
            username: username.into(),
            password: password.into(),
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port.unwrap_or(match self.ssl {
            Some(true) => Scheme::Https.default_port(),
            _ => Scheme::Http.default_port(),
        })
    }

    pub fn scheme(&self) -> Scheme {
        match self.ssl {
            Some(true) => Scheme::Https,
            Some(false) => Scheme::Http,
            None if self.port() == Scheme::Https.default_port() => Scheme::Https,
            None => Scheme::Http,
        }
    }

    /// Certificate verification never applies to plain http.
    pub fn verify_tls(&self) -> bool {
        self.scheme() == Scheme::Https && self.verify_tls
    }

    /// The level actually used in request paths. Without a usable credential
    /// every request goes out as `anonymous`.
    pub fn security_level(&self) -> SecurityLevel {
        match self.credential.username() {
            Some(name) if !name.is_empty() => self.requested_level,
            _ => SecurityLevel::Anonymous,
        }
    }

    /// The credential to present, or [`Credential::None`] when running anonymously.
    pub fn credential(&self) -> &Credential {
        if self.security_level() == SecurityLevel::Anonymous {
            &NO_CREDENTIAL
        } else {
            &self.credential
        }
    }

    pub fn endpoints(&self) -> Result<Endpoints, CameraError> {
        let base = self.base_url()?;
        let level = self.security_level().as_str();
        Ok(Endpoints {
            get_param: cgi_url(&base, level, "getparam.cgi")?,
            set_param: cgi_url(&base, level, "setparam.cgi")?,
            still_image: cgi_url(&base, SecurityLevel::Viewer.as_str(), "video.jpg")?,
            remote_focus: cgi_url(&base, level, "remotefocus.cgi")?,
        })
    }

    fn base_url(&self) -> Result<Url, CameraError> {
        let mut url = Url::parse(&format!("{}://{}", self.scheme(), self.host))
            .map_err(|e| CameraError::invalid_config(format!("invalid host {:?}: {e}", self.host)))?;
        // `Url` drops the port again when it is the scheme default.
        url.set_port(Some(self.port()))
            .map_err(|_| CameraError::invalid_config(format!("invalid host {:?}", self.host)))?;
        Ok(url)
    }
}

fn cgi_url(base: &Url, level: &str, script: &str) -> Result<Url, CameraError> {
    let mut url = base.clone();
    url.set_query(None);
    url.path_segments_mut()
        .map_err(|_| CameraError::invalid_config(format!("cannot build URL from {base}")))?
        .clear()
        .extend([CGI_BASE_PATH, level, script]);
    Ok(url)
}

/// The CGI endpoints of one camera, resolved from a [`CameraConfig`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoints {
    pub get_param: Url,
    pub set_param: Url,
    pub still_image: Url,
    pub remote_focus: Url,
}
