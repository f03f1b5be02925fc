// This is free and unencumbered software released into the public domain.

//! CLI helpers (connection options, error reporting, verbosity handling).
//!
//! This module must compile even when the crate feature `cli` is disabled,
//! because the library is built in non-CLI configurations.

#[cfg(feature = "cli")]
use crate::shared::{CameraConfig, CameraError};

#[cfg(feature = "cli")]
use asimov_module::SysexitsError::{self, *};

#[cfg(feature = "cli")]
use clientele::StandardOptions;

/// How to reach and authenticate against one camera.
#[cfg(feature = "cli")]
#[derive(Clone, Debug, clap::Args)]
pub struct ConnectionOptions {
    /// Camera host name or IP address
    #[arg(value_name = "HOST", env = "VIVOTEK_HOST")]
    pub host: String,

    /// TCP port (default: 443 with --ssl, else 80)
    #[arg(long)]
    pub port: Option<u16>,

    /// Force HTTPS
    #[arg(long, conflicts_with = "no_ssl")]
    pub ssl: bool,

    /// Force plain HTTP, even on port 443
    #[arg(long)]
    pub no_ssl: bool,

    /// Skip TLS certificate verification
    #[arg(long)]
    pub insecure: bool,

    #[arg(long, env = "VIVOTEK_USER")]
    pub user: Option<String>,

    #[arg(long, env = "VIVOTEK_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Use HTTP Digest instead of Basic authentication
    #[arg(long)]
    pub digest: bool,

    /// Security level: anonymous, viewer, operator or admin
    #[arg(long, value_name = "LEVEL", default_value = "viewer")]
    pub level: String,
}

#[cfg(feature = "cli")]
impl ConnectionOptions {
    pub fn to_config(&self) -> Result<CameraConfig, CameraError> {
        let mut config = CameraConfig::new(&self.host, &self.level)?.with_verify_tls(!self.insecure);

        if let Some(port) = self.port {
            config = config.with_port(port);
        }
        if self.ssl {
            config = config.with_ssl(true);
        } else if self.no_ssl {
            config = config.with_ssl(false);
        }

        if let Some(user) = &self.user {
            let password = self.password.clone().unwrap_or_default();
            config = if self.digest {
                config.with_digest_auth(user, password)
            } else {
                config.with_basic_auth(user, password)
            };
        }
        Ok(config)
    }
}

#[cfg(feature = "cli")]
pub fn handle_error(err: &CameraError, flags: &StandardOptions) -> SysexitsError {
    #[cfg(feature = "tracing")]
    {
        use asimov_module::tracing::{debug, error};

        error!(target: "asimov_vivotek_module", %err, "camera command failed");

        if flags.debug || flags.verbose >= 2 {
            debug!(target: "asimov_vivotek_module", ?err, "detailed error");
        }
    }

    report_error(err, flags);
    map_error_to_sysexit(err)
}

#[cfg(feature = "cli")]
pub fn info_user(flags: &StandardOptions, msg: &str) {
    if flags.debug || flags.verbose >= 1 {
        eprintln!("INFO: {msg}");
    }

    #[cfg(feature = "tracing")]
    asimov_module::tracing::info!(target: "asimov_vivotek_module", "{msg}");
}

#[cfg(feature = "cli")]
pub fn warn_user_with_error(flags: &StandardOptions, msg: &str, error: &dyn std::error::Error) {
    if flags.debug || flags.verbose >= 2 {
        eprintln!("WARN: {msg}: {error}");
    } else if flags.verbose >= 1 {
        eprintln!("WARN: {msg}");
    }

    #[cfg(feature = "tracing")]
    asimov_module::tracing::warn!(target: "asimov_vivotek_module", error = %error, "{msg}");
}

#[cfg(feature = "cli")]
fn report_error(err: &CameraError, flags: &StandardOptions) {
    use std::error::Error as _;
    use std::io::Write;

    let mut stderr = std::io::stderr();
    let _ = writeln!(stderr, "ERROR: {err}");

    if flags.debug || flags.verbose >= 2 {
        let mut source = err.source();
        while let Some(cause) = source {
            let _ = writeln!(stderr, "  Caused by: {}", cause);
            source = cause.source();
        }
    }
}

#[cfg(feature = "cli")]
pub fn map_error_to_sysexit(err: &CameraError) -> SysexitsError {
    match err {
        CameraError::InvalidConfig(_) => EX_CONFIG,
        CameraError::Unauthorized => EX_NOPERM,
        CameraError::PermissionDenied { .. } => EX_NOPERM,
        CameraError::Protocol(_) => EX_PROTOCOL,
        CameraError::KeyNotFound(_) => EX_DATAERR,
        CameraError::InvalidValue { .. } => EX_DATAERR,
        CameraError::OutOfRange { .. } => EX_USAGE,
        CameraError::Transport { .. } => EX_UNAVAILABLE,
        CameraError::Other(_) => EX_SOFTWARE,
    }
}

// When `cli` is disabled, keep the module linkable without exposing CLI-only types.
#[cfg(not(feature = "cli"))]
#[inline]
pub fn info_user(_msg: &str) {}
