// This is free and unencumbered software released into the public domain.

//! HTTP Digest access authentication (RFC 7616, MD5 with `qop=auth`).

use rand::Rng;

/// A parsed `WWW-Authenticate: Digest ...` challenge.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DigestChallenge {
    pub realm: String,
    pub nonce: String,
    pub opaque: Option<String>,
    pub algorithm: Option<String>,
    pub qop: Vec<String>,
}

impl DigestChallenge {
    /// Parses a header value. Returns `None` for non-digest schemes, when
    /// the nonce is missing, or when the algorithm is anything but `MD5`.
    pub fn parse(header: &str) -> Option<Self> {
        let header = header.trim();
        let (scheme, params) = header.split_once(char::is_whitespace)?;
        if !scheme.eq_ignore_ascii_case("digest") {
            return None;
        }

        let mut challenge = DigestChallenge::default();
        let mut nonce = None;
        for (name, value) in split_params(params) {
            match name.to_ascii_lowercase().as_str() {
                "realm" => challenge.realm = value,
                "nonce" => nonce = Some(value),
                "opaque" => challenge.opaque = Some(value),
                "algorithm" => challenge.algorithm = Some(value),
                "qop" => {
                    challenge.qop = value
                        .split(',')
                        .map(|q| q.trim().to_string())
                        .filter(|q| !q.is_empty())
                        .collect()
                },
                _ => {},
            }
        }
        challenge.nonce = nonce?;

        if let Some(algorithm) = &challenge.algorithm {
            if !algorithm.eq_ignore_ascii_case("MD5") {
                #[cfg(feature = "tracing")]
                asimov_module::tracing::warn!(target: "asimov_vivotek_module", %algorithm, "unsupported digest algorithm");
                return None;
            }
        }
        Some(challenge)
    }

    fn supports_auth_qop(&self) -> bool {
        self.qop.iter().any(|q| q.eq_ignore_ascii_case("auth"))
    }

    /// Builds the `Authorization` header value for one request.
    pub fn authorization(&self, username: &str, password: &str, method: &str, uri: &str) -> String {
        let cnonce = format!("{:016x}", rand::thread_rng().r#gen::<u64>());
        self.authorization_with_cnonce(username, password, method, uri, &cnonce, 1)
    }

    pub fn authorization_with_cnonce(
        &self,
        username: &str,
        password: &str,
        method: &str,
        uri: &str,
        cnonce: &str,
        nc: u32,
    ) -> String {
        let ha1 = md5_hex(&format!("{username}:{}:{password}", self.realm));
        let ha2 = md5_hex(&format!("{method}:{uri}"));

        let mut header = format!(
            r#"Digest username="{username}", realm="{}", nonce="{}", uri="{uri}""#,
            self.realm, self.nonce
        );

        if self.supports_auth_qop() {
            let nc = format!("{nc:08x}");
            let response = md5_hex(&format!("{ha1}:{}:{nc}:{cnonce}:auth:{ha2}", self.nonce));
            header.push_str(&format!(
                r#", response="{response}", qop=auth, nc={nc}, cnonce="{cnonce}""#
            ));
        } else {
            let response = md5_hex(&format!("{ha1}:{}:{ha2}", self.nonce));
            header.push_str(&format!(r#", response="{response}""#));
        }

        if let Some(algorithm) = &self.algorithm {
            header.push_str(&format!(", algorithm={algorithm}"));
        }
        if let Some(opaque) = &self.opaque {
            header.push_str(&format!(r#", opaque="{opaque}""#));
        }
        header
    }
}

fn md5_hex(input: &str) -> String {
    format!("{:x}", md5::compute(input.as_bytes()))
}

/// Splits `a="x, y", b=z` into name/value pairs, honoring quotes.
fn split_params(params: &str) -> Vec<(String, String)> {
    let mut out = Vec::new();
    let mut rest = params.trim();

    while !rest.is_empty() {
        let Some(eq) = rest.find('=') else { break };
        let name = rest[..eq].trim().trim_start_matches(',').trim().to_string();
        rest = rest[eq + 1..].trim_start();

        let value;
        if let Some(quoted) = rest.strip_prefix('"') {
            let end = quoted.find('"').unwrap_or(quoted.len());
            value = quoted[..end].to_string();
            rest = quoted.get(end + 1..).unwrap_or("");
        } else {
            let end = rest.find(',').unwrap_or(rest.len());
            value = rest[..end].trim().to_string();
            rest = &rest[end..];
        }
        rest = rest.trim_start().trim_start_matches(',').trim_start();

        if !name.is_empty() {
            out.push((name, value));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_challenge() {
        let challenge = DigestChallenge::parse(
            r#"Digest realm="testrealm@host.com", qop="auth,auth-int", nonce="dcd98b7102dd2f0e8b11d0f600bfb0c093", opaque="5ccc069c403ebaf9f0171e9517f40e41""#,
        )
        .unwrap();
        assert_eq!(challenge.realm, "testrealm@host.com");
        assert_eq!(challenge.nonce, "dcd98b7102dd2f0e8b11d0f600bfb0c093");
        assert_eq!(challenge.qop, vec!["auth", "auth-int"]);
        assert_eq!(
            challenge.opaque.as_deref(),
            Some("5ccc069c403ebaf9f0171e9517f40e41")
        );
        assert_eq!(challenge.algorithm, None);
    }

    #[test]
    fn ignores_other_schemes() {
        assert_eq!(DigestChallenge::parse(r#"Basic realm="cam""#), None);
        assert_eq!(DigestChallenge::parse(r#"Digest realm="cam""#), None);
    }

    #[test]
    fn rejects_non_md5_algorithms() {
        for algorithm in ["MD5-sess", "SHA-256", "SHA-512-256"] {
            let header = format!(r#"Digest realm="cam", nonce="abc", qop="auth", algorithm={algorithm}"#);
            assert_eq!(DigestChallenge::parse(&header), None, "{algorithm}");
        }
        let challenge = DigestChallenge::parse(r#"Digest realm="cam", nonce="abc", algorithm=md5"#).unwrap();
        assert_eq!(challenge.algorithm.as_deref(), Some("md5"));
    }

    #[test]
    fn computes_rfc2617_example_response() {
        let challenge = DigestChallenge::parse(
            r#"Digest realm="testrealm@host.com", qop="auth,auth-int", nonce="dcd98b7102dd2f0e8b11d0f600bfb0c093", opaque="5ccc069c403ebaf9f0171e9517f40e41""#,
        )
        .unwrap();
        let header = challenge.authorization_with_cnonce(
            "Mufasa",
            "Circle Of Life",
            "GET",
            "/dir/index.html",
            "0a4f113b",
            1,
        );
        assert!(header.starts_with(r#"Digest username="Mufasa", realm="testrealm@host.com""#));
        assert!(header.contains(r#"response="6629fae49393a05397450978507c4ef1""#));
        assert!(header.contains("qop=auth, nc=00000001"));
        assert!(header.contains(r#"opaque="5ccc069c403ebaf9f0171e9517f40e41""#));
    }

    #[test]
    fn legacy_challenge_without_qop() {
        let challenge = DigestChallenge::parse(r#"Digest realm="cam", nonce="abc", algorithm=MD5"#).unwrap();
        let header = challenge.authorization("root", "pw", "GET", "/x");
        assert!(!header.contains("qop="));
        assert!(header.ends_with(", algorithm=MD5"));
    }
}
