// This is free and unencumbered software released into the public domain.

use crate::shared::{CameraConfig, CameraError, Credential, DigestChallenge};
use bytes::Bytes;
use reqwest::{
    StatusCode,
    blocking::{Client, RequestBuilder},
    header::{AUTHORIZATION, WWW_AUTHENTICATE},
};
use std::time::Duration;
use url::Url;

/// Every request gets this timeout; there is no per-call override.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Bytes,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status == StatusCode::UNAUTHORIZED.as_u16()
    }
}

/// The HTTP calls the CGI layer needs. One request per call, no retries
/// beyond answering an authentication challenge.
pub trait Transport {
    fn get(&self, url: &Url) -> Result<HttpResponse, CameraError>;

    fn post_form(&self, url: &Url, form: &[(&str, &str)]) -> Result<HttpResponse, CameraError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn get(&self, url: &Url) -> Result<HttpResponse, CameraError> {
        (**self).get(url)
    }

    fn post_form(&self, url: &Url, form: &[(&str, &str)]) -> Result<HttpResponse, CameraError> {
        (**self).post_form(url, form)
    }
}

pub struct HttpTransport {
    client: Client,
    credential: Credential,
}

impl core::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("credential", &self.credential)
            .finish()
    }
}

impl HttpTransport {
    pub fn new(config: &CameraConfig) -> Result<Self, CameraError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .danger_accept_invalid_certs(!config.verify_tls())
            .build()
            .map_err(|e| CameraError::transport("building HTTP client", e))?;

        Ok(Self {
            client,
            credential: config.credential().clone(),
        })
    }

    fn execute(
        &self,
        method: &'static str,
        url: &Url,
        build: impl Fn() -> RequestBuilder,
    ) -> Result<HttpResponse, CameraError> {
        #[cfg(feature = "tracing")]
        asimov_module::tracing::debug!(target: "asimov_vivotek_module", %method, %url, "sending request");

        let request = match &self.credential {
            Credential::Basic { username, password } => build().basic_auth(username, Some(password)),
            _ => build(),
        };
        let response = request
            .send()
            .map_err(|e| CameraError::transport("sending request", e))?;

        if let Credential::Digest { username, password } = &self.credential {
            if response.status() == StatusCode::UNAUTHORIZED {
                let challenge = response
                    .headers()
                    .get_all(WWW_AUTHENTICATE)
                    .iter()
                    .filter_map(|value| value.to_str().ok())
                    .find_map(DigestChallenge::parse);

                if let Some(challenge) = challenge {
                    #[cfg(feature = "tracing")]
                    asimov_module::tracing::warn!(target: "asimov_vivotek_module", %url, realm = %challenge.realm, "answering digest challenge");

                    let uri = match url.query() {
                        Some(query) => format!("{}?{query}", url.path()),
                        None => url.path().to_string(),
                    };
                    let authorization = challenge.authorization(username, password, method, &uri);
                    let response = build()
                        .header(AUTHORIZATION, authorization)
                        .send()
                        .map_err(|e| CameraError::transport("sending request", e))?;
                    return read_response(response);
                }
            }
        }

        read_response(response)
    }
}

fn read_response(response: reqwest::blocking::Response) -> Result<HttpResponse, CameraError> {
    let status = response.status().as_u16();
    let body = response
        .bytes()
        .map_err(|e| CameraError::transport("reading response body", e))?;
    Ok(HttpResponse { status, body })
}

impl Transport for HttpTransport {
    fn get(&self, url: &Url) -> Result<HttpResponse, CameraError> {
        self.execute("GET", url, || self.client.get(url.clone()))
    }

    fn post_form(&self, url: &Url, form: &[(&str, &str)]) -> Result<HttpResponse, CameraError> {
        self.execute("POST", url, || self.client.post(url.clone()).form(form))
    }
}
