// This is free and unencumbered software released into the public domain.

//! In-memory [`Transport`] replaying canned responses, for unit tests.

use crate::shared::{CameraError, HttpResponse, Transport};
use std::{cell::RefCell, collections::VecDeque};
use url::Url;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Request {
    pub method: &'static str,
    pub url: String,
    pub form: Vec<(String, String)>,
}

#[derive(Default)]
pub struct MockTransport {
    responses: RefCell<VecDeque<HttpResponse>>,
    requests: RefCell<Vec<Request>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, status: u16, body: &str) -> Self {
        self.responses
            .borrow_mut()
            .push_back(HttpResponse::new(status, body.to_string()));
        self
    }

    pub fn ok(self, body: &str) -> Self {
        self.reply(200, body)
    }

    pub fn requests(&self) -> Vec<Request> {
        self.requests.borrow().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.borrow().len()
    }

    fn record(&self, method: &'static str, url: &Url, form: &[(&str, &str)]) -> Result<HttpResponse, CameraError> {
        self.requests.borrow_mut().push(Request {
            method,
            url: url.to_string(),
            form: form
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        });
        self.responses
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| CameraError::other(format!("unexpected {method} {url}")))
    }
}

impl Transport for MockTransport {
    fn get(&self, url: &Url) -> Result<HttpResponse, CameraError> {
        self.record("GET", url, &[])
    }

    fn post_form(&self, url: &Url, form: &[(&str, &str)]) -> Result<HttpResponse, CameraError> {
        self.record("POST", url, form)
    }
}
