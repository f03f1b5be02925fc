// This is free and unencumbered software released into the public domain.

use crate::shared::{
    CameraConfig, CameraError, Endpoints, Entries, ParameterEntry, SecurityLevel, Transport,
    check_response,
};
use core::fmt::Display;
use url::{Url, form_urlencoded};

/// Read/write access to the device's named CGI parameters.
///
/// Every call goes to the device; nothing is cached.
#[derive(Clone, Copy)]
pub struct Parameters<'a> {
    config: &'a CameraConfig,
    endpoints: &'a Endpoints,
    transport: &'a dyn Transport,
}

impl<'a> Parameters<'a> {
    pub fn new(
        config: &'a CameraConfig,
        endpoints: &'a Endpoints,
        transport: &'a dyn Transport,
    ) -> Self {
        Self {
            config,
            endpoints,
            transport,
        }
    }

    pub fn config(&self) -> &'a CameraConfig {
        self.config
    }

    /// Raw response text for `keys`. An empty slice asks for everything
    /// visible at the configured security level.
    pub fn fetch(&self, keys: &[&str]) -> Result<String, CameraError> {
        let mut url = self.endpoints.get_param.clone();
        url.set_query(param_query(keys).as_deref());
        check_response(&self.transport.get(&url)?)
    }

    pub fn get(&self, key: &str) -> Result<String, CameraError> {
        self.items(&[key])?
            .find(|entry| entry.key == key)
            .map(|entry| entry.value)
            .ok_or_else(|| CameraError::key_not_found(key))
    }

    /// Writes one parameter and returns the value the device echoes back.
    pub fn set(&self, key: &str, value: impl Display) -> Result<String, CameraError> {
        require_write(self.config)?;

        let value = value.to_string();
        let response = self
            .transport
            .post_form(&self.endpoints.set_param, &[(key, value.as_str())])?;
        let text = check_response(&response)?;

        let mut first = None;
        for entry in Entries::new(text) {
            if entry.key == key {
                return Ok(entry.value);
            }
            first.get_or_insert(entry);
        }
        first
            .map(|entry| entry.value)
            .ok_or_else(|| CameraError::key_not_found(key))
    }

    pub fn keys(&self) -> Result<impl Iterator<Item = String> + use<>, CameraError> {
        Ok(self.items(&[])?.map(|entry| entry.key))
    }

    /// Batched fetch; entries come back in device response order.
    pub fn items(&self, keys: &[&str]) -> Result<Entries, CameraError> {
        self.fetch(keys).map(Entries::new)
    }

    /// Members of the parameter group `group`, i.e. keys starting with
    /// `{group}_`, fetched with one group query.
    pub fn group(
        &self,
        group: &str,
    ) -> Result<impl Iterator<Item = ParameterEntry> + use<>, CameraError> {
        let prefix = format!("{group}_");
        Ok(self
            .items(&[group])?
            .filter(move |entry| entry.key.starts_with(&prefix)))
    }
}

pub(crate) fn require_write(config: &CameraConfig) -> Result<(), CameraError> {
    let level = config.security_level();
    if level.can_write() {
        Ok(())
    } else {
        Err(CameraError::PermissionDenied {
            level,
            required: SecurityLevel::WRITE,
        })
    }
}

fn param_query(keys: &[&str]) -> Option<String> {
    if keys.is_empty() {
        return None;
    }
    let encoded: Vec<String> = keys
        .iter()
        .map(|key| form_urlencoded::byte_serialize(key.as_bytes()).collect())
        .collect();
    Some(encoded.join("&"))
}

pub(crate) fn with_query_pairs<'k>(
    url: &Url,
    pairs: impl IntoIterator<Item = (&'k str, String)>,
) -> Url {
    let mut url = url.clone();
    url.query_pairs_mut().clear().extend_pairs(pairs);
    url
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::testing::MockTransport;

    fn config(level: &str) -> CameraConfig {
        CameraConfig::new("fake_ip.local", level)
            .unwrap()
            .with_ssl(true)
            .with_basic_auth("test_user", "t3st_p@55w0rdZ")
    }

    #[test]
    fn get_returns_matching_value() {
        let config = config("admin");
        let endpoints = config.endpoints().unwrap();
        let mock = MockTransport::new().ok("system_info_modelname='IB8369A'\r\n");
        let params = Parameters::new(&config, &endpoints, &mock);

        assert_eq!(params.get("system_info_modelname").unwrap(), "IB8369A");
        assert_eq!(
            mock.requests()[0].url,
            "https://fake_ip.local/cgi-bin/admin/getparam.cgi?system_info_modelname"
        );
    }

    #[test]
    fn absent_key_is_key_not_found() {
        let config = config("admin");
        let endpoints = config.endpoints().unwrap();
        let mock = MockTransport::new().ok("system_date='2024/01/02'\n");
        let params = Parameters::new(&config, &endpoints, &mock);

        let err = params.get("bogus_param").unwrap_err();
        assert!(matches!(err, CameraError::KeyNotFound(ref key) if key == "bogus_param"));
    }

    #[test]
    fn device_error_is_protocol_error() {
        let config = config("admin");
        let endpoints = config.endpoints().unwrap();
        let mock = MockTransport::new().ok("ERROR: bogus_param not found\n");
        let params = Parameters::new(&config, &endpoints, &mock);

        assert!(matches!(params.get("bogus_param"), Err(CameraError::Protocol(_))));
    }

    #[test]
    fn unauthorized_get_is_auth_error() {
        let config = config("admin");
        let endpoints = config.endpoints().unwrap();
        let mock = MockTransport::new().reply(401, "Unauthorized");
        let params = Parameters::new(&config, &endpoints, &mock);

        assert!(matches!(
            params.get("capability_api_httpversion"),
            Err(CameraError::Unauthorized)
        ));
    }

    #[test]
    fn set_posts_form_and_returns_echo() {
        let config = config("admin");
        let endpoints = config.endpoints().unwrap();
        let mock = MockTransport::new().ok("event_i0_enable='1'\n");
        let params = Parameters::new(&config, &endpoints, &mock);

        assert_eq!(params.set("event_i0_enable", 1).unwrap(), "1");
        let requests = mock.requests();
        let request = &requests[0];
        assert_eq!(request.method, "POST");
        assert_eq!(request.url, "https://fake_ip.local/cgi-bin/admin/setparam.cgi");
        assert_eq!(request.form, vec![("event_i0_enable".to_string(), "1".to_string())]);
    }

    #[test]
    fn set_below_operator_sends_nothing() {
        for level in ["anonymous", "viewer"] {
            let config = config(level);
            let endpoints = config.endpoints().unwrap();
            let mock = MockTransport::new();
            let params = Parameters::new(&config, &endpoints, &mock);

            let err = params.set("event_i0_enable", 1).unwrap_err();
            assert!(matches!(
                err,
                CameraError::PermissionDenied {
                    required: SecurityLevel::Operator,
                    ..
                }
            ));
            assert_eq!(mock.request_count(), 0);
        }
    }

    #[test]
    fn set_as_operator_surfaces_device_error() {
        let config = config("operator");
        let endpoints = config.endpoints().unwrap();
        let mock = MockTransport::new().ok("ERROR: Invalid command!\n");
        let params = Parameters::new(&config, &endpoints, &mock);

        assert!(matches!(params.set("event_i0_enable", 1), Err(CameraError::Protocol(_))));
        assert_eq!(mock.request_count(), 1);
    }

    #[test]
    fn keys_enumerate_everything() {
        let config = config("viewer");
        let endpoints = config.endpoints().unwrap();
        let mock = MockTransport::new().ok("a='1'\nb='2'\nc='3'\n");
        let params = Parameters::new(&config, &endpoints, &mock);

        let keys: Vec<_> = params.keys().unwrap().collect();
        assert_eq!(keys, ["a", "b", "c"]);
        assert_eq!(
            mock.requests()[0].url,
            "https://fake_ip.local/cgi-bin/viewer/getparam.cgi"
        );
    }

    #[test]
    fn items_batch_keys_in_one_request() {
        let config = config("viewer");
        let endpoints = config.endpoints().unwrap();
        let mock = MockTransport::new().ok("system_time='10:11:12'\nsystem_date='2024/01/02'\n");
        let params = Parameters::new(&config, &endpoints, &mock);

        let items: Vec<_> = params
            .items(&["system_date", "system_time"])
            .unwrap()
            .map(|e| (e.key, e.value))
            .collect();
        assert_eq!(
            items,
            [
                ("system_time".to_string(), "10:11:12".to_string()),
                ("system_date".to_string(), "2024/01/02".to_string()),
            ]
        );
        assert_eq!(mock.request_count(), 1);
        assert!(mock.requests()[0].url.ends_with("getparam.cgi?system_date&system_time"));
    }

    #[test]
    fn group_filters_on_prefix() {
        let config = config("viewer");
        let endpoints = config.endpoints().unwrap();
        let mock = MockTransport::new().ok("event_i1_enable='1'\nevent_i10_enable='0'\nevent_i1_name='door'\n");
        let params = Parameters::new(&config, &endpoints, &mock);

        let keys: Vec<_> = params.group("event_i1").unwrap().map(|e| e.key).collect();
        assert_eq!(keys, ["event_i1_enable", "event_i1_name"]);
        assert!(mock.requests()[0].url.ends_with("getparam.cgi?event_i1"));
    }

    #[test]
    fn query_keys_are_escaped() {
        assert_eq!(param_query(&[]), None);
        assert_eq!(param_query(&["a b", "c&d"]).as_deref(), Some("a+b&c%26d"));
    }
}
