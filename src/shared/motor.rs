// This is free and unencumbered software released into the public domain.

use crate::shared::{
    CameraConfig, CameraError, ParameterEntry, Transport, check_response,
    params::{require_write, with_query_pairs},
};
use derive_more::Display;
use std::collections::HashMap;
use url::Url;

pub const REMOTE_FOCUS_PREFIX: &str = "remote_focus_";

#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Hash)]
pub enum MotorFunction {
    #[display("focus")]
    Focus,
    #[display("zoom")]
    Zoom,
}

impl MotorFunction {
    pub fn status_key(self, status: &str) -> String {
        format!("{REMOTE_FOCUS_PREFIX}{self}_{status}")
    }
}

/// One `getstatus` snapshot of a motor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MotorStatus {
    pub motor: i64,
    pub motor_max: i64,
    pub motor_start: i64,
    pub motor_end: i64,
    pub enable: bool,
}

impl MotorStatus {
    fn from_entries(
        function: MotorFunction,
        entries: impl IntoIterator<Item = ParameterEntry>,
    ) -> Result<Self, CameraError> {
        let values: HashMap<String, String> = entries
            .into_iter()
            .map(|entry| (entry.key, entry.value))
            .collect();

        let number = |status: &str| -> Result<i64, CameraError> {
            let key = function.status_key(status);
            let value = values
                .get(&key)
                .ok_or_else(|| CameraError::key_not_found(&key))?;
            value
                .trim()
                .parse()
                .map_err(|_| CameraError::invalid_value(&key, value))
        };

        Ok(Self {
            motor: number("motor")?,
            motor_max: number("motor_max")?,
            motor_start: number("motor_start")?,
            motor_end: number("motor_end")?,
            enable: number("enable")? == 1,
        })
    }

    pub fn contains(&self, position: i64) -> bool {
        (self.motor_start..=self.motor_end).contains(&position)
    }
}

/// A focus or zoom motor driven through `remotefocus.cgi`.
///
/// The status is fetched once, when the view is created.
pub struct MotorView<'a> {
    config: &'a CameraConfig,
    endpoint: &'a Url,
    transport: &'a dyn Transport,
    function: MotorFunction,
    status: MotorStatus,
}

impl<'a> MotorView<'a> {
    pub fn fetch(
        config: &'a CameraConfig,
        endpoint: &'a Url,
        transport: &'a dyn Transport,
        function: MotorFunction,
    ) -> Result<Self, CameraError> {
        let url = with_query_pairs(endpoint, [("function", "getstatus".to_string())]);
        let text = check_response(&transport.get(&url)?)?;
        let entries = text.lines().filter_map(ParameterEntry::parse_lenient);
        let status = MotorStatus::from_entries(function, entries)?;

        Ok(Self {
            config,
            endpoint,
            transport,
            function,
            status,
        })
    }

    pub fn function(&self) -> MotorFunction {
        self.function
    }

    pub fn status(&self) -> &MotorStatus {
        &self.status
    }

    pub fn position(&self) -> i64 {
        self.status.motor
    }

    pub fn is_enabled(&self) -> bool {
        self.status.enable
    }

    /// Moves the motor to `position`. Out-of-range positions and missing
    /// write permission fail without touching the network.
    pub fn set_position(&self, position: i64) -> Result<Vec<ParameterEntry>, CameraError> {
        if !self.status.contains(position) {
            return Err(CameraError::OutOfRange {
                value: position,
                start: self.status.motor_start,
                end: self.status.motor_end,
            });
        }
        require_write(self.config)?;

        let url = with_query_pairs(
            self.endpoint,
            [
                ("function", self.function.to_string()),
                ("position", position.to_string()),
                ("direction", "direct".to_string()),
            ],
        );
        let text = check_response(&self.transport.get(&url)?)?;
        Ok(text.lines().filter_map(ParameterEntry::parse_lenient).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::testing::MockTransport;

    const FOCUS_STATUS: &str = "remote_focus_focus_motor=120\n\
        remote_focus_focus_motor_max=1000\n\
        remote_focus_focus_motor_start=10\n\
        remote_focus_focus_motor_end=900\n\
        remote_focus_focus_enable=1\n\
        remote_focus_zoom_motor='5'\n";

    fn config(level: &str) -> CameraConfig {
        CameraConfig::new("fake_ip.local", level)
            .unwrap()
            .with_basic_auth("test_user", "t3st_p@55w0rdZ")
    }

    #[test]
    fn fetches_status_in_one_request() {
        let config = config("admin");
        let endpoints = config.endpoints().unwrap();
        let mock = MockTransport::new().ok(FOCUS_STATUS);

        let focus =
            MotorView::fetch(&config, &endpoints.remote_focus, &mock, MotorFunction::Focus).unwrap();
        assert_eq!(
            *focus.status(),
            MotorStatus {
                motor: 120,
                motor_max: 1000,
                motor_start: 10,
                motor_end: 900,
                enable: true,
            }
        );
        assert_eq!(focus.position(), 120);
        assert_eq!(mock.request_count(), 1);
        assert_eq!(
            mock.requests()[0].url,
            "http://fake_ip.local/cgi-bin/admin/remotefocus.cgi?function=getstatus"
        );
    }

    #[test]
    fn out_of_range_position_sends_nothing() {
        let config = config("admin");
        let endpoints = config.endpoints().unwrap();
        let mock = MockTransport::new().ok(FOCUS_STATUS);
        let focus =
            MotorView::fetch(&config, &endpoints.remote_focus, &mock, MotorFunction::Focus).unwrap();

        for position in [9, 901, -1] {
            let err = focus.set_position(position).unwrap_err();
            assert!(matches!(err, CameraError::OutOfRange { start: 10, end: 900, .. }));
        }
        assert_eq!(mock.request_count(), 1);
    }

    #[test]
    fn in_range_position_sends_move_command() {
        let config = config("operator");
        let endpoints = config.endpoints().unwrap();
        let mock = MockTransport::new()
            .ok(FOCUS_STATUS)
            .ok("remote_focus_focus_motor='900'\n");
        let focus =
            MotorView::fetch(&config, &endpoints.remote_focus, &mock, MotorFunction::Focus).unwrap();

        let echoed = focus.set_position(900).unwrap();
        assert_eq!(echoed[0].value, "900");
        assert_eq!(
            mock.requests()[1].url,
            "http://fake_ip.local/cgi-bin/operator/remotefocus.cgi?function=focus&position=900&direction=direct"
        );
    }

    #[test]
    fn unquoted_move_reply_keeps_full_value() {
        let config = config("operator");
        let endpoints = config.endpoints().unwrap();
        let mock = MockTransport::new()
            .ok(FOCUS_STATUS)
            .ok("remote_focus_focus_motor=900\n");
        let focus =
            MotorView::fetch(&config, &endpoints.remote_focus, &mock, MotorFunction::Focus).unwrap();

        let echoed = focus.set_position(900).unwrap();
        assert_eq!(echoed.len(), 1);
        assert_eq!(echoed[0].key, "remote_focus_focus_motor");
        assert_eq!(echoed[0].value, "900");
    }

    #[test]
    fn move_requires_operator() {
        let config = config("viewer");
        let endpoints = config.endpoints().unwrap();
        let mock = MockTransport::new().ok(FOCUS_STATUS);
        let focus =
            MotorView::fetch(&config, &endpoints.remote_focus, &mock, MotorFunction::Focus).unwrap();

        assert!(matches!(
            focus.set_position(100),
            Err(CameraError::PermissionDenied { .. })
        ));
        assert_eq!(mock.request_count(), 1);
    }

    #[test]
    fn incomplete_status_is_key_not_found() {
        let config = config("admin");
        let endpoints = config.endpoints().unwrap();
        let mock = MockTransport::new().ok(FOCUS_STATUS);

        let err = MotorView::fetch(&config, &endpoints.remote_focus, &mock, MotorFunction::Zoom)
            .err()
            .unwrap();
        assert!(matches!(err, CameraError::KeyNotFound(ref key) if key == "remote_focus_zoom_motor_max"));
    }
}
