// This is free and unencumbered software released into the public domain.

use crate::shared::{
    CameraConfig, CameraError, Endpoints, Events, HttpTransport, MotorFunction, MotorView,
    Parameters, Transport, events::parse_flag, params::with_query_pairs,
};
use bytes::Bytes;
use core::fmt::Display;

pub const DEFAULT_SNAPSHOT_QUALITY: u8 = 3;
pub const SNAPSHOT_QUALITY_RANGE: core::ops::RangeInclusive<u8> = 1..=5;

pub const MODEL_NAME_KEY: &str = "system_info_modelname";
pub const SERIAL_NUMBER_KEY: &str = "system_info_serialnumber";

/// A client for one camera's CGI interface.
///
/// Blocking, one request at a time. The only state kept between calls is
/// the model name, fetched on first use. Not meant to be shared across
/// threads.
pub struct Camera<T: Transport = HttpTransport> {
    config: CameraConfig,
    endpoints: Endpoints,
    transport: T,
    model_name: Option<String>,
}

impl core::fmt::Debug for Camera {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Camera")
            .field("config", &self.config)
            .field("model_name", &self.model_name)
            .finish()
    }
}

impl Camera<HttpTransport> {
    pub fn open(config: CameraConfig) -> Result<Self, CameraError> {
        let transport = HttpTransport::new(&config)?;
        Self::with_transport(config, transport)
    }
}

impl<T: Transport> Camera<T> {
    pub fn with_transport(config: CameraConfig, transport: T) -> Result<Self, CameraError> {
        Ok(Self {
            endpoints: config.endpoints()?,
            config,
            transport,
            model_name: None,
        })
    }

    pub fn config(&self) -> &CameraConfig {
        &self.config
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn params(&self) -> Parameters<'_> {
        Parameters::new(&self.config, &self.endpoints, &self.transport)
    }

    pub fn events(&self) -> Events<'_> {
        Events::new(self.params())
    }

    pub fn get_param(&self, key: &str) -> Result<String, CameraError> {
        self.params().get(key)
    }

    pub fn set_param(&self, key: &str, value: impl Display) -> Result<String, CameraError> {
        self.params().set(key, value)
    }

    /// True iff the parameter `key` holds integer 1.
    pub fn event_enabled(&self, key: &str) -> Result<bool, CameraError> {
        let value = self.get_param(key)?;
        parse_flag(key, &value)
    }

    pub fn focus(&self) -> Result<MotorView<'_>, CameraError> {
        self.motor(MotorFunction::Focus)
    }

    pub fn zoom(&self) -> Result<MotorView<'_>, CameraError> {
        self.motor(MotorFunction::Zoom)
    }

    pub fn motor(&self, function: MotorFunction) -> Result<MotorView<'_>, CameraError> {
        MotorView::fetch(
            &self.config,
            &self.endpoints.remote_focus,
            &self.transport,
            function,
        )
    }

    /// Fetches a JPEG still image. `quality` runs from 1 to 5.
    ///
    /// HTTP 401 is `Unauthorized`; any other non-2xx status is a `Protocol`
    /// error. The body of a successful reply is returned unchecked.
    pub fn snapshot(&self, quality: u8) -> Result<Bytes, CameraError> {
        if !SNAPSHOT_QUALITY_RANGE.contains(&quality) {
            return Err(CameraError::OutOfRange {
                value: quality.into(),
                start: (*SNAPSHOT_QUALITY_RANGE.start()).into(),
                end: (*SNAPSHOT_QUALITY_RANGE.end()).into(),
            });
        }
        let url = with_query_pairs(
            &self.endpoints.still_image,
            [("quality", quality.to_string())],
        );
        let response = self.transport.get(&url)?;
        if response.is_unauthorized() {
            return Err(CameraError::Unauthorized);
        }
        if !(200..300).contains(&response.status) {
            return Err(CameraError::protocol(format!(
                "HTTP {}: still image unavailable",
                response.status
            )));
        }
        Ok(response.body)
    }

    /// The device model, fetched once and kept for the life of this client.
    pub fn model_name(&mut self) -> Result<&str, CameraError> {
        let name = match self.model_name.take() {
            Some(name) => name,
            None => self.get_param(MODEL_NAME_KEY)?,
        };
        Ok(self.model_name.insert(name).as_str())
    }

    pub fn get_serial(&self) -> Result<String, CameraError> {
        self.get_param(SERIAL_NUMBER_KEY)
    }

    /// The serial number doubles as the MAC address.
    pub fn get_mac(&self) -> Result<String, CameraError> {
        Ok(format_mac(&self.get_serial()?))
    }
}

/// `0002D1A2B3C4` becomes `00:02:D1:A2:B3:C4`.
pub fn format_mac(serial: &str) -> String {
    let chars: Vec<char> = serial.trim().chars().collect();
    chars
        .chunks(2)
        .map(|pair| pair.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join(":")
}
