// This is free and unencumbered software released into the public domain.

use crate::shared::{CameraError, ParameterEntry, Parameters};
use std::collections::BTreeSet;

pub const EVENT_GROUP: &str = "event";

pub fn event_group(index: u32) -> String {
    format!("{EVENT_GROUP}_i{index}")
}

pub fn event_enable_key(index: u32) -> String {
    format!("{}_enable", event_group(index))
}

/// The `event_i{N}_*` parameter families of one camera.
#[derive(Clone, Copy)]
pub struct Events<'a> {
    params: Parameters<'a>,
}

impl<'a> Events<'a> {
    pub fn new(params: Parameters<'a>) -> Self {
        Self { params }
    }

    /// Probes `event_i{index}_`; `None` when the device reports nothing under it.
    pub fn get(&self, index: u32) -> Result<Option<EventView<'a>>, CameraError> {
        let entries: Vec<_> = self.params.group(&event_group(index))?.collect();
        if entries.is_empty() {
            return Ok(None);
        }
        Ok(Some(EventView {
            params: self.params,
            index,
            entries,
        }))
    }

    /// Indices of every event the device exposes, ascending.
    pub fn indices(&self) -> Result<Vec<u32>, CameraError> {
        let indices: BTreeSet<u32> = self
            .params
            .group(EVENT_GROUP)?
            .filter_map(|entry| parse_event_index(&entry.key))
            .collect();
        Ok(indices.into_iter().collect())
    }

    pub fn enabled(&self) -> EnabledEvents<'a> {
        EnabledEvents {
            params: self.params,
        }
    }
}

fn parse_event_index(key: &str) -> Option<u32> {
    let rest = key.strip_prefix(EVENT_GROUP)?.strip_prefix("_i")?;
    let (index, _) = rest.split_once('_')?;
    index.parse().ok()
}

pub struct EventView<'a> {
    params: Parameters<'a>,
    index: u32,
    entries: Vec<ParameterEntry>,
}

impl<'a> EventView<'a> {
    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn prefix(&self) -> String {
        format!("{}_", event_group(self.index))
    }

    /// The entries returned by the probe that found this event.
    pub fn entries(&self) -> &[ParameterEntry] {
        &self.entries
    }

    /// Fetches `event_i{N}_{name}` from the device.
    pub fn get(&self, name: &str) -> Result<String, CameraError> {
        self.params.get(&format!("{}{name}", self.prefix()))
    }

    pub fn set(&self, name: &str, value: impl core::fmt::Display) -> Result<String, CameraError> {
        self.params.set(&format!("{}{name}", self.prefix()), value)
    }

    pub fn is_enabled(&self) -> Result<bool, CameraError> {
        let key = event_enable_key(self.index);
        let value = self.params.get(&key)?;
        parse_flag(&key, &value)
    }

    pub fn set_enabled(&self, enabled: bool) -> Result<bool, CameraError> {
        let key = event_enable_key(self.index);
        let value = self.params.set(&key, u8::from(enabled))?;
        parse_flag(&key, &value)
    }
}

/// Set-like view of the enabled events.
#[derive(Clone, Copy)]
pub struct EnabledEvents<'a> {
    params: Parameters<'a>,
}

impl EnabledEvents<'_> {
    /// True iff `event_i{index}_enable` reads as integer 1. Any failure,
    /// including transport errors, reads as false.
    pub fn contains(&self, index: u32) -> bool {
        let key = event_enable_key(index);
        self.params
            .get(&key)
            .ok()
            .and_then(|value| value.trim().parse::<i64>().ok())
            == Some(1)
    }
}

/// Integer flag semantics of `*_enable` parameters: exactly 1 means on.
pub(crate) fn parse_flag(key: &str, value: &str) -> Result<bool, CameraError> {
    value
        .replace('\'', "")
        .trim()
        .parse::<i64>()
        .map(|n| n == 1)
        .map_err(|_| CameraError::invalid_value(key, value))
}
