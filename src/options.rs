//! Processing directives controlling how a source layer is resampled.

use std::fmt::{Debug, Formatter};

use bitflags::bitflags;
use tracing::warn;

use crate::errors::{ResampleError, Result};
use crate::raster::ResampleAlg;

pub const RESAMPLE: &str = "RESAMPLE";
pub const OVERSAMPLE_RATIO: &str = "OVERSAMPLE_RATIO";
pub const LOAD_FULL_RES_IMAGE: &str = "LOAD_FULL_RES_IMAGE";
pub const LOAD_WHOLE_IMAGE: &str = "LOAD_WHOLE_IMAGE";

/// Oversampling ratio used when `OVERSAMPLE_RATIO` is not set.
pub const DEFAULT_OVERSAMPLE_RATIO: f64 = 2.0;

bitflags! {
    /// Directives changing which part of the source raster is loaded, and at
    /// which resolution.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct LoadFlags: u32 {
        /// Skip source window estimation and load the whole source raster.
        const LOAD_WHOLE_IMAGE = 0x01;
        /// Always load the source window at its native resolution.
        const LOAD_FULL_RES_IMAGE = 0x02;
    }
}

/// An ordered list of `KEY=VALUE` processing directives.
///
/// Keys are matched case-insensitively; setting an existing key replaces
/// its value.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ProcessingOptions {
    entries: Vec<(String, String)>,
}

impl ProcessingOptions {
    /// Creates an empty option list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Assigns `value` to `name`.
    ///
    /// Overwrites duplicate `name`s.
    ///
    /// Returns `Err` if `name` has non alphanumeric characters, or `value`
    /// has newline characters.
    pub fn set_name_value(&mut self, name: &str, value: &str) -> Result<()> {
        if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(ResampleError::BadArgument(format!(
                "Invalid characters in name: '{name}'"
            )));
        }
        if value.contains(['\n', '\r']) {
            return Err(ResampleError::BadArgument(format!(
                "Invalid characters in value: '{value}'"
            )));
        }

        match self
            .entries
            .iter_mut()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
        {
            Some((_, v)) => *v = value.to_string(),
            None => self.entries.push((name.to_string(), value.to_string())),
        }
        Ok(())
    }

    /// Adds a directive given as a single `KEY=VALUE` string.
    pub fn add_string(&mut self, directive: &str) -> Result<()> {
        let (name, value) = directive.split_once('=').ok_or_else(|| {
            ResampleError::BadArgument(format!("Expected KEY=VALUE, got: '{directive}'"))
        })?;
        self.set_name_value(name.trim(), value.trim())
    }

    /// Looks up the value corresponding to `key`.
    pub fn fetch_name_value(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// Interprets `key` as a boolean. Any value other than `NO`, `FALSE`,
    /// `OFF` or `0` is `true`; a missing key gives `default`.
    pub fn fetch_bool(&self, key: &str, default: bool) -> bool {
        match self.fetch_name_value(key) {
            None => default,
            Some(v) => !["NO", "FALSE", "OFF", "0"]
                .iter()
                .any(|no| v.eq_ignore_ascii_case(no)),
        }
    }

    /// Determine the number of entries in the list.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Determine if the list has any values
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get an iterator over the name/value elements of the list.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// The algorithm named by `RESAMPLE`. Unknown names fall back to
    /// [`ResampleAlg::Nearest`].
    pub fn resample_alg(&self) -> ResampleAlg {
        match self.fetch_name_value(RESAMPLE) {
            None => ResampleAlg::default(),
            Some(name) => name.parse().unwrap_or_else(|_| {
                warn!(value = name, "unknown {RESAMPLE} value, using nearest");
                ResampleAlg::Nearest
            }),
        }
    }

    /// The ratio by which the source window may exceed the destination size
    /// before it is loaded decimated.
    pub fn oversample_ratio(&self) -> Result<f64> {
        let Some(value) = self.fetch_name_value(OVERSAMPLE_RATIO) else {
            return Ok(DEFAULT_OVERSAMPLE_RATIO);
        };
        match value.trim().parse::<f64>() {
            Ok(ratio) if ratio.is_finite() && ratio > 0.0 => Ok(ratio),
            _ => Err(ResampleError::BadArgument(format!(
                "{OVERSAMPLE_RATIO} must be a positive number, got: '{value}'"
            ))),
        }
    }

    pub fn load_flags(&self) -> LoadFlags {
        let mut flags = LoadFlags::empty();
        flags.set(LoadFlags::LOAD_WHOLE_IMAGE, self.fetch_bool(LOAD_WHOLE_IMAGE, false));
        flags.set(
            LoadFlags::LOAD_FULL_RES_IMAGE,
            self.fetch_bool(LOAD_FULL_RES_IMAGE, false),
        );
        flags
    }
}

impl Debug for ProcessingOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (k, v) in self.iter() {
            f.write_fmt(format_args!("{k}={v}\n"))?;
        }
        Ok(())
    }
}

/// Convenience shorthand for specifying no options to functions accepting
/// `Into<ProcessingOptions>`.
impl From<()> for ProcessingOptions {
    fn from(_: ()) -> Self {
        ProcessingOptions::default()
    }
}

/// Creates a [`ProcessingOptions`] from a slice of _key_/_value_ tuples.
impl<const N: usize> TryFrom<&[(&str, &str); N]> for ProcessingOptions {
    type Error = ResampleError;

    fn try_from(pairs: &[(&str, &str); N]) -> Result<Self> {
        let mut result = Self::default();
        for (k, v) in pairs {
            result.set_name_value(k, v)?;
        }
        Ok(result)
    }
}
