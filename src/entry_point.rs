// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Platform-independent entrypoint.
use crate::imp;
use std::fmt::{Debug, Formatter};

/// The graphics instance everything else is created from.
#[derive(Debug)]
pub struct EntryPoint(pub(crate) crate::imp::EntryPoint);
///platform-independent error type
#[derive(Debug)]
pub struct EntryPointError(imp::Error);
impl std::fmt::Display for EntryPointError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}
impl std::error::Error for EntryPointError {}

impl EntryPoint {
    pub async fn new() -> Result<Self, EntryPointError> {
        crate::imp::EntryPoint::new()
            .await
            .map(EntryPoint)
            .map_err(EntryPointError)
    }

    /**
    Names of the adapters this machine exposes.

    The position of a name is the index the `GPU` configuration key selects it by.
    */
    pub fn adapter_names(&self) -> Vec<String> {
        self.0.adapter_names()
    }
}
