// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Turns wgpu's asynchronous validation errors into results.

use crate::imp::Error;

/**
Runs `create` inside a validation error scope.

wgpu reports most creation problems through the device's error handler rather than a
return value.  Anything reported while `create` runs comes back as [`Error::Validation`]
tagged with `stage`.
*/
pub(super) async fn validated<T, F>(
    device: &wgpu::Device,
    stage: &'static str,
    create: F,
) -> Result<T, Error>
where
    F: FnOnce() -> T,
{
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let created = create();
    match device.pop_error_scope().await {
        None => Ok(created),
        Some(error) => {
            logwise::error_sync!(
                "Validation failed creating {stage}: {error}",
                stage = stage,
                error = logwise::privacy::LogIt(&error)
            );
            Err(Error::Validation {
                stage,
                message: error.to_string(),
            })
        }
    }
}
