// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
use crate::config::DeviceSelector;

pub struct UnboundDevice {
    pub(super) adapter: wgpu::Adapter,
}

impl UnboundDevice {
    /**
    Picks an adapter.

    An index or name that matches nothing falls back to the system default with a warning.
    */
    pub async fn pick(
        selector: &DeviceSelector,
        compatible_surface: Option<&wgpu::Surface<'static>>,
        entry_point: &crate::entry_point::EntryPoint,
    ) -> Result<UnboundDevice, super::Error> {
        let instance = &entry_point.0.0;
        let selected = match selector {
            DeviceSelector::SystemDefault => None,
            DeviceSelector::Index(index) => {
                let found = instance
                    .enumerate_adapters(wgpu::Backends::all())
                    .into_iter()
                    .nth(*index);
                if found.is_none() {
                    logwise::warn_sync!(
                        "No adapter at index {index}; using the default adapter",
                        index = *index
                    );
                }
                found
            }
            DeviceSelector::Name(name) => {
                let found = instance
                    .enumerate_adapters(wgpu::Backends::all())
                    .into_iter()
                    .find(|adapter| adapter.get_info().name == *name);
                if found.is_none() {
                    logwise::warn_sync!(
                        "No adapter named {name}; using the default adapter",
                        name = logwise::privacy::LogIt(name)
                    );
                }
                found
            }
        };
        let adapter = match selected {
            Some(adapter) => adapter,
            None => {
                let options = wgpu::RequestAdapterOptions {
                    power_preference: Default::default(),
                    force_fallback_adapter: false,
                    compatible_surface,
                };
                instance
                    .request_adapter(&options)
                    .await
                    .map_err(|_| super::Error::NoSuchAdapter)?
            }
        };
        let info = adapter.get_info();
        logwise::info_sync!(
            "Picked adapter {name} ({backend})",
            name = logwise::privacy::LogIt(&info.name),
            backend = logwise::privacy::LogIt(&info.backend)
        );
        Ok(UnboundDevice { adapter })
    }
}
