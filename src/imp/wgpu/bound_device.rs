// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
use crate::imp::Error;
use std::sync::Arc;
use wgpu::{DownlevelFlags, Limits, PollType, Trace};

/// Owns the GPU resources behind a [BoundDevice].
#[derive(Debug)]
struct BoundDeviceResources {
    device: wgpu::Device,
    queue: wgpu::Queue,
    adapter: wgpu::Adapter,
}

/// Cross-platform bound device that can be safely cloned
/// Multiple instances share the same underlying GPU resources
#[derive(Debug, Clone)]
pub struct BoundDevice {
    resources: Arc<BoundDeviceResources>,
    //keeps the instance alive as long as its device
    _entry_point: Arc<crate::entry_point::EntryPoint>,
}

impl BoundDevice {
    pub(crate) async fn bind(
        unbound_device: crate::images::device::UnboundDevice,
        entry_point: Arc<crate::entry_point::EntryPoint>,
    ) -> Result<Self, Error> {
        let adapter = unbound_device.0.adapter;
        let info = adapter.get_info();
        //recording increments its counter from the fragment stage
        let downlevel = adapter.get_downlevel_capabilities();
        if !downlevel
            .flags
            .contains(DownlevelFlags::FRAGMENT_WRITABLE_STORAGE)
        {
            return Err(Error::MissingFragmentStorage(info.name));
        }
        let limits = Limits::downlevel_defaults().using_resolution(adapter.limits());
        let descriptor = wgpu::DeviceDescriptor {
            label: wgpu::Label::from("Bound Device"),
            required_features: Default::default(),
            required_limits: limits,
            memory_hints: Default::default(),
            trace: Trace::Off,
        };
        let (device, queue) = adapter.request_device(&descriptor).await?;
        logwise::info_sync!(
            "Bound device on {name}",
            name = logwise::privacy::LogIt(&info.name)
        );
        Ok(BoundDevice {
            resources: Arc::new(BoundDeviceResources {
                device,
                queue,
                adapter,
            }),
            _entry_point: entry_point,
        })
    }

    /// Blocks until submitted work completes and map callbacks have fired.
    pub fn poll_wait(&self) -> Result<(), Error> {
        self.resources.device.poll(PollType::Wait)?;
        Ok(())
    }

    pub(super) fn device(&self) -> &wgpu::Device {
        &self.resources.device
    }

    pub(super) fn queue(&self) -> &wgpu::Queue {
        &self.resources.queue
    }

    #[cfg(feature = "app_window")]
    pub(super) fn adapter(&self) -> &wgpu::Adapter {
        &self.resources.adapter
    }

    pub fn adapter_name(&self) -> String {
        self.resources.adapter.get_info().name
    }

    /// Largest width or height a 2D texture may have on this device.
    pub fn max_texture_dimension(&self) -> u32 {
        self.resources.device.limits().max_texture_dimension_2d
    }
}
