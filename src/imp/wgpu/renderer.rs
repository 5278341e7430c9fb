// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
use crate::bittricks::{MAX_EXACT_DEPTH_STAMP, stamp_to_index};
use crate::config::Configuration;
use crate::images::fence::FenceSchedule;
use crate::imp::Error;
use crate::imp::wgpu::BoundDevice;
use crate::imp::wgpu::compositor::FrameCompositor;
use crate::imp::wgpu::readback::read_texture;
use crate::imp::wgpu::recorder::OrderRecorder;
use crate::imp::wgpu::replayer::OrderReplayer;
use crate::imp::wgpu::surface::AcquiredSurface;
use crate::imp::wgpu::validation::validated;
use crate::pixel_formats::OutputKind;
use crate::software::texture::Texture;
use crate::software::{OrderIndexMap, RevealMask};

/// Every GPU resource of the pipeline, built once.
#[derive(Debug)]
pub struct Renderer {
    bound_device: BoundDevice,
    recorder: OrderRecorder,
    replayer: OrderReplayer,
    compositor: FrameCompositor,
}

impl Renderer {
    pub async fn new(
        bound_device: &BoundDevice,
        config: &Configuration,
        surface_format: wgpu::TextureFormat,
    ) -> Result<Self, Error> {
        let canvas = config.canvas_size();
        let limit = bound_device.max_texture_dimension();
        if canvas.width() > limit || canvas.height() > limit {
            return Err(Error::CanvasTooLarge {
                width: canvas.width(),
                height: canvas.height(),
                limit,
            });
        }
        if config.output() == OutputKind::Depth
            && canvas.pixel_count() > MAX_EXACT_DEPTH_STAMP as u64
        {
            logwise::warn_sync!(
                "Depth stamps lose precision past {limit} pixels; canvas has {pixels}",
                limit = MAX_EXACT_DEPTH_STAMP,
                pixels = canvas.pixel_count()
            );
        }
        let device = bound_device.device();
        let recorder = validated(device, "order recorder", || {
            OrderRecorder::new(bound_device, config)
        })
        .await?;
        let replayer = validated(device, "order replayer", || {
            OrderReplayer::new(bound_device, canvas, config.output(), recorder.targets())
        })
        .await?;
        let compositor = validated(device, "frame compositor", || {
            FrameCompositor::new(bound_device, surface_format, config.flip(), replayer.targets())
        })
        .await?;
        Ok(Renderer {
            bound_device: bound_device.clone(),
            recorder,
            replayer,
            compositor,
        })
    }

    /**
    Encodes and submits one frame.

    Records first when `record` is set, then replays at `threshold`, then composites into
    `surface` if there is one.  Everything goes to the queue as one submission.
    */
    pub fn frame(
        &self,
        record: bool,
        threshold: u32,
        surface: Option<&AcquiredSurface>,
    ) -> Option<FenceSchedule> {
        let device = self.bound_device.device();
        self.replayer.set_threshold(self.bound_device.queue(), threshold);
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("frame"),
        });
        let schedule = record.then(|| self.recorder.record(&mut encoder));
        self.replayer.replay(&mut encoder);
        if let Some(surface) = surface {
            self.compositor.composite(&mut encoder, &surface.view);
        }
        self.bound_device
            .queue()
            .submit(std::iter::once(encoder.finish()));
        schedule
    }

    /// Encodes and submits a recording on its own.
    pub fn record(&self) -> FenceSchedule {
        let mut encoder = self
            .bound_device
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("record"),
            });
        let schedule = self.recorder.record(&mut encoder);
        self.bound_device
            .queue()
            .submit(std::iter::once(encoder.finish()));
        schedule
    }

    pub fn variant_count(&self) -> usize {
        self.recorder.targets().len()
    }

    pub async fn read_order_indices(&self, variant_index: usize) -> Result<OrderIndexMap, Error> {
        let target = self
            .recorder
            .targets()
            .get(variant_index)
            .ok_or(Error::NoSuchVariant(variant_index))?;
        let output = self.recorder.output();
        let texture = target.texture();
        let bytes = read_texture(
            &self.bound_device,
            texture,
            output.copy_aspect(),
            output.bytes_per_pixel(),
        )
        .await?;
        let indices = bytes
            .chunks_exact(4)
            .map(|texel| {
                let stamp = output.decode_stamp([texel[0], texel[1], texel[2], texel[3]]);
                stamp_to_index(stamp)
            })
            .collect();
        Ok(Texture::from_vec(texture.width(), texture.height(), indices))
    }

    pub async fn read_reveal(&self, variant_index: usize) -> Result<RevealMask, Error> {
        let texture = self
            .replayer
            .targets()
            .get(variant_index)
            .ok_or(Error::NoSuchVariant(variant_index))?
            .texture();
        let bytes = read_texture(&self.bound_device, texture, wgpu::TextureAspect::All, 4).await?;
        //lit pixels are white, the rest black
        let lit = bytes.chunks_exact(4).map(|texel| texel[0] > 127).collect();
        Ok(Texture::from_vec(texture.width(), texture.height(), lit))
    }
}
