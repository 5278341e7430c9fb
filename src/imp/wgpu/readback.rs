// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Copies textures into host memory.

use crate::imp::Error;
use crate::imp::wgpu::BoundDevice;

/// Bytes per row of a copy, padded to wgpu's row alignment.
pub(crate) const fn aligned_bytes_per_row(width: u32, bytes_per_pixel: u32) -> u32 {
    let unpadded = width * bytes_per_pixel;
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    unpadded.div_ceil(align) * align
}

/// Drops the padding at the end of every row.
pub(crate) fn unpad_rows(padded: &[u8], width: u32, height: u32, bytes_per_pixel: u32) -> Vec<u8> {
    let padded_row = aligned_bytes_per_row(width, bytes_per_pixel) as usize;
    let row = (width * bytes_per_pixel) as usize;
    let mut tight = Vec::with_capacity(row * height as usize);
    for y in 0..height as usize {
        let start = y * padded_row;
        tight.extend_from_slice(&padded[start..start + row]);
    }
    tight
}

/**
Reads one aspect of `texture` back as tightly packed rows.

Waits for all previously submitted work, so whatever a frame wrote is what comes back.
*/
pub(super) async fn read_texture(
    bound_device: &BoundDevice,
    texture: &wgpu::Texture,
    aspect: wgpu::TextureAspect,
    bytes_per_pixel: u32,
) -> Result<Vec<u8>, Error> {
    let perf = logwise::perfwarn_begin!("readback");
    let device = bound_device.device();
    let (width, height) = (texture.width(), texture.height());
    let bytes_per_row = aligned_bytes_per_row(width, bytes_per_pixel);
    let staging = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("readback"),
        size: bytes_per_row as wgpu::BufferAddress * height as wgpu::BufferAddress,
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        mapped_at_creation: false,
    });
    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("readback"),
    });
    encoder.copy_texture_to_buffer(
        wgpu::TexelCopyTextureInfo {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect,
        },
        wgpu::TexelCopyBufferInfo {
            buffer: &staging,
            layout: wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(bytes_per_row),
                rows_per_image: Some(height),
            },
        },
        wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
    );
    bound_device.queue().submit(std::iter::once(encoder.finish()));

    let (sender, mapped) = r#continue::continuation();
    staging
        .slice(..)
        .map_async(wgpu::MapMode::Read, move |result| sender.send(result));
    bound_device.poll_wait()?;
    mapped.await?;

    let tight = {
        let data = staging.slice(..).get_mapped_range();
        unpad_rows(&data, width, height, bytes_per_pixel)
    };
    staging.unmap();
    drop(perf);
    Ok(tight)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_pad_to_256() {
        assert_eq!(aligned_bytes_per_row(4, 4), 256);
        assert_eq!(aligned_bytes_per_row(64, 4), 256);
        assert_eq!(aligned_bytes_per_row(65, 4), 512);
    }

    #[test]
    fn unpad_keeps_pixels_only() {
        let mut padded = vec![0u8; 512];
        padded[0..8].copy_from_slice(&[1, 2, 3, 4, 5, 6, 7, 8]);
        padded[256..264].copy_from_slice(&[9, 10, 11, 12, 13, 14, 15, 16]);
        let tight = unpad_rows(&padded, 2, 2, 4);
        assert_eq!(tight, (1..=16).collect::<Vec<u8>>());
    }
}
