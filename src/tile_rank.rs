// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*!
Ranks the pixels of an image within fixed tiles.

The image is cut into [`TILE_SIZE`]-square tiles, with edge tiles clipped to the image.
Inside a tile every pixel is keyed by `r | g << 8 | b << 16` and sorted ascending, with ties
kept in row-major order.  A pixel's output is its rank scaled into a byte,
`(rank << 8) / tile_pixel_count`.

Fed a capture of a tiled GPU's output, this shows the order pixels were produced within
each tile.

```
use raster_order::tile_rank::rank_tiles;

let rgba = [
    10, 0, 0, 255, 5, 0, 0, 255,
    20, 0, 0, 255, 0, 0, 0, 255,
];
assert_eq!(rank_tiles(2, 2, &rgba), vec![128, 64, 192, 0]);
```
*/

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Edge length of a tile, in pixels.
pub const TILE_SIZE: u32 = 32;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Could not decode PNG: {0}")]
    Decode(#[from] png::DecodingError),
    #[error("Could not encode PNG: {0}")]
    Encode(#[from] png::EncodingError),
    #[error("Unsupported PNG color type {0:?}")]
    UnsupportedColor(png::ColorType),
}

fn rank_key(pixel: &[u8]) -> u32 {
    pixel[0] as u32 | (pixel[1] as u32) << 8 | (pixel[2] as u32) << 16
}

/**
Ranks `rgba` (tightly packed, row-major) and returns one gray byte per pixel.

# Panics
If `rgba` is not `width * height * 4` bytes.
*/
pub fn rank_tiles(width: u32, height: u32, rgba: &[u8]) -> Vec<u8> {
    assert_eq!(rgba.len(), width as usize * height as usize * 4);
    let mut gray = vec![0u8; width as usize * height as usize];
    let mut tile: Vec<(u32, usize)> = Vec::with_capacity((TILE_SIZE * TILE_SIZE) as usize);
    for tile_y in (0..height).step_by(TILE_SIZE as usize) {
        for tile_x in (0..width).step_by(TILE_SIZE as usize) {
            tile.clear();
            for y in tile_y..(tile_y + TILE_SIZE).min(height) {
                for x in tile_x..(tile_x + TILE_SIZE).min(width) {
                    let offset = y as usize * width as usize + x as usize;
                    tile.push((rank_key(&rgba[offset * 4..offset * 4 + 4]), offset));
                }
            }
            //stable, so equal keys stay row-major
            tile.sort_by_key(|(key, _)| *key);
            let count = tile.len();
            for (rank, (_, offset)) in tile.iter().enumerate() {
                gray[*offset] = ((rank << 8) / count) as u8;
            }
        }
    }
    gray
}

/// Decoded image, RGBA8.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbaImage {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

/// Reads any 8- or 16-bit PNG and normalizes it to RGBA8.
pub fn read_png(path: &Path) -> Result<RgbaImage, Error> {
    let mut decoder = png::Decoder::new(BufReader::new(File::open(path)?));
    decoder.set_transformations(png::Transformations::normalize_to_color8());
    let mut reader = decoder.read_info()?;
    let (color_type, _) = reader.output_color_type();
    let (width, height) = (reader.info().width, reader.info().height);
    let mut buf = vec![0u8; width as usize * height as usize * color_type.samples()];
    let info = reader.next_frame(&mut buf)?;
    buf.truncate(info.buffer_size());
    let data = match color_type {
        png::ColorType::Rgba => buf,
        png::ColorType::Rgb => buf
            .chunks_exact(3)
            .flat_map(|p| [p[0], p[1], p[2], u8::MAX])
            .collect(),
        png::ColorType::Grayscale => buf.iter().flat_map(|&g| [g, g, g, u8::MAX]).collect(),
        png::ColorType::GrayscaleAlpha => buf
            .chunks_exact(2)
            .flat_map(|p| [p[0], p[0], p[0], p[1]])
            .collect(),
        other => return Err(Error::UnsupportedColor(other)),
    };
    Ok(RgbaImage {
        width,
        height,
        data,
    })
}

/// Writes an 8-bit grayscale PNG.
pub fn write_gray_png(path: &Path, width: u32, height: u32, gray: &[u8]) -> Result<(), Error> {
    let file = BufWriter::new(File::create(path)?);
    let mut encoder = png::Encoder::new(file, width, height);
    encoder.set_color(png::ColorType::Grayscale);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(gray)?;
    writer.finish()?;
    Ok(())
}

/// Reads `input`, ranks it, and writes the ranks to `output`.
pub fn rank_file(input: &Path, output: &Path) -> Result<(), Error> {
    let image = read_png(input)?;
    logwise::info_sync!(
        "Ranking {width}x{height} image",
        width = image.width,
        height = image.height
    );
    let gray = rank_tiles(image.width, image.height, &image.data);
    write_gray_png(output, image.width, image.height, &gray)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rgba_from_keys(keys: &[u32]) -> Vec<u8> {
        keys.iter()
            .flat_map(|k| [*k as u8, (*k >> 8) as u8, (*k >> 16) as u8, 255])
            .collect()
    }

    #[test]
    fn ranks_one_small_tile() {
        let rgba = rgba_from_keys(&[10, 5, 20, 0]);
        assert_eq!(rank_tiles(2, 2, &rgba), vec![128, 64, 192, 0]);
    }

    #[test]
    fn key_weights_channels() {
        //blue outweighs green outweighs red
        assert!(rank_key(&[0, 0, 1, 0]) > rank_key(&[255, 255, 0, 0]));
        assert!(rank_key(&[0, 1, 0, 0]) > rank_key(&[255, 0, 0, 0]));
        //alpha is ignored
        assert_eq!(rank_key(&[1, 2, 3, 0]), rank_key(&[1, 2, 3, 255]));
    }

    #[test]
    fn ties_keep_row_major_order() {
        let rgba = rgba_from_keys(&[7, 7, 7, 7]);
        assert_eq!(rank_tiles(4, 1, &rgba), vec![0, 64, 128, 192]);
    }

    #[test]
    fn tiles_rank_independently() {
        //two tiles side by side, each a single row of 32 identical pixels
        let width = TILE_SIZE * 2;
        let keys: Vec<u32> = (0..width).map(|x| if x < TILE_SIZE { 1000 } else { 3 }).collect();
        let gray = rank_tiles(width, 1, &rgba_from_keys(&keys));
        assert_eq!(gray[0], 0);
        assert_eq!(gray[TILE_SIZE as usize], 0);
        assert_eq!(gray[1], gray[TILE_SIZE as usize + 1]);
    }

    #[test]
    fn edge_tiles_are_clipped() {
        //a 33x1 image has a one-pixel edge tile, which always ranks 0
        let keys: Vec<u32> = (0..33).rev().collect();
        let gray = rank_tiles(33, 1, &rgba_from_keys(&keys));
        assert_eq!(gray[32], 0);
        assert_eq!(gray[0], ((31usize << 8) / 32) as u8);
    }

    #[test]
    fn png_round_trip_through_files() {
        let dir = std::env::temp_dir();
        let input = dir.join("raster_order_tile_rank_in.png");
        let output = dir.join("raster_order_tile_rank_out.png");
        {
            let file = BufWriter::new(File::create(&input).unwrap());
            let mut encoder = png::Encoder::new(file, 2, 2);
            encoder.set_color(png::ColorType::Rgb);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder.write_header().unwrap();
            writer
                .write_image_data(&[10, 0, 0, 5, 0, 0, 20, 0, 0, 0, 0, 0])
                .unwrap();
        }
        rank_file(&input, &output).unwrap();
        let mut decoder = png::Decoder::new(BufReader::new(File::open(&output).unwrap()));
        decoder.set_transformations(png::Transformations::IDENTITY);
        let mut reader = decoder.read_info().unwrap();
        assert_eq!(reader.info().color_type, png::ColorType::Grayscale);
        let mut gray = vec![0u8; 4];
        reader.next_frame(&mut gray).unwrap();
        assert_eq!(gray, vec![128, 64, 192, 0]);
        let _ = std::fs::remove_file(input);
        let _ = std::fs::remove_file(output);
    }
}
