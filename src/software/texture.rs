// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*! Host-side textures.

A [`Texture`] is a 2D array with texture-like addressing.  It holds order indices and
reveal masks read back from the GPU, and the output of the CPU reference recorder.

# Coordinate Systems

- Origin (0, 0) is at the top-left
- X increases to the right
- Y increases downward

# Example

```
use raster_order::software::texture::{Texture, Texel};

let mut texture = Texture::new(4, 4, 0u32);
texture[Texel { x: 1, y: 2 }] = 7;
assert_eq!(texture[Texel { x: 1, y: 2 }], 7);
assert_eq!(texture.width(), 4);
```
*/

use std::ops::{Index, IndexMut};

/// Integer texture coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Texel {
    pub x: u32,
    pub y: u32,
}

impl Texel {
    /// Converts a row-major offset back into a texel.
    pub const fn from_vec_offset(width: u32, offset: usize) -> Self {
        Texel {
            x: (offset % width as usize) as u32,
            y: (offset / width as usize) as u32,
        }
    }

    pub const fn vec_offset(&self, width: u32) -> usize {
        self.y as usize * width as usize + self.x as usize
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Texture<T> {
    width: u32,
    height: u32,
    data: Vec<T>,
}

impl<T: Clone> Texture<T> {
    pub fn new(width: u32, height: u32, initial: T) -> Self {
        Texture {
            width,
            height,
            data: vec![initial; width as usize * height as usize],
        }
    }
}

impl<T> Texture<T> {
    pub fn new_with<F: FnMut(Texel) -> T>(width: u32, height: u32, mut initialize_with: F) -> Self {
        let len = width as usize * height as usize;
        let data = (0..len)
            .map(|offset| initialize_with(Texel::from_vec_offset(width, offset)))
            .collect();
        Texture {
            width,
            height,
            data,
        }
    }

    /// # Panics
    /// If `data` does not hold exactly `width * height` elements.
    pub fn from_vec(width: u32, height: u32, data: Vec<T>) -> Self {
        assert_eq!(data.len(), width as usize * height as usize);
        Texture {
            width,
            height,
            data,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }
    pub fn height(&self) -> u32 {
        self.height
    }
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Texels with their values, row-major.
    pub fn texels(&self) -> impl Iterator<Item = (Texel, &T)> + '_ {
        let width = self.width;
        self.data
            .iter()
            .enumerate()
            .map(move |(offset, value)| (Texel::from_vec_offset(width, offset), value))
    }

    pub fn map<U, F: FnMut(&T) -> U>(&self, f: F) -> Texture<U> {
        Texture {
            width: self.width,
            height: self.height,
            data: self.data.iter().map(f).collect(),
        }
    }
}

impl<T> Index<Texel> for Texture<T> {
    type Output = T;
    fn index(&self, texel: Texel) -> &T {
        assert!(texel.x < self.width && texel.y < self.height, "texel {texel:?} out of bounds");
        &self.data[texel.vec_offset(self.width)]
    }
}

impl<T> IndexMut<Texel> for Texture<T> {
    fn index_mut(&mut self, texel: Texel) -> &mut T {
        assert!(texel.x < self.width && texel.y < self.height, "texel {texel:?} out of bounds");
        &mut self.data[texel.vec_offset(self.width)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_round_trip() {
        let texel = Texel { x: 3, y: 2 };
        assert_eq!(texel.vec_offset(5), 13);
        assert_eq!(Texel::from_vec_offset(5, 13), texel);
    }

    #[test]
    fn new_with_is_row_major() {
        let texture = Texture::new_with(3, 2, |t| t.y * 10 + t.x);
        assert_eq!(texture.as_slice(), &[0, 1, 2, 10, 11, 12]);
        let doubled = texture.map(|v| v * 2);
        assert_eq!(doubled[Texel { x: 2, y: 1 }], 24);
    }

    #[test]
    #[should_panic]
    fn out_of_bounds() {
        let texture = Texture::new(2, 2, 0u8);
        let _ = texture[Texel { x: 2, y: 0 }];
    }
}
