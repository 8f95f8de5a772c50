//! Cutting a 3×3 contact sheet into nine shots.
//!
//! Pure geometry: cells are `width / 3` by `height / 3` (integer division),
//! so up to two pixel columns on the right and two rows at the bottom are
//! dropped. Cells come out row-major: shot 1 is top-left, shot 9 bottom-right.

use cutify_core::error::ImageError;
use image::{DynamicImage, GenericImageView, ImageFormat};
use std::io::Cursor;

pub const GRID_SIZE: u32 = 3;
pub const SHOT_COUNT: usize = (GRID_SIZE * GRID_SIZE) as usize;

/// A sliced storyboard, every image PNG-encoded.
#[derive(Debug, Clone)]
pub struct GridSlices {
    pub master_png: Vec<u8>,
    pub cells: Vec<Vec<u8>>,
    pub cell_width: u32,
    pub cell_height: u32,
}

/// Decode `bytes` (any format the `image` crate reads) and slice it.
pub fn slice_grid(bytes: &[u8]) -> Result<GridSlices, ImageError> {
    let img = image::load_from_memory(bytes).map_err(|e| ImageError::Decode(e.to_string()))?;
    slice_image(&img)
}

pub fn slice_image(img: &DynamicImage) -> Result<GridSlices, ImageError> {
    let (width, height) = img.dimensions();
    if width < GRID_SIZE || height < GRID_SIZE {
        return Err(ImageError::TooSmall {
            width,
            height,
            grid: GRID_SIZE,
        });
    }

    let cell_width = width / GRID_SIZE;
    let cell_height = height / GRID_SIZE;

    let mut cells = Vec::with_capacity(SHOT_COUNT);
    for row in 0..GRID_SIZE {
        for col in 0..GRID_SIZE {
            let cell = img.crop_imm(col * cell_width, row * cell_height, cell_width, cell_height);
            cells.push(encode_png(&cell)?);
        }
    }

    Ok(GridSlices {
        master_png: encode_png(img)?,
        cells,
        cell_width,
        cell_height,
    })
}

/// Bytes as PNG: passed through when they already decode as one, re-encoded
/// otherwise. Undecodable payloads are rejected either way.
pub fn ensure_png(bytes: Vec<u8>) -> Result<Vec<u8>, ImageError> {
    let img = image::load_from_memory(&bytes).map_err(|e| ImageError::Decode(e.to_string()))?;
    if bytes.starts_with(PNG_MAGIC) {
        return Ok(bytes);
    }
    encode_png(&img)
}

const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G'];

pub fn encode_png(img: &DynamicImage) -> Result<Vec<u8>, ImageError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .map_err(|e| ImageError::Encode(e.to_string()))?;
    Ok(buf)
}
