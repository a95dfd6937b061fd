//! RAM-backed monochrome framebuffer with change detection.
//!
//! Hosts without a buffered panel driver (the simulator, tests) draw into
//! this buffer. After drawing, only the rectangular region containing
//! changed pixels is copied to the real target.

use alloc::vec;
use alloc::vec::Vec;
use core::convert::Infallible;

use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use log::debug;

use crate::display::{DisplayError, Panel};

/// Bounding box of pixels that have changed since the last flush.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirtyRect {
    pub min_x: usize,
    pub min_y: usize,
    pub max_x: usize,
    pub max_y: usize,
}

impl DirtyRect {
    fn expand(&mut self, x: usize, y: usize) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
    }

    fn from_point(x: usize, y: usize) -> Self {
        Self {
            min_x: x,
            min_y: y,
            max_x: x,
            max_y: y,
        }
    }

    pub fn to_rectangle(self) -> Rectangle {
        Rectangle::new(
            Point::new(self.min_x as i32, self.min_y as i32),
            Size::new(
                (self.max_x - self.min_x + 1) as u32,
                (self.max_y - self.min_y + 1) as u32,
            ),
        )
    }
}

/// Heap-allocated 1-bit-per-pixel (stored as one `BinaryColor` each)
/// framebuffer implementing `DrawTarget<Color = BinaryColor>`.
pub struct FrameBuffer {
    width: usize,
    height: usize,
    pixels: Vec<BinaryColor>,
    dirty: Option<DirtyRect>,
    flushes: u32,
}

impl FrameBuffer {
    /// Allocate a blank framebuffer.
    pub fn new(width: u32, height: u32) -> Self {
        let (width, height) = (width as usize, height as usize);
        Self {
            width,
            height,
            pixels: vec![BinaryColor::Off; width * height],
            dirty: None,
            flushes: 0,
        }
    }

    #[inline]
    fn set_pixel(&mut self, x: usize, y: usize, color: BinaryColor) {
        let idx = y * self.width + x;
        if self.pixels[idx] != color {
            self.pixels[idx] = color;
            match &mut self.dirty {
                Some(rect) => rect.expand(x, y),
                None => self.dirty = Some(DirtyRect::from_point(x, y)),
            }
        }
    }

    pub fn is_on(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height && self.pixels[y * self.width + x].is_on()
    }

    pub fn lit_pixels(&self) -> usize {
        self.pixels.iter().filter(|p| p.is_on()).count()
    }

    /// Region changed since the last flush, if any.
    pub fn dirty(&self) -> Option<DirtyRect> {
        self.dirty
    }

    /// Number of completed [`Panel::flush`] calls.
    pub fn flush_count(&self) -> u32 {
        self.flushes
    }

    /// Copy the dirty region into `target`, then reset the dirty state.
    ///
    /// If nothing changed, this is a no-op.
    pub fn flush_into<D>(&mut self, target: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = BinaryColor>,
    {
        let Some(rect) = self.dirty.take() else {
            return Ok(());
        };

        let width = rect.max_x - rect.min_x + 1;
        debug!(
            "Flushing {}x{} dirty region at ({}, {})",
            width,
            rect.max_y - rect.min_y + 1,
            rect.min_x,
            rect.min_y
        );

        let pixels = &self.pixels;
        let stride = self.width;
        let pixel_iter = (rect.min_y..=rect.max_y).flat_map(move |y| {
            let row_start = y * stride + rect.min_x;
            pixels[row_start..row_start + width].iter().copied()
        });

        target.fill_contiguous(&rect.to_rectangle(), pixel_iter)
    }
}

impl OriginDimensions for FrameBuffer {
    fn size(&self) -> Size {
        Size::new(self.width as u32, self.height as u32)
    }
}

impl DrawTarget for FrameBuffer {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(coord, color) in pixels {
            let (x, y) = (coord.x, coord.y);
            if x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height {
                self.set_pixel(x as usize, y as usize, color);
            }
        }
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        let (w, h) = (self.width, self.height);

        let x_start = (area.top_left.x.max(0) as usize).min(w);
        let y_start = (area.top_left.y.max(0) as usize).min(h);
        let x_end = ((area.top_left.x.max(0) as usize).saturating_add(area.size.width as usize)).min(w);
        let y_end = ((area.top_left.y.max(0) as usize).saturating_add(area.size.height as usize)).min(h);

        for y in y_start..y_end {
            for x in x_start..x_end {
                self.set_pixel(x, y, color);
            }
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        for y in 0..self.height {
            for x in 0..self.width {
                self.set_pixel(x, y, color);
            }
        }
        Ok(())
    }
}

impl Panel for FrameBuffer {
    fn init(&mut self) -> Result<(), DisplayError> {
        Ok(())
    }

    /// Memory-only panel: a flush just marks the frame as delivered.
    fn flush(&mut self) -> Result<(), DisplayError> {
        self.dirty = None;
        self.flushes = self.flushes.wrapping_add(1);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::primitives::PrimitiveStyle;

    #[test]
    fn unchanged_pixels_do_not_mark_dirty() {
        let mut fb = FrameBuffer::new(16, 8);
        fb.clear(BinaryColor::Off).unwrap();
        assert_eq!(fb.dirty(), None);
    }

    #[test]
    fn dirty_rect_grows_to_cover_changes() {
        let mut fb = FrameBuffer::new(16, 8);
        Pixel(Point::new(2, 1), BinaryColor::On).draw(&mut fb).unwrap();
        Pixel(Point::new(9, 5), BinaryColor::On).draw(&mut fb).unwrap();
        assert_eq!(
            fb.dirty(),
            Some(DirtyRect {
                min_x: 2,
                min_y: 1,
                max_x: 9,
                max_y: 5,
            })
        );
    }

    #[test]
    fn out_of_bounds_pixels_are_clipped() {
        let mut fb = FrameBuffer::new(16, 8);
        Rectangle::new(Point::new(-4, -4), Size::new(40, 40))
            .into_styled(PrimitiveStyle::with_fill(BinaryColor::On))
            .draw(&mut fb)
            .unwrap();
        assert_eq!(fb.lit_pixels(), 16 * 8);
    }

    #[test]
    fn flush_into_copies_only_the_dirty_region() {
        let mut fb = FrameBuffer::new(16, 8);
        let mut target = FrameBuffer::new(16, 8);
        Pixel(Point::new(3, 3), BinaryColor::On).draw(&mut fb).unwrap();

        fb.flush_into(&mut target).unwrap();
        assert!(target.is_on(3, 3));
        assert_eq!(target.lit_pixels(), 1);
        assert_eq!(fb.dirty(), None);

        // second flush with no changes is a no-op
        fb.flush_into(&mut target).unwrap();
        assert_eq!(target.lit_pixels(), 1);
    }

    #[test]
    fn panel_flush_counts_frames() {
        let mut fb = FrameBuffer::new(16, 8);
        Pixel(Point::new(0, 0), BinaryColor::On).draw(&mut fb).unwrap();
        Panel::flush(&mut fb).unwrap();
        Panel::flush(&mut fb).unwrap();
        assert_eq!(fb.flush_count(), 2);
        assert_eq!(fb.dirty(), None);
    }
}
