//! Desktop stand-in for the 128x64 OLED.
//!
//! Drawing lands in an [`ember_core::framebuffer::FrameBuffer`]. On flush the
//! frame is either pushed into an SDL window (`window` feature) or dumped
//! to the log as text at debug level.

use core::convert::Infallible;
#[cfg(feature = "window")]
use std::sync::atomic::Ordering;

use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use ember_core::display::{DisplayError, Panel};
use ember_core::framebuffer::FrameBuffer;
#[cfg(feature = "window")]
use embedded_graphics_simulator::{
    BinaryColorTheme, OutputSettingsBuilder, SimulatorDisplay, SimulatorEvent, Window,
};
#[cfg(not(feature = "window"))]
use log::debug;

/// Pixel scale factor for the simulator window.
#[cfg(feature = "window")]
const WINDOW_SCALE: u32 = 4;

#[cfg(feature = "window")]
struct WindowOutput {
    display: SimulatorDisplay<BinaryColor>,
    window: Window,
}

pub struct SimPanel {
    frame: FrameBuffer,
    #[cfg(feature = "window")]
    output: Option<WindowOutput>,
}

impl SimPanel {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            frame: FrameBuffer::new(width, height),
            #[cfg(feature = "window")]
            output: None,
        }
    }
}

impl OriginDimensions for SimPanel {
    fn size(&self) -> Size {
        self.frame.size()
    }
}

impl DrawTarget for SimPanel {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        self.frame.draw_iter(pixels)
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        self.frame.fill_solid(area, color)
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.frame.clear(color)
    }
}

#[cfg(feature = "window")]
impl Panel for SimPanel {
    fn init(&mut self) -> Result<(), DisplayError> {
        let settings = OutputSettingsBuilder::new()
            .scale(WINDOW_SCALE)
            .theme(BinaryColorTheme::OledBlue)
            .build();
        self.output = Some(WindowOutput {
            display: SimulatorDisplay::new(self.frame.size()),
            window: Window::new("Ember Simulator", &settings),
        });
        Ok(())
    }

    fn flush(&mut self) -> Result<(), DisplayError> {
        let output = self.output.as_mut().ok_or(DisplayError::Bus)?;
        self.frame
            .flush_into(&mut output.display)
            .map_err(|_| DisplayError::Bus)?;
        output.window.update(&output.display);

        // window events are only pumped here, so this is where a close lands
        if output
            .window
            .events()
            .any(|e| matches!(e, SimulatorEvent::Quit))
        {
            crate::QUIT.store(true, Ordering::Relaxed);
        }
        Panel::flush(&mut self.frame)
    }
}

#[cfg(not(feature = "window"))]
impl Panel for SimPanel {
    fn init(&mut self) -> Result<(), DisplayError> {
        Ok(())
    }

    fn flush(&mut self) -> Result<(), DisplayError> {
        if self.frame.dirty().is_some() && log::log_enabled!(log::Level::Debug) {
            for row in render_ascii(&self.frame).lines() {
                debug!("|{}|", row);
            }
        }
        Panel::flush(&mut self.frame)
    }
}

/// Render a frame as text, two pixel rows per line (`#` full, `'` top,
/// `.` bottom).
#[cfg_attr(feature = "window", allow(dead_code))]
pub fn render_ascii(frame: &FrameBuffer) -> String {
    let size = frame.size();
    let (width, height) = (size.width as usize, size.height as usize);
    let mut out = String::with_capacity((width + 1) * height / 2);
    for y in (0..height).step_by(2) {
        for x in 0..width {
            out.push(match (frame.is_on(x, y), frame.is_on(x, y + 1)) {
                (true, true) => '#',
                (true, false) => '\'',
                (false, true) => '.',
                (false, false) => ' ',
            });
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_merges_row_pairs() {
        let mut frame = FrameBuffer::new(4, 4);
        Pixel(Point::new(0, 0), BinaryColor::On).draw(&mut frame).unwrap();
        Pixel(Point::new(1, 1), BinaryColor::On).draw(&mut frame).unwrap();
        Pixel(Point::new(2, 2), BinaryColor::On).draw(&mut frame).unwrap();
        Pixel(Point::new(2, 3), BinaryColor::On).draw(&mut frame).unwrap();
        assert_eq!(render_ascii(&frame), "'.  \n  # \n");
    }
}
