//! Text display abstraction and the periodic counter screen.
//!
//! [`TextDisplay`] is the small cursor-and-buffer interface the router
//! drives: clear, style, position, write, flush. [`Console`] implements it
//! on top of any `embedded-graphics` monochrome panel.

mod console;

pub use console::{Console, Panel};

use core::fmt::Write;

use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::Point;
use thiserror_no_std::Error;

/// Text scale used by the counter screen.
pub const COUNTER_TEXT_SIZE: u8 = 2;

/// Label drawn in front of the counter.
pub const COUNTER_LABEL: &str = "i = ";

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayError {
    #[error("display did not respond to initialisation")]
    InitializationFailed,
    #[error("drawing into the frame buffer failed")]
    Draw,
    #[error("display bus transfer failed")]
    Bus,
}

/// Physical resolution of the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Res128x64,
    Res128x32,
}

impl Resolution {
    pub const fn width(self) -> u32 {
        128
    }

    pub const fn height(self) -> u32 {
        match self {
            Self::Res128x64 => 64,
            Self::Res128x32 => 32,
        }
    }
}

/// Bus the panel hangs off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interface {
    I2c {
        address: u8,
        /// Dedicated reset line, `None` when the panel shares the board reset.
        reset_pin: Option<u8>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplaySpec {
    pub interface: Interface,
    pub resolution: Resolution,
}

/// Buffered text display with an Adafruit-style cursor.
///
/// Drawing calls only touch the in-memory frame; nothing reaches the panel
/// until [`TextDisplay::flush`].
pub trait TextDisplay {
    /// Run the panel's power-on sequence.
    fn begin(&mut self) -> Result<(), DisplayError>;

    fn clear(&mut self);

    fn set_text_size(&mut self, size: u8);

    fn set_text_color(&mut self, color: BinaryColor);

    /// Move the text cursor; `position` is the top-left of the next glyph.
    fn set_cursor(&mut self, position: Point);

    /// Draw `text` at the cursor and advance it.
    fn write_text(&mut self, text: &str) -> Result<(), DisplayError>;

    /// Send the frame to the panel.
    fn flush(&mut self) -> Result<(), DisplayError>;

    fn width(&self) -> u32;

    fn height(&self) -> u32;
}

/// Render `label` followed by `count` a quarter of the way into the panel
/// and push the frame out.
///
/// The frame is flushed even when drawing fails so every call produces
/// exactly one clear and one flush.
pub fn show_count<D>(display: &mut D, label: &str, count: u32) -> Result<(), DisplayError>
where
    D: TextDisplay + ?Sized,
{
    display.clear();
    display.set_text_size(COUNTER_TEXT_SIZE);
    display.set_text_color(BinaryColor::On);
    display.set_cursor(Point::new(
        (display.width() / 4) as i32,
        (display.height() / 4) as i32,
    ));

    let mut text: heapless::String<32> = heapless::String::new();
    let drawn = match write!(text, "{label}{count}") {
        Ok(()) => display.write_text(&text),
        Err(_) => Err(DisplayError::Draw),
    };
    let flushed = display.flush();
    drawn.and(flushed)
}
