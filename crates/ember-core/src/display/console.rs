//! Text console over a monochrome panel, used for the counter screen.

use embedded_graphics::Drawable;
use embedded_graphics::mono_font::ascii::{FONT_6X10, FONT_10X20};
use embedded_graphics::mono_font::{MonoFont, MonoTextStyle};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::text::{Baseline, Text};
use log::debug;

use super::{DisplayError, TextDisplay};

/// Monochrome panel with a frame buffer that is pushed out explicitly.
pub trait Panel: DrawTarget<Color = BinaryColor> {
    /// Send the controller its initialisation sequence.
    fn init(&mut self) -> Result<(), DisplayError>;

    /// Transfer the frame buffer to the glass.
    fn flush(&mut self) -> Result<(), DisplayError>;
}

/// Cursor-based text console over a [`Panel`].
///
/// Text size 1 maps to a 6x10 font and anything larger to 10x20, which
/// keeps two-line layouts legible on a 128x64 panel.
pub struct Console<P> {
    panel: P,
    cursor: Point,
    text_size: u8,
    color: BinaryColor,
}

impl<P> Console<P>
where
    P: Panel,
{
    pub fn new(panel: P) -> Self {
        Self {
            panel,
            cursor: Point::zero(),
            text_size: 1,
            color: BinaryColor::On,
        }
    }

    pub fn panel(&self) -> &P {
        &self.panel
    }

    pub fn panel_mut(&mut self) -> &mut P {
        &mut self.panel
    }

    pub fn cursor(&self) -> Point {
        self.cursor
    }

    fn font(&self) -> &'static MonoFont<'static> {
        match self.text_size {
            0 | 1 => &FONT_6X10,
            _ => &FONT_10X20,
        }
    }
}

impl<P> TextDisplay for Console<P>
where
    P: Panel,
{
    fn begin(&mut self) -> Result<(), DisplayError> {
        self.panel.init()?;
        self.clear();
        Ok(())
    }

    fn clear(&mut self) {
        if self.panel.clear(BinaryColor::Off).is_err() {
            debug!("Console: panel clear failed");
        }
    }

    fn set_text_size(&mut self, size: u8) {
        self.text_size = size;
    }

    fn set_text_color(&mut self, color: BinaryColor) {
        self.color = color;
    }

    fn set_cursor(&mut self, position: Point) {
        self.cursor = position;
    }

    fn write_text(&mut self, text: &str) -> Result<(), DisplayError> {
        let style = MonoTextStyle::new(self.font(), self.color);
        self.cursor = Text::with_baseline(text, self.cursor, style, Baseline::Top)
            .draw(&mut self.panel)
            .map_err(|_| DisplayError::Draw)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), DisplayError> {
        self.panel.flush()
    }

    fn width(&self) -> u32 {
        self.panel.bounding_box().size.width
    }

    fn height(&self) -> u32 {
        self.panel.bounding_box().size.height
    }
}
