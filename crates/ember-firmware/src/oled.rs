//! SSD1306 panel on the blocking I2C bus.

use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use ember_core::display::{DisplayError, Panel};
use esp_hal::Blocking;
use esp_hal::i2c::master::I2c;
use ssd1306::mode::BufferedGraphicsMode;
use ssd1306::prelude::*;
use ssd1306::{I2CDisplayInterface, Ssd1306};

type Driver = Ssd1306<
    I2CInterface<I2c<'static, Blocking>>,
    DisplaySize128x64,
    BufferedGraphicsMode<DisplaySize128x64>,
>;

/// 128x64 SSD1306 in buffered graphics mode.
///
/// Construction sends nothing on the bus; [`Panel::init`] does.
pub struct OledPanel {
    driver: Driver,
}

impl OledPanel {
    pub fn new(i2c: I2c<'static, Blocking>, address: u8) -> Self {
        let interface = I2CDisplayInterface::new_custom_address(i2c, address);
        let driver = Ssd1306::new(interface, DisplaySize128x64, DisplayRotation::Rotate0)
            .into_buffered_graphics_mode();
        Self { driver }
    }
}

impl OriginDimensions for OledPanel {
    fn size(&self) -> Size {
        OriginDimensions::size(&self.driver)
    }
}

impl DrawTarget for OledPanel {
    type Color = BinaryColor;
    type Error = DisplayError;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        DrawTarget::draw_iter(&mut self.driver, pixels).map_err(|_| DisplayError::Draw)
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        DrawTarget::fill_solid(&mut self.driver, area, color).map_err(|_| DisplayError::Draw)
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        DrawTarget::clear(&mut self.driver, color).map_err(|_| DisplayError::Draw)
    }
}

impl Panel for OledPanel {
    fn init(&mut self) -> Result<(), DisplayError> {
        self.driver
            .init()
            .map_err(|_| DisplayError::InitializationFailed)
    }

    fn flush(&mut self) -> Result<(), DisplayError> {
        self.driver.flush().map_err(|_| DisplayError::Bus)
    }
}
