pub mod app;
pub mod key;

/// An RGBA colour as presented by a front end.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::new_rgb(0, 0, 0);
    pub const WHITE: Color = Color::new_rgb(255, 255, 255);

    #[inline]
    pub const fn new_rgb(r: u8, g: u8, b: u8) -> Color {
        Color { r, g, b, a: 0xff }
    }

    /// Build an opaque colour from a packed `0xRRGGBB` value.
    #[inline]
    pub const fn from_rgb24(rgb: u32) -> Color {
        Color::new_rgb((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)
    }

    #[inline]
    pub const fn rgb(&self) -> (u8, u8, u8) {
        (self.r, self.g, self.b)
    }

    /// Packed `0xRRGGBB`, alpha dropped.
    #[inline]
    pub const fn to_rgb24(&self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }
}
