use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl From<image::Rgb<u8>> for Rgb {
    fn from(image::Rgb([r, g, b]): image::Rgb<u8>) -> Self {
        Self { r, g, b }
    }
}

impl From<Rgb> for image::Rgb<u8> {
    fn from(Rgb { r, g, b }: Rgb) -> Self {
        image::Rgb([r, g, b])
    }
}

/// KML `aabbggrr` notation: opaque alpha, then blue, green and red.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KmlColor(pub Rgb);

impl From<Rgb> for KmlColor {
    fn from(rgb: Rgb) -> Self {
        Self(rgb)
    }
}

impl fmt::Display for KmlColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Rgb { r, g, b } = self.0;
        write!(f, "ff{b:02x}{g:02x}{r:02x}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kml_color_is_alpha_blue_green_red() {
        assert_eq!(KmlColor(Rgb::new(255, 128, 0)).to_string(), "ff0080ff");
        assert_eq!(KmlColor(Rgb::new(0, 0, 0)).to_string(), "ff000000");
        assert_eq!(KmlColor(Rgb::new(255, 255, 255)).to_string(), "ffffffff");
        assert_eq!(KmlColor(Rgb::new(1, 2, 3)).to_string(), "ff030201");
    }

    #[test]
    fn kml_color_is_eight_lowercase_hex_digits() {
        for v in [0u8, 9, 10, 15, 16, 171, 254, 255] {
            for rgb in [Rgb::new(v, 0, 255), Rgb::new(255, v, 0), Rgb::new(0, 255, v)] {
                let color = KmlColor(rgb).to_string();
                assert_eq!(color.len(), 8);
                assert!(color.starts_with("ff"));
                assert!(color
                    .chars()
                    .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
                assert_eq!(&color[2..4], format!("{:02x}", rgb.b));
                assert_eq!(&color[4..6], format!("{:02x}", rgb.g));
                assert_eq!(&color[6..8], format!("{:02x}", rgb.r));
            }
        }
    }

    #[test]
    fn converts_from_image_pixels() {
        let pixel = image::Rgb([12, 34, 56]);
        assert_eq!(Rgb::from(pixel), Rgb::new(12, 34, 56));
        assert_eq!(image::Rgb::from(Rgb::new(12, 34, 56)), pixel);
    }
}
