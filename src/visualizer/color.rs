// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

use image::Rgb;

use super::skeleton::BodyPart;

/// Color type for visualization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color(pub u8, pub u8, pub u8);

impl Color {
    /// Red color.
    pub const RED: Self = Self(255, 0, 0);
    /// Green color.
    pub const GREEN: Self = Self(0, 255, 0);
    /// Amber color.
    pub const AMBER: Self = Self(255, 178, 102);
    /// White color.
    pub const WHITE: Self = Self(255, 255, 255);

    /// Create a new color from RGB values.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self(r, g, b)
    }

    /// Limb color for a body part.
    #[must_use]
    pub const fn for_part(part: BodyPart) -> Self {
        let [r, g, b] = match part {
            BodyPart::Face => POSE_COLORS[16],
            BodyPart::Torso => POSE_COLORS[7],
            BodyPart::Arm => POSE_COLORS[9],
            BodyPart::Leg => POSE_COLORS[0],
        };
        Self(r, g, b)
    }

    /// Overlay text color for a verdict.
    #[must_use]
    pub const fn for_verdict(is_ergonomic: Option<bool>) -> Self {
        match is_ergonomic {
            Some(true) => Self::GREEN,
            Some(false) => Self::RED,
            None => Self::AMBER,
        }
    }
}

impl From<Color> for Rgb<u8> {
    fn from(c: Color) -> Self {
        Self([c.0, c.1, c.2])
    }
}

/// Pose color palette.
pub const POSE_COLORS: [[u8; 3]; 20] = [
    [255, 128, 0],   // #ff8000
    [255, 153, 51],  // #ff9933
    [255, 178, 102], // #ffb266
    [230, 230, 0],   // #e6e600
    [255, 153, 255], // #ff99ff
    [153, 204, 255], // #99ccff
    [255, 102, 255], // #ff66ff
    [255, 51, 255],  // #ff33ff
    [102, 178, 255], // #66b2ff
    [51, 153, 255],  // #3399ff
    [255, 153, 153], // #ff9999
    [255, 102, 102], // #ff6666
    [255, 51, 51],   // #ff3333
    [153, 255, 153], // #99ff99
    [102, 255, 102], // #66ff66
    [51, 255, 51],   // #33ff33
    [0, 255, 0],     // #00ff00
    [0, 0, 255],     // #0000ff
    [255, 0, 0],     // #ff0000
    [255, 255, 255], // #ffffff
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verdict_colors() {
        assert_eq!(Color::for_verdict(Some(true)), Color::GREEN);
        assert_eq!(Color::for_verdict(Some(false)), Color::RED);
        assert_eq!(Color::for_verdict(None), Color::AMBER);
        assert_eq!(Rgb::from(Color::new(1, 2, 3)), Rgb([1, 2, 3]));
    }

    #[test]
    fn test_parts_have_distinct_colors() {
        let parts = [BodyPart::Face, BodyPart::Torso, BodyPart::Arm, BodyPart::Leg];
        for (i, a) in parts.iter().enumerate() {
            for b in &parts[i + 1..] {
                assert_ne!(Color::for_part(*a), Color::for_part(*b));
            }
        }
    }
}
