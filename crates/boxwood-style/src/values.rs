//! Size and visual-effect values carried by the style snapshot.

use serde::{Deserialize, Serialize};

/// [§ 10.5 Content height: the 'height' property](https://www.w3.org/TR/CSS2/visudet.html#the-height-property)
///
/// "Value: `<length>` | `<percentage>` | auto"
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AutoLength {
    /// [§ 4.4](https://www.w3.org/TR/CSS2/cascade.html#value-def-auto)
    ///
    /// "The keyword 'auto'... allows the user agent to compute the value
    /// based on other properties."
    #[default]
    Auto,

    /// An absolute length in pixels.
    Px(f32),

    /// "Specifies a percentage height. The percentage is calculated with
    /// respect to the height of the generated box's containing block."
    Percent(f32),
}

impl AutoLength {
    /// Check if the value is 'auto'.
    #[must_use]
    pub const fn is_auto(&self) -> bool {
        matches!(self, Self::Auto)
    }

    /// Check if the value is a percentage.
    #[must_use]
    pub const fn is_percent(&self) -> bool {
        matches!(self, Self::Percent(_))
    }

    /// A fixed length is definite without consulting the containing block.
    #[must_use]
    pub const fn is_fixed(&self) -> bool {
        matches!(self, Self::Px(_))
    }
}

/// [§ 6.1 Box Shadows: the box-shadow property](https://www.w3.org/TR/css-backgrounds-3/#box-shadow)
///
/// Only the geometry of the shadow matters here: it extends the ink
/// (visual) overflow of the box but never its scrollable overflow.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct BoxShadow {
    /// "Specifies the horizontal offset of the shadow."
    pub offset_x: f32,
    /// "Specifies the vertical offset of the shadow."
    pub offset_y: f32,
    /// "Specifies the blur radius."
    pub blur: f32,
    /// "Specifies the spread distance."
    pub spread: f32,
}

impl BoxShadow {
    /// Distance the shadow extends past the border box on each side, as
    /// `(top, right, bottom, left)`. Never negative.
    #[must_use]
    pub fn outsets(&self) -> (f32, f32, f32, f32) {
        let extent = self.blur + self.spread;
        (
            (extent - self.offset_y).max(0.0),
            (extent + self.offset_x).max(0.0),
            (extent + self.offset_y).max(0.0),
            (extent - self.offset_x).max(0.0),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shadow_outsets_follow_offset() {
        let shadow = BoxShadow {
            offset_x: 4.0,
            offset_y: 0.0,
            blur: 2.0,
            spread: 0.0,
        };
        assert_eq!(shadow.outsets(), (2.0, 6.0, 2.0, 0.0));
    }
}
