//! CSS Writing Mode and direction types
//!
//! [§ 2 Block Flow Direction](https://www.w3.org/TR/css-writing-modes-4/#block-flow)

use serde::{Deserialize, Serialize};

/// [§ 2 Block Flow Direction](https://www.w3.org/TR/css-writing-modes-4/#block-flow)
///
/// "The writing-mode property specifies whether lines of text are laid out
/// horizontally or vertically and the direction in which blocks progress."
///
/// A box whose writing mode differs from its parent's is a writing-mode
/// root and lays out its contents independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum WritingMode {
    /// [§ 2](https://www.w3.org/TR/css-writing-modes-4/#valdef-writing-mode-horizontal-tb)
    ///
    /// "Top-to-bottom block flow direction. Both the writing mode and the
    /// typographic mode are horizontal."
    ///
    /// Mapping:
    ///   - block-start  → top
    ///   - block-end    → bottom
    #[default]
    HorizontalTb,

    /// [§ 2](https://www.w3.org/TR/css-writing-modes-4/#valdef-writing-mode-vertical-rl)
    ///
    /// "Right-to-left block flow direction. Both the writing mode and the
    /// typographic mode are vertical."
    ///
    /// Mapping:
    ///   - block-start  → right
    ///   - block-end    → left
    VerticalRl,

    /// [§ 2](https://www.w3.org/TR/css-writing-modes-4/#valdef-writing-mode-vertical-lr)
    ///
    /// "Left-to-right block flow direction. Both the writing mode and the
    /// typographic mode are vertical."
    ///
    /// Mapping:
    ///   - block-start  → left
    ///   - block-end    → right
    VerticalLr,
}

/// [§ 2.1 Specifying Directionality](https://www.w3.org/TR/css-writing-modes-4/#direction)
///
/// "This property specifies the inline base direction or directionality of
/// any bidi paragraph, embedding, isolate, or override established by the box."
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    /// "Left-to-right directionality."
    #[default]
    Ltr,
    /// "Right-to-left directionality."
    Rtl,
}

/// Physical side of a box
///
/// Used to map logical directions (block-start, etc.) to physical sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhysicalSide {
    /// Top edge of the box
    Top,
    /// Right edge of the box
    Right,
    /// Bottom edge of the box
    Bottom,
    /// Left edge of the box
    Left,
}

impl WritingMode {
    /// Whether blocks progress vertically (lines are horizontal).
    #[must_use]
    pub const fn is_horizontal(&self) -> bool {
        matches!(self, Self::HorizontalTb)
    }

    /// [§ 6.2 Flow-relative Directions](https://www.w3.org/TR/css-writing-modes-4/#logical-directions)
    ///
    /// Map block-start to the corresponding physical side.
    ///
    /// | Writing Mode   | block-start |
    /// |----------------|-------------|
    /// | horizontal-tb  | top         |
    /// | vertical-rl    | right       |
    /// | vertical-lr    | left        |
    #[must_use]
    pub const fn block_start_physical(&self) -> PhysicalSide {
        match self {
            Self::HorizontalTb => PhysicalSide::Top,
            Self::VerticalRl => PhysicalSide::Right,
            Self::VerticalLr => PhysicalSide::Left,
        }
    }

    /// Map block-end to the corresponding physical side.
    ///
    /// | Writing Mode   | block-end |
    /// |----------------|-----------|
    /// | horizontal-tb  | bottom    |
    /// | vertical-rl    | left      |
    /// | vertical-lr    | right     |
    #[must_use]
    pub const fn block_end_physical(&self) -> PhysicalSide {
        match self {
            Self::HorizontalTb => PhysicalSide::Bottom,
            Self::VerticalRl => PhysicalSide::Left,
            Self::VerticalLr => PhysicalSide::Right,
        }
    }

    /// Map inline-start to the corresponding physical side for `direction`.
    ///
    /// | Writing Mode   | ltr  | rtl    |
    /// |----------------|------|--------|
    /// | horizontal-tb  | left | right  |
    /// | vertical-*     | top  | bottom |
    #[must_use]
    pub const fn inline_start_physical(&self, direction: Direction) -> PhysicalSide {
        match (self.is_horizontal(), direction) {
            (true, Direction::Ltr) => PhysicalSide::Left,
            (true, Direction::Rtl) => PhysicalSide::Right,
            (false, Direction::Ltr) => PhysicalSide::Top,
            (false, Direction::Rtl) => PhysicalSide::Bottom,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_end_follows_writing_mode() {
        assert_eq!(WritingMode::HorizontalTb.block_end_physical(), PhysicalSide::Bottom);
        assert_eq!(WritingMode::VerticalRl.block_end_physical(), PhysicalSide::Left);
        assert_eq!(WritingMode::VerticalLr.block_end_physical(), PhysicalSide::Right);
    }

    #[test]
    fn test_inline_start_depends_on_direction() {
        let mode = WritingMode::HorizontalTb;
        assert_eq!(mode.inline_start_physical(Direction::Ltr), PhysicalSide::Left);
        assert_eq!(mode.inline_start_physical(Direction::Rtl), PhysicalSide::Right);
    }
}
