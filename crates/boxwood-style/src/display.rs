//! CSS Display property types and keyword parsing
//!
//! [§ 2 Box Layout Modes: the display property](https://www.w3.org/TR/css-display-3/#the-display-properties)

use std::fmt;

use serde::{Deserialize, Serialize};

use boxwood_common::warning::warn_once;

// [§ 2 Box Layout Modes: the display property](https://www.w3.org/TR/css-display-3/#the-display-properties)
//
// "The display property defines an element's display type, which consists of
// the two basic qualities of how an element generates boxes:
//   - the inner display type, which defines the kind of formatting context
//     it generates, dictating how its descendant boxes are laid out.
//   - the outer display type, which dictates how the principal box itself
//     participates in flow layout."

/// [§ 2.1 Outer Display Roles](https://www.w3.org/TR/css-display-3/#outer-role)
///
/// "The `<display-outside>` keywords specify the element's outer display type,
/// which is essentially its principal box's role in flow layout."
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OuterDisplayType {
    /// "The element generates a block-level box when placed in flow layout."
    Block,
    /// "The element generates an inline-level box when placed in flow layout."
    Inline,
}

/// [§ 2.4 Layout-Internal Display Types](https://www.w3.org/TR/css-display-3/#layout-specific-display)
///
/// "Some layout models split boxes into several internal parts."
/// Only table parts matter to box-tree maintenance: they decide whether a new
/// child can be dropped into an anonymous table wrapper directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TablePart {
    /// `table-row-group`
    RowGroup,
    /// `table-header-group`
    HeaderGroup,
    /// `table-footer-group`
    FooterGroup,
    /// `table-row`
    Row,
    /// `table-cell`
    Cell,
    /// `table-column-group`
    ColumnGroup,
    /// `table-column`
    Column,
    /// `table-caption`
    Caption,
}

/// [§ 2.2 Inner Display Layout Models](https://www.w3.org/TR/css-display-3/#inner-model)
///
/// "The `<display-inside>` keywords specify the element's inner display type,
/// which defines the type of formatting context that lays out its contents."
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InnerDisplayType {
    /// "The element lays out its contents using flow layout (block-and-inline layout)."
    Flow,
    /// Same as Flow but establishes a new block formatting context.
    FlowRoot,
    /// "The element lays out its contents using table layout."
    Table,
    /// "The element lays out its contents using flex layout."
    Flex,
    /// "The element lays out its contents using grid layout."
    Grid,
    /// "The element lays out its contents using ruby layout."
    Ruby,
    /// A layout-internal table box.
    TablePart(TablePart),
}

/// Combined display value
/// [§ 2 Box Layout Modes](https://www.w3.org/TR/css-display-3/#the-display-properties)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DisplayValue {
    /// "The outer display type, which dictates how the box participates in flow layout."
    pub outer: OuterDisplayType,
    /// "The inner display type, which dictates how its descendant boxes are laid out."
    pub inner: InnerDisplayType,
    /// [§ 2.3 Generating Marker Boxes](https://www.w3.org/TR/css-display-3/#list-items)
    ///
    /// "The list-item keyword causes the element to generate a ::marker
    /// pseudo-element box."
    pub list_item: bool,
}

impl DisplayValue {
    const fn new(outer: OuterDisplayType, inner: InnerDisplayType) -> Self {
        Self {
            outer,
            inner,
            list_item: false,
        }
    }

    /// `display: block` - block outer, flow inner
    #[must_use]
    pub const fn block() -> Self {
        Self::new(OuterDisplayType::Block, InnerDisplayType::Flow)
    }

    /// `display: inline` - inline outer, flow inner
    #[must_use]
    pub const fn inline() -> Self {
        Self::new(OuterDisplayType::Inline, InnerDisplayType::Flow)
    }

    /// `display: flow-root` - block outer, flow-root inner
    #[must_use]
    pub const fn flow_root() -> Self {
        Self::new(OuterDisplayType::Block, InnerDisplayType::FlowRoot)
    }

    /// `display: inline-block` - inline outer, flow-root inner
    #[must_use]
    pub const fn inline_block() -> Self {
        Self::new(OuterDisplayType::Inline, InnerDisplayType::FlowRoot)
    }

    /// `display: list-item` - block outer, flow inner, with a marker
    #[must_use]
    pub const fn list_item() -> Self {
        Self {
            outer: OuterDisplayType::Block,
            inner: InnerDisplayType::Flow,
            list_item: true,
        }
    }

    /// `display: table` - block outer, table inner
    #[must_use]
    pub const fn table() -> Self {
        Self::new(OuterDisplayType::Block, InnerDisplayType::Table)
    }

    /// `display: inline-table` - inline outer, table inner
    #[must_use]
    pub const fn inline_table() -> Self {
        Self::new(OuterDisplayType::Inline, InnerDisplayType::Table)
    }

    /// `display: flex` - block outer, flex inner
    #[must_use]
    pub const fn flex() -> Self {
        Self::new(OuterDisplayType::Block, InnerDisplayType::Flex)
    }

    /// `display: inline-flex` - inline outer, flex inner
    #[must_use]
    pub const fn inline_flex() -> Self {
        Self::new(OuterDisplayType::Inline, InnerDisplayType::Flex)
    }

    /// `display: grid` - block outer, grid inner
    #[must_use]
    pub const fn grid() -> Self {
        Self::new(OuterDisplayType::Block, InnerDisplayType::Grid)
    }

    /// `display: ruby` - inline outer, ruby inner
    #[must_use]
    pub const fn ruby() -> Self {
        Self::new(OuterDisplayType::Inline, InnerDisplayType::Ruby)
    }

    /// A layout-internal table display (`table-row`, `table-cell`, ...).
    #[must_use]
    pub const fn table_part(part: TablePart) -> Self {
        Self::new(OuterDisplayType::Block, InnerDisplayType::TablePart(part))
    }

    /// [§ 2.4](https://www.w3.org/TR/css-display-3/#layout-specific-display)
    ///
    /// True for the table-internal displays; `table-caption` included.
    #[must_use]
    pub const fn is_table_part(&self) -> bool {
        matches!(self.inner, InnerDisplayType::TablePart(_))
    }

    /// [§ 2.4 Combination Display Keywords](https://www.w3.org/TR/css-display-3/#display-keyword-combos)
    ///
    /// Atomic inlines (`inline-block`, `inline-table`, `inline-flex`, ...)
    /// are inline-level boxes whose contents form their own formatting
    /// context.
    #[must_use]
    pub const fn is_atomic_inline(&self) -> bool {
        matches!(self.outer, OuterDisplayType::Inline)
            && !matches!(self.inner, InnerDisplayType::Flow | InnerDisplayType::Ruby)
    }

    /// [§ 2.7 Automatic Box Type Transformations](https://www.w3.org/TR/css-display-3/#transformations)
    ///
    /// "Some layout effects require blockification or inlinification of the
    /// box type." Floats and absolutely positioned boxes are blockified.
    #[must_use]
    pub const fn blockified(&self) -> Self {
        // inline-block, inline-table, inline-flex keep their inner model
        let inner = match self.inner {
            InnerDisplayType::Ruby => InnerDisplayType::Flow,
            inner => inner,
        };
        Self {
            outer: OuterDisplayType::Block,
            inner,
            list_item: self.list_item,
        }
    }

    /// [§ 2 The display property](https://www.w3.org/TR/css-display-3/#the-display-properties)
    ///
    /// Parse a display keyword. Returns `None` for `none` and for
    /// unrecognized keywords (the latter with a warning).
    #[must_use]
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        let lower = keyword.trim().to_ascii_lowercase();
        let value = match lower.as_str() {
            // [§ 2.1 Outer Display Roles]
            "block" => Self::block(),
            "inline" => Self::inline(),

            // [§ 2.4 Combination Display Keywords]
            "flow-root" => Self::flow_root(),
            "inline-block" => Self::inline_block(),
            "list-item" => Self::list_item(),
            "table" => Self::table(),
            "inline-table" => Self::inline_table(),
            "flex" => Self::flex(),
            "inline-flex" => Self::inline_flex(),
            "grid" => Self::grid(),
            "inline-grid" => Self::new(OuterDisplayType::Inline, InnerDisplayType::Grid),
            "ruby" => Self::ruby(),

            // [§ 2.4 Layout-Internal Display Types]
            "table-row-group" => Self::table_part(TablePart::RowGroup),
            "table-header-group" => Self::table_part(TablePart::HeaderGroup),
            "table-footer-group" => Self::table_part(TablePart::FooterGroup),
            "table-row" => Self::table_part(TablePart::Row),
            "table-cell" => Self::table_part(TablePart::Cell),
            "table-column-group" => Self::table_part(TablePart::ColumnGroup),
            "table-column" => Self::table_part(TablePart::Column),
            "table-caption" => Self::table_part(TablePart::Caption),

            "none" => return None,
            _ => {
                let _ = warn_once("Style", &format!("unsupported display value '{keyword}'"));
                return None;
            }
        };
        Some(value)
    }

    /// The canonical keyword for this display value.
    #[must_use]
    pub const fn keyword(&self) -> &'static str {
        if self.list_item {
            return "list-item";
        }
        match (self.outer, self.inner) {
            (OuterDisplayType::Block, InnerDisplayType::Flow) => "block",
            (OuterDisplayType::Inline, InnerDisplayType::Flow) => "inline",
            (OuterDisplayType::Block, InnerDisplayType::FlowRoot) => "flow-root",
            (OuterDisplayType::Inline, InnerDisplayType::FlowRoot) => "inline-block",
            (OuterDisplayType::Block, InnerDisplayType::Table) => "table",
            (OuterDisplayType::Inline, InnerDisplayType::Table) => "inline-table",
            (OuterDisplayType::Block, InnerDisplayType::Flex) => "flex",
            (OuterDisplayType::Inline, InnerDisplayType::Flex) => "inline-flex",
            (OuterDisplayType::Block, InnerDisplayType::Grid) => "grid",
            (OuterDisplayType::Inline, InnerDisplayType::Grid) => "inline-grid",
            (_, InnerDisplayType::Ruby) => "ruby",
            (_, InnerDisplayType::TablePart(part)) => match part {
                TablePart::RowGroup => "table-row-group",
                TablePart::HeaderGroup => "table-header-group",
                TablePart::FooterGroup => "table-footer-group",
                TablePart::Row => "table-row",
                TablePart::Cell => "table-cell",
                TablePart::ColumnGroup => "table-column-group",
                TablePart::Column => "table-column",
                TablePart::Caption => "table-caption",
            },
        }
    }
}

impl Default for DisplayValue {
    /// "Initial: inline"
    fn default() -> Self {
        Self::inline()
    }
}

impl fmt::Display for DisplayValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

impl TryFrom<String> for DisplayValue {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_keyword(&value).ok_or_else(|| format!("unsupported display value '{value}'"))
    }
}

impl From<DisplayValue> for String {
    fn from(value: DisplayValue) -> Self {
        value.keyword().to_string()
    }
}
