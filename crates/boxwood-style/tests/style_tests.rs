//! Integration tests for the style snapshot.

use boxwood_style::{
    AutoLength, ComputedStyle, DisplayValue, FloatSide, Overflow, PositionType, WritingMode,
};

#[test]
fn test_style_deserializes_from_kebab_case_json() {
    let json = r#"{
        "display": "inline-block",
        "position": "absolute",
        "overflow-x": "hidden",
        "height": { "percent": 50.0 },
        "writing-mode": "vertical-rl"
    }"#;
    let style: ComputedStyle = serde_json::from_str(json).unwrap();

    assert_eq!(style.display, DisplayValue::inline_block());
    assert_eq!(style.position, PositionType::Absolute);
    assert_eq!(style.overflow_x, Overflow::Hidden);
    assert_eq!(style.overflow_y, Overflow::Visible);
    assert_eq!(style.height, AutoLength::Percent(50.0));
    assert_eq!(style.writing_mode, WritingMode::VerticalRl);
    assert!(style.has_overflow_clip());
}

#[test]
fn test_missing_fields_take_initial_values() {
    let style: ComputedStyle = serde_json::from_str("{}").unwrap();
    assert_eq!(style, ComputedStyle::default());
    assert_eq!(style.display, DisplayValue::inline());
}

#[test]
fn test_unknown_display_keyword_is_a_deserialize_error() {
    let result: Result<ComputedStyle, _> = serde_json::from_str(r#"{ "display": "bogus" }"#);
    assert!(result.is_err());
}

#[test]
fn test_display_serializes_as_keyword() {
    let json = serde_json::to_string(&DisplayValue::table_part(boxwood_style::TablePart::Row)).unwrap();
    assert_eq!(json, r#""table-row""#);
}

#[test]
fn test_inline_level_excludes_floats_and_out_of_flow() {
    assert!(ComputedStyle::inline().is_inline_level());
    assert!(!ComputedStyle::inline().floated(FloatSide::Left).is_inline_level());
    assert!(
        !ComputedStyle::inline()
            .positioned(PositionType::Fixed)
            .is_inline_level()
    );
    assert!(ComputedStyle::with_display(DisplayValue::inline_block()).is_inline_level());
}

#[test]
fn test_anonymous_block_inherits_writing_mode_only() {
    let parent = ComputedStyle::block()
        .with_writing_mode(WritingMode::VerticalLr)
        .overflowing(Overflow::Scroll);
    let anonymous = ComputedStyle::anonymous_block_of(&parent);
    assert_eq!(anonymous.writing_mode, WritingMode::VerticalLr);
    assert_eq!(anonymous.overflow_x, Overflow::Visible);
    assert_eq!(anonymous.display, DisplayValue::block());
}
