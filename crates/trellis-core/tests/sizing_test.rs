use float_cmp::approx_eq;
use trellis_core::nesting::expanded_sections;
use trellis_core::{
    ClassIndex, DeterministicTextMeasurer, DiagramClass, ExpandedFlags, LayoutConstants,
    NestedFlags, TextStyle, compute_block_sizes,
};

fn expanded(ids: &[&str]) -> ExpandedFlags {
    ids.iter().map(|id| (id.to_string(), true)).collect()
}

fn style() -> TextStyle {
    TextStyle {
        font_family: None,
        font_size: 10.0,
    }
}

#[test]
fn collapsed_blocks_use_fixed_size() {
    let classes = vec![DiagramClass::new("A")];
    let sizes = compute_block_sizes(
        &classes,
        &ExpandedFlags::default(),
        &NestedFlags::default(),
        &DeterministicTextMeasurer::default(),
        &style(),
        &LayoutConstants::default(),
    );
    assert_eq!(sizes["A"].width, 140.0);
    assert_eq!(sizes["A"].height, 32.0);
}

#[test]
fn expanded_block_has_minimum_width_and_one_row_per_empty_section() {
    let c = LayoutConstants::default();
    let classes = vec![DiagramClass::new("A")];
    let sizes = compute_block_sizes(
        &classes,
        &expanded(&["A"]),
        &NestedFlags::default(),
        &DeterministicTextMeasurer::default(),
        &style(),
        &c,
    );
    let row_h = c.effective_row_height(10.0);
    let expected_h = c.header_height
        + c.content_inset_top
        + c.header_content_gap
        + c.expanded_content_height(0, 0, 0, 0, row_h)
        + c.content_inset_bottom;
    assert_eq!(sizes["A"].width, c.expanded_min_width);
    assert!(approx_eq!(f64, sizes["A"].height, expected_h, epsilon = 1e-9));
}

#[test]
fn long_property_line_widens_the_block() {
    let c = LayoutConstants::default();
    let measurer = DeterministicTextMeasurer {
        char_width_factor: 1.0,
        line_height_factor: 1.0,
    };
    let long = "x".repeat(40);
    let classes = vec![DiagramClass::new("A").with_property(long.clone(), "int")];
    let sizes = compute_block_sizes(
        &classes,
        &expanded(&["A"]),
        &NestedFlags::default(),
        &measurer,
        &style(),
        &c,
    );
    // "int: xxxx..." = 5 + 40 characters at 10 units each.
    let text_w = 45.0 * 10.0;
    let expected = 2.0 * c.content_inset_side + c.content_width_padding() + text_w;
    assert!(approx_eq!(f64, sizes["A"].width, expected, epsilon = 1e-9));
}

#[test]
fn nested_expansion_adds_rows_to_the_owning_block() {
    let classes = vec![
        DiagramClass::new("Base").with_parent("Root").with_child("Item", "item"),
        DiagramClass::new("Player").with_parent("Base"),
        DiagramClass::new("Root"),
        DiagramClass::new("Item"),
    ];
    let flags = expanded(&["Player"]);
    let measurer = DeterministicTextMeasurer::default();
    let c = LayoutConstants::default();

    let plain = compute_block_sizes(&classes, &flags, &NestedFlags::default(), &measurer, &style(), &c);
    let nested: NestedFlags = [("Player/parent/0".to_string(), true)].into_iter().collect();
    let grown = compute_block_sizes(&classes, &flags, &nested, &measurer, &style(), &c);

    let idx = ClassIndex::new(&classes);
    let extra = expanded_sections(&idx, &classes[1], &nested, c.max_nesting_depth).extra_row_count();
    assert_eq!(extra, 2);
    assert!(grown["Player"].height > plain["Player"].height);
    assert_eq!(grown["Base"], plain["Base"]);
}
