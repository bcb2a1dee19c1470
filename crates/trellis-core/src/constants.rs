//! Block metrics shared by the size estimator, the planner and the settling engine.
//!
//! All values are world units. A renderer drawing the cards is expected to use the same table so
//! that estimated sizes match what ends up on screen.

use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LayoutConstants {
    pub button_size: f64,
    pub padding: f64,
    pub header_height: f64,
    pub section_header_height: f64,
    /// Base row height; text is centered inside each row.
    pub row_height: f64,
    pub row_vertical_text_padding: f64,
    pub accent_bar_width: f64,
    pub content_indent: f64,
    pub content_inset_top: f64,
    pub content_inset_bottom: f64,
    pub content_inset_side: f64,
    pub header_content_gap: f64,

    pub collapsed_width: f64,
    pub collapsed_height: f64,
    pub expanded_min_width: f64,

    /// Horizontal gap between packed blocks in a planner row.
    pub block_margin: f64,
    /// Extra clearance between settled blocks; half of it inflates each collider.
    pub gap: f64,

    /// Extra left indent per nesting level for inline-expanded rows.
    pub nesting_indent: f64,
    pub nested_button_size: f64,
    pub max_nesting_depth: usize,
}

impl Default for LayoutConstants {
    fn default() -> Self {
        Self {
            button_size: 20.0,
            padding: 8.0,
            header_height: 28.0,
            section_header_height: 20.0,
            row_height: 18.0,
            row_vertical_text_padding: 2.0,
            accent_bar_width: 3.0,
            content_indent: 4.0,
            content_inset_top: 6.0,
            content_inset_bottom: 10.0,
            content_inset_side: 6.0,
            header_content_gap: 4.0,
            collapsed_width: 140.0,
            collapsed_height: 32.0,
            expanded_min_width: 180.0,
            block_margin: 16.0,
            gap: 8.0,
            nesting_indent: 14.0,
            nested_button_size: 14.0,
            max_nesting_depth: 10,
        }
    }
}

impl LayoutConstants {
    /// Spacing between adjacent rows of one section (a third of a row).
    pub fn row_inner_gap(&self) -> f64 {
        self.row_height * 0.33
    }

    /// Spacing between sections.
    pub fn group_vertical_gap(&self) -> f64 {
        self.row_inner_gap() * 1.75
    }

    /// Left offset of row text from the content area's left edge.
    pub fn content_left_offset(&self) -> f64 {
        self.padding + self.accent_bar_width + self.content_indent
    }

    pub fn content_width_padding(&self) -> f64 {
        self.content_left_offset() + self.padding
    }

    /// Lower bound on the row height for a font of the given world height.
    pub fn min_row_height_for_font(&self, font_world_height: f64) -> f64 {
        font_world_height + 2.0 * self.row_vertical_text_padding
    }

    pub fn effective_row_height(&self, font_world_height: f64) -> f64 {
        self.row_height.max(self.min_row_height_for_font(font_world_height))
    }

    /// Height of the four expanded sections (Parent / Properties / Components / Children)
    /// without the outer insets and header. Empty sections still render a placeholder row.
    pub fn expanded_content_height(
        &self,
        parent_items: usize,
        prop_items: usize,
        comp_items: usize,
        child_items: usize,
        effective_row_height: f64,
    ) -> f64 {
        let visible = |n: usize| visible_item_rows(n) as f64;
        let parent = visible(parent_items);
        let props = visible(prop_items);
        let comps = visible(comp_items);
        let children = visible(child_items);

        let (row_gap_ratio, group_gap_ratio) = if self.row_height > 0.0 {
            (
                self.row_inner_gap() / self.row_height,
                self.group_vertical_gap() / self.row_height,
            )
        } else {
            (0.0, 0.0)
        };
        let row_gap = effective_row_height * row_gap_ratio;
        let group_gap = effective_row_height * group_gap_ratio;

        // One header row per section plus its visible item rows.
        (4.0 + parent + props + comps + children) * effective_row_height
            + (parent + props + comps + children) * row_gap
            + 3.0 * group_gap
    }
}

pub fn visible_item_rows(raw_rows: usize) -> usize {
    raw_rows.max(1)
}
