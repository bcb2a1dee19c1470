//! Content-driven block size estimation.
//!
//! Collapsed cards have a fixed size. Expanded cards are as wide as their widest line of text
//! (measured through the [`TextMeasurer`] oracle) and as tall as their four sections, counting
//! rows revealed by nested expansion.

use crate::constants::LayoutConstants;
use crate::geom::{Size, size};
use crate::model::{BlockSizes, ClassIndex, DiagramClass, ExpandedFlags, NestedFlags};
use crate::nesting::expanded_sections;
use crate::text::{TextMeasurer, TextStyle};

const SECTION_LABELS: [&str; 4] = ["Parent:", "Properties:", "Components:", "Children:"];

pub fn format_typed_name(type_name: &str, name: &str, default_value: &str) -> String {
    if default_value.is_empty() {
        format!("{type_name}: {name}")
    } else {
        format!("{type_name}: {name} = {default_value}")
    }
}

/// Estimates block sizes for a whole diagram. Thin wrapper over [`BlockSizer`].
pub fn compute_block_sizes(
    classes: &[DiagramClass],
    expanded: &ExpandedFlags,
    nested: &NestedFlags,
    measurer: &dyn TextMeasurer,
    style: &TextStyle,
    constants: &LayoutConstants,
) -> BlockSizes {
    let index = ClassIndex::new(classes);
    let sizer = BlockSizer {
        index: &index,
        measurer,
        style,
        constants,
    };
    classes
        .iter()
        .map(|c| {
            let is_expanded = expanded.get(&c.id).copied().unwrap_or(false);
            (c.id.clone(), sizer.block_size(c, is_expanded, nested))
        })
        .collect()
}

pub struct BlockSizer<'a> {
    pub index: &'a ClassIndex<'a>,
    pub measurer: &'a dyn TextMeasurer,
    pub style: &'a TextStyle,
    pub constants: &'a LayoutConstants,
}

impl BlockSizer<'_> {
    pub fn collapsed_size(&self) -> Size {
        size(self.constants.collapsed_width, self.constants.collapsed_height)
    }

    pub fn block_size(&self, class: &DiagramClass, expanded: bool, nested: &NestedFlags) -> Size {
        if expanded {
            self.expanded_size(class, nested)
        } else {
            self.collapsed_size()
        }
    }

    pub fn expanded_size(&self, class: &DiagramClass, nested: &NestedFlags) -> Size {
        let c = self.constants;
        let text_w = |s: &str| self.measurer.width(s, self.style);

        let header_text_w = text_w(&class.type_name);
        let mut max_text_w = header_text_w;
        for label in SECTION_LABELS {
            max_text_w = max_text_w.max(text_w(label));
        }

        for parent_id in &class.parent_class_ids {
            max_text_w = max_text_w.max(text_w(self.index.display_name(parent_id)));
        }
        for p in &class.properties {
            let line = format_typed_name(&p.type_name, &p.name, &p.default_value);
            max_text_w = max_text_w.max(text_w(&line));
        }
        let sub_indent = c.content_indent * 2.0;
        for comp in &class.components {
            max_text_w = max_text_w.max(text_w(&format!("{}: {}", comp.type_name, comp.name)));
            for p in &comp.properties {
                let line = format_typed_name(&p.type_name, &p.name, &p.default_value);
                max_text_w = max_text_w.max(text_w(&line) + sub_indent);
            }
        }
        for co in &class.child_objects {
            let type_name = self.index.display_name(&co.class_id);
            let name_part = if co.label.is_empty() {
                type_name
            } else {
                co.label.as_str()
            };
            max_text_w = max_text_w.max(text_w(&format!("{type_name}: {name_part}")));
        }

        let sections = expanded_sections(self.index, class, nested, c.max_nesting_depth);
        for row in sections.parent_rows.iter().chain(sections.child_rows.iter()) {
            let indent = c.nesting_indent * row.depth as f64 + c.nested_button_size;
            max_text_w = max_text_w.max(text_w(&row.label) + indent);
        }

        let content_area_w = 2.0 * c.content_inset_side + c.content_width_padding() + max_text_w;
        let header_w = 2.0 * c.padding + header_text_w + c.button_size;
        let width = c
            .expanded_min_width
            .max(content_area_w)
            .max(header_w)
            .max(2.0 * c.padding + c.button_size);

        let component_rows = class.components.len()
            + class
                .components
                .iter()
                .map(|comp| comp.properties.len())
                .sum::<usize>();
        let row_h = c.effective_row_height(self.style.font_size);
        let height = c.header_height
            + c.content_inset_top
            + c.header_content_gap
            + c.expanded_content_height(
                class.parent_class_ids.len() + sections.parent_rows.len(),
                class.properties.len(),
                component_rows,
                class.child_objects.len() + sections.child_rows.len(),
                row_h,
            )
            + c.content_inset_bottom;

        size(width, height)
    }
}
