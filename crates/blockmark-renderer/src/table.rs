//! Table row rendering.

use crate::ast::Cell;
use crate::context::RenderContext;
use crate::inline::InlineConverter;

/// Element used for the cells of a row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CellTag {
    /// Header cell, `<th>`.
    Header,
    /// Body cell, `<td>`.
    Data,
}

impl CellTag {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Header => "th",
            Self::Data => "td",
        }
    }
}

/// Render each row as `<tr>` with one `cell_tag` element per cell.
///
/// Cells are concatenated without separators, rows end with a newline.
pub fn render_rows<C: InlineConverter + ?Sized>(
    converter: &C,
    ctx: &RenderContext,
    rows: &[Vec<Cell>],
    cell_tag: CellTag,
    out: &mut String,
) {
    let tag = cell_tag.name();
    for row in rows {
        out.push_str("<tr>");
        for cell in row {
            out.push('<');
            out.push_str(tag);
            out.push('>');
            converter.convert(cell, ctx, out);
            out.push_str("</");
            out.push_str(tag);
            out.push('>');
        }
        out.push_str("</tr>\n");
    }
}
