use askama::Template;

use crate::invoice::layout::{InvoiceLayout, TABLE_COLUMNS};
use crate::invoice::RenderError;

/// Printable HTML invoice page
#[derive(Template)]
#[template(path = "invoice.html")]
struct InvoicePage<'a> {
    layout: &'a InvoiceLayout,
    columns: [&'static str; 4],
}

/// Renders an [`InvoiceLayout`] as a standalone HTML page
pub struct HtmlRenderer;

impl HtmlRenderer {
    pub fn render(layout: &InvoiceLayout) -> Result<String, RenderError> {
        let page = InvoicePage {
            layout,
            columns: TABLE_COLUMNS,
        };
        Ok(page.render()?)
    }
}
