//! Invoice rendering.
//!
//! An order and the store settings are first turned into an
//! [`InvoiceLayout`]; the PDF and HTML renderers only draw that layout.

pub mod error;
pub mod html;
pub mod layout;
pub mod pdf;

pub use error::*;
pub use html::HtmlRenderer;
pub use layout::{InvoiceLayout, SymbolSet};
pub use pdf::PdfRenderer;

use crate::orders::Order;
use crate::settings::AdminSettings;

/// Entry points used by handlers and the notification worker
pub struct InvoiceRenderer;

impl InvoiceRenderer {
    /// PDF bytes for download and e-mail attachments
    pub fn render_pdf(order: &Order, settings: &AdminSettings) -> Result<Vec<u8>, RenderError> {
        let layout = InvoiceLayout::build(order, settings, SymbolSet::Latin1);
        PdfRenderer::render(&layout)
    }

    /// Printable HTML page
    pub fn render_html(order: &Order, settings: &AdminSettings) -> Result<String, RenderError> {
        let layout = InvoiceLayout::build(order, settings, SymbolSet::Unicode);
        HtmlRenderer::render(&layout)
    }
}
