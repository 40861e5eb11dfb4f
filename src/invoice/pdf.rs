//! Invoice PDF output.
//!
//! The layout is first planned into pages of draw operations, then written
//! with `pdf-writer`. Pages are A4 portrait and use the standard Helvetica
//! and Courier Type1 fonts with WinAnsi encoding, so no font data is
//! embedded. Amount columns are set in Courier, whose glyphs share one
//! advance width, which lets them be right-aligned without font metrics. No
//! dates are written, so identical layouts give identical bytes.

use pdf_writer::{Content, Finish, Name, Pdf, Rect, Ref, Str, TextStr};

use crate::invoice::layout::{InvoiceLayout, TABLE_COLUMNS};
use crate::invoice::RenderError;

pub const PAGE_WIDTH: f32 = 595.0;
pub const PAGE_HEIGHT: f32 = 842.0;
const MARGIN: f32 = 50.0;
const CONTENT_RIGHT: f32 = PAGE_WIDTH - MARGIN;
/// Space kept free at the bottom of each page for the page number
const FOOTER_RESERVE: f32 = 20.0;
const MAX_PAGES: usize = 500;

const ROW_HEIGHT: f32 = 18.0;
const TOTAL_LINE_HEIGHT: f32 = 16.0;
const TEXT_LINE_HEIGHT: f32 = 14.0;

const RIGHT_BLOCK_X: f32 = 360.0;
const TOTALS_LABEL_X: f32 = 330.0;
// Right edges of the numeric columns; the item column starts at the margin
const UNIT_PRICE_RIGHT: f32 = 390.0;
const QTY_RIGHT: f32 = 450.0;

// Character budgets for proportional text
const BUSINESS_NAME_CHARS: usize = 28;
const HEADER_LINE_CHARS: usize = 52;
const ITEM_CHARS: usize = 44;
const TEXT_LINE_CHARS: usize = 90;

/// Courier advance width in 1/1000 em, identical for every glyph
const MONO_ADVANCE: f32 = 600.0;
const MUTED_GRAY: f32 = 0.45;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    Regular,
    Bold,
    Mono,
    MonoBold,
}

impl Font {
    const ALL: [Font; 4] = [Font::Regular, Font::Bold, Font::Mono, Font::MonoBold];

    fn resource(&self) -> Name<'static> {
        match self {
            Font::Regular => Name(b"F1"),
            Font::Bold => Name(b"F2"),
            Font::Mono => Name(b"F3"),
            Font::MonoBold => Name(b"F4"),
        }
    }

    fn base_font(&self) -> Name<'static> {
        match self {
            Font::Regular => Name(b"Helvetica"),
            Font::Bold => Name(b"Helvetica-Bold"),
            Font::Mono => Name(b"Courier"),
            Font::MonoBold => Name(b"Courier-Bold"),
        }
    }
}

/// Whether the base fonts can show `c` through WinAnsiEncoding without a
/// lookup (ASCII and Latin-1 share their code points there)
pub fn is_printable(c: char) -> bool {
    matches!(c as u32, 0x20..=0x7E | 0xA0..=0xFF)
}

/// Single-byte string for a text operator; unsupported characters become `?`
fn encode(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| if is_printable(c) { c as u8 } else { b'?' })
        .collect()
}

/// Rendered width of `text` set in Courier at `size` points
pub fn mono_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * MONO_ADVANCE * size / 1000.0
}

/// Shorten `text` with a trailing ellipsis so it keeps within `max_chars`
fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{}...", kept.trim_end())
}

/// Greedy word wrap by character count; longer words keep their own line
fn wrap(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.lines() {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            if current.is_empty() {
                current = word.to_string();
            } else if current.chars().count() + 1 + word.chars().count() <= max_chars {
                current.push(' ');
                current.push_str(word);
            } else {
                lines.push(std::mem::replace(&mut current, word.to_string()));
            }
        }
        lines.push(current);
    }
    lines
}

/// One positioned drawing step on a page
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Text {
        font: Font,
        size: f32,
        x: f32,
        y: f32,
        text: String,
        muted: bool,
    },
    Rule {
        y: f32,
    },
}

/// Lays draw operations out top to bottom, breaking pages as needed
struct PageComposer {
    pages: Vec<Vec<DrawOp>>,
    current: Vec<DrawOp>,
    /// Top of the next line
    y: f32,
    muted: bool,
}

impl PageComposer {
    fn new() -> Self {
        Self {
            pages: Vec::new(),
            current: Vec::new(),
            y: PAGE_HEIGHT - MARGIN,
            muted: false,
        }
    }

    fn fits(&self, height: f32) -> bool {
        self.y - height >= MARGIN + FOOTER_RESERVE
    }

    fn new_page(&mut self) {
        self.pages.push(std::mem::take(&mut self.current));
        self.y = PAGE_HEIGHT - MARGIN;
    }

    /// Reserve a line of `height` and return its baseline
    fn next_line(&mut self, height: f32) -> f32 {
        self.y -= height;
        self.y + 4.0
    }

    fn advance(&mut self, height: f32) {
        self.y -= height;
    }

    fn text(&mut self, font: Font, size: f32, x: f32, baseline: f32, text: &str) {
        if text.is_empty() {
            return;
        }
        self.current.push(DrawOp::Text {
            font,
            size,
            x,
            y: baseline,
            text: text.to_string(),
            muted: self.muted,
        });
    }

    /// Right-aligned text, always set in Courier
    fn text_right(&mut self, bold: bool, size: f32, right: f32, baseline: f32, text: &str) {
        let font = if bold { Font::MonoBold } else { Font::Mono };
        self.text(font, size, right - mono_width(text, size), baseline, text);
    }

    fn rule(&mut self, y: f32) {
        self.current.push(DrawOp::Rule { y });
    }

    fn finish(mut self) -> Vec<Vec<DrawOp>> {
        self.pages.push(self.current);
        self.pages
    }
}

/// Renders an [`InvoiceLayout`] to PDF bytes
pub struct PdfRenderer;

impl PdfRenderer {
    pub fn render(layout: &InvoiceLayout) -> Result<Vec<u8>, RenderError> {
        let pages = Self::plan(layout)?;
        Ok(write_document(&pages, &format!("Invoice {}", layout.header.invoice_id)))
    }

    /// Page-by-page draw operations, page numbers included
    pub fn plan(layout: &InvoiceLayout) -> Result<Vec<Vec<DrawOp>>, RenderError> {
        let mut page = PageComposer::new();

        write_header(&mut page, layout);
        write_bill_to(&mut page, layout);
        write_table(&mut page, layout);
        write_totals(&mut page, layout);
        write_footer(&mut page, layout);

        let mut pages = page.finish();
        if pages.len() > MAX_PAGES {
            return Err(RenderError::TooManyPages {
                order_id: layout.header.invoice_id.clone(),
                pages: pages.len(),
                limit: MAX_PAGES,
            });
        }

        let count = pages.len();
        for (index, ops) in pages.iter_mut().enumerate() {
            let label = format!("Page {} of {}", index + 1, count);
            ops.push(DrawOp::Text {
                font: Font::Mono,
                size: 8.0,
                x: (PAGE_WIDTH - mono_width(&label, 8.0)) / 2.0,
                y: MARGIN - 20.0,
                text: label,
                muted: true,
            });
        }
        Ok(pages)
    }
}

fn write_header(page: &mut PageComposer, layout: &InvoiceLayout) {
    let header = &layout.header;

    let baseline = page.next_line(24.0);
    page.text(Font::Bold, 20.0, MARGIN, baseline, &truncate(&header.business_name, BUSINESS_NAME_CHARS));
    page.text(Font::Bold, 16.0, RIGHT_BLOCK_X, baseline, &header.title);

    let left: Vec<&str> = [
        header.business_address.as_str(),
        header.business_email.as_str(),
        header.business_phone.as_str(),
    ]
    .into_iter()
    .filter(|line| !line.trim().is_empty())
    .collect();
    let right = [
        format!("Invoice ID: {}", header.invoice_id),
        format!("Date: {}", header.date),
    ];

    for index in 0..left.len().max(right.len()) {
        let baseline = page.next_line(TEXT_LINE_HEIGHT);
        if let Some(line) = left.get(index) {
            page.muted = true;
            page.text(Font::Regular, 10.0, MARGIN, baseline, &truncate(line, HEADER_LINE_CHARS));
            page.muted = false;
        }
        if let Some(line) = right.get(index) {
            page.text(Font::Regular, 10.0, RIGHT_BLOCK_X, baseline, line);
        }
    }

    page.advance(20.0);
}

fn write_bill_to(page: &mut PageComposer, layout: &InvoiceLayout) {
    let party = &layout.bill_to;

    let baseline = page.next_line(16.0);
    page.text(Font::Bold, 12.0, MARGIN, baseline, "Bill To:");

    let lines = std::iter::once(&party.name)
        .chain(std::iter::once(&party.email))
        .chain(std::iter::once(&party.phone))
        .chain(party.address_lines.iter())
        .filter(|line| !line.trim().is_empty());
    for line in lines {
        let baseline = page.next_line(TEXT_LINE_HEIGHT);
        page.text(Font::Regular, 10.0, MARGIN, baseline, &truncate(line, TEXT_LINE_CHARS));
    }

    page.advance(20.0);
}

fn write_table_header(page: &mut PageComposer) {
    let baseline = page.next_line(16.0);
    let [item, unit_price, qty, subtotal] = TABLE_COLUMNS;
    page.text(Font::Bold, 10.0, MARGIN, baseline, item);
    page.text_right(true, 10.0, UNIT_PRICE_RIGHT, baseline, unit_price);
    page.text_right(true, 10.0, QTY_RIGHT, baseline, qty);
    page.text_right(true, 10.0, CONTENT_RIGHT, baseline, subtotal);
    page.rule(baseline - 5.0);
    page.advance(4.0);
}

fn write_table(page: &mut PageComposer, layout: &InvoiceLayout) {
    write_table_header(page);

    for row in &layout.rows {
        if !page.fits(ROW_HEIGHT) {
            page.new_page();
            write_table_header(page);
        }
        let baseline = page.next_line(ROW_HEIGHT);
        page.text(Font::Regular, 10.0, MARGIN, baseline, &truncate(&row.item, ITEM_CHARS));
        page.text_right(false, 10.0, UNIT_PRICE_RIGHT, baseline, &row.unit_price);
        page.text_right(false, 10.0, QTY_RIGHT, baseline, &row.quantity);
        page.text_right(false, 10.0, CONTENT_RIGHT, baseline, &row.subtotal);
    }

    let rule_y = page.y - 4.0;
    page.rule(rule_y);
    page.advance(12.0);
}

fn write_totals(page: &mut PageComposer, layout: &InvoiceLayout) {
    let needed = TOTAL_LINE_HEIGHT * layout.totals.len() as f32;
    if !page.fits(needed) {
        page.new_page();
    }

    for line in &layout.totals {
        let baseline = page.next_line(TOTAL_LINE_HEIGHT);
        let (font, size) = if line.emphasis { (Font::Bold, 12.0) } else { (Font::Regular, 10.0) };
        page.text(font, size, TOTALS_LABEL_X, baseline, &line.label);
        page.text_right(line.emphasis, size, CONTENT_RIGHT, baseline, &line.amount);
    }
}

fn write_footer(page: &mut PageComposer, layout: &InvoiceLayout) {
    page.advance(24.0);
    page.muted = true;
    for line in wrap(&layout.footer, TEXT_LINE_CHARS) {
        if !page.fits(TEXT_LINE_HEIGHT) {
            page.new_page();
        }
        let baseline = page.next_line(TEXT_LINE_HEIGHT);
        page.text(Font::Regular, 10.0, MARGIN, baseline, &line);
    }
    page.muted = false;
}

fn content_stream(ops: &[DrawOp]) -> Vec<u8> {
    let mut content = Content::new();
    for op in ops {
        match op {
            DrawOp::Text {
                font,
                size,
                x,
                y,
                text,
                muted,
            } => {
                content.set_fill_gray(if *muted { MUTED_GRAY } else { 0.0 });
                content.begin_text();
                content.set_font(font.resource(), *size);
                content.next_line(*x, *y);
                content.show(Str(&encode(text)));
                content.end_text();
            }
            DrawOp::Rule { y } => {
                content.set_line_width(0.5);
                content.move_to(MARGIN, *y);
                content.line_to(CONTENT_RIGHT, *y);
                content.stroke();
            }
        }
    }
    content.finish()
}

/// Serialize planned pages into a complete PDF file
fn write_document(pages: &[Vec<DrawOp>], title: &str) -> Vec<u8> {
    let catalog_id = Ref::new(1);
    let page_tree_id = Ref::new(2);
    let info_id = Ref::new(3);
    let font_id = |font: Font| match font {
        Font::Regular => Ref::new(4),
        Font::Bold => Ref::new(5),
        Font::Mono => Ref::new(6),
        Font::MonoBold => Ref::new(7),
    };
    // (page, content) pairs follow the fonts
    let page_id = |index: usize| Ref::new(8 + 2 * index as i32);
    let content_id = |index: usize| Ref::new(9 + 2 * index as i32);

    let mut pdf = Pdf::new();
    pdf.catalog(catalog_id).pages(page_tree_id);
    pdf.pages(page_tree_id)
        .kids((0..pages.len()).map(page_id))
        .count(pages.len() as i32);
    pdf.document_info(info_id)
        .title(TextStr(title))
        .producer(TextStr("bliss-store"));

    for font in Font::ALL {
        pdf.type1_font(font_id(font))
            .base_font(font.base_font())
            .encoding_predefined(Name(b"WinAnsiEncoding"));
    }

    for (index, ops) in pages.iter().enumerate() {
        let mut page = pdf.page(page_id(index));
        page.media_box(Rect::new(0.0, 0.0, PAGE_WIDTH, PAGE_HEIGHT));
        page.parent(page_tree_id);
        page.contents(content_id(index));
        page.resources()
            .fonts()
            .pair(Font::Regular.resource(), font_id(Font::Regular))
            .pair(Font::Bold.resource(), font_id(Font::Bold))
            .pair(Font::Mono.resource(), font_id(Font::Mono))
            .pair(Font::MonoBold.resource(), font_id(Font::MonoBold));
        page.finish();

        pdf.stream(content_id(index), &content_stream(ops));
    }

    pdf.finish()
}
