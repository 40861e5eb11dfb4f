use serde::Serialize;

use crate::format::{currency_symbol, format_amount, format_date};
use crate::orders::Order;
use crate::settings::AdminSettings;

pub const DEFAULT_FOOTER: &str = "Thank you for your purchase!";
const DEFAULT_BUSINESS_NAME: &str = "Store";

/// Column captions of the items table
pub const TABLE_COLUMNS: [&str; 4] = ["Item", "Unit Price", "Qty", "Subtotal"];

/// How currency symbols are spelled in the output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolSet {
    /// Any Unicode symbol (HTML)
    Unicode,
    /// Only ASCII and Latin-1 symbols (PDF base fonts); others fall back to the code
    Latin1,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvoiceHeader {
    pub business_name: String,
    pub business_address: String,
    pub business_email: String,
    pub business_phone: String,
    pub title: String,
    pub invoice_id: String,
    pub date: String,
}

/// "Bill To" block
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvoiceParty {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address_lines: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvoiceRow {
    pub item: String,
    pub unit_price: String,
    pub quantity: String,
    pub subtotal: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TotalLine {
    pub label: String,
    pub amount: String,
    /// Rendered bold (grand total)
    pub emphasis: bool,
}

/// Renderer-independent description of an invoice
///
/// All text is final: money is already formatted with the order's currency
/// and prices come from the order's line snapshots.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvoiceLayout {
    pub header: InvoiceHeader,
    pub bill_to: InvoiceParty,
    pub rows: Vec<InvoiceRow>,
    pub totals: Vec<TotalLine>,
    pub footer: String,
}

impl InvoiceLayout {
    pub fn build(order: &Order, settings: &AdminSettings, symbols: SymbolSet) -> Self {
        let symbol = resolve_symbol(&order.currency, symbols);
        let money = |amount| format!("{}{}", symbol, format_amount(amount));

        let business_name = if settings.business_name.trim().is_empty() {
            DEFAULT_BUSINESS_NAME.to_string()
        } else {
            settings.business_name.clone()
        };

        let header = InvoiceHeader {
            business_name,
            business_address: settings.business_address.clone(),
            business_email: settings.business_email.clone(),
            business_phone: settings.business_phone.clone(),
            title: "Invoice".to_string(),
            invoice_id: order.id.clone(),
            date: format_date(&order.created_at),
        };

        let customer = &order.customer;
        let city_state = [customer.city.trim(), customer.state.trim()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(", ");
        let bill_to = InvoiceParty {
            name: customer.name.clone(),
            email: customer.email.clone(),
            phone: customer.phone.clone(),
            address_lines: [customer.address.trim().to_string(), city_state]
                .into_iter()
                .filter(|line| !line.is_empty())
                .collect(),
        };

        let rows = order
            .items
            .iter()
            .map(|line| InvoiceRow {
                item: format!("{} ({})", line.product_name, line.tier),
                unit_price: money(line.unit_price),
                quantity: line.quantity.to_string(),
                subtotal: money(line.line_total),
            })
            .collect();

        let mut totals = vec![TotalLine {
            label: "Subtotal".to_string(),
            amount: money(order.sub_total),
            emphasis: false,
        }];
        if !order.tax.is_zero() {
            totals.push(TotalLine {
                label: "Tax".to_string(),
                amount: money(order.tax),
                emphasis: false,
            });
        }
        totals.push(TotalLine {
            label: "Shipping".to_string(),
            amount: money(order.shipping_fee),
            emphasis: false,
        });
        if let Some(discount) = order.discount {
            totals.push(TotalLine {
                label: "Discount".to_string(),
                amount: format!("-{}", money(discount)),
                emphasis: false,
            });
        }
        totals.push(TotalLine {
            label: "Total".to_string(),
            amount: money(order.total),
            emphasis: true,
        });

        let footer = if settings.invoice_notes.trim().is_empty() {
            DEFAULT_FOOTER.to_string()
        } else {
            settings.invoice_notes.clone()
        };

        Self {
            header,
            bill_to,
            rows,
            totals,
            footer,
        }
    }
}

fn resolve_symbol(currency: &str, symbols: SymbolSet) -> String {
    let symbol = currency_symbol(currency);
    match symbols {
        SymbolSet::Unicode => symbol,
        SymbolSet::Latin1 if symbol.chars().all(crate::invoice::pdf::is_printable) => symbol,
        SymbolSet::Latin1 => format!("{} ", currency.trim().to_uppercase()),
    }
}
