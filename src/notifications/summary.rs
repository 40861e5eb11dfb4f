use crate::format::{format_date, format_money};
use crate::orders::Order;

/// Plain-text order summary used for the WhatsApp message and e-mail body
///
/// Output depends only on the order, so the same order always yields the
/// same text.
pub fn format_order_summary(order: &Order) -> String {
    let customer = &order.customer;

    let items = order
        .items
        .iter()
        .map(|line| {
            format!(
                "• {} ({}) - {} × {}",
                line.product_name,
                line.tier,
                line.quantity,
                format_money(line.unit_price, &order.currency)
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let mut summary = format!(
        "🛍️ *New Order*\n\n\
         *Order ID:* {id}\n\
         *Customer:* {name}\n\
         *Phone:* {phone}\n\
         *Email:* {email}\n\n\
         *Shipping Address:*\n\
         {address}\n\
         {city}, {state}\n\n\
         *Items Ordered:*\n\
         {items}\n\n\
         *Total Amount:* {total}\n\
         *Payment Method:* {payment}\n",
        id = order.id,
        name = customer.name,
        phone = customer.phone,
        email = customer.email,
        address = customer.address,
        city = customer.city,
        state = customer.state,
        items = items,
        total = format_money(order.total, &order.currency),
        payment = order.payment_method,
    );

    if let Some(notes) = order.notes.as_deref().filter(|n| !n.trim().is_empty()) {
        summary.push_str(&format!("*Notes:* {}\n", notes.trim()));
    }

    summary.push_str(&format!(
        "\n*Order Date:* {}\n\nPlease process this order. Thank you! 🙏",
        format_date(&order.created_at)
    ));
    summary
}
