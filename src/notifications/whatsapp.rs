use crate::notifications::format_order_summary;
use crate::orders::Order;

const WHATSAPP_BASE_URL: &str = "https://wa.me";

/// Deep link that opens a WhatsApp chat with `channel` pre-filled with the
/// order summary
pub fn build_notification_link(order: &Order, channel: &str) -> String {
    let message = format_order_summary(order);
    format!(
        "{}/{}?text={}",
        WHATSAPP_BASE_URL,
        channel.trim(),
        urlencoding::encode(&message)
    )
}
