use std::fmt::Write;

use super::models::EmailItem;

/// Minimal HTML escaping for user supplied text placed in email bodies.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(heading: &str, body: &str) -> String {
    format!(
        "<!doctype html><html><body style=\"font-family:Arial,sans-serif;color:#1f2937\">\
         <div style=\"max-width:600px;margin:0 auto;padding:24px\">\
         <h2 style=\"color:#0f766e\">{heading}</h2>{body}\
         <p style=\"font-size:12px;color:#6b7280\">FASTag Sales &amp; Support</p>\
         </div></body></html>"
    )
}

fn items_table(items: &[EmailItem]) -> String {
    if items.is_empty() {
        return String::new();
    }

    let mut rows = String::new();
    for item in items {
        let _ = write!(
            rows,
            "<tr><td>{}</td><td align=\"center\">{}</td><td align=\"right\">&#8377;{:.2}</td></tr>",
            escape(&item.name),
            item.quantity,
            item.price * f64::from(item.quantity)
        );
    }

    format!(
        "<table width=\"100%\" cellpadding=\"6\" style=\"border-collapse:collapse\">\
         <tr><th align=\"left\">Item</th><th>Qty</th><th align=\"right\">Amount</th></tr>{rows}</table>"
    )
}

pub fn order_confirmation(
    name: &str,
    order_id: &str,
    items: &[EmailItem],
    total: Option<f64>,
) -> (String, String) {
    let subject = format!("Order {order_id} confirmed");

    let mut body = format!(
        "<p>Hi {},</p><p>Thank you for your order. Your order id is <b>{}</b>.</p>",
        escape(name),
        escape(order_id)
    );
    body.push_str(&items_table(items));
    if let Some(total) = total {
        let _ = write!(body, "<p><b>Total: &#8377;{total:.2}</b></p>");
    }
    body.push_str("<p>Our team will contact you shortly to complete KYC and delivery.</p>");

    (subject, layout("Order confirmed", &body))
}

pub fn status_update(name: &str, order_id: &str, status: &str) -> (String, String) {
    let subject = format!("Order {order_id} is now {status}");

    let body = format!(
        "<p>Hi {},</p><p>The status of your order <b>{}</b> changed to <b>{}</b>.</p>",
        escape(name),
        escape(order_id),
        escape(status)
    );

    (subject, layout("Order update", &body))
}

/// Key/value alert for the sales inbox. Empty values are omitted.
pub fn sales_alert(heading: &str, fields: &[(&str, Option<&str>)]) -> String {
    let mut rows = String::new();
    for (label, value) in fields {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            let _ = write!(
                rows,
                "<tr><td><b>{}</b></td><td>{}</td></tr>",
                escape(label),
                escape(value)
            );
        }
    }

    layout(
        &escape(heading),
        &format!("<table cellpadding=\"4\">{rows}</table>"),
    )
}

/// Plain text variant of [`sales_alert`] for WhatsApp.
pub fn text_alert(heading: &str, fields: &[(&str, Option<&str>)]) -> String {
    let mut text = format!("*{heading}*");
    for (label, value) in fields {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            let _ = write!(text, "\n{label}: {value}");
        }
    }
    text
}
