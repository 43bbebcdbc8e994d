//! Server-rendered HTML for the diner, waiter and admin pages. These views
//! are intentionally thin: markup as plain strings, a shared shell and an
//! escaping helper. JSON endpoints never come through here.

use crate::models::{MenuItemEntity, OrderEntity};

/// One rendered line of an order, already joined with its menu item name.
pub struct ItemLine {
    pub name: String,
    pub quantity: i32,
    pub customization: Option<String>,
}

/// An order prepared for a staff view: entity plus business-local creation
/// time and its joined lines.
pub struct OrderRow {
    pub order: OrderEntity,
    pub created_local: String,
    pub items: Vec<ItemLine>,
}

pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
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

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{title}</title>\n\
         <style>\n\
         body {{ font-family: sans-serif; margin: 1.5rem; color: #222; }}\n\
         h1, h2 {{ margin-bottom: 0.5rem; }}\n\
         table {{ border-collapse: collapse; width: 100%; margin-bottom: 1rem; }}\n\
         th, td {{ border: 1px solid #ccc; padding: 0.4rem 0.6rem; text-align: left; }}\n\
         .flash {{ background: #e7f5e7; border: 1px solid #9c9; padding: 0.5rem; margin-bottom: 1rem; }}\n\
         .menu-item {{ border-bottom: 1px solid #eee; padding: 0.5rem 0; }}\n\
         .menu-item img {{ max-height: 80px; vertical-align: middle; }}\n\
         .badge {{ background: #eef; border-radius: 4px; padding: 0 0.4rem; font-size: 0.8rem; }}\n\
         form.inline {{ display: inline; }}\n\
         </style>\n</head>\n<body>\n{body}\n</body>\n</html>",
        title = escape(title),
        body = body,
    )
}

fn flash_banner(flash: Option<&str>) -> String {
    match flash {
        Some(msg) => format!("<div class=\"flash\">{}</div>", escape(msg)),
        None => String::new(),
    }
}

fn menu_item_card(item: &MenuItemEntity) -> String {
    let image = match &item.image_filename {
        Some(filename) => format!("<img src=\"/images/{}\" alt=\"\">", escape(filename)),
        None => String::new(),
    };
    let customizable = if item.customizable {
        "<span class=\"badge\">customizable</span>"
    } else {
        ""
    };
    let display_date = match item.display_date {
        Some(date) => format!("<span class=\"badge\">{date}</span>"),
        None => String::new(),
    };
    format!(
        "<div class=\"menu-item\" data-item-id=\"{id}\" data-price=\"{price}\">\n\
         {image}<strong>{name}</strong> — {price:.2} {customizable} {display_date}\n\
         <p>{description}</p>\n\
         <label>Qty <input type=\"number\" min=\"0\" value=\"0\" class=\"qty\"></label>\n\
         {customization_input}\n\
         </div>",
        id = item.id,
        price = item.price,
        image = image,
        name = escape(&item.name),
        customizable = customizable,
        display_date = display_date,
        description = escape(&item.description),
        customization_input = if item.customizable {
            "<input type=\"text\" class=\"customization\" placeholder=\"Customization (+5.00 per unit)\">"
        } else {
            ""
        },
    )
}

pub fn menu_page(table_id: i32, groups: &[(String, Vec<MenuItemEntity>)]) -> String {
    let mut sections = String::new();
    for (category, items) in groups {
        if items.is_empty() {
            continue;
        }
        sections.push_str(&format!("<h2>{}</h2>\n", escape(category)));
        for item in items {
            sections.push_str(&menu_item_card(item));
            sections.push('\n');
        }
    }

    let body = format!(
        "<h1>Menu — table {table_id}</h1>\n{sections}\n\
         <button id=\"place-order\">Place order</button>\n\
         <script>\n\
         document.getElementById('place-order').addEventListener('click', async () => {{\n\
           const items = [];\n\
           document.querySelectorAll('.menu-item').forEach(el => {{\n\
             const quantity = parseInt(el.querySelector('.qty').value, 10) || 0;\n\
             if (quantity < 1) return;\n\
             const custom = el.querySelector('.customization');\n\
             items.push({{\n\
               menu_item_id: parseInt(el.dataset.itemId, 10),\n\
               quantity: quantity,\n\
               customization: custom && custom.value ? custom.value : null,\n\
             }});\n\
           }});\n\
           if (items.length === 0) {{ alert('Nothing selected'); return; }}\n\
           const res = await fetch('/order', {{\n\
             method: 'POST',\n\
             headers: {{'Content-Type': 'application/json'}},\n\
             body: JSON.stringify({{ table_id: {table_id}, items: items }}),\n\
           }});\n\
           if (res.ok) {{\n\
             const data = await res.json();\n\
             window.location = '/order_status/' + data.order_id;\n\
           }} else {{ alert('Order failed'); }}\n\
         }});\n\
         </script>",
    );
    layout("Menu", &body)
}

pub fn order_status_page(order: &OrderEntity, remaining_seconds: i64) -> String {
    let countdown = if order.status == crate::orders::lifecycle::STATUS_PENDING {
        format!(
            "<p>Estimated time remaining: <span id=\"countdown\"></span></p>\n\
             <script>\n\
             let remaining = {remaining_seconds};\n\
             const el = document.getElementById('countdown');\n\
             const tick = () => {{\n\
               const s = Math.max(remaining, 0);\n\
               el.textContent = Math.floor(s / 60) + ':' + String(s % 60).padStart(2, '0');\n\
               remaining -= 1;\n\
             }};\n\
             tick();\n\
             setInterval(tick, 1000);\n\
             </script>",
        )
    } else {
        "<p>Your order is completed.</p>".to_string()
    };

    let body = format!(
        "<h1>Order #{number}</h1>\n\
         <p>Status: {status} — total {total:.2}</p>\n\
         {countdown}\n\
         <button id=\"call-waiter\">Call waiter</button>\n\
         <select id=\"payment-method\">\n\
         <option value=\"cash\">Cash</option>\n\
         <option value=\"card\">Card</option>\n\
         </select>\n\
         <button id=\"request-bill\">Request bill</button>\n\
         <p id=\"feedback\"></p>\n\
         <script>\n\
         const feedback = document.getElementById('feedback');\n\
         document.getElementById('call-waiter').addEventListener('click', async () => {{\n\
           const res = await fetch('/call_waiter/{id}', {{ method: 'POST' }});\n\
           feedback.textContent = res.ok ? 'Waiter called.' : 'Please wait before calling again.';\n\
         }});\n\
         document.getElementById('request-bill').addEventListener('click', async () => {{\n\
           const method = document.getElementById('payment-method').value;\n\
           const res = await fetch('/request_bill/{id}', {{\n\
             method: 'POST',\n\
             headers: {{'Content-Type': 'application/json'}},\n\
             body: JSON.stringify({{ payment_method: method }}),\n\
           }});\n\
           feedback.textContent = res.ok ? 'Bill requested.' : 'Request failed.';\n\
         }});\n\
         </script>",
        number = order.order_number,
        status = escape(&order.status),
        total = order.total_price,
        countdown = countdown,
        id = order.id,
    );
    layout("Order status", &body)
}

fn items_cell(items: &[ItemLine]) -> String {
    items
        .iter()
        .map(|line| {
            let customization = match &line.customization {
                Some(text) if !text.is_empty() => format!(" ({})", escape(text)),
                _ => String::new(),
            };
            format!("{}× {}{}", line.quantity, escape(&line.name), customization)
        })
        .collect::<Vec<_>>()
        .join("<br>")
}

fn order_table(rows: &[OrderRow], with_complete_action: bool) -> String {
    let mut html = String::from(
        "<table>\n<tr><th>#</th><th>Table</th><th>Time</th><th>Items</th>\
         <th>Total</th><th>Status</th><th></th></tr>\n",
    );
    for row in rows {
        let action = if with_complete_action {
            format!(
                "<form class=\"inline\" method=\"post\" action=\"/update_order_status/{}\">\
                 <button>Complete</button></form>",
                row.order.id
            )
        } else {
            String::new()
        };
        html.push_str(&format!(
            "<tr><td>{number}</td><td>{table}</td><td>{time}</td><td>{items}</td>\
             <td>{total:.2}</td><td>{status}</td><td>{action}</td></tr>\n",
            number = row.order.order_number,
            table = row.order.table_id,
            time = escape(&row.created_local),
            items = items_cell(&row.items),
            total = row.order.total_price,
            status = escape(&row.order.status),
            action = action,
        ));
    }
    html.push_str("</table>\n");
    html
}

pub fn waiter_view_page(rows: &[OrderRow], flash: Option<&str>) -> String {
    let mut notifications = String::new();
    for row in rows {
        if !row.order.call_waiter && !row.order.bill_requested {
            continue;
        }
        let mut parts = Vec::new();
        if row.order.call_waiter {
            parts.push(format!(
                "waiter called <button onclick=\"dismiss('call', {})\">Dismiss</button>",
                row.order.id
            ));
        }
        if row.order.bill_requested {
            let method = row
                .order
                .bill_payment_method
                .as_deref()
                .map(escape)
                .unwrap_or_default();
            parts.push(format!(
                "bill requested ({method}) <button onclick=\"dismiss('bill', {})\">Dismiss</button>",
                row.order.id
            ));
        }
        notifications.push_str(&format!(
            "<li>Order #{}, table {}: {}</li>\n",
            row.order.order_number,
            row.order.table_id,
            parts.join("; ")
        ));
    }
    if !notifications.is_empty() {
        notifications = format!("<h2>Notifications</h2>\n<ul>\n{notifications}</ul>\n");
    }

    let body = format!(
        "{flash}<h1>Active orders</h1>\n{notifications}{table}\n\
         <p><a href=\"/order_history\">Order history</a></p>\n\
         <script>\n\
         async function dismiss(kind, orderId) {{\n\
           await fetch('/dismiss_' + kind + '/' + orderId, {{ method: 'POST' }});\n\
           window.location.reload();\n\
         }}\n\
         setTimeout(() => window.location.reload(), 10000);\n\
         </script>",
        flash = flash_banner(flash),
        notifications = notifications,
        table = order_table(rows, true),
    );
    layout("Waiter view", &body)
}

pub fn order_history_page(rows: &[OrderRow]) -> String {
    let body = format!(
        "<h1>Order history</h1>\n{}\n<p><a href=\"/waiter_view\">Back to active orders</a></p>",
        order_table(rows, false),
    );
    layout("Order history", &body)
}

fn category_options(categories: &[String], selected: Option<&str>) -> String {
    categories
        .iter()
        .map(|category| {
            let marker = if selected == Some(category.as_str()) {
                " selected"
            } else {
                ""
            };
            format!(
                "<option value=\"{0}\"{marker}>{0}</option>",
                escape(category)
            )
        })
        .collect()
}

fn item_form(action: &str, item: Option<&MenuItemEntity>, categories: &[String]) -> String {
    let name = item.map(|i| escape(&i.name)).unwrap_or_default();
    let description = item.map(|i| escape(&i.description)).unwrap_or_default();
    let price = item.map(|i| format!("{:.2}", i.price)).unwrap_or_default();
    let customizable = item.map(|i| i.customizable).unwrap_or(false);
    let display_date = item
        .and_then(|i| i.display_date)
        .map(|d| d.to_string())
        .unwrap_or_default();
    format!(
        "<form method=\"post\" action=\"{action}\" enctype=\"multipart/form-data\">\n\
         <label>Name <input name=\"name\" value=\"{name}\" required></label>\n\
         <label>Description <input name=\"description\" value=\"{description}\"></label>\n\
         <label>Price <input name=\"price\" value=\"{price}\" required></label>\n\
         <label>Category <select name=\"category\">{options}</select></label>\n\
         <label>Customizable <input type=\"checkbox\" name=\"customizable\"{checked}></label>\n\
         <label>Display date <input type=\"date\" name=\"display_date\" value=\"{display_date}\"></label>\n\
         <label>Image <input type=\"file\" name=\"image\" accept=\"image/*\"></label>\n\
         <button>Save</button>\n\
         </form>",
        options = category_options(categories, item.map(|i| i.category.as_str())),
        checked = if customizable { " checked" } else { "" },
    )
}

pub fn admin_page(
    items: &[MenuItemEntity],
    categories: &[String],
    flash: Option<&str>,
) -> String {
    let mut table = String::from(
        "<table>\n<tr><th>Name</th><th>Category</th><th>Price</th>\
         <th>Display date</th><th>Image</th><th>Actions</th></tr>\n",
    );
    for item in items {
        let image = match &item.image_filename {
            Some(filename) => format!(
                "<img src=\"/images/{0}\" alt=\"\" height=\"40\">",
                escape(filename)
            ),
            None => String::from("—"),
        };
        let display_date = item
            .display_date
            .map(|d| d.to_string())
            .unwrap_or_default();
        table.push_str(&format!(
            "<tr><td>{name}</td><td>{category}</td><td>{price:.2}</td>\
             <td>{display_date}</td><td>{image}</td>\n\
             <td><details><summary>Edit</summary>{edit_form}</details>\n\
             <form class=\"inline\" method=\"post\" action=\"/delete_menu_item/{id}\">\
             <button>Delete</button></form></td></tr>\n",
            name = escape(&item.name),
            category = escape(&item.category),
            price = item.price,
            display_date = display_date,
            image = image,
            edit_form = item_form(&format!("/edit_menu_item/{}", item.id), Some(item), categories),
            id = item.id,
        ));
    }
    table.push_str("</table>\n");

    let body = format!(
        "{flash}<h1>Menu administration</h1>\n\
         <h2>Add menu item</h2>\n{add_form}\n\
         <h2>Items</h2>\n{table}",
        flash = flash_banner(flash),
        add_form = item_form("/add_menu_item", None, categories),
        table = table,
    );
    layout("Admin panel", &body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_neutralizes_markup() {
        assert_eq!(
            escape("<script>alert(\"x\") & 'y'</script>"),
            "&lt;script&gt;alert(&quot;x&quot;) &amp; &#39;y&#39;&lt;/script&gt;"
        );
        assert_eq!(escape("plain text"), "plain text");
    }

    #[test]
    fn test_items_cell_renders_quantity_and_customization() {
        let lines = vec![
            ItemLine {
                name: "Soup".to_string(),
                quantity: 2,
                customization: None,
            },
            ItemLine {
                name: "Salad".to_string(),
                quantity: 1,
                customization: Some("no onions".to_string()),
            },
        ];
        assert_eq!(items_cell(&lines), "2× Soup<br>1× Salad (no onions)");
    }
}
