//! Inline SVG icons for login buttons.

struct Icon {
    name: &'static str,
    view_box: &'static str,
    body: &'static str,
}

static ICONS: &[Icon] = &[
    Icon {
        name: "gitea-wechat",
        view_box: "0 0 24 24",
        body: r#"<path d="M8.69 3C4.44 3 1 5.88 1 9.43c0 2.05 1.14 3.86 2.92 5.04l-.73 2.2 2.55-1.28c.9.25 1.86.4 2.85.4.26 0 .51-.01.76-.03a5.9 5.9 0 0 1-.25-1.68c0-3.26 3.13-5.9 6.99-5.9.26 0 .51.01.76.03C16.18 5.14 12.76 3 8.69 3zM6.13 7.1a.95.95 0 1 1 0 1.9.95.95 0 0 1 0-1.9zm5.12 0a.95.95 0 1 1 0 1.9.95.95 0 0 1 0-1.9zM15.98 9.1c-3.3 0-5.98 2.22-5.98 4.96 0 2.74 2.68 4.96 5.98 4.96.69 0 1.35-.1 1.97-.28l2.1 1.06-.58-1.8c1.5-.91 2.49-2.3 2.49-3.94 0-2.74-2.68-4.96-5.98-4.96zm-1.98 2.86a.8.8 0 1 1 0 1.6.8.8 0 0 1 0-1.6zm3.96 0a.8.8 0 1 1 0 1.6.8.8 0 0 1 0-1.6z"/>"#,
    },
    Icon {
        name: "gitea-openid",
        view_box: "0 0 16 16",
        body: r#"<path d="M7.3 1.5 9.4.5v13.9c-3.7-.4-6.4-2.4-6.4-4.8 0-2.2 2.3-4.1 5.5-4.7v1.4c-2.1.4-3.5 1.7-3.5 3.3 0 1.6 1.3 2.9 3.3 3.4V1.5zm4.6 4.9c1 .3 1.8.7 2.5 1.2l1.1-.7.5 3.6-3.8-.8 1-.6c-.4-.3-.8-.5-1.3-.6V6.4z"/>"#,
    },
];

/// Renders `icon` at `size` pixels with `class` added to its class list.
/// Returns an empty string for unknown icons.
pub fn render_html(icon: &str, size: u32, class: &str) -> String {
    let Some(found) = ICONS.iter().find(|i| i.name == icon) else {
        return String::new();
    };
    let class = if class.is_empty() {
        format!("svg {}", found.name)
    } else {
        format!("svg {} {}", found.name, class)
    };
    format!(
        r#"<svg viewBox="{}" class="{}" width="{size}" height="{size}" aria-hidden="true">{}</svg>"#,
        found.view_box, class, found.body
    )
}

/// Like [`render_html`], trying `fallback` when `icon` is unknown.
pub fn render_html_or(icon: &str, fallback: &str, size: u32, class: &str) -> String {
    let html = render_html(icon, size, class);
    if html.is_empty() {
        return render_html(fallback, size, class);
    }
    html
}
