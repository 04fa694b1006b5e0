pub mod dte;
pub mod gaps;
pub mod landing;
pub mod map;
pub mod summary;

/// Stylesheet shared by pages that carry the site header nav.
pub(crate) const SITE_STYLES: [&str; 12] = [
    "body { font-family: ui-sans-serif, system-ui, -apple-system, Segoe UI, Roboto, Helvetica, Arial; margin: 0; color: #222; }",
    ".wrap { max-width: 980px; margin: 0 auto; padding: 0 20px; }",
    "header { background: #f6f6f6; border-bottom: 1px solid #ddd; }",
    "header nav { display: flex; flex-wrap: wrap; gap: 14px; padding: 12px 0; }",
    "header nav a { color: #235; text-decoration: none; }",
    "header nav a.active { font-weight: 700; text-decoration: underline; }",
    "main { padding: 20px 0 40px; }",
    ".card { border: 1px solid #ddd; border-radius: 8px; padding: 12px 16px; margin: 16px 0; }",
    ".muted { color: #666; }",
    "code, pre { background: #f6f6f6; border-radius: 4px; }",
    "pre { padding: 10px; overflow-x: auto; }",
    "blockquote { border-left: 3px solid #ccc; margin: 0; padding-left: 12px; color: #555; }",
];
