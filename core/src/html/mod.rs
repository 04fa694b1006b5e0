/// Escape text for HTML element content and attribute values.
pub fn esc(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(ch),
        }
    }
    out
}

/// ` name="value"` with the value escaped.
pub fn attr(name: &str, value: &str) -> String {
    format!(" {}=\"{}\"", name, esc(value))
}

pub fn link(href: &str, label: &str) -> String {
    format!("<a{}>{}</a>", attr("href", href), esc(label))
}

pub fn code(text: &str) -> String {
    format!("<code>{}</code>", esc(text))
}

/// The red-bordered marker crawlers key on. Text is fixed.
pub fn invalid_block(section: &str) -> String {
    format!(
        "<div class=\"invalid\" style=\"border:2px solid #c00; color:#900; padding:10px; border-radius:6px; margin:10px 0;\"><strong>INVALID FOR INSPECTION: {} is missing.</strong></div>",
        esc(section)
    )
}

pub fn not_declared(section: &str) -> String {
    format!("<p><em>{} not declared.</em></p>", esc(section))
}

/// Line-oriented page assembly: lines joined by `\n` plus a trailing `\n`.
#[derive(Debug, Default)]
pub struct HtmlPage {
    lines: Vec<String>,
}

impl HtmlPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn line(&mut self, line: impl Into<String>) -> &mut Self {
        self.lines.push(line.into());
        self
    }

    pub fn lines<I, S>(&mut self, lines: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lines.extend(lines.into_iter().map(Into::into));
        self
    }

    /// `<!doctype html>` through `<body>`, with one stylesheet block.
    pub fn open_document(&mut self, title: &str, styles: &[&str], head_extra: &[String]) -> &mut Self {
        self.line("<!doctype html>");
        self.line("<html lang=\"en\">");
        self.line("<head>");
        self.line("  <meta charset=\"utf-8\" />");
        self.line("  <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\" />");
        self.line(format!("  <title>{}</title>", esc(title)));
        self.line("  <style>");
        for s in styles {
            self.line(format!("    {}", s));
        }
        self.line("  </style>");
        for extra in head_extra {
            self.line(format!("  {}", extra));
        }
        self.line("</head>");
        self.line("<body>")
    }

    pub fn close_document(&mut self) -> &mut Self {
        self.line("</body>");
        self.line("</html>")
    }

    /// `<tr>` of `<th>` cells; labels are escaped.
    pub fn header_row(&mut self, labels: &[&str]) -> &mut Self {
        let cells: String = labels.iter().map(|l| format!("<th>{}</th>", esc(l))).collect();
        self.line(format!("    <tr>{}</tr>", cells))
    }

    /// `<tr>` of `<td>` cells; cells are inserted as pre-rendered HTML.
    pub fn row(&mut self, row_attrs: &str, cells: &[String]) -> &mut Self {
        let cells: String = cells.iter().map(|c| format!("<td>{}</td>", c)).collect();
        self.line(format!("    <tr{}>{}</tr>", row_attrs, cells))
    }

    pub fn finish(self) -> String {
        let mut out = self.lines.join("\n");
        out.push('\n');
        out
    }
}
