use crate::config::SiteLayout;
use crate::error::{CoreError, CoreResult};
use crate::html::{esc, HtmlPage};
use crate::render::SITE_STYLES;
use crate::site::nav::render_header_nav;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

pub const DTE_LABEL: &str = "DTE Instructions v1.2";

const LINK_PATTERN: &str = r"\[([^\]]+)\]\(([^)]+)\)";
const BOLD_PATTERN: &str = r"\*\*([^*]+)\*\*";
const CODE_PATTERN: &str = r"`([^`]+)`";
const ORDERED_PATTERN: &str = r"^(\d+)\.\s+(.*)$";

struct InlineRules {
    link: Regex,
    bold: Regex,
    code: Regex,
}

impl InlineRules {
    fn compile() -> CoreResult<Self> {
        Ok(Self {
            link: compile(LINK_PATTERN)?,
            bold: compile(BOLD_PATTERN)?,
            code: compile(CODE_PATTERN)?,
        })
    }

    /// Escapes first, so only the three markdown forms produce markup.
    fn format(&self, text: &str) -> String {
        let escaped = esc(text);
        let linked = self.link.replace_all(&escaped, "<a href=\"$2\">$1</a>");
        let bolded = self.bold.replace_all(&linked, "<strong>$1</strong>");
        self.code.replace_all(&bolded, "<code>$1</code>").into_owned()
    }
}

fn compile(pattern: &str) -> CoreResult<Regex> {
    Regex::new(pattern)
        .map_err(|e| CoreError::InvalidInput(format!("regex compilation failed: {}", e)))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListKind {
    Ordered,
    Unordered,
}

impl ListKind {
    fn tag(self) -> &'static str {
        match self {
            ListKind::Ordered => "ol",
            ListKind::Unordered => "ul",
        }
    }
}

/// Line-based renderer for the instruction document's markdown subset.
pub fn render_markdown(md_text: &str) -> CoreResult<String> {
    let rules = InlineRules::compile()?;
    let ordered = compile(ORDERED_PATTERN)?;
    let mut out: Vec<String> = Vec::new();
    let mut in_code = false;
    let mut open_list: Option<ListKind> = None;

    fn close_list(out: &mut Vec<String>, open_list: &mut Option<ListKind>) {
        if let Some(kind) = open_list.take() {
            out.push(format!("</{}>", kind.tag()));
        }
    }

    fn list_item(out: &mut Vec<String>, open_list: &mut Option<ListKind>, kind: ListKind, item: String) {
        if *open_list != Some(kind) {
            close_list(out, open_list);
            out.push(format!("<{}>", kind.tag()));
            *open_list = Some(kind);
        }
        out.push(format!("<li>{}</li>", item));
    }

    for raw in md_text.lines() {
        let line = raw.trim_end();

        if line.starts_with("```") {
            if in_code {
                out.push("</code></pre>".to_string());
            } else {
                close_list(&mut out, &mut open_list);
                out.push("<pre><code>".to_string());
            }
            in_code = !in_code;
            continue;
        }
        if in_code {
            out.push(esc(line));
            continue;
        }
        if line.trim().is_empty() {
            close_list(&mut out, &mut open_list);
            continue;
        }

        let heading = [("### ", "h3"), ("## ", "h2"), ("# ", "h1")]
            .into_iter()
            .find_map(|(marker, tag)| line.strip_prefix(marker).map(|rest| (tag, rest)));
        if let Some((tag, rest)) = heading {
            close_list(&mut out, &mut open_list);
            out.push(format!("<{tag}>{}</{tag}>", rules.format(rest)));
            continue;
        }
        if let Some(rest) = line.strip_prefix("> ") {
            close_list(&mut out, &mut open_list);
            out.push(format!("<blockquote>{}</blockquote>", rules.format(rest)));
            continue;
        }
        if line.trim_start().starts_with('<') {
            close_list(&mut out, &mut open_list);
            out.push(line.to_string());
            continue;
        }
        if let Some(caps) = ordered.captures(line) {
            let text = caps.get(2).map(|m| m.as_str()).unwrap_or("");
            list_item(&mut out, &mut open_list, ListKind::Ordered, rules.format(text));
            continue;
        }
        if let Some(rest) = line.strip_prefix("- ") {
            list_item(&mut out, &mut open_list, ListKind::Unordered, rules.format(rest));
            continue;
        }

        close_list(&mut out, &mut open_list);
        out.push(format!("<p>{}</p>", rules.format(line)));
    }

    if in_code {
        out.push("</code></pre>".to_string());
    }
    close_list(&mut out, &mut open_list);
    Ok(out.join("\n"))
}

pub fn build_dte_page(body_html: &str) -> String {
    let mut page = HtmlPage::new();
    page.open_document(DTE_LABEL, &SITE_STYLES, &[]);
    page.line(render_header_nav("", Some(DTE_LABEL)));
    page.line("<main class=\"wrap\">");
    page.line("  <div class=\"md\">");
    page.line(body_html);
    page.line("  </div>");
    page.line("</main>");
    page.close_document();
    page.finish()
}

/// Renders `source` into `<site-root>/dte_instructions.html`.
pub fn render_dte_to_site(source: &Path, layout: &SiteLayout) -> CoreResult<PathBuf> {
    if !source.is_file() {
        return Err(CoreError::MissingInput(format!(
            "Source markdown not found: {}",
            source.display()
        )));
    }
    let md_text = fs::read_to_string(source).map_err(|e| CoreError::io_at(source, e))?;
    let body = render_markdown(&md_text)?;

    fs::create_dir_all(layout.root()).map_err(|e| CoreError::io_at(layout.root(), e))?;
    let output = layout.dte_instructions_page();
    fs::write(&output, build_dte_page(&body)).map_err(|e| CoreError::io_at(&output, e))?;
    tracing::info!(source = %source.display(), output = %output.display(), "rendered DTE instructions");
    Ok(output)
}
