use crate::config::SiteLayout;
use crate::error::{CoreError, CoreResult};
use crate::html::{attr, esc};
use crate::render::dte::DTE_LABEL;
use regex::Regex;
use std::fs;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavItem {
    pub label: &'static str,
    pub href: &'static str,
}

/// Site navigation, in display order. Hrefs are relative to the site root.
pub const NAV_ITEMS: [NavItem; 10] = [
    NavItem { label: "Home", href: "index.html" },
    NavItem { label: "Articles", href: "articles/index.html" },
    NavItem { label: "Dependencies", href: "dependencies/index.html" },
    NavItem { label: "Regulation", href: "regulation/links.html" },
    NavItem { label: "Sources", href: "regulation/sources.html" },
    NavItem { label: "Spine", href: "regulation/policy_to_evidence_spine.html" },
    NavItem { label: "Views", href: "views/index.html" },
    NavItem { label: "AOI Reports", href: "aoi_reports/index.html" },
    NavItem { label: "DAO (Stakeholders)", href: "dao_stakeholders/index.html" },
    NavItem { label: "DAO (Developers)", href: "dao_dev/index.html" },
];

pub const HOME_LABEL: &str = "Home";
pub const AOI_REPORTS_LABEL: &str = "AOI Reports";

const HEADER_PATTERN: &str = r"(?s)<header>.*?</header>";
const BODY_PATTERN: &str = r"(?i)<body(\s[^>]*)?>";
const HREF_PATTERN: &str = r#"href="([^"]*)""#;

fn compile(pattern: &str) -> CoreResult<Regex> {
    Regex::new(pattern)
        .map_err(|e| CoreError::InvalidInput(format!("regex compilation failed: {}", e)))
}

/// Shared `<header>` block. `rel_prefix` leads from the page to the site root.
pub fn render_header_nav(rel_prefix: &str, active_label: Option<&str>) -> String {
    let links: Vec<String> = NAV_ITEMS
        .iter()
        .map(|item| {
            let href = format!("{}{}", rel_prefix, item.href);
            let class = if active_label == Some(item.label) {
                attr("class", "active")
            } else {
                String::new()
            };
            format!("<a{}{}>{}</a>", attr("href", &href), class, esc(item.label))
        })
        .collect();
    format!(
        "<header>\n  <div class=\"wrap\">\n    <nav>\n      {}\n    </nav>\n  </div>\n</header>",
        links.join("\n      ")
    )
}

/// Swap the first `<header>…</header>` for `header`, or insert it right
/// after the opening `<body>` tag.
pub fn replace_or_insert_header(html: &str, header: &str) -> CoreResult<String> {
    let header_re = compile(HEADER_PATTERN)?;
    if let Some(m) = header_re.find(html) {
        return Ok(format!("{}{}{}", &html[..m.start()], header, &html[m.end()..]));
    }
    let body_re = compile(BODY_PATTERN)?;
    let body = body_re
        .find(html)
        .ok_or_else(|| CoreError::Structural("no <body> tag found in HTML".to_string()))?;
    Ok(format!(
        "{}\n  {}{}",
        &html[..body.end()],
        header,
        &html[body.end()..]
    ))
}

/// `"../"` once per directory between `site_root` and `page`.
pub fn rel_prefix_for(site_root: &Path, page: &Path) -> CoreResult<String> {
    let rel = page.strip_prefix(site_root).map_err(|_| {
        CoreError::InvalidInput(format!(
            "{} is not under site root {}",
            page.display(),
            site_root.display()
        ))
    })?;
    let depth = rel.components().count().saturating_sub(1);
    Ok("../".repeat(depth))
}

pub fn rebuild_file(path: &Path, rel_prefix: &str, active_label: Option<&str>) -> CoreResult<()> {
    let html = fs::read_to_string(path).map_err(|e| CoreError::io_at(path, e))?;
    let header = render_header_nav(rel_prefix, active_label);
    let updated = replace_or_insert_header(&html, &header)
        .map_err(|e| match e {
            CoreError::Structural(msg) => {
                CoreError::Structural(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })?;
    fs::write(path, updated).map_err(|e| CoreError::io_at(path, e))?;
    tracing::info!(page = %path.display(), rel_prefix, "rebuilt header nav");
    Ok(())
}

fn rebuild_page(layout: &SiteLayout, page: &Path, active_label: Option<&str>) -> CoreResult<()> {
    let prefix = rel_prefix_for(layout.root(), page)?;
    rebuild_file(page, &prefix, active_label)
}

/// Site home, AOI index and the run's landing page; the DTE page too when present.
pub fn rebuild_site_nav(layout: &SiteLayout, run_id: &str) -> CoreResult<()> {
    rebuild_page(layout, &layout.home_page(), Some(HOME_LABEL))?;
    rebuild_page(layout, &layout.aoi_index_page(), Some(AOI_REPORTS_LABEL))?;
    rebuild_page(layout, &layout.run_landing_page(run_id), Some(AOI_REPORTS_LABEL))?;
    let dte = layout.dte_instructions_page();
    if dte.is_file() {
        rebuild_page(layout, &dte, Some(DTE_LABEL))?;
    }
    Ok(())
}

fn assert_contains(path: &Path, needle: &str) -> CoreResult<()> {
    let text = fs::read_to_string(path).map_err(|e| CoreError::io_at(path, e))?;
    if !text.contains(needle) {
        return Err(CoreError::ValidationFailure(format!(
            "missing expected link in {}: {}",
            path.display(),
            needle
        )));
    }
    Ok(())
}

/// Prefix check on the AOI index and the run landing page, then a
/// site-wide scan whose unresolved targets are logged.
pub fn check_nav_links(layout: &SiteLayout, run_id: &str) -> CoreResult<()> {
    let index = layout.aoi_index_page();
    for item in NAV_ITEMS.iter().filter(|i| i.label != AOI_REPORTS_LABEL) {
        assert_contains(&index, &format!("href=\"../{}\"", item.href))?;
    }
    assert_contains(&layout.run_landing_page(run_id), "href=\"../../../index.html\"")?;

    for unresolved in unresolved_nav_targets(layout.root())? {
        tracing::warn!(target_link = %unresolved, "nav link does not resolve");
    }
    Ok(())
}

/// Hrefs of the links inside the page's `<header>` block.
pub fn header_nav_hrefs(html: &str) -> CoreResult<Vec<String>> {
    let header_re = compile(HEADER_PATTERN)?;
    let href_re = compile(HREF_PATTERN)?;
    let header = match header_re.find(html) {
        Some(m) => m.as_str(),
        None => return Ok(Vec::new()),
    };
    Ok(href_re
        .captures_iter(header)
        .filter_map(|c| c.get(1).map(|m| m.as_str().replace("&amp;", "&")))
        .collect())
}

/// Every `<page> -> <href>` under `site_root` whose header link does not
/// land on an existing file.
pub fn unresolved_nav_targets(site_root: &Path) -> CoreResult<Vec<String>> {
    let mut out = Vec::new();
    for entry in WalkDir::new(site_root).sort_by_file_name() {
        let entry = entry
            .map_err(|err| CoreError::Io(std::io::Error::new(std::io::ErrorKind::Other, err)))?;
        let page = entry.path();
        if !entry.file_type().is_file() || page.extension().and_then(|e| e.to_str()) != Some("html")
        {
            continue;
        }
        let html = fs::read_to_string(page).map_err(|e| CoreError::io_at(page, e))?;
        let page_dir = page.parent().unwrap_or(site_root);
        for href in header_nav_hrefs(&html)? {
            if href.starts_with('#') || href.contains("://") {
                continue;
            }
            let target = lexical_join(page_dir, &href);
            if !target.is_file() {
                let rel = page.strip_prefix(site_root).unwrap_or(page);
                out.push(format!("{} -> {}", rel.display(), href));
            }
        }
    }
    Ok(out)
}

fn lexical_join(dir: &Path, href: &str) -> PathBuf {
    let mut out = dir.to_path_buf();
    for c in Path::new(href).components() {
        match c {
            Component::ParentDir => {
                out.pop();
            }
            Component::CurDir => {}
            other => out.push(other.as_os_str()),
        }
    }
    out
}
