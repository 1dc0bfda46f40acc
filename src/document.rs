use anyhow::Context as _;
use kuchiki::traits::TendrilSink as _;
use kuchiki::{ElementData, NodeDataRef, NodeRef};
use maud::Markup;

pub const JOBS_CONTAINER: &str = "#jobs-container";
pub const PREP_CONTAINER: &str = "#prep-container";
pub const JOB_CARD: &str = "#jobs-container > .job-card";
pub const PREP_CARD: &str = "#prep-container > .prep-card";
pub const THEME_TOGGLE: &str = "#themeToggle";
pub const THEME_ICON: &str = "#themeToggle i";
pub const SEARCH_FIELD: &str = "#job-search";
pub const SEARCH_BUTTON: &str = "#job-search-btn";
pub const LOGIN_BUTTON: &str = "#loginBtn";
pub const LOGIN_MODAL: &str = "#loginModal";
pub const MODAL_CLOSE: &str = "#loginModal .close-modal";
pub const LOGIN_FORM: &str = "#loginForm";
pub const PROVIDER_BUTTON: &str = "#googleLoginBtn";

/// Live document tree for one page view.
///
/// Every lookup is optional: callers get `None`/`false` for elements the
/// page does not carry and decide for themselves whether that is worth a log
/// line.
pub struct Page {
    root: NodeRef,
}

impl Page {
    pub fn parse(html: &str) -> Self {
        Self {
            root: kuchiki::parse_html().one(html),
        }
    }

    pub fn find(&self, selector: &str) -> Option<NodeDataRef<ElementData>> {
        self.root.select_first(selector).ok()
    }

    pub fn has(&self, selector: &str) -> bool {
        self.find(selector).is_some()
    }

    pub fn count(&self, selector: &str) -> usize {
        self.root
            .select(selector)
            .map(|nodes| nodes.count())
            .unwrap_or(0)
    }

    pub fn attr(&self, selector: &str, name: &str) -> Option<String> {
        let node = self.find(selector)?;
        let attrs = node.attributes.borrow();
        attrs.get(name).map(|v| v.to_string())
    }

    pub fn set_attr(&self, selector: &str, name: &str, value: &str) -> bool {
        let Some(node) = self.find(selector) else {
            return false;
        };
        node.attributes
            .borrow_mut()
            .insert(name, value.to_string());
        true
    }

    pub fn remove_attr(&self, selector: &str, name: &str) -> bool {
        let Some(node) = self.find(selector) else {
            return false;
        };
        node.attributes.borrow_mut().remove(name);
        true
    }

    /// Value of one property inside the element's `style` attribute.
    pub fn style(&self, selector: &str, property: &str) -> Option<String> {
        let style = self.attr(selector, "style")?;
        parse_style(&style)
            .into_iter()
            .find(|(k, _)| k == property)
            .map(|(_, v)| v)
    }

    pub fn set_style(&self, selector: &str, property: &str, value: &str) -> bool {
        let Some(node) = self.find(selector) else {
            return false;
        };
        let mut attrs = node.attributes.borrow_mut();
        let mut decls = parse_style(attrs.get("style").unwrap_or(""));
        match decls.iter_mut().find(|(k, _)| k == property) {
            Some(decl) => decl.1 = value.to_string(),
            None => decls.push((property.to_string(), value.to_string())),
        }
        attrs.insert("style", format_style(&decls));
        true
    }

    pub fn text(&self, selector: &str) -> Option<String> {
        self.find(selector).map(|n| n.as_node().text_contents())
    }

    /// Serialized children of the element, like `innerHTML`.
    pub fn inner_html(&self, selector: &str) -> anyhow::Result<Option<String>> {
        let Some(node) = self.find(selector) else {
            return Ok(None);
        };
        let mut out = Vec::new();
        for child in node.as_node().children() {
            child.serialize(&mut out).context("serialize child")?;
        }
        Ok(Some(
            String::from_utf8(out).context("inner html not utf-8")?,
        ))
    }

    /// Clears the element and mounts `markup` as its new children.
    pub fn replace_children(&self, selector: &str, markup: Markup) -> bool {
        self.replace_children_html(selector, &markup.into_string())
    }

    pub fn replace_children_html(&self, selector: &str, html: &str) -> bool {
        let Some(node) = self.find(selector) else {
            return false;
        };
        let target = node.as_node();
        for child in target.children().collect::<Vec<_>>() {
            child.detach();
        }
        for child in parse_fragment(html) {
            target.append(child);
        }
        true
    }

    pub fn to_html(&self) -> anyhow::Result<String> {
        let mut out = Vec::new();
        self.root
            .serialize(&mut out)
            .context("serialize document")?;
        String::from_utf8(out).context("document not utf-8")
    }
}

fn parse_fragment(html: &str) -> Vec<NodeRef> {
    let doc = kuchiki::parse_html().one(html);
    match doc.select_first("body") {
        Ok(body) => body.as_node().children().collect(),
        Err(()) => Vec::new(),
    }
}

fn parse_style(style: &str) -> Vec<(String, String)> {
    split_declarations(style)
        .into_iter()
        .filter_map(|decl| {
            let (k, v) = decl.split_once(':')?;
            let k = k.trim();
            if k.is_empty() {
                return None;
            }
            Some((k.to_ascii_lowercase(), v.trim().to_string()))
        })
        .collect()
}

/// Splits on `;` outside quoted strings and parentheses, so values such as
/// `url("a;b")` survive a rewrite.
fn split_declarations(style: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut quote: Option<char> = None;
    let mut depth = 0usize;
    let mut start = 0;
    let mut escaped = false;
    for (i, c) in style.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match (quote, c) {
            (_, '\\') => escaped = true,
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '(') => depth += 1,
            (None, ')') => depth = depth.saturating_sub(1),
            (None, ';') if depth == 0 => {
                out.push(&style[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    out.push(&style[start..]);
    out
}

fn format_style(decls: &[(String, String)]) -> String {
    decls
        .iter()
        .map(|(k, v)| format!("{k}: {v}"))
        .collect::<Vec<_>>()
        .join("; ")
}
