use std::borrow::Cow;

use scraper::node::Element;
use scraper::{ElementRef, Html, Node};
use tracing::warn;

use super::{PageLayout, has_class, parse_selector};

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

const QUESTION_STYLE: &str = "
    .question-container {
        margin-bottom: 2em;
        border: 1px solid #ddd;
        border-radius: 4px;
    }
    .question-code {
        background-color: #f8f9fa;
        padding: 0.5em;
        border-bottom: 1px solid #ddd;
        font-family: monospace;
        font-weight: bold;
    }
    .question-content {
        padding: 1em;
    }
";

/// Replaces a relative asset prefix on `href`/`src` attributes.
#[derive(Debug, Clone)]
pub struct AssetRewrite {
    pub prefix: String,
    pub root: Option<String>,
}

impl AssetRewrite {
    fn apply<'a>(&self, value: &'a str) -> Cow<'a, str> {
        if self.prefix.is_empty() {
            return Cow::Borrowed(value);
        }
        let (Some(root), Some(rest)) = (&self.root, value.strip_prefix(self.prefix.as_str())) else {
            return Cow::Borrowed(value);
        };
        Cow::Owned(format!("{root}{rest}"))
    }
}

/// Changes applied to the seed page while it is serialized.
pub struct DocumentEdits<'a> {
    pub layout: PageLayout,
    pub rewrite: &'a AssetRewrite,
    pub questions_html: &'a str,
}

pub fn render_question_container(code: &str, content_html: &str) -> String {
    let mut out = String::with_capacity(content_html.len() + code.len() + 128);
    out.push_str(r#"<div class="question-container"><div class="question-code">"#);
    push_escaped_text(&mut out, code);
    out.push_str("</div>");
    out.push_str(content_html);
    out.push_str("</div>");
    out
}

/// Serializes the seed page with its question index and footer removed, the
/// question style appended to `<head>` and the compiled questions appended to
/// the layout's container.
pub fn render_document(document: &Html, edits: &DocumentEdits<'_>) -> String {
    let container = find_container(document, edits.layout);

    let mut questions = String::with_capacity(edits.questions_html.len() + 32);
    questions.push_str(r#"<div class="all-questions">"#);
    questions.push_str(edits.questions_html);
    questions.push_str("</div>");

    let mut writer = HtmlWriter {
        out: String::new(),
        rewrite: edits.rewrite,
        removal: Some(edits.layout),
        container,
        container_html: &questions,
    };

    for child in document.tree.root().children() {
        match child.value() {
            Node::Doctype(doctype) => {
                writer.out.push_str("<!DOCTYPE ");
                writer.out.push_str(doctype.name());
                writer.out.push('>');
            }
            Node::Comment(comment) => writer.push_comment(comment),
            Node::Text(text) => push_escaped_text(&mut writer.out, text),
            Node::Element(_) => {
                if let Some(element) = ElementRef::wrap(child) {
                    writer.write_element(element, None);
                }
            }
            _ => {}
        }
    }

    if container.is_none() {
        writer.out.push_str(&questions);
    }

    writer.out
}

/// Serializes one fragment element, optionally replacing its `class`.
pub(super) fn render_element(
    element: ElementRef<'_>,
    class_override: Option<&str>,
    rewrite: &AssetRewrite,
) -> String {
    let mut writer = HtmlWriter {
        out: String::new(),
        rewrite,
        removal: None,
        container: None,
        container_html: "",
    };
    writer.write_element(element, class_override);
    writer.out
}

fn find_container(document: &Html, layout: PageLayout) -> Option<ElementRef<'_>> {
    if layout == PageLayout::Modules {
        let container = parse_selector("div.page-content.container")
            .ok()
            .and_then(|selector| document.select(&selector).next());
        if container.is_some() {
            return container;
        }
        warn!("page-content container not found; appending questions to body");
    }

    parse_selector("body")
        .ok()
        .and_then(|selector| document.select(&selector).next())
}

struct HtmlWriter<'a> {
    out: String,
    rewrite: &'a AssetRewrite,
    removal: Option<PageLayout>,
    container: Option<ElementRef<'a>>,
    container_html: &'a str,
}

impl HtmlWriter<'_> {
    fn write_element(&mut self, element: ElementRef<'_>, class_override: Option<&str>) {
        let value = element.value();
        if self.is_removed(value) {
            return;
        }

        let name = value.name();
        self.out.push('<');
        self.out.push_str(name);

        let mut class_written = false;
        for (attribute, raw) in value.attrs() {
            let rewritten = match (attribute, class_override) {
                ("class", Some(class)) => {
                    class_written = true;
                    Cow::Borrowed(class)
                }
                ("alttext", _) if name == "math" => Cow::Borrowed(""),
                ("href" | "src", _) => self.rewrite.apply(raw),
                _ => Cow::Borrowed(raw),
            };
            self.push_attribute(attribute, &rewritten);
        }
        if let (Some(class), false) = (class_override, class_written) {
            self.push_attribute("class", class);
        }
        self.out.push('>');

        if VOID_ELEMENTS.contains(&name) {
            return;
        }

        let raw_text = matches!(name, "script" | "style");
        let math_token = matches!(name, "mtext" | "mo" | "mi");

        for child in element.children() {
            match child.value() {
                Node::Text(text) if raw_text => self.out.push_str(text),
                Node::Text(text) if math_token => push_math_text(&mut self.out, text),
                Node::Text(text) => push_escaped_text(&mut self.out, text),
                Node::Comment(comment) => self.push_comment(comment),
                Node::Element(_) => {
                    if let Some(child) = ElementRef::wrap(child) {
                        self.write_element(child, None);
                    }
                }
                _ => {}
            }
        }

        if self.container.map(|container| container.id()) == Some(element.id()) {
            self.out.push_str(self.container_html);
        }
        if name == "head" && self.removal.is_some() {
            self.out.push_str("<style>");
            self.out.push_str(QUESTION_STYLE);
            self.out.push_str("</style>");
        }

        self.out.push_str("</");
        self.out.push_str(name);
        self.out.push('>');
    }

    fn is_removed(&self, element: &Element) -> bool {
        let Some(layout) = self.removal else {
            return false;
        };

        if has_class(element, layout.block_class()) {
            return true;
        }
        if has_class(element, "footer") && has_class(element, "bottom") {
            return true;
        }
        layout == PageLayout::Modules && matches!(element.name(), "h3" | "h4" | "ul")
    }

    fn push_attribute(&mut self, name: &str, value: &str) {
        self.out.push(' ');
        self.out.push_str(name);
        self.out.push_str("=\"");
        for character in value.chars() {
            match character {
                '&' => self.out.push_str("&amp;"),
                '"' => self.out.push_str("&quot;"),
                _ => self.out.push(character),
            }
        }
        self.out.push('"');
    }

    fn push_comment(&mut self, comment: &str) {
        self.out.push_str("<!--");
        self.out.push_str(comment);
        self.out.push_str("-->");
    }
}

fn push_escaped_text(out: &mut String, text: &str) {
    for character in text.chars() {
        match character {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(character),
        }
    }
}

// Function-application marks are dropped and spaces pinned as entities so
// renderers do not collapse them inside MathML tokens.
fn push_math_text(out: &mut String, text: &str) {
    for character in text.chars() {
        match character {
            '\u{2061}' => {}
            ' ' | '\u{00a0}' => out.push_str("&#32;"),
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(character),
        }
    }
}
