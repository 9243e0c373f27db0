use std::path::{Path, PathBuf};

use scraper::Html;

use super::*;

const ROWS_SEED: &str = r#"<!DOCTYPE html>
<html>
<head><link href="../../../../../../css/site.css" rel="stylesheet"><title>Topic 1</title></head>
<body>
<div class="row">
  <h3>Past paper questions</h3>
  <ul>
    <li><a href="../question_node_trees/101.html">21M.1.AHL.TZ2.11a</a>: Vectors</li>
    <li><a href="../question_node_trees/102.html">21M.1.AHL.TZ2.2a</a>: Sequences</li>
    <li><a href="https://example.org/elsewhere.html">21M.1.AHL.TZ2.5</a>: External</li>
    <li>21M.1.AHL.TZ2.6: No link</li>
  </ul>
</div>
<div class="row">
  <h3>Sub sections questions</h3>
  <ul><li><a href="../question_node_trees/103.html">22N.2.SL.TZ0.3</a>: Nested</li></ul>
</div>
<div class="row">
  <h3>Resources</h3>
  <ul><li><a href="../question_node_trees/104.html">22N.2.SL.TZ0.4</a>: Ignored</li></ul>
</div>
<div class="footer bottom">Footer text</div>
</body>
</html>"#;

const MODULES_FRAGMENT: &str = r#"<html><body>
<h1>21M.1.SL.TZ1.4</h1>
<h2>Question</h2>
<p>Find <math alttext="x^2"><mi>x</mi><mo>&#x2061;</mo><mtext>for all x</mtext></math>.</p>
<img src="../../../../../../images/q4.png">
<h2>Syllabus sections</h2>
<p>Topic 2</p>
</body></html>"#;

fn rewrite(root: Option<&str>) -> AssetRewrite {
    AssetRewrite {
        prefix: DEFAULT_ASSET_PREFIX.to_string(),
        root: root.map(ToOwned::to_owned),
    }
}

#[test]
fn seed_index_reads_question_blocks_in_document_order() {
    let document = Html::parse_document(ROWS_SEED);
    let entries = extract_index_entries(&document, PageLayout::Rows, false).expect("entries");

    assert_eq!(
        entries,
        vec![
            IndexEntry {
                code: "21M.1.AHL.TZ2.11a".to_string(),
                href: "../question_node_trees/101.html".to_string(),
            },
            IndexEntry {
                code: "21M.1.AHL.TZ2.2a".to_string(),
                href: "../question_node_trees/102.html".to_string(),
            },
        ]
    );
}

#[test]
fn seed_index_includes_sub_sections_on_request() {
    let document = Html::parse_document(ROWS_SEED);
    let entries = extract_index_entries(&document, PageLayout::Rows, true).expect("entries");

    let codes = entries
        .iter()
        .map(|entry| entry.code.as_str())
        .collect::<Vec<&str>>();
    assert_eq!(
        codes,
        vec!["21M.1.AHL.TZ2.11a", "21M.1.AHL.TZ2.2a", "22N.2.SL.TZ0.3"]
    );
}

#[test]
fn seed_index_uses_module_blocks_for_the_modules_layout() {
    let seed = r#"<html><body><div class="page-content container">
        <div class="module"><h3>Exam questions</h3><ul>
            <li><a href="../questions/55.html">19M.2.SL.TZ1.H_7</a>: Logs</li>
        </ul></div>
        <div class="row"><h3>Other questions</h3><ul>
            <li><a href="../questions/56.html">19M.2.SL.TZ1.8</a>: Skipped</li>
        </ul></div>
    </div></body></html>"#;
    let document = Html::parse_document(seed);

    let entries = extract_index_entries(&document, PageLayout::Modules, false).expect("entries");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].code, "19M.2.SL.TZ1.H_7");
}

#[test]
fn fragment_path_resolves_against_seed_dir_or_fragment_dir() {
    let seed_dir = Path::new("/bank/maths/topics");
    assert_eq!(
        fragment_path(seed_dir, None, "../question_node_trees/101.html"),
        PathBuf::from("/bank/maths/topics/../question_node_trees/101.html")
    );
    assert_eq!(
        fragment_path(
            seed_dir,
            Some(Path::new("/mirror/nodes")),
            "../question_node_trees/101.html"
        ),
        PathBuf::from("/mirror/nodes/101.html")
    );
}

#[test]
fn rows_fragment_renames_the_panel_class() {
    let fragment = Html::parse_document(
        r#"<html><body><div class="p-3 bg-white rounded"><p>What is 2 &amp; 3?</p></div></body></html>"#,
    );

    let content = extract_fragment(&fragment, PageLayout::Rows, &rewrite(None))
        .expect("extract")
        .expect("panel present");
    assert_eq!(
        content,
        r#"<div class="question-content"><p>What is 2 &amp; 3?</p></div>"#
    );
}

#[test]
fn rows_fragment_without_panel_yields_nothing() {
    let fragment = Html::parse_document("<html><body><p>Empty</p></body></html>");
    let content = extract_fragment(&fragment, PageLayout::Rows, &rewrite(None)).expect("extract");
    assert!(content.is_none());
}

#[test]
fn modules_fragment_takes_the_question_section_and_cleans_math() {
    let fragment = Html::parse_document(MODULES_FRAGMENT);

    let content = extract_fragment(&fragment, PageLayout::Modules, &rewrite(Some("bank/")))
        .expect("extract")
        .expect("section present");

    assert!(content.starts_with(r#"<div class="question-content"><h2>Question</h2>"#));
    assert!(content.contains(r#"<math alttext="">"#));
    assert!(content.contains("<mo></mo>"));
    assert!(content.contains("<mtext>for&#32;all&#32;x</mtext>"));
    assert!(content.contains(r#"<img src="bank/images/q4.png">"#));
    assert!(!content.contains("Syllabus sections"));
    assert!(!content.contains("Topic 2"));
}

#[test]
fn reference_code_is_read_from_the_info_table() {
    let fragment = Html::parse_document(
        r#"<html><body><table><tr>
            <td class="info_label">Marks</td><td class="info_value">6</td>
        </tr><tr>
            <td class="info_label">Reference code</td>
            <td class="info_value"> 23M.1.HL.TZ1.6a </td>
        </tr></table></body></html>"#,
    );
    assert_eq!(
        extract_reference_code(&fragment).expect("extract"),
        Some("23M.1.HL.TZ1.6a".to_string())
    );

    let without = Html::parse_document("<html><body><p>no table</p></body></html>");
    assert_eq!(extract_reference_code(&without).expect("extract"), None);
}

#[test]
fn rendered_document_drops_the_index_and_appends_questions() {
    let document = Html::parse_document(ROWS_SEED);
    let questions = render_question_container(
        "21M.1.AHL.TZ2.2a",
        r#"<div class="question-content"><p>Q</p></div>"#,
    );
    let asset_rewrite = rewrite(Some("mirror/questionbank/"));

    let html = render_document(
        &document,
        &DocumentEdits {
            layout: PageLayout::Rows,
            rewrite: &asset_rewrite,
            questions_html: &questions,
        },
    );

    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains(r#"<link href="mirror/questionbank/css/site.css" rel="stylesheet">"#));
    assert!(html.contains(".question-code {"));
    assert!(html.contains("</style></head>"));
    assert!(!html.contains("Past paper questions"));
    assert!(!html.contains("Footer text"));
    assert!(html.contains(
        r#"<div class="all-questions"><div class="question-container"><div class="question-code">21M.1.AHL.TZ2.2a</div><div class="question-content"><p>Q</p></div></div></div></body>"#
    ));
}

#[test]
fn rendered_modules_document_places_questions_in_the_page_container() {
    let document = Html::parse_document(
        r#"<html><head></head><body><div class="page-content container"><h3>Topic</h3><p>Intro</p></div><ul><li>nav</li></ul></body></html>"#,
    );
    let asset_rewrite = rewrite(None);

    let html = render_document(
        &document,
        &DocumentEdits {
            layout: PageLayout::Modules,
            rewrite: &asset_rewrite,
            questions_html: "<p>compiled</p>",
        },
    );

    assert!(html.contains(
        r#"<div class="page-content container"><p>Intro</p><div class="all-questions"><p>compiled</p></div></div>"#
    ));
    assert!(!html.contains("<h3>"));
    assert!(!html.contains("nav"));
}

#[test]
fn asset_rewrite_only_touches_prefixed_values() {
    let asset_rewrite = rewrite(Some("root/"));
    let document = Html::parse_document(
        r#"<html><body><a href="../../../../../../x.html">x</a><a href="local.html">y</a></body></html>"#,
    );

    let html = render_document(
        &document,
        &DocumentEdits {
            layout: PageLayout::Rows,
            rewrite: &asset_rewrite,
            questions_html: "",
        },
    );

    assert!(html.contains(r#"<a href="root/x.html">x</a>"#));
    assert!(html.contains(r#"<a href="local.html">y</a>"#));
}
