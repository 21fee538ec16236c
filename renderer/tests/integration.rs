use renderer::config::Mode;
use renderer::{EngineConfig, RenderedDocument};
use rstest::rstest;

fn render_with(source: &str, config: &EngineConfig) -> RenderedDocument {
    renderer::render_document(source.as_bytes(), config).expect("render failed")
}

fn html(source: &str) -> String {
    render_with(source, &EngineConfig::default()).body()
}

fn text(source: &str) -> String {
    let mut config = EngineConfig::default();
    config.output.mode = Mode::Text;
    render_with(source, &config).body()
}

fn toc(source: &str) -> Option<String> {
    render_with(source, &EngineConfig::default()).toc_html()
}

#[test]
fn headings_and_paragraphs() {
    assert_eq!(
        html("= Intro =\n\nSome *text*.\nMore.\n\n== Details\nBody\n"),
        "<h2><a name=\"intro\"></a>Intro</h2>\n\
         <p>Some <em>text</em>.\nMore.</p>\n\
         <h3><a name=\"details\"></a>Details</h3>\n\
         <p>Body</p>"
    );
}

#[test]
fn duplicate_headings_get_distinct_anchors() {
    let body = html("= A =\n= A =\n");
    assert!(body.contains("<a name=\"a\"></a>"));
    assert!(body.contains("<a name=\"a-1\"></a>"));
}

#[test]
fn single_heading_has_no_toc() {
    assert_eq!(toc("= Only =\n\ntext\n"), None);
}

#[test]
fn toc_nests_and_links() {
    assert_eq!(
        toc("= One =\n== Two\n= Three =\n").as_deref(),
        Some(
            "<ul>\n<li><a href=\"#one\">One</a></li>\n\
             <ul>\n<li><a href=\"#two\">Two</a></li>\n</ul>\n\
             <li><a href=\"#three\">Three</a></li>\n</ul>"
        )
    );
}

#[test]
fn linked_heading_keeps_link_in_body_only() {
    let doc = render_with("= See [docs](http://x.org) =\n= Next =\n", &EngineConfig::default());
    assert!(doc.body().contains("<a href=\"http://x.org\">docs</a>"));
    let toc = doc.toc_html().unwrap();
    assert!(toc.contains(">See docs</a>"), "{toc}");
    assert!(!toc.contains("http://x.org"));
}

#[test]
fn toc_disabled_by_config() {
    let mut config = EngineConfig::default();
    config.header.generate_toc = false;
    let doc = render_with("= One =\n= Two =\n", &config);
    assert_eq!(doc.body(), "<h2>One</h2>\n<h2>Two</h2>");
    assert_eq!(doc.toc, None);
}

#[test]
fn plain_text_has_no_toc() {
    let mut config = EngineConfig::default();
    config.output.mode = Mode::Text;
    assert_eq!(render_with("= A =\n= B =\n", &config).toc, None);
}

#[rstest]
#[case("Title\n=====\nSub\n---\n", "<h2><a name=\"title\"></a>Title</h2>\n<h3><a name=\"sub\"></a>Sub</h3>")]
#[case("lead in\nTitle\n-----\n", "<p>lead in</p>\n<h3><a name=\"title\"></a>Title</h3>")]
#[case("Title\r\n=====\r\n\r\nbody\r\n", "<h2><a name=\"title\"></a>Title</h2>\n<p>body</p>")]
#[case("= Q&A =\nx < y\n", "<h2><a name=\"q-a\"></a>Q&amp;A</h2>\n<p>x &lt; y</p>")]
fn html_blocks(#[case] source: &str, #[case] expected: &str) {
    assert_eq!(html(source), expected);
}

#[rstest]
#[case("= Über =\nfirst para\n\n== Next\nsecond\n", "Über\n====\n\nfirst para\n\nNext\n----\n\nsecond")]
#[case("= Q&A <tips> =\nx < y & z\n", "Q&A <tips>\n==========\n\nx < y & z")]
#[case("Setext\n------\n", "Setext\n------")]
fn plain_text_blocks(#[case] source: &str, #[case] expected: &str) {
    assert_eq!(text(source), expected);
}
