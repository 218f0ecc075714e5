use feedsky_core::assemble::{
    assemble, AssemblerConfig, LinkStyle, PostBody, PostDraft, DEFAULT_MAX_GRAPHEMES,
    DEFAULT_PLACEHOLDER, SEPARATOR,
};
use feedsky_core::error::ConfigError;
use feedsky_core::graphemes::grapheme_len;
use feedsky_core::snippet::{extract_snippet, DEFAULT_SNIPPET_CHARS, ELLIPSIS};

const LINK: &str = "https://example.com/post";

fn entry<'a>(title: &'a str, snippet: &'a str) -> PostBody<'a> {
    PostBody::Entry { title, snippet }
}

fn placeholder_config() -> AssemblerConfig {
    AssemblerConfig {
        link_style: LinkStyle::Placeholder(DEFAULT_PLACEHOLDER.to_string()),
        ..AssemblerConfig::default()
    }
}

/// Check the facet invariants every draft must satisfy.
fn assert_well_formed(draft: &PostDraft, marker: &str, uri: &str) {
    assert!(draft.grapheme_len() <= DEFAULT_MAX_GRAPHEMES);
    assert_eq!(draft.facets().len(), 1);
    let facet = &draft.facets()[0];
    assert_eq!(draft.facet_text(facet), Some(marker));
    assert_eq!(facet.uri(), uri);
    assert_eq!(facet.byte_end(), draft.text().len());
    assert_eq!(&draft.text().as_bytes()[facet.range()], marker.as_bytes());
}

#[test]
fn short_entry_with_url_link() {
    let draft = assemble(
        &AssemblerConfig::default(),
        &entry("Hello World", "A short post about nothing in particular."),
        LINK,
    );

    assert_eq!(
        draft.text(),
        "📄 Hello World\n\nA short post about nothing in particular.\n\nhttps://example.com/post"
    );
    let facet = &draft.facets()[0];
    let body = "📄 Hello World\n\nA short post about nothing in particular.";
    assert_eq!(facet.byte_start(), body.len() + SEPARATOR.len());
    assert_eq!(facet.byte_end(), facet.byte_start() + LINK.len());
    assert_well_formed(&draft, LINK, LINK);
}

#[test]
fn short_entry_with_placeholder_link() {
    let draft = assemble(
        &placeholder_config(),
        &entry("Hello World", "A short post about nothing in particular."),
        LINK,
    );

    assert_eq!(
        draft.text(),
        "📄 Hello World\n\nA short post about nothing in particular.\n\nlink"
    );
    assert_well_formed(&draft, "link", LINK);
}

#[test]
fn byte_offsets_account_for_multibyte_text() {
    let draft = assemble(
        &AssemblerConfig::default(),
        &entry("Ünïcödé 🎉", "日本語のテキスト"),
        LINK,
    );
    let body = "📄 Ünïcödé 🎉\n\n日本語のテキスト";
    let facet = &draft.facets()[0];
    assert_eq!(facet.byte_start(), body.len() + SEPARATOR.len());
    assert_ne!(facet.byte_start(), body.chars().count() + SEPARATOR.len());
    assert_well_formed(&draft, LINK, LINK);
}

#[test]
fn empty_snippet_drops_its_separator() {
    let draft = assemble(&AssemblerConfig::default(), &entry("Title only", ""), LINK);
    assert_eq!(draft.text(), "📄 Title only\n\nhttps://example.com/post");
}

#[test]
fn empty_icon_drops_its_space() {
    let config = AssemblerConfig {
        icon: String::new(),
        ..AssemblerConfig::default()
    };
    let draft = assemble(&config, &entry("Plain", "Body."), LINK);
    assert_eq!(draft.text(), "Plain\n\nBody.\n\nhttps://example.com/post");
}

#[test]
fn paper_body_lists_authors_and_abstract() {
    let authors = vec!["Ashish Vaswani".to_string(), "Noam Shazeer".to_string()];
    let draft = assemble(
        &AssemblerConfig::default(),
        &PostBody::Paper {
            title: "Attention Is All You Need",
            authors: &authors,
            abstract_text: "The dominant sequence transduction models are complex.",
        },
        "https://arxiv.org/abs/1706.03762",
    );
    assert_eq!(
        draft.text(),
        "📄 Attention Is All You Need (Ashish Vaswani, Noam Shazeer) The dominant sequence transduction models are complex.\n\nhttps://arxiv.org/abs/1706.03762"
    );
    assert_well_formed(
        &draft,
        "https://arxiv.org/abs/1706.03762",
        "https://arxiv.org/abs/1706.03762",
    );
}

#[test]
fn long_paper_abstract_is_truncated_on_a_word() {
    let authors = vec!["A. Author".to_string()];
    let abstract_text = "We study a problem in depth. ".repeat(30);
    let draft = assemble(
        &AssemblerConfig::default(),
        &PostBody::Paper {
            title: "A Long Paper",
            authors: &authors,
            abstract_text: abstract_text.trim(),
        },
        LINK,
    );
    let body = draft.text().strip_suffix(&format!("{SEPARATOR}{LINK}")).unwrap();
    assert!(body.ends_with(ELLIPSIS));
    let kept = body.strip_suffix(ELLIPSIS).unwrap();
    assert!(!kept.ends_with(' '));
    let full = format!("📄 A Long Paper (A. Author) {}", abstract_text.trim());
    assert!(full.starts_with(kept));
    assert!(full[kept.len()..].starts_with(' '));
    assert_well_formed(&draft, LINK, LINK);
}

#[test]
fn emoji_title_with_long_unbroken_summary_stays_within_budget() {
    let summary = "x".repeat(400);
    let snippet = extract_snippet(&summary, DEFAULT_SNIPPET_CHARS);
    let draft = assemble(
        &AssemblerConfig::default(),
        &entry("🎉 Big news 👨‍👩‍👧", &snippet),
        LINK,
    );
    assert!(draft.text().contains("👨‍👩‍👧"));
    assert_well_formed(&draft, LINK, LINK);
}

#[test]
fn truncation_never_splits_a_grapheme_cluster() {
    let config = AssemblerConfig {
        icon: String::new(),
        ..AssemblerConfig::default()
    };
    let title = "👍🏽".repeat(400);
    let draft = assemble(&config, &entry(&title, ""), LINK);

    // 300 - link (24) - separator (2) - ellipsis (1)
    let kept = DEFAULT_MAX_GRAPHEMES - grapheme_len(LINK) - 2 - 1;
    assert_eq!(
        draft.text(),
        format!("{}{ELLIPSIS}{SEPARATOR}{LINK}", "👍🏽".repeat(kept))
    );
    assert_eq!(draft.grapheme_len(), DEFAULT_MAX_GRAPHEMES);
    assert_eq!(
        draft.text().matches('👍').count(),
        draft.text().matches('🏽').count()
    );
    assert_well_formed(&draft, LINK, LINK);
}

#[test]
fn truncation_backs_off_to_whitespace() {
    let snippet = "word ".repeat(100);
    let draft = assemble(
        &placeholder_config(),
        &entry("Title", snippet.trim()),
        LINK,
    );
    let body = draft.text().strip_suffix("\n\nlink").unwrap();
    assert!(body.ends_with(&format!("word{ELLIPSIS}")));
    assert_well_formed(&draft, "link", LINK);
}

#[test]
fn oversized_url_falls_back_to_placeholder() {
    let long_link = format!("https://example.com/{}", "a".repeat(400));
    let draft = assemble(&AssemblerConfig::default(), &entry("Title", "Body."), &long_link);
    assert!(draft.text().ends_with("\n\nlink"));
    assert_well_formed(&draft, DEFAULT_PLACEHOLDER, &long_link);
}

#[test]
fn url_that_barely_fits_leaves_an_ellipsis_body() {
    let link = format!("https://e.com/{}", "a".repeat(DEFAULT_MAX_GRAPHEMES - 3 - 14));
    assert_eq!(grapheme_len(&link), DEFAULT_MAX_GRAPHEMES - 3);
    let draft = assemble(&AssemblerConfig::default(), &entry("Title", "Body."), &link);
    assert_eq!(draft.text(), format!("{ELLIPSIS}{SEPARATOR}{link}"));
    assert_eq!(draft.grapheme_len(), DEFAULT_MAX_GRAPHEMES);
    assert_well_formed(&draft, &link, &link);
}

#[test]
fn budget_holds_across_input_combinations() {
    let titles = [
        String::new(),
        "Hello World".to_string(),
        "🎉 Emoji 👨‍👩‍👧 title".to_string(),
        "Zalgo t\u{301}\u{302}\u{303}e\u{304}xt".to_string(),
        "長いタイトル".repeat(40),
        "T".repeat(350),
    ];
    let summaries = [
        String::new(),
        "A short post about nothing in particular.".to_string(),
        "x".repeat(400),
        "lorem ipsum dolor ".repeat(30),
        "🇺🇸🇯🇵🇩🇪".repeat(80),
        "e\u{301}".repeat(250),
    ];
    let links = [
        LINK.to_string(),
        format!("https://example.com/{}", "p".repeat(250)),
        format!("https://example.com/{}", "p".repeat(500)),
    ];
    let styles = [
        LinkStyle::Url,
        LinkStyle::Placeholder("link".to_string()),
        LinkStyle::Placeholder("read more 📖".to_string()),
    ];

    for style in &styles {
        let config = AssemblerConfig {
            link_style: style.clone(),
            ..AssemblerConfig::default()
        };
        for title in &titles {
            for summary in &summaries {
                let snippet = extract_snippet(summary, DEFAULT_SNIPPET_CHARS);
                for link in &links {
                    let draft = assemble(&config, &entry(title, &snippet), link);
                    assert!(
                        draft.grapheme_len() <= DEFAULT_MAX_GRAPHEMES,
                        "{} graphemes: {:?}",
                        draft.grapheme_len(),
                        draft.text()
                    );
                    let facet = &draft.facets()[0];
                    let marker = draft.facet_text(facet).expect("facet on char boundary");
                    match style {
                        LinkStyle::Url if grapheme_len(link) <= 297 => assert_eq!(marker, link),
                        LinkStyle::Url => assert_eq!(marker, DEFAULT_PLACEHOLDER),
                        LinkStyle::Placeholder(word) => assert_eq!(marker, word),
                    }
                    assert_eq!(facet.uri(), link);
                    assert_eq!(facet.byte_end(), draft.text().len());
                }
            }
        }
    }
}

#[test]
fn untruncated_inputs_appear_verbatim() {
    let title = "Release notes 🚀";
    let snippet = "Fixed a bug where émojis were miscounted.";
    let draft = assemble(&AssemblerConfig::default(), &entry(title, snippet), LINK);
    assert!(draft.text().contains(title));
    assert!(draft.text().contains(snippet));
    assert!(!draft.text().contains(ELLIPSIS));
}

#[test]
fn validate_rejects_budgets_without_room() {
    let config = AssemblerConfig {
        max_graphemes: 6,
        ..AssemblerConfig::default()
    };
    assert_eq!(
        config.validate(),
        Err(ConfigError::BudgetTooSmall {
            max: 6,
            marker: "link".to_string()
        })
    );

    let config = AssemblerConfig {
        max_graphemes: 7,
        ..AssemblerConfig::default()
    };
    assert_eq!(config.validate(), Ok(()));

    for max in [301, 500] {
        let config = AssemblerConfig {
            max_graphemes: max,
            ..AssemblerConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::BudgetAboveLimit {
                max,
                limit: DEFAULT_MAX_GRAPHEMES
            })
        );
    }

    let config = AssemblerConfig {
        max_graphemes: DEFAULT_MAX_GRAPHEMES,
        ..AssemblerConfig::default()
    };
    assert_eq!(config.validate(), Ok(()));

    let config = AssemblerConfig {
        link_style: LinkStyle::Placeholder(String::new()),
        ..AssemblerConfig::default()
    };
    assert_eq!(config.validate(), Err(ConfigError::EmptyPlaceholder));
}

#[test]
fn link_style_parses_config_values() {
    assert_eq!(LinkStyle::parse("url", None), Ok(LinkStyle::Url));
    assert_eq!(LinkStyle::parse("URL", Some("ignored")), Ok(LinkStyle::Url));
    assert_eq!(
        LinkStyle::parse("placeholder", None),
        Ok(LinkStyle::Placeholder("link".to_string()))
    );
    assert_eq!(
        LinkStyle::parse("placeholder", Some(" read ")),
        Ok(LinkStyle::Placeholder("read".to_string()))
    );
    assert_eq!(
        LinkStyle::parse("placeholder", Some("  ")),
        Err(ConfigError::EmptyPlaceholder)
    );
    assert_eq!(
        LinkStyle::parse("inline", None),
        Err(ConfigError::UnknownLinkStyle("inline".to_string()))
    );
}
