use storyloom_error::TemplateErrorKind;
use storyloom_narrative::{StoryloomConfig, TemplateId, TemplateValues, render};
use strum::IntoEnumIterator;

#[test]
fn test_render_substitutes_every_placeholder() {
    let values = TemplateValues::new()
        .with("topic", "a drowned village")
        .with("window", "# Return\n# Flood");
    let text = render("Topic: {topic}\nBeats:\n{window}\n{topic}", &values).unwrap();
    assert_eq!(
        text,
        "Topic: a drowned village\nBeats:\n# Return\n# Flood\na drowned village"
    );
}

#[test]
fn test_render_is_deterministic() {
    let values = TemplateValues::new().with("a", "1").with("b", "2");
    let first = render("{a}-{b}-{a}", &values).unwrap();
    let second = render("{a}-{b}-{a}", &values).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_missing_value_is_an_error() {
    let err = render("Hello {name}", &TemplateValues::new()).unwrap_err();
    assert_eq!(err.kind, TemplateErrorKind::MissingPlaceholder("name".into()));
}

#[test]
fn test_extra_values_are_ignored() {
    let values = TemplateValues::new().with("used", "x").with("unused", "y");
    assert_eq!(render("{used}", &values).unwrap(), "x");
}

#[test]
fn test_escaped_braces() {
    let text = render("{{\"beats\": [{n}]}}", &TemplateValues::new().with("n", "1")).unwrap();
    assert_eq!(text, "{\"beats\": [1]}");
}

#[test]
fn test_values_are_not_reinterpreted() {
    let values = TemplateValues::new().with("window", "{topic} }{");
    assert_eq!(render("<{window}>", &values).unwrap(), "<{topic} }{>");
}

#[test]
fn test_bundled_templates_render_with_stage_values() {
    let config = StoryloomConfig::bundled().unwrap();
    let templates = config.template_set().unwrap();
    let values = TemplateValues::new()
        .with("genre", "mystery")
        .with("conflict", "betrayal")
        .with("platform", "web serial")
        .with("tones", "tense,hopeful")
        .with("inspiration", "a lighthouse")
        .with("topic", "topic")
        .with("characters", "cast")
        .with("outline", "outline")
        .with("window", "# beat")
        .with("prose", "prose");

    for id in TemplateId::iter() {
        let text = templates.render(id, &values).unwrap();
        assert!(!text.trim().is_empty(), "{} rendered empty", id);
    }
}
