mod test_utils;

use storyloom_error::{PipelineErrorKind, StoryloomErrorKind};
use storyloom_narrative::{
    Stage, StageMachine, StoryContext, StoryPipeline, StorySeed, StoryloomConfig, Transition,
};
use test_utils::{MockDriver, MockResponse};

const TEST_CONFIG: &str = r#"
[templates]
topic = "TOPIC {genre}|{conflict}|{platform}|{tones}|{inspiration}"
characters = "CHARACTERS {topic}"
outline = "OUTLINE {topic}|{characters}"
detailed_outline_first = "DFIRST {outline} :: {window}"
detailed_outline_subsequent = "DNEXT {window}"
prose_first = "PFIRST {window}"
prose_subsequent = "PNEXT {window}"
title = "TITLE {prose}"
teaser = "TEASER {prose}"
"#;

fn seed() -> StorySeed {
    StorySeed::builder()
        .genre("mystery")
        .conflict("betrayal")
        .platform("web serial")
        .tones(vec!["tense".to_string(), "hopeful".to_string()])
        .inspiration("a lighthouse keeper hears knocking")
        .build()
        .unwrap()
}

fn pipeline(driver: MockDriver) -> StoryPipeline<MockDriver> {
    let config = StoryloomConfig::from_toml_str(TEST_CONFIG).unwrap();
    StoryPipeline::new(driver, &config).unwrap()
}

#[tokio::test]
async fn test_full_pipeline_run() {
    let driver = MockDriver::scripted(vec![
        MockResponse::Text("The keeper's secret".into()),
        MockResponse::Text("Mara, the keeper".into()),
        MockResponse::Text(r##"["# Knock", "# Search", "# Door", "# Dawn"]"##.into()),
        // detailed outline: preview + 3 sweep windows
        MockResponse::Text("## Conflict 1\nMara hears it.".into()),
        MockResponse::Text("## Conflict 2\nShe searches.".into()),
        MockResponse::Text("## Conflict 3\nThe door.".into()),
        MockResponse::Text("## Conflict 4\nDawn.".into()),
    ]);
    let pipeline = pipeline(driver.clone());
    let mut context = StoryContext::new(seed());
    let mut machine = StageMachine::new();
    machine.apply(Transition::Approve).unwrap();

    while !machine.is_complete() {
        let stage = machine.stage();
        let draft = pipeline.draft(stage, &context).await.unwrap();
        assert_eq!(*draft.stage(), stage);
        draft.approve_into(&mut context).unwrap();
        machine.apply(Transition::Approve).unwrap();
    }

    assert_eq!(context.next_stage(), Stage::Complete);
    assert_eq!(context.topic().as_deref(), Some("The keeper's secret"));

    let prompts = driver.prompts();
    assert_eq!(
        prompts[0],
        "TOPIC mystery|betrayal|web serial|tense,hopeful|a lighthouse keeper hears knocking"
    );
    assert_eq!(prompts[1], "CHARACTERS The keeper's secret");
    assert!(prompts[3].starts_with("DFIRST [\"# Knock\""));
    assert!(prompts[3].ends_with(":: # Knock\n# Door\n# Dawn"));
    assert_eq!(prompts[4], "DNEXT # Search");

    // The detailed outline's "## Conflict" sections become prose beats.
    let detailed = context.detailed_outline().clone().unwrap();
    assert!(prompts[7].starts_with("PFIRST ## Conflict 1"));
    assert_eq!(prompts.len(), 7 + 4 + 2);
    assert!(!detailed.is_empty());

    let prose = context.prose().clone().unwrap();
    assert!(prose.starts_with("001\n"));
    assert!(prose.contains("\n\n004\n"));
    assert_eq!(context.title().as_deref(), Some("reply 12"));
    assert_eq!(context.teaser().as_deref(), Some("reply 13"));
}

#[tokio::test]
async fn test_draft_requires_approved_inputs() {
    let pipeline = pipeline(MockDriver::new());
    let context = StoryContext::new(seed());

    let err = pipeline.draft(Stage::Prose, &context).await.unwrap_err();
    match err.kind() {
        StoryloomErrorKind::Pipeline(e) => assert_eq!(
            e.kind,
            PipelineErrorKind::MissingInput {
                stage: "prose".into(),
                input: "detailed_outline".into(),
            }
        ),
        other => panic!("unexpected error: {}", other),
    }
}

#[tokio::test]
async fn test_seed_and_complete_have_no_draft() {
    let pipeline = pipeline(MockDriver::new());
    let context = StoryContext::new(seed());
    assert!(pipeline.draft(Stage::Seed, &context).await.is_err());
    assert!(pipeline.draft(Stage::Complete, &context).await.is_err());
}

#[tokio::test]
async fn test_failed_single_shot_stage_yields_placeholder() {
    let driver = MockDriver::scripted(vec![MockResponse::Empty]);
    let pipeline = pipeline(driver);
    let context = StoryContext::new(seed());

    let draft = pipeline.draft(Stage::Topic, &context).await.unwrap();

    assert!(draft.text().contains("failed to generate"));
    assert_eq!(draft.warnings().len(), 1);
}

#[tokio::test]
async fn test_edited_draft_is_what_gets_approved() {
    let pipeline = pipeline(MockDriver::new());
    let mut context = StoryContext::new(seed());

    let mut draft = pipeline.draft(Stage::Topic, &context).await.unwrap();
    draft.set_text("A hand-written topic");
    draft.approve_into(&mut context).unwrap();

    assert_eq!(context.topic().as_deref(), Some("A hand-written topic"));
    assert_eq!(context.next_stage(), Stage::Characters);
}

#[tokio::test]
async fn test_blank_inspiration_is_rejected() {
    let pipeline = pipeline(MockDriver::new());
    let seed = StorySeed::builder()
        .genre("g")
        .conflict("c")
        .platform("p")
        .inspiration("   ")
        .build()
        .unwrap();

    let err = pipeline
        .draft(Stage::Topic, &StoryContext::new(seed))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Inspiration"));
}

#[test]
fn test_stage_machine_transitions() {
    let mut machine = StageMachine::new();
    assert!(machine.apply(Transition::Regenerate).is_err());
    assert_eq!(machine.apply(Transition::Approve).unwrap(), Stage::Topic);
    assert_eq!(machine.apply(Transition::Regenerate).unwrap(), Stage::Topic);
    assert!(machine.apply(Transition::Back).is_err());
    assert_eq!(machine.stage(), Stage::Topic);

    assert_eq!(machine.apply(Transition::Approve).unwrap(), Stage::Characters);
    assert_eq!(machine.apply(Transition::Back).unwrap(), Stage::Topic);

    let mut machine = StageMachine::starting_at(Stage::TitleTeaser);
    assert_eq!(machine.apply(Transition::Approve).unwrap(), Stage::Complete);
    assert!(machine.is_complete());
    assert!(machine.apply(Transition::Approve).is_err());
    assert!(machine.apply(Transition::Regenerate).is_err());
}
