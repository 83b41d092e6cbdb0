//! Story generation command handlers.

use super::review::{Decision, Reviewer, apply_edit, draft_with_progress};
use storyloom::{
    ClientConfig, OpenAiCompatClient, SessionStore, Stage, StageMachine, StoryContext,
    StoryPipeline, StorySeed, StoryloomConfig, StoryloomResult, Transition,
};
use tracing::{info, instrument};

fn build_client(config: &StoryloomConfig) -> StoryloomResult<OpenAiCompatClient> {
    let mut client_config = ClientConfig::new(&config.model.base_url, &config.model.model);
    if let Some(api_key) = &config.model.api_key {
        client_config = client_config.with_api_key(api_key);
    }
    Ok(OpenAiCompatClient::new(client_config)?)
}

/// Start a new session from `seed` and review it stage by stage.
#[instrument(skip_all)]
pub async fn new_story(
    config: &StoryloomConfig,
    seed: StorySeed,
    auto_approve: bool,
) -> StoryloomResult<()> {
    seed.validate()?;
    let store = SessionStore::new(&config.sessions.base_dir);
    let session = store.create()?;
    let context = StoryContext::new(seed);
    store.save(&session, &context)?;

    println!("Session {}", session.name());
    review_session(config, &store, session.name(), context, auto_approve).await
}

/// Continue a saved session at its first unapproved stage.
#[instrument(skip(config))]
pub async fn resume_story(
    config: &StoryloomConfig,
    session: &str,
    auto_approve: bool,
) -> StoryloomResult<()> {
    let store = SessionStore::new(&config.sessions.base_dir);
    let context = store.load(session)?;
    println!("Resuming {} at {}", session, context.next_stage());
    review_session(config, &store, session, context, auto_approve).await
}

/// Regenerate one stage of a saved session and store the result.
#[instrument(skip(config))]
pub async fn regenerate_stage(
    config: &StoryloomConfig,
    session: &str,
    stage: Stage,
) -> StoryloomResult<()> {
    let store = SessionStore::new(&config.sessions.base_dir);
    let handle = store.open(session)?;
    let mut context = store.load(session)?;

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let pipeline = StoryPipeline::new(build_client(config)?, config)?.with_events(tx);

    let draft = draft_with_progress(&pipeline, &mut rx, stage, &context).await?;
    draft.approve_into(&mut context)?;
    store.save(&handle, &context)?;
    info!(%stage, "Stage regenerated and saved");
    Ok(())
}

async fn review_session(
    config: &StoryloomConfig,
    store: &SessionStore,
    session: &str,
    mut context: StoryContext,
    auto_approve: bool,
) -> StoryloomResult<()> {
    let handle = store.open(session)?;
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let pipeline = StoryPipeline::new(build_client(config)?, config)?.with_events(tx);
    let mut reviewer = Reviewer::stdin();
    let mut machine = StageMachine::starting_at(context.next_stage());

    while !machine.is_complete() {
        let stage = machine.stage();
        let mut draft = draft_with_progress(&pipeline, &mut rx, stage, &context).await?;

        let decision = if auto_approve {
            Decision::Transition(Transition::Approve)
        } else {
            reviewer.decide(stage).await
        };

        match decision {
            Decision::Transition(Transition::Approve) => {
                draft.approve_into(&mut context)?;
                store.save(&handle, &context)?;
                machine.apply(Transition::Approve)?;
            }
            Decision::Edit => match reviewer.read_edit(stage).await {
                Some(edited) => {
                    apply_edit(&mut draft, &edited);
                    draft.approve_into(&mut context)?;
                    store.save(&handle, &context)?;
                    machine.apply(Transition::Approve)?;
                    info!(%stage, "Edited draft approved");
                }
                None => println!("Nothing entered; regenerating {}.", stage),
            },
            Decision::Transition(transition) => {
                if let Err(e) = machine.apply(transition) {
                    eprintln!("{}", e.kind);
                }
            }
            Decision::Quit => {
                println!("Saved. Resume with: storyloom resume {}", session);
                return Ok(());
            }
        }
    }

    println!("\nStory complete: {}", handle.path().display());
    Ok(())
}
