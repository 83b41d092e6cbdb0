//! The guided story pipeline: seed → topic → characters → outline →
//! detailed outline → prose → title and teaser.

use crate::{
    ExpansionEvent, ExpansionExecutor, ExpansionRequest, ExpansionWarning, ModelSettings,
    ParseMode, Stage, StoryloomConfig, TemplateId, TemplateValues, parse_beats,
};
use derive_builder::Builder;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use storyloom_error::{PipelineError, PipelineErrorKind, StoryloomResult};
use storyloom_interface::Streaming;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{info, instrument, warn};

/// The parameters a story starts from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, Builder)]
#[builder(setter(into))]
pub struct StorySeed {
    /// Genre, e.g. "mystery"
    genre: String,
    /// Kind of central conflict, e.g. "betrayal"
    conflict: String,
    /// Target publishing platform
    platform: String,
    /// Emotional tones
    #[builder(default)]
    tones: Vec<String>,
    /// Free-text inspiration
    inspiration: String,
}

impl StorySeed {
    /// Builder for a seed.
    pub fn builder() -> StorySeedBuilder {
        StorySeedBuilder::default()
    }

    /// Reject a seed without inspiration.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.inspiration.trim().is_empty() {
            return Err(PipelineError::new(PipelineErrorKind::EmptyInspiration));
        }
        Ok(())
    }
}

/// The seed plus every approved artifact so far.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct StoryContext {
    /// Seed parameters
    seed: StorySeed,
    /// Approved topic
    topic: Option<String>,
    /// Approved character sheet
    characters: Option<String>,
    /// Approved coarse outline
    outline: Option<String>,
    /// Approved detailed outline
    detailed_outline: Option<String>,
    /// Approved prose
    prose: Option<String>,
    /// Approved title
    title: Option<String>,
    /// Approved teaser
    teaser: Option<String>,
}

impl StoryContext {
    /// A context with only the seed.
    pub fn new(seed: StorySeed) -> Self {
        Self {
            seed,
            topic: None,
            characters: None,
            outline: None,
            detailed_outline: None,
            prose: None,
            title: None,
            teaser: None,
        }
    }

    /// The approved text of a single-artifact stage.
    ///
    /// [`Stage::TitleTeaser`] yields the title.
    pub fn artifact(&self, stage: Stage) -> Option<&str> {
        match stage {
            Stage::Topic => self.topic.as_deref(),
            Stage::Characters => self.characters.as_deref(),
            Stage::Outline => self.outline.as_deref(),
            Stage::DetailedOutline => self.detailed_outline.as_deref(),
            Stage::Prose => self.prose.as_deref(),
            Stage::TitleTeaser => self.title.as_deref(),
            Stage::Seed | Stage::Complete => None,
        }
    }

    /// Store approved text for a single-artifact stage.
    pub fn set_artifact(&mut self, stage: Stage, text: impl Into<String>) -> Result<(), PipelineError> {
        let slot = match stage {
            Stage::Topic => &mut self.topic,
            Stage::Characters => &mut self.characters,
            Stage::Outline => &mut self.outline,
            Stage::DetailedOutline => &mut self.detailed_outline,
            Stage::Prose => &mut self.prose,
            Stage::TitleTeaser => &mut self.title,
            Stage::Seed | Stage::Complete => {
                return Err(PipelineError::new(PipelineErrorKind::NothingToGenerate(
                    stage.to_string(),
                )));
            }
        };
        *slot = Some(text.into());
        Ok(())
    }

    /// Store the approved teaser.
    pub fn set_teaser(&mut self, teaser: impl Into<String>) {
        self.teaser = Some(teaser.into());
    }

    /// The first stage whose artifact has not been approved.
    pub fn next_stage(&self) -> Stage {
        let pending = [
            Stage::Topic,
            Stage::Characters,
            Stage::Outline,
            Stage::DetailedOutline,
            Stage::Prose,
        ]
        .into_iter()
        .find(|stage| self.artifact(*stage).is_none());

        match pending {
            Some(stage) => stage,
            None if self.title.is_none() || self.teaser.is_none() => Stage::TitleTeaser,
            None => Stage::Complete,
        }
    }

    /// Seed values plus every approved artifact, by placeholder name.
    ///
    /// `outline` holds the coarse outline here; expansion stages replace it
    /// with their own input text.
    pub fn template_values(&self) -> TemplateValues {
        let mut values = TemplateValues::new()
            .with("genre", self.seed.genre.as_str())
            .with("conflict", self.seed.conflict.as_str())
            .with("platform", self.seed.platform.as_str())
            .with("tones", self.seed.tones.join(","))
            .with("inspiration", self.seed.inspiration.as_str());

        let optional = [
            ("topic", &self.topic),
            ("characters", &self.characters),
            ("outline", &self.outline),
            ("prose", &self.prose),
        ];
        for (name, value) in optional {
            if let Some(value) = value {
                values.insert(name, value.as_str());
            }
        }
        values
    }

    fn require(&self, stage: Stage, input: Stage) -> Result<&str, PipelineError> {
        self.artifact(input).ok_or_else(|| {
            PipelineError::new(PipelineErrorKind::MissingInput {
                stage: stage.to_string(),
                input: input.to_string(),
            })
        })
    }
}

/// A generated, not yet approved, stage result.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct StageDraft {
    /// Stage that produced the draft
    stage: Stage,
    /// Draft text (the title for [`Stage::TitleTeaser`])
    text: String,
    /// Teaser, for [`Stage::TitleTeaser`] only
    teaser: Option<String>,
    /// Problems met while generating
    warnings: Vec<ExpansionWarning>,
}

impl StageDraft {
    /// Replace the draft text with a reviewer's edit.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// Replace the teaser with a reviewer's edit.
    pub fn set_teaser(&mut self, teaser: impl Into<String>) {
        self.teaser = Some(teaser.into());
    }

    /// Store the draft as the approved artifact of its stage.
    pub fn approve_into(self, context: &mut StoryContext) -> Result<(), PipelineError> {
        context.set_artifact(self.stage, self.text)?;
        if let Some(teaser) = self.teaser {
            context.set_teaser(teaser);
        }
        info!(stage = %self.stage, "Draft approved");
        Ok(())
    }
}

/// Generates a draft for any pipeline stage.
pub struct StoryPipeline<D: Streaming> {
    executor: ExpansionExecutor<D>,
    model: ModelSettings,
    parse_mode: ParseMode,
}

impl<D: Streaming> StoryPipeline<D> {
    /// Build a pipeline around `driver` from validated configuration.
    ///
    /// # Errors
    ///
    /// Fails if the configured templates are incomplete.
    pub fn new(driver: D, config: &StoryloomConfig) -> StoryloomResult<Self> {
        let templates = config.template_set()?;
        let executor = ExpansionExecutor::new(driver, templates, config.expansion.clone())
            .with_sampling(config.model.temperature, config.model.top_p);
        Ok(Self {
            executor,
            model: config.model.clone(),
            parse_mode: ParseMode::sections(config.expansion.section_marker().as_str()),
        })
    }

    /// Report generation progress on `events`.
    pub fn with_events(mut self, events: UnboundedSender<ExpansionEvent>) -> Self {
        self.executor = self.executor.with_events(events);
        self
    }

    /// Get the underlying executor.
    pub fn executor(&self) -> &ExpansionExecutor<D> {
        &self.executor
    }

    /// Generate the draft for `stage` from the approved artifacts in `context`.
    ///
    /// # Errors
    ///
    /// Fails if an input artifact is missing, the seed is invalid, or a
    /// template cannot be rendered. Completion failures do not fail the
    /// draft; they appear as placeholders and warnings.
    #[instrument(skip(self, stage, context), fields(stage = %stage))]
    pub async fn draft(&self, stage: Stage, context: &StoryContext) -> StoryloomResult<StageDraft> {
        context.seed().validate()?;
        info!("Generating draft");

        let values = context.template_values();
        let max_tokens = self.model.max_output_tokens;
        let sigil = self.executor.settings().sigil().as_str();

        let draft = match stage {
            Stage::Seed | Stage::Complete => {
                return Err(PipelineError::new(PipelineErrorKind::NothingToGenerate(
                    stage.to_string(),
                ))
                .into());
            }
            Stage::Topic => self.single(stage, TemplateId::Topic, &values, max_tokens).await?,
            Stage::Characters => {
                context.require(stage, Stage::Topic)?;
                self.single(stage, TemplateId::Characters, &values, max_tokens)
                    .await?
            }
            Stage::Outline => {
                context.require(stage, Stage::Topic)?;
                context.require(stage, Stage::Characters)?;
                self.single(stage, TemplateId::Outline, &values, max_tokens)
                    .await?
            }
            Stage::DetailedOutline => {
                let outline = context.require(stage, Stage::Outline)?;
                let beats = parse_beats(outline, &ParseMode::Lines, sigil);
                if beats.is_empty() {
                    warn!("Outline contains no beats");
                }
                let request = ExpansionRequest::outline(beats, values, max_tokens);
                self.expand(stage, &request).await?
            }
            Stage::Prose => {
                let detailed = context.require(stage, Stage::DetailedOutline)?;
                let beats = parse_beats(detailed, &self.parse_mode, sigil);
                if beats.is_empty() {
                    warn!("Detailed outline contains no beats");
                }
                let values = values.with("outline", detailed);
                let request =
                    ExpansionRequest::prose(beats, values, self.model.prose_max_output_tokens);
                self.expand(stage, &request).await?
            }
            Stage::TitleTeaser => {
                context.require(stage, Stage::Prose)?;
                let title = self
                    .executor
                    .generate_single(TemplateId::Title, &values, max_tokens)
                    .await?;
                let teaser = self
                    .executor
                    .generate_single(TemplateId::Teaser, &values, max_tokens)
                    .await?;

                let mut warnings = title.warnings().clone();
                warnings.extend(teaser.warnings().iter().cloned());
                StageDraft {
                    stage,
                    text: title.text().trim().to_string(),
                    teaser: Some(teaser.text().trim().to_string()),
                    warnings,
                }
            }
        };

        info!(
            length = draft.text.len(),
            warnings = draft.warnings.len(),
            "Draft generated"
        );
        Ok(draft)
    }

    async fn single(
        &self,
        stage: Stage,
        template: TemplateId,
        values: &TemplateValues,
        max_tokens: u32,
    ) -> StoryloomResult<StageDraft> {
        let artifact = self
            .executor
            .generate_single(template, values, max_tokens)
            .await?;
        Ok(StageDraft {
            stage,
            warnings: artifact.warnings().clone(),
            text: artifact.into_text(),
            teaser: None,
        })
    }

    async fn expand(&self, stage: Stage, request: &ExpansionRequest) -> StoryloomResult<StageDraft> {
        let artifact = self.executor.expand(request).await?;
        Ok(StageDraft {
            stage,
            warnings: artifact.warnings().clone(),
            text: artifact.into_text(),
            teaser: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed() -> StorySeed {
        StorySeed::builder()
            .genre("mystery")
            .conflict("betrayal")
            .platform("web serial")
            .tones(vec!["tense".to_string(), "bittersweet".to_string()])
            .inspiration("a lighthouse keeper who hears knocking")
            .build()
            .unwrap()
    }

    #[test]
    fn test_next_stage_follows_approvals() {
        let mut context = StoryContext::new(seed());
        assert_eq!(context.next_stage(), Stage::Topic);
        context.set_artifact(Stage::Topic, "topic").unwrap();
        context.set_artifact(Stage::Characters, "cast").unwrap();
        assert_eq!(context.next_stage(), Stage::Outline);
        for stage in [Stage::Outline, Stage::DetailedOutline, Stage::Prose, Stage::TitleTeaser] {
            context.set_artifact(stage, "text").unwrap();
        }
        assert_eq!(context.next_stage(), Stage::TitleTeaser);
        context.set_teaser("teaser");
        assert_eq!(context.next_stage(), Stage::Complete);
    }

    #[test]
    fn test_template_values_join_tones() {
        let context = StoryContext::new(seed());
        let values = context.template_values();
        assert_eq!(values.get("tones"), Some("tense,bittersweet"));
        assert_eq!(values.get("topic"), None);
    }

    #[test]
    fn test_blank_inspiration_rejected() {
        let mut seed = seed();
        seed.inspiration = "  ".into();
        let err = seed.validate().unwrap_err();
        assert_eq!(err.kind, PipelineErrorKind::EmptyInspiration);
    }
}
