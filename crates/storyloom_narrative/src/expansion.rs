//! Window-by-window expansion of a beat sequence.
//!
//! The executor walks the windows planned by a [`WindowPolicy`], renders one
//! prompt per window and sends it together with every earlier prompt and
//! response, so each window is written in the context of the ones before it.
//! Windows are strictly sequential; a failed window gets a marked
//! placeholder and the run carries on.

use crate::{ExpansionSettings, TemplateId, TemplateSet, TemplateValues, WindowPolicy};
use derive_builder::Builder;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use storyloom_core::{CompletionRequest, Message};
use storyloom_error::{
    BuilderError, BuilderErrorKind, CompletionErrorKind, StoryloomError, StoryloomErrorKind,
    StoryloomResult,
};
use storyloom_interface::{FinishReason, Streaming, collect_completion};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, instrument, warn};

/// How segments are joined into the artifact text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LabelStyle {
    /// Segments joined as they are
    #[default]
    Plain,
    /// Each segment prefixed with its zero-padded 1-based number
    Numbered,
}

/// Everything one expansion run needs besides the driver and templates.
#[derive(Debug, Clone, PartialEq, Getters, Builder)]
#[builder(setter(into))]
pub struct ExpansionRequest {
    /// Beats to expand, already filtered
    beats: Vec<String>,
    /// How beats are grouped into windows
    policy: WindowPolicy,
    /// Template for the opening window
    first_template: TemplateId,
    /// Template for every later window
    subsequent_template: TemplateId,
    /// Fixed values shared by every window; `outline` only reaches the opening window
    #[builder(default)]
    values: TemplateValues,
    /// Output limit per window
    max_tokens: u32,
    /// Segment labelling
    #[builder(default)]
    labels: LabelStyle,
}

impl ExpansionRequest {
    /// Builder for a custom request.
    pub fn builder() -> ExpansionRequestBuilder {
        ExpansionRequestBuilder::default()
    }

    /// Detailed-outline expansion over coarse outline beats.
    pub fn outline(beats: Vec<String>, values: TemplateValues, max_tokens: u32) -> Self {
        Self {
            beats,
            policy: WindowPolicy::Outline,
            first_template: TemplateId::DetailedOutlineFirst,
            subsequent_template: TemplateId::DetailedOutlineSubsequent,
            values,
            max_tokens,
            labels: LabelStyle::Plain,
        }
    }

    /// Prose expansion over detailed-outline beats.
    pub fn prose(beats: Vec<String>, values: TemplateValues, max_tokens: u32) -> Self {
        Self {
            beats,
            policy: WindowPolicy::Prose,
            first_template: TemplateId::ProseFirst,
            subsequent_template: TemplateId::ProseSubsequent,
            values,
            max_tokens,
            labels: LabelStyle::Numbered,
        }
    }
}

/// What went wrong (non-fatally) with a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum WarningKind {
    /// The completion call failed; a placeholder was used
    CompletionFailed,
    /// The completion produced no text; a placeholder was used
    EmptyResponse,
    /// The text is long enough that it probably hit the output limit
    PossiblyTruncated,
}

/// A non-fatal problem surfaced to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, derive_more::Display)]
#[display("window {} ({}): {}", window, kind, message)]
pub struct ExpansionWarning {
    /// 1-based window number
    window: usize,
    /// Category of the problem
    kind: WarningKind,
    /// Human-readable detail
    message: String,
}

impl ExpansionWarning {
    /// Create a warning for window `window`.
    pub fn new(window: usize, kind: WarningKind, message: impl Into<String>) -> Self {
        Self {
            window,
            kind,
            message: message.into(),
        }
    }
}

/// The output of one window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct Segment {
    /// 1-based window number
    number: usize,
    /// Beat indices the window covered
    indices: Vec<usize>,
    /// Generated text, or the placeholder if `failed`
    text: String,
    /// Whether the placeholder was substituted
    failed: bool,
}

impl Segment {
    fn label(&self, style: LabelStyle) -> String {
        match style {
            LabelStyle::Plain => self.text.clone(),
            LabelStyle::Numbered => format!("{:03}\n{}", self.number, self.text.trim()),
        }
    }
}

/// The result of one expansion run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct ExpansionArtifact {
    /// Segments joined by blank lines, labelled per the request
    text: String,
    /// Per-window output in window order
    segments: Vec<Segment>,
    /// Non-fatal problems, in the order they occurred
    warnings: Vec<ExpansionWarning>,
}

impl ExpansionArtifact {
    fn assemble(segments: Vec<Segment>, warnings: Vec<ExpansionWarning>, style: LabelStyle) -> Self {
        let text = segments
            .iter()
            .map(|segment| segment.label(style))
            .collect::<Vec<_>>()
            .join("\n\n");
        Self {
            text,
            segments,
            warnings,
        }
    }

    /// Whether any window fell back to the placeholder.
    pub fn has_failures(&self) -> bool {
        self.segments.iter().any(|s| s.failed)
    }

    /// Consume the artifact, keeping only its text.
    pub fn into_text(self) -> String {
        self.text
    }
}

/// Live progress of an expansion run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpansionEvent {
    /// A window's prompt was rendered and is being sent
    WindowStarted {
        /// 1-based window number
        number: usize,
        /// Total windows in this run
        total: usize,
        /// Beat indices of the window
        indices: Vec<usize>,
    },
    /// A piece of generated text arrived
    Fragment {
        /// 1-based window number
        number: usize,
        /// The new text
        text: String,
    },
    /// A window is done
    WindowFinished {
        /// 1-based window number
        number: usize,
        /// Whether the placeholder was substituted
        failed: bool,
    },
    /// A warning was recorded
    Warning(ExpansionWarning),
}

/// Expands beat sequences through a streaming completion driver.
pub struct ExpansionExecutor<D: Streaming> {
    driver: D,
    templates: TemplateSet,
    settings: ExpansionSettings,
    temperature: Option<f32>,
    top_p: Option<f32>,
    events: Option<UnboundedSender<ExpansionEvent>>,
}

impl<D: Streaming> ExpansionExecutor<D> {
    /// Create an executor using the endpoint's default sampling.
    pub fn new(driver: D, templates: TemplateSet, settings: ExpansionSettings) -> Self {
        Self {
            driver,
            templates,
            settings,
            temperature: None,
            top_p: None,
            events: None,
        }
    }

    /// Set sampling parameters sent with every request.
    pub fn with_sampling(mut self, temperature: f32, top_p: f32) -> Self {
        self.temperature = Some(temperature);
        self.top_p = Some(top_p);
        self
    }

    /// Report progress on `events`.
    ///
    /// Sending never blocks; a closed receiver is ignored.
    pub fn with_events(mut self, events: UnboundedSender<ExpansionEvent>) -> Self {
        self.events = Some(events);
        self
    }

    /// Get a reference to the driver.
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Get the templates.
    pub fn templates(&self) -> &TemplateSet {
        &self.templates
    }

    /// Get the expansion settings.
    pub fn settings(&self) -> &ExpansionSettings {
        &self.settings
    }

    /// Expand every window of `request`, in order.
    ///
    /// # Errors
    ///
    /// Only template errors abort the run. Completion failures are replaced
    /// by the configured placeholder and reported as warnings.
    #[instrument(
        skip(self, request),
        fields(
            provider = self.driver.provider_name(),
            policy = %request.policy(),
            beats = request.beats().len(),
        )
    )]
    pub async fn expand(&self, request: &ExpansionRequest) -> StoryloomResult<ExpansionArtifact> {
        let windows = request.policy().plan(request.beats().len());
        let total = windows.len();
        info!(windows = total, "Starting expansion");

        let mut history: Vec<Message> = Vec::with_capacity(total * 2);
        let mut segments = Vec::with_capacity(total);
        let mut warnings = Vec::new();

        for (position, window) in windows.iter().enumerate() {
            let number = position + 1;
            let template = if *window.opening() {
                *request.first_template()
            } else {
                *request.subsequent_template()
            };

            // later windows see the outline only through the conversation
            let mut values = request.values().clone();
            if !*window.opening() {
                values.remove("outline");
            }
            values.insert("window", window.text(request.beats()));
            let prompt = self.templates.render(template, &values)?;

            debug!(
                number,
                total,
                template = %template,
                indices = ?window.indices(),
                history = history.len(),
                "Expanding window"
            );
            self.emit(ExpansionEvent::WindowStarted {
                number,
                total,
                indices: window.indices().clone(),
            });

            let (text, failed) = self
                .run_turn(&history, &prompt, *request.max_tokens(), number, &mut warnings)
                .await;

            history.push(Message::user(prompt));
            history.push(Message::assistant(text.clone()));

            self.emit(ExpansionEvent::WindowFinished { number, failed });
            segments.push(Segment {
                number,
                indices: window.indices().clone(),
                text,
                failed,
            });
        }

        let artifact = ExpansionArtifact::assemble(segments, warnings, *request.labels());
        info!(
            windows = total,
            warnings = artifact.warnings.len(),
            length = artifact.text.len(),
            "Expansion finished"
        );
        Ok(artifact)
    }

    /// Render `template` and run it as a single turn with no history.
    ///
    /// Failures are handled like a failed window: the placeholder is used and
    /// a warning recorded.
    ///
    /// # Errors
    ///
    /// Returns an error only if the template cannot be rendered.
    #[instrument(skip(self, values), fields(provider = self.driver.provider_name()))]
    pub async fn generate_single(
        &self,
        template: TemplateId,
        values: &TemplateValues,
        max_tokens: u32,
    ) -> StoryloomResult<ExpansionArtifact> {
        let prompt = self.templates.render(template, values)?;
        self.emit(ExpansionEvent::WindowStarted {
            number: 1,
            total: 1,
            indices: Vec::new(),
        });

        let mut warnings = Vec::new();
        let (text, failed) = self.run_turn(&[], &prompt, max_tokens, 1, &mut warnings).await;
        self.emit(ExpansionEvent::WindowFinished { number: 1, failed });

        let segment = Segment {
            number: 1,
            indices: Vec::new(),
            text,
            failed,
        };
        Ok(ExpansionArtifact::assemble(
            vec![segment],
            warnings,
            LabelStyle::Plain,
        ))
    }

    /// Send one turn and return its text, or the placeholder on failure.
    async fn run_turn(
        &self,
        history: &[Message],
        prompt: &str,
        max_tokens: u32,
        number: usize,
        warnings: &mut Vec<ExpansionWarning>,
    ) -> (String, bool) {
        match self.complete(history, prompt, max_tokens, number).await {
            Ok((text, finish_reason)) if !text.trim().is_empty() => {
                let limit = max_tokens as usize * self.settings.chars_per_token();
                let length = text.chars().count();
                if length >= limit || finish_reason == Some(FinishReason::Length) {
                    self.record(
                        warnings,
                        ExpansionWarning::new(
                            number,
                            WarningKind::PossiblyTruncated,
                            format!(
                                "{} characters for a limit of {} tokens; consider raising the limit",
                                length, max_tokens
                            ),
                        ),
                    );
                }
                (text, false)
            }
            Ok(_) => self.substitute(number, WarningKind::EmptyResponse, "no text returned", warnings),
            Err(e) if is_empty_response(&e) => {
                self.substitute(number, WarningKind::EmptyResponse, "no text returned", warnings)
            }
            Err(e) => self.substitute(number, WarningKind::CompletionFailed, e.to_string(), warnings),
        }
    }

    /// Record a warning for window `number` and return its placeholder.
    fn substitute(
        &self,
        number: usize,
        kind: WarningKind,
        message: impl Into<String>,
        warnings: &mut Vec<ExpansionWarning>,
    ) -> (String, bool) {
        self.record(warnings, ExpansionWarning::new(number, kind, message));
        (self.settings.placeholder_for(number), true)
    }

    async fn complete(
        &self,
        history: &[Message],
        prompt: &str,
        max_tokens: u32,
        number: usize,
    ) -> StoryloomResult<(String, Option<FinishReason>)> {
        let mut messages = history.to_vec();
        messages.push(Message::user(prompt));

        let mut builder = CompletionRequest::builder();
        builder.messages(messages).max_tokens(max_tokens);
        if let Some(temperature) = self.temperature {
            builder.temperature(temperature);
        }
        if let Some(top_p) = self.top_p {
            builder.top_p(top_p);
        }
        let request = builder.build().map_err(|e| {
            BuilderError::new(BuilderErrorKind::ValidationFailed(e.to_string()))
        })?;

        let (response, finish_reason) = collect_completion(&self.driver, &request, |fragment| {
            self.emit(ExpansionEvent::Fragment {
                number,
                text: fragment.to_string(),
            })
        })
        .await?;

        Ok((response.into_text(), finish_reason))
    }

    fn record(&self, warnings: &mut Vec<ExpansionWarning>, warning: ExpansionWarning) {
        warn!(
            window = warning.window,
            kind = %warning.kind,
            message = %warning.message,
            "Window expansion problem"
        );
        self.emit(ExpansionEvent::Warning(warning.clone()));
        warnings.push(warning);
    }

    fn emit(&self, event: ExpansionEvent) {
        if let Some(events) = &self.events {
            let _ = events.send(event);
        }
    }
}

fn is_empty_response(error: &StoryloomError) -> bool {
    matches!(
        error.kind(),
        StoryloomErrorKind::Completion(e) if e.kind == CompletionErrorKind::EmptyResponse
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(number: usize, text: &str) -> Segment {
        Segment {
            number,
            indices: vec![number - 1],
            text: text.to_string(),
            failed: false,
        }
    }

    #[test]
    fn test_numbered_labels_are_zero_padded() {
        let artifact = ExpansionArtifact::assemble(
            vec![segment(1, " First \n"), segment(2, "Second")],
            Vec::new(),
            LabelStyle::Numbered,
        );
        assert_eq!(artifact.text(), "001\nFirst\n\n002\nSecond");
    }

    #[test]
    fn test_plain_labels_keep_text() {
        let artifact = ExpansionArtifact::assemble(
            vec![segment(1, "A"), segment(2, "B")],
            Vec::new(),
            LabelStyle::Plain,
        );
        assert_eq!(artifact.text(), "A\n\nB");
        assert!(!artifact.has_failures());
    }
}
