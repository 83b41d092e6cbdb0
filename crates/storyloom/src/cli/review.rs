//! Terminal review loop: live draft output and reviewer decisions.

use std::io::Write;
use storyloom::{
    ExpansionEvent, Stage, StageDraft, StoryContext, StoryPipeline, StoryloomResult, Streaming,
    Transition,
};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::mpsc::UnboundedReceiver;

/// What the reviewer wants to do with a draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Apply a stage transition
    Transition(Transition),
    /// Replace the draft with typed text, then approve it
    Edit,
    /// Stop and keep what has been saved
    Quit,
}

impl Decision {
    /// Parse a reviewer's answer.
    pub fn parse(answer: &str) -> Option<Self> {
        match answer.trim().to_ascii_lowercase().as_str() {
            "a" | "approve" => Some(Self::Transition(Transition::Approve)),
            "r" | "regenerate" => Some(Self::Transition(Transition::Regenerate)),
            "b" | "back" => Some(Self::Transition(Transition::Back)),
            "e" | "edit" => Some(Self::Edit),
            "q" | "quit" => Some(Self::Quit),
            _ => None,
        }
    }
}

/// Reads decisions from stdin.
pub struct Reviewer {
    lines: Lines<BufReader<Stdin>>,
}

impl Reviewer {
    /// A reviewer on the process's stdin.
    pub fn stdin() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }

    /// Ask until a valid answer arrives. End of input means quit.
    pub async fn decide(&mut self, stage: Stage) -> Decision {
        loop {
            print!("\n[{}] (a)pprove, (e)dit, (r)egenerate, (b)ack, (q)uit > ", stage);
            let _ = std::io::stdout().flush();

            match self.lines.next_line().await {
                Ok(Some(line)) => match Decision::parse(&line) {
                    Some(decision) => return decision,
                    None => println!("Please answer a, e, r, b or q."),
                },
                Ok(None) => return Decision::Quit,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to read from stdin");
                    return Decision::Quit;
                }
            }
        }
    }

    /// Read replacement text up to a line holding a single `.`.
    ///
    /// Returns `None` when nothing but whitespace was typed.
    pub async fn read_edit(&mut self, stage: Stage) -> Option<String> {
        if stage == Stage::TitleTeaser {
            println!("Type the title on the first line and the teaser below it.");
        }
        println!("Enter the replacement text; finish with a line containing only '.'");

        let mut typed = Vec::new();
        loop {
            match self.lines.next_line().await {
                Ok(Some(line)) if line.trim_end() == "." => break,
                Ok(Some(line)) => typed.push(line),
                Ok(None) => break,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to read from stdin");
                    return None;
                }
            }
        }

        let typed = typed.join("\n");
        if typed.trim().is_empty() { None } else { Some(typed) }
    }
}

/// Put a reviewer's replacement text into `draft`.
///
/// For [`Stage::TitleTeaser`] the first non-blank line is the title and the
/// rest, if any, replaces the teaser.
pub fn apply_edit(draft: &mut StageDraft, edited: &str) {
    let (text, teaser) = split_edit(*draft.stage(), edited);
    draft.set_text(text);
    if let Some(teaser) = teaser {
        draft.set_teaser(teaser);
    }
}

fn split_edit(stage: Stage, edited: &str) -> (String, Option<String>) {
    let edited = edited.trim();
    if stage != Stage::TitleTeaser {
        return (edited.to_string(), None);
    }
    match edited.split_once('\n') {
        Some((title, teaser)) if !teaser.trim().is_empty() => {
            (title.trim().to_string(), Some(teaser.trim().to_string()))
        }
        Some((title, _)) => (title.trim().to_string(), None),
        None => (edited.to_string(), None),
    }
}

/// Generate the draft for `stage`, printing its text as it streams in.
pub async fn draft_with_progress<D: Streaming>(
    pipeline: &StoryPipeline<D>,
    events: &mut UnboundedReceiver<ExpansionEvent>,
    stage: Stage,
    context: &StoryContext,
) -> StoryloomResult<StageDraft> {
    println!("\n=== {} ===", stage);

    let draft = pipeline.draft(stage, context);
    tokio::pin!(draft);
    let draft = loop {
        tokio::select! {
            result = &mut draft => break result?,
            Some(event) = events.recv() => print_event(&event),
        }
    };
    while let Ok(event) = events.try_recv() {
        print_event(&event);
    }
    println!();

    if stage == Stage::TitleTeaser {
        println!("\nTitle:  {}", draft.text());
        if let Some(teaser) = draft.teaser() {
            println!("Teaser: {}", teaser);
        }
    }
    Ok(draft)
}

fn print_event(event: &ExpansionEvent) {
    match event {
        ExpansionEvent::WindowStarted { number, total, .. } if *total > 1 => {
            println!("\n--- {}/{} ---", number, total);
        }
        ExpansionEvent::WindowStarted { .. } => {}
        ExpansionEvent::Fragment { text, .. } => {
            print!("{}", text);
            let _ = std::io::stdout().flush();
        }
        ExpansionEvent::WindowFinished { .. } => {}
        ExpansionEvent::Warning(warning) => {
            eprintln!("\nwarning: {}", warning);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decision_parse() {
        assert_eq!(
            Decision::parse(" A\n"),
            Some(Decision::Transition(Transition::Approve))
        );
        assert_eq!(
            Decision::parse("regenerate"),
            Some(Decision::Transition(Transition::Regenerate))
        );
        assert_eq!(Decision::parse("b"), Some(Decision::Transition(Transition::Back)));
        assert_eq!(Decision::parse("q"), Some(Decision::Quit));
        assert_eq!(Decision::parse("Edit"), Some(Decision::Edit));
        assert_eq!(Decision::parse("e"), Some(Decision::Edit));
        assert_eq!(Decision::parse("x"), None);
    }

    #[test]
    fn test_edit_replaces_whole_text_of_prose_stages() {
        let (text, teaser) = split_edit(Stage::Outline, "\n# Opening\n## Conflict 1\n");
        assert_eq!(text, "# Opening\n## Conflict 1");
        assert_eq!(teaser, None);
    }

    #[test]
    fn test_edit_of_title_stage_splits_title_and_teaser() {
        let (title, teaser) =
            split_edit(Stage::TitleTeaser, "The Last Keeper\nA lamp that will not go out.\nEver.");
        assert_eq!(title, "The Last Keeper");
        assert_eq!(teaser.as_deref(), Some("A lamp that will not go out.\nEver."));

        let (title, teaser) = split_edit(Stage::TitleTeaser, "Only a Title\n  \n");
        assert_eq!(title, "Only a Title");
        assert_eq!(teaser, None);
    }
}
