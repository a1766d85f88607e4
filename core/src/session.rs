//! Editor session: glues the highlighter and the list engine to a host that
//! reports text and selection changes, including the echoes of edits the
//! session itself asked for.

use tracing::{debug, trace};

use crate::config::{Config, ListConfig, StyleConfig};
use crate::error::{Error, Result};
use crate::markdown::{EditBatch, Highlight, ListEngine, MarkdownHighlighter};
use crate::range::TextRange;

/// Where the session stands relative to edits in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Idle,
    /// An [`EditBatch`] was handed out; text changes are its echo.
    ApplyingSelfEdit,
    /// An intent was declined; the next text change is the host's own edit.
    AwaitingExternalEdit,
}

impl SyncState {
    fn name(self) -> &'static str {
        match self {
            SyncState::Idle => "idle",
            SyncState::ApplyingSelfEdit => "applying a self edit",
            SyncState::AwaitingExternalEdit => "awaiting an external edit",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionEvent {
    IssueSelfEdit,
    FinishSelfEdit,
    DeclineIntent,
    ExternalEdit,
}

impl SessionEvent {
    fn name(self) -> &'static str {
        match self {
            SessionEvent::IssueSelfEdit => "issue-self-edit",
            SessionEvent::FinishSelfEdit => "finish-self-edit",
            SessionEvent::DeclineIntent => "decline-intent",
            SessionEvent::ExternalEdit => "external-edit",
        }
    }
}

fn transition(state: SyncState, event: SessionEvent) -> Result<SyncState> {
    use SessionEvent::*;
    use SyncState::*;
    let next = match (state, event) {
        (Idle, IssueSelfEdit) | (AwaitingExternalEdit, IssueSelfEdit) => ApplyingSelfEdit,
        (Idle, DeclineIntent) | (AwaitingExternalEdit, DeclineIntent) => AwaitingExternalEdit,
        (ApplyingSelfEdit, FinishSelfEdit) => Idle,
        (Idle, ExternalEdit) | (AwaitingExternalEdit, ExternalEdit) => Idle,
        (state, event) => {
            return Err(Error::IllegalTransition {
                state: state.name(),
                event: event.name(),
            })
        }
    };
    trace!(from = ?state, to = ?next, ?event, "session transition");
    Ok(next)
}

/// Answer to a newline intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NewlineOutcome {
    /// Apply this batch, then call [`EditorSession::finish_self_edit`].
    Edit(EditBatch),
    /// Insert a plain newline.
    Default,
}

struct Memo {
    text: String,
    selection: TextRange,
    highlight: Highlight,
}

pub struct EditorSession {
    highlighter: MarkdownHighlighter,
    lists: ListEngine,
    state: SyncState,
    memo: Option<Memo>,
}

impl EditorSession {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            highlighter: MarkdownHighlighter::new(config.style.clone())?,
            lists: ListEngine::new(config.lists.clone()),
            state: SyncState::Idle,
            memo: None,
        })
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    pub fn highlighter(&self) -> &MarkdownHighlighter {
        &self.highlighter
    }

    /// Swap the style configuration; the next refresh recomputes.
    pub fn set_style(&mut self, style: StyleConfig) {
        self.highlighter.set_config(style);
        self.memo = None;
    }

    pub fn set_lists(&mut self, lists: ListConfig) {
        self.lists = ListEngine::new(lists);
    }

    fn advance(&mut self, event: SessionEvent) -> Result<()> {
        self.state = transition(self.state, event)?;
        Ok(())
    }

    /// Newline typed over `edit`.
    pub fn newline(&mut self, text: &str, edit: TextRange) -> Result<NewlineOutcome> {
        match self.lists.continue_list(text, edit) {
            Some(batch) => {
                self.advance(SessionEvent::IssueSelfEdit)?;
                Ok(NewlineOutcome::Edit(batch))
            }
            None => {
                self.advance(SessionEvent::DeclineIntent)?;
                Ok(NewlineOutcome::Default)
            }
        }
    }

    /// Tab / Shift-Tab over the selection. Always produces a self edit.
    pub fn indent(&mut self, text: &str, selection: TextRange, outdent: bool) -> Result<EditBatch> {
        let batch = self.lists.indent_lines(text, selection, outdent);
        self.advance(SessionEvent::IssueSelfEdit)?;
        Ok(batch)
    }

    /// The host's buffer changed. Returns `None` for echoes of a self edit.
    pub fn text_did_change(&mut self, text: &str, selection: TextRange) -> Result<Option<Highlight>> {
        if self.state == SyncState::ApplyingSelfEdit {
            trace!("suppressed echo of self edit");
            return Ok(None);
        }
        self.advance(SessionEvent::ExternalEdit)?;
        Ok(Some(self.refresh(text, selection)))
    }

    /// The host finished applying the last [`EditBatch`].
    pub fn finish_self_edit(&mut self, text: &str, selection: TextRange) -> Result<Highlight> {
        self.advance(SessionEvent::FinishSelfEdit)?;
        Ok(self.refresh(text, selection))
    }

    pub fn selection_did_change(&mut self, text: &str, selection: TextRange) -> Option<Highlight> {
        if self.state == SyncState::ApplyingSelfEdit {
            return None;
        }
        Some(self.refresh(text, selection))
    }

    fn refresh(&mut self, text: &str, selection: TextRange) -> Highlight {
        if let Some(memo) = &self.memo {
            if memo.selection == selection && memo.text == text {
                trace!("highlight memo hit");
                return memo.highlight.clone();
            }
        }
        let highlight = self.highlighter.highlight(text, selection);
        debug!(
            spans = highlight.spans.len(),
            gated = highlight.gated,
            "highlight refreshed"
        );
        self.memo = Some(Memo {
            text: text.to_string(),
            selection,
            highlight: highlight.clone(),
        });
        highlight
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> EditorSession {
        EditorSession::new(&Config::default()).unwrap()
    }

    #[test]
    fn self_edit_echo_is_suppressed() {
        let mut s = session();
        let text = "- a";
        let NewlineOutcome::Edit(batch) = s.newline(text, TextRange::caret(3)).unwrap() else {
            panic!("expected a list edit");
        };
        assert_eq!(s.state(), SyncState::ApplyingSelfEdit);
        let after = batch.apply(text);
        assert!(s.text_did_change(&after, batch.selection).unwrap().is_none());
        assert!(s.selection_did_change(&after, batch.selection).is_none());
        s.finish_self_edit(&after, batch.selection).unwrap();
        assert_eq!(s.state(), SyncState::Idle);
    }

    #[test]
    fn declined_intent_waits_for_host_edit() {
        let mut s = session();
        let outcome = s.newline("plain", TextRange::caret(5)).unwrap();
        assert_eq!(outcome, NewlineOutcome::Default);
        assert_eq!(s.state(), SyncState::AwaitingExternalEdit);
        assert!(s
            .text_did_change("plain\n", TextRange::caret(6))
            .unwrap()
            .is_some());
        assert_eq!(s.state(), SyncState::Idle);
    }

    #[test]
    fn illegal_transitions_are_errors() {
        let mut s = session();
        assert!(matches!(
            s.finish_self_edit("", TextRange::caret(0)),
            Err(Error::IllegalTransition { .. })
        ));
        s.indent("- a", TextRange::caret(0), false).unwrap();
        assert!(matches!(
            s.newline("- a", TextRange::caret(3)),
            Err(Error::IllegalTransition { .. })
        ));
        assert_eq!(s.state(), SyncState::ApplyingSelfEdit);
    }

    #[test]
    fn memo_returns_identical_highlight() {
        let mut s = session();
        let first = s.selection_did_change("**a**", TextRange::caret(0)).unwrap();
        let second = s.selection_did_change("**a**", TextRange::caret(0)).unwrap();
        assert_eq!(first, second);
        s.set_style(StyleConfig {
            mark_current_line: true,
            ..StyleConfig::default()
        });
        let third = s.selection_did_change("**a**", TextRange::caret(0)).unwrap();
        assert_ne!(first, third);
    }
}
