//! Selection gate between search results and downloads.
//!
//! Zero or one candidate passes straight through. Anything more is handed to
//! an external [`Chooser`] (typically a UI) and the gate waits, without a
//! timeout, until it answers through the [`ChoiceResponder`].

use std::sync::Arc;

use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::error::SubtitleError;
use crate::provider::SubtitleCandidate;

/// External actor that picks among several candidates.
pub trait Chooser: Send + Sync {
    /// Called with the number of candidates before they are presented.
    fn announce(&self, count: usize);

    /// Hand over the candidates. The chooser answers later through
    /// `responder`; dropping it without answering counts as a cancellation.
    fn present(&self, candidates: Vec<SubtitleCandidate>, responder: ChoiceResponder);
}

#[derive(Debug)]
enum Choice {
    Chosen(Vec<usize>),
    Cancelled,
}

/// One-shot answer channel for a [`Chooser`].
///
/// Both methods consume the responder, so exactly one answer is delivered.
#[derive(Debug)]
pub struct ChoiceResponder {
    tx: oneshot::Sender<Choice>,
}

impl ChoiceResponder {
    /// Report the chosen candidates by their position in the presented list.
    /// An empty list is a valid choice.
    pub fn done(self, positions: Vec<usize>) {
        let _ = self.tx.send(Choice::Chosen(positions));
    }

    /// Report that the selection was cancelled.
    pub fn cancel(self) {
        let _ = self.tx.send(Choice::Cancelled);
    }
}

/// Gate that defers to a chooser when a search is ambiguous.
#[derive(Clone)]
pub struct SelectionGate {
    chooser: Arc<dyn Chooser>,
}

impl SelectionGate {
    pub fn new(chooser: Arc<dyn Chooser>) -> Self {
        Self { chooser }
    }

    /// Select the candidates to download.
    pub async fn select(
        &self,
        candidates: Vec<SubtitleCandidate>,
    ) -> Result<Vec<SubtitleCandidate>, SubtitleError> {
        if candidates.len() <= 1 {
            return Ok(candidates);
        }

        self.chooser.announce(candidates.len());

        let (tx, rx) = oneshot::channel();
        self.chooser
            .present(candidates.clone(), ChoiceResponder { tx });

        let positions = match rx.await {
            Ok(Choice::Chosen(positions)) => positions,
            Ok(Choice::Cancelled) => {
                debug!("Selection cancelled");
                return Err(SubtitleError::UserCancelled);
            }
            Err(_) => {
                debug!("Chooser dropped the responder without answering");
                return Err(SubtitleError::UserCancelled);
            }
        };

        for &p in positions.iter().filter(|&&p| p >= candidates.len()) {
            warn!(position = p, count = candidates.len(), "Ignoring out-of-range choice");
        }

        let chosen: Vec<SubtitleCandidate> = candidates
            .into_iter()
            .enumerate()
            .filter(|(i, _)| positions.contains(i))
            .map(|(_, c)| c)
            .collect();

        debug!(chosen = chosen.len(), "Selection complete");
        Ok(chosen)
    }
}
