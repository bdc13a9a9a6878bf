//! Scripted chooser for testing the selection gate.

use std::sync::{Mutex, MutexGuard};

use tokio::sync::Notify;

use crate::provider::SubtitleCandidate;
use crate::selection::{ChoiceResponder, Chooser};

#[derive(Debug, Clone)]
enum Script {
    Choose(Vec<usize>),
    Cancel,
    Drop,
    Defer,
}

/// Chooser that answers according to a fixed script.
///
/// `deferred()` keeps the responder so the test can answer later, which
/// exercises the gate's suspension.
#[derive(Debug)]
pub struct ScriptedChooser {
    script: Script,
    announced: Mutex<Vec<usize>>,
    presented: Mutex<Vec<Vec<SubtitleCandidate>>>,
    pending: Mutex<Option<ChoiceResponder>>,
    responder_ready: Notify,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl ScriptedChooser {
    fn with_script(script: Script) -> Self {
        Self {
            script,
            announced: Mutex::new(Vec::new()),
            presented: Mutex::new(Vec::new()),
            pending: Mutex::new(None),
            responder_ready: Notify::new(),
        }
    }

    /// Pick the candidates at these positions.
    pub fn choosing(positions: Vec<usize>) -> Self {
        Self::with_script(Script::Choose(positions))
    }

    /// Cancel every selection.
    pub fn cancelling() -> Self {
        Self::with_script(Script::Cancel)
    }

    /// Drop the responder without answering.
    pub fn dropping() -> Self {
        Self::with_script(Script::Drop)
    }

    /// Hold the responder until the test takes it.
    pub fn deferred() -> Self {
        Self::with_script(Script::Defer)
    }

    /// Counts passed to `announce`, in call order.
    pub fn announced(&self) -> Vec<usize> {
        lock(&self.announced).clone()
    }

    /// Number of times candidates were presented.
    pub fn present_count(&self) -> usize {
        lock(&self.presented).len()
    }

    /// Candidate lists that were presented.
    pub fn presented(&self) -> Vec<Vec<SubtitleCandidate>> {
        lock(&self.presented).clone()
    }

    /// Wait until a deferred selection is presented and take its responder.
    pub async fn wait_for_responder(&self) -> ChoiceResponder {
        loop {
            let pending = lock(&self.pending).take();
            if let Some(responder) = pending {
                return responder;
            }
            self.responder_ready.notified().await;
        }
    }
}

impl Chooser for ScriptedChooser {
    fn announce(&self, count: usize) {
        lock(&self.announced).push(count);
    }

    fn present(&self, candidates: Vec<SubtitleCandidate>, responder: ChoiceResponder) {
        lock(&self.presented).push(candidates);

        match &self.script {
            Script::Choose(positions) => responder.done(positions.clone()),
            Script::Cancel => responder.cancel(),
            Script::Drop => drop(responder),
            Script::Defer => {
                *lock(&self.pending) = Some(responder);
                self.responder_ready.notify_one();
            }
        }
    }
}
