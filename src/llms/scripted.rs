//! Scripted model for tests and offline demos.
//!
//! Replies come from a queue of canned completions or from a responder
//! closure. Every received message sequence is recorded, and models can share
//! a [`CallJournal`] to observe the global order in which they were called.

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use super::base_llm::BaseLLM;
use crate::utilities::completions::Message;
use crate::utilities::errors::LLMError;

/// Shared, ordered record of which labelled model was called.
pub type CallJournal = Arc<Mutex<Vec<String>>>;

/// Create an empty journal.
pub fn call_journal() -> CallJournal {
    Arc::new(Mutex::new(Vec::new()))
}

type Responder = Box<dyn Fn(&[Message]) -> Result<String, LLMError> + Send + Sync>;

enum Script {
    Queue(VecDeque<Result<String, String>>),
    Responder(Responder),
}

/// A [`BaseLLM`] that answers from a script.
pub struct ScriptedLLM {
    model: String,
    script: Mutex<Script>,
    calls: Mutex<Vec<Vec<Message>>>,
    journal: Option<(CallJournal, String)>,
}

impl fmt::Debug for ScriptedLLM {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptedLLM")
            .field("model", &self.model)
            .field("calls", &self.call_count())
            .finish()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl ScriptedLLM {
    /// Reply with `responses` in order; further calls fail with
    /// [`LLMError::Exhausted`].
    pub fn new<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let queue = responses.into_iter().map(|r| Ok(r.into())).collect();
        Self::with_script(Script::Queue(queue))
    }

    /// Reply with the same completion forever.
    pub fn repeating(response: impl Into<String>) -> Self {
        let response = response.into();
        Self::from_fn(move |_| Ok(response.clone()))
    }

    /// Reply by calling `responder` with the received messages.
    pub fn from_fn<F>(responder: F) -> Self
    where
        F: Fn(&[Message]) -> Result<String, LLMError> + Send + Sync + 'static,
    {
        Self::with_script(Script::Responder(Box::new(responder)))
    }

    fn with_script(script: Script) -> Self {
        Self {
            model: "scripted".to_string(),
            script: Mutex::new(script),
            calls: Mutex::new(Vec::new()),
            journal: None,
        }
    }

    /// Queue a transport failure after the replies queued so far.
    pub fn then_fail(self, message: impl Into<String>) -> Self {
        if let Script::Queue(queue) = &mut *lock(&self.script) {
            queue.push_back(Err(message.into()));
        }
        self
    }

    /// Record `label` in `journal` on every call.
    pub fn with_journal(mut self, journal: &CallJournal, label: impl Into<String>) -> Self {
        self.journal = Some((journal.clone(), label.into()));
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Every message sequence received, in call order.
    pub fn calls(&self) -> Vec<Vec<Message>> {
        lock(&self.calls).clone()
    }

    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    /// Shared handle for agents.
    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }
}

#[async_trait]
impl BaseLLM for ScriptedLLM {
    fn model(&self) -> &str {
        &self.model
    }

    fn provider(&self) -> &str {
        "scripted"
    }

    fn call(&self, messages: &[Message]) -> Result<String, LLMError> {
        let calls = {
            let mut recorded = lock(&self.calls);
            recorded.push(messages.to_vec());
            recorded.len()
        };
        if let Some((journal, label)) = &self.journal {
            lock(journal).push(label.clone());
        }

        match &mut *lock(&self.script) {
            Script::Queue(queue) => match queue.pop_front() {
                Some(Ok(reply)) => Ok(reply),
                Some(Err(message)) => Err(LLMError::Transport(message)),
                None => Err(LLMError::Exhausted { calls }),
            },
            Script::Responder(responder) => responder(messages),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_then_exhausted() {
        let llm = ScriptedLLM::new(["one", "two"]);
        let msgs = [Message::user("hi")];
        assert_eq!(llm.call(&msgs).unwrap(), "one");
        assert_eq!(llm.call(&msgs).unwrap(), "two");
        assert!(matches!(llm.call(&msgs), Err(LLMError::Exhausted { calls: 3 })));
        assert_eq!(llm.call_count(), 3);
    }

    #[test]
    fn test_then_fail() {
        let llm = ScriptedLLM::new(["ok"]).then_fail("connection reset");
        let msgs = [Message::user("hi")];
        assert!(llm.call(&msgs).is_ok());
        assert!(matches!(llm.call(&msgs), Err(LLMError::Transport(_))));
    }

    #[test]
    fn test_journal_is_shared() {
        let journal = call_journal();
        let a = ScriptedLLM::repeating("a").with_journal(&journal, "A");
        let b = ScriptedLLM::repeating("b").with_journal(&journal, "B");
        let msgs = [Message::user("x")];
        b.call(&msgs).unwrap();
        a.call(&msgs).unwrap();
        assert_eq!(*journal.lock().unwrap(), vec!["B", "A"]);
    }

    #[test]
    fn test_acall_delegates_to_call() {
        let llm = ScriptedLLM::new(["async"]);
        let reply = tokio_test::block_on(llm.acall(&[Message::user("hi")])).unwrap();
        assert_eq!(reply, "async");
        assert_eq!(llm.calls()[0][0].content, "hi");
    }
}
