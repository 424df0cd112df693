use std::{
    collections::VecDeque,
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use color_eyre::eyre::eyre;

use super::{LanguageModel, Prompt};
use crate::errors::{AppError, Result};

/// A [LanguageModel] replying with scripted payloads in order, counting the calls received
#[derive(Default)]
pub struct ScriptedModel {
    replies: Mutex<VecDeque<Result<String>>>,
    calls: AtomicUsize,
}

impl ScriptedModel {
    pub fn replying(replies: impl IntoIterator<Item = &'static str>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().map(|r| Ok(r.to_string())).collect()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(err: AppError) -> Self {
        Self {
            replies: Mutex::new(VecDeque::from([Err(err)])),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl LanguageModel for ScriptedModel {
    async fn complete(&self, _prompt: &Prompt) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(eyre!("no more scripted replies").into()))
    }
}
