#![allow(dead_code)]

use securetodo_core::{AuthCapability, CapabilityError, PromptFailure, PromptOptions, PromptOutcome};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Scripted capability that records how often each call is made.
pub struct MockCapability {
    pub hardware: Result<bool, CapabilityError>,
    pub enrolled: Result<bool, CapabilityError>,
    prompts: Mutex<VecDeque<Result<PromptOutcome, CapabilityError>>>,
    pub hardware_calls: AtomicUsize,
    pub enrolled_calls: AtomicUsize,
    pub prompt_calls: AtomicUsize,
    pub last_prompt_message: Mutex<Option<String>>,
}

impl MockCapability {
    /// Device with hardware and enrollment; prompts resolve in the given order.
    pub fn with_prompts(prompts: Vec<Result<PromptOutcome, CapabilityError>>) -> Self {
        Self {
            hardware: Ok(true),
            enrolled: Ok(true),
            prompts: Mutex::new(prompts.into()),
            hardware_calls: AtomicUsize::new(0),
            enrolled_calls: AtomicUsize::new(0),
            prompt_calls: AtomicUsize::new(0),
            last_prompt_message: Mutex::new(None),
        }
    }

    /// First prompt succeeds, every later prompt fails.
    pub fn succeeds_once() -> Self {
        Self::with_prompts(vec![Ok(PromptOutcome::Success)])
    }

    pub fn cancels() -> Self {
        Self::with_prompts(vec![Ok(PromptOutcome::Failed(PromptFailure::UserCancel))])
    }

    pub fn without_hardware() -> Self {
        Self {
            hardware: Ok(false),
            ..Self::succeeds_once()
        }
    }

    pub fn not_enrolled() -> Self {
        Self {
            enrolled: Ok(false),
            ..Self::succeeds_once()
        }
    }

    pub fn prompts(&self) -> usize {
        self.prompt_calls.load(Ordering::SeqCst)
    }

    pub fn total_calls(&self) -> usize {
        self.hardware_calls.load(Ordering::SeqCst)
            + self.enrolled_calls.load(Ordering::SeqCst)
            + self.prompts()
    }
}

impl AuthCapability for MockCapability {
    async fn has_hardware(&self) -> Result<bool, CapabilityError> {
        self.hardware_calls.fetch_add(1, Ordering::SeqCst);
        self.hardware.clone()
    }

    async fn is_enrolled(&self) -> Result<bool, CapabilityError> {
        self.enrolled_calls.fetch_add(1, Ordering::SeqCst);
        self.enrolled.clone()
    }

    async fn prompt(&self, options: &PromptOptions) -> Result<PromptOutcome, CapabilityError> {
        self.prompt_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_prompt_message.lock().unwrap() = Some(options.prompt_message.clone());
        self.prompts
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(PromptOutcome::Failed(PromptFailure::Other(
                "unexpected_prompt".to_string(),
            ))))
    }
}
