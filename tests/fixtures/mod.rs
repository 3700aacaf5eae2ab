//! Test doubles for the approval workflow
//!
//! `ScriptedBackend` plays back a fixed sequence of generation results and
//! records when each call happened, so timing properties can be checked under
//! tokio's paused clock.

#![allow(dead_code)]

use async_trait::async_trait;
use portal_approvals::backend::{
    BackendApi, BackendError, GenerateInvoiceRequest, GeneratedInvoice, SubscriptionAction,
    TransitionResponse,
};
use portal_approvals::notify::{NotificationSink, NotifyError};
use portal_approvals::OrchestrationOutcome;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone)]
pub enum GenerationStep {
    Succeed(&'static str),
    Fail,
    /// Never answers within any sane timeout
    Hang,
}

pub struct ScriptedBackend {
    transition: Result<TransitionResponse, BackendError>,
    transition_delay: Duration,
    steps: Mutex<VecDeque<GenerationStep>>,
    pub transition_calls: AtomicUsize,
    pub generation_calls: Mutex<Vec<(Instant, GenerateInvoiceRequest)>>,
    pub completed_hangs: AtomicUsize,
}

impl ScriptedBackend {
    pub fn new(transition: Result<TransitionResponse, BackendError>) -> Self {
        Self {
            transition,
            transition_delay: Duration::ZERO,
            steps: Mutex::new(VecDeque::new()),
            transition_calls: AtomicUsize::new(0),
            generation_calls: Mutex::new(Vec::new()),
            completed_hangs: AtomicUsize::new(0),
        }
    }

    pub fn approving(project_id: &str) -> Self {
        Self::new(Ok(TransitionResponse::with_project(project_id)))
    }

    pub fn with_steps(self, steps: Vec<GenerationStep>) -> Self {
        *self.steps.lock().unwrap() = steps.into();
        self
    }

    pub fn with_transition_delay(mut self, delay: Duration) -> Self {
        self.transition_delay = delay;
        self
    }

    pub fn transition_count(&self) -> usize {
        self.transition_calls.load(Ordering::SeqCst)
    }

    pub fn generation_count(&self) -> usize {
        self.generation_calls.lock().unwrap().len()
    }

    /// Time between consecutive generation calls
    pub fn generation_gaps(&self) -> Vec<Duration> {
        let calls = self.generation_calls.lock().unwrap();
        calls.windows(2).map(|pair| pair[1].0 - pair[0].0).collect()
    }
}

#[async_trait]
impl BackendApi for ScriptedBackend {
    async fn transition(
        &self,
        _id: &str,
        _action: SubscriptionAction,
    ) -> Result<TransitionResponse, BackendError> {
        self.transition_calls.fetch_add(1, Ordering::SeqCst);
        if !self.transition_delay.is_zero() {
            tokio::time::sleep(self.transition_delay).await;
        }
        self.transition.clone()
    }

    async fn generate_document(
        &self,
        request: &GenerateInvoiceRequest,
    ) -> Result<GeneratedInvoice, BackendError> {
        self.generation_calls
            .lock()
            .unwrap()
            .push((Instant::now(), request.clone()));

        let step = self
            .steps
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(GenerationStep::Fail);

        match step {
            GenerationStep::Succeed(reference) => Ok(GeneratedInvoice {
                reference_number: reference.to_string(),
            }),
            GenerationStep::Fail => Err(BackendError::Http {
                status: 502,
                body: "bad gateway".to_string(),
            }),
            GenerationStep::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                self.completed_hangs.fetch_add(1, Ordering::SeqCst);
                Err(BackendError::Transport {
                    message: "late reply".to_string(),
                })
            }
        }
    }
}

#[derive(Default)]
pub struct RecordingSink {
    pub reported: Mutex<Vec<OrchestrationOutcome>>,
    pub fail: bool,
}

impl RecordingSink {
    pub fn failing() -> Self {
        Self {
            reported: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn reports(&self) -> Vec<OrchestrationOutcome> {
        self.reported.lock().unwrap().clone()
    }
}

impl NotificationSink for RecordingSink {
    fn report(&self, outcome: &OrchestrationOutcome) -> Result<(), NotifyError> {
        self.reported.lock().unwrap().push(outcome.clone());
        if self.fail {
            return Err(NotifyError::ChannelClosed);
        }
        Ok(())
    }
}

pub fn assert_close(actual: Duration, expected: Duration) {
    let tolerance = Duration::from_millis(50);
    assert!(
        actual + tolerance >= expected && actual <= expected + tolerance,
        "expected ~{expected:?}, got {actual:?}"
    );
}
