use std::future::Future;

use futures::future::{FutureExt, LocalBoxFuture};

use crate::domain::{FormMode, SubmitAction, SubmitActions, ValuesMap};

use super::error::SubmissionError;

/// Second argument handed to the submission handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitContext {
    pub submit_action: SubmitAction,
    pub mode: FormMode,
}

pub type SubmitFuture = LocalBoxFuture<'static, Result<(), SubmissionError>>;

/// Submission collaborator. It owns persistence; the form only awaits it.
pub trait SubmitHandler {
    fn submit(&mut self, values: ValuesMap, context: SubmitContext) -> SubmitFuture;
}

impl<F, Fut> SubmitHandler for F
where
    F: FnMut(ValuesMap, SubmitContext) -> Fut,
    Fut: Future<Output = Result<(), SubmissionError>> + 'static,
{
    fn submit(&mut self, values: ValuesMap, context: SubmitContext) -> SubmitFuture {
        self(values, context).boxed_local()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ButtonState {
    pub offered: bool,
    pub loading: bool,
    pub disabled: bool,
}

/// Identifies one dispatched submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitTicket {
    pub id: u64,
    pub action: SubmitAction,
}

/// Result of activating a submit control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitRequest {
    Accepted(SubmitAction),
    /// Another submission is still pending.
    Ignored { in_flight: SubmitAction },
    /// The control is not offered by this form.
    Unavailable(SubmitAction),
}

/// Where the in-flight submission currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitStage {
    /// Waiting for the validator's verdict.
    Validating,
    /// Waiting for the submission handler.
    Submitting,
}

/// Tracks the requested submit tag and the per-tag loading flags.
///
/// At most one submission is in flight, from the start of its validation
/// until it settles; activations arriving meanwhile are ignored whatever
/// their tag.
#[derive(Debug, Clone)]
pub struct SubmitRouter {
    offered: SubmitActions,
    requested: Option<SubmitAction>,
    loading: [bool; 2],
    in_flight: Option<(SubmitTicket, SubmitStage)>,
    next_id: u64,
}

impl SubmitRouter {
    pub fn new(offered: SubmitActions) -> Self {
        Self {
            offered,
            requested: None,
            loading: [false; 2],
            in_flight: None,
            next_id: 0,
        }
    }

    pub fn offered(&self) -> SubmitActions {
        self.offered
    }

    /// Records the activated tag.
    pub fn request(&mut self, action: SubmitAction) -> SubmitRequest {
        if !self.offered.offers(action) {
            return SubmitRequest::Unavailable(action);
        }
        if let Some((ticket, _)) = self.in_flight {
            return SubmitRequest::Ignored {
                in_flight: ticket.action,
            };
        }
        self.requested = Some(action);
        SubmitRequest::Accepted(action)
    }

    /// Tag recorded by the last accepted activation, if not yet dispatched.
    pub fn requested(&self) -> Option<SubmitAction> {
        self.requested
    }

    /// Opens a validation pass for the recorded tag and flags that tag alone
    /// as loading. The tag stays recorded until [`SubmitRouter::dispatch`].
    pub fn begin(&mut self) -> Option<SubmitTicket> {
        if self.in_flight.is_some() {
            return None;
        }
        let action = self.requested?;
        self.next_id += 1;
        let ticket = SubmitTicket {
            id: self.next_id,
            action,
        };
        self.loading[action.slot()] = true;
        self.in_flight = Some((ticket, SubmitStage::Validating));
        Some(ticket)
    }

    /// Validation passed: consumes the recorded tag.
    pub fn dispatch(&mut self, ticket: SubmitTicket) -> bool {
        if self.in_flight != Some((ticket, SubmitStage::Validating)) {
            return false;
        }
        self.requested = None;
        self.in_flight = Some((ticket, SubmitStage::Submitting));
        true
    }

    /// Ends a pass at any stage and clears its loading flag. A rejected
    /// verdict leaves the tag recorded for a retry. Stale tickets are ignored.
    pub fn settle(&mut self, ticket: SubmitTicket) -> bool {
        if self.in_flight.map(|(current, _)| current) != Some(ticket) {
            return false;
        }
        self.loading[ticket.action.slot()] = false;
        self.in_flight = None;
        true
    }

    pub fn in_flight(&self) -> Option<SubmitTicket> {
        self.in_flight.map(|(ticket, _)| ticket)
    }

    pub fn stage(&self) -> Option<SubmitStage> {
        self.in_flight.map(|(_, stage)| stage)
    }

    pub fn is_loading(&self, action: SubmitAction) -> bool {
        self.loading[action.slot()]
    }

    /// A control is disabled only while its own submission is pending.
    pub fn button(&self, action: SubmitAction) -> ButtonState {
        let offered = self.offered.offers(action);
        let loading = self.is_loading(action);
        ButtonState {
            offered,
            loading,
            disabled: !offered || loading,
        }
    }

    /// Forgets the recorded tag and any in-flight submission.
    pub fn reset(&mut self) {
        self.requested = None;
        self.loading = [false; 2];
        self.in_flight = None;
    }
}
