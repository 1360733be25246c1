//! Single-product editor state machine.
//!
//! # Design
//! The editor is plain data driven by the host's event loop. It never touches
//! the network: `submit` hands back the `PUT` request to execute, and the host
//! feeds the outcome into `complete` together with the ticket it was given.
//! Time is passed in explicitly so timeouts and notification expiry are
//! deterministic.
//!
//! ```text
//! Viewing --begin_edit--> Editing --submit--> Submitting
//!    ^                       ^                    |
//!    |                       +------failure-------+
//!    +-----------------------------success--------+
//! ```
//!
//! The draft is separate from the canonical product: only a confirmed server
//! response replaces the product, and a failed submission leaves the draft
//! exactly as the user left it.

use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, warn};

use crate::client::ProductClient;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::types::{Product, ProductId, ProductUpdate};

/// Receives the editor's intents. The list owner implements this and applies
/// them to its own copy of the products.
pub trait EditorObserver {
    /// A submission succeeded; `product` is the new canonical state.
    fn on_update(&mut self, product: &Product);

    /// The user asked for `id` to be deleted.
    fn on_delete(&mut self, id: ProductId);
}

/// Misuse of the editor; none of these touch the canonical product.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum EditorError {
    #[error("editor is not in editing mode")]
    NotEditing,
    #[error("an update is already being submitted")]
    SubmissionInFlight,
    #[error("editor has been closed")]
    Closed,
    #[error("update rejected before sending: {0}")]
    Rejected(ApiError),
}

/// Externally visible phase of the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorState {
    Viewing,
    Editing,
    Submitting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

/// A message for the user. Success messages expire on their own; error
/// messages stay until dismissed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
    pub expires_at: Option<Instant>,
}

/// Identifies one submission so late responses can be told apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubmissionTicket(u64);

/// What the host must execute after a successful `submit`.
#[derive(Debug, Clone)]
pub struct PendingUpdate {
    pub ticket: SubmissionTicket,
    pub request: HttpRequest,
}

/// Result of feeding a response (or a timeout) into the editor.
#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    /// The server confirmed the update.
    Applied(Product),
    /// The update failed; the draft was kept.
    Failed(ApiError),
    /// The response belonged to a stale submission or a closed editor.
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditorSettings {
    /// Upper bound on how long a submission may stay in flight.
    pub submit_timeout: Duration,
    /// How long a success notification stays visible.
    pub success_ttl: Duration,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            submit_timeout: Duration::from_secs(10),
            success_ttl: Duration::from_secs(3),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Viewing,
    Editing,
    Submitting {
        ticket: SubmissionTicket,
        /// `None` when the timeout is too large to represent.
        deadline: Option<Instant>,
    },
}

/// Editor for one product. Each instance owns its draft exclusively.
#[derive(Debug)]
pub struct ProductEditor {
    client: ProductClient,
    product: Product,
    draft: ProductUpdate,
    phase: Phase,
    next_ticket: u64,
    notification: Option<Notification>,
    settings: EditorSettings,
    closed: bool,
}

impl ProductEditor {
    pub fn new(client: ProductClient, product: Product) -> Self {
        Self::with_settings(client, product, EditorSettings::default())
    }

    pub fn with_settings(client: ProductClient, product: Product, settings: EditorSettings) -> Self {
        let draft = ProductUpdate::from_product(&product);
        Self {
            client,
            product,
            draft,
            phase: Phase::Viewing,
            next_ticket: 0,
            notification: None,
            settings,
            closed: false,
        }
    }

    /// The last product state confirmed by the server.
    pub fn product(&self) -> &Product {
        &self.product
    }

    pub fn draft(&self) -> &ProductUpdate {
        &self.draft
    }

    pub fn notification(&self) -> Option<&Notification> {
        self.notification.as_ref()
    }

    pub fn state(&self) -> EditorState {
        match self.phase {
            Phase::Viewing => EditorState::Viewing,
            Phase::Editing => EditorState::Editing,
            Phase::Submitting { .. } => EditorState::Submitting,
        }
    }

    pub fn is_live(&self) -> bool {
        !self.closed
    }

    /// Enter editing mode. The draft starts from the current product unless
    /// the editor is already editing, in which case the draft is kept.
    pub fn begin_edit(&mut self) -> Result<(), EditorError> {
        self.ensure_live()?;
        match self.phase {
            Phase::Viewing => {
                self.draft = ProductUpdate::from_product(&self.product);
                self.phase = Phase::Editing;
                debug!(product_id = self.product.id, "editing started");
                Ok(())
            }
            Phase::Editing => Ok(()),
            Phase::Submitting { .. } => Err(EditorError::SubmissionInFlight),
        }
    }

    /// Leave editing mode and throw the draft away.
    pub fn cancel_edit(&mut self) -> Result<(), EditorError> {
        self.ensure_editing()?;
        self.draft = ProductUpdate::from_product(&self.product);
        self.phase = Phase::Viewing;
        Ok(())
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> Result<(), EditorError> {
        self.ensure_editing()?;
        self.draft.name = Some(name.into());
        Ok(())
    }

    pub fn set_description(&mut self, description: impl Into<String>) -> Result<(), EditorError> {
        self.ensure_editing()?;
        self.draft.description = Some(description.into());
        Ok(())
    }

    pub fn set_price(&mut self, price: f64) -> Result<(), EditorError> {
        self.ensure_editing()?;
        self.draft.price = Some(price);
        Ok(())
    }

    pub fn set_category(&mut self, category: impl Into<String>) -> Result<(), EditorError> {
        self.ensure_editing()?;
        self.draft.category = Some(category.into());
        Ok(())
    }

    /// Send the draft. Only one submission may be in flight; a second call
    /// while submitting is rejected, not queued.
    pub fn submit(&mut self, now: Instant) -> Result<PendingUpdate, EditorError> {
        self.ensure_editing()?;

        let request = match self.client.build_update_product(self.product.id, &self.draft) {
            Ok(request) => request,
            Err(err) => {
                warn!(product_id = self.product.id, error = %err, "draft rejected");
                self.show_error(&err);
                return Err(EditorError::Rejected(err));
            }
        };

        let ticket = SubmissionTicket(self.next_ticket);
        self.next_ticket += 1;
        self.phase = Phase::Submitting {
            ticket,
            deadline: now.checked_add(self.settings.submit_timeout),
        };
        self.notification = None;
        debug!(product_id = self.product.id, ticket = ticket.0, "update submitted");

        Ok(PendingUpdate { ticket, request })
    }

    /// Feed the outcome of a submission back into the editor.
    ///
    /// Responses for a closed editor or for a ticket that is no longer in
    /// flight are ignored.
    pub fn complete(
        &mut self,
        ticket: SubmissionTicket,
        result: Result<HttpResponse, ApiError>,
        observer: &mut dyn EditorObserver,
        now: Instant,
    ) -> Completion {
        if !self.owns(ticket) {
            debug!(
                product_id = self.product.id,
                ticket = ticket.0,
                live = !self.closed,
                "ignoring stale response"
            );
            return Completion::Ignored;
        }

        match result.and_then(|response| self.client.parse_update_product(response)) {
            Ok(product) => {
                self.product = product.clone();
                self.draft = ProductUpdate::from_product(&product);
                self.phase = Phase::Viewing;
                self.notification = Some(Notification {
                    kind: NotificationKind::Success,
                    message: "Product updated successfully".to_string(),
                    expires_at: now.checked_add(self.settings.success_ttl),
                });
                debug!(product_id = product.id, "update confirmed");
                observer.on_update(&product);
                Completion::Applied(product)
            }
            Err(err) => Completion::Failed(self.fail_submission(err)),
        }
    }

    /// Advance time: expire a success notification and fail a submission
    /// that has outlived its deadline. Returns the failure if one occurred.
    pub fn tick(&mut self, now: Instant) -> Option<Completion> {
        let expired = matches!(
            &self.notification,
            Some(Notification { expires_at: Some(at), .. }) if now >= *at
        );
        if expired {
            self.notification = None;
        }

        let phase = self.phase;
        match phase {
            Phase::Submitting {
                deadline: Some(deadline),
                ..
            } if !self.closed && now >= deadline => {
                Some(Completion::Failed(self.fail_submission(ApiError::Timeout)))
            }
            _ => None,
        }
    }

    pub fn dismiss_notification(&mut self) {
        self.notification = None;
    }

    /// Ask the owner to delete this product. The editor never deletes.
    pub fn request_delete(&mut self, observer: &mut dyn EditorObserver) -> Result<(), EditorError> {
        self.ensure_live()?;
        if let Phase::Submitting { .. } = self.phase {
            return Err(EditorError::SubmissionInFlight);
        }
        debug!(product_id = self.product.id, "delete requested");
        observer.on_delete(self.product.id);
        Ok(())
    }

    /// Mark the editor as gone. Any later response is a no-op.
    pub fn close(&mut self) {
        self.closed = true;
    }

    fn owns(&self, ticket: SubmissionTicket) -> bool {
        !self.closed && matches!(self.phase, Phase::Submitting { ticket: current, .. } if current == ticket)
    }

    fn fail_submission(&mut self, err: ApiError) -> ApiError {
        warn!(product_id = self.product.id, error = %err, "update failed");
        self.phase = Phase::Editing;
        self.show_error(&err);
        err
    }

    fn show_error(&mut self, err: &ApiError) {
        self.notification = Some(Notification {
            kind: NotificationKind::Error,
            message: format!("Failed to update product: {err}"),
            expires_at: None,
        });
    }

    fn ensure_live(&self) -> Result<(), EditorError> {
        if self.closed {
            return Err(EditorError::Closed);
        }
        Ok(())
    }

    fn ensure_editing(&self) -> Result<(), EditorError> {
        self.ensure_live()?;
        match self.phase {
            Phase::Editing => Ok(()),
            Phase::Viewing => Err(EditorError::NotEditing),
            Phase::Submitting { .. } => Err(EditorError::SubmissionInFlight),
        }
    }
}
