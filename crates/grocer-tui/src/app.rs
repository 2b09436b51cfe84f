use grocer_core::{ConversationController, HttpTransport, PendingRequest, Transport, TransportError};
use serde_json::Value;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::view::TerminalView;

pub type Controller = ConversationController<TerminalView, HttpTransport>;

pub struct App {
    pub should_quit: bool,
    pub controller: Controller,

    // At most one outstanding request
    pub request_task: Option<JoinHandle<Result<Value, TransportError>>>,

    // Image probing: failed URLs come back on this channel
    probe_client: reqwest::Client,
    failed_images_tx: mpsc::UnboundedSender<String>,
    failed_images_rx: mpsc::UnboundedReceiver<String>,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation
}

impl App {
    pub fn new(endpoint: &str) -> Self {
        let (failed_images_tx, failed_images_rx) = mpsc::unbounded_channel();

        Self {
            should_quit: false,
            controller: ConversationController::new(
                TerminalView::new(),
                HttpTransport::new(endpoint),
            ),
            request_task: None,
            probe_client: reqwest::Client::new(),
            failed_images_tx,
            failed_images_rx,
            animation_frame: 0,
        }
    }

    pub fn view(&self) -> &TerminalView {
        self.controller.view()
    }

    pub fn view_mut(&mut self) -> &mut TerminalView {
        self.controller.view_mut()
    }

    pub fn endpoint(&self) -> &str {
        self.controller.transport().endpoint()
    }

    /// Spawn the transport call for a freshly started send cycle.
    pub fn start_request(&mut self, pending: PendingRequest) {
        if self.request_task.is_some() {
            tracing::warn!("request already outstanding, not starting another");
            return;
        }

        let transport = self.controller.transport().clone();
        let message = pending.message().to_string();
        self.request_task = Some(tokio::spawn(async move {
            transport.send(&message).await
        }));
    }

    /// Hand a finished request back to the controller.
    pub async fn poll_request(&mut self) {
        let finished = self
            .request_task
            .as_ref()
            .map(|task| task.is_finished())
            .unwrap_or(false);
        if !finished {
            return;
        }

        if let Some(task) = self.request_task.take() {
            let result = match task.await {
                Ok(result) => result,
                Err(err) => Err(TransportError::Interrupted(err.to_string())),
            };
            self.controller.complete(result);
            self.animation_frame = 0;
        }
    }

    /// Start a background check for every image URL that has not been seen.
    pub fn probe_images(&mut self) {
        for src in self.controller.view_mut().take_unprobed_images() {
            let client = self.probe_client.clone();
            let tx = self.failed_images_tx.clone();
            tokio::spawn(async move {
                let loaded = match client.get(&src).send().await {
                    Ok(response) => response.status().is_success(),
                    Err(err) => {
                        tracing::debug!(%src, error = %err, "image request failed");
                        false
                    }
                };
                if !loaded {
                    let _ = tx.send(src);
                }
            });
        }
    }

    /// Hide images whose probe reported a failure.
    pub fn apply_failed_images(&mut self) {
        while let Ok(src) = self.failed_images_rx.try_recv() {
            let hidden = self.controller.view_mut().mark_image_failed(&src);
            tracing::debug!(%src, hidden, "hid unreachable image");
        }
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.controller.is_sending() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }
}
