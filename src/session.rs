use crate::editor::FieldEditor;
use crate::error::{Result, VerifyError};
use crate::poll::{CancelToken, PollClient, PollOptions};
use crate::render::{DocumentView, RenderRequest, RenderedSurface};
use crate::submit::SubmitClient;
use crate::transport::Transport;
use crate::types::{Ack, DocumentSnapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Loading,
    Ready,
    /// Nothing to verify: no document id, or polling ran out of attempts.
    NotFound,
    SignedOut,
    Verified,
}

/// Text shown over the verification page while it is not usable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub title: &'static str,
    pub body: &'static str,
    pub recovery_link: Option<&'static str>,
}

const LOADING_MESSAGE: StatusMessage = StatusMessage {
    title: "Processing your document",
    body: "We're extracting your data and it's on the way.",
    recovery_link: None,
};

const NOT_FOUND_MESSAGE: StatusMessage = StatusMessage {
    title: "No data found",
    body: "We couldn't extract the data from this document. Please check the file format and then try again. If the issue persists, reach out to support.",
    recovery_link: Some("/"),
};

/// State of one "verify documents and data" step. The document id comes in
/// from the upload step; the verified data goes out to the download step.
pub struct VerifySession {
    document_id: Option<String>,
    state: SessionState,
    snapshot: Option<DocumentSnapshot>,
    editor: FieldEditor,
    view: Option<DocumentView>,
    /// Why the source document could not be previewed, if it could not.
    preview_error: Option<String>,
    verified_data: Option<Ack>,
}

impl VerifySession {
    pub fn new(document_id: Option<String>) -> Self {
        let state = if document_id.is_some() {
            SessionState::Loading
        } else {
            log::error!("No document id handed to the verification step");
            SessionState::NotFound
        };
        Self {
            document_id,
            state,
            snapshot: None,
            editor: FieldEditor::new(),
            view: None,
            preview_error: None,
            verified_data: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn document_id(&self) -> Option<&str> {
        self.document_id.as_deref()
    }

    /// Polls for the extraction result and loads it.
    pub fn start<T: Transport>(
        &mut self,
        client: &PollClient<T>,
        options: PollOptions,
        cancel: &CancelToken,
    ) -> Result<()> {
        let Some(document_id) = self.document_id.clone() else {
            return Err(VerifyError::NoExtractedData);
        };
        self.state = SessionState::Loading;
        match client.poll(&document_id, options, cancel) {
            Ok(snapshot) => {
                self.load(snapshot);
                Ok(())
            }
            Err(VerifyError::Timeout { attempts }) => {
                self.state = SessionState::NotFound;
                Err(VerifyError::Timeout { attempts })
            }
            Err(VerifyError::Unauthorized) => {
                self.state = SessionState::SignedOut;
                Err(VerifyError::Unauthorized)
            }
            Err(e) => Err(e),
        }
    }

    /// Replaces the current snapshot, fields, and view; pagination restarts at page 1.
    /// A document that cannot be previewed still loads its fields, so they can be verified.
    pub fn load(&mut self, snapshot: DocumentSnapshot) {
        self.editor
            .load(snapshot.extracted_data.clone().unwrap_or_default());
        if snapshot.extracted_data.is_none() {
            log::warn!("No extracted data found.");
        }
        let preview = snapshot.raw_content().and_then(|content| match content {
            Some(content) => DocumentView::load(&snapshot.kind(), &content).map(Some),
            None => Ok(None),
        });
        (self.view, self.preview_error) = match preview {
            Ok(view) => (view, None),
            Err(e) => {
                log::warn!("Preview unavailable for {}: {}", snapshot.display_file_name(), e);
                (None, Some(e.to_string()))
            }
        };
        log::info!(
            "Loaded document {} ({})",
            snapshot.document_id,
            snapshot.display_file_name()
        );
        self.snapshot = Some(snapshot);
        self.state = SessionState::Ready;
    }

    pub fn snapshot(&self) -> Option<&DocumentSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn editor(&self) -> &FieldEditor {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut FieldEditor {
        &mut self.editor
    }

    pub fn view(&self) -> Option<&DocumentView> {
        self.view.as_ref()
    }

    pub fn view_mut(&mut self) -> Option<&mut DocumentView> {
        self.view.as_mut()
    }

    pub fn preview_error(&self) -> Option<&str> {
        self.preview_error.as_deref()
    }

    /// Empty until a snapshot is loaded.
    pub fn display_file_name(&self) -> String {
        self.snapshot
            .as_ref()
            .map(|s| s.display_file_name())
            .unwrap_or_default()
    }

    /// Current page plus the focused field's box.
    pub fn render_request(&self) -> Option<RenderRequest> {
        self.view
            .as_ref()
            .map(|view| view.request(self.editor.active_highlight()))
    }

    pub fn render(&self, container_width: f64) -> Result<Option<RenderedSurface>> {
        match (&self.view, self.render_request()) {
            (Some(view), Some(request)) => view.render(&request, container_width).map(Some),
            _ => Ok(None),
        }
    }

    /// Submits the edited fields and keeps the server's answer for the next step.
    pub fn verify<T: Transport>(&mut self, client: &SubmitClient<T>) -> Result<&Ack> {
        let document_id = match &self.snapshot {
            Some(snapshot) if snapshot.extracted_data.is_some() => snapshot.document_id.clone(),
            _ => {
                log::warn!("no extracted data available");
                return Err(VerifyError::NoExtractedData);
            }
        };
        match client.submit(&document_id, self.editor.fields()) {
            Ok(ack) => {
                self.state = SessionState::Verified;
                Ok(&*self.verified_data.insert(ack))
            }
            Err(VerifyError::Unauthorized) => {
                self.state = SessionState::SignedOut;
                Err(VerifyError::Unauthorized)
            }
            Err(e) => Err(e),
        }
    }

    /// Hand-off to the download step.
    pub fn verified_data(&self) -> Option<&Ack> {
        self.verified_data.as_ref()
    }

    pub fn status_message(&self) -> Option<StatusMessage> {
        match self.state {
            SessionState::Loading => Some(LOADING_MESSAGE),
            SessionState::NotFound => Some(NOT_FOUND_MESSAGE),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_document_id_is_not_found_immediately() {
        let session = VerifySession::new(None);
        assert_eq!(session.state(), SessionState::NotFound);
        let message = session.status_message().unwrap();
        assert_eq!(message.title, "No data found");
        assert_eq!(message.recovery_link, Some("/"));
    }

    #[test]
    fn new_session_shows_loading() {
        let session = VerifySession::new(Some("doc-1".to_string()));
        assert_eq!(session.state(), SessionState::Loading);
        assert_eq!(session.status_message().unwrap().title, "Processing your document");
        assert_eq!(session.display_file_name(), "");
        assert!(session.render_request().is_none());
    }
}
