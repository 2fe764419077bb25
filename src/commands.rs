use crate::config::{validate_container_width, Config};
use crate::editor::EditorKind;
use crate::error::{Result, VerifyError};
use crate::form::{confidence_label, display_value};
use crate::poll::{CancelToken, PollClient};
use crate::session::VerifySession;
use crate::submit::SubmitClient;
use crate::transport::HttpTransport;
use crate::types::Ack;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// One row of the verification form.
#[derive(Debug, Serialize)]
pub struct FieldRow {
    pub key: String,
    pub value: String,
    pub confidence: String,
    pub multiline: bool,
    pub has_bounding_box: bool,
}

#[derive(Debug, Serialize)]
pub struct DocumentSummary {
    pub document_id: String,
    pub file_name: String,
    pub mime_type: Option<String>,
    pub total_pages: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview_error: Option<String>,
    pub fields: Vec<FieldRow>,
}

#[derive(Debug, Serialize)]
pub struct RenderSummary {
    pub page: u32,
    pub total_pages: u32,
    pub width: u32,
    pub height: u32,
    pub scale: f64,
    pub page_rendered: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlight: Option<[f64; 4]>,
    pub output: String,
}

fn transport(config: &Config) -> Result<HttpTransport> {
    Ok(HttpTransport::from_config(config)?
        .with_sign_out(|| log::error!("You are no longer signed in! Please sign in again.")))
}

/// Polls the backend for `document_id` and returns a loaded session.
pub fn open_session(config: &Config, document_id: &str, cancel: &CancelToken) -> Result<VerifySession> {
    let client = PollClient::new(transport(config)?);
    let mut session = VerifySession::new(Some(document_id.to_string()));
    session.start(&client, config.poll_options(), cancel)?;
    Ok(session)
}

pub fn summarize(session: &VerifySession) -> Result<DocumentSummary> {
    let snapshot = session.snapshot().ok_or(VerifyError::NoExtractedData)?;
    let editor = session.editor();
    let fields = editor
        .ordered_entries()
        .into_iter()
        .map(|(key, field)| FieldRow {
            key: key.to_string(),
            value: display_value(&field.value),
            confidence: confidence_label(field),
            multiline: editor.editor_kind(key) == EditorKind::MultiLine,
            has_bounding_box: field.bounding_box.is_some(),
        })
        .collect();
    Ok(DocumentSummary {
        document_id: snapshot.document_id.clone(),
        file_name: session.display_file_name(),
        mime_type: session.view().map(|v| v.mime_type().to_string()),
        total_pages: session.view().map(|v| v.total_pages()),
        preview_error: session.preview_error().map(str::to_string),
        fields,
    })
}

/// Writes the decoded source document, e.g. to open it in a viewer.
pub fn save_document(session: &VerifySession, path: &Path) -> Result<()> {
    let content = session
        .snapshot()
        .map(|s| s.raw_content())
        .transpose()?
        .flatten()
        .ok_or_else(|| VerifyError::Decode("Document has no content".to_string()))?;
    fs::write(path, &content)?;
    Ok(())
}

fn no_preview(session: &VerifySession) -> VerifyError {
    match session.preview_error() {
        Some(reason) => VerifyError::Render(format!("Document cannot be previewed: {}", reason)),
        None => VerifyError::Render("Document has no content".to_string()),
    }
}

/// Renders `page` with `focus`'s box highlighted and writes it as PNG.
pub fn render_preview(
    session: &mut VerifySession,
    page: Option<u32>,
    focus: Option<&str>,
    container_width: f64,
    out: &Path,
) -> Result<RenderSummary> {
    let container_width = validate_container_width(container_width)?;
    if session.view().is_none() {
        return Err(no_preview(session));
    }
    if let (Some(page), Some(view)) = (page, session.view_mut()) {
        if view.change_page(page as i64) != page {
            return Err(VerifyError::Render(format!(
                "Page {} out of range (1-{})",
                page,
                view.total_pages()
            )));
        }
    }
    match focus {
        Some(key) => {
            if session.editor().field(key).is_none() {
                return Err(VerifyError::Render(format!("Unknown field '{}'", key)));
            }
            session.editor_mut().focus(key);
        }
        None => session.editor_mut().blur(),
    }
    let surface = session
        .render(container_width)?
        .ok_or_else(|| no_preview(session))?;
    surface.write_png(out)?;
    Ok(RenderSummary {
        page: surface.page,
        total_pages: surface.total_pages,
        width: surface.width,
        height: surface.height,
        scale: surface.scale,
        page_rendered: surface.page_rendered,
        highlight: surface.highlight.map(|r| [r.x, r.y, r.w, r.h]),
        output: out.display().to_string(),
    })
}

/// Parses `key=value` edits; the value may contain `=`.
pub fn parse_edit(raw: &str) -> Result<(String, String)> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| VerifyError::Config(format!("Expected key=value, got '{}'", raw)))?;
    Ok((key.trim().to_string(), value.replace("\\n", "\n")))
}

/// Applies edits and submits; returns the verified data for the download step.
pub fn verify_document(config: &Config, session: &mut VerifySession, edits: &[(String, String)]) -> Result<Ack> {
    for (key, value) in edits {
        if session.editor().field(key).is_none() {
            log::warn!("Field '{}' not in document; edit ignored", key);
        }
        session.editor_mut().edit(key, value.clone());
    }
    let client = SubmitClient::new(transport(config)?);
    session.verify(&client).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_edit_splits_on_first_equals() {
        assert_eq!(
            parse_edit("total= a=b ").unwrap(),
            ("total".to_string(), " a=b ".to_string())
        );
        assert_eq!(
            parse_edit("address=1 Main St\\nSpringfield").unwrap().1,
            "1 Main St\nSpringfield"
        );
        assert!(parse_edit("novalue").is_err());
    }

    fn session_with_unreadable_preview() -> VerifySession {
        let snapshot = serde_json::from_value(serde_json::json!({
            "document_id": "doc-1",
            "document_key": "input/scan.pdf",
            "base64_encoded_file": "bm90IGEgcGRm",
            "extracted_data": { "total": { "value": "12.50" } }
        }))
        .unwrap();
        let mut session = VerifySession::new(Some("doc-1".to_string()));
        session.load(snapshot);
        session
    }

    #[test]
    fn summary_reports_preview_error() {
        let session = session_with_unreadable_preview();
        let summary = summarize(&session).unwrap();
        assert!(summary.preview_error.is_some());
        assert_eq!(summary.total_pages, None);
        assert_eq!(summary.fields.len(), 1);
    }

    #[test]
    fn render_preview_rejects_bad_width_and_missing_preview() {
        let mut session = session_with_unreadable_preview();
        let out = Path::new("/nonexistent/preview.png");

        let result = render_preview(&mut session, None, None, f64::NAN, out);
        assert!(matches!(result, Err(VerifyError::Config(_))));

        match render_preview(&mut session, None, None, 800.0, out) {
            Err(VerifyError::Render(message)) => assert!(message.starts_with("Document cannot be previewed")),
            other => panic!("unexpected result: {:?}", other.map(|s| s.output)),
        }
    }
}
