use crate::form::{natural_cmp, should_use_textarea};
use crate::types::{BoundingBox, ExtractedField, FieldMapping};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorKind {
    SingleLine,
    MultiLine,
}

/// Editable field values of the loaded document plus the focus/highlight pair.
#[derive(Debug, Default, Clone)]
pub struct FieldEditor {
    fields: FieldMapping,
    focused: Option<String>,
    active_highlight: Option<BoundingBox>,
}

impl FieldEditor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces every field; focus does not survive a new document.
    pub fn load(&mut self, mapping: FieldMapping) {
        log::debug!("Loaded {} extracted field(s)", mapping.len());
        self.fields = mapping;
        self.focused = None;
        self.active_highlight = None;
    }

    /// Sets the value of an existing field; unknown keys are ignored.
    pub fn edit(&mut self, key: &str, new_value: impl Into<String>) {
        match self.fields.get_mut(key) {
            Some(field) => field.value = Value::String(new_value.into()),
            None => log::debug!("Ignoring edit of unknown field '{}'", key),
        }
    }

    pub fn focus(&mut self, key: &str) {
        match self.fields.get(key) {
            Some(field) => {
                self.focused = Some(key.to_string());
                self.active_highlight = field.bounding_box;
            }
            None => self.blur(),
        }
    }

    pub fn blur(&mut self) {
        self.focused = None;
        self.active_highlight = None;
    }

    pub fn focused(&self) -> Option<&str> {
        self.focused.as_deref()
    }

    pub fn active_highlight(&self) -> Option<BoundingBox> {
        self.active_highlight
    }

    pub fn field(&self, key: &str) -> Option<&ExtractedField> {
        self.fields.get(key)
    }

    pub fn fields(&self) -> &FieldMapping {
        &self.fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Fields in display order, recomputed on every call.
    pub fn ordered_entries(&self) -> Vec<(&str, &ExtractedField)> {
        let mut entries: Vec<(&str, &ExtractedField)> = self
            .fields
            .iter()
            .map(|(key, field)| (key.as_str(), field))
            .collect();
        entries.sort_by(|(a, _), (b, _)| natural_cmp(a, b));
        entries
    }

    pub fn editor_kind(&self, key: &str) -> EditorKind {
        match self.fields.get(key) {
            Some(field) if should_use_textarea(&field.value) => EditorKind::MultiLine,
            _ => EditorKind::SingleLine,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> FieldMapping {
        let mut fields = FieldMapping::new();
        fields.insert(
            "field1".to_string(),
            ExtractedField::new("Clarus")
                .with_confidence(0.97)
                .with_bounding_box(BoundingBox::new(0.1, 0.1, 0.2, 0.05)),
        );
        fields.insert("field10".to_string(), ExtractedField::new(json!(12.5)));
        fields.insert(
            "field2".to_string(),
            ExtractedField::new("line one\nline two").with_confidence(0.4),
        );
        fields
    }

    #[test]
    fn edit_of_missing_key_changes_nothing() {
        let mut editor = FieldEditor::new();
        editor.load(sample());
        let before = editor.fields().clone();
        editor.edit("nope", "value");
        assert_eq!(editor.fields(), &before);
    }

    #[test]
    fn edit_touches_only_the_value_of_one_field() {
        let mut editor = FieldEditor::new();
        editor.load(sample());
        let before = editor.fields().clone();
        editor.edit("field1", "Dogcow");

        let edited = editor.field("field1").unwrap();
        assert_eq!(edited.value, json!("Dogcow"));
        assert_eq!(edited.confidence, before["field1"].confidence);
        assert_eq!(edited.bounding_box, before["field1"].bounding_box);
        assert_eq!(editor.field("field2"), before.get("field2"));
        assert_eq!(editor.field("field10"), before.get("field10"));
    }

    #[test]
    fn ordered_entries_are_numeric_aware() {
        let mut editor = FieldEditor::new();
        editor.load(sample());
        let keys: Vec<&str> = editor.ordered_entries().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["field1", "field2", "field10"]);
    }

    #[test]
    fn focus_exposes_bounding_box_and_blur_clears_it() {
        let mut editor = FieldEditor::new();
        editor.load(sample());

        editor.focus("field1");
        assert_eq!(editor.focused(), Some("field1"));
        assert_eq!(
            editor.active_highlight(),
            Some(BoundingBox::new(0.1, 0.1, 0.2, 0.05))
        );

        editor.blur();
        assert_eq!(editor.focused(), None);
        assert_eq!(editor.active_highlight(), None);
    }

    #[test]
    fn focusing_a_field_without_box_leaves_no_highlight() {
        let mut editor = FieldEditor::new();
        editor.load(sample());
        editor.focus("field1");
        editor.focus("field2");
        assert_eq!(editor.focused(), Some("field2"));
        assert_eq!(editor.active_highlight(), None);
    }

    #[test]
    fn load_resets_focus() {
        let mut editor = FieldEditor::new();
        editor.load(sample());
        editor.focus("field1");
        editor.load(FieldMapping::new());
        assert!(editor.is_empty());
        assert_eq!(editor.active_highlight(), None);
    }

    #[test]
    fn editor_kind_follows_value_shape() {
        let mut editor = FieldEditor::new();
        editor.load(sample());
        assert_eq!(editor.editor_kind("field2"), EditorKind::MultiLine);
        assert_eq!(editor.editor_kind("field1"), EditorKind::SingleLine);
        assert_eq!(editor.editor_kind("field10"), EditorKind::SingleLine);
        assert_eq!(editor.editor_kind("missing"), EditorKind::SingleLine);
    }
}
