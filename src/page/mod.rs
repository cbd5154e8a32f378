//! Minimal page document model
//!
//! Just enough DOM to run [`PageScript`]s the way a real page would: elements
//! in `<head>` with optional ids, looked up by id across the document.

use crate::models::{PageScript, StyleAction};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    pub id: Option<String>,
    pub text: String,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            id: None,
            text: String::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }
}

/// A page document. `head` is `None` until the parser reaches it; scripts
/// run at `document_start` then append to the root element instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub head: Option<Vec<Element>>,
    pub root: Vec<Element>,
}

impl Default for Document {
    fn default() -> Self {
        Self::loaded()
    }
}

impl Document {
    /// A fully parsed document with an empty head
    pub fn loaded() -> Self {
        Self {
            head: Some(Vec::new()),
            root: Vec::new(),
        }
    }

    /// A document at `document_start`: no head yet
    pub fn loading() -> Self {
        Self {
            head: None,
            root: Vec::new(),
        }
    }

    pub fn get_element_by_id(&self, id: &str) -> Option<&Element> {
        self.elements().find(|e| e.id.as_deref() == Some(id))
    }

    /// Number of elements carrying `id`
    pub fn count_id(&self, id: &str) -> usize {
        self.elements().filter(|e| e.id.as_deref() == Some(id)).count()
    }

    fn elements(&self) -> impl Iterator<Item = &Element> {
        self.head.iter().flatten().chain(self.root.iter())
    }

    fn append(&mut self, element: Element) {
        match self.head.as_mut() {
            Some(head) => head.push(element),
            None => self.root.push(element),
        }
    }

    fn remove_by_id(&mut self, id: &str) -> bool {
        let matches = |e: &Element| e.id.as_deref() == Some(id);
        if let Some(head) = self.head.as_mut() {
            if let Some(pos) = head.iter().position(matches) {
                head.remove(pos);
                return true;
            }
        }
        if let Some(pos) = self.root.iter().position(matches) {
            self.root.remove(pos);
            return true;
        }
        false
    }

    /// Run a page script against this document
    pub fn run(&mut self, script: &PageScript) {
        match &script.action {
            StyleAction::Inject { css } => {
                if self.get_element_by_id(&script.marker_id).is_some() {
                    return;
                }
                self.append(
                    Element::new("style")
                        .with_id(script.marker_id.clone())
                        .with_text(css.clone()),
                );
            }
            StyleAction::Remove => {
                self.remove_by_id(&script.marker_id);
            }
        }
    }

    /// Whether a marker with `marker_id` is present
    pub fn is_styled(&self, marker_id: &str) -> bool {
        self.get_element_by_id(marker_id).is_some()
    }
}
