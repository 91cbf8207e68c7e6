//! # Edit Session Management
//!
//! An EditSession is one user's view of a document: the document itself,
//! the text cursor, the undo history and the variable names the host offers
//! for insertion.
//!
//! Every edit goes through the history and moves the cursor to the focus the
//! mutation reports. If the cursor stops resolving to a text node (after an
//! undo, for example) it falls back to the start of the first text.

use crate::{Document, EditorError, Focus, Mutation, MutationResult, UndoStack};
use missive_evaluator::{preview_values, VarValues};
use missive_template::{locate, Address, Node};
use tracing::debug;

/// Single edit session
#[derive(Debug)]
pub struct EditSession {
    /// Session identifier
    pub id: String,

    /// Document being edited
    pub document: Document,

    /// Variable names offered for insertion
    pub var_names: Vec<String>,

    cursor: Focus,
    history: UndoStack,
}

impl EditSession {
    /// Create new edit session with the cursor at the start of the first text
    pub fn new(id: impl Into<String>, document: Document) -> Self {
        Self {
            id: id.into(),
            document,
            var_names: Vec::new(),
            cursor: Focus::new(Address::first_text(), 0),
            history: UndoStack::new(),
        }
    }

    pub fn with_var_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.var_names = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn cursor(&self) -> &Focus {
        &self.cursor
    }

    pub fn history(&self) -> &UndoStack {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut UndoStack {
        &mut self.history
    }

    /// Place the cursor in a text node; the caret is clamped to its length
    pub fn move_cursor(&mut self, address: Address, caret: usize) -> Result<(), EditorError> {
        let len = self.text_len(&address)?;
        self.cursor = Focus::new(address, caret.min(len));
        Ok(())
    }

    /// Insert literal text at the cursor
    pub fn type_text(&mut self, text: &str) -> Result<MutationResult, EditorError> {
        let mutation = Mutation::InsertText {
            address: self.cursor.address.clone(),
            caret: self.cursor.caret,
            text: text.to_string(),
        };
        self.apply(&mutation)
    }

    /// Insert the placeholder `{name}` at the cursor
    pub fn insert_variable(&mut self, name: &str) -> Result<MutationResult, EditorError> {
        self.type_text(&format!("{{{name}}}"))
    }

    /// Replace a text node's content as a text field reports it, then move
    /// the cursor to `caret` inside it
    pub fn change_text(
        &mut self,
        address: Address,
        caret: usize,
        text: &str,
    ) -> Result<MutationResult, EditorError> {
        let mutation = Mutation::ReplaceText {
            address: address.clone(),
            text: text.to_string(),
        };
        let result = self.apply(&mutation)?;
        self.cursor = Focus::new(address, caret.min(text.chars().count()));
        Ok(result)
    }

    /// Split the cursor's text node around a new conditional
    pub fn insert_conditional(&mut self) -> Result<MutationResult, EditorError> {
        let mutation = Mutation::InsertConditional {
            address: self.cursor.address.clone(),
            caret: self.cursor.caret,
        };
        self.apply(&mutation)
    }

    pub fn delete_conditional(&mut self, address: Address) -> Result<MutationResult, EditorError> {
        self.apply(&Mutation::DeleteConditional { address })
    }

    pub fn undo(&mut self) -> bool {
        let undone = self.history.undo(&mut self.document);
        self.revalidate_cursor();
        undone
    }

    pub fn redo(&mut self) -> bool {
        let redone = self.history.redo(&mut self.document);
        self.revalidate_cursor();
        redone
    }

    /// Render with every known variable blank, for previews
    pub fn preview(&self) -> String {
        self.document.render(Some(&preview_values(&self.var_names)))
    }

    /// Render against explicit values
    pub fn render(&self, values: &VarValues) -> String {
        self.document.render(Some(values))
    }

    fn apply(&mut self, mutation: &Mutation) -> Result<MutationResult, EditorError> {
        let result = self.history.apply(mutation, &mut self.document)?;
        match &result.focus {
            Some(focus) => self.cursor = focus.clone(),
            None => self.revalidate_cursor(),
        }
        Ok(result)
    }

    fn text_len(&self, address: &Address) -> Result<usize, EditorError> {
        let found = locate(self.document.template().nodes(), address)
            .map_err(crate::MutationError::from)?;
        match found.node {
            Node::Text(text) => Ok(text.text().chars().count()),
            Node::Conditional(_) => Err(crate::MutationError::NotText(address.clone()).into()),
        }
    }

    fn revalidate_cursor(&mut self) {
        match self.text_len(&self.cursor.address) {
            Ok(len) => self.cursor.caret = self.cursor.caret.min(len),
            Err(_) => {
                debug!(session = %self.id, cursor = %self.cursor.address, "Cursor no longer resolves, resetting");
                self.cursor = Focus::new(Address::first_text(), 0);
            }
        }
    }
}
