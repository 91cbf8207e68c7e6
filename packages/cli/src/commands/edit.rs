use crate::config::Config;
use anyhow::Result;
use clap::{Args, Subcommand};
use colored::Colorize;
use missive_editor::{Document, Mutation};
use missive_evaluator::preview_values;
use missive_template::Address;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Args)]
pub struct EditArgs {
    /// Template file (defaults to the config's template)
    #[arg(short, long, global = true)]
    pub template: Option<PathBuf>,

    #[command(subcommand)]
    pub operation: EditOperation,
}

#[derive(Debug, Subcommand)]
pub enum EditOperation {
    /// Insert text into a text node at a caret offset
    InsertText {
        /// Address of the text node, e.g. /0-text
        address: Address,
        /// Caret offset in characters
        caret: usize,
        text: String,
    },

    /// Replace a text node's text
    ReplaceText { address: Address, text: String },

    /// Split a text node around a new conditional
    InsertIf { address: Address, caret: usize },

    /// Delete a conditional, merging the text around it
    DeleteIf { address: Address },
}

impl From<EditOperation> for Mutation {
    fn from(operation: EditOperation) -> Self {
        match operation {
            EditOperation::InsertText {
                address,
                caret,
                text,
            } => Mutation::InsertText {
                address,
                caret,
                text,
            },
            EditOperation::ReplaceText { address, text } => Mutation::ReplaceText { address, text },
            EditOperation::InsertIf { address, caret } => {
                Mutation::InsertConditional { address, caret }
            }
            EditOperation::DeleteIf { address } => Mutation::DeleteConditional { address },
        }
    }
}

pub fn edit(args: EditArgs, cwd: &Path) -> Result<()> {
    let config = Config::load(cwd)?;
    let path = config.template_path(cwd, args.template.as_deref());

    let mut doc = Document::load(&path)?;
    let mutation = Mutation::from(args.operation);
    let result = doc.apply(&mutation)?;
    doc.save()?;

    info!(op = mutation.name(), version = result.version, "Edited template");
    println!("  {} {} {}", "✓".green(), mutation.name(), mutation.address());
    match result.focus {
        Some(focus) => println!("  Focus: {} @ {}", focus.address, focus.caret),
        None => println!("  Focus: unchanged"),
    }
    println!("  Preview: {}", doc.render(Some(&preview_values(&config.var_names))));

    Ok(())
}
