use crate::config::Config;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use missive_editor::Document;
use missive_evaluator::placeholders;
use missive_template::{Node, Template};
use std::path::{Path, PathBuf};

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Template file (defaults to the config's template)
    #[arg(short, long)]
    pub template: Option<PathBuf>,
}

/// One line per node: address, kind, fingerprint and text
pub fn outline(template: &Template) -> Vec<String> {
    let mut lines = Vec::new();
    template.walk(&mut |depth, node| {
        let indent = "  ".repeat(depth);
        let line = match node {
            Node::Text(text) => format!(
                "{}{} {} {} {:?}",
                indent,
                node.address(),
                node.kind(),
                text.fingerprint(),
                text.text()
            ),
            Node::Conditional(_) => format!("{}{} {}", indent, node.address(), node.kind()),
        };
        lines.push(line);
    });
    lines
}

/// Placeholders that name no configured variable
pub fn unknown_placeholders(template: &Template, config: &Config) -> Vec<String> {
    let mut unknown = Vec::new();
    template.walk(&mut |_, node| {
        if let Some(text) = node.text_content() {
            for name in placeholders(text) {
                if !config.var_names.iter().any(|known| known == name)
                    && !unknown.iter().any(|seen| seen == name)
                {
                    unknown.push(name.to_string());
                }
            }
        }
    });
    unknown
}

pub fn show(args: ShowArgs, cwd: &Path) -> Result<()> {
    let config = Config::load(cwd)?;
    let path = config.template_path(cwd, args.template.as_deref());
    let doc = Document::load(&path)?;

    println!("{}", path.display().to_string().bright_white().bold());
    for line in outline(doc.template()) {
        println!("  {}", line);
    }

    let unknown = unknown_placeholders(doc.template(), &config);
    if !unknown.is_empty() {
        println!();
        println!(
            "{} placeholders not in varNames: {}",
            "⚠️".yellow(),
            unknown.join(", ")
        );
    }

    Ok(())
}
