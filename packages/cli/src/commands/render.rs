use crate::config::Config;
use anyhow::{anyhow, Context, Result};
use clap::Args;
use missive_editor::Document;
use missive_evaluator::{preview_values, VarValues};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Args)]
pub struct RenderArgs {
    /// Template file (defaults to the config's template)
    #[arg(short, long)]
    pub template: Option<PathBuf>,

    /// JSON object of variable values
    #[arg(long)]
    pub values: Option<PathBuf>,

    /// Variable value as name=value (repeatable)
    #[arg(long = "var", value_parser = parse_var)]
    pub vars: Vec<(String, String)>,

    /// Do not blank the config's variables first; unset placeholders stay literal
    #[arg(long)]
    pub raw_values: bool,
}

fn parse_var(arg: &str) -> Result<(String, String), String> {
    arg.split_once('=')
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected name=value, got '{arg}'"))
}

/// Assemble the value map: blanks for known variables, then the values file, then `--var`
pub fn collect_values(args: &RenderArgs, config: &Config, cwd: &Path) -> Result<VarValues> {
    let mut values = if args.raw_values {
        VarValues::new()
    } else {
        preview_values(&config.var_names)
    };

    if let Some(path) = &args.values {
        let path = cwd.join(path);
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Cannot read values file {}", path.display()))?;
        let from_file: VarValues = serde_json::from_str(&content)
            .map_err(|err| anyhow!("{} is not a JSON object of strings: {}", path.display(), err))?;
        values.extend(from_file);
    }

    values.extend(args.vars.iter().cloned());
    debug!(count = values.len(), "Collected variable values");
    Ok(values)
}

pub fn render(args: RenderArgs, cwd: &Path) -> Result<()> {
    let config = Config::load(cwd)?;
    let path = config.template_path(cwd, args.template.as_deref());

    let doc = Document::load(&path)?;
    let values = collect_values(&args, &config, cwd)?;

    println!("{}", doc.render(Some(&values)));
    Ok(())
}
