use crate::config::{Config, DEFAULT_CONFIG_NAME};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use missive_template::{parse, stringify_pretty};
use std::fs;
use std::path::Path;

/// Greeting written by `missive init` when no template exists yet
pub const SAMPLE_TEMPLATE: &str = r#"[
  {"type": "TEXT", "text": "Hello, {firstname}."},
  {"type": "IF",
   "condition": [{"type": "TEXT", "text": "{company}"}],
   "then": [
     {"type": "TEXT", "text": " I know you work at {company}"},
     {"type": "IF",
      "condition": [{"type": "TEXT", "text": "{position}"}],
      "then": [{"type": "TEXT", "text": " as {position}"}],
      "else": [{"type": "TEXT", "text": ", but what is your role?"}]},
     {"type": "TEXT", "text": " ;)"}
   ],
   "else": [{"type": "TEXT", "text": " Where do you work at the moment?"}]},
  {"type": "TEXT", "text": " Kindest regards, John."}
]"#;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Template file to create
    #[arg(short, long, default_value = "template.json")]
    pub template: String,

    /// Force overwrite existing config and template
    #[arg(short, long)]
    pub force: bool,
}

pub fn init(args: InitArgs, cwd: &Path) -> Result<()> {
    let config_path = cwd.join(DEFAULT_CONFIG_NAME);

    if config_path.exists() && !args.force {
        println!(
            "{} {} already exists",
            "⚠️".yellow(),
            DEFAULT_CONFIG_NAME.bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    println!("{}", "📝 Initializing Missive project...".bright_blue().bold());

    let template_path = cwd.join(&args.template);
    if args.force || !template_path.exists() {
        if let Some(parent) = template_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&template_path, stringify_pretty(&parse(SAMPLE_TEMPLATE)?))?;
        println!("  {} Created {}", "✓".green(), args.template);
    }

    let config = Config {
        template: args.template.clone(),
        ..Config::default()
    };
    fs::write(&config_path, serde_json::to_string_pretty(&config)?)?;

    println!("  {} Created {}", "✓".green(), DEFAULT_CONFIG_NAME);
    println!();
    println!("{}", "✅ Project initialized!".green().bold());
    println!();
    println!("Next steps:");
    println!("  1. Run: missive show");
    println!("  2. Run: missive render --var firstname=Peter --var company=\"Web Studio\"");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_writes_config_and_sample() {
        let dir = tempfile::tempdir().unwrap();
        init(
            InitArgs {
                template: "template.json".to_string(),
                force: false,
            },
            dir.path(),
        )
        .unwrap();

        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config, Config::default());

        let written = fs::read_to_string(dir.path().join("template.json")).unwrap();
        assert_eq!(parse(&written).unwrap(), parse(SAMPLE_TEMPLATE).unwrap());
    }

    #[test]
    fn test_init_respects_existing_files() {
        let dir = tempfile::tempdir().unwrap();
        let args = |force| InitArgs {
            template: "mine.json".to_string(),
            force,
        };

        fs::write(dir.path().join(DEFAULT_CONFIG_NAME), "{}").unwrap();
        fs::write(dir.path().join("mine.json"), "[]").unwrap();

        // Existing config: nothing is touched
        init(args(false), dir.path()).unwrap();
        assert_eq!(fs::read_to_string(dir.path().join("mine.json")).unwrap(), "[]");
        assert_eq!(Config::load(dir.path()).unwrap().template, "template.json");

        init(args(true), dir.path()).unwrap();
        assert_eq!(Config::load(dir.path()).unwrap().template, "mine.json");
        let written = fs::read_to_string(dir.path().join("mine.json")).unwrap();
        assert_eq!(parse(&written).unwrap(), parse(SAMPLE_TEMPLATE).unwrap());
    }
}
