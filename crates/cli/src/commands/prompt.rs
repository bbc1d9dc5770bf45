//! Prompt catalog command handlers.

use clap::{Args, Subcommand};
use promptdoc_core::{AppError, AppResult};
use promptdoc_store::{Prompt, PromptStore};
use std::path::PathBuf;

/// Manage the prompt catalog and activations
#[derive(Args, Debug)]
pub struct PromptCommand {
    #[command(subcommand)]
    action: PromptAction,
}

#[derive(Subcommand, Debug)]
enum PromptAction {
    /// Create a new prompt (version 1, owned by the caller)
    Create {
        /// Category string, e.g. "summarize"
        #[arg(long)]
        purpose: String,

        /// Display label
        #[arg(long)]
        name: String,

        /// Template text (inline)
        #[arg(long, conflicts_with = "template_file")]
        template: Option<String>,

        /// Read template text from a file
        #[arg(long)]
        template_file: Option<PathBuf>,
    },

    /// List prompts, optionally filtered by purpose
    List {
        #[arg(long)]
        purpose: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show one prompt
    Get {
        id: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Replace a prompt's template (owner only; bumps the version)
    Update {
        id: String,

        #[arg(long, conflicts_with = "template_file")]
        template: Option<String>,

        #[arg(long)]
        template_file: Option<PathBuf>,
    },

    /// Mark a prompt active for the caller and a purpose
    Activate {
        id: String,

        #[arg(long)]
        purpose: String,
    },

    /// Show the caller's active prompt for a purpose
    Active {
        #[arg(long)]
        purpose: String,
    },

    /// Delete a prompt and its activations (owner only)
    Delete { id: String },
}

impl PromptCommand {
    /// Execute the prompt subcommand against the configured store.
    pub fn execute(&self, store: &dyn PromptStore, user: &str) -> AppResult<()> {
        match &self.action {
            PromptAction::Create {
                purpose,
                name,
                template,
                template_file,
            } => {
                let template = read_template(template.as_deref(), template_file.as_deref())?;
                let prompt = store.create(purpose, name, &template, user)?;
                println!("Created prompt {} (version {})", prompt.id, prompt.version);
                Ok(())
            }

            PromptAction::List { purpose, json } => {
                let prompts = store.list(purpose.as_deref())?;
                if *json {
                    println!("{}", serde_json::to_string_pretty(&prompts)?);
                } else if prompts.is_empty() {
                    println!("No prompts found");
                } else {
                    for prompt in prompts {
                        println!(
                            "{}  v{}  [{}]  {}  (owner: {})",
                            prompt.id, prompt.version, prompt.purpose, prompt.name, prompt.owner
                        );
                    }
                }
                Ok(())
            }

            PromptAction::Get { id, json } => {
                let prompt = store
                    .get(id)?
                    .ok_or_else(|| AppError::NotFound(id.clone()))?;
                print_prompt(&prompt, *json)
            }

            PromptAction::Update {
                id,
                template,
                template_file,
            } => {
                let template = read_template(template.as_deref(), template_file.as_deref())?;
                let prompt = store.update(id, &template, user)?;
                println!("Updated prompt {} to version {}", prompt.id, prompt.version);
                Ok(())
            }

            PromptAction::Activate { id, purpose } => {
                let prompt = store.activate(user, purpose, id)?;
                println!(
                    "Activated prompt {} (v{}) for user '{}' purpose '{}'",
                    prompt.id, prompt.version, user, purpose
                );
                Ok(())
            }

            PromptAction::Active { purpose } => match store.get_active(user, purpose)? {
                Some(prompt) => print_prompt(&prompt, false),
                None => {
                    println!("No active prompt for purpose '{}'", purpose);
                    Ok(())
                }
            },

            PromptAction::Delete { id } => {
                if store.delete(id, user)? {
                    println!("Deleted prompt {}", id);
                    Ok(())
                } else {
                    Err(AppError::NotFound(id.clone()))
                }
            }
        }
    }
}

fn print_prompt(prompt: &Prompt, json: bool) -> AppResult<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(prompt)?);
    } else {
        println!("id:       {}", prompt.id);
        println!("purpose:  {}", prompt.purpose);
        println!("name:     {}", prompt.name);
        println!("version:  {}", prompt.version);
        println!("owner:    {}", prompt.owner);
        println!("template:\n{}", prompt.template);
    }
    Ok(())
}

fn read_template(inline: Option<&str>, file: Option<&std::path::Path>) -> AppResult<String> {
    match (inline, file) {
        (Some(template), None) => Ok(template.to_string()),
        (None, Some(path)) => std::fs::read_to_string(path).map_err(|e| {
            AppError::Configuration(format!("Failed to read template file {:?}: {}", path, e))
        }),
        _ => Err(AppError::Configuration(
            "Provide exactly one of --template or --template-file".to_string(),
        )),
    }
}
