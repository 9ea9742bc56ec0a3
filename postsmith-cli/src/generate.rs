use clap::Args;
use colored::Colorize;
use postsmith_lib::{Repository, repository::ProfileRecord, sections::GenerationResult};
use sysexits::ExitCode;

use crate::{
    failure::{Failure, Outcome},
    profile::print_links,
};

#[derive(Args, Debug, Clone)]
pub struct PostArgs {
    /// Network the post is written for
    #[arg(short, long, default_value = "YouTube")]
    network: String,

    /// What the content is about
    #[arg(required = true, num_args = 1..)]
    description: Vec<String>,
}

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    #[command(flatten)]
    post: PostArgs,

    /// Also write the raw reply to `<network>_seo.txt` in the export directory
    #[arg(long)]
    save: bool,
}

impl PostArgs {
    fn description(&self) -> Result<String, Failure> {
        let description = self.description.join(" ");
        if description.trim().is_empty() {
            return Err(Failure::usage("Enter a description."));
        }
        Ok(description)
    }
}

fn selected_profile(repo: &Repository, selected: Option<&str>) -> Result<ProfileRecord, Failure> {
    let record = repo.resolve_profile(selected)?.ok_or_else(|| {
        Failure::new(ExitCode::NoInput, "Create a profile first with `postsmith profile save`.")
    })?;

    if !record.has_credential() {
        return Err(Failure::usage(format!(
            "Profile {} has no API key. Set one with `postsmith profile save {} --api-key <KEY>`.",
            record.name, record.name
        )));
    }

    Ok(record)
}

pub fn print_prompt(repo: &Repository, selected: Option<&str>, args: &PostArgs) -> Outcome {
    let description = args.description()?;
    let record = selected_profile(repo, selected)?;

    println!("{}", repo.build_prompt(&record, &args.network, &description));

    Ok(())
}

pub fn handle(repo: &Repository, selected: Option<&str>, args: &GenerateArgs) -> Outcome {
    let description = args.post.description()?;
    let record = selected_profile(repo, selected)?;
    let network = &args.post.network;

    println!("Profile: {} | Platform: {}", record.name.bold(), record.platform.bold());
    print_links(&record.links);
    eprintln!("{}", "Generating...".dimmed());

    let result = repo.generate(&record, network, &description);

    if result.is_error() {
        return Err(Failure::new(ExitCode::Unavailable, result.body()));
    }

    render(&result);

    if args.save {
        let path = repo.export(network, result.raw())?;
        println!("\nSaved raw reply to {}", path.display().to_string().bold());
    }

    Ok(())
}

fn render(result: &GenerationResult) {
    if result.is_fallback() {
        eprintln!("{}", "AI formatting failed. Showing raw output:".yellow().bold());
        println!("\n{}", result.body());
        return;
    }

    section("📌 Title", result.title());
    section("📝 Main Content (Desc + Links + Hashtags + Keywords)", result.body());
    section("🏷️ Backend Tags", result.tags());
}

fn section(heading: &str, text: &str) {
    println!("\n{}", heading.bold().underline());
    if text.is_empty() {
        println!("{}", "(empty)".dimmed());
    } else {
        println!("{text}");
    }
}
