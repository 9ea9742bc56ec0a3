use clap::{Args, Subcommand};
use colored::Colorize;
use postsmith_lib::{
    Repository,
    repository::{Channel, Links, ProfileRecord, Provider},
};

use crate::failure::{Failure, Outcome};

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// List profiles
    List,
    /// Show a profile's settings
    Show { name: Option<String> },
    /// Create a profile, or update an existing one
    Save(SaveArgs),
    /// Make a profile the active one
    Use { name: String },
}

#[derive(Args, Debug, Clone)]
pub struct SaveArgs {
    name: String,

    /// Text-generation provider. Defaults to the stored one, or Gemini for a new profile
    #[arg(long, value_enum)]
    provider: Option<Provider>,

    /// API key for the provider. Defaults to the stored one
    #[arg(long)]
    api_key: Option<String>,

    /// A social link, e.g. `--link Website=https://example.com`. An empty URL removes the link
    #[arg(long = "link", value_name = "CHANNEL=URL", value_parser = parse_link)]
    links: Vec<(Channel, String)>,

    /// Discard the stored settings instead of updating them
    #[arg(long)]
    replace: bool,
}

pub fn handle(repo: &Repository, selected: Option<&str>, cmd: &Command) -> Outcome {
    match cmd {
        Command::List => {
            let active = repo.active_profile();
            let profiles = repo.profiles()?;
            if profiles.is_empty() {
                eprintln!("{}", "No profiles found.".yellow());
            }
            for name in profiles {
                if active.as_deref() == Some(name.as_str()) {
                    println!("{} {}", "*".green().bold(), name.bold());
                } else {
                    println!("  {name}");
                }
            }
        }
        Command::Show { name } => {
            let Some(record) = repo.resolve_profile(name.as_deref().or(selected))? else {
                return Err(Failure::new(
                    sysexits::ExitCode::NoInput,
                    "No profiles found. Create one with `postsmith profile save`.",
                ));
            };
            show(&record);
        }
        Command::Save(args) => {
            let record = build_record(&repo.profile(&args.name), args)?;
            let key = repo.save_profile(&record)?;
            println!("Saved profile {}", key.bold());
        }
        Command::Use { name } => {
            repo.set_active_profile(name)?;
            println!("Active profile: {}", name.bold());
        }
    }

    Ok(())
}

/// Merge the command line over the stored record (unless replacing) and check the result is
/// complete enough to save.
fn build_record(existing: &ProfileRecord, args: &SaveArgs) -> Result<ProfileRecord, Failure> {
    let name = args.name.trim();
    if name.is_empty() {
        return Err(Failure::usage("Profile name must not be empty."));
    }

    let base = if args.replace || existing.is_empty() {
        ProfileRecord::default()
    } else {
        existing.clone()
    };

    let platform = match args.provider {
        Some(provider) => provider.to_string(),
        None if !base.platform.is_empty() => base.platform.clone(),
        None => Provider::Gemini.to_string(),
    };

    let credential = args
        .api_key
        .clone()
        .unwrap_or_else(|| base.credential.clone());
    if credential.trim().is_empty() {
        return Err(Failure::usage("An API key is required (--api-key)."));
    }

    let mut links = base.links.clone();
    for (channel, url) in &args.links {
        links.set(channel.clone(), url);
    }

    Ok(ProfileRecord {
        name: name.to_string(),
        platform,
        credential: credential.trim().to_string(),
        links,
    })
}

fn show(record: &ProfileRecord) {
    println!("{}", record.name.bold());
    match record.provider() {
        Ok(provider) => println!("  Platform: {provider}"),
        Err(_) => println!("  Platform: {} {}", record.platform, "(unsupported)".red()),
    }
    println!("  API key:  {}", mask(&record.credential));
    print_links(&record.links);
}

pub fn print_links(links: &Links) {
    if links.has_active() {
        println!("  Links:");
        for (channel, url) in links.active() {
            println!("    {} {}: {}", channel.icon(), channel, url);
        }
    } else {
        println!("  Links:    {}", "No links set.".dimmed());
    }
}

fn mask(credential: &str) -> String {
    let chars: Vec<char> = credential.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let tail: String = chars.iter().skip(chars.len().saturating_sub(4)).collect();
    format!("****{tail}")
}

fn parse_link(s: &str) -> Result<(Channel, String), String> {
    let (label, url) = s
        .split_once('=')
        .ok_or_else(|| format!("expected CHANNEL=URL, got `{s}`"))?;
    if label.trim().is_empty() {
        return Err("channel name must not be empty".into());
    }
    Ok((Channel::from(label.to_string()), url.trim().to_string()))
}
