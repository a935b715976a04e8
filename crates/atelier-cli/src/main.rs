use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};

use anyhow::Result;
use atelier_contracts::catalog::Polarity;
use atelier_contracts::console::{parse_command, ConsoleIntent, CONSOLE_HELP_COMMANDS};
use atelier_contracts::events::EventLog;
use atelier_contracts::session::{Applied, BuilderSession, SessionInput};
use atelier_contracts::style::{DraftSnapshot, GatePolicy, StyleMode, WEIGHT_CAP};
use atelier_engine::{
    build_generation_receipt, generation_receipt_path, load_draft_if_exists,
    profile_service_from_env, resolve_generation, save_draft, write_generation_receipt,
};
use clap::{Parser, Subcommand};
use serde_json::Value;

#[derive(Debug, Parser)]
#[command(name = "atelier", version, about = "Style profile composer for the photo generator")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    Compose(ComposeArgs),
    Run(RunArgs),
}

#[derive(Debug, Parser)]
struct ComposeArgs {
    #[arg(long)]
    out: PathBuf,
    #[arg(long)]
    events: Option<PathBuf>,
    #[arg(long)]
    draft: Option<PathBuf>,
    #[arg(long)]
    require_custom_tags: bool,
}

#[derive(Debug, Parser)]
struct RunArgs {
    #[arg(long)]
    out: PathBuf,
    #[arg(long)]
    preset: Option<String>,
    #[arg(long)]
    tag: Vec<String>,
    #[arg(long)]
    neg: Vec<String>,
    #[arg(long)]
    resemblance: Option<i64>,
    #[arg(long)]
    reference: Option<PathBuf>,
}

fn main() {
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("atelier error: {err:#}");
            std::process::exit(1);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    match cli.command {
        Command::Compose(args) => run_compose(args),
        Command::Run(args) => run_run(args),
    }
}

fn run_compose(args: ComposeArgs) -> Result<i32> {
    let events_path = args
        .events
        .clone()
        .unwrap_or_else(|| args.out.join("events.jsonl"));

    let mut session = BuilderSession::new(profile_service_from_env())?.with_policy(GatePolicy {
        require_custom_tags: args.require_custom_tags,
    });
    let session_id = session.session_id().to_string();
    session = session.with_event_log(EventLog::new(&events_path, session_id));

    if let Some(draft_path) = &args.draft {
        if let Some(draft) = load_draft_if_exists(draft_path)? {
            session = session.with_draft(draft);
            println!("Restored draft from {}", draft_path.display());
        }
    }

    println!("Atelier compose started. Type /help for commands.");

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        io::stdout().flush()?;

        line.clear();
        let read = match stdin.read_line(&mut line) {
            Ok(read) => read,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(err.into()),
        };
        if read == 0 {
            break;
        }

        let input = line.trim_end_matches(['\n', '\r']);
        let intent = parse_command(input);
        match intent.action.as_str() {
            "noop" => continue,
            "quit" => break,
            "help" => {
                println!("Commands: {}", CONSOLE_HELP_COMMANDS.join(" "));
            }
            "status" => print_status(&session),
            "search_catalog" => print_search(&session, arg_str(&intent, "text")),
            "list_profiles" => print_profiles(&session),
            _ => {
                for input in intent_inputs(&session, &intent) {
                    let applied = session.apply(input);
                    if !report(&mut session, &args.out, applied)? {
                        break;
                    }
                }
            }
        }
    }

    if let Some(draft_path) = &args.draft {
        save_draft(draft_path, session.draft())?;
        println!("Draft saved to {}", draft_path.display());
    }
    Ok(0)
}

fn run_run(args: RunArgs) -> Result<i32> {
    let mut session = BuilderSession::new(profile_service_from_env())?;

    if let Some(preset) = &args.preset {
        apply_or_warn(
            &mut session,
            SessionInput::SelectPreset {
                preset_id: preset.clone(),
            },
        );
    } else {
        session.apply(SessionInput::CustomTab);
        for text in &args.tag {
            apply_or_warn(
                &mut session,
                SessionInput::FreeTextSubmit {
                    polarity: Polarity::Positive,
                    text: text.clone(),
                },
            );
        }
        for text in &args.neg {
            apply_or_warn(
                &mut session,
                SessionInput::FreeTextSubmit {
                    polarity: Polarity::Negative,
                    text: text.clone(),
                },
            );
        }
    }
    if let Some(percent) = args.resemblance {
        session.apply(SessionInput::SliderSet { percent });
    }
    if args.reference.is_some() {
        session.apply(SessionInput::ImageDropped);
    }

    match session.apply(SessionInput::Generate) {
        Applied::Generate(snapshot) => {
            let receipt_path = write_receipt(&session, &args.out, &snapshot)?;
            println!("Generation request written to {}", receipt_path.display());
            Ok(0)
        }
        Applied::Blocked(reason) => {
            eprintln!("Generate blocked: {reason}");
            Ok(2)
        }
        other => {
            eprintln!("Generate did not run: {other:?}");
            Ok(2)
        }
    }
}

fn apply_or_warn(session: &mut BuilderSession, input: SessionInput) {
    match session.apply(input) {
        Applied::Notice(message) => eprintln!("Notice: {message}"),
        Applied::Blocked(reason) => eprintln!("Blocked: {reason}"),
        _ => {}
    }
}

/// Map a parsed console intent onto builder inputs. Dialog-backed commands
/// expand into their open/confirm sequence.
fn intent_inputs(session: &BuilderSession, intent: &ConsoleIntent) -> Vec<SessionInput> {
    match intent.action.as_str() {
        "add_positive" => vec![SessionInput::FreeTextSubmit {
            polarity: Polarity::Positive,
            text: arg_str(intent, "text"),
        }],
        "add_negative" => vec![SessionInput::FreeTextSubmit {
            polarity: Polarity::Negative,
            text: arg_str(intent, "text"),
        }],
        "remove_positive" => vec![SessionInput::TagRemove {
            polarity: Polarity::Positive,
            tag_id: arg_str(intent, "id"),
        }],
        "remove_negative" => vec![SessionInput::TagRemove {
            polarity: Polarity::Negative,
            tag_id: arg_str(intent, "id"),
        }],
        "toggle_catalog" => {
            let tag_id = arg_str(intent, "id");
            match session.catalog().get(&tag_id) {
                Some((polarity, _)) => vec![SessionInput::TagClick { polarity, tag_id }],
                None => {
                    println!("Unknown catalog tag: {tag_id}");
                    Vec::new()
                }
            }
        }
        "select_preset" => vec![SessionInput::SelectPreset {
            preset_id: arg_str(intent, "preset"),
        }],
        "preset_tab" => vec![SessionInput::PresetTab],
        "custom_tab" => vec![SessionInput::CustomTab],
        "set_resemblance" => match intent.args.get("value").and_then(Value::as_i64) {
            Some(percent) => vec![SessionInput::SliderSet { percent }],
            None => {
                println!("Usage: /resemblance <0-100>");
                Vec::new()
            }
        },
        "select_page" => match intent.args.get("value").and_then(Value::as_i64) {
            Some(page) if page > 0 => vec![SessionInput::PageSelect { page: page as usize }],
            _ => {
                println!("Usage: /page <number>");
                Vec::new()
            }
        },
        "reset" => match arg_str(intent, "scope").as_str() {
            "all" => vec![SessionInput::ResetTags { polarity: None }],
            "positive" => vec![SessionInput::ResetTags {
                polarity: Some(Polarity::Positive),
            }],
            "negative" => vec![SessionInput::ResetTags {
                polarity: Some(Polarity::Negative),
            }],
            "resemblance" => vec![SessionInput::ResetResemblance],
            _ => {
                println!("Usage: /reset [pos|neg|all|resemblance]");
                Vec::new()
            }
        },
        "save_profile" => vec![SessionInput::ProfileSave {
            name: arg_str(intent, "text"),
        }],
        "apply_profile" => vec![SessionInput::ProfileApply {
            id: arg_str(intent, "id"),
        }],
        "rename_profile" => vec![
            SessionInput::ProfileEditOpen {
                id: arg_str(intent, "id"),
            },
            SessionInput::ProfileEditName {
                name: arg_str(intent, "name"),
            },
            SessionInput::ProfileEditConfirm,
        ],
        "delete_profile" => vec![
            SessionInput::ProfileDeleteOpen {
                id: arg_str(intent, "id"),
            },
            SessionInput::ProfileDeleteConfirm,
        ],
        "image_dropped" => vec![SessionInput::ImageDropped],
        "generate" => vec![SessionInput::Generate],
        "unknown" => {
            println!(
                "Unknown command /{}. Type /help for commands.",
                arg_str(intent, "command")
            );
            Vec::new()
        }
        _ => Vec::new(),
    }
}

/// Print the outcome of one applied input. Returns false when the rest of
/// an expanded sequence should be skipped.
fn report(session: &mut BuilderSession, out_dir: &Path, applied: Applied) -> Result<bool> {
    match applied {
        Applied::Updated => Ok(true),
        Applied::NoChange => Ok(true),
        Applied::Notice(message) => {
            println!("Notice: {message}");
            Ok(false)
        }
        Applied::Blocked(reason) => {
            println!("Blocked: {reason}");
            Ok(false)
        }
        Applied::Busy(message) => {
            println!("Busy: {message}");
            Ok(false)
        }
        Applied::Generate(snapshot) => {
            let receipt_path = write_receipt(session, out_dir, &snapshot)?;
            println!("Generation request written to {}", receipt_path.display());
            Ok(true)
        }
    }
}

fn write_receipt(
    session: &BuilderSession,
    out_dir: &Path,
    snapshot: &DraftSnapshot,
) -> Result<PathBuf> {
    let resolved = resolve_generation(snapshot, session.presets());
    for warning in &resolved.warnings {
        println!("Warning: {warning}");
    }
    let payload = build_generation_receipt(snapshot, &resolved);
    let receipt_path = generation_receipt_path(out_dir);
    write_generation_receipt(&receipt_path, &payload)?;
    Ok(receipt_path)
}

fn print_status(session: &BuilderSession) {
    match session.draft().mode() {
        StyleMode::Preset { preset_id: Some(id) } => {
            let label = session
                .presets()
                .get(id)
                .map(|preset| preset.label.clone())
                .unwrap_or_else(|| id.clone());
            println!("Mode: preset ({label})");
        }
        StyleMode::Preset { preset_id: None } => println!("Mode: preset (none selected)"),
        StyleMode::Custom => println!("Mode: custom"),
    }
    for (label, polarity) in [("Positive", Polarity::Positive), ("Negative", Polarity::Negative)] {
        let selection = session.draft().selection(polarity);
        println!(
            "{label} tags ({}/{} words):",
            selection.weight(),
            WEIGHT_CAP
        );
        for tag in selection.tags() {
            println!("  [{}] {}", tag.id, tag.text);
        }
    }
    println!("Resemblance: {}%", session.draft().resemblance());
    println!(
        "Reference image: {}",
        if session.upload().has_image { "attached" } else { "none" }
    );
    println!(
        "Generate: {}",
        if session.can_generate() { "ready" } else { "blocked" }
    );
}

fn print_search(session: &BuilderSession, query: String) {
    for (label, polarity) in [("Positive", Polarity::Positive), ("Negative", Polarity::Negative)] {
        let hits = session.catalog().search(polarity, &query);
        if hits.is_empty() {
            continue;
        }
        println!("{label} catalog:");
        for tag in hits {
            println!("  [{}] {}", tag.id, tag.text);
        }
    }
}

fn print_profiles(session: &BuilderSession) {
    let page = session.profile_page();
    println!(
        "Profiles page {}/{} ({} total):",
        page.page, page.page_count, page.total_count
    );
    for profile in &page.items {
        if profile.preview_text.is_empty() {
            println!("  [{}] {}", profile.id, profile.name);
        } else {
            println!("  [{}] {} :: {}", profile.id, profile.name, profile.preview_text);
        }
    }
}

fn arg_str(intent: &ConsoleIntent, key: &str) -> String {
    intent
        .args
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string()
}
