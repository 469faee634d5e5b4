//! Command dispatch: loads the workspace (config + store) and hands each
//! subcommand to the matching library call.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use colored::Colorize;

use super::args::{
    Arguments, CleanArgs, Command, ExchangeFormat, ExportArgs, GroupsAction, GroupsCommand,
    ImportArgs, ListArgs, RmArgs, ScanArgs, SetArgs, TranslateArgs,
};
use super::exit_status::ExitStatus;
use super::report::{FAILURE_MARK, SUCCESS_MARK};
use crate::audit::{self, KeyScope};
use crate::config::{self, CONFIG_FILE_NAME, Config};
use crate::error::Error;
use crate::exchange;
use crate::scan;
use crate::sites;
use crate::store::{ListQuery, SaveItem, TranslationStore};
use crate::translate::{self, TextFormat, google::GoogleTranslator};

struct Workspace {
    root: PathBuf,
    config: Config,
    store: TranslationStore,
}

fn open_workspace() -> Result<Workspace> {
    let cwd = env::current_dir()?;
    let loaded = config::load_config(&cwd)?;
    if !loaded.from_file {
        bail!(
            "No {} found. Run `loctl init` to create one.",
            CONFIG_FILE_NAME
        );
    }
    let db_path = loaded.root.join(&loaded.config.database_path);
    if let Some(parent) = db_path.parent() {
        fs::create_dir_all(parent)?;
    }
    let store = TranslationStore::open(&db_path)
        .with_context(|| format!("Failed to open database {}", db_path.display()))?;
    Ok(Workspace {
        root: loaded.root,
        config: loaded.config,
        store,
    })
}

/// Groups visible to list/clean, or None when nothing is marked inactive.
fn visible_groups(workspace: &Workspace) -> Result<Option<Vec<String>>> {
    if workspace.config.inactive_groups.is_empty() {
        return Ok(None);
    }
    let all = workspace.store.groups()?;
    Ok(Some(
        all.into_iter()
            .filter(|group| !workspace.config.inactive_groups.contains(group))
            .collect(),
    ))
}

pub fn run(Arguments { command }: Arguments) -> Result<ExitStatus> {
    match command {
        Some(Command::Init) => init(),
        Some(Command::List(args)) => list(args),
        Some(Command::Set(args)) => set(args),
        Some(Command::Rm(args)) => rm(args),
        Some(Command::Groups(cmd)) => groups(cmd),
        Some(Command::Scan(args)) => scan_templates(args),
        Some(Command::Clean(args)) => clean(args),
        Some(Command::Export(args)) => export(args),
        Some(Command::Import(args)) => import(args),
        Some(Command::Translate(args)) => translate_missing(args),
        None => bail!("No command provided. Use --help to see available commands."),
    }
}

fn init() -> Result<ExitStatus> {
    let config_path = Path::new(CONFIG_FILE_NAME);
    if config_path.exists() {
        bail!("{} already exists", CONFIG_FILE_NAME);
    }

    fs::write(config_path, config::default_config_json()?)?;
    println!("{} Created {}.", SUCCESS_MARK.green(), CONFIG_FILE_NAME);
    Ok(ExitStatus::Success)
}

fn list(args: ListArgs) -> Result<ExitStatus> {
    let workspace = open_workspace()?;
    let query = ListQuery {
        search: args.search,
        group: args.group,
        limit: args.limit,
        offset: args.offset,
        allowed_groups: visible_groups(&workspace)?,
    };
    let total = workspace.store.count(&query)?;
    let rows = workspace.store.list(&query)?;

    for row in &rows {
        let group_tag = format!("[{}]", row.group);
        println!("{}  {}", row.key.bold(), group_tag.dimmed());
        for (site_id, value) in &row.values {
            let site_tag = site_id.to_string();
            println!("    {}: {}", site_tag.blue(), value);
        }
    }
    println!("{} {} of {} key(s)", SUCCESS_MARK.green(), rows.len(), total);
    Ok(ExitStatus::Success)
}

fn set(args: SetArgs) -> Result<ExitStatus> {
    let mut workspace = open_workspace()?;
    let mut item = SaveItem::new(args.key).with_value(args.site_id, args.value);
    if let Some(group) = args.group {
        item = item.with_group(group);
    }

    let report = workspace.store.save(&[item])?;
    if report.skipped > 0 {
        println!("{} {}", FAILURE_MARK.red(), "Key must not be blank.".red());
        return Ok(ExitStatus::Failure);
    }
    println!(
        "{} {} key(s) created, {} updated.",
        SUCCESS_MARK.green(),
        report.created,
        report.updated
    );
    Ok(ExitStatus::Success)
}

fn rm(args: RmArgs) -> Result<ExitStatus> {
    let mut workspace = open_workspace()?;
    let key = args.key.trim();
    match workspace.store.find_key(key)? {
        Some((id, _)) => {
            workspace.store.delete_by_id(id)?;
            println!("{} Deleted \"{}\".", SUCCESS_MARK.green(), key);
            Ok(ExitStatus::Success)
        }
        None => {
            println!("{} No such key: \"{}\"", FAILURE_MARK.red(), key);
            Ok(ExitStatus::Failure)
        }
    }
}

fn groups(cmd: GroupsCommand) -> Result<ExitStatus> {
    let mut workspace = open_workspace()?;
    match cmd.action.unwrap_or(GroupsAction::List) {
        GroupsAction::List => {
            for name in workspace.store.groups()? {
                let count = workspace.store.count(&ListQuery::for_group(name.clone()))?;
                let count_tag = format!("{} key(s)", count);
                println!("{}  {}", name.bold(), count_tag.dimmed());
            }
            Ok(ExitStatus::Success)
        }
        GroupsAction::Rename { old, new } => match workspace.store.rename_group(&old, &new) {
            Ok(()) => {
                println!(
                    "{} Renamed \"{}\" to \"{}\".",
                    SUCCESS_MARK.green(),
                    old,
                    new
                );
                Ok(ExitStatus::Success)
            }
            Err(err @ (Error::NotFound(_) | Error::Validation(_))) => {
                println!("{} {}", FAILURE_MARK.red(), err.to_string().red());
                Ok(ExitStatus::Failure)
            }
            Err(err) => Err(err.into()),
        },
        GroupsAction::Delete { name } => match workspace.store.delete_group(&name) {
            Ok(reassigned) => {
                println!(
                    "{} Deleted \"{}\"; {} key(s) moved to \"site\".",
                    SUCCESS_MARK.green(),
                    name,
                    reassigned
                );
                Ok(ExitStatus::Success)
            }
            Err(err @ (Error::NotFound(_) | Error::Validation(_))) => {
                println!("{} {}", FAILURE_MARK.red(), err.to_string().red());
                Ok(ExitStatus::Failure)
            }
            Err(err) => Err(err.into()),
        },
    }
}

fn scan_templates(args: ScanArgs) -> Result<ExitStatus> {
    let mut workspace = open_workspace()?;
    let report = scan::scan(&mut workspace.store, &workspace.root, &workspace.config, &args.group)?;
    println!(
        "{} Scanned {} directories, {} files: {} match(es), {} distinct key(s), {} added.",
        SUCCESS_MARK.green(),
        report.directories,
        report.files,
        report.matches,
        report.distinct,
        report.added
    );
    Ok(ExitStatus::Success)
}

fn clean(args: CleanArgs) -> Result<ExitStatus> {
    let mut workspace = open_workspace()?;
    let scope = match (args.group, visible_groups(&workspace)?) {
        (Some(group), _) => KeyScope::Group(group),
        (None, Some(allowed)) => KeyScope::Allowed(allowed),
        (None, None) => KeyScope::All,
    };

    let report = if args.apply {
        audit::delete_unused(&mut workspace.store, &workspace.root, &workspace.config, &scope)?
    } else {
        audit::preview_unused(&workspace.store, &workspace.root, &workspace.config, &scope)?
    };

    if report.candidates.is_empty() {
        println!("{} {}", SUCCESS_MARK.green(), "No unused keys found.".green());
        return Ok(ExitStatus::Success);
    }

    for candidate in &report.candidates {
        let group_tag = format!("[{}]", candidate.group);
        println!("  {} {}  {}", "-".dimmed(), candidate.key, group_tag.dimmed());
    }

    if args.apply {
        println!(
            "{} {} unused key(s), {} file(s) scanned.",
            "Deleted".green().bold(),
            report.deleted,
            report.files_scanned
        );
    } else {
        println!(
            "{} {} unused key(s), {} file(s) scanned.",
            "Would delete".yellow().bold(),
            report.candidates.len(),
            report.files_scanned
        );
        println!("Run with {} to delete these keys.", "--apply".cyan());
    }
    Ok(ExitStatus::Success)
}

fn export(args: ExportArgs) -> Result<ExitStatus> {
    let workspace = open_workspace()?;
    let entries = exchange::dump(&workspace.store, &workspace.config.sites)?;

    match args.format {
        ExchangeFormat::Csv => {
            let languages = sites::languages_of(&workspace.config.sites);
            let file = fs::File::create(&args.path)?;
            exchange::csv::write(file, &entries, &languages)?;
        }
        ExchangeFormat::Json => {
            let file = fs::File::create(&args.path)?;
            exchange::json::write(file, &entries)?;
        }
        ExchangeFormat::Archive => {
            exchange::archive::write_tree(&args.path, &entries)?;
        }
    }

    println!(
        "{} Exported {} key(s) to {}.",
        SUCCESS_MARK.green(),
        entries.len(),
        args.path.display()
    );
    Ok(ExitStatus::Success)
}

fn import(args: ImportArgs) -> Result<ExitStatus> {
    let mut workspace = open_workspace()?;
    let report = match args.format {
        ExchangeFormat::Csv => {
            let file = fs::File::open(&args.path)?;
            let entries = exchange::csv::read(file)?;
            exchange::import(&mut workspace.store, &workspace.config.sites, &entries, false)?
        }
        ExchangeFormat::Json => {
            let file = fs::File::open(&args.path)?;
            let entries = exchange::json::read(file)?;
            exchange::import(&mut workspace.store, &workspace.config.sites, &entries, false)?
        }
        ExchangeFormat::Archive => {
            exchange::import_archive(&mut workspace.store, &workspace.config.sites, &args.path)?
        }
    };

    println!(
        "{} Imported {} entries: {} created, {} updated.",
        SUCCESS_MARK.green(),
        report.entries,
        report.created,
        report.updated
    );
    if report.dropped_languages > 0 {
        println!(
            "{} {} value(s) dropped: language matches no configured site.",
            "warning:".bold().yellow(),
            report.dropped_languages
        );
    }
    Ok(ExitStatus::Success)
}

fn translate_missing(args: TranslateArgs) -> Result<ExitStatus> {
    let mut workspace = open_workspace()?;
    let api_key = env::var(&workspace.config.google_api_key_env).with_context(|| {
        format!(
            "Set {} to your Google Translate API key.",
            workspace.config.google_api_key_env
        )
    })?;
    let provider = GoogleTranslator::new(api_key);
    let format = if args.html {
        TextFormat::Html
    } else {
        TextFormat::Plain
    };

    let summary = translate::translate_missing(
        &mut workspace.store,
        &workspace.config.sites,
        args.source_site,
        args.target_site,
        &provider,
        format,
        &workspace.config.language_map,
    )?;

    if summary.candidates == 0 {
        println!("{} Nothing to translate.", SUCCESS_MARK.green());
    } else {
        println!(
            "{} Translated {} value(s) onto {} site(s).",
            SUCCESS_MARK.green(),
            summary.candidates,
            summary.sites_written
        );
    }
    Ok(ExitStatus::Success)
}
