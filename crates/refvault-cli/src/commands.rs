use std::path::Path;

use anyhow::{bail, Context};
use colored::Colorize;
use refvault_backup::{BackupConfig, BackupStore};
use refvault_store::{Level, Reference, ReferenceStore};
use serde_json::Value;

use crate::cli::*;

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    match &cli.command {
        Command::Init(args) => cmd_init(open(&cli, args)?).await,
        Command::Show(args) => {
            cmd_show(open(&cli, &args.target)?, args.kind.as_deref(), &cli.format).await
        }
        Command::Add(args) => cmd_add(open(&cli, &args.target)?, args).await,
        Command::Resave(args) => cmd_resave(open(&cli, args)?).await,
        Command::Status(args) => cmd_status(open(&cli, args)?).await,
    }
}

/// Resolve the config once: TOML file first, then flags on top.
fn resolve_config(cli: &Cli, target: &FileArgs) -> anyhow::Result<BackupConfig> {
    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => match &target.file {
            Some(file) => BackupConfig::new(file.clone()),
            None => bail!("no document given; pass a file name or --config"),
        },
    };
    if let Some(file) = &target.file {
        config.file_name = file.clone();
    }
    if let Some(dir) = &cli.dir {
        config.base_dir = dir.clone();
    }
    if let Some(depth) = cli.depth {
        config.depth = depth;
    }
    if let Some(backup_dir) = &cli.backup_dir {
        config.backup_dir = backup_dir.clone();
    }
    Ok(config)
}

fn load_config(path: &Path) -> anyhow::Result<BackupConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    Ok(BackupConfig::from_toml_str(&text)?)
}

fn open(cli: &Cli, target: &FileArgs) -> anyhow::Result<BackupStore> {
    Ok(BackupStore::new(resolve_config(cli, target)?))
}

async fn cmd_init(backup: BackupStore) -> anyhow::Result<()> {
    backup.create().await?;
    let paths = backup.paths()?;
    println!("{} Created {}", "✓".green().bold(), paths.primary.display().to_string().bold());
    println!("  Backups: {}", paths.latest.display().to_string().cyan());
    Ok(())
}

async fn cmd_show(
    backup: BackupStore,
    kind: Option<&str>,
    format: &OutputFormat,
) -> anyhow::Result<()> {
    let store = backup.read().await?;
    if let OutputFormat::Json = format {
        println!("{}", store.serialize()?);
        return Ok(());
    }

    let references: Vec<&Reference> = match kind {
        Some(kind) => store.get_refs(kind),
        None => store.references().collect(),
    };
    println!("{} references (version {})", references.len().to_string().bold(), store.version());
    for reference in references {
        let payload = Value::Object(reference.payload.clone());
        println!(
            "  {} {} {}",
            reference.id.yellow(),
            reference.kind.cyan(),
            payload.to_string().dimmed()
        );
    }
    print_messages(&store);
    Ok(())
}

async fn cmd_add(backup: BackupStore, args: &AddArgs) -> anyhow::Result<()> {
    let mut store = backup.read().await?;
    let mut reference = Reference::new(args.id.clone(), args.kind.clone());
    if let Some(payload) = &args.payload {
        match serde_json::from_str::<Value>(payload).context("parsing --payload")? {
            Value::Object(fields) => {
                for (key, value) in fields {
                    if key != "id" && key != "type" {
                        reference.payload.insert(key, value);
                    }
                }
            }
            other => bail!("--payload must be a JSON object, got {other}"),
        }
    }
    store.add_ref(reference)?;
    backup.write(&store).await?;
    println!("{} Added {} ({})", "✓".green().bold(), args.id.yellow(), args.kind.cyan());
    Ok(())
}

async fn cmd_resave(backup: BackupStore) -> anyhow::Result<()> {
    let store = backup.read().await?;
    backup.write(&store).await?;
    println!("{} Rewrote {} references", "✓".green().bold(), store.len());
    print_messages(&store);
    Ok(())
}

async fn cmd_status(backup: BackupStore) -> anyhow::Result<()> {
    let paths = backup.paths()?;
    println!("Primary: {}", paths.primary.display().to_string().bold());
    println!("Latest backup: {}", paths.latest.display().to_string().bold());
    for slot in backup.generations().await? {
        let mark = if slot.exists { "✓".green() } else { "-".dimmed() };
        println!("  {} gen {} {}", mark, slot.index, slot.path.display());
    }
    Ok(())
}

fn print_messages(store: &ReferenceStore) {
    if store.messages().is_empty() {
        return;
    }
    println!("\n{} diagnostics:", store.messages().len());
    for message in store.messages() {
        let level = match message.level {
            Level::Warning => "WARNING".yellow(),
            Level::Error => "ERROR".red().bold(),
        };
        let ids = message
            .ref_ids
            .as_ref()
            .map(|ids| format!(" [{}]", ids.join(", ")))
            .unwrap_or_default();
        println!("  {level}{ids} {}", message.message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn flags_override_config_defaults() {
        let cli = Cli::parse_from([
            "refvault", "--dir", "/tmp/x", "--depth", "5", "status", "refs.json",
        ]);
        let Command::Status(args) = &cli.command else { panic!("expected status") };
        let config = resolve_config(&cli, args).unwrap();

        assert_eq!(config, BackupConfig::new("refs.json").with_base_dir("/tmp/x").with_depth(5));
    }

    #[test]
    fn config_file_supplies_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("refvault.toml");
        std::fs::write(&path, "file_name = \"docs.json\"\nbackup_dir = \"old\"\n").unwrap();

        let cli = Cli::parse_from(["refvault", "--config", path.to_str().unwrap(), "init"]);
        let Command::Init(args) = &cli.command else { panic!("expected init") };
        let config = resolve_config(&cli, args).unwrap();

        assert_eq!(config.file_name, "docs.json");
        assert_eq!(config.backup_dir, "old");
    }

    #[test]
    fn missing_file_name_is_an_error() {
        let cli = Cli::parse_from(["refvault", "init"]);
        let Command::Init(args) = &cli.command else { panic!("expected init") };
        assert!(resolve_config(&cli, args).is_err());
    }

    #[tokio::test]
    async fn add_then_show_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().to_str().unwrap();

        let init = Cli::parse_from(["refvault", "--dir", base, "init", "refs.json"]);
        run_command(init).await.unwrap();
        let add = Cli::parse_from([
            "refvault",
            "--dir",
            base,
            "add",
            "refs.json",
            "--id",
            "a",
            "--type",
            "note",
            "--payload",
            r#"{"body":"hi"}"#,
        ]);
        run_command(add).await.unwrap();

        let backup = BackupStore::new(BackupConfig::new("refs.json").with_base_dir(dir.path()));
        let store = backup.read().await.unwrap();
        let reference = store.get_ref("a").unwrap();
        assert_eq!(reference.kind, "note");
        assert_eq!(reference.payload.get("body"), Some(&Value::from("hi")));
    }
}
