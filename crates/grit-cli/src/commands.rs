use std::io::{self, Write};
use std::path::Path;

use anyhow::Context;
use colored::Colorize;
use grit_sdk::{ObjectKind, RepoConfig, Repository, TreeEntry};
use grit_store::codec::{decode_payload, split_header};

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    execute(cli, &mut out)?;
    out.flush()?;
    Ok(())
}

fn execute(cli: Cli, out: &mut dyn Write) -> anyhow::Result<()> {
    let dir = cli.dir.as_path();
    match cli.command {
        Command::Init(args) => cmd_init(dir, args, out),
        Command::CatFile(args) => cmd_cat_file(&open(dir)?, args, out),
        Command::HashObject(args) => cmd_hash_object(&open(dir)?, args, out),
        Command::LsTree(args) => cmd_ls_tree(&open(dir)?, args, out),
        Command::WriteTree => {
            let id = open(dir)?.write_tree()?;
            writeln!(out, "{id}")?;
            Ok(())
        }
        Command::CommitTree(args) => cmd_commit_tree(&open(dir)?, args, out),
        Command::Show => cmd_show(&open(dir)?, out),
    }
}

fn open(dir: &Path) -> anyhow::Result<Repository> {
    Ok(Repository::open(dir)?)
}

fn cmd_init(dir: &Path, args: InitArgs, out: &mut dyn Write) -> anyhow::Result<()> {
    let path = match args.path {
        Some(path) => dir.join(path),
        None => dir.to_path_buf(),
    };
    let mut config = RepoConfig::default();
    if let Some(branch) = args.initial_branch {
        config.core.default_branch = branch;
    }
    let repo = Repository::init(&path, &config)
        .with_context(|| format!("cannot initialize repository in {}", path.display()))?;
    writeln!(
        out,
        "{} Initialized empty grit repository in {}",
        "✓".green().bold(),
        repo.git_dir().display().to_string().bold()
    )?;
    Ok(())
}

fn cmd_cat_file(repo: &Repository, args: CatFileArgs, out: &mut dyn Write) -> anyhow::Result<()> {
    if args.kind || args.size {
        let (kind, size) = repo.object_header(&args.object)?;
        if args.kind {
            writeln!(out, "{kind}")?;
        } else {
            writeln!(out, "{size}")?;
        }
        return Ok(());
    }

    let (kind, payload) = repo.read_payload(&args.object)?;
    match kind {
        ObjectKind::Tree => {
            let tree = decode_payload(kind, &payload)?.into_tree()?;
            for entry in &tree.entries {
                writeln!(out, "{}", format_entry(entry))?;
            }
        }
        ObjectKind::Blob | ObjectKind::Commit => out.write_all(&payload)?,
    }
    Ok(())
}

fn cmd_hash_object(
    repo: &Repository,
    args: HashObjectArgs,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    let id = repo.hash_object(&args.path, args.write)?;
    writeln!(out, "{id}")?;
    Ok(())
}

fn cmd_ls_tree(repo: &Repository, args: LsTreeArgs, out: &mut dyn Write) -> anyhow::Result<()> {
    let tree = repo.ls_tree(&args.tree)?;
    for entry in &tree.entries {
        if args.name_only {
            writeln!(out, "{}", entry.name)?;
        } else {
            writeln!(out, "{}", format_entry(entry))?;
        }
    }
    Ok(())
}

fn cmd_commit_tree(
    repo: &Repository,
    args: CommitTreeArgs,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    let id = repo.commit_tree(&args.tree, args.parent.as_deref(), &args.message)?;
    writeln!(out, "{id}")?;
    Ok(())
}

fn cmd_show(repo: &Repository, out: &mut dyn Write) -> anyhow::Result<()> {
    let bytes = repo.show()?;
    let (_, payload) = split_header(&bytes)?;
    out.write_all(payload)?;
    if !payload.ends_with(b"\n") {
        writeln!(out)?;
    }
    Ok(())
}

/// `<mode> <type> <id>\t<name>`, as `git ls-tree` prints it.
fn format_entry(entry: &TreeEntry) -> String {
    format!(
        "{} {} {}\t{}",
        entry.mode,
        entry.mode.object_kind(),
        entry.object_id,
        entry.name
    )
}
