use std::path::PathBuf;

use clap::{ArgGroup, Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "grit",
    about = "grit: a minimal git-compatible object store",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Run as if started in DIR
    #[arg(short = 'C', global = true, value_name = "DIR", default_value = ".")]
    pub dir: PathBuf,

    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create an empty repository
    Init(InitArgs),
    /// Print an object's content, type, or size
    CatFile(CatFileArgs),
    /// Compute a file's blob id, optionally storing it
    HashObject(HashObjectArgs),
    /// List the entries of a tree
    LsTree(LsTreeArgs),
    /// Snapshot the working directory as a tree
    WriteTree,
    /// Create a commit from a tree
    CommitTree(CommitTreeArgs),
    /// Print the commit HEAD points to
    Show,
}

#[derive(Args)]
pub struct InitArgs {
    pub path: Option<PathBuf>,
    /// Branch HEAD names in the new repository
    #[arg(short = 'b', long = "initial-branch")]
    pub initial_branch: Option<String>,
}

#[derive(Args)]
#[command(group(ArgGroup::new("mode").required(true).args(["pretty", "kind", "size"])))]
pub struct CatFileArgs {
    /// Pretty-print the object's content
    #[arg(short = 'p')]
    pub pretty: bool,
    /// Show the object's type
    #[arg(short = 't')]
    pub kind: bool,
    /// Show the object's size
    #[arg(short = 's')]
    pub size: bool,
    pub object: String,
}

#[derive(Args)]
pub struct HashObjectArgs {
    /// Write the object into the store
    #[arg(short = 'w')]
    pub write: bool,
    pub path: PathBuf,
}

#[derive(Args)]
pub struct LsTreeArgs {
    /// List only entry names
    #[arg(long)]
    pub name_only: bool,
    pub tree: String,
}

#[derive(Args)]
pub struct CommitTreeArgs {
    pub tree: String,
    #[arg(short = 'p')]
    pub parent: Option<String>,
    #[arg(short = 'm')]
    pub message: String,
}
