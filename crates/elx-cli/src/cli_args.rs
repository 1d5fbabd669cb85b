use clap::{Parser, ValueEnum};
use elx_core::EntryOrder;

#[derive(Debug, Parser)]
#[command(name = "elixir")]
#[command(about = "Compile folders, Lua scripts and models into one .rbxmx model")]
pub(crate) struct Cli {
    /// Directory to compile.
    pub(crate) source: Option<String>,
    /// Model file to write.
    pub(crate) dest: Option<String>,
    /// Name of the top-level folder (default: name of the source directory).
    #[arg(short = 'm', long = "model-name")]
    pub(crate) model_name: Option<String>,
    #[arg(short = 'p', long = "processor")]
    pub(crate) processor: Option<String>,
    #[arg(long = "entry-order", value_enum)]
    pub(crate) entry_order: Option<EntryOrderArg>,
    /// Add referent ids to compiled items.
    #[arg(long = "referents")]
    pub(crate) referents: bool,
    /// JSON build manifest; command-line values take precedence.
    #[arg(long = "manifest")]
    pub(crate) manifest: Option<String>,
    #[arg(short = 'v', long = "verbose")]
    pub(crate) verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum EntryOrderArg {
    Lexical,
    Filesystem,
}

impl From<EntryOrderArg> for EntryOrder {
    fn from(value: EntryOrderArg) -> Self {
        match value {
            EntryOrderArg::Lexical => EntryOrder::Lexical,
            EntryOrderArg::Filesystem => EntryOrder::Filesystem,
        }
    }
}
