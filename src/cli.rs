use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "blockgen-rs",
    about = "Generate Python source from a Mind+ block program (learn extension blocks)."
)]
pub struct Args {
    #[arg(value_name = "INPUT", required_unless_present = "list_blocks")]
    pub input: Option<PathBuf>,

    #[arg(value_name = "OUTPUT", help = "Write generated Python here instead of stdout.")]
    pub output: Option<PathBuf>,

    #[arg(
        long = "blocks",
        value_name = "FILE",
        help = "Load extra block definitions from a JSON block table (repeatable)."
    )]
    pub block_tables: Vec<PathBuf>,

    #[arg(long, help = "Omit the Mind+ coding/MindPlus preamble.")]
    pub no_header: bool,

    #[arg(long, help = "Run `python -m py_compile` on the generated source.")]
    pub check: bool,

    #[arg(
        long,
        value_name = "EXE",
        default_value = "python",
        help = "Python interpreter used by --check."
    )]
    pub python: String,

    #[arg(long, help = "Print every registered block with its call template and exit.")]
    pub list_blocks: bool,
}
