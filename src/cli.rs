use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "takein")]
#[command(version)]
#[command(about = "Validate and unpack a batch of Takeout zip exports", long_about = None)]
#[command(after_help = "Examples:\n  \
  takein ~/Drive/Takeout /backup/takeout     unpack the waiting batch\n\n\
The batch is validated first: all zip parts must share one timestamp\n\
token and the part numbers must be contiguous. Source files are deleted\n\
only after the whole batch has been unpacked.")]
pub struct Cli {
    /// Directory that receives Takeout zip parts
    #[arg(value_name = "SRC_DIR")]
    pub src_dir: PathBuf,

    /// Root directory to unpack batches into
    #[arg(value_name = "DEST_ROOT")]
    pub dest_root: PathBuf,
}
