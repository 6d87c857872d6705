use anyhow::Context;
use clap::Parser;
use std::net::IpAddr;
use std::path::{Path, PathBuf};

/// Destination subdirectory for save-copies, created under the media root on
/// first use.
pub const SAVED_DIR: &str = "Saved";

#[derive(Parser, Debug)]
#[command(name = "mediadeck", about = "HTTP manager for a generated-media output directory")]
pub struct Args {
    #[arg(
        short = 'm',
        long,
        env = "MEDIA_FOLDER",
        help = "Media root directory (defaults to the ComfyUI output dir)"
    )]
    pub media_folder: Option<PathBuf>,

    #[arg(
        long,
        env = "MEDIA_LIST_RECURSIVE",
        help = "List media files at every depth instead of direct children only"
    )]
    pub recursive: bool,

    #[arg(
        short = 'b',
        long,
        env = "MEDIA_HOST",
        default_value = "0.0.0.0",
        help = "Bind address"
    )]
    pub host: IpAddr,

    #[arg(
        short = 'p',
        long,
        env = "MEDIA_PORT",
        default_value_t = 8000,
        help = "HTTP port"
    )]
    pub port: u16,
}

/// Immutable for the process lifetime; handlers receive it behind an `Arc`.
#[derive(Debug, Clone)]
pub struct Config {
    pub root: PathBuf,
    pub recursive: bool,
}

impl Config {
    /// The canonical root is the confinement baseline for every operation.
    pub fn new(root: impl AsRef<Path>, recursive: bool) -> std::io::Result<Self> {
        Ok(Self {
            root: root.as_ref().canonicalize()?,
            recursive,
        })
    }

    pub fn from_args(args: &Args) -> anyhow::Result<Self> {
        let root = match &args.media_folder {
            Some(dir) => dir.clone(),
            None => default_media_folder()
                .context("could not resolve a home directory for the default media folder")?,
        };
        Self::new(&root, args.recursive)
            .with_context(|| format!("media folder is not accessible: {}", root.display()))
    }

    pub fn saved_dir(&self) -> PathBuf {
        self.root.join(SAVED_DIR)
    }
}

fn default_media_folder() -> Option<PathBuf> {
    let dirs = directories::BaseDirs::new()?;
    Some(dirs.data_dir().join("ComfyUI").join("output"))
}
