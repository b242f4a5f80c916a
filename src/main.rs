use std::{error::Error, path::PathBuf, process};

use clap::Parser;
use log::error;

use odooup::{
    cli::{
        args::{CliArgs, Command},
        command_handlers::{do_add, do_clear_cache, do_clone},
    },
    clone::{CloneError, CloneOptions, Placement},
    config::OdooupConfig,
    Odooup,
};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        error!("{}", e);
        process::exit(exit_code(e.as_ref()));
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let cli_args: CliArgs = CliArgs::parse();
    let config = OdooupConfig::load()?;

    let mut builder = Odooup::builder();
    if let Some(path) = cli_args
        .cache_directory
        .map(PathBuf::from)
        .or(config.cache_dir)
    {
        builder = builder.cache_directory(path);
    }
    if let Some(path) = cli_args
        .workspace_directory
        .map(PathBuf::from)
        .or(config.workspace_dir)
    {
        builder = builder.workspace_directory(path);
    }
    if let Some(path) = config.vendor_dir {
        builder = builder.vendor_directory(path);
    }
    let odooup = builder.try_build()?;

    match cli_args.cmd {
        Command::Clone {
            branch,
            url,
            whitelist,
            dissociate,
            shared,
            vendor,
            strict,
        } => {
            let options = CloneOptions {
                whitelist,
                dissociate,
                shared,
                placement: if vendor {
                    Placement::Vendor
                } else {
                    Placement::Workspace
                },
            };
            do_clone(&odooup, &branch, &url, &options, strict)
        }
        Command::Add { branch, urls } => do_add(&odooup, &branch, &urls),
        Command::ClearCache => do_clear_cache(&odooup),
    }
}

/// A failed clone exits with git's own status.
fn exit_code(error: &(dyn Error + 'static)) -> i32 {
    error
        .downcast_ref::<CloneError>()
        .map_or(1, CloneError::exit_code)
}
