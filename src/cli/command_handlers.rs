use std::error::Error;

use log::{error, info, warn};

use crate::{clone::CloneOptions, model::Branch, Odooup};

/// Handler to clone command
pub fn do_clone(
    odooup: &Odooup,
    branch: &Branch,
    url: &str,
    options: &CloneOptions,
    strict: bool,
) -> Result<(), Box<dyn Error>> {
    let report = odooup.clone_repository(branch, url, options)?;

    let summary = &report.submodules;
    if !summary.is_complete() {
        let names: Vec<&str> = summary.failed.iter().map(|f| f.name.as_str()).collect();
        let message = format!(
            "{} of {} submodules could not be updated: {}",
            summary.failed.len(),
            summary.failed.len() + summary.updated.len(),
            names.join(", ")
        );
        if strict {
            return Err(message.into());
        }
        warn!("{}", message);
    }

    info!("Cloned {} into {}", url, report.target.display());
    Ok(())
}

/// Handler to add command
/// Failures are logged and do not prevent the remaining urls from being added
pub fn do_add(odooup: &Odooup, branch: &Branch, urls: &[String]) -> Result<(), Box<dyn Error>> {
    let results = odooup.add_submodules(branch, urls);
    let mut added = 0;
    for result in &results {
        match result {
            Ok(path) => {
                info!("Added submodule {}", path.display());
                added += 1;
            }
            Err(failure) => error!("{}", failure),
        }
    }
    info!("Added {} of {} submodules", added, results.len());
    Ok(())
}

pub fn do_clear_cache(odooup: &Odooup) -> Result<(), Box<dyn Error>> {
    odooup.clear_cache()?;
    Ok(())
}
