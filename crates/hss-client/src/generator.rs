//! Driving the HSS payload generator.
//!
//! The generator is a vendor executable shipped either unpacked under a
//! `binaries/` directory or as a zip blob. It turns a YAML description into
//! the payload image that `flash-payload` writes.

use std::fs::File;
use std::path::{Path, PathBuf};

use hss_core::error::{HssError, HssResult};
use tokio::process::Command;
use tracing::{debug, info};

/// Default location of the zipped generator, relative to the west manifest
/// repository.
pub const DEFAULT_ARCHIVE: &str = "zephyr/blobs/payload-generator/hss-payload-generator.zip";

/// File name of the generator on this platform.
pub fn executable_name() -> &'static str {
    if cfg!(windows) {
        "hss-payload-generator.exe"
    } else {
        "hss-payload-generator"
    }
}

/// Resolve the YAML config relative to `base` and make sure it exists.
pub fn verify_config(base: &Path, config: &Path) -> HssResult<PathBuf> {
    let full = base.join(config);
    if !full.is_file() {
        return Err(HssError::Generator(format!(
            "{} is not a valid path to a config file\n\
             Hint: make sure you invoke generate-payload from the zephyr workspace directory (i.e. zephyrproject/)",
            full.display()
        )));
    }
    info!(path = %full.display(), "found configuration file");
    Ok(full)
}

/// First `**/binaries/<generator>` below `base`.
pub fn find_in_tree(base: &Path) -> Option<PathBuf> {
    let pattern = format!(
        "{}/**/binaries/{}",
        glob::Pattern::escape(&base.to_string_lossy()),
        executable_name()
    );
    glob::glob(&pattern)
        .ok()?
        .filter_map(Result::ok)
        .find(|p| p.is_file())
}

/// Path of the manifest repository recorded in `<base>/.west/config`.
pub fn manifest_repo_path(base: &Path) -> Option<PathBuf> {
    let config = std::fs::read_to_string(base.join(".west").join("config")).ok()?;
    let mut in_manifest = false;
    for line in config.lines().map(str::trim) {
        if line.starts_with('[') {
            in_manifest = line == "[manifest]";
            continue;
        }
        if !in_manifest {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            if key.trim() == "path" {
                return Some(PathBuf::from(value.trim()));
            }
        }
    }
    None
}

/// Where `archive` lives below `base`: inside the manifest repository when
/// `base` is a west workspace, directly below `base` otherwise.
pub fn resolve_archive(base: &Path, archive: &Path) -> PathBuf {
    match manifest_repo_path(base) {
        Some(repo) => base.join(repo).join(archive),
        None => base.join(archive),
    }
}

/// Extract the generator archive into `dest`.
pub fn unzip_generator(archive: &Path, dest: &Path) -> HssResult<()> {
    if !archive.is_file() {
        return Err(HssError::Generator(format!(
            "cannot find {}\n\
             Hint: make sure you have fetched it using 'west blobs fetch' (after 'west update') \
             and that you are executing this command from the zephyr workspace",
            archive.display()
        )));
    }

    info!(archive = %archive.display(), "unzipping payload generator");
    let file = File::open(archive)?;
    let mut zip = zip::ZipArchive::new(file)
        .map_err(|e| HssError::Generator(format!("bad archive {}: {e}", archive.display())))?;
    zip.extract(dest)
        .map_err(|e| HssError::Generator(format!("cannot extract {}: {e}", archive.display())))?;
    Ok(())
}

/// Find the generator under `base`, then on `PATH`, then by unpacking
/// `archive` into `base`. The result is made executable.
pub fn locate_generator(base: &Path, archive: &Path) -> HssResult<PathBuf> {
    let found = match find_in_tree(base).or_else(|| which::which(executable_name()).ok()) {
        Some(path) => path,
        None => {
            debug!("payload generator not found, trying the archive");
            unzip_generator(&resolve_archive(base, archive), base)?;
            find_in_tree(base).ok_or_else(|| {
                HssError::Generator(format!(
                    "{} did not contain binaries/{}",
                    archive.display(),
                    executable_name()
                ))
            })?
        }
    };

    make_executable(&found)?;
    info!(path = %found.display(), "found payload generator executable");
    Ok(found)
}

/// Adds the execute bits only when none are set, so a generator we do not
/// own (e.g. on `PATH`) is left alone.
#[cfg(unix)]
fn make_executable(path: &Path) -> HssResult<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut perms = std::fs::metadata(path)?.permissions();
    if perms.mode() & 0o111 != 0 {
        return Ok(());
    }
    perms.set_mode(perms.mode() | 0o755);
    std::fs::set_permissions(path, perms)?;
    Ok(())
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> HssResult<()> {
    Ok(())
}

/// Run `<generator> -vvvwc <config> <payload>`.
pub async fn run_generator(generator: &Path, config: &Path, payload: &Path) -> HssResult<()> {
    info!(generator = %generator.display(), config = %config.display(), payload = %payload.display(), "generating payload");

    let status = Command::new(generator)
        .arg("-vvvwc")
        .arg(config)
        .arg(payload)
        .status()
        .await
        .map_err(|e| HssError::Generator(format!("cannot run {}: {e}", generator.display())))?;

    if !status.success() {
        return Err(HssError::Generator(format!("generator exited with {status}")));
    }
    Ok(())
}
