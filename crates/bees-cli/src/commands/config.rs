use std::path::Path;

use anyhow::bail;

use bees_core::{ConfigStore, home_dir};
use bees_core::inspect::{DumpOptions, debug_dump};

pub fn init(project_dir: &Path, force: bool) -> anyhow::Result<()> {
    let store = ConfigStore::open(project_dir)?;
    if store.path().exists() && !force {
        bail!("{} already exists (use --force to rewrite it)", store.path().display());
    }
    store.save_config()?;
    println!("✓ Generated {}", store.path().display());
    Ok(())
}

pub fn show(project_dir: &Path) -> anyhow::Result<()> {
    let store = ConfigStore::open(project_dir)?;
    println!("{}", render(&store));
    Ok(())
}

fn render(store: &ConfigStore) -> String {
    let config = store.config();
    let mut out = String::new();

    if let Err(e) = config.validate() {
        out.push_str(&format!("warning: {e}\n"));
    }
    out.push_str(&format!("Region:   {}\n", config.region()));
    out.push_str(&format!("Key name: {}\n", config.key_name()));
    match store.key_path() {
        Some(path) => out.push_str(&format!("Key path: {}\n", path.display())),
        None => out.push_str("Key path: (not found)\n"),
    }

    // Mask the home directory in dumped values.
    let options = DumpOptions {
        hide: home_dir().map(|home| home.display().to_string()),
        ..Default::default()
    };
    out.push_str(&debug_dump("beesconfig", config, &options));
    out
}
