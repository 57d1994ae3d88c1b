use std::path::Path;

use bees_state::{Hive, HiveStore};

pub fn status(project_dir: &Path, format: &str) -> anyhow::Result<()> {
    let store = HiveStore::open(project_dir);
    let hive = store.load()?;
    println!("{}", render_status(hive.as_ref(), format)?);
    Ok(())
}

pub fn forget(project_dir: &Path) -> anyhow::Result<()> {
    let store = HiveStore::open(project_dir);
    // Never clear the record out from under a running activation.
    let _lock = store.lock()?;
    if store.clear()? {
        println!("✓ Forgot hive record {}", store.path().display());
    } else {
        println!("No hive record in {}", project_dir.display());
    }
    Ok(())
}

fn render_status(hive: Option<&Hive>, format: &str) -> anyhow::Result<String> {
    match (hive, format) {
        (_, "json") => Ok(serde_json::to_string_pretty(&hive)?),
        (None, _) => Ok("No active hive".to_string()),
        (Some(hive), _) => {
            let mut out = format!(
                "Active hive: {} bees in {}\n  User: {}\n  Reservation: {}",
                hive.size(),
                hive.zone,
                hive.username,
                hive.reservation_id.as_deref().unwrap_or("-"),
            );
            for id in &hive.bees_ids {
                out.push_str(&format!("\n  {id}"));
            }
            Ok(out)
        }
    }
}
