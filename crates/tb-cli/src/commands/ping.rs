//! Activity heartbeat, meant to be wired to editor/window-focus hooks.

use anyhow::Result;
use chrono::Utc;

use tb_store::DataDir;

pub fn run(dir: &DataDir) -> Result<()> {
    let tracker = dir.tracker();
    if tracker.update_activity(Utc::now())? {
        tracing::debug!("activity recorded");
    } else {
        tracing::debug!("no active session, ping ignored");
    }
    Ok(())
}
