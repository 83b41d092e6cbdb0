//! Session listing.

use storyloom::{SessionStore, StoryloomConfig, StoryloomResult};

/// Print every saved session with the stage it would resume at.
pub fn list_sessions(config: &StoryloomConfig) -> StoryloomResult<()> {
    let store = SessionStore::new(&config.sessions.base_dir);
    let sessions = store.list()?;

    if sessions.is_empty() {
        println!("No sessions in {}", store.base_dir().display());
        return Ok(());
    }

    for session in sessions {
        match store.load(session.name()) {
            Ok(context) => println!("{}  next: {}", session.name(), context.next_stage()),
            Err(e) => {
                tracing::warn!(session = %session.name(), error = %e, "Unreadable session");
                println!("{}  (unreadable)", session.name());
            }
        }
    }
    Ok(())
}
