//! Clear command for deleting an account's session history.

use std::io::Write;

use anyhow::{Result, bail};
use pomo_core::{SessionLog, User};

pub fn run<W, L>(writer: &mut W, log: &mut L, user: &User, confirmed: bool) -> Result<usize>
where
    W: Write,
    L: SessionLog + ?Sized,
{
    if !confirmed {
        bail!("refusing to delete session history without --yes");
    }

    let removed = log.delete_all_records_for_owner(&user.id)?;
    tracing::info!(user = %user.username, removed, "cleared session history");
    writeln!(writer, "Deleted {removed} session(s) for {}.", user.username)?;
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use pomo_core::{Category, MemoryLog, NewSessionRecord, SessionSummary, UserId};

    use super::*;

    fn user(name: &str) -> User {
        User {
            id: UserId::new(format!("user-{name}")).unwrap(),
            username: name.to_string(),
        }
    }

    fn add(log: &mut MemoryLog, owner: &User) {
        log.insert_session_record(&NewSessionRecord {
            owner_id: owner.id.clone(),
            date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            summary: SessionSummary {
                category: Category::Study,
                duration_seconds: 1500,
                distraction_count: 0,
            },
        })
        .unwrap();
    }

    #[test]
    fn requires_confirmation() {
        let ana = user("ana");
        let mut log = MemoryLog::new();
        add(&mut log, &ana);

        let err = run(&mut Vec::new(), &mut log, &ana, false).unwrap_err();
        assert!(err.to_string().contains("--yes"));
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn deletes_only_the_owners_records() {
        let ana = user("ana");
        let ben = user("ben");
        let mut log = MemoryLog::new();
        add(&mut log, &ana);
        add(&mut log, &ana);
        add(&mut log, &ben);

        let mut output = Vec::new();
        let removed = run(&mut output, &mut log, &ana, true).unwrap();

        assert_eq!(removed, 2);
        assert_eq!(log.len(), 1);
        assert!(log.list_records_for_owner(&ana.id).unwrap().is_empty());
        assert_eq!(
            String::from_utf8(output).unwrap(),
            "Deleted 2 session(s) for ana.\n"
        );
    }
}
