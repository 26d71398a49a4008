//! Small SQLite sample: five gameweek rows and the names they belong to.

use std::path::Path;

use rusqlite::{Connection, params};
use tracing::debug;

use crate::error::{Result, StatsError};

pub const DEFAULT_LOOKUP_ID: u32 = 19;

/// (row id, player id, minutes, goals scored, assists, total points)
const SAMPLE_DATA: [(u32, u32, u32, u32, u32, i32); 5] = [
    (0, 58, 90, 0, 0, 1),
    (1, 19, 18, 0, 0, 1),
    (2, 30, 90, 0, 0, 1),
    (3, 70, 64, 0, 0, 2),
    (4, 115, 14, 0, 0, 1),
];

const SAMPLE_NAMES: [(u32, &str, &str); 5] = [
    (58, "Steven", "Cook"),
    (19, "Lucas", "Torriera"),
    (30, "Anwar", "El Ghazi"),
    (70, "Lys", "Mousset"),
    (115, "Ruben", "Loftus-Cheek"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerPoints {
    pub id: u32,
    pub first_name: String,
    pub last_name: String,
    pub total_points: i32,
}

pub fn open_db(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|err| StatsError::io(parent, err))?;
    }
    Ok(Connection::open(path)?)
}

/// Drops and recreates both tables.
pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        DROP TABLE IF EXISTS "player_data";
        CREATE TABLE "player_data" (
            id INT PRIMARY KEY NOT NULL,
            player_id INT NOT NULL,
            minutes INT NOT NULL,
            goals_scored INT NOT NULL,
            assists INT NOT NULL,
            total_points INT NOT NULL
        );
        DROP TABLE IF EXISTS "player_name";
        CREATE TABLE "player_name" (
            id INT NOT NULL PRIMARY KEY UNIQUE,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

pub fn seed_sample(conn: &mut Connection) -> Result<()> {
    let tx = conn.transaction()?;
    {
        let mut insert_data = tx.prepare(
            "INSERT INTO player_data(id, player_id, minutes, goals_scored, assists, total_points)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )?;
        for (id, player_id, minutes, goals, assists, points) in SAMPLE_DATA {
            insert_data.execute(params![id, player_id, minutes, goals, assists, points])?;
        }

        let mut insert_name =
            tx.prepare("INSERT INTO player_name(id, first_name, last_name) VALUES (?1, ?2, ?3)")?;
        for (id, first, last) in SAMPLE_NAMES {
            insert_name.execute(params![id, first, last])?;
        }
    }
    tx.commit()?;
    debug!("seeded {} sample rows", SAMPLE_DATA.len());
    Ok(())
}

pub fn lookup_player(conn: &Connection, player_id: u32) -> Result<Vec<PlayerPoints>> {
    let mut stmt = conn.prepare(
        "SELECT n.id, first_name, last_name, total_points
         FROM player_data d JOIN player_name n ON n.id = d.player_id
         WHERE n.id = ?1",
    )?;
    let rows = stmt
        .query_map(params![player_id], |row| {
            Ok(PlayerPoints {
                id: row.get(0)?,
                first_name: row.get(1)?,
                last_name: row.get(2)?,
                total_points: row.get(3)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

/// Recreates the sample database at `path` and runs the lookup once.
pub fn rebuild_and_lookup(path: &Path, player_id: u32) -> Result<Vec<PlayerPoints>> {
    let mut conn = open_db(path)?;
    init_schema(&conn)?;
    seed_sample(&mut conn)?;
    lookup_player(&conn, player_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_joins_sample_rows() {
        let mut conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        seed_sample(&mut conn).unwrap();
        let rows = lookup_player(&conn, DEFAULT_LOOKUP_ID).unwrap();
        assert_eq!(
            rows,
            vec![PlayerPoints {
                id: 19,
                first_name: "Lucas".to_string(),
                last_name: "Torriera".to_string(),
                total_points: 1,
            }]
        );
    }

    #[test]
    fn reseeding_is_idempotent() {
        let mut conn = Connection::open_in_memory().unwrap();
        for _ in 0..2 {
            init_schema(&conn).unwrap();
            seed_sample(&mut conn).unwrap();
        }
        assert_eq!(lookup_player(&conn, 70).unwrap()[0].total_points, 2);
        assert!(lookup_player(&conn, 1).unwrap().is_empty());
    }
}
