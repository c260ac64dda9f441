use chrono::Local;
use rusqlite::{params, Connection, Row};
use crate::db::models::{DataPoint, Experiment, NewDataPoint, NewExperiment, NewSubject, Subject};
use crate::db::schema;
use crate::error::WorkflowError;

/// Database operations for experiments, data points and subjects.
///
/// Every function takes a plain `&Connection`, so it can run directly on a
/// connection or inside an open `rusqlite::Transaction`.
pub struct DbOperations;

fn experiment_from_row(row: &Row<'_>) -> rusqlite::Result<Experiment> {
    Ok(Experiment {
        id: row.get(0)?,
        title: row.get(1)?,
        created_at: row.get(2)?,
        experiment_type: row.get(3)?,
        finished: row.get::<_, Option<bool>>(4)?.unwrap_or(false),
    })
}

fn data_point_from_row(row: &Row<'_>) -> rusqlite::Result<DataPoint> {
    Ok(DataPoint {
        id: row.get(0)?,
        real_value: row.get(1)?,
        target_value: row.get(2)?,
        experiment_id: row.get(3)?,
    })
}

fn subject_from_row(row: &Row<'_>) -> rusqlite::Result<Subject> {
    Ok(Subject {
        id: row.get(0)?,
        gdpr_accepted: row.get::<_, Option<bool>>(1)?.unwrap_or(false),
    })
}

impl DbOperations {
    // ===== Inserts =====

    /// Insert an experiment, stamping `created_at` with the local time
    pub fn insert_experiment(
        conn: &Connection,
        experiment: &NewExperiment,
    ) -> Result<i64, anyhow::Error> {
        let created_at = Local::now().naive_local();

        match experiment.finished {
            Some(finished) => conn.execute(
                "INSERT INTO experiments (title, created_at, type, finished) VALUES (?1, ?2, ?3, ?4)",
                params![experiment.title, created_at, experiment.experiment_type, finished],
            )?,
            None => conn.execute(
                "INSERT INTO experiments (title, created_at, type) VALUES (?1, ?2, ?3)",
                params![experiment.title, created_at, experiment.experiment_type],
            )?,
        };

        let id = conn.last_insert_rowid();
        tracing::debug!(id, title = %experiment.title, "inserted experiment");
        Ok(id)
    }

    /// Insert data points owned by one experiment
    pub fn insert_data_points(
        conn: &Connection,
        experiment_id: i64,
        points: &[NewDataPoint],
    ) -> Result<Vec<i64>, anyhow::Error> {
        let mut stmt = conn.prepare_cached(
            "INSERT INTO data_points (real_value, target_value, experiment_id) VALUES (?1, ?2, ?3)",
        )?;

        let mut ids = Vec::with_capacity(points.len());
        for point in points {
            stmt.execute(params![point.real_value, point.target_value, experiment_id])?;
            ids.push(conn.last_insert_rowid());
        }

        tracing::debug!(experiment_id, count = ids.len(), "inserted data points");
        Ok(ids)
    }

    /// Insert a subject; an unset consent flag falls back to the column default
    pub fn insert_subject(
        conn: &Connection,
        subject: &NewSubject,
    ) -> Result<i64, anyhow::Error> {
        match subject.gdpr_accepted {
            Some(accepted) => conn.execute(
                "INSERT INTO subjects (gdpr_accepted) VALUES (?1)",
                params![accepted],
            )?,
            None => conn.execute("INSERT INTO subjects DEFAULT VALUES", [])?,
        };

        Ok(conn.last_insert_rowid())
    }

    /// Link a subject with an experiment. Each pair may exist only once.
    pub fn link_subject_experiment(
        conn: &Connection,
        subject_id: i64,
        experiment_id: i64,
    ) -> Result<(), anyhow::Error> {
        conn.execute(
            "INSERT INTO subject_experiment (subject_id, experiment_id) VALUES (?1, ?2)",
            params![subject_id, experiment_id],
        )?;

        Ok(())
    }

    // ===== Queries =====

    /// Get all experiments
    pub fn get_all_experiments(conn: &Connection) -> Result<Vec<Experiment>, anyhow::Error> {
        let mut stmt = conn.prepare(
            "SELECT id, title, created_at, type, finished FROM experiments ORDER BY id",
        )?;

        let experiments = stmt
            .query_map([], experiment_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(experiments)
    }

    /// Get all data points
    pub fn get_all_data_points(conn: &Connection) -> Result<Vec<DataPoint>, anyhow::Error> {
        let mut stmt = conn.prepare(
            "SELECT id, real_value, target_value, experiment_id FROM data_points ORDER BY id",
        )?;

        let points = stmt
            .query_map([], data_point_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(points)
    }

    /// Get all subjects
    pub fn get_all_subjects(conn: &Connection) -> Result<Vec<Subject>, anyhow::Error> {
        let mut stmt = conn.prepare("SELECT id, gdpr_accepted FROM subjects ORDER BY id")?;

        let subjects = stmt
            .query_map([], subject_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(subjects)
    }

    /// Get the data points owned by an experiment
    pub fn get_data_points_for_experiment(
        conn: &Connection,
        experiment_id: i64,
    ) -> Result<Vec<DataPoint>, anyhow::Error> {
        let mut stmt = conn.prepare_cached(
            "SELECT id, real_value, target_value, experiment_id
             FROM data_points
             WHERE experiment_id = ?1
             ORDER BY id",
        )?;

        let points = stmt
            .query_map([experiment_id], data_point_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(points)
    }

    /// Get the subjects linked to an experiment
    pub fn get_subjects_for_experiment(
        conn: &Connection,
        experiment_id: i64,
    ) -> Result<Vec<Subject>, anyhow::Error> {
        let mut stmt = conn.prepare_cached(
            "SELECT s.id, s.gdpr_accepted
             FROM subjects s
             INNER JOIN subject_experiment se ON s.id = se.subject_id
             WHERE se.experiment_id = ?1
             ORDER BY s.id",
        )?;

        let subjects = stmt
            .query_map([experiment_id], subject_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(subjects)
    }

    /// Get the experiments a subject takes part in
    pub fn get_experiments_for_subject(
        conn: &Connection,
        subject_id: i64,
    ) -> Result<Vec<Experiment>, anyhow::Error> {
        let mut stmt = conn.prepare_cached(
            "SELECT e.id, e.title, e.created_at, e.type, e.finished
             FROM experiments e
             INNER JOIN subject_experiment se ON e.id = se.experiment_id
             WHERE se.subject_id = ?1
             ORDER BY e.id",
        )?;

        let experiments = stmt
            .query_map([subject_id], experiment_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(experiments)
    }

    /// Count the rows of a declared table
    pub fn count_rows(conn: &Connection, table: &str) -> Result<i64, anyhow::Error> {
        // Only declared names reach the SQL text
        let table = schema::table(table)
            .ok_or_else(|| WorkflowError::UnknownTable(table.to_string()))?;

        let count = conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", table.name),
            [],
            |row| row.get(0),
        )?;

        Ok(count)
    }

    // ===== Updates =====

    /// Mark every unfinished experiment as finished, returning the number of rows changed
    pub fn finish_unfinished_experiments(conn: &Connection) -> Result<usize, anyhow::Error> {
        let rows_affected = conn.execute(
            "UPDATE experiments SET finished = 1 WHERE finished = 0",
            [],
        )?;

        tracing::debug!(rows_affected, "finished experiments");
        Ok(rows_affected)
    }

    // ===== Deletes =====

    /// Delete an experiment. Its data points and subject links go with it.
    pub fn delete_experiment(conn: &Connection, experiment_id: i64) -> Result<usize, anyhow::Error> {
        let rows_affected = conn.execute(
            "DELETE FROM experiments WHERE id = ?1",
            [experiment_id],
        )?;

        if rows_affected == 0 {
            tracing::warn!(experiment_id, "no experiment to delete");
        }

        Ok(rows_affected)
    }
}
