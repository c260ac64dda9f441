// Sample data workflow: create tables, seed, read back, bulk update
use anyhow::Result;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rusqlite::Connection;
use std::fs;
use std::io::Write;
use std::path::Path;

use crate::db::connection::DatabaseConnection;
use crate::db::inspect;
use crate::db::models::{NewExperiment, NewSubject};
use crate::db::operations::DbOperations;
use crate::db::schema::TABLES;
use crate::sampling::sample_data_points;
use crate::settings::WorkflowSettings;

/// Row counts produced by one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkflowSummary {
    pub experiments_inserted: usize,
    pub data_points_inserted: usize,
    pub subjects_inserted: usize,
    pub links_inserted: usize,
    pub experiments_finished: usize,
}

impl WorkflowSummary {
    pub fn rows_inserted(&self) -> usize {
        self.experiments_inserted + self.data_points_inserted + self.subjects_inserted
    }
}

fn banner<W: Write>(out: &mut W, title: &str, width: usize) -> std::io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "=".repeat(width))?;
    writeln!(out, "{}", title)?;
    writeln!(out, "{}", "=".repeat(width))
}

fn table_heading<W: Write>(out: &mut W, name: &str) -> std::io::Result<()> {
    writeln!(out)?;
    writeln!(out, "[TABLE] {}", name)?;
    writeln!(out, "{}", "-".repeat(name.chars().count() + 10))
}

fn py_list(items: &[String]) -> String {
    let quoted: Vec<String> = items.iter().map(|item| format!("'{}'", item)).collect();
    format!("[{}]", quoted.join(", "))
}

fn py_bool(value: bool) -> &'static str {
    if value {
        "True"
    } else {
        "False"
    }
}

/// Run every step against the store named in `settings`
pub fn run_workflow<W: Write>(settings: &WorkflowSettings, out: &mut W) -> Result<WorkflowSummary> {
    settings.validate()?;

    if settings.reset_database {
        drop_database(&settings.database_path, out)?;
    }

    banner(out, "TWORZENIE TABEL", 50)?;
    let db = DatabaseConnection::new(settings.database_path.clone())?;
    writeln!(out, "Wszystkie tabele utworzone")?;

    show_table_definitions(out)?;
    db.with_session(|conn| inspect_database(conn, out))?;

    let mut rng = match settings.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    run_data_operations(&db, settings, &mut rng, out)
}

/// Delete the database file if present
pub fn drop_database<W: Write>(db_path: &Path, out: &mut W) -> Result<bool> {
    banner(out, "USUWANIE BIEŻĄCEJ BAZY DANYCH", 50)?;

    let existed = db_path.exists();
    if existed {
        fs::remove_file(db_path)?;
        tracing::info!(path = %db_path.display(), "removed database file");
        writeln!(out, "Usunięto plik bazy danych: {}", db_path.display())?;
    } else {
        writeln!(out, "Plik bazy danych nie istniał: {}", db_path.display())?;
    }
    writeln!(out, "{}", "-".repeat(50))?;

    Ok(existed)
}

/// Print the declared schema
pub fn show_table_definitions<W: Write>(out: &mut W) -> Result<()> {
    banner(out, "PODGLĄD ZDEFINIOWANYCH TABEL", 30)?;

    if TABLES.is_empty() {
        writeln!(out, "Brak zdefiniowanych tabel w metadanych.")?;
        return Ok(());
    }

    for table in TABLES {
        table_heading(out, table.name)?;
        for column in table.columns {
            let pk_info = if column.primary_key { " (PRIMARY KEY)" } else { "" };
            let fk_info = if column.foreign_key.is_some() { " (FOREIGN KEY)" } else { "" };
            let default_info = column
                .default
                .map(|d| format!(" (DEFAULT: {})", d))
                .unwrap_or_default();
            writeln!(
                out,
                "  {}: {}{}{}{}",
                column.name, column.sql_type, pk_info, fk_info, default_info
            )?;
        }
    }

    Ok(())
}

/// Print what SQLite reports about the live tables
pub fn inspect_database<W: Write>(conn: &Connection, out: &mut W) -> Result<()> {
    banner(out, "Inspekcja bazy danych", 30)?;

    for table in inspect::table_names(conn)? {
        table_heading(out, &table)?;
        for column in inspect::columns(conn, &table)? {
            writeln!(
                out,
                "  {}: {} (PK: {}, Default: {})",
                column.name,
                column.sql_type,
                py_bool(column.primary_key),
                column.default.as_deref().unwrap_or("None")
            )?;
        }

        let foreign_keys = inspect::foreign_keys(conn, &table)?;
        if !foreign_keys.is_empty() {
            writeln!(out)?;
            writeln!(out, "  Klucze obce:")?;
            for fk in foreign_keys {
                writeln!(
                    out,
                    "    {} -> {}.{}",
                    py_list(&fk.constrained_columns),
                    fk.referred_table,
                    py_list(&fk.referred_columns)
                )?;
            }
        }
    }

    Ok(())
}

/// Seed, read back and update inside one session
pub fn run_data_operations<W: Write, R: Rng + ?Sized>(
    db: &DatabaseConnection,
    settings: &WorkflowSettings,
    rng: &mut R,
    out: &mut W,
) -> Result<WorkflowSummary> {
    db.with_session(|conn| {
        banner(out, "WSTAWIANIE DANYCH", 50)?;
        let mut summary = seed(conn, settings, rng)?;
        writeln!(out, "Dodano {} nowych wierszy", summary.rows_inserted())?;
        writeln!(out, "Powiązano {} par Subject-Experiment", summary.links_inserted)?;
        writeln!(out, "{}", "-".repeat(50))?;

        banner(out, "POBIERANIE DANYCH", 50)?;
        print_relationships(conn, out)?;
        writeln!(out, "{}", "-".repeat(50))?;

        banner(out, "AKTUALIZACJA DANYCH", 50)?;
        summary.experiments_finished = finish_experiments(conn)?;
        writeln!(out, "Zaktualizowano {} wierszy", summary.experiments_finished)?;
        writeln!(out)?;
        writeln!(out, "[Experiments po aktualizacji]:")?;
        for exp in DbOperations::get_all_experiments(conn)? {
            writeln!(out, "  {}", exp)?;
        }
        writeln!(out, "{}", "-".repeat(50))?;

        tracing::info!(?summary, "workflow finished");
        Ok(summary)
    })
}

/// Insert the sample experiments, data points, subjects and links as one transaction
pub fn seed<R: Rng + ?Sized>(
    conn: &mut Connection,
    settings: &WorkflowSettings,
    rng: &mut R,
) -> Result<WorkflowSummary> {
    let tx = conn.transaction()?;

    let experiment_1 = DbOperations::insert_experiment(&tx, &NewExperiment::new("Test A/B", 1))?;
    let experiment_2 =
        DbOperations::insert_experiment(&tx, &NewExperiment::new("Optymalizacja Modelu", 2))?;

    let points = sample_data_points(
        rng,
        settings.data_point_count,
        &settings.real_value_range,
        &settings.target_multiplier_range,
    );
    let point_ids = DbOperations::insert_data_points(&tx, experiment_2, &points)?;

    let subject_1 = DbOperations::insert_subject(&tx, &NewSubject::with_consent(true))?;
    let subject_2 = DbOperations::insert_subject(&tx, &NewSubject::with_consent(false))?;
    let subject_3 = DbOperations::insert_subject(&tx, &NewSubject::default())?;

    let links = [
        (subject_1, experiment_1),
        (subject_2, experiment_1),
        (subject_1, experiment_2),
        (subject_3, experiment_2),
    ];
    for (subject_id, experiment_id) in links {
        DbOperations::link_subject_experiment(&tx, subject_id, experiment_id)?;
    }

    tx.commit()?;

    Ok(WorkflowSummary {
        experiments_inserted: 2,
        data_points_inserted: point_ids.len(),
        subjects_inserted: 3,
        links_inserted: links.len(),
        experiments_finished: 0,
    })
}

/// Print every experiment with its data points and subjects, then every
/// subject with the titles of its experiments
pub fn print_relationships<W: Write>(conn: &Connection, out: &mut W) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "[Experiments]:")?;
    for exp in DbOperations::get_all_experiments(conn)? {
        writeln!(out, "  {}", exp)?;

        let points = DbOperations::get_data_points_for_experiment(conn, exp.id)?;
        writeln!(out, "    - Powiązane DataPoints: {}", points.len())?;
        for dp in &points {
            writeln!(out, "       • {}", dp)?;
        }

        let subjects = DbOperations::get_subjects_for_experiment(conn, exp.id)?;
        writeln!(out, "    - Powiązane Subjects: {}", subjects.len())?;
        for subject in &subjects {
            writeln!(out, "       • {}", subject)?;
        }
    }

    writeln!(out)?;
    writeln!(out, "[Subjects - wszystkie]:")?;
    for subject in DbOperations::get_all_subjects(conn)? {
        writeln!(out, "  {}", subject)?;
        let titles: Vec<String> = DbOperations::get_experiments_for_subject(conn, subject.id)?
            .into_iter()
            .map(|exp| exp.title.unwrap_or_default())
            .collect();
        writeln!(out, "    - Eksperymenty: {}", py_list(&titles))?;
    }

    Ok(())
}

/// Flip every unfinished experiment to finished in its own transaction
pub fn finish_experiments(conn: &mut Connection) -> Result<usize> {
    let tx = conn.transaction()?;
    let updated = DbOperations::finish_unfinished_experiments(&tx)?;
    tx.commit()?;
    Ok(updated)
}
