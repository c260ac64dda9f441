use sql_app_lib::db::connection::DatabaseConnection;
use sql_app_lib::db::operations::DbOperations;
use sql_app_lib::db::schema::{DATA_POINTS, EXPERIMENTS, SUBJECTS, SUBJECT_EXPERIMENT};
use sql_app_lib::error::WorkflowError;
use sql_app_lib::settings::{ValueRange, WorkflowSettings};
use sql_app_lib::workflow::run_workflow;
use tempfile::tempdir;

fn settings_in(dir: &std::path::Path) -> WorkflowSettings {
    WorkflowSettings {
        database_path: dir.join("sql_app.db"),
        seed: Some(17),
        ..WorkflowSettings::default()
    }
}

fn run(settings: &WorkflowSettings) -> (sql_app_lib::workflow::WorkflowSummary, String) {
    let mut out = Vec::new();
    let summary = run_workflow(settings, &mut out).unwrap();
    (summary, String::from_utf8(out).unwrap())
}

#[test]
fn test_full_run_on_file_store() {
    let dir = tempdir().unwrap();
    let settings = settings_in(dir.path());

    let (summary, report) = run(&settings);

    assert_eq!(summary.experiments_inserted, 2);
    assert_eq!(summary.data_points_inserted, 10);
    assert_eq!(summary.subjects_inserted, 3);
    assert_eq!(summary.links_inserted, 4);
    assert_eq!(summary.experiments_finished, 2);
    assert!(settings.database_path.exists());
    assert!(report.contains("TWORZENIE TABEL"));
    assert!(report.contains("PODGLĄD ZDEFINIOWANYCH TABEL"));
    assert!(report.contains("Inspekcja bazy danych"));
    assert!(report.contains("Zaktualizowano 2 wierszy"));

    let db = DatabaseConnection::new(settings.database_path.clone()).unwrap();
    db.with_session(|conn| {
        assert_eq!(DbOperations::count_rows(conn, EXPERIMENTS)?, 2);
        assert_eq!(DbOperations::count_rows(conn, DATA_POINTS)?, 10);
        assert_eq!(DbOperations::count_rows(conn, SUBJECTS)?, 3);

        let experiments = DbOperations::get_all_experiments(conn)?;
        assert!(experiments.iter().all(|e| e.finished));

        for dp in DbOperations::get_all_data_points(conn)? {
            assert!(experiments.iter().any(|e| e.id == dp.experiment_id));
            let real = dp.real_value.unwrap();
            let target = dp.target_value.unwrap();
            assert!((10.0..=50.0).contains(&real));
            assert!(target >= real * 0.9 - 0.005 && target <= real * 1.1 + 0.005);
        }
        Ok(())
    })
    .unwrap();
}

#[test]
fn test_rerun_keeps_schema_and_updates_only_new_rows() {
    let dir = tempdir().unwrap();
    let settings = settings_in(dir.path());

    run(&settings);
    let (second, _) = run(&settings);

    // Schema creation is a no-op the second time; only the new rows were unfinished
    assert_eq!(second.experiments_finished, 2);
    let db = DatabaseConnection::new(settings.database_path.clone()).unwrap();
    let experiments = db
        .with_session(|conn| DbOperations::count_rows(conn, EXPERIMENTS))
        .unwrap();
    assert_eq!(experiments, 4);
}

#[test]
fn test_reset_database_starts_fresh() {
    let dir = tempdir().unwrap();
    let mut settings = settings_in(dir.path());

    let (_, first_report) = {
        settings.reset_database = true;
        run(&settings)
    };
    assert!(first_report.contains("Plik bazy danych nie istniał"));

    let (summary, report) = run(&settings);
    assert!(report.contains("Usunięto plik bazy danych"));
    assert_eq!(summary.experiments_finished, 2);

    let db = DatabaseConnection::new(settings.database_path.clone()).unwrap();
    let experiments = db
        .with_session(|conn| DbOperations::count_rows(conn, EXPERIMENTS))
        .unwrap();
    assert_eq!(experiments, 2);
}

#[test]
fn test_delete_experiment_after_run() {
    let dir = tempdir().unwrap();
    let settings = settings_in(dir.path());
    run(&settings);

    let db = DatabaseConnection::new(settings.database_path.clone()).unwrap();
    db.with_session(|conn| {
        let experiments = DbOperations::get_all_experiments(conn)?;
        let with_points = experiments
            .iter()
            .find(|e| !DbOperations::get_data_points_for_experiment(conn, e.id).unwrap().is_empty())
            .unwrap()
            .id;
        let other = experiments.iter().find(|e| e.id != with_points).unwrap().id;
        let other_links = DbOperations::get_subjects_for_experiment(conn, other)?.len();

        assert_eq!(DbOperations::delete_experiment(conn, with_points)?, 1);

        assert_eq!(DbOperations::count_rows(conn, DATA_POINTS)?, 0);
        assert_eq!(DbOperations::count_rows(conn, SUBJECTS)?, 3);
        assert_eq!(
            DbOperations::count_rows(conn, SUBJECT_EXPERIMENT)? as usize,
            other_links
        );
        assert_eq!(DbOperations::get_subjects_for_experiment(conn, other)?.len(), other_links);
        Ok(())
    })
    .unwrap();
}

#[test]
fn test_invalid_settings_stop_before_touching_store() {
    let dir = tempdir().unwrap();
    let settings = WorkflowSettings {
        data_point_count: 0,
        ..settings_in(dir.path())
    };

    let mut out = Vec::new();
    assert!(run_workflow(&settings, &mut out).is_err());
    assert!(!settings.database_path.exists());
}

#[test]
fn test_overflowing_value_range_is_an_error_not_a_panic() {
    let dir = tempdir().unwrap();
    let settings = WorkflowSettings {
        real_value_range: ValueRange::new(-1.0e308, 1.0e308),
        ..settings_in(dir.path())
    };

    let mut out = Vec::new();
    let err = run_workflow(&settings, &mut out).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<WorkflowError>(),
        Some(WorkflowError::InvalidSettings(_))
    ));
    assert!(!settings.database_path.exists());
}
