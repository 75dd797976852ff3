use std::path::PathBuf;

pub(super) fn run_migrate(
    config_path: Option<PathBuf>,
    db_url: Option<String>,
    sql_path: PathBuf,
) -> Result<(), String> {
    let sql = std::fs::read_to_string(&sql_path)
        .map_err(|err| format!("failed to read migration {}: {}", sql_path.display(), err))?;

    let store = match config_path {
        Some(path) => {
            let config = alphapulse_application::config::load_config(&path)?;
            crate::infra::build_postgres_store(&config, db_url.as_deref())?
        }
        None => crate::infra::build_postgres_store_from_url(db_url.as_deref())?,
    };

    store.migrate(&sql)?;
    println!(
        "migration applied: {} (tables {}, {})",
        sql_path.display(),
        store.tick_table,
        store.training_table
    );
    Ok(())
}
