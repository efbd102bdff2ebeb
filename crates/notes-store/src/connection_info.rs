//! Helper files that tell other tools where the database lives.

use std::io;
use std::path::{Path, PathBuf};

/// File describing how to connect, relative to the output directory.
pub const CONNECTION_FILE: &str = "db_connection.txt";

/// Shell env file for the database viewer, relative to the output directory.
pub const VIEWER_ENV_FILE: &str = "db_visualizer/sqlite.env";

/// Render the contents of `db_connection.txt`.
pub fn connection_text(db_path: &Path) -> String {
    let file_name = db_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!(
        "# SQLite connection methods:\n\
         # CLI: sqlite3 {path}\n\
         # Connection string: sqlite://{path}\n\
         # File name: {file_name}\n",
        path = db_path.display(),
    )
}

/// Render the contents of `sqlite.env`.
pub fn viewer_env(db_path: &Path) -> String {
    format!("export SQLITE_DB=\"{}\"\n", db_path.display())
}

/// Write both helper files under `out_dir`, returning the paths written.
///
/// `db_path` should be absolute so the files stay valid from any directory.
pub fn write(out_dir: &Path, db_path: &Path) -> io::Result<Vec<PathBuf>> {
    let connection = out_dir.join(CONNECTION_FILE);
    std::fs::write(&connection, connection_text(db_path))?;

    let env = out_dir.join(VIEWER_ENV_FILE);
    if let Some(parent) = env.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&env, viewer_env(db_path))?;

    Ok(vec![connection, env])
}
