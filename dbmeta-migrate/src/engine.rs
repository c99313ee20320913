//! Build and update runs.
//!
//! Both runs discover the scripts of a directory, split each file into
//! statements and execute it in its own transaction. They differ in how the
//! database is reached: a build creates a fresh database file first, an
//! update connects to an existing one.
//!
//! A run always produces a report. Only configuration errors (empty
//! arguments) are returned as `Err`; setup failures, unreadable files and
//! failing statements are recorded in the report instead.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::backend::{Backend, CreateOptions};
use crate::error::{MigrateResult, MigrationError};
use crate::executor::{execute_file_with_checksum, ScriptSession};
use crate::file::{checksum, file_name, read_script, ScriptDirectory, SCRIPT_EXTENSION};
use crate::report::{
    BuildReport, ErrorRecord, ScriptReport, UpdateReport, BUILD_RUN_ID, CONNECT_EXECUTE_MARKER,
    CREATE_DATABASE_MARKER, CREATE_OPEN_MARKER, OPEN_CONNECTION_MARKER, UPDATE_RUN_ID,
};
use crate::script::split_statements;

/// Default database file name for builds.
pub const DEFAULT_DATABASE_FILE_NAME: &str = "database.db";

/// Configuration for a build run.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// File name of the database created inside the database directory.
    pub database_file_name: String,
    /// Options passed to the backend when creating the database.
    pub create: CreateOptions,
    /// Script file extension.
    pub script_extension: String,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            database_file_name: DEFAULT_DATABASE_FILE_NAME.to_string(),
            create: CreateOptions::default(),
            script_extension: SCRIPT_EXTENSION.to_string(),
        }
    }
}

impl BuildOptions {
    /// Create default build options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the database file name.
    pub fn database_file_name(mut self, name: impl Into<String>) -> Self {
        self.database_file_name = name.into();
        self
    }

    /// Set the database creation options.
    pub fn create_options(mut self, create: CreateOptions) -> Self {
        self.create = create;
        self
    }

    /// Set the script file extension.
    pub fn script_extension(mut self, extension: impl Into<String>) -> Self {
        self.script_extension = extension.into();
        self
    }
}

/// Creates a database and replays a script directory into it.
pub struct DatabaseBuilder<B: Backend> {
    backend: B,
    options: BuildOptions,
}

impl<B: Backend> DatabaseBuilder<B> {
    /// Create a builder with default options.
    pub fn new(backend: B) -> Self {
        Self::with_options(backend, BuildOptions::default())
    }

    /// Create a builder with custom options.
    pub fn with_options(backend: B, options: BuildOptions) -> Self {
        Self { backend, options }
    }

    /// Get the build options.
    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    /// Create the database inside `database_dir` and execute every script
    /// of `scripts_dir` against it.
    pub fn build(
        &self,
        database_dir: impl AsRef<Path>,
        scripts_dir: impl AsRef<Path>,
    ) -> MigrateResult<BuildReport> {
        let database_dir = database_dir.as_ref();
        let scripts_dir = scripts_dir.as_ref();

        if database_dir.as_os_str().is_empty() {
            return Err(MigrationError::config("Database directory is empty."));
        }
        ensure_scripts_dir(scripts_dir)?;
        if self.options.database_file_name.trim().is_empty() {
            return Err(MigrationError::config("Database file name is empty."));
        }

        let database_path = database_dir.join(&self.options.database_file_name);
        let mut report = BuildReport::new(&database_path);
        info!(database = %database_path.display(), scripts = %scripts_dir.display(), "Starting build");

        if let Err(err) = self.run(database_dir, &database_path, scripts_dir, &mut report) {
            warn!(error = %err, "Build aborted");
            report.run.push_error(ErrorRecord::new(
                BUILD_RUN_ID,
                CREATE_OPEN_MARKER,
                err.message(),
            ));
        }

        report.run.finish();
        info!(
            files_ok = report.run.files_succeeded,
            files_failed = report.run.files_failed,
            statements = report.run.statements_executed,
            "Build finished"
        );
        Ok(report)
    }

    fn run(
        &self,
        database_dir: &Path,
        database_path: &Path,
        scripts_dir: &Path,
        report: &mut BuildReport,
    ) -> MigrateResult<()> {
        std::fs::create_dir_all(database_dir)?;

        if let Err(err) = self
            .backend
            .create_database(database_path, &self.options.create)
        {
            warn!(error = %err, "Database creation failed");
            report.run.push_error(ErrorRecord::new(
                BUILD_RUN_ID,
                CREATE_DATABASE_MARKER,
                err.message(),
            ));
            return Ok(());
        }
        report.database_created = true;

        let files = ScriptDirectory::new(scripts_dir)
            .extension(self.options.script_extension.as_str())
            .list()?;
        report.run.files_total = files.len();

        if files.is_empty() {
            return Ok(());
        }

        let mut session = self.backend.open(database_path)?;
        run_scripts(&mut session, &files, &mut report.run)
    }
}

/// Replays a script directory into an existing database.
pub struct DatabaseUpdater<B: Backend> {
    backend: B,
    script_extension: String,
}

impl<B: Backend> DatabaseUpdater<B> {
    /// Create an updater.
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            script_extension: SCRIPT_EXTENSION.to_string(),
        }
    }

    /// Set the script file extension.
    pub fn script_extension(mut self, extension: impl Into<String>) -> Self {
        self.script_extension = extension.into();
        self
    }

    /// Execute every script of `scripts_dir` against the database at `target`.
    pub fn update(&self, target: &str, scripts_dir: impl AsRef<Path>) -> MigrateResult<UpdateReport> {
        let scripts_dir = scripts_dir.as_ref();

        if target.trim().is_empty() {
            return Err(MigrationError::config("Connection string is empty."));
        }
        ensure_scripts_dir(scripts_dir)?;

        let mut report = UpdateReport::new();
        info!(scripts = %scripts_dir.display(), "Starting update");

        if let Err(err) = self.run(target, scripts_dir, &mut report) {
            warn!(error = %err, "Update aborted");
            report.run.push_error(ErrorRecord::new(
                UPDATE_RUN_ID,
                CONNECT_EXECUTE_MARKER,
                err.message(),
            ));
        }

        report.run.finish();
        info!(
            files_ok = report.run.files_succeeded,
            files_failed = report.run.files_failed,
            statements = report.run.statements_executed,
            "Update finished"
        );
        Ok(report)
    }

    fn run(&self, target: &str, scripts_dir: &Path, report: &mut UpdateReport) -> MigrateResult<()> {
        let files = ScriptDirectory::new(scripts_dir)
            .extension(self.script_extension.as_str())
            .list()?;
        report.run.files_total = files.len();

        if files.is_empty() {
            return Ok(());
        }

        let mut session = match self.backend.connect(target) {
            Ok(session) => {
                report.connection_opened = true;
                session
            }
            Err(err) => {
                warn!(error = %err, "Cannot open connection");
                report.connection_opened = false;
                report.run.push_error(ErrorRecord::new(
                    UPDATE_RUN_ID,
                    OPEN_CONNECTION_MARKER,
                    err.message(),
                ));
                return Ok(());
            }
        };

        run_scripts(&mut session, &files, &mut report.run)
    }
}

fn ensure_scripts_dir(scripts_dir: &Path) -> MigrateResult<()> {
    if scripts_dir.as_os_str().is_empty() {
        return Err(MigrationError::config("Scripts directory is empty."));
    }
    Ok(())
}

/// Read, split and execute each file in order.
///
/// Unreadable files are recorded and skipped. Transaction faults end the
/// loop and are returned to the run.
fn run_scripts<S: ScriptSession>(
    session: &mut S,
    files: &[PathBuf],
    report: &mut ScriptReport,
) -> MigrateResult<()> {
    for path in files {
        let name = file_name(path);

        let text = match read_script(path) {
            Ok(text) => text,
            Err(err) => {
                warn!(file = %name, error = %err, "Cannot read script");
                report.record_unreadable(&name, err.message());
                continue;
            }
        };

        let statements = split_statements(&text);
        info!(file = %name, statements = statements.len(), "Executing script");
        execute_file_with_checksum(session, &name, &statements, Some(checksum(&text)), report)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;
    use crate::executor::testing::{Event, RecordingSession};
    use crate::report::{FileStatus, READ_FILE_MARKER};

    /// Session handle sharing one recorder with the test.
    struct SharedSession(Rc<RefCell<RecordingSession>>);

    impl ScriptSession for SharedSession {
        fn begin(&mut self) -> MigrateResult<()> {
            self.0.borrow_mut().begin()
        }

        fn execute(&mut self, sql: &str) -> MigrateResult<()> {
            self.0.borrow_mut().execute(sql)
        }

        fn commit(&mut self) -> MigrateResult<()> {
            self.0.borrow_mut().commit()
        }

        fn rollback(&mut self) -> MigrateResult<()> {
            self.0.borrow_mut().rollback()
        }
    }

    #[derive(Default)]
    struct FakeBackend {
        session: Rc<RefCell<RecordingSession>>,
        fail_create: bool,
        fail_connect: bool,
        created: RefCell<Vec<PathBuf>>,
        opened: RefCell<Vec<PathBuf>>,
        connects: RefCell<usize>,
    }

    impl FakeBackend {
        fn failing_on(marker: &str) -> Self {
            Self {
                session: Rc::new(RefCell::new(RecordingSession::failing_on(marker))),
                ..Self::default()
            }
        }
    }

    impl Backend for &FakeBackend {
        type Session = SharedSession;

        fn create_database(&self, path: &Path, _options: &CreateOptions) -> MigrateResult<()> {
            if self.fail_create {
                return Err(MigrationError::create_database("I/O error during CreateFile"));
            }
            self.created.borrow_mut().push(path.to_path_buf());
            Ok(())
        }

        fn open(&self, path: &Path) -> MigrateResult<Self::Session> {
            self.opened.borrow_mut().push(path.to_path_buf());
            self.connect("")
        }

        fn connect(&self, _target: &str) -> MigrateResult<Self::Session> {
            *self.connects.borrow_mut() += 1;
            if self.fail_connect {
                return Err(MigrationError::connection("Unable to complete network request"));
            }
            Ok(SharedSession(Rc::clone(&self.session)))
        }
    }

    fn scripts(files: &[(&str, &str)]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for (name, content) in files {
            std::fs::write(dir.path().join(name), content).unwrap();
        }
        dir
    }

    const DOMAINS: &str = "-- Export: DOMAINS\n\nCREATE DOMAIN D_ID AS INTEGER NOT NULL;\n";
    const TABLES: &str = "CREATE TABLE CUSTOMERS (\n    ID D_ID,\n    NAME VARCHAR(80)\n);\n";
    const PROCEDURES: &str = "\
SET TERM ^ ;
CREATE PROCEDURE TOUCH_CUSTOMER (CUSTOMER_ID INTEGER)
AS
BEGIN
  UPDATE CUSTOMERS SET NAME = NAME WHERE ID = :CUSTOMER_ID;
END
^
SET TERM ; ^
";

    #[test]
    fn test_build_three_files() {
        let backend = FakeBackend::default();
        let dir = scripts(&[
            ("03_procedures.sql", PROCEDURES),
            ("01_domains.sql", DOMAINS),
            ("02_tables.sql", TABLES),
        ]);
        let db_dir = TempDir::new().unwrap();

        let report = DatabaseBuilder::new(&backend)
            .build(db_dir.path(), dir.path())
            .unwrap();

        assert!(report.database_created);
        assert_eq!(report.database_path, db_dir.path().join(DEFAULT_DATABASE_FILE_NAME));
        assert_eq!(report.run.files_total, 3);
        assert_eq!(report.run.files_succeeded, 3);
        assert_eq!(report.run.files_failed, 0);
        assert_eq!(report.run.statements_executed, 3);
        assert!(report.run.errors.is_empty());
        assert!(report.succeeded());

        let session = backend.session.borrow();
        let executed = session.executed();
        assert!(executed[0].starts_with("-- Export: DOMAINS"));
        assert!(executed[0].ends_with("CREATE DOMAIN D_ID AS INTEGER NOT NULL"));
        assert!(executed[1].starts_with("CREATE TABLE CUSTOMERS"));
        assert!(executed[2].starts_with("CREATE PROCEDURE TOUCH_CUSTOMER"));
        assert!(executed[2].contains("WHERE ID = :CUSTOMER_ID;\nEND"));
        assert_eq!(session.events.iter().filter(|e| **e == Event::Commit).count(), 3);

        let names: Vec<_> = report.run.files.iter().map(|f| f.file_name.as_str()).collect();
        assert_eq!(names, vec!["01_domains.sql", "02_tables.sql", "03_procedures.sql"]);
        assert!(report.run.files.iter().all(|f| f.checksum.is_some()));
        assert_eq!(*backend.connects.borrow(), 1);
        assert_eq!(*backend.opened.borrow(), *backend.created.borrow());
    }

    #[test]
    fn test_build_failing_file_does_not_stop_run() {
        let backend = FakeBackend::failing_on("NO_SUCH_TABLE");
        let dir = scripts(&[
            ("01_ok.sql", "CREATE TABLE A (ID INTEGER);\n"),
            (
                "02_bad.sql",
                "CREATE TABLE B (ID INTEGER);\nINSERT INTO NO_SUCH_TABLE VALUES (1);\nCREATE TABLE C (ID INTEGER);\n",
            ),
            ("03_ok.sql", "CREATE TABLE D (ID INTEGER);\n"),
        ]);
        let db_dir = TempDir::new().unwrap();

        let report = DatabaseBuilder::new(&backend)
            .build(db_dir.path(), dir.path())
            .unwrap();

        assert_eq!(report.run.files_total, 3);
        assert_eq!(report.run.files_succeeded, 2);
        assert_eq!(report.run.files_failed, 1);
        assert_eq!(report.run.statements_executed, 3);
        assert_eq!(report.run.errors.len(), 1);
        assert_eq!(report.run.errors[0].file_name, "02_bad.sql");
        assert!(!report.run.errors[0].message.is_empty());
        assert_eq!(report.run.files[1].status, FileStatus::RolledBack);

        let session = backend.session.borrow();
        assert!(!session.executed().contains(&"CREATE TABLE C (ID INTEGER)"));
        assert_eq!(
            session.committed,
            vec!["CREATE TABLE A (ID INTEGER)", "CREATE TABLE D (ID INTEGER)"]
        );
    }

    #[test]
    fn test_build_unreadable_file_is_recorded() {
        let backend = FakeBackend::default();
        let dir = scripts(&[("02_ok.sql", "CREATE TABLE A (ID INTEGER);\n")]);
        std::fs::write(dir.path().join("01_binary.sql"), [0xff, 0xfe, 0x00, 0xc3]).unwrap();
        let db_dir = TempDir::new().unwrap();

        let report = DatabaseBuilder::new(&backend)
            .build(db_dir.path(), dir.path())
            .unwrap();

        assert_eq!(report.run.files_total, 2);
        assert_eq!(report.run.files_failed, 1);
        assert_eq!(report.run.files_succeeded, 1);
        assert_eq!(report.run.errors[0].file_name, "01_binary.sql");
        assert_eq!(report.run.errors[0].statement_preview, READ_FILE_MARKER);
        assert_eq!(report.run.files[0].status, FileStatus::Unreadable);
    }

    #[test]
    fn test_build_create_failure_stops_run() {
        let backend = FakeBackend {
            fail_create: true,
            ..FakeBackend::default()
        };
        let dir = scripts(&[("01.sql", "SELECT 1;")]);
        let db_dir = TempDir::new().unwrap();

        let report = DatabaseBuilder::new(&backend)
            .build(db_dir.path(), dir.path())
            .unwrap();

        assert!(!report.database_created);
        assert_eq!(report.run.files_total, 0);
        assert_eq!(report.run.errors.len(), 1);
        assert_eq!(report.run.errors[0].file_name, BUILD_RUN_ID);
        assert_eq!(report.run.errors[0].statement_preview, CREATE_DATABASE_MARKER);
        assert_eq!(*backend.connects.borrow(), 0);
    }

    #[test]
    fn test_build_missing_scripts_dir_is_recorded() {
        let backend = FakeBackend::default();
        let db_dir = TempDir::new().unwrap();

        let report = DatabaseBuilder::new(&backend)
            .build(db_dir.path(), db_dir.path().join("missing"))
            .unwrap();

        assert!(report.database_created);
        assert_eq!(report.run.errors.len(), 1);
        assert_eq!(report.run.errors[0].file_name, BUILD_RUN_ID);
        assert_eq!(report.run.errors[0].statement_preview, CREATE_OPEN_MARKER);
    }

    #[test]
    fn test_build_without_scripts_skips_connect() {
        let backend = FakeBackend::default();
        let dir = scripts(&[("readme.txt", "nothing")]);
        let db_dir = TempDir::new().unwrap();

        let report = DatabaseBuilder::with_options(
            &backend,
            BuildOptions::new().database_file_name("app.db"),
        )
        .build(db_dir.path(), dir.path())
        .unwrap();

        assert!(report.database_created);
        assert_eq!(report.run.files_total, 0);
        assert!(report.run.errors.is_empty());
        assert_eq!(*backend.connects.borrow(), 0);
        assert_eq!(backend.created.borrow()[0], db_dir.path().join("app.db"));
    }

    #[test]
    fn test_build_configuration_errors() {
        let backend = FakeBackend::default();
        let builder = DatabaseBuilder::new(&backend);

        assert!(builder.build("", "scripts").unwrap_err().is_configuration());
        assert!(builder.build("db", "").unwrap_err().is_configuration());
        assert!(backend.created.borrow().is_empty());
    }

    #[test]
    fn test_update_runs_scripts() {
        let backend = FakeBackend::default();
        let dir = scripts(&[("01_domains.sql", DOMAINS), ("02_tables.sql", TABLES)]);

        let report = DatabaseUpdater::new(&backend)
            .update("/data/app.db", dir.path())
            .unwrap();

        assert!(report.connection_opened);
        assert_eq!(report.run.files_total, 2);
        assert_eq!(report.run.files_succeeded, 2);
        assert_eq!(report.run.statements_executed, 2);
        assert!(report.succeeded());
    }

    #[test]
    fn test_update_connection_failure() {
        let backend = FakeBackend {
            fail_connect: true,
            ..FakeBackend::default()
        };
        let dir = scripts(&[("01_domains.sql", DOMAINS)]);

        let report = DatabaseUpdater::new(&backend)
            .update("/data/app.db", dir.path())
            .unwrap();

        assert!(!report.connection_opened);
        assert_eq!(report.run.files_total, 1);
        assert_eq!(report.run.files_succeeded + report.run.files_failed, 0);
        assert_eq!(report.run.errors.len(), 1);
        assert_eq!(report.run.errors[0].file_name, UPDATE_RUN_ID);
        assert_eq!(report.run.errors[0].statement_preview, OPEN_CONNECTION_MARKER);
        assert!(!report.succeeded());
    }

    #[test]
    fn test_update_transaction_fault_is_run_level() {
        let backend = FakeBackend::default();
        backend.session.borrow_mut().fail_begin = true;
        let dir = scripts(&[("01_domains.sql", DOMAINS), ("02_tables.sql", TABLES)]);

        let report = DatabaseUpdater::new(&backend)
            .update("/data/app.db", dir.path())
            .unwrap();

        assert!(report.connection_opened);
        assert_eq!(report.run.errors.len(), 1);
        assert_eq!(report.run.errors[0].file_name, UPDATE_RUN_ID);
        assert_eq!(report.run.errors[0].statement_preview, CONNECT_EXECUTE_MARKER);
        assert_eq!(report.run.errors[0].message, "cannot start transaction");
    }

    #[test]
    fn test_update_empty_target_is_configuration_error() {
        let backend = FakeBackend::default();
        let err = DatabaseUpdater::new(&backend).update("  ", "scripts").unwrap_err();
        assert!(err.is_configuration());
        assert_eq!(*backend.connects.borrow(), 0);
    }
}
