use limehub::database::Database;
use limehub::models::{Organization, User};
use limehub::services::hash_password;
use uuid::Uuid;

pub struct TestDb {
    db: Database,
    path: String,
}

impl TestDb {
    pub fn db(&self) -> &Database {
        &self.db
    }
}

pub async fn setup_test_db() -> TestDb {
    // Install drivers for AnyPool (required for tests)
    sqlx::any::install_default_drivers();

    // File-based SQLite, unique per test so tests can run in parallel
    let temp_file = format!("test_{}.db", Uuid::new_v4());
    let db_url = format!("sqlite://{}?mode=rwc", temp_file);

    let db = Database::connect(&db_url)
        .await
        .expect("Failed to connect to test database");

    setup_schema(&db).await;

    TestDb {
        db,
        path: temp_file,
    }
}

pub async fn teardown_test_db(test_db: TestDb) {
    let TestDb { db, path } = test_db;
    drop(db);

    std::fs::remove_file(&path).ok();
    std::fs::remove_file(format!("{}-wal", path)).ok();
    std::fs::remove_file(format!("{}-shm", path)).ok();
}

async fn setup_schema(db: &Database) {
    let pool = db.pool();

    sqlx::query(
        "CREATE TABLE organizations (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await
    .expect("Failed to create organizations table");

    sqlx::query(
        "CREATE TABLE users (
            id TEXT PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            name TEXT,
            password_hash TEXT,
            google_id TEXT UNIQUE,
            current_organization_id TEXT NOT NULL REFERENCES organizations(id),
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await
    .expect("Failed to create users table");

    sqlx::query(
        "CREATE TABLE sessions (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            token TEXT NOT NULL UNIQUE,
            expires_at TEXT NOT NULL,
            created_at TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await
    .expect("Failed to create sessions table");

    sqlx::query(
        "CREATE TABLE oauth_states (
            state TEXT PRIMARY KEY,
            nonce TEXT NOT NULL,
            pkce_verifier TEXT NOT NULL,
            created_at TEXT NOT NULL,
            expires_at TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await
    .expect("Failed to create oauth_states table");

    sqlx::query(
        "CREATE TABLE templates (
            id TEXT PRIMARY KEY,
            organization_id TEXT NOT NULL REFERENCES organizations(id),
            name TEXT NOT NULL,
            channel TEXT NOT NULL CHECK(channel IN ('email', 'sms', 'push')),
            subject TEXT,
            content TEXT NOT NULL,
            status TEXT NOT NULL CHECK(status IN ('draft', 'active', 'archived')),
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await
    .expect("Failed to create templates table");

    sqlx::query(
        "CREATE TABLE segments (
            id TEXT PRIMARY KEY,
            organization_id TEXT NOT NULL REFERENCES organizations(id),
            name TEXT NOT NULL,
            description TEXT,
            conditions TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await
    .expect("Failed to create segments table");

    sqlx::query(
        "CREATE TABLE segment_members (
            segment_id TEXT NOT NULL REFERENCES segments(id) ON DELETE CASCADE,
            entity_id TEXT NOT NULL,
            organization_id TEXT NOT NULL REFERENCES organizations(id),
            added_at TEXT NOT NULL,
            PRIMARY KEY (segment_id, entity_id)
        )",
    )
    .execute(pool)
    .await
    .expect("Failed to create segment_members table");
}

pub async fn seed_organization(db: &Database, name: &str) -> Organization {
    let organization = Organization::new(name.to_string());
    db.create_organization(&organization)
        .await
        .expect("Failed to seed organization");
    organization
}

pub async fn seed_user(db: &Database, organization_id: &str, email: &str, password: &str) -> User {
    let mut user = User::new(
        email.to_string(),
        Some("Test User".to_string()),
        organization_id.to_string(),
    );
    user.password_hash = Some(hash_password(password).expect("Failed to hash password"));
    db.create_user(&user).await.expect("Failed to seed user");
    user
}
