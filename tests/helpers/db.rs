use sea_orm::{Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use tempfile::NamedTempFile;

/// Test database with automatic cleanup
pub struct TestDb {
    connection: DatabaseConnection,
    _temp_file: NamedTempFile,
}

impl TestDb {
    /// Create a new test database with migrations applied
    pub async fn new() -> Self {
        // Create temporary SQLite database file
        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        let db_path = temp_file.path().to_str().expect("Invalid temp file path");
        let db_url = format!("sqlite://{}?mode=rwc", db_path);

        let connection = Database::connect(&db_url)
            .await
            .expect("Failed to connect to test database");

        migration::Migrator::up(&connection, None)
            .await
            .expect("Failed to run migrations");

        Self {
            connection,
            _temp_file: temp_file,
        }
    }

    /// Get database connection
    pub fn connection(&self) -> &DatabaseConnection {
        &self.connection
    }
}

/// The five rows most tests start from
#[allow(dead_code)]
pub async fn seed_sample_properties(db: &DatabaseConnection) -> Vec<chika::schemas::Property> {
    use super::PropertyBuilder;

    let mut created = Vec::new();
    for (name, address, price) in [
        ("新宿区", "東京都", 1500000.0),
        ("渋谷区", "東京都", 1800000.0),
        ("千代田区", "東京都", 3862500.0),
        ("横浜市", "神奈川県", 500000.0),
        ("さいたま市", "埼玉県", 300000.0),
    ] {
        created.push(
            PropertyBuilder::new(name)
                .with_address(address)
                .with_price(price)
                .create(db)
                .await,
        );
    }
    created
}
