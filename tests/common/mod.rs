use migration::{Migrator, MigratorTrait};
use products_marketplace::seed::{SeededMarketplace, seed_demo};
use sea_orm::{ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, Statement};
use url::Url;
use uuid::Uuid;

/// A throwaway database created next to `TEST_DATABASE_URL`.
///
/// `new_seeded` returns `None` when the variable is unset or the server is
/// unreachable, so the suite stays green on machines without Postgres.
pub struct PgTestContext {
    pub db: DatabaseConnection,
    pub seeded: SeededMarketplace,
    admin_url: String,
    db_name: String,
}

impl PgTestContext {
    pub async fn new_seeded() -> Option<Self> {
        let base = std::env::var("TEST_DATABASE_URL").ok()?;
        let (admin_url, db_name, test_url) = build_urls(&base)?;
        let admin = Database::connect(&admin_url).await.ok()?;
        let _ = admin
            .execute(Statement::from_string(
                DatabaseBackend::Postgres,
                format!("DROP DATABASE IF EXISTS \"{db_name}\" WITH (FORCE);"),
            ))
            .await;
        admin
            .execute(Statement::from_string(
                DatabaseBackend::Postgres,
                format!("CREATE DATABASE \"{db_name}\";"),
            ))
            .await
            .ok()?;
        let db = Database::connect(&test_url).await.ok()?;
        Migrator::up(&db, None).await.ok()?;
        let seeded = seed_demo(&db).await.ok()?;
        Some(Self {
            db,
            seeded,
            admin_url,
            db_name,
        })
    }

    pub async fn cleanup(self) {
        let Self {
            db,
            admin_url,
            db_name,
            ..
        } = self;
        let _ = db.close().await;
        if let Ok(admin) = Database::connect(&admin_url).await {
            let _ = admin
                .execute(Statement::from_string(
                    DatabaseBackend::Postgres,
                    format!("DROP DATABASE IF EXISTS \"{db_name}\" WITH (FORCE);"),
                ))
                .await;
        }
    }
}

fn build_urls(base: &str) -> Option<(String, String, String)> {
    let url = Url::parse(base).ok()?;
    let db_path = url.path().trim_start_matches('/');
    let base_name = if db_path.is_empty() {
        "pawpal_test"
    } else {
        db_path
    };
    let db_name = format!("{base_name}_{}", Uuid::new_v4().simple());
    let mut admin_url = url.clone();
    admin_url.set_path("/postgres");
    let mut test_url = url.clone();
    test_url.set_path(&format!("/{db_name}"));
    Some((admin_url.to_string(), db_name, test_url.to_string()))
}
