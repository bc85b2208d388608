use super::TestDb;
use chika::settings::Settings;
use chika::web::{router, AppState};
use sea_orm::DatabaseConnection;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// The router served on an ephemeral local port, backed by a fresh database
pub struct TestServer {
    base_url: String,
    handle: JoinHandle<()>,
    db: TestDb,
}

#[allow(dead_code)]
impl TestServer {
    pub async fn start() -> Self {
        Self::with_settings(Settings::default()).await
    }

    pub async fn with_settings(settings: Settings) -> Self {
        let db = TestDb::new().await;
        let app = router(AppState::new(settings, db.connection().clone()));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("No local addr");

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Test server failed");
        });

        Self {
            base_url: format!("http://{}", addr),
            handle,
            db,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn db(&self) -> &DatabaseConnection {
        self.db.connection()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
