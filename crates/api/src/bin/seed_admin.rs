//! Create or reset the bootstrap admin account.
//!
//! | Env Var          | Required | Default               |
//! |------------------|----------|-----------------------|
//! | `DATABASE_URL`   | **yes**  | --                    |
//! | `ADMIN_PASSWORD` | **yes**  | --                    |
//! | `ADMIN_EMAIL`    | no       | `admin@happyhome.com` |
//! | `ADMIN_NAME`     | no       | `Admin User`          |
//!
//! If an admin with the email already exists, its name and password are
//! reset; otherwise a new admin is created.

use happyhome_db::models::admin::{CreateAdmin, UpdateAdmin};
use happyhome_db::store::{AdminStore, PgAdminStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use happyhome_api::auth::password::hash_password;

const DEFAULT_ADMIN_EMAIL: &str = "admin@happyhome.com";
const DEFAULT_ADMIN_NAME: &str = "Admin User";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "seed_admin=info,happyhome_db=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let email = std::env::var("ADMIN_EMAIL")
        .unwrap_or_else(|_| DEFAULT_ADMIN_EMAIL.into())
        .trim()
        .to_lowercase();
    let name = std::env::var("ADMIN_NAME").unwrap_or_else(|_| DEFAULT_ADMIN_NAME.into());
    let password = std::env::var("ADMIN_PASSWORD").expect("ADMIN_PASSWORD must be set");
    assert!(!password.is_empty(), "ADMIN_PASSWORD must not be empty");

    let pool = happyhome_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    happyhome_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");

    let password_hash = hash_password(&password).expect("Failed to hash admin password");
    let store = PgAdminStore::new(pool);

    let existing = store
        .find_by_email(&email)
        .await
        .expect("Failed to look up admin");

    match existing {
        Some(admin) => {
            let update = UpdateAdmin {
                name: Some(name),
                email: None,
                password_hash: Some(password_hash),
            };
            store
                .update(admin.id, &update)
                .await
                .expect("Failed to update admin");
            tracing::info!(admin_id = %admin.id, %email, "Existing admin updated");
        }
        None => {
            let admin = store
                .create(&CreateAdmin {
                    name,
                    email: email.clone(),
                    password_hash,
                })
                .await
                .expect("Failed to create admin");
            tracing::info!(admin_id = %admin.id, %email, "Admin created");
        }
    }
}
