mod admin_repo;
mod user_repo;

pub use admin_repo::AdminRepo;
pub use user_repo::UserRepo;
