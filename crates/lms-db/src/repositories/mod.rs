// All repository functions are generic over `E: Executor<'e, Database = Postgres>`
// so they accept both a `&PgPool` (direct query) and a `&mut Transaction` (atomic operations).

pub mod course;
pub mod enrollment;
pub mod progress;
pub mod quiz;
pub mod rating;
pub mod user;
