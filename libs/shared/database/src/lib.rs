pub mod supabase;

pub use supabase::{SupabaseClient, WriteMode};
