//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod argon2_password_hasher;
mod in_memory_auth_provider;
mod in_memory_generation_queue;
mod supabase_auth_provider;
mod tracing_form_event_sink;

pub use in_memory_auth_provider::InMemoryAuthProvider;
pub use in_memory_generation_queue::{DEFAULT_GENERATION_QUEUE_CAPACITY, InMemoryGenerationQueue};
pub use supabase_auth_provider::SupabaseAuthProvider;
pub use tracing_form_event_sink::TracingFormEventSink;
