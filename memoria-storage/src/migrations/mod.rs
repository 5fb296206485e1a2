//! Embedded schema migrations (spec §0, §3). Every table Memoria owns
//! is created by a numbered `refinery` migration in this directory so
//! `run_migrations()` is idempotent across restarts and safe to call
//! from both `memoria-server`'s startup path and integration tests.

refinery::embed_migrations!("migrations");
