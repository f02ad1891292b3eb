//! Workspace root package. It carries no code of its own and exists so the
//! pre-commit hooks configured in `Cargo.toml` are installed by `rusty-hook`.
