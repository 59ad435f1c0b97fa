//! CLI subcommand implementations.

pub mod flash_payload;
pub mod generate_payload;
pub mod write_emmc;
