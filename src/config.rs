// Build-time product configuration, generated from config.toml by build.rs.
include!(concat!(env!("OUT_DIR"), "/skiff_config.rs"));
