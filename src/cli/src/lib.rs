//! Layerscope CLI - inventory of OCI image layers and TAR archives.

pub mod commands;
