//! Tests for preload, clear, status, checksum.

use super::parse;
use crate::cli::{Cli, CliCommand};
use clap::Parser;

#[test]
fn cli_parse_preload() {
    match parse(&["assetcache", "preload"]) {
        CliCommand::Preload => {}
        _ => panic!("expected Preload"),
    }
}

#[test]
fn cli_parse_clear() {
    match parse(&["assetcache", "clear"]) {
        CliCommand::Clear => {}
        _ => panic!("expected Clear"),
    }
}

#[test]
fn cli_parse_status() {
    match parse(&["assetcache", "status"]) {
        CliCommand::Status => {}
        _ => panic!("expected Status"),
    }
}

#[test]
fn cli_parse_checksum() {
    match parse(&["assetcache", "checksum", "/path/to/resume.pdf"]) {
        CliCommand::Checksum { path } => assert_eq!(path, "/path/to/resume.pdf"),
        _ => panic!("expected Checksum"),
    }
}

#[test]
fn cli_parse_checksum_requires_path() {
    assert!(Cli::try_parse_from(["assetcache", "checksum"]).is_err());
}

#[test]
fn cli_parse_unknown_command() {
    assert!(Cli::try_parse_from(["assetcache", "fetch"]).is_err());
}
