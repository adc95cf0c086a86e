use super::parse;
use crate::cli::{Cli, CliCommand};
use clap::Parser;
use std::path::Path;

#[test]
fn cli_parse_download_defaults() {
    match parse(&["assetcache", "download"]) {
        CliCommand::Download {
            filename,
            output_dir,
        } => {
            assert!(filename.is_none());
            assert!(output_dir.is_none());
        }
        _ => panic!("expected Download"),
    }
}

#[test]
fn cli_parse_download_filename() {
    match parse(&["assetcache", "download", "Jane Doe CV.pdf"]) {
        CliCommand::Download {
            filename,
            output_dir,
        } => {
            assert_eq!(filename.as_deref(), Some("Jane Doe CV.pdf"));
            assert!(output_dir.is_none());
        }
        _ => panic!("expected Download with filename"),
    }
}

#[test]
fn cli_parse_download_output_dir() {
    match parse(&["assetcache", "download", "cv.pdf", "--output-dir", "/tmp/out"]) {
        CliCommand::Download {
            filename,
            output_dir,
        } => {
            assert_eq!(filename.as_deref(), Some("cv.pdf"));
            assert_eq!(output_dir.as_deref(), Some(Path::new("/tmp/out")));
        }
        _ => panic!("expected Download with --output-dir"),
    }
}

#[test]
fn cli_parse_download_rejects_extra_positional() {
    assert!(Cli::try_parse_from(["assetcache", "download", "a.pdf", "b.pdf"]).is_err());
}
