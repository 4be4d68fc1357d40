//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

/// Bulk download the free e-books listed in a publisher catalog.
///
/// Each book is stored as `<DEST_DIR>/<package>/<title> - <author> - <id>.pdf`.
/// Files already present are skipped, so an interrupted run can simply be
/// started again.
#[derive(Parser, Debug)]
#[command(name = "book-downloader")]
#[command(author, version, about)]
pub struct Args {
    /// Destination directory; created if missing
    #[arg(value_name = "DEST_DIR", default_value = "download")]
    pub dest_dir: PathBuf,

    /// Also download the EPUB edition of every book
    #[arg(long)]
    pub epub: bool,

    /// Maximum books downloaded at the same time (1-100, default 8)
    #[arg(short = 'w', long, value_parser = clap::value_parser!(u8).range(1..=100))]
    pub max_workers: Option<u8>,

    /// Read the catalog from a local spreadsheet instead of fetching it
    #[arg(long, value_name = "PATH", conflicts_with_all = ["catalog_url", "refresh_catalog"])]
    pub catalog: Option<PathBuf>,

    /// Fetch the catalog from this URL instead of the default list
    #[arg(long, value_name = "URL")]
    pub catalog_url: Option<String>,

    /// Download the catalog again even if a cached copy exists
    #[arg(long)]
    pub refresh_catalog: bool,

    /// Write every processed book and its outcome to this JSON file
    #[arg(long, value_name = "PATH")]
    pub report: Option<PathBuf>,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_default_args_parses_successfully() {
        let args = Args::try_parse_from(["book-downloader"]).unwrap();
        assert_eq!(args.dest_dir, PathBuf::from("download"));
        assert!(!args.epub);
        assert_eq!(args.max_workers, None);
        assert!(args.catalog.is_none());
        assert!(args.catalog_url.is_none());
        assert!(!args.refresh_catalog);
        assert!(args.report.is_none());
        assert_eq!(args.verbose, 0);
        assert!(!args.quiet);
    }

    #[test]
    fn test_cli_positional_dest_dir() {
        let args = Args::try_parse_from(["book-downloader", "/tmp/books"]).unwrap();
        assert_eq!(args.dest_dir, PathBuf::from("/tmp/books"));
    }

    #[test]
    fn test_cli_epub_flag() {
        let args = Args::try_parse_from(["book-downloader", "--epub"]).unwrap();
        assert!(args.epub);
    }

    #[test]
    fn test_cli_verbose_flag_increments_count() {
        let args = Args::try_parse_from(["book-downloader", "-v"]).unwrap();
        assert_eq!(args.verbose, 1);

        let args = Args::try_parse_from(["book-downloader", "-vv"]).unwrap();
        assert_eq!(args.verbose, 2);

        let args = Args::try_parse_from(["book-downloader", "--verbose", "--verbose"]).unwrap();
        assert_eq!(args.verbose, 2);
    }

    #[test]
    fn test_cli_quiet_flag_sets_quiet() {
        let args = Args::try_parse_from(["book-downloader", "-q"]).unwrap();
        assert!(args.quiet);

        let args = Args::try_parse_from(["book-downloader", "--quiet"]).unwrap();
        assert!(args.quiet);
    }

    #[test]
    fn test_cli_help_flag_shows_usage() {
        let result = Args::try_parse_from(["book-downloader", "--help"]);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_cli_version_flag_shows_version() {
        let result = Args::try_parse_from(["book-downloader", "--version"]);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_cli_invalid_flag_returns_error() {
        let result = Args::try_parse_from(["book-downloader", "--invalid-flag"]);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::UnknownArgument);
    }

    // ==================== Max Workers Tests ====================

    #[test]
    fn test_cli_max_workers_short_and_long_flag() {
        let args = Args::try_parse_from(["book-downloader", "-w", "5"]).unwrap();
        assert_eq!(args.max_workers, Some(5));

        let args = Args::try_parse_from(["book-downloader", "--max-workers", "20"]).unwrap();
        assert_eq!(args.max_workers, Some(20));
    }

    #[test]
    fn test_cli_max_workers_bounds_accepted() {
        let args = Args::try_parse_from(["book-downloader", "-w", "1"]).unwrap();
        assert_eq!(args.max_workers, Some(1));

        let args = Args::try_parse_from(["book-downloader", "-w", "100"]).unwrap();
        assert_eq!(args.max_workers, Some(100));
    }

    #[test]
    fn test_cli_max_workers_zero_rejected() {
        let err = Args::try_parse_from(["book-downloader", "-w", "0"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn test_cli_max_workers_over_max_rejected() {
        let err = Args::try_parse_from(["book-downloader", "-w", "101"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    // ==================== Catalog Tests ====================

    #[test]
    fn test_cli_catalog_options() {
        let args = Args::try_parse_from([
            "book-downloader",
            "--catalog-url",
            "https://example.com/list.xlsx",
            "--refresh-catalog",
            "--report",
            "report.json",
        ])
        .unwrap();
        assert_eq!(
            args.catalog_url.as_deref(),
            Some("https://example.com/list.xlsx")
        );
        assert!(args.refresh_catalog);
        assert_eq!(args.report, Some(PathBuf::from("report.json")));
    }

    #[test]
    fn test_cli_local_catalog_conflicts_with_remote_options() {
        let err = Args::try_parse_from([
            "book-downloader",
            "--catalog",
            "list.xlsx",
            "--catalog-url",
            "https://example.com/list.xlsx",
        ])
        .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);

        let err = Args::try_parse_from([
            "book-downloader",
            "--catalog",
            "list.xlsx",
            "--refresh-catalog",
        ])
        .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn test_cli_combined_flags() {
        let args =
            Args::try_parse_from(["book-downloader", "out", "--epub", "-w", "16", "-v"]).unwrap();
        assert_eq!(args.dest_dir, PathBuf::from("out"));
        assert!(args.epub);
        assert_eq!(args.max_workers, Some(16));
        assert_eq!(args.verbose, 1);
    }
}
