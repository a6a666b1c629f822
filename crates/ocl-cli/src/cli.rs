use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use serde::{Deserialize, Serialize};

/// Media type assumed for `tag` and `add` targets.
pub const MANIFEST_MEDIA_TYPE: &str = "application/vnd.oci.image.manifest.v1+json";

#[derive(Parser)]
#[command(
    name = "ocl",
    about = "Resolve and edit references in an OCI image layout",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable debug logging (repeat for trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Output format; overrides the config file
    #[arg(long, global = true)]
    pub format: Option<OutputFormat>,

    /// Path to a TOML config file (defaults to $OCL_CONFIG)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Image layout directory; overrides the config file
    #[arg(short, long, global = true)]
    pub layout: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create an empty image layout
    Init(InitArgs),
    /// Resolve a reference to the manifests it points at
    Resolve(ResolveArgs),
    /// Point a reference at a single blob, replacing previous targets
    Tag(TagArgs),
    /// Add blobs under a reference without removing existing entries
    Add(AddArgs),
    /// Delete every entry tagged with a reference
    Rm(RmArgs),
    /// List references in index order
    Ls(LsArgs),
    /// Store a file as a blob and print its descriptor
    PutBlob(PutBlobArgs),
}

#[derive(Args)]
pub struct InitArgs {
    /// Directory to initialize (defaults to the configured layout)
    pub path: Option<PathBuf>,
}

#[derive(Args)]
pub struct ResolveArgs {
    pub refname: String,
}

#[derive(Args)]
pub struct TagArgs {
    pub refname: String,
    /// Digest of a blob already in the layout
    #[arg(long)]
    pub digest: String,
    #[arg(long, default_value = MANIFEST_MEDIA_TYPE)]
    pub media_type: String,
}

#[derive(Args)]
pub struct AddArgs {
    pub refname: String,
    /// Digests of blobs already in the layout
    #[arg(long = "digest")]
    pub digests: Vec<String>,
    #[arg(long, default_value = MANIFEST_MEDIA_TYPE)]
    pub media_type: String,
}

#[derive(Args)]
pub struct RmArgs {
    pub refname: String,
}

#[derive(Args)]
pub struct LsArgs {}

#[derive(Args)]
pub struct PutBlobArgs {
    pub file: PathBuf,
    /// Media type of the blob, e.g. application/vnd.oci.image.layer.v1.tar+gzip
    #[arg(long)]
    pub media_type: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_tag_with_global_flags() {
        let cli = Cli::try_parse_from([
            "ocl", "-vv", "--layout", "/tmp/img", "tag", "latest", "--digest", "sha256:abc",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.layout, Some(PathBuf::from("/tmp/img")));
        match cli.command {
            Command::Tag(args) => {
                assert_eq!(args.refname, "latest");
                assert_eq!(args.media_type, MANIFEST_MEDIA_TYPE);
            }
            _ => panic!("expected tag"),
        }
    }

    #[test]
    fn parse_add_with_several_digests() {
        let cli = Cli::try_parse_from([
            "ocl", "add", "multi", "--digest", "sha256:a", "--digest", "sha256:b", "--format",
            "json",
        ])
        .unwrap();
        assert_eq!(cli.format, Some(OutputFormat::Json));
        match cli.command {
            Command::Add(args) => assert_eq!(args.digests, vec!["sha256:a", "sha256:b"]),
            _ => panic!("expected add"),
        }
    }

    #[test]
    fn add_without_digests_parses() {
        let cli = Cli::try_parse_from(["ocl", "add", "v1"]).unwrap();
        match cli.command {
            Command::Add(args) => assert!(args.digests.is_empty()),
            _ => panic!("expected add"),
        }
    }

    #[test]
    fn put_blob_requires_media_type() {
        let err = Cli::try_parse_from(["ocl", "put-blob", "layer.tar.gz"])
            .err()
            .expect("put-blob without --media-type must not parse");
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);

        let cli = Cli::try_parse_from([
            "ocl",
            "put-blob",
            "layer.tar.gz",
            "--media-type",
            "application/vnd.oci.image.layer.v1.tar+gzip",
        ])
        .unwrap();
        match cli.command {
            Command::PutBlob(args) => {
                assert_eq!(args.media_type, "application/vnd.oci.image.layer.v1.tar+gzip")
            }
            _ => panic!("expected put-blob"),
        }
    }
}
