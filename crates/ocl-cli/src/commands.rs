use std::path::Path;

use anyhow::{bail, Context as _};
use colored::Colorize;
use ocl_refs::{validate_new_ref_name, MutationOutcome, RefEngine};
use ocl_store::{Context, DirLayoutStore, LayoutStore};
use ocl_types::{digest, Descriptor, MediaType};
use serde::Serialize;
use tracing::warn;

use crate::cli::*;
use crate::config::CliConfig;

pub async fn run_command(command: Command, config: &CliConfig, ctx: &Context) -> anyhow::Result<()> {
    match command {
        Command::Init(args) => cmd_init(args, config).await,
        Command::Resolve(args) => cmd_resolve(args, config, ctx).await,
        Command::Tag(args) => cmd_tag(args, config, ctx).await,
        Command::Add(args) => cmd_add(args, config, ctx).await,
        Command::Rm(args) => cmd_rm(args, config, ctx).await,
        Command::Ls(_) => cmd_ls(config, ctx).await,
        Command::PutBlob(args) => cmd_put_blob(args, config, ctx).await,
    }
}

async fn open_engine(config: &CliConfig) -> anyhow::Result<RefEngine<DirLayoutStore>> {
    let store = DirLayoutStore::open(&config.layout)
        .await
        .with_context(|| format!("open layout {}", config.layout.display()))?;
    Ok(RefEngine::new(store))
}

/// Look up a blob by digest and describe it with `media_type`.
async fn describe_blob(
    store: &impl LayoutStore,
    ctx: &Context,
    digest: &str,
    media_type: &str,
) -> anyhow::Result<Descriptor> {
    let digest = digest::parse(digest)?;
    match store.stat_blob(ctx, &digest).await? {
        Some(size) => Ok(ocl_types::descriptor(MediaType::from(media_type), digest, size)?),
        None => bail!("blob {digest} is not in the layout"),
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_descriptor(d: &Descriptor) {
    println!(
        "{}  {}  {}",
        d.digest().to_string().yellow(),
        d.media_type().to_string().cyan(),
        d.size()
    );
}

/// Names outside the `ref.name` grammar are stored, but other tools may
/// reject them.
fn warn_on_unusual_name(refname: &str) {
    if let Err(e) = validate_new_ref_name(refname) {
        warn!(refname, "{e}");
    }
}

fn report(outcome: &MutationOutcome, config: &CliConfig) -> anyhow::Result<()> {
    if let Some(ambiguity) = &outcome.ambiguity {
        warn!(refname = %outcome.refname, "{ambiguity}");
    }
    match config.format {
        OutputFormat::Json => print_json(outcome),
        OutputFormat::Text => {
            println!(
                "{} {}: {} removed, {} added",
                "✓".green().bold(),
                outcome.refname.yellow(),
                outcome.removed,
                outcome.added
            );
            Ok(())
        }
    }
}

async fn cmd_init(args: InitArgs, config: &CliConfig) -> anyhow::Result<()> {
    let path = args.path.as_deref().unwrap_or(&config.layout);
    DirLayoutStore::create(path)
        .await
        .with_context(|| format!("initialize layout {}", path.display()))?;
    println!(
        "{} Initialized image layout in {}",
        "✓".green().bold(),
        path.display().to_string().bold()
    );
    Ok(())
}

async fn cmd_resolve(args: ResolveArgs, config: &CliConfig, ctx: &Context) -> anyhow::Result<()> {
    let engine = open_engine(config).await?;
    let resolved = engine.resolve_reference(ctx, &args.refname).await?;
    if resolved.is_empty() {
        bail!("reference {:?} not found", args.refname);
    }
    if resolved.len() > 1 {
        warn!(refname = %args.refname, count = resolved.len(), "reference is ambiguous");
    }

    match config.format {
        OutputFormat::Json => print_json(&resolved)?,
        OutputFormat::Text => resolved.iter().for_each(print_descriptor),
    }
    Ok(())
}

async fn cmd_tag(args: TagArgs, config: &CliConfig, ctx: &Context) -> anyhow::Result<()> {
    warn_on_unusual_name(&args.refname);
    let engine = open_engine(config).await?;
    let descriptor = describe_blob(engine.store(), ctx, &args.digest, &args.media_type).await?;
    let outcome = engine
        .update_reference(ctx, &args.refname, descriptor)
        .await?;
    report(&outcome, config)
}

async fn cmd_add(args: AddArgs, config: &CliConfig, ctx: &Context) -> anyhow::Result<()> {
    if !args.digests.is_empty() {
        warn_on_unusual_name(&args.refname);
    }
    let engine = open_engine(config).await?;
    let mut descriptors = Vec::with_capacity(args.digests.len());
    for digest in &args.digests {
        descriptors.push(describe_blob(engine.store(), ctx, digest, &args.media_type).await?);
    }
    let outcome = engine
        .add_references(ctx, &args.refname, descriptors)
        .await?;
    report(&outcome, config)
}

async fn cmd_rm(args: RmArgs, config: &CliConfig, ctx: &Context) -> anyhow::Result<()> {
    let engine = open_engine(config).await?;
    let outcome = engine.delete_reference(ctx, &args.refname).await?;
    report(&outcome, config)
}

async fn cmd_ls(config: &CliConfig, ctx: &Context) -> anyhow::Result<()> {
    let engine = open_engine(config).await?;
    let names = engine.list_references(ctx).await?;
    match config.format {
        OutputFormat::Json => print_json(&names)?,
        OutputFormat::Text if names.is_empty() => println!("No references."),
        OutputFormat::Text => names.iter().for_each(|name| println!("{name}")),
    }
    Ok(())
}

async fn cmd_put_blob(args: PutBlobArgs, config: &CliConfig, ctx: &Context) -> anyhow::Result<()> {
    let engine = open_engine(config).await?;
    let data = read_input(&args.file).await?;
    let descriptor = engine
        .store()
        .put_described(ctx, MediaType::from(args.media_type.as_str()), &data)
        .await?;
    match config.format {
        OutputFormat::Json => print_json(&descriptor)?,
        OutputFormat::Text => print_descriptor(&descriptor),
    }
    Ok(())
}

async fn read_input(path: &Path) -> anyhow::Result<Vec<u8>> {
    tokio::fs::read(path)
        .await
        .with_context(|| format!("read {}", path.display()))
}
