use std::path::PathBuf;

use clap::Parser;
use eyre::{Result, WrapErr};
use larder::{root_error, Category, Config, EngineChoice, PageKind, Project, Summary};

#[derive(Parser, Debug)]
#[clap(name = "larder", about, version)]
struct Args {
    /// Increase output logging verbosity.
    #[clap(short, long)]
    verbose: bool,

    /// Project root directory. Defaults to the current directory.
    #[clap(long)]
    root: Option<PathBuf>,

    /// Configuration file. Defaults to larder.yml, larder.yaml or
    /// larder.json in the project root, if present.
    #[clap(short, long)]
    config: Option<PathBuf>,

    /// SQLite database holding wine and beer data.
    #[clap(long)]
    db: Option<PathBuf>,

    /// JSON file holding episode data.
    #[clap(long)]
    data: Option<PathBuf>,

    /// Template engine to use: auto, jinja or fallback.
    #[clap(long)]
    engine: Option<EngineChoice>,

    /// Which page(s) to render: episodes, wine, beer. Renders all of them if
    /// none are given.
    pages: Vec<PageKind>,
}

fn main() {
    let args = Args::parse();
    simple_logger::init_with_level(if args.verbose {
        log::Level::Debug
    } else {
        log::Level::Info
    })
    .unwrap();

    match render_pages(&args) {
        Ok(summaries) => log::debug!("Rendered {} page(s)", summaries.len()),
        Err(e) => {
            log::error!("Failed: {:#}", e);
            let category = root_error(&e)
                .map(|e| e.category())
                .unwrap_or(Category::Other);
            std::process::exit(category.exit_code());
        }
    }
}

fn render_pages(args: &Args) -> Result<Vec<Summary>> {
    let root = match &args.root {
        Some(root) => root.clone(),
        None => std::env::current_dir().wrap_err("cannot determine current directory")?,
    };
    let mut config = Config::load(&root, args.config.as_deref())?;
    if let Some(db) = &args.db {
        config = config.with_database(db);
    }
    if let Some(data) = &args.data {
        config = config.with_data(PageKind::Episodes, data);
    }
    if let Some(engine) = args.engine {
        config = config.with_engine(engine);
    }
    let pages = if args.pages.is_empty() {
        PageKind::ALL.to_vec()
    } else {
        args.pages.clone()
    };
    let project = Project::new(config)?;
    project.render_all(&pages)
}
