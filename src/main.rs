use clap::{Parser, Subcommand};
use foyer::{auth, config, manifest, output, reconcile, server};
use std::path::PathBuf;

fn version_string() -> &'static str {
    let hash = env!("GIT_HASH");
    if hash.is_empty() {
        env!("CARGO_PKG_VERSION")
    } else {
        // Leaked once at startup, called exactly once
        Box::leak(format!("{} ({hash})", env!("CARGO_PKG_VERSION")).into_boxed_str())
    }
}

/// Shared flags for commands that scan the photo directory.
#[derive(clap::Args, Clone)]
struct GeneratorArgs {
    /// Output path for the generated manifest
    #[arg(default_value = "gallery.generated.json", env = "GALLERY_MANIFEST_OUT")]
    output: PathBuf,

    /// Photo directory to scan
    #[arg(long, default_value = "photos", env = "GALLERY_PHOTOS_DIR")]
    photos: PathBuf,

    /// Substring marking thumbnail variants
    #[arg(long, default_value = "_small", env = "GALLERY_THUMBNAIL_SUFFIX")]
    thumbnail_suffix: String,

    /// Substring marking full-resolution variants
    #[arg(long, default_value = "_large", env = "GALLERY_FULL_SUFFIX")]
    full_suffix: String,

    /// Download-archive path or URL for the whole gallery
    #[arg(long, env = "GALLERY_ARCHIVE")]
    archive: Option<String>,

    /// Small line above the hero title
    #[arg(long, env = "GALLERY_HERO_EYEBROW")]
    hero_eyebrow: Option<String>,

    /// Hero title
    #[arg(long, env = "GALLERY_HERO_TITLE")]
    hero_title: Option<String>,

    /// Hero subtitle
    #[arg(long, env = "GALLERY_HERO_SUBTITLE")]
    hero_subtitle: Option<String>,

    /// Hero image path or URL
    #[arg(long, env = "GALLERY_HERO_IMAGE")]
    hero_image: Option<String>,
}

impl GeneratorArgs {
    fn reconcile_config(&self) -> reconcile::ReconcileConfig {
        reconcile::ReconcileConfig {
            thumbnail_suffix: self.thumbnail_suffix.clone(),
            full_suffix: self.full_suffix.clone(),
        }
    }

    fn page_meta(&self) -> manifest::PageMeta {
        manifest::PageMeta {
            download_archive: self.archive.clone(),
            hero_eyebrow: self.hero_eyebrow.clone(),
            hero_title: self.hero_title.clone(),
            hero_subtitle: self.hero_subtitle.clone(),
            hero_image: self.hero_image.clone(),
        }
    }
}

#[derive(Parser)]
#[command(name = "foyer")]
#[command(about = "Password-protected static photo gallery")]
#[command(long_about = "\
Password-protected static photo gallery

The generator scans a photo directory, merges size variants into logical
photos, and writes the manifest the gallery page renders from:

  photos/
  ├── beach_small.jpg              # thumbnail variant
  ├── beach_large.jpg              # full-resolution variant
  ├── sunset.jpg                   # no suffix: serves as both
  └── trips/
      ├── kyoto_small.jpg          # subdirectories keep photos distinct
      └── kyoto_large.jpg

The server puts the whole site behind one shared password:

  GALLERY_PASSWORD=... foyer serve --root public

Sessions are cookie-based and last 8 hours. Set GALLERY_SESSION_SECRET to
make tokens deployment-specific.")]
#[command(version = version_string())]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scan the photo directory and write the gallery manifest
    Manifest(GeneratorArgs),
    /// Scan and report without writing anything
    Check(GeneratorArgs),
    /// Serve the gallery behind the password gate
    Serve {
        /// Directory of static gallery files
        #[arg(long, default_value = "public", env = "GALLERY_SITE_ROOT")]
        root: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Manifest(args) => {
            let report = reconcile::reconcile(&args.photos, &args.reconcile_config())?;
            output::print_report(&report);

            let doc = manifest::assemble(report.photos, args.page_meta());
            // Serialize fully before touching the output path; the write is
            // all-or-nothing.
            let json = serde_json::to_string_pretty(&doc)?;
            std::fs::write(&args.output, json)?;
            println!("Manifest written to {}", args.output.display());
        }
        Command::Check(args) => {
            let report = reconcile::reconcile(&args.photos, &args.reconcile_config())?;
            output::print_report(&report);
            println!("==> Content is valid");
        }
        Command::Serve { root } => {
            tracing_subscriber::fmt()
                .with_env_filter(
                    tracing_subscriber::EnvFilter::from_default_env()
                        .add_directive(tracing::Level::INFO.into()),
                )
                .init();
            tracing::info!("Starting foyer v{}", version_string());

            let cfg = config::ServerConfig::from_env()?;
            let authenticator =
                auth::Authenticator::new(&cfg.password, cfg.session_secret.as_deref());
            let state = server::AppState::new(authenticator, root);
            server::serve(state, cfg.port).await?;
        }
    }

    Ok(())
}
