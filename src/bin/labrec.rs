use std::{
    fs::File,
    io::BufReader,
    net::{IpAddr, SocketAddr},
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "labrec", version)]
struct Cli {
    /// Log at debug level (ignored when RUST_LOG is set).
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build a lab record .docx from a JSON record.
    Generate(GenerateArgs),
    /// Write a single QR code as a PNG.
    Qr(QrArgs),
    /// Run the HTTP service.
    Serve(ServeArgs),
}

#[derive(Parser, Debug)]
struct GenerateArgs {
    /// Input lab record JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Institution logo (PNG or JPEG) placed above the title.
    #[arg(long)]
    logo: Option<PathBuf>,

    /// Output .docx path. Defaults to `<register_number>_Lab_Record.docx` in --out-dir.
    #[arg(long, conflicts_with = "out_dir")]
    out: Option<PathBuf>,

    /// Directory for the default output name.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Generate QR codes on the calling thread only.
    #[arg(long, default_value_t = false)]
    sequential: bool,

    /// Override rayon worker threads for QR generation.
    #[arg(long)]
    threads: Option<usize>,
}

#[derive(Parser, Debug)]
struct QrArgs {
    /// Text to encode, usually a URL.
    #[arg(long)]
    content: String,

    /// Output side length in pixels.
    #[arg(long, default_value_t = labrec::DEFAULT_CODE_PIXELS)]
    size: u32,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct ServeArgs {
    /// Address to bind.
    #[arg(long, default_value = "0.0.0.0")]
    host: IpAddr,

    /// Port to listen on.
    #[arg(long, env = "PORT", default_value_t = 8000)]
    port: u16,

    /// Logo to preload before any upload.
    #[arg(long)]
    logo: Option<PathBuf>,

    /// Override rayon worker threads for QR generation.
    #[arg(long)]
    threads: Option<usize>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    labrec::logging::init(cli.verbose)?;

    match cli.cmd {
        Command::Generate(args) => cmd_generate(args),
        Command::Qr(args) => cmd_qr(args),
        Command::Serve(args) => cmd_serve(args),
    }
}

fn read_record_json(path: &Path) -> anyhow::Result<labrec::LabRecord> {
    let f = File::open(path).with_context(|| format!("open record '{}'", path.display()))?;
    let r = BufReader::new(f);
    let record: labrec::LabRecord =
        serde_json::from_reader(r).with_context(|| "parse lab record JSON")?;
    Ok(record)
}

fn load_logo(path: Option<&Path>) -> anyhow::Result<Option<labrec::InstitutionLogo>> {
    path.map(|p| {
        labrec::InstitutionLogo::from_path(p)
            .with_context(|| format!("load logo '{}'", p.display()))
    })
    .transpose()
}

fn cmd_generate(args: GenerateArgs) -> anyhow::Result<()> {
    let record = read_record_json(&args.in_path)?;
    let logo = load_logo(args.logo.as_deref())?;

    let opts = labrec::AssembleOptions {
        parallel: !args.sequential,
        threads: args.threads,
    };
    let artifact = labrec::assemble_with_options(&record, logo.as_ref(), &opts)?;

    let out = args
        .out
        .unwrap_or_else(|| args.out_dir.join(&artifact.file_name));
    write_atomically(&out, &artifact)?;

    eprintln!("wrote {}", out.display());
    Ok(())
}

/// Write to a build-scoped temporary name, then rename into place.
fn write_atomically(out: &Path, artifact: &labrec::DocumentArtifact) -> anyhow::Result<()> {
    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }

    let mut tmp_name = out.as_os_str().to_owned();
    tmp_name.push(format!(".{}.tmp", artifact.build_id));
    let guard = TempFileGuard(Some(PathBuf::from(tmp_name)));
    let tmp = guard.path();

    std::fs::write(tmp, &artifact.bytes)
        .with_context(|| format!("write '{}'", tmp.display()))?;
    std::fs::rename(tmp, out)
        .with_context(|| format!("move '{}' into place", out.display()))?;
    guard.disarm();
    Ok(())
}

fn cmd_qr(args: QrArgs) -> anyhow::Result<()> {
    let code = labrec::generate_code(&args.content, args.size)?;

    if let Some(parent) = args.out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(&args.out, code.png.as_slice())
        .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_serve(args: ServeArgs) -> anyhow::Result<()> {
    let logo = labrec::LogoStore::new(load_logo(args.logo.as_deref())?);
    let config = labrec::server::ServerConfig {
        bind: SocketAddr::new(args.host, args.port),
        assemble: labrec::AssembleOptions {
            parallel: true,
            threads: args.threads,
        },
    };

    let runtime = tokio::runtime::Runtime::new().context("start tokio runtime")?;
    runtime.block_on(labrec::server::run_server(config, logo))
}

struct TempFileGuard(Option<PathBuf>);

impl TempFileGuard {
    fn path(&self) -> &Path {
        self.0.as_deref().unwrap_or_else(|| Path::new(""))
    }

    fn disarm(mut self) {
        self.0 = None;
    }
}

impl Drop for TempFileGuard {
    fn drop(&mut self) {
        if let Some(path) = self.0.take() {
            let _ = std::fs::remove_file(path);
        }
    }
}
