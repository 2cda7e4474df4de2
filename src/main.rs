use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use otpgen::config::Config;
use otpgen::secret::RECOMMENDED_MIN_BYTES;
use otpgen::{generate_secret, hostname, qrcode, EnrollmentUri};

#[derive(Parser)]
#[command(name = "otpgen")]
#[command(version)]
#[command(about = "Generate a TOTP secret and its otpauth:// enrollment URI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a new secret and print its enrollment URI (default)
    Generate(GenerateArgs),

    /// Show the contents of an enrollment URI or a QR code image
    Inspect(InspectArgs),
}

#[derive(Args, Debug, Default)]
struct GenerateArgs {
    /// Secret length in bytes [env: OTPGEN_SECRET_BYTES, default: 10]
    #[arg(short, long, allow_negative_numbers = true)]
    bytes: Option<i64>,

    /// Account label; defaults to the short hostname [env: OTPGEN_LABEL]
    #[arg(short, long)]
    label: Option<String>,

    /// Issuer shown by authenticator apps [env: OTPGEN_ISSUER]
    #[arg(short, long)]
    issuer: Option<String>,

    /// Also print a QR chart URL for the enrollment URI
    #[arg(long, default_value = "false")]
    chart: bool,
}

#[derive(Args, Debug)]
struct InspectArgs {
    /// An otpauth:// URI or the path of a QR code image
    source: String,
}

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = Config::load().context("failed to load OTPGEN_* configuration")?;
    tracing::debug!(?config, "configuration loaded");

    match cli.command {
        Some(Commands::Generate(args)) => generate(args, &config),
        Some(Commands::Inspect(args)) => inspect(args),
        None => generate(GenerateArgs::default(), &config),
    }
}

fn init_tracing() {
    // Logs go to stderr so stdout carries only the secret and URIs.
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn generate(args: GenerateArgs, config: &Config) -> Result<()> {
    let byte_length = args.bytes.unwrap_or(config.secret_bytes);
    let label = match args.label.or_else(|| config.label.clone()) {
        Some(label) => label,
        None => hostname::short_hostname()?,
    };
    let issuer = args.issuer.or_else(|| config.issuer.clone());

    if byte_length > 0 && byte_length < RECOMMENDED_MIN_BYTES {
        tracing::warn!(
            bytes = byte_length,
            recommended = RECOMMENDED_MIN_BYTES,
            "secret is shorter than recommended"
        );
    }

    let secret = generate_secret(byte_length)?;
    let uri = EnrollmentUri::new(&label, secret, issuer.as_deref())?;
    tracing::info!(label = %uri.label(), issuer = ?uri.issuer(), "built enrollment uri");

    println!("Your secret key is: {}", uri.secret());
    println!("{}", uri);

    if args.chart {
        let url = qrcode::chart_url(&config.chart_base_url, &uri, config.chart_size)?;
        println!("{}", url);
    }

    Ok(())
}

fn inspect(args: InspectArgs) -> Result<()> {
    let uri = if args.source.starts_with("otpauth:") {
        EnrollmentUri::parse(&args.source)?
    } else {
        qrcode::extract_enrollment_uri(&args.source)
            .with_context(|| format!("failed to read enrollment uri from {}", args.source))?
    };

    println!("label:  {}", uri.label());
    if let Some(issuer) = uri.issuer() {
        println!("issuer: {}", issuer);
    }
    println!("secret: {}", uri.secret());
    println!("bytes:  {}", uri.secret().len());

    Ok(())
}
