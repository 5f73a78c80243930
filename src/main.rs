use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use rsacert::cert::SignatureAlgorithm;
use rsacert::config::CertGenConfig;
use rsacert::generate::{self, GenerateRequest};
use rsacert::output::OutputPaths;
use rsacert::prompt::{self, SubjectFields};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "rsacert", version)]
#[command(about = "Generate a self-signed X.509 certificate from an RSA private key", long_about = None)]
struct Args {
    /// RSA private key (PKCS#1 or PKCS#8, PEM or DER)
    #[arg(short, long)]
    key: PathBuf,

    /// Where to write the PEM certificate
    #[arg(short, long)]
    out: PathBuf,

    /// Digest paired with RSA: sha1, sha224, sha256, sha384, sha512
    #[arg(short, long)]
    digest: Option<String>,

    /// Also write the DER certificate to this (different) file
    #[arg(long)]
    der_out: Option<PathBuf>,

    /// TOML config file; a [subject] table there skips the prompts
    #[arg(short, long, env = "RSACERT_CONFIG")]
    config: Option<PathBuf>,

    /// Maximum length of each subject field, in bytes
    #[arg(long)]
    max_field_len: Option<usize>,

    /// Ceiling for the encoded certificate, in bytes
    #[arg(long)]
    buffer_capacity: Option<usize>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut cfg = match &args.config {
        Some(path) => CertGenConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => CertGenConfig::default(),
    };

    // Override with command line arguments
    if let Some(digest) = args.digest {
        cfg.digest = digest;
    }
    if let Some(der_out) = args.der_out {
        cfg.der_out = Some(der_out);
    }
    if let Some(max_field_len) = args.max_field_len {
        cfg.max_field_len = max_field_len;
    }
    if let Some(buffer_capacity) = args.buffer_capacity {
        cfg.buffer_capacity = buffer_capacity;
    }
    anyhow::ensure!(cfg.max_field_len > 0, "--max-field-len must be at least 1");

    // Logs share stderr with the prompts; stdout stays clean
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cfg.log_level)))
        .with(fmt::layer().with_writer(io::stderr).with_target(false))
        .init();

    let signature_algorithm: SignatureAlgorithm = cfg.digest.parse()?;
    let key = generate::load_signing_key(&args.key)?;

    let subject = match cfg.subject.take() {
        Some(subject) => {
            info!("using subject from configuration");
            SubjectFields::from(subject)
        }
        None => prompt::collect_subject(&mut io::stdin().lock(), &mut io::stderr(), cfg.max_field_len)?,
    };

    let request = GenerateRequest::builder()
        .key_path(args.key)
        .output(OutputPaths {
            pem: args.out,
            der: cfg.der_out,
        })
        .signature_algorithm(signature_algorithm)
        .subject(subject)
        .max_field_len(cfg.max_field_len)
        .buffer_capacity(cfg.buffer_capacity)
        .build();

    let generated = generate::issue_and_write(&key, &request)?;
    info!(
        path = %request.output.pem.display(),
        bytes = generated.pem.len(),
        "Successfully converted the der to pem"
    );

    Ok(())
}
