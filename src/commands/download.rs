use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use tracing::info;

use crate::cli::DownloadArgs;
use crate::util::ensure_parent_directory;

pub const DEFAULT_ENDPOINT: &str = "https://sparql.dblp.org/sparql";

/// Author signatures of every paper published in the HCI venues we track.
const HCI_QUERY: &str = r#"
PREFIX dblp: <https://dblp.org/rdf/schema#>
PREFIX rdfs: <http://www.w3.org/2000/01/rdf-schema#>
SELECT ?pub ?title ?page ?author ?creator ?author_name ?ordinal ?stream ?stream_name ?affiliation
WHERE {
  ?stream a dblp:Stream .
  VALUES ?stream {
    <https://dblp.org/streams/conf/chi>
    <https://dblp.org/streams/conf/uist>
    <https://dblp.org/streams/conf/iui>
    <https://dblp.org/streams/conf/cscw>
    <https://dblp.org/streams/conf/group>
  }
  ?stream rdfs:label ?stream_name .
  ?pub dblp:publishedInStream ?stream.
  ?pub dblp:title ?title .
  ?pub dblp:hasSignature ?sig .
  ?sig dblp:signatureCreator ?creator .
  ?sig dblp:signatureOrdinal ?ordinal .
  ?creator rdfs:label ?author_name .
  ?pub dblp:pagination ?page .
  OPTIONAL { ?creator dblp:primaryAffiliation ?affiliation }
}
ORDER BY ASC(?author_name)
"#;

pub fn run(args: DownloadArgs) -> Result<()> {
    ensure_source_file(&args.file, &args.endpoint)
}

/// Fetches the export into `path` unless a file is already there.
pub fn ensure_source_file(path: &Path, endpoint: &str) -> Result<()> {
    if path.exists() {
        info!(path = %path.display(), "source file present, skipping download");
        return Ok(());
    }

    ensure_parent_directory(path)?;
    let partial_path = partial_path_for(path);

    info!(endpoint, path = %path.display(), "downloading source export");
    let result = fetch_into(endpoint, &partial_path);
    if result.is_err() {
        let _ = fs::remove_file(&partial_path);
    }
    let bytes = result?;

    fs::rename(&partial_path, path).with_context(|| {
        format!(
            "failed to move {} into place at {}",
            partial_path.display(),
            path.display()
        )
    })?;

    info!(path = %path.display(), bytes, "download complete");
    Ok(())
}

fn fetch_into(endpoint: &str, destination: &Path) -> Result<u64> {
    let client = Client::builder()
        .timeout(None::<Duration>)
        .build()
        .context("failed to build HTTP client")?;

    let mut response = client
        .post(endpoint)
        .header(ACCEPT, "text/tab-separated-values")
        .header(CONTENT_TYPE, "application/sparql-query")
        .body(HCI_QUERY)
        .send()
        .with_context(|| format!("request to {endpoint} failed"))?;

    let status = response.status();
    if !status.is_success() {
        bail!("{endpoint} answered with HTTP {status}");
    }

    let progress = progress_bar(response.content_length());
    let file = File::create(destination)
        .with_context(|| format!("failed to create {}", destination.display()))?;
    let mut writer = BufWriter::new(progress.wrap_write(file));

    let bytes = response
        .copy_to(&mut writer)
        .with_context(|| format!("failed to write {}", destination.display()))?;
    writer
        .flush()
        .with_context(|| format!("failed to flush {}", destination.display()))?;
    progress.finish_and_clear();

    Ok(bytes)
}

fn progress_bar(total: Option<u64>) -> ProgressBar {
    match total {
        Some(total) => {
            let bar = ProgressBar::new(total);
            bar.set_style(
                ProgressStyle::default_bar()
                    .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({percent}%)")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("#>-"),
            );
            bar
        }
        None => {
            let spinner = ProgressBar::new_spinner();
            spinner.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.green} downloaded {bytes} ({bytes_per_sec})")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            spinner
        }
    }
}

fn partial_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(ToOwned::to_owned).unwrap_or_default();
    name.push(".partial");
    path.with_file_name(name)
}
