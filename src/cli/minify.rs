//! `wirepress minify`: minify files in parallel, or stdin.

use super::MinifyArgs;
use anyhow::{Context, Result, bail};
use rayon::prelude::*;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use wirepress::{CompressionLevel, Compressor, ContentKind, debug, log, transport};

/// One minified input.
struct Output {
    source: PathBuf,
    bytes: Vec<u8>,
    before: usize,
}

pub fn run_minify(args: &MinifyArgs, compressor: &Compressor) -> Result<()> {
    if args.reads_stdin() {
        let mut content = String::new();
        io::stdin()
            .read_to_string(&mut content)
            .context("failed to read stdin")?;
        let kind = args.kind.unwrap_or_default();
        let bytes = process(&content, kind, args, compressor)?;
        return write_stdout(&bytes);
    }

    if let Some(dir) = &args.output {
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create `{}`", dir.display()))?;
    }

    let results: Vec<_> = args
        .files
        .par_iter()
        .map(|path| minify_file(path, args, compressor))
        .collect();

    let mut failed = 0;
    let (mut before, mut after) = (0, 0);
    for result in results {
        let output = match result {
            Ok(output) => output,
            Err(err) => {
                log!("error"; "{:#}", err);
                failed += 1;
                continue;
            }
        };
        before += output.before;
        after += output.bytes.len();
        match &args.output {
            Some(dir) => write_into(dir, &output, args.gzip)?,
            None => write_stdout(&output.bytes)?,
        }
    }

    if failed > 0 {
        bail!("{failed} of {} files failed", args.files.len());
    }
    if args.output.is_some() {
        log!("minify"; "{} files, {} -> {} bytes ({})", args.files.len(), before, after, ratio(before, after));
    }
    Ok(())
}

fn minify_file(path: &Path, args: &MinifyArgs, compressor: &Compressor) -> Result<Output> {
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read `{}`", path.display()))?;
    let kind = args
        .kind
        .or_else(|| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .and_then(ContentKind::from_extension)
        })
        .unwrap_or_default();

    let bytes = process(&content, kind, args, compressor)
        .with_context(|| format!("failed to minify `{}`", path.display()))?;
    debug!("minify"; "{} ({}): {} -> {} bytes", path.display(), kind, content.len(), bytes.len());

    Ok(Output {
        source: path.to_path_buf(),
        bytes,
        before: content.len(),
    })
}

fn process(
    content: &str,
    kind: ContentKind,
    args: &MinifyArgs,
    compressor: &Compressor,
) -> Result<Vec<u8>> {
    let level = effective_level(args, compressor, content);
    debug!("level"; "{} at {}", kind, level);
    let text = compressor.compress_with_level(content, level, kind);
    if args.gzip {
        Ok(transport::gzip(text.as_bytes())?)
    } else {
        Ok(text.into_bytes())
    }
}

fn write_into(dir: &Path, output: &Output, gzip: bool) -> Result<()> {
    let mut name = output
        .source
        .file_name()
        .map(|n| n.to_os_string())
        .context("input path has no file name")?;
    if gzip {
        name.push(".gz");
    }
    let target = dir.join(name);
    fs::write(&target, &output.bytes)
        .with_context(|| format!("failed to write `{}`", target.display()))
}

fn write_stdout(bytes: &[u8]) -> Result<()> {
    let mut stdout = io::stdout().lock();
    stdout.write_all(bytes).context("failed to write stdout")?;
    stdout.flush().context("failed to write stdout")
}

fn ratio(before: usize, after: usize) -> String {
    if before == 0 {
        return "0.0%".to_string();
    }
    format!("-{:.1}%", 100.0 - after as f64 * 100.0 / before as f64)
}

/// Level the command will use for `content`.
pub fn effective_level(args: &MinifyArgs, compressor: &Compressor, content: &str) -> CompressionLevel {
    if args.component {
        CompressionLevel::Extreme
    } else {
        args.level
            .unwrap_or_else(|| compressor.config().level)
            .resolve(content)
    }
}
