use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use srcmap::diagnostics::position::MappingsIndex;
use srcmap::errors::{MappingError, SourceMapError};
use srcmap::{SourceMapDocument, UrlMapper};
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "srcmap", about = "Read, write and merge version 3 source maps")]
struct Cli {
    /// Log document operations (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,
    /// Map a local directory to a URL prefix, as PATH=URL
    #[arg(long = "url-map", value_name = "PATH=URL", global = true, value_parser = parse_url_mapping)]
    url_maps: Vec<(PathBuf, String)>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Concatenate generated files and merge their source maps
    Merge {
        /// Generated files, in output order
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        /// Merged generated file
        #[arg(short, long)]
        out: PathBuf,
        /// Merged source map (defaults to OUT.map)
        #[arg(long)]
        map_out: Option<PathBuf>,
        /// URL written into the merged file's sourceMappingURL comment
        #[arg(long)]
        url: Option<String>,
        /// Embed original sources as sourcesContent
        #[arg(long)]
        include_originals: bool,
    },
    /// Print every decoded segment of a source map
    Decode {
        /// Source map file
        map: PathBuf,
    },
    /// Encode integers as a packed VLQ token
    Encode {
        #[arg(allow_negative_numbers = true, required = true)]
        values: Vec<i64>,
    },
    /// Decode a packed VLQ token into integers
    Unpack { token: String },
}

fn parse_url_mapping(raw: &str) -> Result<(PathBuf, String), String> {
    let (path, url) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected PATH=URL, got '{raw}'"))?;
    Ok((PathBuf::from(path), url.to_string()))
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let mapper = cli
        .url_maps
        .iter()
        .fold(UrlMapper::new(), |mapper, (path, url)| {
            mapper.with_mapping(path, url.clone())
        });

    let result = match cli.command {
        Command::Merge {
            inputs,
            out,
            map_out,
            url,
            include_originals,
        } => merge(&mapper, &inputs, &out, map_out, url, include_originals),
        Command::Decode { map } => decode(&map),
        Command::Encode { values } => {
            let token: String = values
                .iter()
                .map(|value| srcmap::codec::vlq::encode(*value))
                .collect();
            println!("{token}");
            Ok(())
        }
        Command::Unpack { token } => match srcmap::codec::vlq::decode_all(&token) {
            Ok(values) => {
                let values: Vec<String> = values.iter().map(i64::to_string).collect();
                println!("{}", values.join(" "));
                Ok(())
            }
            Err(err) => Err(err.into()),
        },
    };

    if let Err(err) = result {
        eprintln!("{} {err}", "error:".red().bold());
        process::exit(1);
    }
}

fn merge(
    mapper: &UrlMapper,
    inputs: &[PathBuf],
    out: &Path,
    map_out: Option<PathBuf>,
    url: Option<String>,
    include_originals: bool,
) -> Result<(), SourceMapError> {
    let mut merged = SourceMapDocument::new().with_url_mapper(mapper.clone());
    merged.set_include_originals(include_originals);

    for input in inputs {
        let mut document = SourceMapDocument::new().with_url_mapper(mapper.clone());
        document.load_generated(input)?;

        if !document.has_sourcemap() {
            let sibling = sibling_map_path(input);
            if sibling.is_file() {
                document.load_sourcemap(&sibling)?;
            } else {
                warn!(input = %input.display(), "no source map found, merging unmapped");
            }
        }

        let map_text = document.mappings().export().to_string();
        merged
            .append_sourcemap(&document)
            .map_err(|err| describe_mapping_error(err, input, &map_text))?;
    }

    let map_out = map_out.unwrap_or_else(|| sibling_map_path(out));
    let url = url.or_else(|| {
        mapper
            .local_path_to_url(&map_out)
            .or_else(|| map_out.file_name().map(|name| name.to_string_lossy().into_owned()))
    });
    merged.set_source_mapping_url(url);

    merged.save_generated(out, true)?;
    merged.save_sourcemap(&map_out)?;

    println!(
        "{} {} inputs into {} ({} lines, {} sources)",
        "merged".green().bold(),
        inputs.len(),
        out.display().to_string().cyan(),
        merged.mappings().line_count(),
        merged.sources().count()
    );
    Ok(())
}

fn decode(map: &Path) -> Result<(), SourceMapError> {
    let mut document = SourceMapDocument::new();
    document.load_sourcemap(map)?;

    let map_text = document.mappings().export().to_string();
    let lines = document
        .mapped_lines()
        .map_err(|err| describe_mapping_error(err.into(), map, &map_text))?;

    for (line_number, line) in lines.iter().enumerate() {
        for segment in line {
            match &segment.original {
                Some(original) => {
                    let name = original
                        .name
                        .as_deref()
                        .map(|name| format!(" {}", name.bright_white()))
                        .unwrap_or_default();
                    println!(
                        "{}:{} {} {}:{}:{}{}",
                        line_number,
                        segment.generated_column,
                        "->".bright_black(),
                        original.source.cyan(),
                        original.line,
                        original.column,
                        name
                    );
                }
                None => println!("{}:{}", line_number, segment.generated_column),
            }
        }
    }
    Ok(())
}

fn sibling_map_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".map");
    PathBuf::from(name)
}

/// Print where in the mappings text a decode failure happened, then pass the error on.
fn describe_mapping_error(err: SourceMapError, path: &Path, mappings: &str) -> SourceMapError {
    if let SourceMapError::Mapping(mapping_err) = &err {
        if let Some(span) = mapping_err.span() {
            let pos = MappingsIndex::from_mappings(mappings).byte_to_pos(span.offset());
            eprintln!(
                "{} {} at {} generated line {}, segment {}: {}",
                "mappings".red().bold(),
                kind(mapping_err).yellow(),
                path.display().to_string().cyan(),
                pos.line,
                pos.segment,
                mapping_err.to_string().bright_white()
            );
        }
    }
    err
}

fn kind(err: &MappingError) -> &'static str {
    match err {
        MappingError::MalformedVlq { .. } => "vlq",
        MappingError::InvalidSegmentArity { .. } => "arity",
        MappingError::SourceIndexOutOfRange { .. } | MappingError::NameIndexOutOfRange { .. } => {
            "index"
        }
        MappingError::NegativeLine { .. } | MappingError::NegativeColumn { .. } => "delta",
        MappingError::IndexOutOfRange { .. } => "table",
    }
}
